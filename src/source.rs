use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Unterminated {what} starting at line {line}")]
    Unterminated { what: &'static str, line: usize },
    #[error("Unbalanced braces at line {line}")]
    UnbalancedBraces { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub typ: String,
}

/// The parts of a source unit the diff engine looks at.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SourceUnit {
    pub fields: Vec<FieldDecl>,
}

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "transient",
    "volatile",
    "abstract",
    "synchronized",
    "native",
    "strictfp",
    "default",
    "sealed",
    "non-sealed",
];

const TYPE_KEYWORDS: &[&str] = &["class", "interface", "enum", "record"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    /// Class-like body. `constants` is set while an enum's constant list is pending.
    Type { constants: bool },
    /// Initializer braces inside a field declaration.
    Initializer,
    /// Method bodies, static blocks, anything else.
    Block,
}

impl SourceUnit {
    pub fn new(fields: Vec<FieldDecl>) -> Self {
        Self { fields }
    }

    /// Collect the field declarations of every class-like body in `source`.
    pub fn parse(source: &str) -> Result<Self, SourceError> {
        let cleaned = strip_comments_and_literals(source)?;
        let mut fields = Vec::new();
        let mut stack: Vec<Scope> = Vec::new();
        let mut buf = String::new();
        let mut line = 1;

        for c in cleaned.chars() {
            match c {
                '\n' => {
                    line += 1;
                    buf.push(' ');
                }
                '{' | '}' if in_statement(&stack) && open_parens(&buf) => buf.push(c),
                '{' => match stack.last() {
                    None | Some(Scope::Type { .. }) => {
                        if matches!(stack.last(), Some(Scope::Type { .. })) && has_initializer(&buf) {
                            stack.push(Scope::Initializer);
                        } else if let Some(keyword) = type_keyword(&buf) {
                            stack.push(Scope::Type {
                                constants: keyword == "enum",
                            });
                            buf.clear();
                        } else {
                            stack.push(Scope::Block);
                            buf.clear();
                        }
                    }
                    Some(_) => stack.push(Scope::Block),
                },
                '}' => {
                    let closed = stack.pop().ok_or(SourceError::UnbalancedBraces { line })?;
                    match (closed, stack.last()) {
                        (Scope::Initializer, _) => buf.push_str("{}"),
                        (_, None | Some(Scope::Type { .. })) => buf.clear(),
                        _ => {}
                    }
                }
                ';' => {
                    if let Some(Scope::Type { constants }) = stack.last_mut() {
                        if *constants {
                            *constants = false;
                        } else {
                            fields.extend(parse_field_statement(&buf));
                        }
                    }
                    if in_statement(&stack) {
                        buf.clear();
                    }
                }
                _ => {
                    if in_statement(&stack) {
                        buf.push(c);
                    }
                }
            }
        }

        if !stack.is_empty() {
            return Err(SourceError::UnbalancedBraces { line });
        }

        Ok(Self { fields })
    }
}

/// Replace comments with whitespace and literals with empty ones, keeping newlines.
fn strip_comments_and_literals(source: &str) -> Result<String, SourceError> {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                let start = line;
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        line += 1;
                    }
                    if prev == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    prev = c;
                }
                if !closed {
                    return Err(SourceError::Unterminated {
                        what: "comment",
                        line: start,
                    });
                }
                out.push(' ');
            }
            '"' | '\'' => {
                let start = line;
                let mut closed = false;
                while let Some(c2) = chars.next() {
                    match c2 {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => {
                            out.push('\n');
                            line += 1;
                        }
                        _ if c2 == c => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(SourceError::Unterminated {
                        what: "literal",
                        line: start,
                    });
                }
                out.push(c);
                out.push(c);
            }
            '\n' => {
                out.push('\n');
                line += 1;
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Class-body or top-level text is being collected into the statement buffer.
fn in_statement(stack: &[Scope]) -> bool {
    matches!(stack.last(), None | Some(Scope::Type { .. }))
}

/// Annotation arguments like `joinColumns = {...}` keep their braces in the statement.
fn open_parens(buf: &str) -> bool {
    let mut depth = 0i32;
    for c in buf.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !is_ident_char(c)).filter(|w| !w.is_empty())
}

/// `class`, `interface`, `enum` or `record` when the header declares a type.
fn type_keyword(header: &str) -> Option<&'static str> {
    let header = strip_annotations(header);
    let before_paren = header.split('(').next().unwrap_or("");
    let ws: Vec<&str> = words(before_paren).collect();
    ws.iter().enumerate().find_map(|(i, w)| {
        TYPE_KEYWORDS
            .iter()
            .find(|k| *k == w)
            .filter(|_| i + 1 < ws.len())
            .copied()
    })
}

fn has_initializer(stmt: &str) -> bool {
    strip_annotations(stmt).contains('=')
}

/// Drop `@Name` and `@Name(...)` annotations.
fn strip_annotations(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '@' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&c) = chars.peek().filter(|&&c| is_ident_char(c) || c == '.') {
            name.push(c);
            chars.next();
        }
        // `@interface` declares an annotation type
        if name == "interface" {
            out.push_str(" interface");
            continue;
        }
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek() == Some(&'(') {
            let mut depth = 0;
            for c in chars.by_ref() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        out.push(' ');
    }

    out
}

/// Split on top-level commas. Angle brackets only count before an `=`.
fn split_declarators(stmt: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut angle = 0i32;
    let mut in_init = false;
    let mut start = 0;

    for (i, c) in stmt.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '<' if !in_init => angle += 1,
            '>' if !in_init => angle -= 1,
            '=' if depth == 0 && angle == 0 => in_init = true,
            ',' if depth == 0 && angle == 0 => {
                parts.push(&stmt[start..i]);
                start = i + 1;
                in_init = false;
            }
            _ => {}
        }
    }
    parts.push(&stmt[start..]);
    parts
}

/// Type head, name and trailing array dimensions of a declarator.
fn split_declarator(decl: &str) -> Option<(&str, &str, String)> {
    let mut decl = decl.trim();
    let mut dims = String::new();
    while let Some(rest) = decl.strip_suffix(']') {
        let rest = rest.trim_end().strip_suffix('[')?;
        dims.push_str("[]");
        decl = rest.trim_end();
    }
    let start = decl
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map(|(i, _)| i)?;
    let name = &decl[start..];
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some((&decl[..start], name, dims))
}

fn strip_modifiers(mut head: &str) -> &str {
    loop {
        head = head.trim_start();
        let Some(word) = MODIFIERS.iter().find(|m| {
            head.strip_prefix(**m)
                .is_some_and(|rest| rest.starts_with(char::is_whitespace))
        }) else {
            return head.trim();
        };
        head = &head[word.len()..];
    }
}

/// `Map < String ,Integer >` -> `Map<String, Integer>`.
fn normalize_type(typ: &str) -> String {
    let collapsed = typ.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let chars: Vec<char> = collapsed.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            ' ' => {
                let prev = i.checked_sub(1).map(|j| chars[j]);
                let next = chars.get(i + 1).copied();
                let glue = matches!(prev, Some('<' | ',' | '['))
                    || matches!(next, Some('<' | '>' | ',' | '[' | ']'));
                if !glue {
                    out.push(' ');
                }
            }
            ',' => out.push_str(", "),
            _ => out.push(c),
        }
    }

    out
}

/// Fields declared by one class-body statement, empty when it is not a field.
fn parse_field_statement(stmt: &str) -> Vec<FieldDecl> {
    let stmt = strip_annotations(stmt);
    let head = stmt.split('=').next().unwrap_or("");
    if head.contains('(') || stmt.trim().is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut base_type = String::new();

    for (i, declarator) in split_declarators(&stmt).into_iter().enumerate() {
        let decl = declarator.split('=').next().unwrap_or("");
        let Some((head, name, dims)) = split_declarator(decl) else {
            return Vec::new();
        };

        if i == 0 {
            let head = strip_modifiers(head);
            if words(head).next().is_none() {
                return Vec::new();
            }
            base_type = normalize_type(head);
        } else if !head.trim().is_empty() {
            return Vec::new();
        }

        fields.push(FieldDecl {
            name: name.to_string(),
            typ: format!("{}{}", base_type, dims),
        });
    }

    fields
}
