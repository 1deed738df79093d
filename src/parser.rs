use crate::ast::*;
use crate::lexer::{LexError, Lexer, Token};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Unexpected token: {0:?}, expected {1}")]
    Unexpected(Token, &'static str),
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Composite references are not supported")]
    CompositeRef,
    #[error("Duplicate table: {0}")]
    DuplicateTable(String),
    #[error("Duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },
}

/// Parse DBML source into a database.
pub fn parse_dbml(input: &str) -> Result<Database, ParseError> {
    Parser::new(input)?.parse()
}

/// Body of the first ```` ```dbml ```` fence, or the input itself.
pub fn extract_fenced_dbml(raw: &str) -> &str {
    const START: &str = "```dbml";
    const END: &str = "```";

    if let Some(start) = raw.find(START) {
        let body = &raw[start + START.len()..];
        if let Some(end) = body.find(END) {
            return body[..end].trim();
        }
    }
    raw
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    db: Database,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            db: Database::default(),
        })
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> &Token {
        let tok = self.tokens.get(self.pos).unwrap_or(&Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), ParseError> {
        let tok = self.advance().clone();
        if tok == expected {
            Ok(())
        } else if tok == Token::Eof {
            Err(ParseError::UnexpectedEof)
        } else {
            Err(ParseError::Unexpected(tok, what))
        }
    }

    /// Identifier or quoted name.
    fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.advance().clone() {
            Token::Ident(s) | Token::Str(s) => Ok(s),
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "name")),
        }
    }

    fn check_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case(kw))
    }

    pub fn parse(mut self) -> Result<Database, ParseError> {
        while *self.peek() != Token::Eof {
            if self.check_keyword("table") {
                self.advance();
                self.parse_table()?;
            } else if self.check_keyword("ref") {
                self.advance();
                self.parse_ref()?;
            } else if self.check_keyword("enum") {
                self.advance();
                self.parse_enum()?;
            } else if self.check_keyword("project") {
                self.advance();
                let name = self.expect_name()?;
                self.skip_block()?;
                self.db.project = Some(name);
            } else if self.check_keyword("note") {
                self.advance();
                self.parse_note()?;
            } else if self.check_keyword("tablegroup") || self.check_keyword("records") {
                self.advance();
                self.skip_until_block()?;
                self.skip_block()?;
            } else {
                return Err(ParseError::Unexpected(
                    self.peek().clone(),
                    "Table, Ref, Enum, Project, Note or TableGroup",
                ));
            }
        }

        Ok(self.db)
    }

    /// `name` or `schema.name`.
    fn parse_qualified_name(&mut self) -> Result<(String, String), ParseError> {
        let first = self.expect_name()?;
        if *self.peek() == Token::Dot {
            self.advance();
            let second = self.expect_name()?;
            Ok((first, second))
        } else {
            Ok((DEFAULT_SCHEMA.to_string(), first))
        }
    }

    fn parse_table(&mut self) -> Result<(), ParseError> {
        let (schema, name) = self.parse_qualified_name()?;

        let mut alias = None;
        if self.check_keyword("as") {
            self.advance();
            alias = Some(self.expect_name()?);
        }

        // headercolor and friends
        if *self.peek() == Token::LBracket {
            self.skip_settings()?;
        }

        self.expect(Token::LBrace, "{")?;

        let mut table = Table {
            schema: schema.clone(),
            name,
            alias,
            columns: Vec::new(),
            note: None,
        };
        let mut inline_refs = Vec::new();

        while *self.peek() != Token::RBrace {
            if *self.peek() == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            }
            if self.check_keyword("indexes") && *self.peek_at(1) == Token::LBrace {
                self.advance();
                self.parse_indexes(&mut table)?;
            } else if self.check_keyword("note")
                && matches!(self.peek_at(1), Token::Colon | Token::LBrace)
            {
                self.advance();
                table.note = self.parse_note()?;
            } else {
                let (column, refs) = self.parse_column(&table)?;
                if table.column(&column.name).is_some() {
                    return Err(ParseError::DuplicateColumn {
                        table: table.name,
                        column: column.name,
                    });
                }
                table.columns.push(column);
                inline_refs.extend(refs);
            }
        }
        self.expect(Token::RBrace, "}")?;

        let target = self.db.schema_mut(&schema);
        if target.table(&table.name).is_some() {
            return Err(ParseError::DuplicateTable(table.name));
        }
        target.tables.push(table);
        self.db.relationships.extend(inline_refs);
        Ok(())
    }

    fn parse_column(&mut self, table: &Table) -> Result<(Column, Vec<Relationship>), ParseError> {
        let name = self.expect_name()?;
        let typ = self.parse_type()?;
        let mut settings = Vec::new();
        let mut refs = Vec::new();

        if *self.peek() == Token::LBracket {
            self.advance();
            loop {
                self.parse_column_setting(table, &name, &mut settings, &mut refs)?;
                match self.advance().clone() {
                    Token::Comma => continue,
                    Token::RBracket => break,
                    Token::Eof => return Err(ParseError::UnexpectedEof),
                    tok => return Err(ParseError::Unexpected(tok, ", or ]")),
                }
            }
        }

        Ok((Column { name, typ, settings }, refs))
    }

    /// `int`, `varchar(255)`, `decimal(10,2)`, `schema.enum`, `int[]`.
    fn parse_type(&mut self) -> Result<String, ParseError> {
        let mut typ = self.expect_name()?;

        if *self.peek() == Token::Dot {
            self.advance();
            typ.push('.');
            typ.push_str(&self.expect_name()?);
        }

        if *self.peek() == Token::LParen {
            self.advance();
            let mut args = Vec::new();
            loop {
                match self.advance().clone() {
                    Token::RParen => break,
                    Token::Num(n) | Token::Ident(n) => args.push(n),
                    Token::Str(s) => args.push(format!("'{}'", s)),
                    Token::Comma => {}
                    Token::Eof => return Err(ParseError::UnexpectedEof),
                    tok => return Err(ParseError::Unexpected(tok, "type argument")),
                }
            }
            typ = format!("{}({})", typ, args.join(","));
        }

        if *self.peek() == Token::LBracket && *self.peek_at(1) == Token::RBracket {
            self.advance();
            self.advance();
            typ.push_str("[]");
        }

        Ok(typ)
    }

    fn parse_column_setting(
        &mut self,
        table: &Table,
        column: &str,
        settings: &mut Vec<ColumnSetting>,
        refs: &mut Vec<Relationship>,
    ) -> Result<(), ParseError> {
        let key = match self.advance().clone() {
            Token::Ident(s) => s.to_ascii_lowercase(),
            Token::Eof => return Err(ParseError::UnexpectedEof),
            tok => return Err(ParseError::Unexpected(tok, "column setting")),
        };

        match key.as_str() {
            "pk" => settings.push(ColumnSetting::PrimaryKey),
            "primary" => {
                if self.check_keyword("key") {
                    self.advance();
                }
                settings.push(ColumnSetting::PrimaryKey);
            }
            "increment" => settings.push(ColumnSetting::Increment),
            "unique" => settings.push(ColumnSetting::Unique),
            "null" => settings.push(ColumnSetting::Null),
            "not" => {
                if !self.check_keyword("null") {
                    return Err(ParseError::Unexpected(self.peek().clone(), "null"));
                }
                self.advance();
                settings.push(ColumnSetting::NotNull);
            }
            "default" => {
                self.expect(Token::Colon, ":")?;
                settings.push(ColumnSetting::Default(self.parse_default_value()?));
            }
            "note" => {
                self.expect(Token::Colon, ":")?;
                match self.advance().clone() {
                    Token::Str(s) => settings.push(ColumnSetting::Note(s)),
                    tok => return Err(ParseError::Unexpected(tok, "note string")),
                }
            }
            "ref" => {
                self.expect(Token::Colon, ":")?;
                let (kind, swapped) = self.parse_relation_op()?;
                let other = self.parse_endpoint()?;
                let this = ColumnRef::new(&table.schema, &table.name, column);
                let (from, to) = if swapped { (other, this) } else { (this, other) };
                refs.push(Relationship {
                    name: None,
                    from,
                    to,
                    kind,
                });
            }
            _ => self.skip_setting_value()?,
        }
        Ok(())
    }

    fn parse_default_value(&mut self) -> Result<String, ParseError> {
        match self.advance().clone() {
            Token::Str(s) => Ok(format!("'{}'", s)),
            Token::Expr(e) => Ok(format!("`{}`", e)),
            Token::Num(n) | Token::Ident(n) => Ok(n),
            Token::Dash => match self.advance().clone() {
                Token::Num(n) => Ok(format!("-{}", n)),
                tok => Err(ParseError::Unexpected(tok, "number")),
            },
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "default value")),
        }
    }

    /// Skip `: value` of an unknown setting, stopping before `,` or `]`.
    fn skip_setting_value(&mut self) -> Result<(), ParseError> {
        while !matches!(self.peek(), Token::Comma | Token::RBracket) {
            if *self.peek() == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            }
            self.advance();
        }
        Ok(())
    }

    fn skip_settings(&mut self) -> Result<(), ParseError> {
        self.expect(Token::LBracket, "[")?;
        loop {
            match self.advance() {
                Token::RBracket => return Ok(()),
                Token::Eof => return Err(ParseError::UnexpectedEof),
                _ => {}
            }
        }
    }

    /// `>`, `<`, `-`, `<>`. The flag is set when the sides must be swapped.
    fn parse_relation_op(&mut self) -> Result<(RelationKind, bool), ParseError> {
        match self.advance().clone() {
            Token::Gt => Ok((RelationKind::ManyToOne, false)),
            Token::Lt => Ok((RelationKind::ManyToOne, true)),
            Token::Dash => Ok((RelationKind::OneToOne, false)),
            Token::LtGt => Ok((RelationKind::ManyToMany, false)),
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "relation (>, <, -, <>)")),
        }
    }

    /// `table.column` or `schema.table.column`.
    fn parse_endpoint(&mut self) -> Result<ColumnRef, ParseError> {
        let mut parts = vec![self.expect_name()?];
        while *self.peek() == Token::Dot {
            self.advance();
            if *self.peek() == Token::LParen {
                return Err(ParseError::CompositeRef);
            }
            parts.push(self.expect_name()?);
        }

        match parts.as_slice() {
            [table, column] => Ok(ColumnRef::new(DEFAULT_SCHEMA, table, column)),
            [schema, table, column] => Ok(ColumnRef::new(schema, table, column)),
            _ => Err(ParseError::Unexpected(
                self.peek().clone(),
                "table.column or schema.table.column",
            )),
        }
    }

    fn parse_ref(&mut self) -> Result<(), ParseError> {
        let mut name = None;
        if matches!(self.peek(), Token::Ident(_) | Token::Str(_)) {
            name = Some(self.expect_name()?);
        }

        match self.advance().clone() {
            Token::Colon => {
                let rel = self.parse_ref_body(name)?;
                self.db.relationships.push(rel);
            }
            Token::LBrace => {
                while *self.peek() != Token::RBrace {
                    if *self.peek() == Token::Eof {
                        return Err(ParseError::UnexpectedEof);
                    }
                    let rel = self.parse_ref_body(name.clone())?;
                    self.db.relationships.push(rel);
                }
                self.advance();
            }
            Token::Eof => return Err(ParseError::UnexpectedEof),
            tok => return Err(ParseError::Unexpected(tok, ": or {")),
        }
        Ok(())
    }

    fn parse_ref_body(&mut self, name: Option<String>) -> Result<Relationship, ParseError> {
        let left = self.parse_endpoint()?;
        let (kind, swapped) = self.parse_relation_op()?;
        let right = self.parse_endpoint()?;

        // [delete: cascade, update: no action]
        if *self.peek() == Token::LBracket {
            self.skip_settings()?;
        }

        let (from, to) = if swapped { (right, left) } else { (left, right) };
        Ok(Relationship {
            name,
            from,
            to,
            kind,
        })
    }

    /// Index entries marked `pk` promote their columns to primary key.
    fn parse_indexes(&mut self, table: &mut Table) -> Result<(), ParseError> {
        self.expect(Token::LBrace, "{")?;

        while *self.peek() != Token::RBrace {
            let mut columns = Vec::new();
            match self.advance().clone() {
                Token::LParen => loop {
                    match self.advance().clone() {
                        Token::RParen => break,
                        Token::Ident(c) | Token::Str(c) => columns.push(c),
                        Token::Expr(_) | Token::Comma => {}
                        Token::Eof => return Err(ParseError::UnexpectedEof),
                        tok => return Err(ParseError::Unexpected(tok, "index column")),
                    }
                },
                Token::Ident(c) | Token::Str(c) => columns.push(c),
                Token::Expr(_) => {}
                Token::Eof => return Err(ParseError::UnexpectedEof),
                tok => return Err(ParseError::Unexpected(tok, "index definition")),
            }

            let mut is_pk = false;
            if *self.peek() == Token::LBracket {
                self.advance();
                loop {
                    match self.advance().clone() {
                        Token::RBracket => break,
                        Token::Ident(s) if s.eq_ignore_ascii_case("pk") => is_pk = true,
                        Token::Eof => return Err(ParseError::UnexpectedEof),
                        _ => {}
                    }
                }
            }

            if is_pk {
                for column in table
                    .columns
                    .iter_mut()
                    .filter(|c| columns.contains(&c.name))
                {
                    if !column.is_primary_key() {
                        column.settings.push(ColumnSetting::PrimaryKey);
                    }
                }
            }
        }

        self.expect(Token::RBrace, "}")
    }

    fn parse_enum(&mut self) -> Result<(), ParseError> {
        let (schema, name) = self.parse_qualified_name()?;
        self.skip_block()?;
        if schema == DEFAULT_SCHEMA {
            self.db.enums.push(name);
        } else {
            self.db.enums.push(format!("{}.{}", schema, name));
        }
        Ok(())
    }

    /// `Note: 'text'` or `Note { 'text' }`.
    fn parse_note(&mut self) -> Result<Option<String>, ParseError> {
        match self.advance().clone() {
            Token::Colon => match self.advance().clone() {
                Token::Str(s) => Ok(Some(s)),
                tok => Err(ParseError::Unexpected(tok, "note string")),
            },
            Token::LBrace => {
                let mut note = None;
                loop {
                    match self.advance().clone() {
                        Token::RBrace => return Ok(note),
                        Token::Str(s) => note = Some(s),
                        Token::Eof => return Err(ParseError::UnexpectedEof),
                        _ => {}
                    }
                }
            }
            Token::Ident(_) => {
                // named note: Note name { ... }
                self.skip_block()?;
                Ok(None)
            }
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, ": or {")),
        }
    }

    fn skip_until_block(&mut self) -> Result<(), ParseError> {
        while *self.peek() != Token::LBrace {
            if *self.peek() == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            }
            self.advance();
        }
        Ok(())
    }

    fn skip_block(&mut self) -> Result<(), ParseError> {
        self.expect(Token::LBrace, "{")?;
        let mut depth = 1;
        while depth > 0 {
            match self.advance() {
                Token::LBrace => depth += 1,
                Token::RBrace => depth -= 1,
                Token::Eof => return Err(ParseError::UnexpectedEof),
                _ => {}
            }
        }
        Ok(())
    }
}
