/// `author_id` -> `authorId`, `Author` -> `author`.
pub fn to_camel_case(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut next_upper = false;

    for c in source.chars() {
        if c == '_' {
            next_upper = true;
        } else if result.is_empty() {
            result.extend(c.to_lowercase());
            next_upper = false;
        } else if next_upper {
            result.extend(c.to_uppercase());
            next_upper = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// `order_item` -> `OrderItem`.
pub fn to_pascal_case(source: &str) -> String {
    capitalize(&to_camel_case(source))
}

/// Association names for the many side: `book` -> `books`.
pub fn pluralize(word: &str) -> String {
    format!("{}s", word)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("author_id"), "authorId");
        assert_eq!(to_camel_case("created_at_utc"), "createdAtUtc");
        assert_eq!(to_camel_case("Author"), "author");
        assert_eq!(to_camel_case("title"), "title");
        assert_eq!(to_camel_case("BookTag"), "bookTag");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("order_item"), "OrderItem");
        assert_eq!(to_pascal_case("book"), "Book");
        assert_eq!(to_pascal_case("BookTag"), "BookTag");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_camel_case(""), "");
        assert_eq!(to_pascal_case(""), "");
        assert_eq!(to_camel_case("_"), "");
        assert_eq!(to_camel_case("_order"), "order");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(&to_camel_case("Book")), "books");
        assert_eq!(pluralize("orderItem"), "orderItems");
    }
}
