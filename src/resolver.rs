use indexmap::IndexSet;

use crate::ast::{ColumnRef, Database, Table};
use crate::model::{ManyToOne, OneToMany};
use crate::naming::{pluralize, to_camel_case, to_pascal_case};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Relationship endpoint {0} does not resolve to a column")]
    UnknownColumn(ColumnRef),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    pub outbound: Vec<ManyToOne>,
    pub inbound: Vec<OneToMany>,
    /// Columns consumed by `outbound`, in relationship order.
    pub fk_columns: IndexSet<String>,
}

/// Walk every relationship of `db` and keep those with an endpoint in `table`.
///
/// The global list is scanned on every call so the output order always
/// follows relationship declaration order. Any endpoint that does not name
/// an existing column fails the whole resolution.
pub fn resolve(table: &Table, db: &Database) -> Result<Resolution, ResolveError> {
    let mut resolution = Resolution::default();

    for rel in &db.relationships {
        let from_table = endpoint_table(db, &rel.from)?;
        let to_table = endpoint_table(db, &rel.to)?;

        if same_table(from_table, table) {
            resolution.fk_columns.insert(rel.from.column.clone());
            resolution.outbound.push(ManyToOne {
                join_column: rel.from.column.clone(),
                target_class: to_pascal_case(&to_table.name),
                field_name: to_camel_case(&to_table.name),
            });
        }

        if same_table(to_table, table) {
            resolution.inbound.push(OneToMany {
                target_class: to_pascal_case(&from_table.name),
                field_name: pluralize(&to_camel_case(&from_table.name)),
                mapped_by: to_camel_case(&to_table.name),
            });
        }
    }

    Ok(resolution)
}

fn endpoint_table<'a>(db: &'a Database, r: &ColumnRef) -> Result<&'a Table, ResolveError> {
    db.referenced_table(r)
        .filter(|t| t.column(&r.column).is_some())
        .ok_or_else(|| ResolveError::UnknownColumn(r.clone()))
}

fn same_table(a: &Table, b: &Table) -> bool {
    a.schema == b.schema && a.name == b.name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_dbml;

    const LIBRARY: &str = r#"
        Table Book {
            id int [pk]
            title varchar
            author_id int
        }
        Table Author {
            id int [pk]
            name varchar
        }
        Ref: Book.author_id > Author.id
    "#;

    #[test]
    fn test_outbound_and_inbound() {
        let db = parse_dbml(LIBRARY).unwrap();

        let book = resolve(db.table("public", "Book").unwrap(), &db).unwrap();
        assert_eq!(
            book.outbound,
            vec![ManyToOne {
                join_column: "author_id".into(),
                target_class: "Author".into(),
                field_name: "author".into(),
            }]
        );
        assert!(book.inbound.is_empty());
        assert!(book.fk_columns.contains("author_id"));

        let author = resolve(db.table("public", "Author").unwrap(), &db).unwrap();
        assert!(author.outbound.is_empty());
        assert_eq!(
            author.inbound,
            vec![OneToMany {
                target_class: "Book".into(),
                field_name: "books".into(),
                mapped_by: "author".into(),
            }]
        );
    }

    #[test]
    fn test_self_relationship_yields_both_sides() {
        let db = parse_dbml(
            r#"
            Table employee {
                id int [pk]
                manager_id int [ref: > employee.id]
            }
            "#,
        )
        .unwrap();
        let res = resolve(db.table("public", "employee").unwrap(), &db).unwrap();
        assert_eq!(res.outbound.len(), 1);
        assert_eq!(res.inbound.len(), 1);
        assert_eq!(res.outbound[0].target_class, "Employee");
        assert_eq!(res.inbound[0].field_name, "employees");
        assert_eq!(res.inbound[0].mapped_by, "employee");
    }

    #[test]
    fn test_order_follows_relationship_list() {
        let db = parse_dbml(
            r#"
            Table user { id int [pk] }
            Table tag { id int [pk] }
            Table post {
                id int [pk]
                tag_id int
                user_id int
            }
            Ref: post.tag_id > tag.id
            Ref: post.user_id > user.id
            "#,
        )
        .unwrap();
        let res = resolve(db.table("public", "post").unwrap(), &db).unwrap();
        let targets: Vec<_> = res.outbound.iter().map(|m| m.target_class.as_str()).collect();
        assert_eq!(targets, vec!["Tag", "User"]);
        let fks: Vec<_> = res.fk_columns.iter().map(String::as_str).collect();
        assert_eq!(fks, vec!["tag_id", "user_id"]);
    }

    #[test]
    fn test_unknown_endpoint_fails_fast() {
        let db = parse_dbml(
            r#"
            Table a { id int [pk] }
            Table b { id int [pk] a_id int }
            Ref: b.a_id > a.missing
            "#,
        )
        .unwrap();
        let err = resolve(db.table("public", "a").unwrap(), &db).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnknownColumn(ref r) if r.column == "missing"
        ));
    }

    #[test]
    fn test_alias_in_other_schema() {
        let db = parse_dbml(
            r#"
            Table shop.orders as O {
                id int [pk]
                user_id int
            }
            Table users { id int [pk] }
            Ref: O.user_id > users.id
            "#,
        )
        .unwrap();
        let orders = resolve(db.table("shop", "orders").unwrap(), &db).unwrap();
        assert_eq!(orders.outbound.len(), 1);
        assert_eq!(orders.outbound[0].target_class, "Users");
        assert!(orders.fk_columns.contains("user_id"));

        let users = resolve(db.table("public", "users").unwrap(), &db).unwrap();
        assert_eq!(users.inbound[0].target_class, "Orders");
    }

    #[test]
    fn test_unknown_table_fails_fast() {
        let db = parse_dbml(
            r#"
            Table a { id int [pk] }
            Ref: a.id > ghost.id
            "#,
        )
        .unwrap();
        assert!(resolve(db.table("public", "a").unwrap(), &db).is_err());
    }
}
