use serde::Serialize;

pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Database {
    pub project: Option<String>,
    pub schemas: Vec<Schema>,
    pub relationships: Vec<Relationship>,
    pub enums: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub name: String,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub alias: Option<String>,
    pub columns: Vec<Column>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub typ: String,
    pub settings: Vec<ColumnSetting>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnSetting {
    PrimaryKey,
    Increment,
    NotNull,
    Null,
    Unique,
    Default(String),
    Note(String),
}

/// One endpoint of a relationship, always a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    pub schema: String,
    pub table: String,
    pub column: String,
}

/// Relationship kind after normalisation: `a < b` is stored as `b > a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationKind {
    ManyToOne,  // > and <
    OneToOne,   // -
    ManyToMany, // <>
}

/// A foreign-key edge. `from` is the referencing side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub name: Option<String>,
    pub from: ColumnRef,
    pub to: ColumnRef,
    pub kind: RelationKind,
}

impl Database {
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.schema(schema)?.table(name)
    }

    /// Table an endpoint points at. Unqualified names fall back to aliases in any schema.
    pub fn referenced_table(&self, r: &ColumnRef) -> Option<&Table> {
        self.table(&r.schema, &r.table).or_else(|| {
            if r.schema != DEFAULT_SCHEMA {
                return None;
            }
            self.tables()
                .find(|t| t.alias.as_deref() == Some(r.table.as_str()))
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.schemas.iter().flat_map(|s| s.tables.iter())
    }

    /// Schema for `name`, created on first use. Keeps declaration order.
    pub fn schema_mut(&mut self, name: &str) -> &mut Schema {
        let pos = match self.schemas.iter().position(|s| s.name == name) {
            Some(pos) => pos,
            None => {
                self.schemas.push(Schema {
                    name: name.to_string(),
                    tables: Vec::new(),
                });
                self.schemas.len() - 1
            }
        };
        &mut self.schemas[pos]
    }
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name || t.alias.as_deref() == Some(name))
    }
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_primary_key())
    }
}

impl Column {
    pub fn has(&self, setting: &ColumnSetting) -> bool {
        self.settings.contains(setting)
    }

    pub fn is_primary_key(&self) -> bool {
        self.has(&ColumnSetting::PrimaryKey)
    }

    pub fn is_increment(&self) -> bool {
        self.has(&ColumnSetting::Increment)
    }
}

impl ColumnRef {
    pub fn new(schema: &str, table: &str, column: &str) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.schema, self.table, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Table {
        Table {
            schema: DEFAULT_SCHEMA.into(),
            name: "book".into(),
            alias: Some("B".into()),
            columns: vec![
                Column {
                    name: "id".into(),
                    typ: "int".into(),
                    settings: vec![ColumnSetting::PrimaryKey, ColumnSetting::Increment],
                },
                Column {
                    name: "title".into(),
                    typ: "varchar".into(),
                    settings: vec![],
                },
            ],
            note: None,
        }
    }

    #[test]
    fn test_primary_key_lookup() {
        let table = book();
        let pk = table.primary_key().unwrap();
        assert_eq!(pk.name, "id");
        assert!(pk.is_increment());
        assert!(table.column("title").is_some());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_referenced_table_by_name_or_alias() {
        let mut db = Database::default();
        db.schema_mut("public").tables.push(book());
        let mut orders = book();
        orders.schema = "shop".into();
        orders.name = "orders".into();
        orders.alias = Some("O".into());
        db.schema_mut("shop").tables.push(orders);

        let name = |r: &ColumnRef| db.referenced_table(r).map(|t| t.name.as_str());
        assert_eq!(name(&ColumnRef::new("public", "book", "id")), Some("book"));
        assert_eq!(name(&ColumnRef::new("public", "B", "id")), Some("book"));
        assert_eq!(name(&ColumnRef::new("shop", "O", "id")), Some("orders"));
        // aliases are global, an unqualified one may live in any schema
        assert_eq!(name(&ColumnRef::new("public", "O", "id")), Some("orders"));
        assert_eq!(name(&ColumnRef::new("public", "orders", "id")), None);
        assert_eq!(name(&ColumnRef::new("other", "book", "id")), None);
    }

    #[test]
    fn test_schema_mut_keeps_order() {
        let mut db = Database::default();
        db.schema_mut("public").tables.push(book());
        db.schema_mut("audit");
        db.schema_mut("public");
        assert_eq!(db.schemas.len(), 2);
        assert_eq!(db.schemas[0].name, "public");
        assert!(db.table("public", "book").is_some());
        assert!(db.table("audit", "book").is_none());
    }
}
