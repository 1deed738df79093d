use serde::Serialize;

use crate::types::TargetType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationModel {
    pub package_name: String,
    pub table_name: String,
    pub class_name: String,
    /// Absent when the table declares no primary key.
    pub id: Option<IdInfo>,
    pub has_increment: bool,
    /// Plain columns. Foreign-key columns appear in `many_to_one` instead.
    pub fields: Vec<Field>,
    pub many_to_one: Vec<ManyToOne>,
    pub one_to_many: Vec<OneToMany>,
    /// Fully qualified imports, first occurrence order.
    pub imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdInfo {
    pub column_name: String,
    pub field_name: String,
    pub target: TargetType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub column_name: String,
    pub field_name: String,
    pub target: TargetType,
    pub is_id: bool,
}

/// Outbound reference held by the foreign-key side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManyToOne {
    pub join_column: String,
    pub target_class: String,
    pub field_name: String,
}

/// Inverse side of a `ManyToOne` declared on another table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneToMany {
    pub target_class: String,
    pub field_name: String,
    pub mapped_by: String,
}

impl GenerationModel {
    pub fn id_type(&self) -> Option<TargetType> {
        self.id.as_ref().map(|id| id.target)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field_name.as_str())
    }
}
