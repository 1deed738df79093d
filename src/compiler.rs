use indexmap::IndexSet;
use log::debug;

use crate::ast::{Database, Table};
use crate::model::{Field, GenerationModel, IdInfo};
use crate::naming::{to_camel_case, to_pascal_case};
use crate::resolver::{resolve, ResolveError};
use crate::types::TypeMapper;

pub const DEFAULT_PACKAGE: &str = "com.example.demo";

const LIST_IMPORT: &str = "java.util.List";

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),
    #[error("Table not found: {schema}.{table}")]
    TableNotFound { schema: String, table: String },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Clone)]
pub struct Compiler {
    package_name: String,
    mapper: TypeMapper,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_PACKAGE, TypeMapper::new())
    }
}

impl Compiler {
    pub fn new(package_name: &str, mapper: TypeMapper) -> Self {
        Self {
            package_name: package_name.to_string(),
            mapper,
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn compile(&self, table: &Table, db: &Database) -> Result<GenerationModel, CompileError> {
        let class_name = to_pascal_case(&table.name);

        let id = table.primary_key().map(|col| IdInfo {
            column_name: col.name.clone(),
            field_name: to_camel_case(&col.name),
            target: self.mapper.map(&col.typ),
        });
        let has_increment = table.primary_key().is_some_and(|col| col.is_increment());

        let resolution = resolve(table, db)?;

        let mut imports: IndexSet<String> = IndexSet::new();
        if !resolution.inbound.is_empty() {
            imports.insert(LIST_IMPORT.to_string());
        }

        let mut fields = Vec::new();
        for col in &table.columns {
            if resolution.fk_columns.contains(&col.name) {
                continue;
            }
            let target = self.mapper.map(&col.typ);
            if let Some(hint) = target.import_hint() {
                imports.insert(hint.to_string());
            }
            fields.push(Field {
                column_name: col.name.clone(),
                field_name: to_camel_case(&col.name),
                target,
                is_id: col.is_primary_key(),
            });
        }

        debug!(
            "compiled {}: {} fields, {} many-to-one, {} one-to-many",
            class_name,
            fields.len(),
            resolution.outbound.len(),
            resolution.inbound.len()
        );

        Ok(GenerationModel {
            package_name: self.package_name.clone(),
            table_name: table.name.clone(),
            class_name,
            id,
            has_increment,
            fields,
            many_to_one: resolution.outbound,
            one_to_many: resolution.inbound,
            imports: imports.into_iter().collect(),
        })
    }

    pub fn compile_table(
        &self,
        db: &Database,
        schema: &str,
        name: &str,
    ) -> Result<GenerationModel, CompileError> {
        let table = db
            .schema(schema)
            .ok_or_else(|| CompileError::SchemaNotFound(schema.to_string()))?
            .table(name)
            .ok_or_else(|| CompileError::TableNotFound {
                schema: schema.to_string(),
                table: name.to_string(),
            })?;
        self.compile(table, db)
    }

    /// Models for every table of `schema`, in declaration order.
    pub fn compile_schema(
        &self,
        db: &Database,
        schema: &str,
    ) -> Result<Vec<GenerationModel>, CompileError> {
        let schema = db
            .schema(schema)
            .ok_or_else(|| CompileError::SchemaNotFound(schema.to_string()))?;
        schema.tables.iter().map(|t| self.compile(t, db)).collect()
    }
}
