use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ast::DEFAULT_SCHEMA;
use crate::compiler::{Compiler, DEFAULT_PACKAGE};
use crate::types::{TargetType, TypeMapper, UnknownTargetType};

pub const DEFAULT_PROJECT_NAME: &str = "PreviewProject";

const SOURCE_ROOT: &str = "src/main/java/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    UnknownTargetType(#[from] UnknownTargetType),
    #[error("package_name must not be empty")]
    EmptyPackage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub package_name: String,
    pub schema: String,
    pub project_name: String,
    /// Schema type name to target type name, e.g. `decimal: BigDecimal`.
    pub type_overrides: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            type_overrides: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package_name.trim().is_empty() {
            return Err(ConfigError::EmptyPackage);
        }
        self.type_mapper()?;
        Ok(())
    }

    pub fn type_mapper(&self) -> Result<TypeMapper, ConfigError> {
        let mut mapper = TypeMapper::new();
        for (schema_type, target) in &self.type_overrides {
            let target: TargetType = target.parse()?;
            mapper = mapper.with_override(schema_type, target);
        }
        Ok(mapper)
    }

    pub fn compiler(&self) -> Result<Compiler, ConfigError> {
        Ok(Compiler::new(&self.package_name, self.type_mapper()?))
    }

    /// `src/main/java/<package as path>/`
    pub fn base_path(&self) -> String {
        format!("{}{}/", SOURCE_ROOT, self.package_name.replace('.', "/"))
    }
}
