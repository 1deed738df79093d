use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Java primitive wrappers and value types a column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    String,
    Integer,
    Long,
    Double,
    Boolean,
    LocalDate,
    LocalDateTime,
    BigDecimal,
    Uuid,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown target type: {0}")]
pub struct UnknownTargetType(pub String);

impl TargetType {
    pub fn java_name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::LocalDate => "LocalDate",
            Self::LocalDateTime => "LocalDateTime",
            Self::BigDecimal => "BigDecimal",
            Self::Uuid => "UUID",
        }
    }

    /// Import a generated unit needs to use this type.
    pub fn import_hint(self) -> Option<&'static str> {
        match self {
            Self::LocalDate => Some("java.time.LocalDate"),
            Self::LocalDateTime => Some("java.time.LocalDateTime"),
            Self::BigDecimal => Some("java.math.BigDecimal"),
            Self::Uuid => Some("java.util.UUID"),
            _ => None,
        }
    }
}

impl FromStr for TargetType {
    type Err = UnknownTargetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(Self::String),
            "Integer" => Ok(Self::Integer),
            "Long" => Ok(Self::Long),
            "Double" => Ok(Self::Double),
            "Boolean" => Ok(Self::Boolean),
            "LocalDate" => Ok(Self::LocalDate),
            "LocalDateTime" => Ok(Self::LocalDateTime),
            "BigDecimal" => Ok(Self::BigDecimal),
            "UUID" => Ok(Self::Uuid),
            _ => Err(UnknownTargetType(s.to_string())),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.java_name())
    }
}

impl Serialize for TargetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.java_name())
    }
}

/// Case-insensitive lookup with optional per-type overrides.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    overrides: HashMap<String, TargetType>,
}

impl TypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, schema_type: &str, target: TargetType) -> Self {
        self.overrides.insert(schema_type.to_lowercase(), target);
        self
    }

    pub fn map(&self, schema_type: &str) -> TargetType {
        let lower = schema_type.to_lowercase();
        if let Some(target) = self.overrides.get(&lower) {
            return *target;
        }
        map_default(&lower)
    }
}

fn map_default(lower: &str) -> TargetType {
    match lower {
        "varchar" => TargetType::String,
        "int" => TargetType::Integer,
        "boolean" => TargetType::Boolean,
        "datetime" => TargetType::LocalDateTime,
        // Unknown types stay strings
        _ => TargetType::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let mapper = TypeMapper::new();
        assert_eq!(mapper.map("varchar"), TargetType::String);
        assert_eq!(mapper.map("INT"), TargetType::Integer);
        assert_eq!(mapper.map("Boolean"), TargetType::Boolean);
        assert_eq!(mapper.map("DATETIME"), TargetType::LocalDateTime);
    }

    #[test]
    fn test_unknown_falls_back_to_string() {
        let mapper = TypeMapper::new();
        assert_eq!(mapper.map("decimal(10,2)"), TargetType::String);
        assert_eq!(mapper.map("bigint"), TargetType::String);
        assert_eq!(mapper.map("varchar(255)"), TargetType::String);
        assert_eq!(mapper.map(""), TargetType::String);
    }

    #[test]
    fn test_overrides() {
        let mapper = TypeMapper::new()
            .with_override("DECIMAL", TargetType::BigDecimal)
            .with_override("int", TargetType::Long);
        assert_eq!(mapper.map("decimal"), TargetType::BigDecimal);
        assert_eq!(mapper.map("INT"), TargetType::Long);
        assert_eq!(mapper.map("varchar"), TargetType::String);
    }

    #[test]
    fn test_target_names() {
        assert_eq!("BigDecimal".parse::<TargetType>().unwrap(), TargetType::BigDecimal);
        assert_eq!(TargetType::Uuid.to_string(), "UUID");
        assert!("bigdecimal".parse::<TargetType>().is_err());
        assert_eq!(TargetType::Integer.import_hint(), None);
        assert_eq!(
            TargetType::LocalDateTime.import_hint(),
            Some("java.time.LocalDateTime")
        );
    }
}
