use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::source::{SourceError, SourceUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Added,
    Removed,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElementKind {
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeChange {
    pub element: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub action: ChangeAction,
    pub detail: String,
}

impl CodeChange {
    fn field(name: &str, action: ChangeAction, detail: String) -> Self {
        Self {
            element: name.to_string(),
            kind: ElementKind::Field,
            action,
            detail,
        }
    }
}

/// Name to declared type. A repeated name keeps its first slot, the last type wins.
pub fn extract_fields(unit: &SourceUnit) -> IndexMap<String, String> {
    let mut fields = IndexMap::with_capacity(unit.fields.len());
    for decl in &unit.fields {
        fields.insert(decl.name.clone(), decl.typ.clone());
    }
    fields
}

pub fn compare_units(old: &SourceUnit, new: &SourceUnit) -> Vec<CodeChange> {
    let old = extract_fields(old);
    let new = extract_fields(new);
    let mut changes = Vec::new();

    for (name, typ) in &new {
        match old.get(name) {
            None => changes.push(CodeChange::field(
                name,
                ChangeAction::Added,
                format!("type: {}", typ),
            )),
            Some(prev) if prev != typ => changes.push(CodeChange::field(
                name,
                ChangeAction::Modified,
                format!("changed from {} to {}", prev, typ),
            )),
            Some(_) => {}
        }
    }

    for name in old.keys() {
        if !new.contains_key(name) {
            changes.push(CodeChange::field(
                name,
                ChangeAction::Removed,
                "field removed".to_string(),
            ));
        }
    }

    debug!("{} field changes", changes.len());
    changes
}

/// Parse both sources and diff their fields.
pub fn compare_sources(old: &str, new: &str) -> Result<Vec<CodeChange>, SourceError> {
    let old = SourceUnit::parse(old)?;
    let new = SourceUnit::parse(new)?;
    Ok(compare_units(&old, &new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FieldDecl;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn unit(fields: &[(&str, &str)]) -> SourceUnit {
        SourceUnit::new(
            fields
                .iter()
                .map(|(name, typ)| FieldDecl {
                    name: name.to_string(),
                    typ: typ.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_modified_then_added() {
        let old = unit(&[("count", "int")]);
        let new = unit(&[("count", "long"), ("label", "string")]);
        assert_eq!(
            compare_units(&old, &new),
            vec![
                CodeChange::field("count", ChangeAction::Modified, "changed from int to long".into()),
                CodeChange::field("label", ChangeAction::Added, "type: string".into()),
            ]
        );
    }

    #[test]
    fn test_removed_come_last() {
        let old = unit(&[("a", "int"), ("b", "int"), ("c", "int")]);
        let new = unit(&[("c", "int"), ("d", "int")]);
        let changes = compare_units(&old, &new);
        let summary: Vec<_> = changes
            .iter()
            .map(|c| (c.element.as_str(), c.action))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("d", ChangeAction::Added),
                ("a", ChangeAction::Removed),
                ("b", ChangeAction::Removed),
            ]
        );
        assert_eq!(changes[1].detail, "field removed");
    }

    #[test]
    fn test_partition_excludes_unchanged() {
        let old = unit(&[("id", "Long"), ("name", "String"), ("age", "int"), ("gone", "int")]);
        let new = unit(&[("id", "Long"), ("name", "Text"), ("email", "String"), ("age", "int")]);
        let changes = compare_units(&old, &new);

        let mut seen = HashSet::new();
        for change in &changes {
            assert!(seen.insert(change.element.clone()), "{} reported twice", change.element);
        }
        assert!(!seen.contains("id"));
        assert!(!seen.contains("age"));
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_last_declared_type_wins() {
        let old = unit(&[("x", "int"), ("y", "int"), ("x", "long")]);
        let fields = extract_fields(&old);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(fields["x"], "long");

        let new = unit(&[("x", "long"), ("y", "int")]);
        assert!(compare_units(&old, &new).is_empty());
    }

    #[test]
    fn test_rename_is_remove_plus_add() {
        let old = unit(&[("fullName", "String")]);
        let new = unit(&[("name", "String")]);
        let actions: Vec<_> = compare_units(&old, &new).into_iter().map(|c| c.action).collect();
        assert_eq!(actions, vec![ChangeAction::Added, ChangeAction::Removed]);
    }

    #[test]
    fn test_types_compared_literally() {
        let old = unit(&[("ids", "List<Long>")]);
        let new = unit(&[("ids", "java.util.List<Long>")]);
        let changes = compare_units(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Modified);
    }

    #[test]
    fn test_compare_sources() {
        let old = "class Counter { private int count; }";
        let new = "class Counter { private long count; private String label; }";
        let changes = compare_sources(old, new).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].detail, "changed from int to long");
        assert_eq!(changes[1].element, "label");

        assert!(compare_sources("class A {", new).is_err());
    }

    #[test]
    fn test_modifier_change_inside_annotated_field_is_not_a_change() {
        let old = r#"class Book {
            @JoinTable(name = "book_tag", joinColumns = {@JoinColumn(name = "book_id")})
            private Set<Tag> tags;
        }"#;
        let new = old.replace("private", "protected");
        assert!(compare_sources(old, &new).unwrap().is_empty());

        let retyped = old.replace("Set<Tag>", "List<Tag>");
        let changes = compare_sources(old, &retyped).unwrap();
        assert_eq!(changes[0].detail, "changed from Set<Tag> to List<Tag>");
    }

    #[test]
    fn test_json_shape() {
        let change = CodeChange::field("label", ChangeAction::Added, "type: String".into());
        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            serde_json::json!({
                "element": "label",
                "type": "FIELD",
                "action": "ADDED",
                "detail": "type: String",
            })
        );
    }
}
