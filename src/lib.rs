pub mod archive;
pub mod ast;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod diff;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod model;
pub mod naming;
pub mod parser;
pub mod render;
pub mod resolver;
pub mod source;
pub mod tree;
pub mod types;

use wasm_bindgen::prelude::*;

use config::GeneratorConfig;
use parser::{extract_fenced_dbml, parse_dbml};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Preview the project generated from DBML source as a JSON tree
#[wasm_bindgen(js_name = "previewProject")]
pub fn preview_project(source: &str, project_name: Option<String>) -> Result<String, String> {
    let db = parse_dbml(extract_fenced_dbml(source)).map_err(|e| e.to_string())?;
    let config = GeneratorConfig::default();
    let project = project_name.as_deref().unwrap_or(&config.project_name);

    let tree = generator::preview_project(&db, &config, project).map_err(|e| e.to_string())?;
    serde_json::to_string(&tree).map_err(|e| e.to_string())
}

/// Field changes between two source units as JSON
#[wasm_bindgen(js_name = "compareSources")]
pub fn compare_sources(old: &str, new: &str) -> Result<String, String> {
    let changes = diff::compare_sources(old, new).map_err(|e| e.to_string())?;
    serde_json::to_string(&changes).map_err(|e| e.to_string())
}

/// Tree of an uploaded zip archive as JSON
#[wasm_bindgen(js_name = "archiveTree")]
pub fn archive_tree(bytes: &js_sys::Uint8Array, project_name: &str) -> Result<String, String> {
    let tree = tree::build_tree_from_archive(&bytes.to_vec(), project_name).map_err(|e| e.to_string())?;
    serde_json::to_string(&tree).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_project_json() {
        let json = preview_project("```dbml\nTable user { id int [pk] }\n```", None).unwrap();
        let tree: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(tree["name"], "PreviewProject");
        assert_eq!(tree["type"], "folder");
        assert_eq!(tree["children"][0]["name"], "src");
    }

    #[test]
    fn test_errors_are_strings() {
        assert!(preview_project("Table {", Some("X".into())).is_err());
        assert!(compare_sources("class A {", "class A {}").is_err());
    }

    #[test]
    fn test_compare_sources_json() {
        let json = compare_sources("class A { int n; }", "class A { long n; }").unwrap();
        assert!(json.contains("\"action\":\"MODIFIED\""));
    }
}
