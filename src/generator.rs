use log::info;

use crate::archive::write_archive;
use crate::ast::Database;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::render::{GeneratedFile, JavaRenderer, Renderer};
use crate::tree::{build_tree, build_tree_from_archive, FileNode};

/// Every artifact of the configured schema, paths prefixed with the base package path.
pub fn generate_source_files(db: &Database, config: &GeneratorConfig) -> Result<Vec<GeneratedFile>> {
    let compiler = config.compiler()?;
    let models = compiler.compile_schema(db, &config.schema)?;
    let base = config.base_path();
    let renderer = JavaRenderer;

    let mut files = Vec::with_capacity(models.len() * 4);
    for model in &models {
        for file in renderer.render(model)? {
            files.push(GeneratedFile {
                path: format!("{}{}", base, file.path),
                content: file.content,
            });
        }
    }

    info!(
        "generated {} files for {} tables in schema {}",
        files.len(),
        models.len(),
        config.schema
    );
    Ok(files)
}

pub fn generate_project_zip(db: &Database, config: &GeneratorConfig) -> Result<Vec<u8>> {
    let files = generate_source_files(db, config)?;
    Ok(write_archive(&files, "")?)
}

/// Tree of the generated project without going through an archive.
pub fn preview_project(db: &Database, config: &GeneratorConfig, project_name: &str) -> Result<FileNode> {
    let nodes = generate_source_files(db, config)?
        .into_iter()
        .map(|file| FileNode::file(&file.path, file.content))
        .collect();
    Ok(build_tree(nodes, project_name)?)
}

/// Tree of the generated project, packed and read back.
pub fn preview_project_archive(
    db: &Database,
    config: &GeneratorConfig,
    project_name: &str,
) -> Result<FileNode> {
    let bytes = generate_project_zip(db, config)?;
    Ok(build_tree_from_archive(&bytes, project_name)?)
}
