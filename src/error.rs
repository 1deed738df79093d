use crate::archive::ArchiveError;
use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::parser::ParseError;
use crate::render::RenderError;
use crate::source::SourceError;
use crate::tree::TreeError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
