use indexmap::IndexMap;
use log::debug;
use serde::{Serialize, Serializer};

use crate::archive::{read_text_entries, ArchiveError};

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("'{path}' is a file but is used as a folder")]
    FileAsFolder { path: String },
    #[error("'{path}' is a folder but is supplied as a file")]
    FolderAsFile { path: String },
    #[error("duplicate file '{path}'")]
    DuplicateFile { path: String },
    #[error("'{path}' is not a file node")]
    NotAFile { path: String },
    #[error("file path has no segments")]
    EmptyPath,
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Xml,
    Sql,
    Yaml,
    Json,
    Text,
}

impl Language {
    pub fn detect(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".java") {
            Self::Java
        } else if lower.ends_with(".xml") {
            Self::Xml
        } else if lower.ends_with(".sql") {
            Self::Sql
        } else if lower.ends_with(".yml") || lower.ends_with(".yaml") {
            Self::Yaml
        } else if lower.ends_with(".json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(serialize_with = "serialize_children")]
    children: IndexMap<String, FileNode>,
}

fn serialize_children<S: Serializer>(
    children: &IndexMap<String, FileNode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(children.values())
}

impl FileNode {
    pub fn folder(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Folder,
            path: path.to_string(),
            content: None,
            language: None,
            children: IndexMap::new(),
        }
    }

    /// File node named after the last segment of `path`.
    pub fn file(path: &str, content: String) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        Self {
            name: name.to_string(),
            kind: NodeKind::File,
            path: path.to_string(),
            content: Some(content),
            language: Some(Language::detect(name)),
            children: IndexMap::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn children(&self) -> impl Iterator<Item = &FileNode> {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&FileNode> {
        self.children.get(name)
    }

    /// Every file below this node, depth first in insertion order.
    pub fn files(&self) -> Vec<&FileNode> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileNode>) {
        for child in self.children.values() {
            match child.kind {
                NodeKind::File => out.push(child),
                NodeKind::Folder => child.collect_files(out),
            }
        }
    }

    /// Place `file` under this folder following its relative path.
    ///
    /// Missing folders are created with paths rooted at this node's path.
    /// The file itself is stored as given.
    fn insert(&mut self, file: FileNode) -> Result<(), TreeError> {
        if file.kind != NodeKind::File {
            return Err(TreeError::NotAFile { path: file.path });
        }

        let segments: Vec<String> = file
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let Some((last, dirs)) = segments.split_last() else {
            return Err(TreeError::EmptyPath);
        };

        let mut current = self;
        let mut current_path = current.path.clone();
        for dir in dirs {
            current_path.push('/');
            current_path.push_str(dir);
            let child = current
                .children
                .entry(dir.clone())
                .or_insert_with(|| FileNode::folder(dir, &current_path));
            if child.kind == NodeKind::File {
                return Err(TreeError::FileAsFolder { path: current_path });
            }
            current = child;
        }

        if let Some(existing) = current.children.get(last) {
            let path = format!("{}/{}", current_path, last);
            return Err(match existing.kind {
                NodeKind::Folder => TreeError::FolderAsFile { path },
                NodeKind::File => TreeError::DuplicateFile { path },
            });
        }
        current.children.insert(last.clone(), file);
        Ok(())
    }
}

/// Build a tree rooted at a folder named `project_name`.
///
/// Files are inserted in the order given; folders keep first-seen order.
pub fn build_tree(files: Vec<FileNode>, project_name: &str) -> Result<FileNode, TreeError> {
    let mut root = FileNode::folder(project_name, project_name);
    for file in files {
        root.insert(file)?;
    }
    Ok(root)
}

/// Build a tree from the file entries of a zip archive.
pub fn build_tree_from_archive(bytes: &[u8], project_name: &str) -> Result<FileNode, TreeError> {
    let files: Vec<FileNode> = read_text_entries(bytes)?
        .into_iter()
        .map(|entry| FileNode::file(&entry.name, entry.content))
        .collect();
    debug!("building tree for {} from {} archive entries", project_name, files.len());
    build_tree(files, project_name)
}
