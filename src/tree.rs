use crate::changeset::FileChange;
use serde::Serialize;
use thiserror::Error;

/// node of the change tree shown for a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Folder {
        name: String,
        children: Vec<TreeNode>,
    },
    File {
        name: String,
        change: FileChange,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("'{path}' conflicts with '{conflict}': a path cannot be both a file and a folder")]
    PathConflict { path: String, conflict: String },

    #[error("'{path}' appears more than once")]
    DuplicatePath { path: String },

    #[error("'{path}' contains an empty path segment")]
    EmptySegment { path: String },
}

impl TreeNode {
    pub fn folder(name: impl Into<String>) -> Self {
        Self::Folder {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// every file leaf below this node, in display order
    pub fn files(&self) -> Vec<&FileChange> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files<'a>(&'a self, files: &mut Vec<&'a FileChange>) {
        match self {
            Self::File { change, .. } => files.push(change),
            Self::Folder { children, .. } => {
                for child in children {
                    child.collect_files(files);
                }
            }
        }
    }
}

/// build the compressed change tree for a list of files
///
/// the root is a folder named after the workspace, siblings keep the order in
/// which their first file appeared
pub fn build_tree(workspace_name: &str, files: &[FileChange]) -> Result<TreeNode, TreeError> {
    let mut root = TreeNode::folder(workspace_name);
    if let TreeNode::Folder { children, .. } = &mut root {
        for file in files {
            insert(children, file)?;
        }
    }
    compress(&mut root);
    Ok(root)
}

fn insert(root_children: &mut Vec<TreeNode>, file: &FileChange) -> Result<(), TreeError> {
    let segments: Vec<&str> = file.path.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(TreeError::EmptySegment {
            path: file.path.clone(),
        });
    }
    let Some((file_name, folders)) = segments.split_last() else {
        return Err(TreeError::EmptySegment {
            path: file.path.clone(),
        });
    };

    let mut children = root_children;
    for segment in folders {
        let index = match children.iter().position(|node| node.name() == *segment) {
            Some(index) => index,
            None => {
                children.push(TreeNode::folder(*segment));
                children.len() - 1
            }
        };
        children = match &mut children[index] {
            TreeNode::Folder { children, .. } => children,
            TreeNode::File { change, .. } => {
                return Err(TreeError::PathConflict {
                    path: file.path.clone(),
                    conflict: change.path.clone(),
                });
            }
        };
    }

    if let Some(existing) = children.iter().find(|node| node.name() == *file_name) {
        return Err(leaf_conflict(existing, file));
    }

    children.push(TreeNode::File {
        name: (*file_name).to_string(),
        change: file.clone(),
    });
    Ok(())
}

fn leaf_conflict(existing: &TreeNode, file: &FileChange) -> TreeError {
    match existing {
        TreeNode::File { change, .. } if change.path == file.path => TreeError::DuplicatePath {
            path: file.path.clone(),
        },
        TreeNode::File { change, .. } => TreeError::PathConflict {
            path: file.path.clone(),
            conflict: change.path.clone(),
        },
        TreeNode::Folder { .. } => TreeError::PathConflict {
            path: file.path.clone(),
            conflict: existing
                .files()
                .first()
                .map_or_else(|| file.path.clone(), |change| change.path.clone()),
        },
    }
}

/// collapse single-folder chains below `root` into `parent/child` folders
///
/// the root keeps its own name, and a folder holding a single file is left alone
pub fn compress(root: &mut TreeNode) {
    if let TreeNode::Folder { children, .. } = root {
        for child in children {
            compress_folder(child);
        }
    }
}

fn compress_folder(node: &mut TreeNode) {
    let TreeNode::Folder { name, children } = node else {
        return;
    };

    // children first, so a compressed child never has a lone folder child itself
    for child in children.iter_mut() {
        compress_folder(child);
    }

    if matches!(children.as_slice(), [TreeNode::Folder { .. }])
        && let Some(TreeNode::Folder {
            name: child_name,
            children: grandchildren,
        }) = children.pop()
    {
        *name = format!("{name}/{child_name}");
        *children = grandchildren;
    }
}
