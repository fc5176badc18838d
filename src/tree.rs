/*!
 * Folder tree for one course
 *
 * Folders arrive as a flat listing where each entry points at its parent.
 * `FolderTree` keeps them in an arena indexed by folder id and resolves a
 * folder to its root-first chain of names.
 */

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Result, SyncError};
use crate::types::{FolderEntry, FolderId};
use crate::utils::sanitize_segment;

/// Name the remote gives every course's root folder
pub const FILES_ROOT_MARKER: &str = "course files";

/// One folder within a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    /// Folder identifier
    pub id: FolderId,
    /// Name used as a path segment
    pub name: String,
    /// Enclosing folder, `None` for the root
    pub parent: Option<FolderId>,
}

/// Arena of a course's folders
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    nodes: Vec<FolderNode>,
    index: HashMap<FolderId, usize>,
}

impl FolderTree {
    /// Build the tree from a complete folder listing.
    ///
    /// Folders named after the generic files root take the course code instead,
    /// so resolved paths start with the course rather than the placeholder.
    pub fn build(entries: impl IntoIterator<Item = FolderEntry>, course_code: &str) -> Self {
        let mut tree = Self::default();

        for entry in entries {
            let name = if entry.name == FILES_ROOT_MARKER {
                course_code.to_string()
            } else {
                entry.name
            };

            let node = FolderNode {
                id: entry.id,
                name: sanitize_segment(&name),
                parent: entry.parent_folder_id,
            };

            // A repeated id replaces the earlier entry
            match tree.index.get(&node.id) {
                Some(&slot) => tree.nodes[slot] = node,
                None => {
                    tree.index.insert(node.id, tree.nodes.len());
                    tree.nodes.push(node);
                }
            }
        }

        tree
    }

    /// Look up a folder by id
    pub fn get(&self, id: FolderId) -> Option<&FolderNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Number of folders in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no folders
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Names from the root down to `id`, inclusive.
    ///
    /// Fails with `UnknownFolder` if `id` or any ancestor is missing, and with
    /// `FolderCycle` if the walk takes more steps than there are folders.
    pub fn path_of(&self, id: FolderId) -> Result<Vec<&str>> {
        let mut segments = Vec::new();
        let mut current = Some(id);

        while let Some(folder_id) = current {
            let node = self
                .get(folder_id)
                .ok_or(SyncError::UnknownFolder(folder_id))?;
            if segments.len() == self.nodes.len() {
                return Err(SyncError::FolderCycle(folder_id));
            }
            segments.push(node.name.as_str());
            current = node.parent;
        }

        segments.reverse();
        Ok(segments)
    }

    /// Relative directory for files in folder `id`
    pub fn relative_dir(&self, id: FolderId) -> Result<PathBuf> {
        Ok(self.path_of(id)?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: FolderId, name: &str, parent: Option<FolderId>) -> FolderEntry {
        FolderEntry {
            id,
            name: name.to_string(),
            parent_folder_id: parent,
        }
    }

    fn chain() -> FolderTree {
        FolderTree::build(
            vec![
                folder(1, FILES_ROOT_MARKER, None),
                folder(2, "A", Some(1)),
                folder(3, "B", Some(2)),
                folder(4, "C", Some(3)),
            ],
            "CS101",
        )
    }

    #[test]
    fn test_path_of_nested_chain() {
        let tree = chain();
        assert_eq!(tree.path_of(4).unwrap(), vec!["CS101", "A", "B", "C"]);
        assert_eq!(tree.path_of(1).unwrap(), vec!["CS101"]);
        assert_eq!(
            tree.relative_dir(3).unwrap(),
            PathBuf::from("CS101").join("A").join("B")
        );
    }

    #[test]
    fn test_root_marker_renamed() {
        let tree = chain();
        assert_eq!(tree.get(1).unwrap().name, "CS101");
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_listing_order_does_not_matter() {
        let tree = FolderTree::build(
            vec![
                folder(4, "C", Some(3)),
                folder(2, "A", Some(1)),
                folder(1, FILES_ROOT_MARKER, None),
                folder(3, "B", Some(2)),
            ],
            "MATH2",
        );
        assert_eq!(tree.path_of(4).unwrap(), vec!["MATH2", "A", "B", "C"]);
    }

    #[test]
    fn test_unknown_folder() {
        let tree = chain();
        assert!(matches!(tree.path_of(99), Err(SyncError::UnknownFolder(99))));
    }

    #[test]
    fn test_dangling_parent() {
        let tree = FolderTree::build(vec![folder(5, "orphan", Some(42))], "X");
        assert!(matches!(tree.path_of(5), Err(SyncError::UnknownFolder(42))));
    }

    #[test]
    fn test_cycle_is_reported() {
        let tree = FolderTree::build(
            vec![folder(1, "a", Some(2)), folder(2, "b", Some(1))],
            "X",
        );
        assert!(matches!(tree.path_of(1), Err(SyncError::FolderCycle(_))));
    }

    #[test]
    fn test_unsafe_names_are_sanitized() {
        let tree = FolderTree::build(
            vec![folder(1, FILES_ROOT_MARKER, None), folder(2, "..", Some(1))],
            "X",
        );
        assert_eq!(tree.path_of(2).unwrap(), vec!["X", "_"]);
    }

    #[test]
    fn test_empty_tree() {
        let tree = FolderTree::default();
        assert!(tree.is_empty());
        assert!(matches!(tree.path_of(1), Err(SyncError::UnknownFolder(1))));
    }
}
