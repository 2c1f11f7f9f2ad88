//! Package tree grouping entities for display.
//!
//! [`PackageNode`] is one folder of the tree and [`PackageTree`] manages the
//! hierarchy. The tree plays no part in graph topology; entities keep a
//! back-reference to their package so the workspace can answer scheme and
//! read-only questions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{EntityId, Iri, PackageId};

/// A folder in the package tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageNode {
    pub id: PackageId,
    /// Display name per language code.
    pub labels: BTreeMap<String, String>,
    /// `None` for the root.
    pub parent: Option<PackageId>,
    pub children: Vec<PackageId>,
    /// Entities filed under this package, in insertion order.
    pub elements: Vec<EntityId>,
    /// Vocabulary scheme this package mirrors, if any.
    pub scheme: Option<Iri>,
    /// Packages mirroring imported vocabularies cannot be edited.
    pub read_only: bool,
}

/// Manages the package hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageTree {
    nodes: BTreeMap<PackageId, PackageNode>,
    root: PackageId,
    next_id: u32,
}

impl Default for PackageTree {
    fn default() -> Self {
        PackageTree::new()
    }
}

impl PackageTree {
    /// Creates a tree containing only the writable root package.
    pub fn new() -> Self {
        let root = PackageId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            PackageNode {
                id: root,
                labels: BTreeMap::new(),
                parent: None,
                children: Vec::new(),
                elements: Vec::new(),
                scheme: None,
                read_only: false,
            },
        );
        PackageTree {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub fn root_id(&self) -> PackageId {
        self.root
    }

    /// Creates a child package under `parent`.
    ///
    /// Returns [`CoreError::PackageNotFound`] if the parent does not exist.
    pub fn add_package(
        &mut self,
        parent: PackageId,
        labels: BTreeMap<String, String>,
        scheme: Option<Iri>,
        read_only: bool,
    ) -> Result<PackageId, CoreError> {
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(CoreError::PackageNotFound { id: parent })?;

        let id = PackageId(self.next_id);
        self.next_id += 1;
        parent_node.children.push(id);

        self.nodes.insert(
            id,
            PackageNode {
                id,
                labels,
                parent: Some(parent),
                children: Vec::new(),
                elements: Vec::new(),
                scheme,
                read_only,
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: PackageId) -> Option<&PackageNode> {
        self.nodes.get(&id)
    }

    /// Files `entity` under `package`, keeping the element list free of duplicates.
    pub fn add_element(&mut self, package: PackageId, entity: EntityId) -> Result<(), CoreError> {
        let node = self
            .nodes
            .get_mut(&package)
            .ok_or(CoreError::PackageNotFound { id: package })?;
        if !node.elements.contains(&entity) {
            node.elements.push(entity);
        }
        Ok(())
    }

    pub fn remove_element(&mut self, package: PackageId, entity: EntityId) -> Result<(), CoreError> {
        let node = self
            .nodes
            .get_mut(&package)
            .ok_or(CoreError::PackageNotFound { id: package })?;
        node.elements.retain(|e| *e != entity);
        Ok(())
    }

    /// Nearest scheme on the path from `package` to the root.
    pub fn scheme_of(&self, package: PackageId) -> Option<&Iri> {
        let mut current = self.nodes.get(&package);
        while let Some(node) = current {
            if let Some(scheme) = &node.scheme {
                return Some(scheme);
            }
            current = node.parent.and_then(|p| self.nodes.get(&p));
        }
        None
    }

    /// A package is read-only when it or any ancestor is.
    pub fn is_read_only(&self, package: PackageId) -> bool {
        let mut current = self.nodes.get(&package);
        while let Some(node) = current {
            if node.read_only {
                return true;
            }
            current = node.parent.and_then(|p| self.nodes.get(&p));
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tree_has_writable_root() {
        let tree = PackageTree::new();
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_read_only(tree.root_id()));
        assert!(tree.scheme_of(tree.root_id()).is_none());
    }

    #[test]
    fn scheme_and_read_only_are_inherited() {
        let mut tree = PackageTree::new();
        let root = tree.root_id();
        let vocab = tree
            .add_package(root, BTreeMap::new(), Some(Iri::from("urn:scheme")), true)
            .unwrap();
        let nested = tree.add_package(vocab, BTreeMap::new(), None, false).unwrap();

        assert_eq!(tree.scheme_of(nested), Some(&Iri::from("urn:scheme")));
        assert!(tree.is_read_only(nested));
        assert_eq!(tree.get(vocab).unwrap().children, vec![nested]);
    }

    #[test]
    fn add_package_unknown_parent_errors() {
        let mut tree = PackageTree::new();
        let result = tree.add_package(PackageId(99), BTreeMap::new(), None, false);
        assert_eq!(result, Err(CoreError::PackageNotFound { id: PackageId(99) }));
    }

    #[test]
    fn elements_are_deduplicated() {
        let mut tree = PackageTree::new();
        let root = tree.root_id();
        tree.add_element(root, EntityId(1)).unwrap();
        tree.add_element(root, EntityId(1)).unwrap();
        assert_eq!(tree.get(root).unwrap().elements, vec![EntityId(1)]);
        tree.remove_element(root, EntityId(1)).unwrap();
        assert!(tree.get(root).unwrap().elements.is_empty());
    }
}
