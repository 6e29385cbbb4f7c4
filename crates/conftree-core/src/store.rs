//! Config store abstraction and in-memory implementation.
//!
//! The store is a tree of typed nodes addressed by absolute [`NodePath`]s.
//! Each node carries a primary type name, string-valued properties and an
//! ordered set of named children. Mutations are staged against a working
//! tree and become durable only on [`ConfigStore::commit`]; a session
//! observes its own staged writes before committing.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use crate::path::NodePath;

/// Errors surfaced by store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The addressed node does not exist.
    #[error("no such node: {0}")]
    NoSuchNode(String),
    /// A sibling with the requested name already exists.
    #[error("node {name} already exists under {parent}")]
    NameConflict { parent: String, name: String },
    /// The node name is not a valid single path segment.
    #[error("invalid node name: {0:?}")]
    InvalidName(String),
    /// Underlying storage failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Trait for hierarchical config storage implementations.
///
/// Nodes are referenced by path. All writes are staged; `commit` applies
/// everything staged since the last commit atomically, `rollback` discards
/// it. Implementations must let reads observe staged writes so that a
/// sequence of operations within one logical request sees its own effects.
pub trait ConfigStore {
    /// Check whether a node exists at the given path.
    fn exists(&self, path: &NodePath) -> bool;

    /// Get the primary type name of the node at the given path.
    fn node_type(&self, path: &NodePath) -> Result<String, StoreError>;

    /// Create a new child node under `parent` with the given type.
    ///
    /// Fails with [`StoreError::NameConflict`] if a sibling of that name
    /// already exists at the point of invocation (staged or committed).
    fn add_child(
        &mut self,
        parent: &NodePath,
        name: &str,
        type_name: &str,
    ) -> Result<NodePath, StoreError>;

    /// Set a property on the node at the given path, replacing any
    /// existing value.
    fn set_property(&mut self, path: &NodePath, name: &str, value: &str)
        -> Result<(), StoreError>;

    /// Read a property from the node at the given path.
    fn get_property(&self, path: &NodePath, name: &str) -> Result<Option<String>, StoreError>;

    /// List the children of the node at the given path, in insertion order.
    fn list_children(&self, path: &NodePath) -> Result<Vec<NodePath>, StoreError>;

    /// List the properties of the node at the given path.
    fn list_properties(&self, path: &NodePath) -> Result<Vec<(String, String)>, StoreError>;

    /// Durably apply all staged mutations since the last commit, atomically.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard all staged mutations since the last commit.
    fn rollback(&mut self);
}

/// A node in the in-memory tree.
#[derive(Debug, Clone)]
struct NodeData {
    type_name: String,
    properties: BTreeMap<String, String>,
    /// Ordered named children; insertion order is the child order.
    children: Vec<(String, NodeData)>,
}

impl NodeData {
    fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    fn child(&self, name: &str) -> Option<&NodeData> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut NodeData> {
        self.children
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }
}

/// In-memory transactional store implementation.
///
/// Holds two trees: the committed state and a working copy. All reads and
/// writes go to the working copy; `commit` publishes it as the committed
/// state, `rollback` resets the working copy from the committed state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    committed: NodeData,
    working: NodeData,
}

impl MemoryStore {
    /// Create a new store with an empty root node of the given type.
    pub fn new(root_type: &str) -> Self {
        let root = NodeData::new(root_type);
        Self {
            committed: root.clone(),
            working: root,
        }
    }

    /// True if there are staged, uncommitted mutations.
    pub fn has_pending_changes(&self) -> bool {
        // Structural comparison; the trees are small config subtrees.
        !trees_equal(&self.committed, &self.working)
    }

    fn node(&self, path: &NodePath) -> Option<&NodeData> {
        let mut current = &self.working;
        for segment in path.segments() {
            current = current.child(segment)?;
        }
        Some(current)
    }

    fn node_mut(&mut self, path: &NodePath) -> Option<&mut NodeData> {
        let mut current = &mut self.working;
        for segment in path.segments() {
            current = current.child_mut(segment)?;
        }
        Some(current)
    }

    fn require(&self, path: &NodePath) -> Result<&NodeData, StoreError> {
        self.node(path)
            .ok_or_else(|| StoreError::NoSuchNode(path.to_string()))
    }

    fn require_mut(&mut self, path: &NodePath) -> Result<&mut NodeData, StoreError> {
        let missing = StoreError::NoSuchNode(path.to_string());
        self.node_mut(path).ok_or(missing)
    }
}

fn trees_equal(a: &NodeData, b: &NodeData) -> bool {
    if a.type_name != b.type_name || a.properties != b.properties {
        return false;
    }
    if a.children.len() != b.children.len() {
        return false;
    }
    a.children
        .iter()
        .zip(b.children.iter())
        .all(|((an, ac), (bn, bc))| an == bn && trees_equal(ac, bc))
}

impl ConfigStore for MemoryStore {
    fn exists(&self, path: &NodePath) -> bool {
        self.node(path).is_some()
    }

    fn node_type(&self, path: &NodePath) -> Result<String, StoreError> {
        Ok(self.require(path)?.type_name.clone())
    }

    fn add_child(
        &mut self,
        parent: &NodePath,
        name: &str,
        type_name: &str,
    ) -> Result<NodePath, StoreError> {
        if name.is_empty() || name.contains('/') {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        let parent_node = self.require_mut(parent)?;
        if parent_node.child(name).is_some() {
            return Err(StoreError::NameConflict {
                parent: parent.to_string(),
                name: name.to_string(),
            });
        }

        parent_node
            .children
            .push((name.to_string(), NodeData::new(type_name)));
        Ok(parent.join(name))
    }

    fn set_property(
        &mut self,
        path: &NodePath,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let node = self.require_mut(path)?;
        node.properties.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn get_property(&self, path: &NodePath, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.require(path)?.properties.get(name).cloned())
    }

    fn list_children(&self, path: &NodePath) -> Result<Vec<NodePath>, StoreError> {
        let node = self.require(path)?;
        Ok(node
            .children
            .iter()
            .map(|(name, _)| path.join(name))
            .collect())
    }

    fn list_properties(&self, path: &NodePath) -> Result<Vec<(String, String)>, StoreError> {
        let node = self.require(path)?;
        Ok(node
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.committed = self.working.clone();
        Ok(())
    }

    fn rollback(&mut self) {
        self.working = self.committed.clone();
    }
}

/// Scoped transaction over a config store.
///
/// Wraps a mutable store borrow for the duration of one logical request.
/// Dropping the guard without calling [`Transaction::commit`] rolls the
/// store back to its last committed state, so every early-exit path (`?`
/// included) discards staged mutations.
pub struct Transaction<'a, S: ConfigStore> {
    store: &'a mut S,
    committed: bool,
}

impl<'a, S: ConfigStore> Transaction<'a, S> {
    /// Begin a transaction on the given store.
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            committed: false,
        }
    }

    /// Commit all staged mutations. Consumes the guard; if the underlying
    /// commit fails, the guard's drop rolls the store back.
    pub fn commit(mut self) -> Result<(), StoreError> {
        self.store.commit()?;
        self.committed = true;
        Ok(())
    }
}

impl<'a, S: ConfigStore> Deref for Transaction<'a, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<'a, S: ConfigStore> DerefMut for Transaction<'a, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<'a, S: ConfigStore> Drop for Transaction<'a, S> {
    fn drop(&mut self) {
        if !self.committed {
            self.store.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(s: &str) -> NodePath {
        NodePath::new(s).unwrap()
    }

    #[test]
    fn test_new_store_root() {
        let store = MemoryStore::new("rep:root");
        assert!(store.exists(&NodePath::root()));
        assert_eq!(store.node_type(&NodePath::root()).unwrap(), "rep:root");
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_add_child_and_properties() {
        let mut store = MemoryStore::new("rep:root");
        let server = store
            .add_child(&NodePath::root(), "server", "mgnl:content")
            .unwrap();
        assert_eq!(server.as_str(), "/server");

        store.set_property(&server, "URL", "https://example.com").unwrap();
        assert_eq!(
            store.get_property(&server, "URL").unwrap(),
            Some("https://example.com".to_string())
        );
        assert_eq!(store.get_property(&server, "missing").unwrap(), None);
    }

    #[test]
    fn test_add_child_conflict() {
        let mut store = MemoryStore::new("rep:root");
        store
            .add_child(&NodePath::root(), "server", "mgnl:content")
            .unwrap();
        let err = store
            .add_child(&NodePath::root(), "server", "mgnl:content")
            .unwrap_err();
        assert!(matches!(err, StoreError::NameConflict { .. }));
    }

    #[test]
    fn test_add_child_invalid_name() {
        let mut store = MemoryStore::new("rep:root");
        assert!(matches!(
            store.add_child(&NodePath::root(), "", "mgnl:content"),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.add_child(&NodePath::root(), "a/b", "mgnl:content"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_missing_node_errors() {
        let mut store = MemoryStore::new("rep:root");
        let missing = path("/nope");
        assert!(!store.exists(&missing));
        assert!(matches!(
            store.node_type(&missing),
            Err(StoreError::NoSuchNode(_))
        ));
        assert!(matches!(
            store.set_property(&missing, "k", "v"),
            Err(StoreError::NoSuchNode(_))
        ));
        assert!(matches!(
            store.list_children(&missing),
            Err(StoreError::NoSuchNode(_))
        ));
    }

    #[test]
    fn test_children_insertion_order() {
        let mut store = MemoryStore::new("rep:root");
        store.add_child(&NodePath::root(), "zeta", "mgnl:content").unwrap();
        store.add_child(&NodePath::root(), "alpha", "mgnl:content").unwrap();
        store.add_child(&NodePath::root(), "mid", "mgnl:content").unwrap();

        let names: Vec<String> = store
            .list_children(&NodePath::root())
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_staged_writes_visible_before_commit() {
        let mut store = MemoryStore::new("rep:root");
        store.add_child(&NodePath::root(), "server", "mgnl:content").unwrap();
        // Visible to this session even though nothing is committed yet.
        assert!(store.exists(&path("/server")));
        assert!(store.has_pending_changes());
    }

    #[test]
    fn test_rollback_discards_staged_writes() {
        let mut store = MemoryStore::new("rep:root");
        store.add_child(&NodePath::root(), "server", "mgnl:content").unwrap();
        store.commit().unwrap();

        store.add_child(&path("/server"), "temp", "mgnl:content").unwrap();
        store.set_property(&path("/server"), "k", "v").unwrap();
        store.rollback();

        assert!(store.exists(&path("/server")));
        assert!(!store.exists(&path("/server/temp")));
        assert_eq!(store.get_property(&path("/server"), "k").unwrap(), None);
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_commit_persists_across_rollback() {
        let mut store = MemoryStore::new("rep:root");
        store.add_child(&NodePath::root(), "server", "mgnl:content").unwrap();
        store.set_property(&path("/server"), "k", "v").unwrap();
        store.commit().unwrap();

        store.rollback();
        assert_eq!(
            store.get_property(&path("/server"), "k").unwrap(),
            Some("v".to_string())
        );
    }

    #[test]
    fn test_transaction_commit() {
        let mut store = MemoryStore::new("rep:root");
        {
            let mut txn = Transaction::new(&mut store);
            txn.add_child(&NodePath::root(), "server", "mgnl:content").unwrap();
            txn.commit().unwrap();
        }
        assert!(store.exists(&path("/server")));
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_transaction_drop_rolls_back() {
        let mut store = MemoryStore::new("rep:root");
        {
            let mut txn = Transaction::new(&mut store);
            txn.add_child(&NodePath::root(), "server", "mgnl:content").unwrap();
            // dropped without commit
        }
        assert!(!store.exists(&path("/server")));
    }
}
