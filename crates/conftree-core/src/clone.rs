//! Subtree cloning with reserved-property filtering.
//!
//! Cloning duplicates a source subtree into a destination parent under a
//! new name: the clone gets the source's primary type, every property
//! whose name is not in a reserved namespace, and a recursive copy of
//! every child. Only the top-level clone may be renamed; descendants keep
//! their own names.
//!
//! Reserved namespaces are store-managed metadata (versioning, locking,
//! internal bookkeeping) that must never travel with a clone.

use crate::path::NodePath;
use crate::store::{ConfigStore, StoreError};

/// Predicate for property names that belong to reserved namespaces.
///
/// A property is reserved when its name starts with one of the configured
/// prefixes. The defaults cover the repository-internal (`jcr:`) and
/// CMS-internal (`mgnl:`) namespaces; store implementations may introduce
/// more, so the set is configurable rather than fixed.
#[derive(Debug, Clone)]
pub struct ReservedPrefixes {
    prefixes: Vec<String>,
}

impl ReservedPrefixes {
    /// Build a predicate from an explicit prefix list.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a property name lies in a reserved namespace.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

impl Default for ReservedPrefixes {
    fn default() -> Self {
        Self::new(["jcr:", "mgnl:"])
    }
}

/// Clone the subtree at `source` into `dest_parent` under `new_name`.
///
/// Returns the path of the new top-level node. Fails with
/// [`StoreError::NameConflict`] if `dest_parent` already has a child named
/// `new_name`, and with whatever store error interrupts the walk; the
/// caller's enclosing transaction is responsible for rolling back any
/// partially staged subtree.
pub fn clone_subtree<S: ConfigStore>(
    store: &mut S,
    source: &NodePath,
    dest_parent: &NodePath,
    new_name: &str,
    reserved: &ReservedPrefixes,
) -> Result<NodePath, StoreError> {
    let type_name = store.node_type(source)?;
    let clone = store.add_child(dest_parent, new_name, &type_name)?;

    // Copy non-reserved properties verbatim.
    for (name, value) in store.list_properties(source)? {
        if !reserved.is_reserved(&name) {
            store.set_property(&clone, &name, &value)?;
        }
    }

    // Depth-first over the children; each child keeps its own name.
    for child in store.list_children(source)? {
        clone_subtree(store, &child, &clone, child.name(), reserved)?;
    }

    Ok(clone)
}
