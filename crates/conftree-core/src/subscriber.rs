//! Subscriber management on top of the config store.
//!
//! Subscribers are named nodes under a fixed base path, each cloned from a
//! deployment-configured template subtree. Two properties carry the
//! activation semantics: `URL` (target of the subscriber) and `active`
//! (`"true"`/`"false"` as strings).
//!
//! Per subscriber name the manager runs a small state machine
//! `{absent, inactive, active}`:
//! - create-or-update on an absent name deactivates the template, clones
//!   it under the requested name, activates the clone and sets its URL
//! - create-or-update on an existing name just updates URL and reactivates
//! - bulk deactivate flips every child of the base path to inactive
//!
//! Every operation stages its mutations in one transaction and commits at
//! the end; any failure rolls the whole request back.

use crate::clone::{clone_subtree, ReservedPrefixes};
use crate::path::NodePath;
use crate::store::{ConfigStore, StoreError, Transaction};

/// Property holding the subscriber's target URL.
pub const PROP_URL: &str = "URL";

/// Property holding the activation state, as a boolean-valued string.
pub const PROP_ACTIVE: &str = "active";

const ACTIVE: &str = "true";
const INACTIVE: &str = "false";

/// Errors surfaced by subscriber operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubscriberError {
    /// The base path or the template path does not exist.
    #[error("not found: {0}")]
    NotFound(NodePath),
    /// Lost a creation race: another writer created the subscriber after
    /// the existence check. Callers should retry as an update.
    #[error("subscriber {0} already exists")]
    NameConflict(String),
    /// Any underlying store failure; nothing was committed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a successful create-or-update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberOutcome {
    /// A new subscriber node was cloned from the template.
    Created,
    /// An existing subscriber node was updated and reactivated.
    Updated,
}

/// Orchestrates subscriber creation, update and bulk deactivation.
#[derive(Debug, Clone)]
pub struct SubscriberManager {
    base_path: NodePath,
    template_path: NodePath,
    reserved: ReservedPrefixes,
}

impl SubscriberManager {
    /// Create a manager for subscribers under `base_path`, cloned from the
    /// template node named `template_name` under that same base path.
    pub fn new(base_path: NodePath, template_name: &str) -> Self {
        let template_path = base_path.join(template_name);
        Self {
            base_path,
            template_path,
            reserved: ReservedPrefixes::default(),
        }
    }

    /// Override the reserved-prefix predicate used while cloning.
    pub fn with_reserved(mut self, reserved: ReservedPrefixes) -> Self {
        self.reserved = reserved;
        self
    }

    /// The base path all subscribers live under.
    pub fn base_path(&self) -> &NodePath {
        &self.base_path
    }

    /// The path of the template node.
    pub fn template_path(&self) -> &NodePath {
        &self.template_path
    }

    /// Create a subscriber named `name` with the given URL, or update an
    /// existing one. Either way the subscriber ends up active with `URL`
    /// set to `url`, and all staged writes are committed atomically.
    pub fn create_or_update<S: ConfigStore>(
        &self,
        store: &mut S,
        name: &str,
        url: &str,
    ) -> Result<SubscriberOutcome, SubscriberError> {
        if name.is_empty() || name.contains('/') {
            return Err(StoreError::InvalidName(name.to_string()).into());
        }

        let mut txn = Transaction::new(store);

        if !txn.exists(&self.base_path) {
            return Err(SubscriberError::NotFound(self.base_path.clone()));
        }
        if !txn.exists(&self.template_path) {
            return Err(SubscriberError::NotFound(self.template_path.clone()));
        }

        let subscriber = self.base_path.join(name);
        let outcome = if txn.exists(&subscriber) {
            txn.set_property(&subscriber, PROP_URL, url)?;
            activate(&mut *txn, &subscriber)?;
            SubscriberOutcome::Updated
        } else {
            // The template's active flag doubles as "last cloned"
            // bookkeeping; it is flipped off on every creation.
            deactivate(&mut *txn, &self.template_path)?;

            let clone = match clone_subtree(
                &mut *txn,
                &self.template_path,
                &self.base_path,
                name,
                &self.reserved,
            ) {
                Ok(path) => path,
                Err(StoreError::NameConflict { .. }) => {
                    return Err(SubscriberError::NameConflict(name.to_string()));
                }
                Err(e) => return Err(e.into()),
            };

            activate(&mut *txn, &clone)?;
            txn.set_property(&clone, PROP_URL, url)?;
            SubscriberOutcome::Created
        };

        txn.commit()?;
        Ok(outcome)
    }

    /// Set `active = "false"` on every child of the base path, the
    /// template included. Idempotent; commits all writes atomically and
    /// returns the number of nodes touched.
    pub fn deactivate_all<S: ConfigStore>(
        &self,
        store: &mut S,
    ) -> Result<usize, SubscriberError> {
        let mut txn = Transaction::new(store);

        let subscribers = txn.list_children(&self.base_path)?;
        for subscriber in &subscribers {
            deactivate(&mut *txn, subscriber)?;
        }

        txn.commit()?;
        Ok(subscribers.len())
    }
}

fn activate<S: ConfigStore>(store: &mut S, path: &NodePath) -> Result<(), StoreError> {
    store.set_property(path, PROP_ACTIVE, ACTIVE)
}

fn deactivate<S: ConfigStore>(store: &mut S, path: &NodePath) -> Result<(), StoreError> {
    store.set_property(path, PROP_ACTIVE, INACTIVE)
}
