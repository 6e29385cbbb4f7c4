//! # conftree-core
//!
//! Core model and logic for the subscriber activation service.
//!
//! This crate provides:
//! - Node path parsing for the hierarchical config store
//! - The store abstraction and an in-memory transactional implementation
//! - The subtree cloner with reserved-property filtering
//! - The subscriber manager (create-or-update, bulk deactivate)
//! - Settings types shared with the server binary
//!
//! This crate is intentionally runtime-agnostic and contains no async code;
//! the HTTP layer (`conftree-web`) and the server binary wrap it.

pub mod clone;
pub mod config;
pub mod path;
pub mod store;
pub mod subscriber;

pub use clone::{clone_subtree, ReservedPrefixes};
pub use config::{ServerSettings, Settings, SubscriberSettings};
pub use path::{NodePath, PathError};
pub use store::{ConfigStore, MemoryStore, StoreError, Transaction};
pub use subscriber::{SubscriberError, SubscriberManager, SubscriberOutcome};
