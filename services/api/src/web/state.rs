//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use seminar_core::ports::{CredentialHasher, KeyValueStore};
use seminar_core::{AccountDirectory, ClassRegistry, TopicAssigner};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub accounts: AccountDirectory,
    pub classes: ClassRegistry,
    pub assigner: TopicAssigner,
}

impl AppState {
    /// Wires every core service to the same store.
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn KeyValueStore>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            config,
            accounts: AccountDirectory::new(store.clone(), hasher),
            classes: ClassRegistry::new(store.clone()),
            assigner: TopicAssigner::new(store),
        }
    }
}
