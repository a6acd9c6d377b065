//! Lesson completion tracking
//!
//! This module owns per-course completion state and the rules for merging
//! the local cache with the remote store.

pub mod state;
pub mod store;

// Re-exports
pub use state::CompletionState;
pub use store::ProgressStore;
