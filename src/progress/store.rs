//! Course progress store
//!
//! Reconciles the local cache with the remote store for one course. The
//! local cache is always written through; the remote store is consulted
//! and updated only when an identity is present, and its failures never
//! reach the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use super::state::CompletionState;
use crate::cache::{self, LocalCache};
use crate::config::{Config, MissingLessonPolicy};
use crate::identity::Identity;
use crate::remote::RemoteStore;
use crate::roadmap::{LessonSequence, is_locked_with_policy};

/// Minutes credited per completed lesson unless configured otherwise
pub const DEFAULT_MINUTES_PER_LESSON: u64 = 15;

/// Cache key for a course's completion state
pub fn cache_key(course_id: &str) -> String {
    format!("progress-{}", course_id)
}

/// Completion tracking for one course and identity
pub struct ProgressStore {
    course_id: String,
    identity: Option<Identity>,
    cache: Arc<dyn LocalCache>,
    remote: Arc<dyn RemoteStore>,
    state: CompletionState,
    minutes_per_lesson: u64,
    missing_lesson_policy: MissingLessonPolicy,
}

impl ProgressStore {
    /// Create an anonymous store with default settings. Call [`load`](Self::load) next.
    pub fn new(
        course_id: impl Into<String>,
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteStore>,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            identity: None,
            cache,
            remote,
            state: CompletionState::default(),
            minutes_per_lesson: DEFAULT_MINUTES_PER_LESSON,
            missing_lesson_policy: MissingLessonPolicy::default(),
        }
    }

    /// Apply time and locking settings from configuration
    pub fn with_config(mut self, config: &Config) -> Self {
        self.minutes_per_lesson = config.minutes_per_lesson;
        self.missing_lesson_policy = config.missing_lesson_policy;
        self
    }

    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Switch identity. The caller is expected to reload afterwards.
    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    /// Load state from the local cache, unioned with remote completions
    ///
    /// Last-accessed and time spent come from the local cache only. If the
    /// remote fetch fails the local state is used as is.
    pub async fn load(&mut self) -> &CompletionState {
        let key = cache_key(&self.course_id);
        let mut state: CompletionState = match cache::read_json(self.cache.as_ref(), &key) {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to read cached progress for {}: {:#}", self.course_id, e);
                CompletionState::default()
            }
        };
        state.dedup();

        if let Some(identity) = &self.identity {
            match self.remote.completed_lessons(identity).await {
                Ok(remote) => {
                    let added = state.merge_completed(&remote);
                    debug!(
                        "Merged {} remote completions into {} ({} new)",
                        remote.len(),
                        self.course_id,
                        added
                    );
                }
                Err(e) => {
                    warn!("Progress sync failed for {}, using local data: {}", self.course_id, e)
                }
            }
        }

        self.state = state;
        &self.state
    }

    /// Mark a lesson complete
    ///
    /// Returns false (and does nothing) if the lesson was already complete.
    /// The local mutation stands even if the remote write fails.
    pub async fn mark_complete(&mut self, lesson_id: &str) -> bool {
        if !self.state.insert(lesson_id) {
            return false;
        }
        self.state.total_time_spent += self.minutes_per_lesson;
        self.persist();

        if let Some(identity) = &self.identity {
            if let Err(e) =
                self.remote.mark_lesson_complete(identity, lesson_id, &self.course_id).await
            {
                warn!("Failed to save completion of {} remotely: {}", lesson_id, e);
            }
        }

        true
    }

    /// Record the lesson most recently opened. Local only.
    pub fn update_last_accessed(&mut self, lesson_id: &str) {
        self.state.last_accessed_lesson = Some(lesson_id.to_string());
        self.persist();
    }

    pub fn is_complete(&self, lesson_id: &str) -> bool {
        self.state.is_complete(lesson_id)
    }

    /// Whether `lesson_id` is gated behind an incomplete predecessor
    pub fn is_locked(&self, lesson_id: &str, sequence: &LessonSequence) -> bool {
        is_locked_with_policy(
            lesson_id,
            sequence,
            &self.state.completed_set(),
            self.missing_lesson_policy,
        )
    }

    pub fn completion_percent(&self, sequence: &LessonSequence) -> u8 {
        self.state.completion_percent(sequence)
    }

    fn persist(&self) {
        cache::write_json(self.cache.as_ref(), &cache_key(&self.course_id), &self.state);
    }
}
