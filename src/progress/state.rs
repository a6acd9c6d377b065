//! Completion state for one course

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::roadmap::{LessonId, LessonSequence};

/// Completion data for a single course
///
/// `completed_lessons` keeps insertion order and never holds duplicates.
/// Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionState {
    /// Completed lesson ids, in completion order
    #[serde(default)]
    completed_lessons: Vec<LessonId>,

    /// Lesson most recently opened
    #[serde(default)]
    pub last_accessed_lesson: Option<LessonId>,

    /// Total time spent, in minutes
    #[serde(default)]
    pub total_time_spent: u64,
}

impl CompletionState {
    pub fn completed_lessons(&self) -> &[LessonId] {
        &self.completed_lessons
    }

    pub fn is_complete(&self, lesson_id: &str) -> bool {
        self.completed_lessons.iter().any(|id| id == lesson_id)
    }

    /// Add a lesson; returns false if it was already complete
    pub fn insert(&mut self, lesson_id: &str) -> bool {
        if self.is_complete(lesson_id) {
            return false;
        }
        self.completed_lessons.push(lesson_id.to_string());
        true
    }

    /// Union in lessons from another source, keeping existing order first
    pub fn merge_completed<I, S>(&mut self, lesson_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lesson_ids.into_iter().filter(|id| self.insert(id.as_ref())).count()
    }

    /// Drop duplicate entries a hand-edited cache file may contain
    pub(crate) fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.completed_lessons.retain(|id| seen.insert(id.clone()));
    }

    /// Completed ids as a set, for lock queries
    pub fn completed_set(&self) -> HashSet<&str> {
        self.completed_lessons.iter().map(String::as_str).collect()
    }

    /// Percentage of `sequence` that is complete, rounded half up
    ///
    /// Only lessons belonging to the sequence count; an empty sequence is 0%.
    pub fn completion_percent(&self, sequence: &LessonSequence) -> u8 {
        if sequence.is_empty() {
            return 0;
        }
        let done = self.completed_lessons.iter().filter(|id| sequence.contains(id)).count();
        let total = sequence.len();
        ((200 * done + total) / (2 * total)) as u8
    }
}
