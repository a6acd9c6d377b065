//! Sequential lesson unlocking
//!
//! The flattened lesson sequence is the canonical unlock order: a lesson is
//! open once the lesson right before it is complete. Nothing here is
//! persisted; lock state is recomputed on every query.

use std::collections::{HashMap, HashSet};

use super::model::{Lesson, LessonId, Roadmap};
use crate::config::MissingLessonPolicy;

/// Navigation direction through the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Ordered lesson ids of one course
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonSequence {
    ids: Vec<LessonId>,
    positions: HashMap<LessonId, usize>,
}

impl LessonSequence {
    /// Build a sequence from ids in order. Repeated ids keep their first position.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<LessonId>,
    {
        let mut sequence = Self::default();
        for id in ids {
            let id = id.into();
            if !sequence.positions.contains_key(&id) {
                sequence.positions.insert(id.clone(), sequence.ids.len());
                sequence.ids.push(id);
            }
        }
        sequence
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Index of a lesson, if it belongs to the course
    pub fn position(&self, lesson_id: &str) -> Option<usize> {
        self.positions.get(lesson_id).copied()
    }

    pub fn contains(&self, lesson_id: &str) -> bool {
        self.positions.contains_key(lesson_id)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// The lesson after or before `lesson_id`
    pub fn adjacent(&self, lesson_id: &str, direction: Direction) -> Option<&str> {
        let index = self.position(lesson_id)?;
        match direction {
            Direction::Next => self.get(index + 1),
            Direction::Prev => index.checked_sub(1).and_then(|i| self.get(i)),
        }
    }
}

/// Flatten a roadmap into its unlock sequence
///
/// Units, chapters, and lessons are visited in array order. Chapters
/// without lessons contribute nothing.
pub fn flatten(roadmap: &Roadmap) -> LessonSequence {
    LessonSequence::new(roadmap.lessons().map(|loc| loc.lesson.id.clone()))
}

/// Whether a lesson is locked, with unknown lessons left open
///
/// The first lesson is never locked. Any other lesson is locked until the
/// lesson right before it is complete.
pub fn is_locked(lesson_id: &str, sequence: &LessonSequence, completed: &HashSet<&str>) -> bool {
    is_locked_with_policy(lesson_id, sequence, completed, MissingLessonPolicy::Unlocked)
}

/// Whether a lesson is locked, with an explicit policy for unknown lessons
pub fn is_locked_with_policy(
    lesson_id: &str,
    sequence: &LessonSequence,
    completed: &HashSet<&str>,
    policy: MissingLessonPolicy,
) -> bool {
    match sequence.position(lesson_id) {
        None => policy == MissingLessonPolicy::Locked,
        Some(0) => false,
        Some(index) => sequence.get(index - 1).is_some_and(|prev| !completed.contains(prev)),
    }
}

/// Positions of completed lessons in the sequence; foreign ids are dropped
pub fn completed_indices<'a, I>(sequence: &LessonSequence, completed: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    completed.into_iter().filter_map(|id| sequence.position(id)).collect()
}

/// The lesson after or before `lesson_id` in document order
pub fn adjacent_lesson<'a>(
    roadmap: &'a Roadmap,
    sequence: &LessonSequence,
    lesson_id: &str,
    direction: Direction,
) -> Option<&'a Lesson> {
    let target = sequence.adjacent(lesson_id, direction)?;
    roadmap.find_lesson(target).map(|loc| loc.lesson)
}
