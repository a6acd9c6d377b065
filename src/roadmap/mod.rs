//! Course roadmaps and lesson gating

pub mod locking;
pub mod model;

pub use locking::{Direction, LessonSequence, flatten, is_locked, is_locked_with_policy};
pub use model::{Chapter, Lesson, LessonId, LessonLocation, Roadmap, RoadmapError, Unit};
