//! Roadmap content model
//!
//! A roadmap is the hierarchical course tree: units contain chapters,
//! chapters contain lessons. Course generators emit two shapes of JSON:
//!
//! - `units[].chapters[].lessons[]`, the canonical tree
//! - `modules[].lessons[]`, the generator's flat module list
//!
//! Both are normalized here into one validated [`Roadmap`], so nothing past
//! ingestion deals with missing fields.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a lesson, unique within one course
pub type LessonId = String;

/// Duration shown for generator lessons that carry none
const DEFAULT_LESSON_DURATION: &str = "10 min";

/// Why a roadmap was rejected at ingestion
#[derive(Debug, Error)]
pub enum RoadmapError {
    /// Payload is not valid JSON or has the wrong field types
    #[error("Roadmap JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Neither `units` nor `modules` is present
    #[error("Roadmap has neither units nor modules")]
    MissingContent,

    /// A lesson has no usable id
    #[error("Lesson {index} in chapter {chapter:?} has no id")]
    MissingLessonId {
        /// Chapter title
        chapter: String,
        /// Position of the lesson in its chapter
        index: usize,
    },

    /// Two lessons share an id
    #[error("Duplicate lesson id: {0}")]
    DuplicateLessonId(LessonId),
}

/// A validated course roadmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roadmap {
    pub title: String,
    pub units: Vec<Unit>,
}

/// A top-level unit of a roadmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub title: String,
    pub chapters: Vec<Chapter>,
}

/// A chapter within a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub description: String,
    pub lessons: Vec<Lesson>,
}

/// A single lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub description: String,
    /// Display duration, e.g. "10 min"
    pub duration: String,
    /// Video backing the lesson, if any
    pub video_id: Option<String>,
}

impl Lesson {
    pub fn new(id: impl Into<LessonId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            duration: DEFAULT_LESSON_DURATION.to_string(),
            video_id: None,
        }
    }
}

/// Where a lesson sits in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonLocation<'a> {
    pub lesson: &'a Lesson,
    pub chapter_title: &'a str,
}

impl Roadmap {
    /// Parse and normalize roadmap JSON in either upstream shape
    pub fn from_json_str(json: &str) -> Result<Self, RoadmapError> {
        let raw: RawRoadmap = serde_json::from_str(json)?;
        raw.normalize()
    }

    /// Normalize an already-parsed JSON value
    pub fn from_json(value: serde_json::Value) -> Result<Self, RoadmapError> {
        let raw: RawRoadmap = serde_json::from_value(value)?;
        raw.normalize()
    }

    /// Every lesson in document order
    pub fn lessons(&self) -> impl Iterator<Item = LessonLocation<'_>> {
        self.units.iter().flat_map(|unit| {
            unit.chapters.iter().flat_map(|chapter| {
                chapter
                    .lessons
                    .iter()
                    .map(|lesson| LessonLocation { lesson, chapter_title: &chapter.title })
            })
        })
    }

    /// Find a lesson and its chapter by id
    pub fn find_lesson(&self, lesson_id: &str) -> Option<LessonLocation<'_>> {
        self.lessons().find(|loc| loc.lesson.id == lesson_id)
    }

    /// Total lesson count across all units
    pub fn lesson_count(&self) -> usize {
        self.units.iter().flat_map(|u| &u.chapters).map(|c| c.lessons.len()).sum()
    }

    /// Check the tree invariants: non-empty and unique lesson ids
    fn validate(self) -> Result<Self, RoadmapError> {
        let mut seen = HashSet::new();
        for chapter in self.units.iter().flat_map(|u| &u.chapters) {
            for (index, lesson) in chapter.lessons.iter().enumerate() {
                if lesson.id.trim().is_empty() {
                    return Err(RoadmapError::MissingLessonId {
                        chapter: chapter.title.clone(),
                        index,
                    });
                }
                if !seen.insert(lesson.id.as_str()) {
                    return Err(RoadmapError::DuplicateLessonId(lesson.id.clone()));
                }
            }
        }
        Ok(self)
    }
}

// Upstream shapes. Every field is optional; casing variants are aliased.

#[derive(Debug, Deserialize)]
struct RawRoadmap {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    units: Option<Vec<RawUnit>>,
    #[serde(default)]
    modules: Option<Vec<RawModule>>,
}

#[derive(Debug, Deserialize)]
struct RawUnit {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    chapters: Vec<RawChapter>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    lessons: Option<Vec<RawLesson>>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    lessons: Vec<RawLesson>,
}

#[derive(Debug, Deserialize)]
struct RawLesson {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default, alias = "videoId")]
    video_id: Option<String>,
    #[serde(default)]
    video: Option<RawVideo>,
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    #[serde(default, alias = "videoId")]
    video_id: Option<String>,
}

impl RawLesson {
    fn into_lesson(self, id: LessonId) -> Lesson {
        let video_id = self.video.and_then(|v| v.video_id).or(self.video_id);
        Lesson {
            id,
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            duration: self.duration.unwrap_or_else(|| DEFAULT_LESSON_DURATION.to_string()),
            video_id,
        }
    }
}

impl RawRoadmap {
    fn normalize(self) -> Result<Roadmap, RoadmapError> {
        let title = self.title.unwrap_or_default();

        let units = match (self.units, self.modules) {
            (Some(units), _) => units.into_iter().enumerate().map(normalize_unit).collect(),
            (None, Some(modules)) => vec![adapt_modules(modules)],
            (None, None) => return Err(RoadmapError::MissingContent),
        };

        Roadmap { title, units }.validate()
    }
}

fn normalize_unit((u_idx, unit): (usize, RawUnit)) -> Unit {
    let chapters = unit
        .chapters
        .into_iter()
        .enumerate()
        .map(|(c_idx, chapter)| Chapter {
            id: chapter.id.unwrap_or_else(|| format!("chapter-{}-{}", u_idx, c_idx)),
            title: chapter.title.unwrap_or_default(),
            description: chapter.description.unwrap_or_default(),
            lessons: chapter
                .lessons
                .unwrap_or_default()
                .into_iter()
                .map(|lesson| {
                    let id = lesson.id.clone().unwrap_or_default();
                    lesson.into_lesson(id)
                })
                .collect(),
        })
        .collect();

    Unit {
        id: unit.id.unwrap_or_else(|| format!("unit-{}", u_idx + 1)),
        title: unit.title.unwrap_or_default(),
        chapters,
    }
}

/// Wrap generator modules in a single unit, assigning stable ids
fn adapt_modules(modules: Vec<RawModule>) -> Unit {
    let chapters = modules
        .into_iter()
        .enumerate()
        .map(|(m_idx, module)| Chapter {
            id: format!("chapter-{}", m_idx),
            title: module.title.unwrap_or_default(),
            description: module.description.unwrap_or_default(),
            lessons: module
                .lessons
                .into_iter()
                .enumerate()
                .map(|(l_idx, lesson)| lesson.into_lesson(format!("lesson-{}-{}", m_idx, l_idx)))
                .collect(),
        })
        .collect();

    Unit { id: "unit-1".to_string(), title: "Core Curriculum".to_string(), chapters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_units_shape() {
        let roadmap = Roadmap::from_json(json!({
            "title": "Rust",
            "units": [{
                "id": "u1",
                "title": "Basics",
                "chapters": [
                    {"id": "c1", "title": "Ownership", "lessons": [
                        {"id": "l1", "title": "Moves", "videoId": "abc"},
                        {"id": "l2", "title": "Borrows"}
                    ]},
                    {"id": "c2", "title": "Empty"}
                ]
            }]
        }))
        .unwrap();

        assert_eq!(roadmap.title, "Rust");
        assert_eq!(roadmap.lesson_count(), 2);
        let first = &roadmap.units[0].chapters[0].lessons[0];
        assert_eq!(first.video_id.as_deref(), Some("abc"));
        assert_eq!(first.duration, "10 min");
        assert!(roadmap.units[0].chapters[1].lessons.is_empty());
    }

    #[test]
    fn adapts_modules_shape() {
        let roadmap = Roadmap::from_json(json!({
            "title": "Web",
            "modules": [
                {"title": "HTML", "lessons": [
                    {"title": "Tags", "duration": "5 min", "video": {"video_id": "v1"}},
                    {"title": "Forms", "video_id": "v2"}
                ]},
                {"title": "CSS", "lessons": [{"title": "Selectors"}]}
            ]
        }))
        .unwrap();

        assert_eq!(roadmap.units.len(), 1);
        let unit = &roadmap.units[0];
        assert_eq!(unit.id, "unit-1");
        assert_eq!(unit.title, "Core Curriculum");
        assert_eq!(unit.chapters[1].id, "chapter-1");

        let ids: Vec<_> = roadmap.lessons().map(|l| l.lesson.id.as_str()).collect();
        assert_eq!(ids, vec!["lesson-0-0", "lesson-0-1", "lesson-1-0"]);

        let tags = &unit.chapters[0].lessons[0];
        assert_eq!(tags.duration, "5 min");
        assert_eq!(tags.video_id.as_deref(), Some("v1"));
        assert_eq!(unit.chapters[0].lessons[1].video_id.as_deref(), Some("v2"));
    }

    #[test]
    fn units_take_precedence_over_modules() {
        let roadmap = Roadmap::from_json(json!({
            "units": [{"chapters": [{"lessons": [{"id": "a", "title": "A"}]}]}],
            "modules": [{"title": "ignored", "lessons": [{"title": "X"}]}]
        }))
        .unwrap();

        assert_eq!(roadmap.lesson_count(), 1);
        assert_eq!(roadmap.units[0].id, "unit-1");
    }

    #[test]
    fn rejects_missing_content() {
        let err = Roadmap::from_json(json!({"title": "Nothing"})).unwrap_err();
        assert!(matches!(err, RoadmapError::MissingContent));
    }

    #[test]
    fn rejects_lesson_without_id() {
        let err = Roadmap::from_json(json!({
            "units": [{"chapters": [{"title": "Intro", "lessons": [{"title": "No id"}]}]}]
        }))
        .unwrap_err();
        assert!(matches!(err, RoadmapError::MissingLessonId { index: 0, .. }));
    }

    #[test]
    fn rejects_duplicate_lesson_ids() {
        let err = Roadmap::from_json(json!({
            "units": [{"chapters": [
                {"lessons": [{"id": "a"}]},
                {"lessons": [{"id": "a"}]}
            ]}]
        }))
        .unwrap_err();
        assert!(matches!(err, RoadmapError::DuplicateLessonId(id) if id == "a"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Roadmap::from_json_str("{\"units\": 3}").unwrap_err();
        assert!(matches!(err, RoadmapError::Malformed(_)));
    }

    #[test]
    fn find_lesson_reports_chapter() {
        let roadmap = Roadmap::from_json(json!({
            "units": [{"chapters": [
                {"title": "Ownership", "lessons": [{"id": "l1", "title": "Moves"}]}
            ]}]
        }))
        .unwrap();

        let found = roadmap.find_lesson("l1").unwrap();
        assert_eq!(found.lesson.title, "Moves");
        assert_eq!(found.chapter_title, "Ownership");
        assert!(roadmap.find_lesson("missing").is_none());
    }
}
