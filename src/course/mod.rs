//! Course session: roadmap, progress, and skills working together
//!
//! Completing a lesson flows through here so that XP is awarded exactly
//! once per lesson: the session checks completion before awarding, then
//! marks the lesson complete.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::LocalCache;
use crate::config::Config;
use crate::identity::Identity;
use crate::progress::{CompletionState, ProgressStore};
use crate::ranking::CallerStats;
use crate::remote::RemoteStore;
use crate::roadmap::{Direction, LessonId, LessonSequence, Roadmap, flatten};
use crate::skills::{Skill, SkillProfile, SkillStore};

/// Title used for XP rewards when a lesson is not in the roadmap
const UNKNOWN_LESSON_TITLE: &str = "Unknown Lesson";

/// Everything needed to work through one course
pub struct CourseSession {
    roadmap: Roadmap,
    sequence: LessonSequence,
    progress: ProgressStore,
    skills: SkillStore,
}

impl CourseSession {
    /// Create a session for `roadmap`, keyed by `course_id`
    pub fn new(
        course_id: impl Into<String>,
        roadmap: Roadmap,
        config: &Config,
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteStore>,
        identity: Option<Identity>,
    ) -> Self {
        let sequence = flatten(&roadmap);
        let progress = ProgressStore::new(course_id, cache.clone(), remote.clone())
            .with_config(config)
            .with_identity(identity.clone());
        let skills = SkillStore::new(cache, remote).with_config(config).with_identity(identity);

        Self { roadmap, sequence, progress, skills }
    }

    /// Load progress and skills concurrently
    pub async fn load(&mut self) {
        let (progress, skills) = tokio::join!(self.progress.load(), self.skills.load());
        debug!(
            "Loaded {} completed lessons and {} total XP",
            progress.completed_lessons().len(),
            skills.total_xp()
        );
    }

    /// Switch identity and reload both stores
    pub async fn reload(&mut self, identity: Option<Identity>) {
        self.progress.set_identity(identity.clone());
        self.skills.set_identity(identity);
        self.load().await;
    }

    /// Reload whenever the identity changes, until the provider is dropped
    pub async fn follow_identity(&mut self, mut rx: watch::Receiver<Option<Identity>>) {
        while rx.changed().await.is_ok() {
            let identity = rx.borrow_and_update().clone();
            info!(
                "Identity changed to {}, reloading progress",
                identity.as_ref().map_or("anonymous", |i| i.user_id.as_str())
            );
            self.reload(identity).await;
        }
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn sequence(&self) -> &LessonSequence {
        &self.sequence
    }

    pub fn state(&self) -> &CompletionState {
        self.progress.state()
    }

    pub fn skills(&self) -> &SkillProfile {
        self.skills.profile()
    }

    pub fn is_complete(&self, lesson_id: &str) -> bool {
        self.progress.is_complete(lesson_id)
    }

    pub fn is_locked(&self, lesson_id: &str) -> bool {
        self.progress.is_locked(lesson_id, &self.sequence)
    }

    pub fn completion_percent(&self) -> u8 {
        self.progress.completion_percent(&self.sequence)
    }

    pub fn caller_stats(&self) -> CallerStats {
        CallerStats::from_profile(self.skills.profile())
    }

    /// Complete a lesson, awarding XP the first time only
    ///
    /// Returns the skills that gained XP; empty if the lesson was already
    /// complete.
    pub async fn complete_lesson(&mut self, lesson_id: &str) -> Vec<Skill> {
        if self.progress.is_complete(lesson_id) {
            return Vec::new();
        }

        let title = self
            .roadmap
            .find_lesson(lesson_id)
            .map_or(UNKNOWN_LESSON_TITLE, |loc| loc.lesson.title.as_str())
            .to_string();

        let changed = self.skills.award_xp(lesson_id, &title).await;
        self.progress.mark_complete(lesson_id).await;
        changed
    }

    /// Open a lesson, recording it as last accessed
    ///
    /// Returns false without side effects if the lesson is locked.
    pub fn open_lesson(&mut self, lesson_id: &str) -> bool {
        if self.is_locked(lesson_id) {
            return false;
        }
        self.progress.update_last_accessed(lesson_id);
        true
    }

    /// Move to the next or previous lesson
    ///
    /// Moving forward completes the current lesson first. Returns the lesson
    /// moved to, if there is one.
    pub async fn advance(&mut self, lesson_id: &str, direction: Direction) -> Option<LessonId> {
        if direction == Direction::Next {
            self.complete_lesson(lesson_id).await;
        }

        let target = self.sequence.adjacent(lesson_id, direction)?.to_string();
        self.progress.update_last_accessed(&target);
        Some(target)
    }

    /// Lesson to resume from: last accessed, else the first lesson
    pub fn resume_point(&self) -> Option<&str> {
        self.progress
            .state()
            .last_accessed_lesson
            .as_deref()
            .filter(|id| self.sequence.contains(id))
            .or_else(|| self.sequence.get(0))
    }
}
