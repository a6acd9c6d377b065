//! Remote progress store
//!
//! The remote store is the long-lived source of truth once a learner is
//! signed in. Every call is best-effort: callers log failures and carry on
//! with local state.

pub mod error;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::skills::{Skill, SkillId};

pub use error::RemoteError;
pub use http::HttpRemote;
pub use memory::MemoryRemote;

/// A skill row as returned by the remote store
///
/// Rows are loosely typed: `skill_id` may name a track this client does
/// not know, and `xp` may be missing or non-numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSkill {
    pub skill_id: String,
    #[serde(default)]
    pub xp: serde_json::Value,
    #[serde(default)]
    pub level: serde_json::Value,
}

impl RemoteSkill {
    pub fn new(skill_id: impl Into<String>, xp: u64) -> Self {
        Self {
            skill_id: skill_id.into(),
            xp: xp.into(),
            level: crate::skills::level_for_xp(xp).into(),
        }
    }

    /// The track this row belongs to, if known
    pub fn known_id(&self) -> Option<SkillId> {
        SkillId::parse(&self.skill_id)
    }

    /// XP as a non-negative integer, if the row carries one
    pub fn numeric_xp(&self) -> Option<u64> {
        self.xp.as_u64().or_else(|| {
            self.xp.as_f64().filter(|xp| xp.is_finite() && *xp >= 0.0).map(|xp| xp as u64)
        })
    }
}

/// A skill row sent to the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSyncRecord {
    pub user_id: String,
    pub skill_id: SkillId,
    pub xp: u64,
    pub level: u64,
    pub updated_at: DateTime<Utc>,
}

impl SkillSyncRecord {
    pub fn from_skill(user_id: &str, skill: &Skill) -> Self {
        Self {
            user_id: user_id.to_string(),
            skill_id: skill.id,
            xp: skill.xp,
            level: skill.level,
            updated_at: Utc::now(),
        }
    }
}

/// Backend persistence for completion and skill state
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lesson ids the learner has completed, across all courses
    async fn completed_lessons(&self, identity: &Identity) -> Result<Vec<String>, RemoteError>;

    /// Record a lesson completion
    async fn mark_lesson_complete(
        &self,
        identity: &Identity,
        lesson_id: &str,
        course_id: &str,
    ) -> Result<(), RemoteError>;

    /// All skill rows stored for the learner
    async fn skills(&self, identity: &Identity) -> Result<Vec<RemoteSkill>, RemoteError>;

    /// Upsert skill rows, keyed by user and skill
    async fn sync_skills(
        &self,
        identity: &Identity,
        skills: &[SkillSyncRecord],
    ) -> Result<(), RemoteError>;
}
