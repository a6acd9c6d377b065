//! Skill profile store
//!
//! Skills are account-global rather than per course. The profile is built
//! from the fixed zero state, overlaid with the local cache, then with the
//! remote store when signed in. Levels are always recomputed from XP.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::model::{Skill, SkillId, SkillProfile, rewards_for_lesson_title};
use crate::cache::{self, LocalCache};
use crate::config::{Config, SkillMergePolicy};
use crate::identity::Identity;
use crate::remote::{RemoteStore, SkillSyncRecord};

/// Cache key for the skill profile
pub const CACHE_KEY: &str = "user_skills_v1";

/// A cached skill entry. Levels in the cache are ignored.
#[derive(Debug, Deserialize)]
struct CachedSkill {
    id: String,
    #[serde(default)]
    xp: u64,
}

/// Skill XP tracking for one identity
pub struct SkillStore {
    identity: Option<Identity>,
    cache: Arc<dyn LocalCache>,
    remote: Arc<dyn RemoteStore>,
    profile: SkillProfile,
    merge_policy: SkillMergePolicy,
}

impl SkillStore {
    pub fn new(cache: Arc<dyn LocalCache>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            identity: None,
            cache,
            remote,
            profile: SkillProfile::new(),
            merge_policy: SkillMergePolicy::default(),
        }
    }

    pub fn with_config(mut self, config: &Config) -> Self {
        self.merge_policy = config.skill_merge;
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

    pub fn profile(&self) -> &SkillProfile {
        &self.profile
    }

    pub fn get(&self, id: SkillId) -> &Skill {
        self.profile.get(id)
    }

    /// Rebuild the profile from the local cache and the remote store
    pub async fn load(&mut self) -> &SkillProfile {
        let mut profile = SkillProfile::new();

        let cache_readable =
            match cache::read_json::<Vec<CachedSkill>>(self.cache.as_ref(), CACHE_KEY) {
                Ok(cached) => {
                    for entry in cached.into_iter().flatten() {
                        match SkillId::parse(&entry.id) {
                            Some(id) => profile.set_xp(id, entry.xp),
                            None => debug!("Ignoring cached skill with unknown id {}", entry.id),
                        }
                    }
                    true
                }
                Err(e) => {
                    warn!("Failed to read cached skills: {:#}", e);
                    false
                }
            };

        if let Some(identity) = &self.identity {
            match self.remote.skills(identity).await {
                Ok(rows) => {
                    for row in rows {
                        let (Some(id), Some(remote_xp)) = (row.known_id(), row.numeric_xp()) else {
                            debug!("Ignoring remote skill row {:?}", row.skill_id);
                            continue;
                        };
                        let xp = match self.merge_policy {
                            SkillMergePolicy::RemoteWins => remote_xp,
                            SkillMergePolicy::Max => remote_xp.max(profile.get(id).xp),
                        };
                        profile.set_xp(id, xp);
                    }
                }
                Err(e) => warn!("Failed to sync skills from server: {}", e),
            }
        }

        self.profile = profile;
        // An unreadable cache may still hold real XP; leave it alone
        if cache_readable {
            self.persist();
        }
        &self.profile
    }

    /// Award XP for completing a lesson, based on its title
    ///
    /// Does not guard against awarding the same lesson twice; callers check
    /// completion first. Returns the skills that changed.
    pub async fn award_xp(&mut self, lesson_id: &str, lesson_title: &str) -> Vec<Skill> {
        let rewards = rewards_for_lesson_title(lesson_title);
        let changed = self.profile.apply_rewards(&rewards);
        debug!("Lesson {} awarded XP to {} skills", lesson_id, changed.len());
        self.persist();

        if let Some(identity) = &self.identity {
            if !changed.is_empty() {
                let records: Vec<SkillSyncRecord> = changed
                    .iter()
                    .map(|skill| SkillSyncRecord::from_skill(&identity.user_id, skill))
                    .collect();
                if let Err(e) = self.remote.sync_skills(identity, &records).await {
                    warn!("Error syncing skills: {}", e);
                }
            }
        }

        changed
    }

    fn persist(&self) {
        cache::write_json(self.cache.as_ref(), CACHE_KEY, &self.profile.to_vec());
    }
}
