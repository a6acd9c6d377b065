//! In-memory [`RemoteStore`] for tests and offline use
//!
//! Keeps per-user completion lists and skill rows behind a `Mutex`. An
//! outage switch makes every call fail, which is how callers exercise their
//! fallback paths.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::error::RemoteError;
use super::{RemoteSkill, RemoteStore, SkillSyncRecord};
use crate::identity::Identity;

#[derive(Debug, Default)]
struct UserRecords {
    completed: Vec<String>,
    skills: Vec<RemoteSkill>,
}

/// Remote store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryRemote {
    users: Mutex<HashMap<String, UserRecords>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful write calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Seed completed lessons for a user
    pub fn insert_completed(&self, user_id: &str, lesson_ids: &[&str]) {
        let mut users = self.lock();
        let records = users.entry(user_id.to_string()).or_default();
        for id in lesson_ids {
            if !records.completed.iter().any(|c| c == id) {
                records.completed.push(id.to_string());
            }
        }
    }

    /// Seed a raw skill row for a user
    pub fn insert_skill(&self, user_id: &str, row: RemoteSkill) {
        let mut users = self.lock();
        let records = users.entry(user_id.to_string()).or_default();
        upsert_row(&mut records.skills, row);
    }

    pub fn completed_for(&self, user_id: &str) -> Vec<String> {
        self.lock().get(user_id).map(|r| r.completed.clone()).unwrap_or_default()
    }

    pub fn skills_for(&self, user_id: &str) -> Vec<RemoteSkill> {
        self.lock().get(user_id).map(|r| r.skills.clone()).unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, UserRecords>> {
        // A poisoned lock only means a test panicked mid-update; the map is still usable
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("memory remote is offline".to_string()));
        }
        Ok(())
    }
}

fn upsert_row(rows: &mut Vec<RemoteSkill>, row: RemoteSkill) {
    if let Some(existing) = rows.iter_mut().find(|r| r.skill_id == row.skill_id) {
        *existing = row;
    } else {
        rows.push(row);
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn completed_lessons(&self, identity: &Identity) -> Result<Vec<String>, RemoteError> {
        self.ensure_online()?;
        Ok(self.completed_for(&identity.user_id))
    }

    async fn mark_lesson_complete(
        &self,
        identity: &Identity,
        lesson_id: &str,
        _course_id: &str,
    ) -> Result<(), RemoteError> {
        self.ensure_online()?;
        self.insert_completed(&identity.user_id, &[lesson_id]);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn skills(&self, identity: &Identity) -> Result<Vec<RemoteSkill>, RemoteError> {
        self.ensure_online()?;
        Ok(self.skills_for(&identity.user_id))
    }

    async fn sync_skills(
        &self,
        identity: &Identity,
        skills: &[SkillSyncRecord],
    ) -> Result<(), RemoteError> {
        self.ensure_online()?;
        {
            let mut users = self.lock();
            let records = users.entry(identity.user_id.clone()).or_default();
            for record in skills {
                upsert_row(
                    &mut records.skills,
                    RemoteSkill {
                        skill_id: record.skill_id.as_str().to_string(),
                        xp: record.xp.into(),
                        level: record.level.into(),
                    },
                );
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
