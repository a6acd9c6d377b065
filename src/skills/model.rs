//! Skill tracks and the experience formulas behind them
//!
//! Every learner accrues experience in exactly four fixed tracks. Levels are
//! never stored as a source of truth: they are always derived from XP.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// XP needed to advance one level
pub const XP_PER_LEVEL: u64 = 100;

/// Reward granted to CS fundamentals for any lesson
pub const BASE_REWARD: u64 = 20;

/// Reward granted to a track whose keywords match the lesson title
pub const MATCH_REWARD: u64 = 50;

/// The four fixed skill tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    Frontend,
    Backend,
    Devops,
    CsFundamentals,
}

impl SkillId {
    /// All tracks, in display order
    pub const ALL: [SkillId; 4] =
        [SkillId::Frontend, SkillId::Backend, SkillId::Devops, SkillId::CsFundamentals];

    /// Identifier used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Devops => "devops",
            Self::CsFundamentals => "cs_fundamentals",
        }
    }

    /// Human-readable track name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Frontend => "Frontend Engineering",
            Self::Backend => "Backend Architecture",
            Self::Devops => "DevOps & Systems",
            Self::CsFundamentals => "CS Fundamentals",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Frontend => "Building user interfaces and interactions",
            Self::Backend => "Server-side logic, databases, and APIs",
            Self::Devops => "Deployment, CI/CD, and infrastructure",
            Self::CsFundamentals => "Algorithms, data structures, and theory",
        }
    }

    /// Parse a stored identifier. Unknown identifiers yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "frontend" => Some(Self::Frontend),
            "backend" => Some(Self::Backend),
            "devops" => Some(Self::Devops),
            "cs_fundamentals" => Some(Self::CsFundamentals),
            _ => None,
        }
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkillId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("Unknown skill: {}. Options: frontend, backend, devops, cs_fundamentals", s)
        })
    }
}

/// Level for an amount of XP: `1 + floor(xp / 100)`
pub fn level_for_xp(xp: u64) -> u64 {
    1 + xp / XP_PER_LEVEL
}

/// Progress towards the next level, in percent (0-99)
pub fn level_progress_percent(xp: u64) -> u8 {
    (xp % XP_PER_LEVEL) as u8
}

/// XP rewards per skill track
pub type SkillRewards = BTreeMap<SkillId, u64>;

fn keyword_pattern(keywords: &[&str]) -> Regex {
    let alternation = keywords.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
    // Keywords are fixed literals, so the pattern always compiles
    Regex::new(&format!("(?i){}", alternation)).unwrap()
}

static FRONTEND_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| keyword_pattern(&["react", "css", "html", "frontend", "ui"]));

static BACKEND_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| keyword_pattern(&["api", "database", "server", "backend", "sql"]));

static DEVOPS_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| keyword_pattern(&["deploy", "docker", "aws", "ci/cd"]));

static FUNDAMENTALS_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| keyword_pattern(&["algorithm", "structure", "memory", "system design"]));

/// Work out which tracks a lesson rewards, based on its title
///
/// CS fundamentals always receives at least the base reward; every other
/// track is rewarded only when one of its keywords appears in the title.
pub fn rewards_for_lesson_title(title: &str) -> SkillRewards {
    let mut rewards = SkillRewards::new();
    rewards.insert(SkillId::CsFundamentals, BASE_REWARD);

    if FRONTEND_KEYWORDS.is_match(title) {
        rewards.insert(SkillId::Frontend, MATCH_REWARD);
    }
    if BACKEND_KEYWORDS.is_match(title) {
        rewards.insert(SkillId::Backend, MATCH_REWARD);
    }
    if DEVOPS_KEYWORDS.is_match(title) {
        rewards.insert(SkillId::Devops, MATCH_REWARD);
    }
    if FUNDAMENTALS_KEYWORDS.is_match(title) {
        rewards.insert(SkillId::CsFundamentals, MATCH_REWARD);
    }

    rewards
}

/// A single skill track with its accumulated XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub xp: u64,
    /// Always `level_for_xp(xp)`
    pub level: u64,
}

impl Skill {
    /// A fresh track with no XP
    pub fn new(id: SkillId) -> Self {
        Self::with_xp(id, 0)
    }

    pub fn with_xp(id: SkillId, xp: u64) -> Self {
        Self { id, xp, level: level_for_xp(xp) }
    }

    /// Add XP and recompute the level
    pub fn add_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
        self.level = level_for_xp(self.xp);
    }

    /// Replace XP and recompute the level
    pub fn set_xp(&mut self, xp: u64) {
        self.xp = xp;
        self.level = level_for_xp(xp);
    }

    pub fn progress_percent(&self) -> u8 {
        level_progress_percent(self.xp)
    }
}

/// One learner's skills, one entry per fixed track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillProfile {
    skills: BTreeMap<SkillId, Skill>,
}

impl Default for SkillProfile {
    fn default() -> Self {
        Self { skills: SkillId::ALL.iter().map(|&id| (id, Skill::new(id))).collect() }
    }
}

impl SkillProfile {
    /// All four tracks at zero XP
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SkillId) -> &Skill {
        // Every track is inserted on construction and never removed
        &self.skills[&id]
    }

    /// Skills in display order
    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    pub fn set_xp(&mut self, id: SkillId, xp: u64) {
        if let Some(skill) = self.skills.get_mut(&id) {
            skill.set_xp(xp);
        }
    }

    /// Apply rewards and return the skills that changed
    pub fn apply_rewards(&mut self, rewards: &SkillRewards) -> Vec<Skill> {
        let mut changed = Vec::new();
        for (id, &gain) in rewards {
            if gain == 0 {
                continue;
            }
            if let Some(skill) = self.skills.get_mut(id) {
                skill.add_xp(gain);
                changed.push(*skill);
            }
        }
        changed
    }

    pub fn total_xp(&self) -> u64 {
        self.skills.values().map(|s| s.xp).fold(0, u64::saturating_add)
    }

    /// Sum of all track levels
    pub fn total_levels(&self) -> u64 {
        self.skills.values().map(|s| s.level).fold(0, u64::saturating_add)
    }

    /// Snapshot of every track, in display order
    pub fn to_vec(&self) -> Vec<Skill> {
        self.skills.values().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 3);
    }

    #[test]
    fn progress_within_level() {
        assert_eq!(level_progress_percent(0), 0);
        assert_eq!(level_progress_percent(99), 99);
        assert_eq!(level_progress_percent(250), 50);
    }

    #[test]
    fn rest_api_title_rewards_backend() {
        let rewards = rewards_for_lesson_title("Intro to REST APIs");
        assert_eq!(rewards.get(&SkillId::Backend), Some(&50));
        assert_eq!(rewards.get(&SkillId::CsFundamentals), Some(&20));
        assert!(!rewards.contains_key(&SkillId::Frontend));
        assert!(!rewards.contains_key(&SkillId::Devops));
    }

    #[test]
    fn unrelated_title_rewards_only_fundamentals() {
        let rewards = rewards_for_lesson_title("Welcome and course overview");
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[&SkillId::CsFundamentals], BASE_REWARD);
    }

    #[test]
    fn fundamentals_keywords_boost_base_reward() {
        let rewards = rewards_for_lesson_title("Sorting Algorithms");
        assert_eq!(rewards[&SkillId::CsFundamentals], MATCH_REWARD);
    }

    #[test]
    fn title_can_trigger_every_track() {
        let rewards =
            rewards_for_lesson_title("Deploy a React UI backed by a SQL server: system design");
        assert_eq!(rewards.len(), 4);
        assert!(rewards.values().all(|&xp| xp == MATCH_REWARD));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let rewards = rewards_for_lesson_title("DOCKER and CI/CD pipelines");
        assert_eq!(rewards.get(&SkillId::Devops), Some(&MATCH_REWARD));
    }

    #[test]
    fn skill_id_round_trips_through_str() {
        for id in SkillId::ALL {
            assert_eq!(SkillId::parse(id.as_str()), Some(id));
        }
        assert!("quantum".parse::<SkillId>().is_err());
    }

    #[test]
    fn skill_id_serializes_snake_case() {
        let json = serde_json::to_string(&SkillId::CsFundamentals).unwrap();
        assert_eq!(json, "\"cs_fundamentals\"");
    }

    #[test]
    fn profile_starts_at_zero() {
        let profile = SkillProfile::new();
        assert_eq!(profile.iter().count(), 4);
        assert_eq!(profile.total_xp(), 0);
        assert_eq!(profile.total_levels(), 4);
    }

    #[test]
    fn apply_rewards_reports_changed_skills() {
        let mut profile = SkillProfile::new();
        let changed = profile.apply_rewards(&rewards_for_lesson_title("Intro to REST APIs"));

        assert_eq!(changed.len(), 2);
        assert_eq!(profile.get(SkillId::Backend).xp, 50);
        assert_eq!(profile.get(SkillId::CsFundamentals).xp, 20);
        assert_eq!(profile.get(SkillId::Frontend).xp, 0);
    }

    #[test]
    fn add_xp_recomputes_level() {
        let mut skill = Skill::with_xp(SkillId::Frontend, 80);
        skill.add_xp(50);
        assert_eq!(skill.xp, 130);
        assert_eq!(skill.level, 2);
        assert_eq!(skill.progress_percent(), 30);
    }

    proptest! {
        #[test]
        fn level_matches_formula(xp in 0u64..1_000_000) {
            prop_assert_eq!(level_for_xp(xp), 1 + xp / 100);
            prop_assert!(level_progress_percent(xp) < 100);
        }

        #[test]
        fn level_is_monotonic(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for_xp(lo) <= level_for_xp(hi));
        }

        #[test]
        fn rewards_always_include_fundamentals(title in ".{0,40}") {
            let rewards = rewards_for_lesson_title(&title);
            prop_assert!(rewards.contains_key(&SkillId::CsFundamentals));
        }
    }
}
