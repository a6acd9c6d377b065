//! Leaderboard scoring
//!
//! Two scoring formulas are in use and they are deliberately kept apart:
//!
//! - friend ranking: `xp + completion_percent * 10` ([`rank_score`])
//! - community ranking: `xp + total_levels * 100` ([`community::member_score`])
//!
//! Both leaderboards sort by descending score with a stable sort, so equal
//! scores keep insertion order and the caller, inserted last, ranks below
//! anyone they tie with.

pub mod community;

use serde::Serialize;

use crate::skills::{Skill, SkillId, SkillProfile};

pub use community::{CommunityMember, CommunityStanding, build_leaderboard, community_stats};

/// Number of entries shown on the friend leaderboard by default
pub const FRIEND_LEADERBOARD_SIZE: usize = 5;

/// Friend ranking score: XP plus ten points per completion percent
pub fn rank_score(xp: u64, completion_percent: u8) -> u64 {
    xp.saturating_add(u64::from(completion_percent) * 10)
}

/// An entry that can be placed on a leaderboard
pub trait Ranked {
    fn score(&self) -> u64;
    fn set_rank(&mut self, rank: usize);
}

/// Sort by descending score and assign 1-based ranks
///
/// The sort is stable: ties keep their input order.
pub fn rank_descending<T: Ranked>(mut entries: Vec<T>) -> Vec<T> {
    entries.sort_by(|a, b| b.score().cmp(&a.score()));
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.set_rank(idx + 1);
    }
    entries
}

/// Aggregate stats of the learner viewing a leaderboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallerStats {
    pub total_xp: u64,
    /// Sum of all skill levels
    pub total_levels: u64,
}

impl CallerStats {
    pub fn from_profile(profile: &SkillProfile) -> Self {
        Self { total_xp: profile.total_xp(), total_levels: profile.total_levels() }
    }
}

/// A friend with fixed, reproducible stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Friend {
    pub id: &'static str,
    pub name: &'static str,
    pub username: &'static str,
    pub initials: &'static str,
    pub skills: Vec<Skill>,
    pub total_xp: u64,
    pub overall_level: u64,
    /// Course completion, 0-100
    pub course_completion: u8,
    pub joined: &'static str,
}

/// Skill spread for a friend, derived from a seed
fn generate_skills(seed: u64) -> Vec<Skill> {
    SkillId::ALL
        .iter()
        .map(|&id| {
            let base = seed * 100 + id.as_str().len() as u64 * 50;
            let variation = (seed % 3) * 100;
            Skill::with_xp(id, base + variation)
        })
        .collect()
}

fn friend(
    id: &'static str,
    name: &'static str,
    username: &'static str,
    initials: &'static str,
    seed: u64,
    course_completion: u8,
    joined: &'static str,
) -> Friend {
    let skills = generate_skills(seed);
    let total_xp = skills.iter().map(|s| s.xp).sum();
    Friend {
        id,
        name,
        username,
        initials,
        skills,
        total_xp,
        overall_level: overall_level(total_xp),
        course_completion,
        joined,
    }
}

/// The fixed friend roster
pub fn friends() -> Vec<Friend> {
    vec![
        friend("f1", "Sarah Chen", "@sarah_builds", "SC", 4, 78, "Oct 2023"),
        friend("f2", "David Miller", "@dave_dev", "DM", 2, 45, "Dec 2023"),
        friend("f3", "Jessica Lee", "@jess_codes", "JL", 6, 92, "Sep 2023"),
        friend("f4", "Alex Rivera", "@alexr", "AR", 3, 60, "Jan 2024"),
    ]
}

/// A row on the friend leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub score: u64,
    pub rank: usize,
    pub is_caller: bool,
}

impl Ranked for LeaderboardEntry {
    fn score(&self) -> u64 {
        self.score
    }

    fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }
}

/// Rank the caller against the friend roster, keeping the top `limit` rows
pub fn friend_leaderboard(
    caller_xp: u64,
    caller_completion: u8,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = friends()
        .into_iter()
        .map(|f| LeaderboardEntry {
            id: f.id.to_string(),
            name: f.name.to_string(),
            score: rank_score(f.total_xp, f.course_completion),
            rank: 0,
            is_caller: false,
        })
        .collect();

    entries.push(LeaderboardEntry {
        id: "user".to_string(),
        name: "You".to_string(),
        score: rank_score(caller_xp, caller_completion),
        rank: 0,
        is_caller: true,
    });

    let mut ranked = rank_descending(entries);
    ranked.truncate(limit);
    ranked
}

/// A friend's strongest skill
pub fn top_skill(friend: &Friend) -> Option<&Skill> {
    friend.skills.iter().max_by_key(|s| (s.xp, std::cmp::Reverse(s.id)))
}

/// Overall level from summed XP, as shown on profile cards
pub fn overall_level(total_xp: u64) -> u64 {
    total_xp / 350 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rank_score_weights_completion() {
        assert_eq!(rank_score(0, 0), 0);
        assert_eq!(rank_score(500, 42), 920);
        assert_eq!(rank_score(100, 100), 1100);
    }

    #[test]
    fn friend_stats_are_reproducible() {
        let roster = friends();
        let sarah = &roster[0];
        // seed 4: 400 + len*50 + 100 per skill
        assert_eq!(sarah.total_xp, 900 + 850 + 800 + 1250);
        assert_eq!(sarah.overall_level, 3800 / 350 + 1);
        assert_eq!(roster, friends());
    }

    #[test]
    fn friend_leaderboard_orders_and_ranks() {
        let board = friend_leaderboard(0, 0, 10);
        assert_eq!(board.len(), 5);

        let ranks: Vec<usize> = board.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!(board.windows(2).all(|w| w[0].score >= w[1].score));

        let last = board.last().unwrap();
        assert!(last.is_caller);
    }

    #[test]
    fn strong_caller_tops_friend_leaderboard() {
        let board = friend_leaderboard(100_000, 100, FRIEND_LEADERBOARD_SIZE);
        assert!(board[0].is_caller);
        assert_eq!(board[0].rank, 1);
    }

    #[test]
    fn rank_score_saturates() {
        assert_eq!(rank_score(u64::MAX, 100), u64::MAX);
        assert_eq!(rank_score(u64::MAX - 5, 1), u64::MAX);
    }

    #[test]
    fn caller_stats_saturate_on_huge_xp() {
        let mut profile = SkillProfile::new();
        profile.set_xp(SkillId::Frontend, u64::MAX);
        profile.set_xp(SkillId::Backend, 1);

        let stats = CallerStats::from_profile(&profile);
        assert_eq!(stats.total_xp, u64::MAX);
        assert!(stats.total_levels > 1);
    }

    #[test]
    fn friend_leaderboard_truncates() {
        assert_eq!(friend_leaderboard(0, 0, 3).len(), 3);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let david = friends().into_iter().find(|f| f.id == "f2").unwrap();
        let board = friend_leaderboard(david.total_xp, david.course_completion, 10);

        let david_pos = board.iter().position(|e| e.id == "f2").unwrap();
        let caller_pos = board.iter().position(|e| e.is_caller).unwrap();
        assert_eq!(caller_pos, david_pos + 1);
        assert_eq!(board[caller_pos].score, board[david_pos].score);
    }

    #[test]
    fn caller_stats_sum_profile() {
        let mut profile = SkillProfile::new();
        profile.set_xp(SkillId::Frontend, 250);
        profile.set_xp(SkillId::Backend, 50);

        let stats = CallerStats::from_profile(&profile);
        assert_eq!(stats.total_xp, 300);
        assert_eq!(stats.total_levels, 3 + 1 + 1 + 1);
    }

    #[test]
    fn top_skill_picks_highest_xp() {
        let roster = friends();
        assert_eq!(top_skill(&roster[0]).map(|s| s.id), Some(SkillId::CsFundamentals));
        assert_eq!(overall_level(700), 3);
    }
}
