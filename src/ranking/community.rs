//! Community leaderboards
//!
//! Non-caller members are synthetic. Their stats are a pure function of a
//! seed taken from the community id and their index in the member pool, so
//! the same community always produces the same roster.

use serde::Serialize;

use super::{CallerStats, Ranked, rank_descending};

/// Seed used when the community id has no second character
const FALLBACK_SEED: u64 = 10;

/// Rank reported when the caller cannot be found on a leaderboard
pub const UNRANKED: usize = 999;

/// A pre-defined peer group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Community {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub created_at: &'static str,
    pub members_count: u32,
}

/// The fixed community catalog
pub static COMMUNITIES: [Community; 3] = [
    Community {
        id: "c1",
        name: "AI Founders",
        description: "Builders and researchers in Artificial Intelligence.",
        created_at: "2023-01-15",
        members_count: 1420,
    },
    Community {
        id: "c2",
        name: "FullStack Pros",
        description: "Mastering the art of end-to-end development.",
        created_at: "2023-03-10",
        members_count: 850,
    },
    Community {
        id: "c3",
        name: "System Architects",
        description: "Scalability, distributed systems, and cloud design.",
        created_at: "2022-11-05",
        members_count: 530,
    },
];

/// Names and initials of the synthetic member pool
const MEMBER_POOL: [(&str, &str); 8] = [
    ("Sarah Chen", "SC"),
    ("David Miller", "DM"),
    ("Jessica Lee", "JL"),
    ("Alex Rivera", "AR"),
    ("Mike Ross", "MR"),
    ("Rachel Zane", "RZ"),
    ("Harvey Specter", "HS"),
    ("Donna Paulsen", "DP"),
];

/// Look up a community by id
pub fn find_community(id: &str) -> Option<&'static Community> {
    COMMUNITIES.iter().find(|c| c.id == id)
}

/// Community score: XP plus a hundred points per summed skill level
pub fn member_score(total_xp: u64, total_levels: u64) -> u64 {
    total_xp.saturating_add(total_levels.saturating_mul(100))
}

/// Numeric seed for a community: the code of its second character
pub fn community_seed(community_id: &str) -> u64 {
    community_id
        .chars()
        .nth(1)
        .map(|c| u64::from(u32::from(c)))
        .filter(|&code| code != 0)
        .unwrap_or(FALLBACK_SEED)
}

/// A row on a community leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityMember {
    pub user_id: String,
    pub display_name: String,
    pub initials: String,
    pub total_xp: u64,
    /// Sum of all skill levels
    pub total_levels: u64,
    pub score: u64,
    pub rank: usize,
    pub is_caller: bool,
}

impl Ranked for CommunityMember {
    fn score(&self) -> u64 {
        self.score
    }

    fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }
}

fn synthetic_member(seed: u64, idx: usize, (name, initials): (&str, &str)) -> CommunityMember {
    let base = (seed * 500 + idx as u64 * 200) as i64;
    let variation: i64 = if idx % 3 == 0 { 1000 } else { -200 };
    let total_xp = (base + variation).max(100) as u64;
    let total_levels = total_xp / 250 + 1;

    CommunityMember {
        user_id: format!("mock-{}", idx),
        display_name: name.to_string(),
        initials: initials.to_string(),
        total_xp,
        total_levels,
        score: member_score(total_xp, total_levels),
        rank: 0,
        is_caller: false,
    }
}

/// Build the ranked roster for a community, including the caller
///
/// The caller is appended after the pool, so on equal scores pool members
/// rank first.
pub fn build_leaderboard(community_id: &str, caller: CallerStats) -> Vec<CommunityMember> {
    let seed = community_seed(community_id);

    let mut members: Vec<CommunityMember> = MEMBER_POOL
        .iter()
        .enumerate()
        .map(|(idx, &entry)| synthetic_member(seed, idx, entry))
        .collect();

    members.push(CommunityMember {
        user_id: "current-user".to_string(),
        display_name: "You".to_string(),
        initials: "ME".to_string(),
        total_xp: caller.total_xp,
        total_levels: caller.total_levels,
        score: member_score(caller.total_xp, caller.total_levels),
        rank: 0,
        is_caller: true,
    });

    rank_descending(members)
}

/// The caller's standing in a community
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityStanding {
    pub community: Option<&'static Community>,
    pub rank: usize,
    pub total_members: usize,
}

/// Summarize the caller's position on a community leaderboard
pub fn community_stats(community_id: &str, caller: CallerStats) -> CommunityStanding {
    let leaderboard = build_leaderboard(community_id, caller);
    let rank = leaderboard.iter().find(|m| m.is_caller).map_or(UNRANKED, |m| m.rank);

    CommunityStanding {
        community: find_community(community_id),
        rank,
        total_members: leaderboard.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn caller(total_xp: u64, total_levels: u64) -> CallerStats {
        CallerStats { total_xp, total_levels }
    }

    #[test]
    fn seed_comes_from_second_character() {
        assert_eq!(community_seed("c1"), u64::from(b'1'));
        assert_eq!(community_seed("c2"), 50);
        assert_eq!(community_seed("c"), FALLBACK_SEED);
        assert_eq!(community_seed(""), FALLBACK_SEED);
    }

    #[test]
    fn member_score_weights_levels() {
        assert_eq!(member_score(500, 5), 1000);
        assert_eq!(member_score(0, 4), 400);
    }

    #[test]
    fn leaderboard_is_deterministic() {
        let first = build_leaderboard("c1", caller(500, 5));
        let second = build_leaderboard("c1", caller(500, 5));
        assert_eq!(first, second);
    }

    #[test]
    fn leaderboard_includes_pool_and_caller() {
        let board = build_leaderboard("c2", caller(500, 5));
        assert_eq!(board.len(), MEMBER_POOL.len() + 1);
        assert_eq!(board.iter().filter(|m| m.is_caller).count(), 1);

        let ranks: Vec<usize> = board.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, (1..=9).collect::<Vec<_>>());
        assert!(board.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn synthetic_stats_follow_seed_and_index() {
        // seed 10: member 0 gets 5000 + 1000, member 1 gets 5200 - 200
        let board = build_leaderboard("x", caller(0, 0));
        let sarah = board.iter().find(|m| m.user_id == "mock-0").unwrap();
        assert_eq!(sarah.total_xp, 6000);
        assert_eq!(sarah.total_levels, 25);
        assert_eq!(sarah.score, 8500);

        let david = board.iter().find(|m| m.user_id == "mock-1").unwrap();
        assert_eq!(david.total_xp, 5000);
    }

    #[test]
    fn low_seed_clamps_xp_to_minimum() {
        let member = synthetic_member(0, 1, MEMBER_POOL[1]);
        assert_eq!(member.total_xp, 100);
        assert_eq!(member.total_levels, 1);
    }

    #[test]
    fn caller_loses_ties_to_pool_members() {
        let pool_top = build_leaderboard("c1", caller(0, 0))
            .into_iter()
            .find(|m| m.rank == 1)
            .unwrap();
        let board = build_leaderboard("c1", caller(pool_top.total_xp, pool_top.total_levels));

        assert_eq!(board[0].user_id, pool_top.user_id);
        assert!(board[1].is_caller);
    }

    #[test]
    fn member_score_saturates() {
        assert_eq!(member_score(u64::MAX, 1), u64::MAX);
        assert_eq!(member_score(0, u64::MAX), u64::MAX);
    }

    #[test]
    fn community_stats_report_rank() {
        let standing = community_stats("c1", caller(1_000_000, 40));
        assert_eq!(standing.rank, 1);
        assert_eq!(standing.total_members, 9);
        assert_eq!(standing.community.map(|c| c.name), Some("AI Founders"));

        let standing = community_stats("c9", caller(0, 4));
        assert!(standing.community.is_none());
        assert_eq!(standing.rank, 9);
    }
}
