//! Skill tracks, XP rewards, and the skill profile store

pub mod model;
pub mod store;

pub use model::{
    Skill, SkillId, SkillProfile, SkillRewards, level_for_xp, level_progress_percent,
    rewards_for_lesson_title,
};
pub use store::SkillStore;
