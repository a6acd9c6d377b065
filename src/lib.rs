//! learnpath - progress and mastery tracking for generated course roadmaps
//!
//! learnpath turns lesson completions into sequential lesson unlocking,
//! course completion percentages, and skill XP that feeds friend and
//! community leaderboards. State lives in a local cache and is reconciled
//! with a remote store once a learner signs in.

pub mod cache;
pub mod config;
pub mod course;
pub mod identity;
pub mod progress;
pub mod ranking;
pub mod remote;
pub mod roadmap;
pub mod skills;

pub use config::Config;
pub use course::CourseSession;
pub use identity::{Identity, IdentityProvider};
pub use progress::ProgressStore;
pub use roadmap::Roadmap;
pub use skills::SkillStore;
