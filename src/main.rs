use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use learnpath::cache::{FileCache, LocalCache};
use learnpath::identity::CredentialStore;
use learnpath::ranking::{self, CallerStats, FRIEND_LEADERBOARD_SIZE, community};
use learnpath::remote::{HttpRemote, RemoteStore};
use learnpath::roadmap::Direction;
use learnpath::{Config, CourseSession, Identity, Roadmap, SkillStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "learnpath")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show progress through a course
    Status {
        /// Path to the roadmap JSON
        roadmap: PathBuf,
        /// Course id (defaults to the roadmap title)
        #[arg(short, long)]
        course: Option<String>,
    },
    /// Mark a lesson complete and award XP
    Complete {
        roadmap: PathBuf,
        lesson: String,
        #[arg(short, long)]
        course: Option<String>,
    },
    /// Open a lesson if it is unlocked
    Open {
        roadmap: PathBuf,
        lesson: String,
        #[arg(short, long)]
        course: Option<String>,
    },
    /// Complete a lesson and move to the next one
    Next {
        roadmap: PathBuf,
        lesson: String,
        #[arg(short, long)]
        course: Option<String>,
    },
    /// Show skill levels
    Skills,
    /// Show the friend leaderboard
    Friends {
        /// Your course completion percentage
        #[arg(long, default_value_t = 0)]
        completion: u8,
    },
    /// List communities
    Communities,
    /// Show a community leaderboard
    Community {
        /// Community id, e.g. c1
        id: String,
    },
    /// Sign in with a user id and access token
    Login { user_id: String, token: String },
    /// Sign out
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "learnpath=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Status { roadmap, course } => {
            let session = open_session(&config, &roadmap, course).await?;
            print_status(&session);
        }
        Commands::Complete { roadmap, lesson, course } => {
            let mut session = open_session(&config, &roadmap, course).await?;
            if session.is_complete(&lesson) {
                println!("{} is already complete", lesson);
            } else {
                for skill in session.complete_lesson(&lesson).await {
                    println!(
                        "{:<24} {:>6} XP  level {}",
                        skill.id.display_name(),
                        skill.xp,
                        skill.level
                    );
                }
            }
            println!("Course progress: {}%", session.completion_percent());
        }
        Commands::Open { roadmap, lesson, course } => {
            let mut session = open_session(&config, &roadmap, course).await?;
            if session.open_lesson(&lesson) {
                println!("Opened {}", lesson);
            } else {
                println!("{} is locked: complete the previous lesson first", lesson);
            }
        }
        Commands::Next { roadmap, lesson, course } => {
            let mut session = open_session(&config, &roadmap, course).await?;
            match session.advance(&lesson, Direction::Next).await {
                Some(next) => println!("Next lesson: {}", next),
                None => println!("Course finished"),
            }
        }
        Commands::Skills => {
            let (cache, remote) = backends(&config)?;
            let mut store = SkillStore::new(cache, remote)
                .with_config(&config)
                .with_identity(CredentialStore::load_optional());
            for skill in store.load().await.iter() {
                println!(
                    "{:<24} level {:>3}  {:>6} XP  {:>2}% to next",
                    skill.id.display_name(),
                    skill.level,
                    skill.xp,
                    skill.progress_percent()
                );
            }
        }
        Commands::Friends { completion } => {
            let stats = load_caller_stats(&config).await?;
            for entry in
                ranking::friend_leaderboard(stats.total_xp, completion, FRIEND_LEADERBOARD_SIZE)
            {
                let marker = if entry.is_caller { "*" } else { " " };
                println!("{}{:>2}. {:<16} {:>7}", marker, entry.rank, entry.name, entry.score);
            }
            for friend in ranking::friends() {
                if let Some(top) = ranking::top_skill(&friend) {
                    println!("{} is strongest in {}", friend.name, top.id.display_name());
                }
            }
        }
        Commands::Communities => {
            let stats = load_caller_stats(&config).await?;
            for c in community::COMMUNITIES.iter() {
                let standing = community::community_stats(c.id, stats);
                println!(
                    "{:<4} {:<20} rank {} of {}  ({} members)",
                    c.id, c.name, standing.rank, standing.total_members, c.members_count
                );
            }
        }
        Commands::Community { id } => {
            let stats = load_caller_stats(&config).await?;
            for member in community::build_leaderboard(&id, stats) {
                let marker = if member.is_caller { "*" } else { " " };
                println!(
                    "{}{:>2}. {:<16} {:>7}  ({} XP, {} levels)",
                    marker,
                    member.rank,
                    member.display_name,
                    member.score,
                    member.total_xp,
                    member.total_levels
                );
            }
        }
        Commands::Login { user_id, token } => {
            CredentialStore::save(&Identity::new(user_id.clone()).with_token(token.clone()))?;
            println!("Signed in as {} ({})", user_id, CredentialStore::mask_token(&token));
        }
        Commands::Logout => {
            CredentialStore::delete()?;
            println!("Signed out");
        }
    }

    Ok(())
}

fn backends(config: &Config) -> Result<(Arc<dyn LocalCache>, Arc<dyn RemoteStore>)> {
    let cache: Arc<dyn LocalCache> = Arc::new(FileCache::open_default()?);
    let remote: Arc<dyn RemoteStore> =
        Arc::new(HttpRemote::new(config).context("Failed to create HTTP client")?);
    Ok((cache, remote))
}

async fn open_session(
    config: &Config,
    roadmap_path: &Path,
    course: Option<String>,
) -> Result<CourseSession> {
    let contents = std::fs::read_to_string(roadmap_path)
        .with_context(|| format!("Failed to read roadmap from {:?}", roadmap_path))?;
    let roadmap = Roadmap::from_json_str(&contents)
        .with_context(|| format!("Invalid roadmap {:?}", roadmap_path))?;

    let course_id = course.unwrap_or_else(|| roadmap.title.clone());
    let (cache, remote) = backends(config)?;
    let mut session = CourseSession::new(
        course_id,
        roadmap,
        config,
        cache,
        remote,
        CredentialStore::load_optional(),
    );
    session.load().await;
    Ok(session)
}

async fn load_caller_stats(config: &Config) -> Result<CallerStats> {
    let (cache, remote) = backends(config)?;
    let mut store = SkillStore::new(cache, remote)
        .with_config(config)
        .with_identity(CredentialStore::load_optional());
    Ok(CallerStats::from_profile(store.load().await))
}

fn print_status(session: &CourseSession) {
    println!("{}: {}% complete", session.roadmap().title, session.completion_percent());

    for unit in &session.roadmap().units {
        println!("{}", unit.title);
        for chapter in &unit.chapters {
            println!("  {}", chapter.title);
            for lesson in &chapter.lessons {
                let mark = if session.is_complete(&lesson.id) {
                    "x"
                } else if session.is_locked(&lesson.id) {
                    "-"
                } else {
                    " "
                };
                println!("    [{}] {:<12} {}", mark, lesson.id, lesson.title);
            }
        }
    }

    if let Some(resume) = session.resume_point() {
        println!("Resume at: {}", resume);
    }
    println!("Time spent: {} min", session.state().total_time_spent);
}
