//! Witter CLI
//!
//! Loads CSV datasets into an in-memory store and answers queries:
//! - Users by id, name, join date
//! - Followers, follows, mutual relationships, top users
//! - Weets by id, author, text, day, date
//! - Trending hashtags

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use witter::config::{generate_default_config, Config, LoggingConfig};
use witter::store::parse_timestamp;
use witter::{CsvImporter, User, UserId, Weet, WeetId, Witter};

#[derive(Parser)]
#[command(name = "witter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory micro-blogging store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Users CSV (id,name,joined)
    #[arg(long, global = true)]
    pub users: Option<PathBuf>,

    /// Follows CSV (follower,followee,since)
    #[arg(long, global = true)]
    pub follows: Option<PathBuf>,

    /// Weets CSV (id,author,text,posted)
    #[arg(long, global = true)]
    pub weets: Option<PathBuf>,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show store statistics
    Stats,

    /// Show one user
    User {
        /// User id
        id: UserId,
    },

    /// List users, most recently joined first
    Users {
        /// Only names containing this text
        #[arg(long)]
        containing: Option<String>,
        /// Only users who joined before this time
        #[arg(long)]
        before: Option<String>,
    },

    /// Users following a user, most recent first
    Followers {
        /// User id
        id: UserId,
    },

    /// Users a user follows, most recent first
    Follows {
        /// User id
        id: UserId,
    },

    /// Check whether one user follows another
    IsFollower {
        /// Follower id
        follower: UserId,
        /// Followee id
        followee: UserId,
    },

    /// Users following both users
    MutualFollowers { a: UserId, b: UserId },

    /// Users followed by both users
    MutualFollows { a: UserId, b: UserId },

    /// Users with the most followers
    TopUsers {
        /// Number of users to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List weets, newest first
    Weets {
        /// A single weet by id
        #[arg(long, conflicts_with_all = ["author", "containing", "on", "at", "before"])]
        id: Option<WeetId>,
        /// Only weets by this author
        #[arg(long, conflicts_with_all = ["containing", "on", "at", "before"])]
        author: Option<UserId>,
        /// Only weets whose text contains this
        #[arg(long, conflicts_with_all = ["on", "at", "before"])]
        containing: Option<String>,
        /// Only weets posted on this day (YYYY-MM-DD, UTC)
        #[arg(long, conflicts_with_all = ["at", "before"])]
        on: Option<String>,
        /// Only weets posted at exactly this time
        #[arg(long, conflicts_with = "before")]
        at: Option<String>,
        /// Only weets posted before this time
        #[arg(long)]
        before: Option<String>,
    },

    /// Most used hashtags
    Trending,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging)?;

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                // Create parent directory if needed
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let store = load_store(&cli, &config)?;
    let json = cli.format == "json";

    match cli.command {
        Commands::Stats => {
            let stats = store.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Witter v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Users:      {}", stats.users);
                println!("Follows:    {} ({} users)", stats.follows, stats.users_in_graph);
                println!("Weets:      {}", stats.weets);
                println!("Hashtags:   {}", stats.hashtags);
                println!(
                    "Heights:    users {}, graph {}, weets {}",
                    stats.join_index.height, stats.graph_index.height, stats.date_index.height
                );
            }
        }

        Commands::User { id } => {
            let Some(user) = store.users().get_user(id) else {
                bail!("User {} not found", id);
            };
            if json {
                let value = serde_json::json!({
                    "user": user,
                    "followers": store.follows().get_num_followers(id),
                    "follows": store.follows().get_num_follows(id),
                    "weets": store.weets().get_weets_by_user(id).len(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_users(&[user]);
                println!();
                println!("Followers: {}", store.follows().get_num_followers(id));
                println!("Follows:   {}", store.follows().get_num_follows(id));
            }
        }

        Commands::Users { containing, before } => {
            let before = before.as_deref().map(parse_timestamp).transpose()?;
            let users: Vec<Arc<User>> = match (containing, before) {
                (Some(text), None) => store.users().get_users_containing(&text),
                (Some(text), Some(date)) => {
                    let mut users = store.users().get_users_containing(&text);
                    users.retain(|u| u.joined < date);
                    users
                }
                (None, Some(date)) => store.users().get_users_joined_before(date),
                (None, None) => store.users().get_users().to_vec(),
            };
            let users: Vec<&User> = users.iter().map(|u| u.as_ref()).collect();
            output_users(&users, json)?;
        }

        Commands::Followers { id } => {
            output_ids(&store, &store.follows().get_followers(id), json)?;
        }

        Commands::Follows { id } => {
            output_ids(&store, &store.follows().get_follows(id), json)?;
        }

        Commands::IsFollower { follower, followee } => {
            let answer = store.follows().is_a_follower(follower, followee);
            if json {
                println!("{}", serde_json::json!({ "is_follower": answer }));
            } else if answer {
                println!("User {} follows user {}", follower, followee);
            } else {
                println!("User {} does not follow user {}", follower, followee);
            }
        }

        Commands::MutualFollowers { a, b } => {
            output_ids(&store, &store.follows().get_mutual_followers(a, b), json)?;
        }

        Commands::MutualFollows { a, b } => {
            output_ids(&store, &store.follows().get_mutual_follows(a, b), json)?;
        }

        Commands::TopUsers { limit } => {
            let top = store.follows().get_top_users();
            let top = &top[..limit.min(top.len())];

            if json {
                let rows: Vec<serde_json::Value> = top
                    .iter()
                    .map(|&id| {
                        serde_json::json!({
                            "id": id,
                            "name": store.users().get_user(id).map(|u| u.name.as_str()),
                            "followers": store.follows().get_num_followers(id),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:<8} | {:<20} | {:>9}", "Id", "Name", "Followers");
                println!("{}", "-".repeat(43));
                for &id in top {
                    println!(
                        "{:<8} | {:<20} | {:>9}",
                        id,
                        user_name(&store, id),
                        store.follows().get_num_followers(id)
                    );
                }
            }
        }

        Commands::Weets {
            id,
            author,
            containing,
            on,
            at,
            before,
        } => {
            let weets: Vec<Arc<Weet>> = if let Some(id) = id {
                let Some(weet) = store.weets().get_weet(id) else {
                    bail!("Weet {} not found", id);
                };
                vec![Arc::new(weet.clone())]
            } else if let Some(author) = author {
                store.weets().get_weets_by_user(author)
            } else if let Some(text) = containing {
                store.weets().get_weets_containing(&text)
            } else if let Some(day) = on {
                let day = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
                    .with_context(|| format!("Invalid day: {}", day))?;
                store.weets().get_weets_on(day)
            } else if let Some(date) = at {
                store.weets().get_weets_at(parse_timestamp(&date)?)
            } else if let Some(date) = before {
                store.weets().get_weets_before(parse_timestamp(&date)?)
            } else {
                store.weets().get_weets()
            };

            let weets: Vec<&Weet> = weets.iter().map(|w| w.as_ref()).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&weets)?);
            } else {
                print_weets(&store, &weets);
            }
        }

        Commands::Trending => {
            let trending = store.weets().get_trending();
            if json {
                println!("{}", serde_json::to_string_pretty(&trending)?);
            } else if trending.is_empty() {
                println!("No hashtags yet");
            } else {
                for (rank, tag) in trending.iter().enumerate() {
                    println!(
                        "{:>2}. {:<24} {}",
                        rank + 1,
                        tag,
                        store.weets().hashtag_count(tag)
                    );
                }
            }
        }

        Commands::Config { .. } => unreachable!("handled before loading the store"),
    }

    Ok(())
}

/// Install the tracing subscriber described by `logging`
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level: {}", logging.level))?;

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init(),
    }

    Ok(())
}

/// Build a store from config and load whichever datasets were given
fn load_store(cli: &Cli, config: &Config) -> anyhow::Result<Witter> {
    let mut store = Witter::new(config.store.clone());
    let importer = CsvImporter::new();

    type Loader = fn(&CsvImporter, &Path, &mut Witter) -> witter::StoreResult<witter::ImportReport>;
    let datasets: [(&str, &Option<PathBuf>, Loader); 3] = [
        ("users", &cli.users, CsvImporter::import_users),
        ("follows", &cli.follows, CsvImporter::import_follows),
        ("weets", &cli.weets, CsvImporter::import_weets),
    ];

    for (name, path, load) in datasets {
        let Some(path) = path else { continue };
        let report = load(&importer, path, &mut store)
            .with_context(|| format!("Failed to import {} from {:?}", name, path))?;

        if report.rows_rejected > 0 {
            eprintln!("{}: {} rows rejected", name, report.rows_rejected);
            for error in &report.errors {
                eprintln!("  {}", error);
            }
        }
    }

    tracing::info!("Store loaded: {}", store.stats());
    Ok(store)
}

fn user_name(store: &Witter, id: UserId) -> String {
    store
        .users()
        .get_user(id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "-".to_string())
}

fn output_users(users: &[&User], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(users)?);
    } else {
        print_users(users);
    }
    Ok(())
}

fn output_ids(store: &Witter, ids: &[UserId], json: bool) -> anyhow::Result<()> {
    let users: Vec<&User> = ids
        .iter()
        .filter_map(|&id| store.users().get_user(id))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else if users.len() == ids.len() {
        print_users(&users);
    } else {
        // Some ids were never registered; print them bare
        for id in ids {
            println!("{:<8} | {}", id, user_name(store, *id));
        }
    }
    Ok(())
}

fn print_users(users: &[&User]) {
    if users.is_empty() {
        println!("No users");
        return;
    }

    println!("{:<8} | {:<20} | {}", "Id", "Name", "Joined");
    println!("{}", "-".repeat(50));
    for user in users {
        println!(
            "{:<8} | {:<20} | {}",
            user.id,
            user.name,
            user.joined.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_weets(store: &Witter, weets: &[&Weet]) {
    if weets.is_empty() {
        println!("No weets");
        return;
    }

    for weet in weets {
        println!(
            "[{}] #{} {} ({}): {}",
            weet.posted.format("%Y-%m-%d %H:%M"),
            weet.id,
            user_name(store, weet.author),
            weet.author,
            weet.text
        );
    }
}
