//! # Witter
//!
//! In-memory micro-blogging store: users, follower relationships and short
//! posts ("weets"), indexed with hand-built multiway trees, chained hash
//! tables and a self-ordering popularity list.
//!
//! ## Features
//!
//! - **Ordered indexes**: order-4 B-tree with lazy ascending/descending scans
//! - **Point lookups**: fixed-bucket chained hash tables keyed by id
//! - **Follower graph**: per-user follower/follows indexes, mutual queries
//! - **Trending**: hashtag popularity kept in rank order as weets arrive
//! - **Import**: CSV datasets for users, follows and weets
//!
//! ## Modules
//!
//! - [`index`]: Generic index structures
//! - [`store`]: User Directory, Follow Graph, Weet Archive and the `Witter` facade
//! - [`import`]: CSV dataset loader
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use witter::{StoreConfig, User, Weet, Witter};
//!
//! let mut store = Witter::new(StoreConfig::default());
//! let when = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
//!
//! store.add_user(User::new(1, "ada", when));
//! store.add_user(User::new(2, "alan", when));
//! store.add_follower(1, 2, when)?;
//! store.add_weet(Weet::new(10, 2, "machines #think", when))?;
//!
//! assert!(store.follows().is_a_follower(1, 2));
//! assert_eq!(store.weets().get_trending(), vec!["#think"]);
//! # Ok::<(), witter::StoreError>(())
//! ```

pub mod config;
pub mod import;
pub mod index;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    Follow, FollowGraph, StoreConfig, StoreError, StoreResult, StoreStats, Timestamp, User,
    UserDirectory, UserId, Weet, WeetArchive, WeetId, Witter,
};

pub use index::{IdentityTable, IndexStats, OrderedIndex, RankList};

pub use config::{Config, ConfigError, LoggingConfig};

pub use import::{CsvImporter, ImportReport};
