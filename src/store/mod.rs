//! Witter Store
//!
//! The composites callers read and write through:
//!
//! - **types**: Core data structures (User, Weet, Follow)
//! - **users**: User Directory (id table + join-date index)
//! - **follows**: Follow Graph (user tree of relationship indexes)
//! - **weets**: Weet Archive (array + id table + date index + hashtag ranking)
//! - **engine**: `Witter` facade validating references across composites
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Witter::add_* → validate references → composite → index structures
//!
//! Read Path:
//!   Query → composite → point lookup | ordered scan | rank walk
//! ```
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use witter::store::{User, Weet, Witter};
//!
//! let mut store = Witter::default();
//! let joined = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//!
//! store.add_user(User::new(1, "ada", joined));
//! store.add_user(User::new(2, "alan", joined));
//! store.add_follower(2, 1, joined).unwrap();
//! store.add_weet(Weet::new(1, 1, "hello #world", joined)).unwrap();
//!
//! assert_eq!(store.follows().get_followers(1), vec![2]);
//! assert_eq!(store.weets().get_trending(), vec!["#world"]);
//! ```

pub mod engine;
pub mod error;
pub mod follows;
pub mod types;
pub mod users;
pub mod weets;

// Re-export commonly used types
pub use engine::{StoreConfig, StoreStats, Witter};
pub use error::{StoreError, StoreResult};
pub use follows::{FollowGraph, RelationIndex};
pub use types::{day_bounds, parse_timestamp, Follow, Timestamp, User, UserId, Weet, WeetId};
pub use users::UserDirectory;
pub use weets::{WeetArchive, DEFAULT_TRENDING_LIMIT};
