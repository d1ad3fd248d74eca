//! Witter store facade
//!
//! Owns the three composites and checks cross-composite references before
//! delegating a write. Reads go straight to the composite that answers them.

use crate::index::{IndexStats, DEFAULT_BUCKETS};
use crate::store::error::{StoreError, StoreResult};
use crate::store::follows::FollowGraph;
use crate::store::types::{Follow, Timestamp, User, UserId, Weet};
use crate::store::users::UserDirectory;
use crate::store::weets::{WeetArchive, DEFAULT_TRENDING_LIMIT};
use serde::{Deserialize, Serialize};

/// Configuration for the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Buckets in each identity table (default: 97)
    #[serde(default = "default_bucket_count")]
    pub bucket_count: usize,

    /// Labels returned by `get_trending` (default and maximum: 10)
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,

    /// Reject follows and weets that name unknown users
    #[serde(default = "default_validate_references")]
    pub validate_references: bool,
}

fn default_bucket_count() -> usize {
    DEFAULT_BUCKETS
}

fn default_trending_limit() -> usize {
    DEFAULT_TRENDING_LIMIT
}

fn default_validate_references() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket_count: default_bucket_count(),
            trending_limit: default_trending_limit(),
            validate_references: default_validate_references(),
        }
    }
}

/// In-memory micro-blogging store
#[derive(Debug)]
pub struct Witter {
    config: StoreConfig,
    users: UserDirectory,
    follows: FollowGraph,
    weets: WeetArchive,
}

impl Default for Witter {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl Witter {
    pub fn new(config: StoreConfig) -> Self {
        tracing::debug!(
            "Creating store: buckets={}, trending_limit={}, validate_references={}",
            config.bucket_count,
            config.trending_limit,
            config.validate_references
        );

        Self {
            users: UserDirectory::with_buckets(config.bucket_count),
            follows: FollowGraph::new(),
            weets: WeetArchive::with_settings(config.bucket_count, config.trending_limit),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Register a user. Returns `false` if the id is taken.
    pub fn add_user(&mut self, user: User) -> bool {
        self.users.add_user(user)
    }

    fn require_user(&self, id: UserId) -> StoreResult<()> {
        if self.config.validate_references && !self.users.contains(id) {
            return Err(StoreError::UnknownUser(id));
        }
        Ok(())
    }

    /// Record that `follower` follows `followee`.
    ///
    /// Returns `Ok(false)` for an existing relationship.
    pub fn add_follower(
        &mut self,
        follower: UserId,
        followee: UserId,
        since: Timestamp,
    ) -> StoreResult<bool> {
        if follower == followee {
            return Err(StoreError::SelfFollow(follower));
        }
        self.require_user(follower)?;
        self.require_user(followee)?;

        Ok(self.follows.add_follower(follower, followee, since))
    }

    /// Record a [`Follow`] relationship
    pub fn add_follow(&mut self, follow: Follow) -> StoreResult<bool> {
        self.add_follower(follow.follower, follow.followee, follow.since)
    }

    /// Archive a weet. Returns `Ok(false)` if its id is taken.
    pub fn add_weet(&mut self, weet: Weet) -> StoreResult<bool> {
        self.require_user(weet.author)?;
        Ok(self.weets.add_weet(weet))
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn follows(&self) -> &FollowGraph {
        &self.follows
    }

    pub fn weets(&self) -> &WeetArchive {
        &self.weets
    }

    /// Snapshot of sizes and index shapes
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            users: self.users.len(),
            users_in_graph: self.follows.user_count(),
            follows: self.follows.edge_count(),
            weets: self.weets.len(),
            hashtags: self.weets.hashtag_len(),
            join_index: self.users.join_index_stats(),
            graph_index: self.follows.user_index_stats(),
            date_index: self.weets.date_index_stats(),
        }
    }
}

/// Store statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub users: usize,
    /// Users with at least one relationship
    pub users_in_graph: usize,
    pub follows: usize,
    pub weets: usize,
    /// Distinct hashtags
    pub hashtags: usize,
    pub join_index: IndexStats,
    pub graph_index: IndexStats,
    pub date_index: IndexStats,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Users: {}, Follows: {} ({} users), Weets: {}, Hashtags: {}, Heights: {}/{}/{}",
            self.users,
            self.follows,
            self.users_in_graph,
            self.weets,
            self.hashtags,
            self.join_index.height,
            self.graph_index.height,
            self.date_index.height
        )
    }
}
