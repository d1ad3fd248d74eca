//! Follow Graph - tree of per-user relationship indexes
//!
//! An outer [`OrderedIndex`] keyed by user id holds, for each user involved in
//! at least one relationship, two [`RelationIndex`] sub-indexes:
//!
//! ```text
//! user 7 ─┬─ followers: who follows 7, keyed by since-date
//!         └─ follows:   whom 7 follows, keyed by since-date
//! ```
//!
//! Each edge is stored twice: once in the followee's `followers` and once in
//! the follower's `follows`. Entries are created lazily on first use.
//!
//! # Performance
//! - `add_follower`: O(log M + log N)
//! - `is_a_follower`: O(log M + log N)
//! - `get_followers` / `get_follows`: O(log M + N)
//! - `get_mutual_*`: O(min · log max)
//! - `get_top_users`: O(M log M)

use crate::index::{IndexStats, OrderedIndex};
use crate::store::types::{Timestamp, UserId};

/// One direction of a user's relationships
///
/// `by_date` answers "newest first"; `by_user` answers membership in
/// O(log N) without scanning dates.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    by_date: OrderedIndex<Timestamp, UserId>,
    by_user: OrderedIndex<UserId, Timestamp>,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `user` as related since `since`. Returns `false` if already present.
    pub fn insert(&mut self, user: UserId, since: Timestamp) -> bool {
        if self.by_user.contains(&user) {
            return false;
        }

        self.by_date.insert(since, user);
        self.by_user.insert(user, since);
        true
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.by_user.contains(&user)
    }

    /// When the relationship with `user` started
    pub fn since(&self, user: UserId) -> Option<Timestamp> {
        self.by_user.search(&user).copied()
    }

    /// Related users, most recent relationship first
    pub fn newest_first(&self) -> Vec<UserId> {
        self.by_date.iter_rev().map(|(_, user)| *user).collect()
    }

    /// `(user, since)` pairs in ascending date order
    pub fn entries(&self) -> impl Iterator<Item = (UserId, Timestamp)> + '_ {
        self.by_date.iter().map(|(since, user)| (*user, *since))
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }

    /// Users present in both indexes, each keeping the later of its two dates
    ///
    /// Materializes the smaller side and probes the larger one.
    pub fn intersect(&self, other: &RelationIndex) -> RelationIndex {
        let (small, large) = if self.len() < other.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut mutual = RelationIndex::new();
        for (user, since) in small.entries() {
            if let Some(other_since) = large.since(user) {
                mutual.insert(user, since.max(other_since));
            }
        }
        mutual
    }
}

/// Both relationship directions for one user
#[derive(Debug, Clone, Default)]
struct Relations {
    followers: RelationIndex,
    follows: RelationIndex,
}

/// Follower relationships between users
#[derive(Debug, Default)]
pub struct FollowGraph {
    users: OrderedIndex<UserId, Relations>,
    edges: usize,
}

impl FollowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relations for `user`, created on first use
    fn relations_mut(&mut self, user: UserId) -> &mut Relations {
        if !self.users.contains(&user) {
            self.users.insert(user, Relations::default());
        }

        match self.users.search_mut(&user) {
            Some(relations) => relations,
            None => unreachable!("user {} missing right after insert", user),
        }
    }

    /// Record that `follower` follows `followee` since `since`.
    ///
    /// Returns `false` without touching either side if the relationship
    /// already exists, so the two sides always hold the same edges.
    pub fn add_follower(&mut self, follower: UserId, followee: UserId, since: Timestamp) -> bool {
        if self.is_a_follower(follower, followee) {
            tracing::debug!("Rejected duplicate follow {} -> {}", follower, followee);
            return false;
        }

        let followee_added = self
            .relations_mut(followee)
            .followers
            .insert(follower, since);
        let follower_added = self
            .relations_mut(follower)
            .follows
            .insert(followee, since);
        debug_assert!(followee_added && follower_added, "follow sides diverged");

        self.edges += 1;
        tracing::debug!("Added follow {} -> {} since {}", follower, followee, since);
        true
    }

    fn relations(&self, user: UserId) -> Option<&Relations> {
        self.users.search(&user)
    }

    /// Users following `user`, most recent first
    pub fn get_followers(&self, user: UserId) -> Vec<UserId> {
        self.relations(user)
            .map(|r| r.followers.newest_first())
            .unwrap_or_default()
    }

    /// Users that `user` follows, most recent first
    pub fn get_follows(&self, user: UserId) -> Vec<UserId> {
        self.relations(user)
            .map(|r| r.follows.newest_first())
            .unwrap_or_default()
    }

    /// Check whether `follower` follows `followee`
    pub fn is_a_follower(&self, follower: UserId, followee: UserId) -> bool {
        self.relations(followee)
            .map(|r| r.followers.contains(follower))
            .unwrap_or(false)
    }

    /// Number of users following `user`
    pub fn get_num_followers(&self, user: UserId) -> usize {
        self.relations(user)
            .map(|r| r.followers.len())
            .unwrap_or(0)
    }

    /// Number of users `user` follows
    pub fn get_num_follows(&self, user: UserId) -> usize {
        self.relations(user).map(|r| r.follows.len()).unwrap_or(0)
    }

    /// Users following both `a` and `b`, most recent (later date) first
    pub fn get_mutual_followers(&self, a: UserId, b: UserId) -> Vec<UserId> {
        match (self.relations(a), self.relations(b)) {
            (Some(ra), Some(rb)) => ra.followers.intersect(&rb.followers).newest_first(),
            _ => Vec::new(),
        }
    }

    /// Users followed by both `a` and `b`, most recent (later date) first
    pub fn get_mutual_follows(&self, a: UserId, b: UserId) -> Vec<UserId> {
        match (self.relations(a), self.relations(b)) {
            (Some(ra), Some(rb)) => ra.follows.intersect(&rb.follows).newest_first(),
            _ => Vec::new(),
        }
    }

    /// Every user in the graph, most followers first
    ///
    /// Ties are broken by ascending user id.
    pub fn get_top_users(&self) -> Vec<UserId> {
        let mut counts: Vec<(UserId, usize)> = self
            .users
            .iter()
            .map(|(user, relations)| (*user, relations.followers.len()))
            .collect();

        counts.sort_unstable_by(|(id_a, count_a), (id_b, count_b)| {
            count_b.cmp(count_a).then(id_a.cmp(id_b))
        });

        counts.into_iter().map(|(user, _)| user).collect()
    }

    /// Users involved in at least one relationship
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Distinct follower relationships
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Shape of the outer user-id index
    pub fn user_index_stats(&self) -> IndexStats {
        IndexStats::from(&self.users)
    }
}
