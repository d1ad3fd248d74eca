//! User Directory
//!
//! Stores every user twice:
//! - an [`IdentityTable`] keyed by user id for O(1) `get_user`
//! - an [`OrderedIndex`] keyed by join date for newest-first listings
//!
//! The full newest-first listing is materialized once and cached until the
//! next successful insert.

use crate::index::{IdentityTable, IndexStats, OrderedIndex, DEFAULT_BUCKETS};
use crate::store::types::{Timestamp, User, UserId};
use std::cell::OnceCell;
use std::sync::Arc;

/// Users by id and by join date
#[derive(Debug)]
pub struct UserDirectory {
    by_id: IdentityTable<Arc<User>>,
    by_joined: OrderedIndex<Timestamp, Arc<User>>,
    /// Newest-first snapshot of `by_joined`
    newest_first: OnceCell<Vec<Arc<User>>>,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Create a directory whose id table has `bucket_count` buckets
    pub fn with_buckets(bucket_count: usize) -> Self {
        Self {
            by_id: IdentityTable::with_buckets(bucket_count),
            by_joined: OrderedIndex::new(),
            newest_first: OnceCell::new(),
        }
    }

    /// Add a user. Returns `false` if the id is already taken.
    ///
    /// A rejected user touches neither index.
    pub fn add_user(&mut self, user: User) -> bool {
        let user = Arc::new(user);

        if !self.by_id.insert_if_absent(Arc::clone(&user)) {
            tracing::debug!("Rejected duplicate user id {}", user.id);
            return false;
        }

        self.by_joined.insert(user.joined, Arc::clone(&user));
        self.newest_first.take();

        tracing::debug!("Added user {} ({})", user.id, user.name);
        true
    }

    /// Look up a user by id
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.by_id.get(u64::from(id)).map(|user| user.as_ref())
    }

    /// Check if a user id is registered
    pub fn contains(&self, id: UserId) -> bool {
        self.by_id.contains(u64::from(id))
    }

    /// All users, most recently joined first
    pub fn get_users(&self) -> &[Arc<User>] {
        self.newest_first.get_or_init(|| {
            self.by_joined
                .iter_rev()
                .map(|(_, user)| Arc::clone(user))
                .collect()
        })
    }

    /// Users whose name contains `query`, most recently joined first
    pub fn get_users_containing(&self, query: &str) -> Vec<Arc<User>> {
        self.by_joined
            .iter_rev()
            .filter(|(_, user)| user.name.contains(query))
            .map(|(_, user)| Arc::clone(user))
            .collect()
    }

    /// Users who joined strictly before `date`, most recently joined first
    pub fn get_users_joined_before(&self, date: Timestamp) -> Vec<Arc<User>> {
        let mut users: Vec<Arc<User>> = self
            .by_joined
            .before(&date)
            .map(|(_, user)| Arc::clone(user))
            .collect();
        users.reverse();
        users
    }

    /// Number of distinct users
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Shape of the join-date index
    pub fn join_index_stats(&self) -> IndexStats {
        IndexStats::from(&self.by_joined)
    }

    /// Longest chain in the id table
    pub fn longest_chain(&self) -> usize {
        self.by_id.longest_chain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2015, 3, d, 12, 0, 0).unwrap()
    }

    fn ids(users: &[Arc<User>]) -> Vec<UserId> {
        users.iter().map(|u| u.id).collect()
    }

    fn sample_directory() -> UserDirectory {
        let mut directory = UserDirectory::new();
        directory.add_user(User::new(1, "alice", day(1)));
        directory.add_user(User::new(2, "bob", day(3)));
        directory.add_user(User::new(3, "alicia", day(2)));
        directory.add_user(User::new(4, "carol", day(5)));
        directory
    }

    #[test]
    fn test_add_and_get_user() {
        let directory = sample_directory();

        assert_eq!(directory.len(), 4);
        assert_eq!(directory.get_user(2).map(|u| u.name.as_str()), Some("bob"));
        assert!(directory.get_user(99).is_none());
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let mut directory = sample_directory();

        assert!(!directory.add_user(User::new(2, "impostor", day(9))));
        assert_eq!(directory.len(), 4);
        assert_eq!(directory.get_user(2).map(|u| u.name.as_str()), Some("bob"));
        // The join-date index is untouched as well
        assert_eq!(directory.get_users().len(), 4);
        assert_eq!(directory.join_index_stats().entries, 4);
    }

    #[test]
    fn test_get_users_newest_first() {
        let directory = sample_directory();
        assert_eq!(ids(directory.get_users()), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_cache_invalidated_by_insert() {
        let mut directory = sample_directory();
        assert_eq!(directory.get_users().len(), 4);

        directory.add_user(User::new(5, "dave", day(4)));
        assert_eq!(ids(directory.get_users()), vec![4, 5, 2, 3, 1]);
    }

    #[test]
    fn test_get_users_containing() {
        let directory = sample_directory();

        assert_eq!(ids(&directory.get_users_containing("ali")), vec![3, 1]);
        assert!(directory.get_users_containing("zed").is_empty());
        assert_eq!(directory.get_users_containing("").len(), 4);
    }

    #[test]
    fn test_get_users_joined_before() {
        let directory = sample_directory();

        assert_eq!(ids(&directory.get_users_joined_before(day(3))), vec![3, 1]);
        assert!(directory.get_users_joined_before(day(1)).is_empty());
    }

    #[test]
    fn test_many_users_same_day() {
        let mut directory = UserDirectory::with_buckets(7);
        for id in 0..200 {
            assert!(directory.add_user(User::new(id, format!("user{}", id), day(1))));
        }

        assert_eq!(directory.len(), 200);
        // Equal join dates list the most recently added first
        assert_eq!(directory.get_users()[0].id, 199);
        assert_eq!(directory.get_users()[199].id, 0);
        assert!(directory.join_index_stats().height > 0);
    }
}
