//! Witter Index Structures
//!
//! Hand-built building blocks shared by the composite stores:
//!
//! - **OrderedIndex**: order-4 B-tree for O(log n) insert/search and ordered scans
//! - **IdentityTable**: fixed-bucket chained hash table for O(1) lookup by id
//! - **RankList**: self-ordering linked list for popularity rankings
//!
//! # Architecture
//!
//! ```text
//! UserDirectory:  IdentityTable<user id>  +  OrderedIndex<join date>
//! FollowGraph:    OrderedIndex<user id> → { followers, follows } sub-indexes
//! WeetArchive:    Vec<Weet> + IdentityTable<weet id> + OrderedIndex<post date> + RankList
//! ```

mod identity;
mod ordered;
mod rank;

pub use identity::{Identified, IdentityTable, DEFAULT_BUCKETS};
pub use ordered::{Iter, OrderedIndex, ORDER};
pub use rank::RankList;

/// Statistics about an index family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IndexStats {
    /// Entries stored
    pub entries: usize,
    /// Tree height (0 for a single leaf, or for non-tree structures)
    pub height: usize,
}

impl<K: Ord + Clone, V> From<&OrderedIndex<K, V>> for IndexStats {
    fn from(index: &OrderedIndex<K, V>) -> Self {
        Self {
            entries: index.len(),
            height: index.height(),
        }
    }
}
