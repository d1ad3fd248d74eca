//! Weet Archive
//!
//! The archive keeps every weet in an append-only array (the primary store)
//! and indexes it three ways:
//!
//! ```text
//! weets:     [w0, w1, w2, ...]            insertion order
//! by_id:     IdentityTable<weet id>       getWeet
//! by_posted: OrderedIndex<post date>      date filters, newest first
//! hashtags:  RankList                     trending
//! ```
//!
//! `add_weet` writes all of them in one call or none of them.

use crate::index::{IdentityTable, IndexStats, OrderedIndex, RankList, DEFAULT_BUCKETS};
use crate::store::types::{day_bounds, Timestamp, UserId, Weet, WeetId};
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::sync::Arc;

/// Default, and largest, number of labels returned by
/// [`WeetArchive::get_trending`]
pub const DEFAULT_TRENDING_LIMIT: usize = 10;

/// Posts by insertion, id, date and hashtag popularity
#[derive(Debug)]
pub struct WeetArchive {
    weets: Vec<Arc<Weet>>,
    by_id: IdentityTable<Arc<Weet>>,
    by_posted: OrderedIndex<Timestamp, Arc<Weet>>,
    hashtags: RankList,
    trending_limit: usize,
}

impl Default for WeetArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl WeetArchive {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_BUCKETS, DEFAULT_TRENDING_LIMIT)
    }

    /// Archive with `bucket_count` id buckets. `trending_limit` is capped at
    /// [`DEFAULT_TRENDING_LIMIT`].
    pub fn with_settings(bucket_count: usize, trending_limit: usize) -> Self {
        Self {
            weets: Vec::new(),
            by_id: IdentityTable::with_buckets(bucket_count),
            by_posted: OrderedIndex::new(),
            hashtags: RankList::new(),
            trending_limit: trending_limit.min(DEFAULT_TRENDING_LIMIT),
        }
    }

    /// Archive a weet. Returns `false` if its id is already taken.
    pub fn add_weet(&mut self, weet: Weet) -> bool {
        let weet = Arc::new(weet);

        if !self.by_id.insert_if_absent(Arc::clone(&weet)) {
            tracing::debug!("Rejected duplicate weet id {}", weet.id);
            return false;
        }

        self.weets.push(Arc::clone(&weet));
        self.by_posted.insert(weet.posted, Arc::clone(&weet));
        for tag in weet.hashtags() {
            self.hashtags.record(tag);
        }

        tracing::debug!("Added weet {} by user {}", weet.id, weet.author);
        true
    }

    /// Look up a weet by id
    pub fn get_weet(&self, id: WeetId) -> Option<&Weet> {
        self.by_id.get(u64::from(id)).map(|weet| weet.as_ref())
    }

    pub fn contains(&self, id: WeetId) -> bool {
        self.by_id.contains(u64::from(id))
    }

    /// Newest first; equal dates list the most recently added first
    fn newest_first<'a>(weets: impl DoubleEndedIterator<Item = &'a Arc<Weet>>) -> Vec<Arc<Weet>> {
        let mut sorted: Vec<Arc<Weet>> = weets.rev().cloned().collect();
        sorted.sort_by_key(|weet| Reverse(weet.posted));
        sorted
    }

    /// Every weet, newest first
    pub fn get_weets(&self) -> Vec<Arc<Weet>> {
        Self::newest_first(self.weets.iter())
    }

    /// Weets written by `author`, newest first
    pub fn get_weets_by_user(&self, author: UserId) -> Vec<Arc<Weet>> {
        Self::newest_first(self.weets.iter().filter(|weet| weet.author == author))
    }

    /// Weets whose text contains `query`, newest first
    pub fn get_weets_containing(&self, query: &str) -> Vec<Arc<Weet>> {
        self.by_posted
            .iter_rev()
            .filter(|(_, weet)| weet.text.contains(query))
            .map(|(_, weet)| Arc::clone(weet))
            .collect()
    }

    /// Weets posted on the given UTC calendar day, newest first
    pub fn get_weets_on(&self, day: NaiveDate) -> Vec<Arc<Weet>> {
        let (start, end) = day_bounds(day);
        match end {
            Some(end) => self
                .by_posted
                .between_rev(&start, &end)
                .map(|(_, weet)| Arc::clone(weet))
                .collect(),
            None => self
                .by_posted
                .iter_rev()
                .take_while(|(posted, _)| **posted >= start)
                .map(|(_, weet)| Arc::clone(weet))
                .collect(),
        }
    }

    /// Weets posted at exactly `at`, most recently added first
    pub fn get_weets_at(&self, at: Timestamp) -> Vec<Arc<Weet>> {
        self.by_posted
            .iter_rev()
            .skip_while(|(posted, _)| **posted > at)
            .take_while(|(posted, _)| **posted == at)
            .map(|(_, weet)| Arc::clone(weet))
            .collect()
    }

    /// Weets posted strictly before `date`, newest first
    pub fn get_weets_before(&self, date: Timestamp) -> Vec<Arc<Weet>> {
        let mut weets: Vec<Arc<Weet>> = self
            .by_posted
            .before(&date)
            .map(|(_, weet)| Arc::clone(weet))
            .collect();
        weets.reverse();
        weets
    }

    /// Most used hashtags, highest count first
    pub fn get_trending(&self) -> Vec<String> {
        self.hashtags.top(self.trending_limit)
    }

    /// Times `tag` has been used (counted once per weet)
    pub fn hashtag_count(&self, tag: &str) -> u64 {
        self.hashtags.count(tag)
    }

    /// Distinct hashtags seen
    pub fn hashtag_len(&self) -> usize {
        self.hashtags.len()
    }

    pub fn trending_limit(&self) -> usize {
        self.trending_limit
    }

    pub fn len(&self) -> usize {
        self.weets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weets.is_empty()
    }

    /// Shape of the post-date index
    pub fn date_index_stats(&self) -> IndexStats {
        IndexStats::from(&self.by_posted)
    }
}
