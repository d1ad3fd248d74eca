//! Identity Table - fixed-bucket hash table with chaining
//!
//! Maps a numeric entity id to the entity for O(1) amortized point lookups.
//! Each bucket is a singly linked chain; new entities are prepended.
//!
//! # Design Notes
//! - The bucket count is fixed for the lifetime of the table (no rehashing).
//!   It defaults to the prime [`DEFAULT_BUCKETS`], which keeps chains short
//!   while the load stays small relative to the bucket count.
//! - Insert is insert-if-absent: an existing id is never overwritten.

use std::sync::Arc;

/// Default number of buckets (prime, to spread sequential ids)
pub const DEFAULT_BUCKETS: usize = 97;

/// An entity addressable by a numeric identifier
pub trait Identified {
    fn id(&self) -> u64;
}

impl<T: Identified + ?Sized> Identified for Arc<T> {
    fn id(&self) -> u64 {
        (**self).id()
    }
}

/// One link in a bucket chain
#[derive(Debug)]
struct Link<T> {
    entity: T,
    next: Option<Box<Link<T>>>,
}

/// Fixed-size hash table keyed by [`Identified::id`]
#[derive(Debug)]
pub struct IdentityTable<T> {
    buckets: Vec<Option<Box<Link<T>>>>,
    len: usize,
}

impl<T: Identified> Default for IdentityTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identified> IdentityTable<T> {
    /// Create a table with [`DEFAULT_BUCKETS`] buckets
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Create a table with a fixed bucket count (clamped to at least 1)
    pub fn with_buckets(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, || None);

        Self { buckets, len: 0 }
    }

    fn bucket_of(&self, id: u64) -> usize {
        (id % self.buckets.len() as u64) as usize
    }

    /// Insert `entity` unless an entity with the same id is already stored.
    ///
    /// Returns `false` on a duplicate id; the stored entity is kept.
    pub fn insert_if_absent(&mut self, entity: T) -> bool {
        if self.contains(entity.id()) {
            return false;
        }

        let bucket = self.bucket_of(entity.id());
        let head = self.buckets[bucket].take();
        self.buckets[bucket] = Some(Box::new(Link { entity, next: head }));
        self.len += 1;
        true
    }

    /// Look up an entity by id
    pub fn get(&self, id: u64) -> Option<&T> {
        let mut cursor = self.buckets[self.bucket_of(id)].as_deref();

        while let Some(link) = cursor {
            if link.entity.id() == id {
                return Some(&link.entity);
            }
            cursor = link.next.as_deref();
        }

        None
    }

    /// Check if an id is present
    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Length of the longest bucket chain
    pub fn longest_chain(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| {
                let mut length = 0;
                let mut cursor = bucket.as_deref();
                while let Some(link) = cursor {
                    length += 1;
                    cursor = link.next.as_deref();
                }
                length
            })
            .max()
            .unwrap_or(0)
    }
}

impl<T> Drop for IdentityTable<T> {
    fn drop(&mut self) {
        // Unlink iteratively so long chains cannot overflow the stack
        for bucket in &mut self.buckets {
            let mut cursor = bucket.take();
            while let Some(mut link) = cursor {
                cursor = link.next.take();
            }
        }
    }
}
