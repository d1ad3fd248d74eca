//! Core data types for the Witter store
//!
//! - `User`: an account, keyed by a caller-assigned id
//! - `Weet`: a short post written by a user
//! - `Follow`: one follower → followee relationship
//!
//! Entities are immutable once created. Ids are unsigned, so the negative ids
//! the hash arithmetic cannot bucket are unrepresentable.

use crate::index::Identified;
use crate::store::error::{StoreError, StoreResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// User identifier
pub type UserId = u32;

/// Weet identifier
pub type WeetId = u32;

/// Point in time (UTC)
pub type Timestamp = DateTime<Utc>;

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// When the account was created
    pub joined: Timestamp,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, joined: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            joined,
        }
    }
}

impl Identified for User {
    fn id(&self) -> u64 {
        u64::from(self.id)
    }
}

/// A short post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Weet {
    pub id: WeetId,
    /// Author's user id
    pub author: UserId,
    pub text: String,
    pub posted: Timestamp,
}

impl Weet {
    pub fn new(id: WeetId, author: UserId, text: impl Into<String>, posted: Timestamp) -> Self {
        Self {
            id,
            author,
            text: text.into(),
            posted,
        }
    }

    /// Distinct hashtags in the text, in order of first appearance
    ///
    /// A hashtag is a whitespace-separated token starting with `#`, with
    /// trailing punctuation removed, and at least one character after `#`.
    pub fn hashtags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();

        for token in self.text.split_whitespace() {
            if !token.starts_with('#') {
                continue;
            }

            let tag = token.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_');
            if tag.len() > 1 && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        tags
    }
}

impl Identified for Weet {
    fn id(&self) -> u64 {
        u64::from(self.id)
    }
}

/// A follower relationship
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Follow {
    pub follower: UserId,
    pub followee: UserId,
    pub since: Timestamp,
}

impl Follow {
    pub fn new(follower: UserId, followee: UserId, since: Timestamp) -> Self {
        Self {
            follower,
            followee,
            since,
        }
    }
}

/// Half-open `[start, end)` bounds of a UTC calendar day
///
/// `end` is `None` for the last representable day, whose range is open above.
pub fn day_bounds(day: NaiveDate) -> (Timestamp, Option<Timestamp>) {
    let start = Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN));
    (start, start.checked_add_signed(chrono::Duration::days(1)))
}

/// Parse a timestamp in one of the accepted text formats
///
/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S`, `%Y-%m-%dT%H:%M:%S` and a bare
/// `%Y-%m-%d` date (midnight UTC).
pub fn parse_timestamp(text: &str) -> StoreResult<Timestamp> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(day_bounds(day).0);
    }

    Err(StoreError::InvalidTimestamp(text.to_string()))
}
