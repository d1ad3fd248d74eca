//! Rank List - self-ordering popularity list
//!
//! A doubly linked list of `(label, counter)` kept in descending counter
//! order. Recording a label bumps its counter and bubbles it toward the head
//! by swapping with predecessors; there is never a global re-sort.
//!
//! # Example
//! ```text
//! record("#rust")  → [#rust:1]
//! record("#go")    → [#rust:1, #go:1]
//! record("#go")    → [#go:2, #rust:1]
//! ```
//!
//! Nodes live in an arena and link to each other by slot index. Swapping two
//! neighbours exchanges their payloads and leaves the links untouched.

use std::collections::HashMap;

/// Payload of a list node
#[derive(Debug, Clone)]
struct Entry {
    label: String,
    count: u64,
}

/// Arena links for a list node
#[derive(Debug, Clone, Copy, Default)]
struct Links {
    prev: Option<usize>,
    next: Option<usize>,
}

/// Locally re-sorted list approximating a top-K ranking
#[derive(Debug, Default)]
pub struct RankList {
    entries: Vec<Entry>,
    links: Vec<Links>,
    /// label → slot currently holding it
    slots: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl RankList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `label`
    ///
    /// Returns the label's new counter.
    pub fn record(&mut self, label: &str) -> u64 {
        let Some(&slot) = self.slots.get(label) else {
            self.append(label);
            return 1;
        };

        self.entries[slot].count += 1;
        let count = self.entries[slot].count;

        let mut cursor = slot;
        while let Some(prev) = self.links[cursor].prev {
            if self.entries[cursor].count <= self.entries[prev].count {
                break;
            }
            self.swap_payloads(cursor, prev);
            cursor = prev;
        }

        count
    }

    fn append(&mut self, label: &str) {
        let slot = self.entries.len();
        self.entries.push(Entry {
            label: label.to_string(),
            count: 1,
        });
        self.links.push(Links {
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => self.links[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.slots.insert(label.to_string(), slot);
    }

    fn swap_payloads(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        for slot in [a, b] {
            if let Some(entry) = self.slots.get_mut(&self.entries[slot].label) {
                *entry = slot;
            }
        }
    }

    /// Up to `limit` labels, highest counter first
    pub fn top(&self, limit: usize) -> Vec<String> {
        self.iter()
            .take(limit)
            .map(|(label, _)| label.to_string())
            .collect()
    }

    /// Walk the list from the head
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let slot = cursor?;
            cursor = self.links[slot].next;
            let entry = &self.entries[slot];
            Some((entry.label.as_str(), entry.count))
        })
    }

    /// Current counter for `label` (0 if never recorded)
    pub fn count(&self, label: &str) -> u64 {
        self.slots
            .get(label)
            .map(|&slot| self.entries[slot].count)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        let list = RankList::new();

        assert!(list.is_empty());
        assert!(list.top(10).is_empty());
        assert_eq!(list.count("#none"), 0);
    }

    #[test]
    fn test_new_labels_append_in_order() {
        let mut list = RankList::new();
        list.record("#a");
        list.record("#b");
        list.record("#c");

        assert_eq!(list.top(10), vec!["#a", "#b", "#c"]);
    }

    #[test]
    fn test_bump_bubbles_toward_head() {
        let mut list = RankList::new();
        list.record("#a");
        list.record("#b");
        list.record("#c");

        assert_eq!(list.record("#c"), 2);
        assert_eq!(list.top(10), vec!["#c", "#a", "#b"]);

        list.record("#b");
        list.record("#b");
        assert_eq!(list.top(10), vec!["#b", "#c", "#a"]);
        assert_eq!(list.count("#b"), 3);
        assert_eq!(list.count("#c"), 2);
    }

    #[test]
    fn test_equal_counts_do_not_swap() {
        let mut list = RankList::new();
        list.record("#first");
        list.record("#second");
        list.record("#first");
        list.record("#second");

        // #first reached 2 before #second did
        assert_eq!(list.top(2), vec!["#first", "#second"]);
    }

    #[test]
    fn test_top_respects_limit() {
        let mut list = RankList::new();
        for i in 0..25 {
            list.record(&format!("#tag{}", i));
        }

        assert_eq!(list.len(), 25);
        assert_eq!(list.top(10).len(), 10);
        assert_eq!(list.top(0).len(), 0);
    }

    #[test]
    fn test_boosted_label_always_first() {
        let mut list = RankList::new();
        for i in 0..15 {
            list.record(&format!("#tag{}", i));
            list.record(&format!("#tag{}", i));
        }

        for _ in 0..3 {
            list.record("#tag14");
        }

        let top = list.top(10);
        assert_eq!(top[0], "#tag14");
        assert!(top.len() <= 10);
    }

    #[test]
    fn test_counts_stay_descending() {
        let mut list = RankList::new();
        let feed = ["#x", "#y", "#z", "#y", "#z", "#z", "#w", "#x", "#z", "#w", "#w", "#w"];
        for label in feed {
            list.record(label);
        }

        let counts: Vec<u64> = list.iter().map(|(_, c)| c).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(list.count("#z"), 4);
        assert_eq!(list.count("#w"), 4);
    }
}
