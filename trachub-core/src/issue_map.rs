// File: trachub-core/src/issue_map.rs
//! The ticket-to-issue map.
//!
//! Every converted Trac ticket becomes the next GitHub issue, so issue numbers can be
//! predicted before anything is created: they follow the ticket order of the export,
//! starting after the issues that already exist in the destination repository. The map
//! is built once, before the first translation, and never changes afterwards.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Which tickets are converted and where issue numbering starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IssueNumbering {
    /// Number of issues already present in the destination repository.
    pub existing_issue_count: u64,
    /// First ticket ID to convert.
    pub first_ticket: u64,
    /// Last ticket ID to convert, 0 means no upper bound.
    pub last_ticket: u64,
    /// Numbers of the issues already present in the destination repository.
    pub existing_issue_numbers: Vec<u64>,
    /// Exclude tickets whose ID equals an existing issue number.
    pub skip_colliding: bool,
}

impl Default for IssueNumbering {
    fn default() -> Self {
        Self {
            existing_issue_count: 0,
            first_ticket: 1,
            last_ticket: 0,
            existing_issue_numbers: Vec::new(),
            skip_colliding: false,
        }
    }
}

impl IssueNumbering {
    /// True when the ticket lies inside the configured `first_ticket..=last_ticket` range.
    pub fn in_range(&self, ticket_id: u64) -> bool {
        ticket_id >= self.first_ticket && (self.last_ticket == 0 || ticket_id <= self.last_ticket)
    }
}

/// Maps a Trac ticket ID to the GitHub issue number it will receive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TicketToIssueMap {
    entries: BTreeMap<u64, u64>,
}

impl TicketToIssueMap {
    /// Assigns sequential issue numbers to `ticket_ids`, in the given order.
    pub fn build<I>(ticket_ids: I, numbering: &IssueNumbering) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let colliding: HashSet<u64> = if numbering.skip_colliding {
            numbering.existing_issue_numbers.iter().copied().collect()
        } else {
            HashSet::new()
        };

        let mut entries = BTreeMap::new();
        let mut next_issue = numbering.existing_issue_count + 1;
        for ticket_id in ticket_ids {
            if !numbering.in_range(ticket_id) {
                continue;
            }
            if colliding.contains(&ticket_id) {
                debug!("Ticket #{} collides with an existing issue, skipping it.", ticket_id);
                continue;
            }
            entries.insert(ticket_id, next_issue);
            next_issue += 1;
        }

        info!("Mapped {} tickets to issues.", entries.len());
        Self { entries }
    }

    pub fn get(&self, ticket_id: u64) -> Option<u64> {
        self.entries.get(&ticket_id).copied()
    }

    pub fn contains(&self, ticket_id: u64) -> bool {
        self.entries.contains_key(&ticket_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(ticket_id, issue_number)` pairs in ticket order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.entries.iter().map(|(t, i)| (*t, *i))
    }
}

impl FromIterator<(u64, u64)> for TicketToIssueMap {
    fn from_iter<T: IntoIterator<Item = (u64, u64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_follow_file_order_after_existing_issues() {
        let numbering = IssueNumbering {
            existing_issue_count: 3,
            ..Default::default()
        };
        let map = TicketToIssueMap::build([10, 2, 7], &numbering);
        assert_eq!(map.get(10), Some(4));
        assert_eq!(map.get(2), Some(5));
        assert_eq!(map.get(7), Some(6));
    }

    #[test]
    fn honours_ticket_range() {
        let numbering = IssueNumbering {
            first_ticket: 2,
            last_ticket: 3,
            ..Default::default()
        };
        let map = TicketToIssueMap::build(1..=5, &numbering);
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(2, 1), (3, 2)]);
    }

    #[test]
    fn last_ticket_zero_is_unbounded() {
        let map = TicketToIssueMap::build([1, 500, 9000], &IssueNumbering::default());
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(9000), Some(3));
    }

    #[test]
    fn skips_colliding_tickets_when_asked() {
        let numbering = IssueNumbering {
            existing_issue_count: 2,
            existing_issue_numbers: vec![1, 2],
            skip_colliding: true,
            ..Default::default()
        };
        let map = TicketToIssueMap::build([1, 2, 3], &numbering);
        assert!(!map.contains(1));
        assert!(!map.contains(2));
        assert_eq!(map.get(3), Some(3));
    }
}
