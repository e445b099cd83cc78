//! Node identifier allocation
//!
//! Ids have the form `node_{n}` with a monotonically increasing `n`. The
//! generator is seeded past every numeric suffix found in restored state, so
//! reloading a saved layout never re-issues an id that is already in use.
//! Node creation and clipboard operations draw from the same generator.

use crate::types::NodeId;

const PREFIX: &str = "node_";

/// Monotonic node id generator
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Generator starting at `node_1`
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Generator seeded one past the highest numeric suffix among `existing`
    ///
    /// Ids without a trailing number do not affect the seed.
    pub fn seeded_from<'a, I>(existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let max = existing.into_iter().filter_map(numeric_suffix).max().unwrap_or(0);
        Self {
            next: max.saturating_add(1),
        }
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> NodeId {
        let n = self.next;
        self.next = self.next.saturating_add(1);
        format!("{}{}", PREFIX, n)
    }

    /// Number the next call to `next_id` will use
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Trailing run of ASCII digits in an id, if any
pub fn numeric_suffix(id: &str) -> Option<u64> {
    let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    id[id.len() - digits..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), "node_1");
        assert_eq!(ids.next_id(), "node_2");
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn test_seeded_past_restored_ids() {
        let restored = ["node_4", "node_17", "node_9", "custom", "node_1700000000_3"];
        let mut ids = IdGenerator::seeded_from(restored);
        // 1700000000_3 ends in 3, so 17 is the highest suffix
        assert_eq!(ids.next_id(), "node_18");
    }

    #[test]
    fn test_seed_from_nothing() {
        let mut ids = IdGenerator::seeded_from(std::iter::empty());
        assert_eq!(ids.next_id(), "node_1");
    }

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("node_12"), Some(12));
        assert_eq!(numeric_suffix("12"), Some(12));
        assert_eq!(numeric_suffix("node_"), None);
        assert_eq!(numeric_suffix(""), None);
        assert_eq!(numeric_suffix("node_99999999999999999999999"), None);
    }
}
