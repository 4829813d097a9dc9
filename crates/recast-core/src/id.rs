use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a node, assigned once at construction and never mutated.
///
/// Ids are unique within a run but carry no meaning beyond identity. A
/// rewrite may keep the original id to signal "same logical construct,
/// transformed" or mint a fresh one for a wholly new construct; each rule
/// documents its choice.
pub type NodeId = u64;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Mint a fresh node id from the process-wide monotonic counter. No
/// cross-run uniqueness is guaranteed or needed.
pub fn fresh_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_distinct() {
        let a = fresh_id();
        let b = fresh_id();
        assert!(b > a);
    }
}
