//! Injected id generation.
//!
//! Services never call `Uuid::new_v4` inline; they go through this
//! capability so tests can supply deterministic ids.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> Uuid;
}

/// Production generator: random v4 uuids.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn new_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic generator for tests: monotonically increasing uuids.
#[derive(Debug, Default)]
pub struct SequenceIds {
    counter: AtomicU64,
}

impl IdGenerator for SequenceIds {
    fn new_id(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Uuid::from_u128(n as u128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_ids_are_deterministic_and_unique() {
        let ids = SequenceIds::default();
        let a = ids.new_id();
        let b = ids.new_id();
        assert_ne!(a, b);
        assert_eq!(a, Uuid::from_u128(1));
        assert_eq!(b, Uuid::from_u128(2));
    }
}
