//! Token identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Produces identifiers for the `jti` claim.
///
/// Uniqueness is the generator's responsibility; the signer never checks it.
pub trait IdGenerator: Send + Sync {
    /// Fresh identifier.
    fn new_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Predictable identifiers (`<prefix>-1`, `<prefix>-2`, ...).
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator whose first id is `<prefix>-1`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_ids_are_distinct() {
        let ids: HashSet<String> = (0..100).map(|_| UuidGenerator.new_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new("tok");
        assert_eq!(ids.new_id(), "tok-1");
        assert_eq!(ids.new_id(), "tok-2");
    }
}
