//! services/api/src/adapters/ids.rs
//!
//! Job id allocation backed by random (v4) UUIDs.

use uuid::Uuid;
use yaydoc_core::domain::JobId;
use yaydoc_core::ports::JobIdAllocator;

/// Allocates 128-bit random job ids from the operating system's RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidJobIdAllocator;

impl JobIdAllocator for UuidJobIdAllocator {
    fn allocate(&self) -> JobId {
        JobId::from_uuid(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_do_not_repeat() {
        let allocator = UuidJobIdAllocator;
        let mut seen = HashSet::new();
        for _ in 0..100_000 {
            assert!(seen.insert(allocator.allocate()));
        }
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..5_000)
                        .map(|_| UuidJobIdAllocator.allocate())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 40_000);
    }

    #[test]
    fn ids_render_as_parseable_uuids() {
        let id = UuidJobIdAllocator.allocate();
        let rendered = id.to_string();
        assert_eq!(rendered.len(), 36);
        assert_eq!(rendered.parse::<JobId>().unwrap(), id);
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }
}
