//! Shared knowledge-base handle with snapshot swap
//!
//! Readers take an `Arc<KnowledgeBase>` and keep it for the whole query.
//! A reload builds a new knowledge base off to the side and swaps the
//! pointer; records are never mutated in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::knowledge_base::KnowledgeBase;

/// Atomically swappable reference to the current snapshot
#[derive(Debug)]
pub struct KnowledgeBaseHandle {
    current: RwLock<Arc<KnowledgeBase>>,
    generation: AtomicU64,
}

impl KnowledgeBaseHandle {
    pub fn new(kb: KnowledgeBase) -> Self {
        Self {
            current: RwLock::new(Arc::new(kb)),
            generation: AtomicU64::new(1),
        }
    }

    /// Current snapshot; stays valid even if a reload happens meanwhile
    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        Arc::clone(&self.current.read())
    }

    /// Install a new snapshot, returning the previous one
    pub fn replace(&self, kb: KnowledgeBase) -> Arc<KnowledgeBase> {
        let next = Arc::new(kb);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(generation, "Swapped knowledge base snapshot");
        previous
    }

    /// Number of snapshots installed so far (starts at 1)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for KnowledgeBaseHandle {
    fn default() -> Self {
        Self::new(KnowledgeBase::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fund::{FundId, FundRecord};
    use chrono::NaiveDate;

    fn kb_with_nav(nav: f64) -> KnowledgeBase {
        KnowledgeBase::builder()
            .fund(FundRecord::new("F1", "Fund One", "House", "Equity"))
            .nav("F1", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), nav)
            .build()
            .unwrap()
    }

    #[test]
    fn test_in_flight_snapshot_survives_swap() {
        let handle = KnowledgeBaseHandle::new(kb_with_nav(10.0));
        let before = handle.snapshot();

        let previous = handle.replace(kb_with_nav(20.0));
        let after = handle.snapshot();
        let id = FundId::from("F1");

        assert_eq!(before.latest_nav(&id).unwrap().nav, 10.0);
        assert_eq!(previous.latest_nav(&id).unwrap().nav, 10.0);
        assert_eq!(after.latest_nav(&id).unwrap().nav, 20.0);
        assert_eq!(handle.generation(), 2);
    }

    #[test]
    fn test_concurrent_readers() {
        let handle = Arc::new(KnowledgeBaseHandle::new(kb_with_nav(10.0)));
        let readers: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let kb = handle.snapshot();
                        let nav = kb.latest_nav(&FundId::from("F1")).unwrap().nav;
                        assert!(nav == 10.0 || nav == 20.0);
                    }
                })
            })
            .collect();

        handle.replace(kb_with_nav(20.0));
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
