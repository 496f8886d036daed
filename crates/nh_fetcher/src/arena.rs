use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use nh_core::Article;

struct Slot {
    article: Mutex<Article>,
    claimed: AtomicBool,
}

impl Slot {
    fn lock(&self) -> MutexGuard<'_, Article> {
        self.article.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Default)]
struct Slots {
    slots: Vec<Arc<Slot>>,
    by_id: HashMap<String, usize>,
}

/// Articles of one fetch run, addressed by stable slot. Scraping passes claim
/// slots before touching them, so no article is scraped by two passes at once.
#[derive(Default)]
pub struct ArticleArena {
    inner: RwLock<Slots>,
}

impl ArticleArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Slots> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds `article` unless its id is already present. Returns whether it was added.
    pub fn insert(&self, article: Article) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if inner.by_id.contains_key(&article.id) {
            return false;
        }
        let position = inner.slots.len();
        inner.by_id.insert(article.id.clone(), position);
        inner.slots.push(Arc::new(Slot {
            article: Mutex::new(article),
            claimed: AtomicBool::new(false),
        }));
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_content(&self) -> usize {
        self.read().slots.iter().filter(|s| !s.lock().has_content()).count()
    }

    /// Claims every unclaimed slot that still lacks content.
    pub fn claim_pending(&self) -> Vec<Claim> {
        let slots: Vec<Arc<Slot>> = self.read().slots.clone();
        slots
            .into_iter()
            .filter(|slot| !slot.lock().has_content())
            .filter(|slot| {
                slot.claimed
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            })
            .map(|slot| Claim { slot })
            .collect()
    }

    /// Copies of all articles in insertion order, content as filled so far.
    pub fn snapshot(&self) -> Vec<Article> {
        self.read().slots.iter().map(|s| s.lock().clone()).collect()
    }
}

/// Exclusive right to scrape one slot. Dropping it releases the slot.
pub struct Claim {
    slot: Arc<Slot>,
}

impl Claim {
    pub fn id(&self) -> String {
        self.slot.lock().id.clone()
    }

    pub fn link(&self) -> String {
        self.slot.lock().link.clone()
    }

    pub fn fill(&self, content: Option<String>) {
        self.slot.lock().content = content.filter(|c| !c.trim().is_empty());
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.slot.claimed.store(false, Ordering::Release);
    }
}
