use core::sync::atomic::{AtomicU64, Ordering};

/// Contadores do buffer cache.
#[derive(Debug, Default)]
pub struct BcacheStats {
    /// Acquires servidos por um slot que já tinha o bloco
    pub hits: AtomicU64,
    /// Acquires que reaproveitaram um slot
    pub misses: AtomicU64,
    /// Misses resolvidos dentro do bucket do bloco
    pub local_evictions: AtomicU64,
    /// Misses resolvidos migrando um slot de outro bucket
    pub remote_evictions: AtomicU64,
    /// Vítimas do fallback que outro core pegou primeiro
    pub lost_races: AtomicU64,
}

/// Cópia dos contadores em um instante
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BcacheSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub local_evictions: u64,
    pub remote_evictions: u64,
    pub lost_races: u64,
}

impl BcacheStats {
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            local_evictions: AtomicU64::new(0),
            remote_evictions: AtomicU64::new(0),
            lost_races: AtomicU64::new(0),
        }
    }

    pub fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_local_eviction(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.local_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_remote_eviction(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.remote_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_lost_race(&self) {
        self.lost_races.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BcacheSnapshot {
        BcacheSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            local_evictions: self.local_evictions.load(Ordering::Relaxed),
            remote_evictions: self.remote_evictions.load(Ordering::Relaxed),
            lost_races: self.lost_races.load(Ordering::Relaxed),
        }
    }
}
