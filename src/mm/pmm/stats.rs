use core::sync::atomic::{AtomicUsize, Ordering};

/// Contadores do alocador de páginas.
#[derive(Debug, Default)]
pub struct PmmStats {
    pub allocs: AtomicUsize,
    pub frees: AtomicUsize,
    /// Alocações servidas pelo pool de outra CPU
    pub steals: AtomicUsize,
    /// Alocações que voltaram com OutOfMemory
    pub failed_allocs: AtomicUsize,
}

/// Cópia dos contadores em um instante
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PmmSnapshot {
    pub allocs: usize,
    pub frees: usize,
    pub steals: usize,
    pub failed_allocs: usize,
}

impl PmmStats {
    pub const fn new() -> Self {
        Self {
            allocs: AtomicUsize::new(0),
            frees: AtomicUsize::new(0),
            steals: AtomicUsize::new(0),
            failed_allocs: AtomicUsize::new(0),
        }
    }

    pub fn inc_alloc(&self) {
        self.allocs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_free(&self) {
        self.frees.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_steal(&self) {
        self.steals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed_allocs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PmmSnapshot {
        PmmSnapshot {
            allocs: self.allocs.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            failed_allocs: self.failed_allocs.load(Ordering::Relaxed),
        }
    }
}
