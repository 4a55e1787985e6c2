//! Fontes de tempo lógico para o LRU aproximado do buffer cache.
//!
//! O cache só compara carimbos entre si: qualquer contador monotônico serve.
//! Ticks iguais são comuns (vários acessos no mesmo tick); o desempate é do
//! chamador.

use core::sync::atomic::{AtomicU64, Ordering};

/// Relógio lógico monotônico
pub trait Clock: Send + Sync {
    /// Tick atual
    fn now(&self) -> u64;
}

/// Relógio do kernel: os jiffies do timer.
pub struct Jiffies;

impl Clock for Jiffies {
    #[inline]
    fn now(&self) -> u64 {
        super::jiffies::get_jiffies()
    }
}

/// Relógio avançado à mão (boot antes do timer, testes determinísticos).
pub struct ManualClock {
    ticks: AtomicU64,
}

impl ManualClock {
    pub const fn new(start: u64) -> Self {
        Self {
            ticks: AtomicU64::new(start),
        }
    }

    /// Avança `n` ticks e retorna o novo valor
    pub fn advance(&self, n: u64) -> u64 {
        self.ticks.fetch_add(n, Ordering::Relaxed) + n
    }

    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}
