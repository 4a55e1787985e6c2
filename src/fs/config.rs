//! # Configuração do Buffer Cache

/// Tamanho de um bloco de disco em bytes
pub const BSIZE: usize = 1024;

/// Número de buckets do cache (primo, para espalhar blocos sequenciais)
pub const NBUCKET: usize = 13;

/// Slots de buffer que cada bucket recebe no boot
pub const BUCKET_SLOTS: usize = 5;

/// Geometria do buffer cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufCacheConfig {
    /// Número de buckets (hash = blockno % buckets)
    pub buckets: usize,
    /// Slots entregues a cada bucket na criação
    pub slots_per_bucket: usize,
}

impl BufCacheConfig {
    /// Total de slots do cache
    pub const fn total_slots(&self) -> usize {
        self.buckets * self.slots_per_bucket
    }
}

impl Default for BufCacheConfig {
    fn default() -> Self {
        Self {
            buckets: NBUCKET,
            slots_per_bucket: BUCKET_SLOTS,
        }
    }
}
