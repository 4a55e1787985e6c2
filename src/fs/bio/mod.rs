//! # Block I/O (bio)
//!
//! Buffer cache de blocos de disco.
//!
//! ## Interface
//!
//! - Para ler um bloco: [`BufCache::read`] (ou [`BufCache::acquire`] para
//!   quem vai sobrescrever o bloco inteiro).
//! - Depois de alterar o payload: [`BufGuard::write`].
//! - Ao terminar: [`BufGuard::release`] ou simplesmente deixar o guard cair.
//! - Só um dono por vez usa um buffer, então não segure guards mais do que
//!   o necessário.
//!
//! O cache global é criado uma vez no boot por [`init`] e obtido com [`get`].

pub mod buf;
mod bucket;
pub mod cache;
pub mod stats;

pub use crate::fs::config::BufCacheConfig;
pub use buf::{BlockData, BlockId, BufGuard, BufPin};
pub use cache::BufCache;
pub use stats::{BcacheSnapshot, BcacheStats};

use alloc::sync::Arc;

use crate::drivers::block::DeviceTable;

static BCACHE: spin::Once<BufCache> = spin::Once::new();

/// Cria o buffer cache global (binit). Chamadas depois da primeira são
/// ignoradas.
pub fn init(config: BufCacheConfig, devices: Arc<DeviceTable>) -> &'static BufCache {
    BCACHE.call_once(|| {
        crate::kinfo!("(BIO) Inicializando buffer cache...");
        let cache = BufCache::new(config, devices);
        crate::kok!("(BIO) Buffer cache pronto");
        cache
    })
}

/// O buffer cache global.
///
/// # Panics
///
/// Antes de [`init`].
pub fn get() -> &'static BufCache {
    match BCACHE.get() {
        Some(cache) => cache,
        None => {
            crate::kerror!("(BIO) Buffer cache usado antes do init");
            panic!("bio: cache não inicializado");
        }
    }
}
