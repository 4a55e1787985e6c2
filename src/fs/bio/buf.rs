//! Buffers e os handles entregues aos chamadores.
//!
//! Um [`BufGuard`] é a prova de que se segura o sleep lock do slot: escrever
//! e liberar só existem como métodos dele. O drop devolve a referência ao
//! bucket e só então solta o sleep lock.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use super::cache::BufCache;
use crate::fs::config::BSIZE;
use crate::sync::{SleepLock, SleepLockGuard};

/// Conteúdo de um bloco
pub type BlockData = [u8; BSIZE];

/// Identidade de um bloco: (dispositivo, número do bloco)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    pub dev: u32,
    pub blockno: u32,
}

impl BlockId {
    pub const fn new(dev: u32, blockno: u32) -> Self {
        Self { dev, blockno }
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({}:{})", self.dev, self.blockno)
    }
}

/// Slot de buffer. Vive o tempo todo do kernel; só a identidade muda.
pub(crate) struct Buf {
    /// O payload só é tocado por quem segura este lock
    pub data: SleepLock<BlockData>,
    /// O payload reflete o disco? Zerado ao reaproveitar o slot.
    pub valid: AtomicBool,
}

impl Buf {
    pub fn new() -> Self {
        Self {
            data: SleepLock::new([0u8; BSIZE], "buffer"),
            valid: AtomicBool::new(false),
        }
    }
}

/// Acesso exclusivo a um bloco em cache.
pub struct BufGuard<'a> {
    pub(crate) cache: &'a BufCache,
    pub(crate) slot: usize,
    pub(crate) id: BlockId,
    // Solto depois do Drop abaixo devolver a referência
    pub(crate) data: SleepLockGuard<'a, BlockData>,
}

impl<'a> BufGuard<'a> {
    pub fn block_id(&self) -> BlockId {
        self.id
    }

    /// O payload já foi preenchido a partir do disco (ou escrito por completo)?
    pub fn is_valid(&self) -> bool {
        self.cache.buf(self.slot).valid.load(Ordering::Acquire)
    }

    /// Marca o payload como conteúdo válido do bloco.
    ///
    /// Para quem sobrescreve o bloco inteiro sem ler antes.
    pub fn set_valid(&mut self) {
        self.cache.buf(self.slot).valid.store(true, Ordering::Release);
    }

    /// Write-through: grava o payload no disco antes de retornar (bwrite)
    pub fn write(&mut self) {
        self.cache.write_through(self.id, &mut self.data[..]);
    }

    /// Devolve o buffer (brelse). Equivalente a deixar o guard cair.
    pub fn release(self) {}

    /// Mantém o bloco residente além deste guard (bpin)
    pub fn pin(&self) -> BufPin<'a> {
        self.cache.adjust_refcnt(self.id, self.slot, 1);
        BufPin {
            cache: self.cache,
            slot: self.slot,
            id: self.id,
        }
    }
}

impl Deref for BufGuard<'_> {
    type Target = BlockData;

    fn deref(&self) -> &BlockData {
        &self.data
    }
}

impl DerefMut for BufGuard<'_> {
    fn deref_mut(&mut self) -> &mut BlockData {
        &mut self.data
    }
}

impl Drop for BufGuard<'_> {
    fn drop(&mut self) {
        self.cache.adjust_refcnt(self.id, self.slot, -1);
    }
}

impl fmt::Debug for BufGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufGuard")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Referência extra que impede o slot de ser reaproveitado, sem segurar o
/// sleep lock. Usado pelo log para manter blocos até o commit.
#[must_use = "o pin é desfeito ao cair"]
pub struct BufPin<'a> {
    cache: &'a BufCache,
    slot: usize,
    id: BlockId,
}

impl BufPin<'_> {
    pub fn block_id(&self) -> BlockId {
        self.id
    }

    /// Desfaz o pin (bunpin). Equivalente a deixar o pin cair.
    pub fn unpin(self) {}
}

impl Drop for BufPin<'_> {
    fn drop(&mut self) {
        self.cache.adjust_refcnt(self.id, self.slot, -1);
    }
}
