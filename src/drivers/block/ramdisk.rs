//! Disco em memória.
//!
//! Usado no boot antes do driver real e como colaborador de armazenamento
//! nos testes. Conta as transferências para que se possa verificar quando o
//! cache foi (ou não) ao disco.

use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use super::traits::{BlockDevice, BlockError};
use crate::sync::Spinlock;

pub struct RamDisk {
    block_size: usize,
    total_blocks: u64,
    data: Spinlock<Vec<u8>>,
    read_only: bool,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl RamDisk {
    /// Cria disco zerado com `total_blocks` blocos de `block_size` bytes
    pub fn new(block_size: usize, total_blocks: u64) -> Self {
        Self {
            block_size,
            total_blocks,
            data: Spinlock::new(vec![0u8; block_size * total_blocks as usize], "ramdisk"),
            read_only: false,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Versão somente leitura
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Número de leituras servidas
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Número de escritas servidas
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Preenche um bloco direto na mídia (sem contar como transferência)
    pub fn fill_block(&self, lba: u64, byte: u8) {
        let range = self.range(lba);
        self.data.lock()[range].fill(byte);
    }

    /// Copia um bloco direto da mídia (sem contar como transferência)
    pub fn block(&self, lba: u64) -> Vec<u8> {
        let range = self.range(lba);
        self.data.lock()[range].to_vec()
    }

    fn range(&self, lba: u64) -> core::ops::Range<usize> {
        let start = lba as usize * self.block_size;
        start..start + self.block_size
    }

    fn check(&self, lba: u64, len: usize) -> Result<(), BlockError> {
        if lba >= self.total_blocks {
            return Err(BlockError::InvalidBlock);
        }
        if len != self.block_size {
            return Err(BlockError::InvalidBuffer);
        }
        Ok(())
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, lba: u64, buf: &mut [u8]) -> Result<(), BlockError> {
        self.check(lba, buf.len())?;
        let range = self.range(lba);
        buf.copy_from_slice(&self.data.lock()[range]);
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_block(&self, lba: u64, buf: &[u8]) -> Result<(), BlockError> {
        self.check(lba, buf.len())?;
        if self.read_only {
            return Err(BlockError::ReadOnly);
        }
        let range = self.range(lba);
        self.data.lock()[range].copy_from_slice(buf);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
