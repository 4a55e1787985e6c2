//! # Camada de Abstração de Dispositivos de Bloco
//!
//! Contrato que o buffer cache usa para mover blocos entre memória e disco.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              BUFFER CACHE (fs::bio)                 │
//! └─────────────────────────────────────────────────────┘
//!                          ↓  transfer(lba, buf, dir)
//! ┌─────────────────────────────────────────────────────┐
//! │              BlockDevice Trait                      │
//! │   read_block() write_block() block_size()           │
//! └─────────────────────────────────────────────────────┘
//!                          ↓
//! ┌─────────────────────────────────────────────────────┐
//! │              DRIVERS (VirtIO, RamDisk)              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Transferências são síncronas: a chamada só retorna quando o bloco já foi
//! lido ou gravado.

use core::fmt;

/// Tipos de erro para dispositivos de bloco
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// Endereço de bloco inválido (fora do intervalo)
    InvalidBlock,
    /// Dispositivo somente leitura
    ReadOnly,
    /// Tamanho do buffer incorreto
    InvalidBuffer,
}

impl BlockError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockError::InvalidBlock => "Endereço de bloco inválido",
            BlockError::ReadOnly => "Dispositivo somente leitura",
            BlockError::InvalidBuffer => "Tamanho do buffer inválido",
        }
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentido de uma transferência
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Disco → memória
    Read,
    /// Memória → disco
    Write,
}

/// Trait para dispositivos de bloco
///
/// Todos os drivers de dispositivos de bloco devem implementar esta trait.
pub trait BlockDevice: Send + Sync {
    /// Lê um único bloco do dispositivo
    ///
    /// # Argumentos
    /// * `lba` - Endereço Lógico de Bloco (Logical Block Address)
    /// * `buf` - Buffer para armazenar os dados (exatamente block_size bytes)
    fn read_block(&self, lba: u64, buf: &mut [u8]) -> Result<(), BlockError>;

    /// Escreve um único bloco no dispositivo
    ///
    /// # Argumentos
    /// * `lba` - Endereço Lógico de Bloco
    /// * `buf` - Buffer com os dados a escrever (exatamente block_size bytes)
    fn write_block(&self, lba: u64, buf: &[u8]) -> Result<(), BlockError>;

    /// Retorna o tamanho do bloco em bytes
    fn block_size(&self) -> usize;

    /// Retorna o número total de blocos no dispositivo
    fn total_blocks(&self) -> u64;

    /// Verifica se o dispositivo é somente leitura
    fn is_read_only(&self) -> bool {
        false
    }

    /// Transferência síncrona em qualquer sentido
    fn transfer(&self, lba: u64, buf: &mut [u8], dir: Direction) -> Result<(), BlockError> {
        if buf.len() != self.block_size() {
            return Err(BlockError::InvalidBuffer);
        }
        if lba >= self.total_blocks() {
            return Err(BlockError::InvalidBlock);
        }
        match dir {
            Direction::Read => self.read_block(lba, buf),
            Direction::Write => {
                if self.is_read_only() {
                    return Err(BlockError::ReadOnly);
                }
                self.write_block(lba, buf)
            }
        }
    }
}
