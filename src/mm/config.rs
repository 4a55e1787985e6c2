//! # Configuração do Módulo de Memória
//!
//! Define constantes e configurações globais do módulo MM.

// =============================================================================
// CONSTANTES DE TAMANHO
// =============================================================================

/// Tamanho de uma página (4 KiB)
pub const PAGE_SIZE: usize = 4096;

// =============================================================================
// CONFIGURAÇÃO SMP
// =============================================================================

/// Número máximo de CPUs suportadas (um pool de páginas por CPU)
pub const MAX_CPUS: usize = 8;

// =============================================================================
// DEBUG
// =============================================================================

/// Lixo escrito em toda página entregue por `alloc`
pub const ALLOC_FILL: u8 = 0x05;

/// Lixo escrito em toda página devolvida por `free` (pega dangling refs)
pub const FREE_FILL: u8 = 0x01;
