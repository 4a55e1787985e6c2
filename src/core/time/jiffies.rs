//! Arquivo: core/time/jiffies.rs
//!
//! Propósito: Jiffies (Contador de ticks do sistema).
//! É o relógio lógico que o buffer cache usa para carimbar `last_use`.
//!
//! Detalhes de Implementação:
//! - Usa AtomicU64 para ser thread-safe e lock-free.
//! - Incrementado pelo timer interrupt handler (colaborador externo).

//! Contador de Jiffies (Ticks)

use core::sync::atomic::{AtomicU64, Ordering};

/// Ticks desde o boot.
static JIFFIES: AtomicU64 = AtomicU64::new(0);

/// Retorna o número atual de jiffies.
#[inline]
pub fn get_jiffies() -> u64 {
    JIFFIES.load(Ordering::Relaxed)
}

/// Incrementa o contador de jiffies.
/// Deve ser chamado APENAS pelo handler de interrupção do timer.
#[inline]
pub fn inc_jiffies() {
    JIFFIES.fetch_add(1, Ordering::Relaxed);
}
