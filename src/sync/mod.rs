//! # Synchronization Primitives
//!
//! Primitivas de sincronização para ambiente SMP.
//!
//! ## Hierarquia de Uso
//!
//! ```text
//! Spinlock   → Seções críticas curtas (não pode dormir)
//! SleepLock  → Seções que podem bloquear, inclusive durante I/O de disco
//! ```
//!
//! ## Regras
//!
//! - **Spinlock**: protege metadados; interrupções ficam desligadas enquanto
//!   está segurado
//! - **SleepLock**: nunca adquirir segurando um Spinlock
//! - **Ordem de Lock**: Sempre adquirir na mesma ordem para evitar deadlock

/// Spinlock (busy-wait, não dorme)
pub mod spinlock;

/// Sleep lock (dorme na fila de espera)
pub mod sleeplock;

pub use sleeplock::{SleepLock, SleepLockGuard};
pub use spinlock::{Spinlock, SpinlockGuard};
