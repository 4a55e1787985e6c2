//! Anvil - núcleo de recursos do Forge.
//!
//! Duas peças de infraestrutura folha, sem dependência entre si:
//!
//! | Módulo    | Responsabilidade                                              |
//! |-----------|---------------------------------------------------------------|
//! | `mm`      | Páginas físicas: uma free list + lock por CPU, com roubo      |
//! | `fs::bio` | Buffer cache de blocos: buckets com lock próprio + fallback   |
//!
//! O resto (`arch`, `sync`, `core`, `drivers`, `klib`) é o mínimo de
//! plataforma que as duas precisam: identidade de CPU, seções críticas,
//! spinlocks, sleep locks, logging e o contrato de dispositivo de bloco.
//!
//! ## Hierarquia de Locks
//!
//! ```text
//! Spinlock (bucket, pool de CPU) → segurado só durante mutação de metadados
//! SleepLock (payload do buffer)  → pode ficar segurado durante I/O de disco
//! ```
//!
//! Nunca adquirir um SleepLock segurando um Spinlock.

#![cfg_attr(not(any(test, feature = "hosted")), no_std)]

// Buckets, pools e o registro de dispositivos vivem no heap do kernel
extern crate alloc;

// --- Baixo nível ---
pub mod arch;
pub mod drivers;

// --- Infra do kernel ---
pub mod core;
pub mod klib;
pub mod sync;

// --- Subsistemas ---
pub mod fs;
pub mod mm;

pub use crate::fs::bio::{BlockId, BufCache, BufCacheConfig, BufGuard, BufPin};
pub use crate::mm::pmm::KMem;
