//! Arquivo: core/smp/mod.rs
//!
//! Propósito: Suporte a Multiprocessamento Simétrico (SMP) do núcleo.
//! Tudo que depende de "qual core sou eu" passa por aqui.
//!
//! Módulos contidos:
//! - `percpu`: Estado local de cada core (profundidade de push_off).
//! - `irq`: Seção crítica reentrante que fixa o core atual (`CpuPin`).

pub mod irq;
pub mod percpu;

pub use irq::{pin_cpu, CpuPin};
