//! # Hardware Abstraction Layer (HAL)
//!
//! O módulo `arch` é a **única** ponte entre o núcleo (alocador, buffer cache,
//! locks) e a plataforma que executa o código.
//!
//! ## 🎯 Propósito e Responsabilidade
//! - **Isolamento:** `mm` e `fs` não sabem em qual plataforma estão rodando.
//! - **Abstração:** `traits/` define `CpuOps` (identidade de core, interrupções)
//!   e `WaitQueueOps` (sleep/wakeup).
//! - **Seleção de Plataforma:** `cfg` escolhe a implementação concreta.
//!
//! ## 🏗️ Plataformas
//!
//! | Plataforma | Seleção                | Modelo                                     |
//! |------------|------------------------|--------------------------------------------|
//! | `hosted`   | feature `hosted`/teste | cada thread do SO é um contexto de hardware |
//!
//! O kernel real registra a sua própria plataforma aqui (mesmo contrato).

pub mod traits;

#[cfg(any(test, feature = "hosted"))]
pub mod hosted;

#[cfg(any(test, feature = "hosted"))]
pub use hosted as platform;

#[cfg(not(any(test, feature = "hosted")))]
compile_error!("anvil: nenhuma plataforma selecionada (habilite a feature `hosted`)");

// Re-exports globais para o núcleo usar
// Exemplo: arch::Cpu::current_core_id();
pub use platform::{Cpu, WaitQueue};
pub use traits::*;
