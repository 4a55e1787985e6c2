//! Arquivo: core/smp/percpu.rs
//!
//! Propósito: Estado que cada core mantém para si mesmo.
//!
//! Detalhes de Implementação:
//! - Só o próprio core toca no seu `CpuLocal`, e sempre com interrupções
//!   desabilitadas; por isso os atômicos usam `Relaxed`.
//! - A plataforma decide onde o `CpuLocal` mora (array indexado por core no
//!   kernel, thread-local no hosted) e o expõe via `CpuOps::with_local`.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Estado de seção crítica de um core.
pub struct CpuLocal {
    /// Profundidade de push_off aninhados
    noff: AtomicUsize,
    /// Interrupções estavam habilitadas antes do primeiro push_off?
    intena: AtomicBool,
}

impl CpuLocal {
    pub const fn new() -> Self {
        Self {
            noff: AtomicUsize::new(0),
            intena: AtomicBool::new(false),
        }
    }

    /// Profundidade atual de seções críticas aninhadas
    #[inline]
    pub fn depth(&self) -> usize {
        self.noff.load(Ordering::Relaxed)
    }

    /// Entra em um nível. `were_enabled` só é lembrado no nível mais externo.
    pub(crate) fn enter(&self, were_enabled: bool) {
        if self.noff.load(Ordering::Relaxed) == 0 {
            self.intena.store(were_enabled, Ordering::Relaxed);
        }
        self.noff.fetch_add(1, Ordering::Relaxed);
    }

    /// Sai de um nível. Retorna true se era o último e as interrupções devem voltar.
    pub(crate) fn leave(&self) -> bool {
        let depth = self.noff.load(Ordering::Relaxed);
        if depth == 0 {
            crate::kerror!("(SMP) pop_off sem push_off correspondente");
            panic!("pop_off: sem push_off");
        }
        self.noff.store(depth - 1, Ordering::Relaxed);
        depth == 1 && self.intena.load(Ordering::Relaxed)
    }
}

impl Default for CpuLocal {
    fn default() -> Self {
        Self::new()
    }
}
