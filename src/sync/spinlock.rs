//! Spinlock - bloqueio com busy-wait

use core::ops::{Deref, DerefMut};

use crate::core::smp::{pin_cpu, CpuPin};

/// Spinlock - usa busy-wait, NÃO pode dormir
///
/// # Quando usar
///
/// - Seções críticas MUITO curtas
/// - Metadados de bucket e free lists por CPU
///
/// # Quando NÃO usar
///
/// - Seções que podem demorar
/// - Quando pode chamar funções que dormem
/// - Para proteger I/O lento
///
/// Interrupções ficam desabilitadas do `lock` até o drop do guard (push_off /
/// pop_off reentrante), então um handler no mesmo core nunca gira contra o
/// próprio dono do lock.
pub struct Spinlock<T> {
    inner: spin::Mutex<T>,
    name: &'static str,
}

impl<T> Spinlock<T> {
    /// Cria novo spinlock
    pub const fn new(data: T, name: &'static str) -> Self {
        Self {
            inner: spin::Mutex::new(data),
            name,
        }
    }

    /// Adquire o lock
    pub fn lock(&self) -> SpinlockGuard<'_, T> {
        // Desabilitar interrupções antes de adquirir
        let pin = pin_cpu();
        SpinlockGuard {
            guard: self.inner.lock(),
            _pin: pin,
        }
    }

    /// Tenta adquirir sem bloquear
    pub fn try_lock(&self) -> Option<SpinlockGuard<'_, T>> {
        let pin = pin_cpu();
        // Se falhar, o pin cai aqui e restaura as interrupções
        self.inner.try_lock().map(|guard| SpinlockGuard { guard, _pin: pin })
    }

    /// Verifica se alguém segura o lock neste instante (apenas diagnóstico)
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Nome dado na criação
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Guard do spinlock - libera ao sair do escopo
pub struct SpinlockGuard<'a, T> {
    // Ordem dos campos importa: o lock é solto antes de restaurar interrupções
    guard: spin::MutexGuard<'a, T>,
    _pin: CpuPin,
}

impl<T> Deref for SpinlockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for SpinlockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
