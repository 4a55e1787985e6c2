//! Interface Abstrata de CPU (HAL).
//! Define as operações que qualquer plataforma deve implementar para que o
//! alocador e os locks saibam "em qual core estou" e controlem interrupções.

use crate::core::smp::percpu::CpuLocal;

/// Operações de CPU exigidas pelo núcleo.
///
/// Todas são funções associadas (dispatch estático, sem `dyn`).
pub trait CpuOps {
    /// Desabilita interrupções no core atual.
    fn disable_interrupts();

    /// Habilita interrupções no core atual.
    fn enable_interrupts();

    /// Verifica se as interrupções estão habilitadas no core atual.
    fn are_interrupts_enabled() -> bool;

    /// Índice do core atual (0..MAX_CPUS).
    ///
    /// Só é estável enquanto as interrupções estiverem desabilitadas; use
    /// `crate::core::smp::irq::pin_cpu()` em vez de chamar direto.
    fn current_core_id() -> usize;

    /// Executa `f` com o estado local (profundidade de push_off) do core atual.
    fn with_local<R>(f: impl FnOnce(&CpuLocal) -> R) -> R;
}
