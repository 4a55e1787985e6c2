//! Seção crítica reentrante (push_off / pop_off).
//!
//! Ler o id do core e usá-lo para indexar um pool só é correto se a tarefa
//! não migrar no meio. [`pin_cpu`] desabilita interrupções (e com elas a
//! preempção), lê o id uma vez e devolve um [`CpuPin`]; o id fica fixo até o
//! pin cair.
//!
//! Os pins aninham: só o mais externo restaura as interrupções, e só se elas
//! estavam habilitadas quando ele foi criado. Quem já chamou com interrupções
//! desabilitadas continua com elas desabilitadas.

use core::marker::PhantomData;

use crate::arch::{Cpu, CpuOps};
use crate::mm::config::MAX_CPUS;

/// Prova de que o core atual não muda enquanto este valor existir.
///
/// `!Send`: o pin pertence ao contexto de hardware que o criou.
pub struct CpuPin {
    core_id: usize,
    _not_send: PhantomData<*const ()>,
}

/// push_off: desabilita interrupções (aninhado) e fixa o core atual.
pub fn pin_cpu() -> CpuPin {
    let were_enabled = Cpu::are_interrupts_enabled();
    Cpu::disable_interrupts();
    Cpu::with_local(|local| local.enter(were_enabled));

    let core_id = Cpu::current_core_id();
    if core_id >= MAX_CPUS {
        crate::kerror!("(SMP) id de core fora do intervalo: ", core_id);
        panic!("cpuid: core {} >= MAX_CPUS", core_id);
    }

    CpuPin {
        core_id,
        _not_send: PhantomData,
    }
}

impl CpuPin {
    /// Core ao qual a seção crítica está presa
    #[inline]
    pub fn core_id(&self) -> usize {
        self.core_id
    }

    /// Profundidade de aninhamento no core atual
    pub fn depth(&self) -> usize {
        Cpu::with_local(|local| local.depth())
    }
}

impl Drop for CpuPin {
    /// pop_off
    fn drop(&mut self) {
        if Cpu::are_interrupts_enabled() {
            crate::kerror!("(SMP) pop_off com interrupções habilitadas");
            panic!("pop_off: interrompível");
        }
        if Cpu::with_local(|local| local.leave()) {
            Cpu::enable_interrupts();
        }
    }
}
