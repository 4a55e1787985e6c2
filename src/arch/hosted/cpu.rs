//! CPU simulada: identidade e flag de interrupções por thread.

use std::cell::Cell;

use crate::arch::traits::CpuOps;
use crate::core::smp::percpu::CpuLocal;
use crate::mm::config::MAX_CPUS;

std::thread_local! {
    static CORE_ID: Cell<usize> = const { Cell::new(0) };
    static INTERRUPTS: Cell<bool> = const { Cell::new(true) };
    static LOCAL: CpuLocal = const { CpuLocal::new() };
}

pub struct HostedCpu;

impl HostedCpu {
    /// Associa a thread atual ao core `core_id`.
    ///
    /// Threads que nunca chamam `bind` rodam no core 0.
    pub fn bind(core_id: usize) {
        if core_id >= MAX_CPUS {
            panic!("HostedCpu::bind: core {} >= MAX_CPUS ({})", core_id, MAX_CPUS);
        }
        CORE_ID.with(|c| c.set(core_id));
    }
}

impl CpuOps for HostedCpu {
    fn disable_interrupts() {
        INTERRUPTS.with(|i| i.set(false));
    }

    fn enable_interrupts() {
        INTERRUPTS.with(|i| i.set(true));
    }

    fn are_interrupts_enabled() -> bool {
        INTERRUPTS.with(|i| i.get())
    }

    fn current_core_id() -> usize {
        CORE_ID.with(|c| c.get())
    }

    fn with_local<R>(f: impl FnOnce(&CpuLocal) -> R) -> R {
        LOCAL.with(|local| f(local))
    }
}
