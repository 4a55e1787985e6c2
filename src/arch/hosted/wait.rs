//! Fila de espera sobre Mutex + Condvar da std.

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::arch::traits::WaitQueueOps;

pub struct HostedWaitQueue {
    gate: Mutex<()>,
    cond: Condvar,
}

impl HostedWaitQueue {
    fn gate(&self) -> MutexGuard<'_, ()> {
        // Poison só acontece se um teste entrou em pânico segurando o gate;
        // o estado protegido é vazio, então seguimos.
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WaitQueueOps for HostedWaitQueue {
    fn new() -> Self {
        Self {
            gate: Mutex::new(()),
            cond: Condvar::new(),
        }
    }

    fn sleep_while(&self, blocked: &mut dyn FnMut() -> bool) {
        let mut gate = self.gate();
        while blocked() {
            gate = self
                .cond
                .wait(gate)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    fn wake_all(&self) {
        let _gate = self.gate();
        self.cond.notify_all();
    }
}
