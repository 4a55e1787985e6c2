//! SleepLock - lock de longa duração
//!
//! Quem não consegue o lock dorme na fila de espera em vez de girar, então o
//! dono pode segurá-lo durante I/O de disco. Não desabilita interrupções.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch::{Cpu, CpuOps, WaitQueue, WaitQueueOps};

/// SleepLock - dorme se não conseguir o lock
///
/// # Diferença do Spinlock
///
/// - SleepLock PODE dormir (fila de espera)
/// - Spinlock NÃO pode dormir (busy-wait)
pub struct SleepLock<T> {
    /// Estado do lock
    locked: AtomicBool,
    /// Quem espera pelo lock
    waiters: WaitQueue,
    /// Dados protegidos
    data: UnsafeCell<T>,
    name: &'static str,
}

// SAFETY: SleepLock protege acesso com lock
unsafe impl<T: Send> Send for SleepLock<T> {}
unsafe impl<T: Send> Sync for SleepLock<T> {}

impl<T> SleepLock<T> {
    pub fn new(data: T, name: &'static str) -> Self {
        Self {
            locked: AtomicBool::new(false),
            waiters: WaitQueue::new(),
            data: UnsafeCell::new(data),
            name,
        }
    }

    /// Adquire o lock (pode bloquear)
    pub fn lock(&self) -> SleepLockGuard<'_, T> {
        if Cpu::with_local(|local| local.depth()) != 0 {
            crate::kerror!("(Sync) sleeplock adquirido dentro de seção crítica");
            panic!("sleeplock {}: adquirido segurando spinlock", self.name);
        }

        while self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.waiters
                .sleep_while(&mut || self.locked.load(Ordering::Acquire));
        }

        SleepLockGuard { lock: self }
    }

    /// Tenta adquirir sem bloquear
    pub fn try_lock(&self) -> Option<SleepLockGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| SleepLockGuard { lock: self })
    }

    /// Verifica se está segurado
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

pub struct SleepLockGuard<'a, T> {
    lock: &'a SleepLock<T>,
}

impl<T> Deref for SleepLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: Lock está adquirido
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SleepLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: Lock está adquirido
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SleepLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
        self.lock.waiters.wake_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::Spinlock;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_try_lock_while_held() {
        let lock = SleepLock::new(5, "test");
        let guard = lock.lock();
        assert!(lock.is_locked());
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert_eq!(*lock.try_lock().unwrap(), 5);
    }

    #[test]
    fn test_waiter_sleeps_until_release() {
        let lock = Arc::new(SleepLock::new(Vec::new(), "test"));
        let guard = lock.lock();

        let waiter = {
            let lock = lock.clone();
            thread::spawn(move || lock.lock().push(2))
        };

        thread::sleep(Duration::from_millis(20));
        let mut guard = guard;
        guard.push(1);
        drop(guard);

        waiter.join().unwrap();
        assert_eq!(*lock.lock(), vec![1, 2]);
    }

    #[test]
    fn test_mutual_exclusion() {
        let lock = Arc::new(SleepLock::new(0u64, "counter"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = lock.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        let mut g = lock.lock();
                        let v = *g;
                        thread::yield_now();
                        *g = v + 1;
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.lock(), 2000);
    }

    #[test]
    #[should_panic(expected = "adquirido segurando spinlock")]
    fn test_inside_spinlock_is_fatal() {
        let spin = Spinlock::new((), "meta");
        let sleep = SleepLock::new((), "data");
        let _meta = spin.lock();
        let _data = sleep.lock();
    }
}
