//! # Physical Memory Manager (PMM)
//!
//! Alocador de páginas de 4 KiB com uma free list por CPU.
//!
//! ## Estratégia
//!
//! ```text
//!   CPU0        CPU1        CPU2        CPU3
//! ┌──────┐    ┌──────┐    ┌──────┐    ┌──────┐
//! │ lock │    │ lock │    │ lock │    │ lock │
//! │ list │    │ list │    │ list │    │ list │
//! └──────┘    └──────┘    └──────┘    └──────┘
//!     ↑ free sempre no pool da CPU atual
//!     ↑ alloc tenta o pool local; vazio → rouba de id+1, id+2, ...
//! ```
//!
//! - `free` e `alloc` fixam a CPU (push_off) antes de ler o id, então o
//!   índice do pool não muda no meio da operação.
//! - Só um lock de pool é segurado por vez, inclusive durante o roubo. Não
//!   há ordem de locks a respeitar e não há deadlock.
//! - `init` roda em uma CPU e entrega toda a memória ao pool dela; as outras
//!   CPUs se abastecem roubando.
//!
//! Páginas entregues vêm preenchidas com [`ALLOC_FILL`]; páginas devolvidas
//! são preenchidas com [`FREE_FILL`] (exceto o link da free list).

pub mod pool;
pub mod stats;

pub use pool::FreePool;
pub use stats::{PmmSnapshot, PmmStats};

use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicU64, Ordering};

use crate::core::smp::pin_cpu;
use crate::mm::addr::PhysAddr;
use crate::mm::config::{ALLOC_FILL, FREE_FILL, MAX_CPUS, PAGE_SIZE};
use crate::mm::error::{MmError, MmResult};
use crate::sync::Spinlock;

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_POOL: Spinlock<FreePool> = Spinlock::new(FreePool::new(), "kmem");

/// Alocador de páginas físicas por CPU.
pub struct KMem {
    pools: [Spinlock<FreePool>; MAX_CPUS],
    /// Quantos pools estão em uso (CPUs presentes)
    ncpus: usize,
    /// Primeiro endereço gerenciável (fim da imagem do kernel)
    start: AtomicU64,
    /// Primeiro endereço além da RAM gerenciada
    end: AtomicU64,
    stats: PmmStats,
}

impl KMem {
    /// Alocador com um pool para cada uma das `MAX_CPUS` CPUs
    pub const fn new() -> Self {
        Self::with_cpus(MAX_CPUS)
    }

    /// Alocador para uma máquina com `ncpus` CPUs (1..=MAX_CPUS)
    pub const fn with_cpus(ncpus: usize) -> Self {
        assert!(ncpus >= 1 && ncpus <= MAX_CPUS, "kmem: ncpus fora de 1..=MAX_CPUS");
        Self {
            pools: [EMPTY_POOL; MAX_CPUS],
            ncpus,
            start: AtomicU64::new(0),
            end: AtomicU64::new(0),
            stats: PmmStats::new(),
        }
    }

    /// Define o intervalo gerenciado e libera toda página inteira dentro dele.
    ///
    /// # Safety
    ///
    /// `[kernel_end, phys_top)` é RAM acessível pelo direct map e não é usada
    /// por mais ninguém.
    pub unsafe fn init(&self, kernel_end: PhysAddr, phys_top: PhysAddr) {
        self.start.store(kernel_end.as_u64(), Ordering::Release);
        self.end.store(phys_top.as_u64(), Ordering::Release);

        // SAFETY: repassado do chamador
        let pages = unsafe { self.free_range(kernel_end, phys_top) };
        crate::kinfo!("(PMM) Páginas livres após init=", pages);
    }

    /// Libera cada página inteira entre `start` (arredondado para cima) e `end`.
    /// Retorna quantas foram liberadas.
    ///
    /// # Safety
    ///
    /// Mesmas condições de [`KMem::free`] para cada página do intervalo.
    pub unsafe fn free_range(&self, start: PhysAddr, end: PhysAddr) -> usize {
        let page = PAGE_SIZE as u64;
        let Some(mut p) = start.align_up(page) else {
            return 0;
        };
        let mut count = 0;
        // Para no topo do espaço de endereços mesmo com `end` perto de u64::MAX
        while let Some(next) = p.checked_add(page) {
            if next > end {
                break;
            }
            // SAFETY: repassado do chamador
            unsafe { self.free(p) };
            p = next;
            count += 1;
        }
        count
    }

    /// Devolve uma página ao pool da CPU atual.
    ///
    /// Endereço desalinhado, abaixo do fim do kernel ou a partir do topo da
    /// RAM é violação de contrato e derruba o kernel.
    ///
    /// # Safety
    ///
    /// A página veio de [`KMem::alloc`] (ou faz parte da RAM livre durante o
    /// init) e nada mais a referencia.
    pub unsafe fn free(&self, pa: PhysAddr) {
        let addr = pa.as_u64();
        let start = self.start.load(Ordering::Acquire);
        let end = self.end.load(Ordering::Acquire);

        if !pa.is_aligned(PAGE_SIZE as u64) || addr < start || addr >= end {
            crate::kerror!("(PMM) kfree de endereço inválido: ", addr);
            panic!("kfree: endereço inválido {:#x} (intervalo {:#x}..{:#x})", addr, start, end);
        }
        let Some(page) = NonNull::new(pa.as_mut_ptr()) else {
            panic!("kfree: endereço nulo");
        };

        // SAFETY: página inteira, dentro do intervalo gerenciado, sem donos
        unsafe { ptr::write_bytes(page.as_ptr(), FREE_FILL, PAGE_SIZE) };

        let pin = pin_cpu();
        let id = self.pool_index(pin.core_id());
        // SAFETY: idem
        unsafe { self.pools[id].lock().push(page) };
        drop(pin);

        self.stats.inc_free();
    }

    /// Entrega uma página, do pool local ou roubada de outra CPU.
    ///
    /// `Err(OutOfMemory)` só quando todos os pools estavam vazios no momento
    /// em que foram olhados.
    pub fn alloc(&self) -> MmResult<PhysAddr> {
        let page = {
            let pin = pin_cpu();
            let id = self.pool_index(pin.core_id());
            let local = self.pools[id].lock().pop();
            local.or_else(|| self.steal(id))
        };

        let Some(page) = page else {
            self.stats.inc_failed();
            crate::kwarn!("(PMM) Sem páginas livres em nenhuma CPU");
            return Err(MmError::OutOfMemory);
        };

        // Fora da seção crítica de propósito: a página já saiu da free list
        // SAFETY: a página acabou de sair de uma free list; é nossa
        unsafe { ptr::write_bytes(page.as_ptr(), ALLOC_FILL, PAGE_SIZE) };
        self.stats.inc_alloc();
        Ok(PhysAddr::from_ptr(page.as_ptr()))
    }

    /// Tira uma página do primeiro pool não vazio, em round-robin a partir
    /// de `id + 1`. Um lock por vez.
    fn steal(&self, id: usize) -> Option<NonNull<u8>> {
        for i in 1..self.ncpus {
            let victim = (id + i) % self.ncpus;
            let page = self.pools[victim].lock().pop();
            if page.is_some() {
                self.stats.inc_steal();
                crate::ktrace!("(PMM) Página roubada da CPU ", victim);
                return page;
            }
        }
        None
    }

    fn pool_index(&self, core_id: usize) -> usize {
        if core_id >= self.ncpus {
            crate::kerror!("(PMM) CPU sem pool: ", core_id);
            panic!("kmem: core {} sem pool (ncpus={})", core_id, self.ncpus);
        }
        core_id
    }

    /// Páginas livres no pool de `core`. None se a CPU não tem pool.
    pub fn free_pages(&self, core: usize) -> Option<usize> {
        self.pools[..self.ncpus].get(core).map(|pool| pool.lock().len())
    }

    /// Soma dos pools (não é um snapshot atômico)
    pub fn total_free(&self) -> usize {
        self.pools[..self.ncpus].iter().map(|pool| pool.lock().len()).sum()
    }

    pub fn ncpus(&self) -> usize {
        self.ncpus
    }

    pub fn stats(&self) -> PmmSnapshot {
        self.stats.snapshot()
    }
}

impl Default for KMem {
    fn default() -> Self {
        Self::new()
    }
}
