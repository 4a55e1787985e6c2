//! # Memory Management Subsystem (MM)
//!
//! Gerência de páginas físicas do kernel.
//!
//! | Módulo   | Responsabilidade                                      |
//! |----------|-------------------------------------------------------|
//! | `pmm`    | Páginas de 4 KiB, uma free list + lock por CPU        |
//! | `addr`   | `PhysAddr`                                            |
//! | `config` | Tamanho de página, número de CPUs, bytes de lixo      |
//! | `error`  | `MmError` / `MmResult`                                |
//!
//! O alocador global é um [`KMem`] estático; o boot chama [`init`] uma vez
//! e depois qualquer CPU usa [`alloc_page`] / [`free_page`].

pub mod addr;
pub mod config;
pub mod error;
pub mod pmm;

pub use addr::PhysAddr;
pub use error::{MmError, MmResult};
pub use pmm::KMem;

static KMEM: KMem = KMem::new();
static INIT: spin::Once<()> = spin::Once::new();

/// Inicializa o alocador global com a RAM em `[kernel_end, phys_top)`.
///
/// Chamadas depois da primeira são ignoradas.
///
/// # Safety
///
/// Ver [`KMem::init`].
pub unsafe fn init(kernel_end: PhysAddr, phys_top: PhysAddr) {
    INIT.call_once(|| {
        crate::kinfo!("(MM) Inicializando alocador de páginas...");
        // SAFETY: repassado do chamador
        unsafe { KMEM.init(kernel_end, phys_top) };
        crate::kok!("(MM) Alocador de páginas pronto");
    });
}

/// Aloca uma página do alocador global
pub fn alloc_page() -> MmResult<PhysAddr> {
    KMEM.alloc()
}

/// Devolve uma página ao alocador global.
///
/// # Safety
///
/// Ver [`KMem::free`].
pub unsafe fn free_page(pa: PhysAddr) {
    // SAFETY: repassado do chamador
    unsafe { KMEM.free(pa) }
}

/// O alocador global (estatísticas, contagens por CPU)
pub fn kmem() -> &'static KMem {
    &KMEM
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::config::PAGE_SIZE;
    use crate::mm::pmm::tests::Arena;

    #[test]
    fn test_global_allocator() {
        // A arena vive até o fim do processo: o alocador global é estático
        let arena = Box::leak(Box::new(Arena::new(8)));
        unsafe {
            init(arena.start(), arena.end());
            // Segunda chamada não faz nada
            init(arena.start(), arena.end());
        }
        assert_eq!(kmem().total_free(), 8);

        let pa = alloc_page().unwrap();
        assert!(pa.is_aligned(PAGE_SIZE as u64));
        assert_eq!(kmem().total_free(), 7);
        unsafe { free_page(pa) };
        assert_eq!(kmem().total_free(), 8);
    }
}
