//! Free list intrusiva de uma CPU.
//!
//! O link mora nos primeiros bytes da própria página livre, então o pool não
//! aloca nada. Tudo aqui roda com o lock do pool segurado.

use core::ptr::NonNull;

/// Cabeçalho gravado no início de cada página livre
#[repr(C)]
struct FreePage {
    next: Option<NonNull<FreePage>>,
}

/// Pilha LIFO de páginas livres.
pub struct FreePool {
    head: Option<NonNull<FreePage>>,
    len: usize,
}

// SAFETY: as páginas encadeadas pertencem ao pool, e o pool só é tocado sob
// o seu Spinlock
unsafe impl Send for FreePool {}

impl FreePool {
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Empilha uma página.
    ///
    /// # Safety
    ///
    /// `page` aponta para uma região alinhada a 8 bytes, com pelo menos um
    /// ponteiro de espaço, que ninguém mais usa.
    pub unsafe fn push(&mut self, page: NonNull<u8>) {
        let node = page.cast::<FreePage>();
        // SAFETY: garantido pelo chamador
        unsafe { node.as_ptr().write(FreePage { next: self.head }) };
        self.head = Some(node);
        self.len += 1;
    }

    /// Desempilha a página livre mais recente
    pub fn pop(&mut self) -> Option<NonNull<u8>> {
        let node = self.head?;
        // SAFETY: todo nó da lista foi escrito por `push`
        self.head = unsafe { node.as_ref().next };
        self.len -= 1;
        Some(node.cast())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl Default for FreePool {
    fn default() -> Self {
        Self::new()
    }
}
