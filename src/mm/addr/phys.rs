use crate::klib::align::{align_up, is_aligned};
use core::fmt;

/// Endereço físico (wrapper type-safe)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysAddr(u64);

impl PhysAddr {
    /// Cria novo endereço físico
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Endereço de um ponteiro do direct map
    #[inline]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize as u64)
    }

    /// Retorna o valor interno como u64
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Ponteiro pelo direct map
    #[inline]
    pub const fn as_mut_ptr(self) -> *mut u8 {
        self.0 as usize as *mut u8
    }

    /// Alinha para cima (múltiplo de align). None no topo do espaço.
    #[inline]
    pub fn align_up(self, align: u64) -> Option<Self> {
        let addr = usize::try_from(self.0).ok()?;
        align_up(addr, align as usize).map(|a| Self(a as u64))
    }

    /// Verifica alinhamento
    #[inline]
    pub fn is_aligned(self, align: u64) -> bool {
        is_aligned(self.0 as usize, align as usize)
    }

    /// Adiciona offset. None se passar do fim do espaço de endereços.
    #[inline]
    pub fn checked_add(self, offset: u64) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#x})", self.0)
    }
}
