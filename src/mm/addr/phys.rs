use crate::mm::config::{align_down, is_aligned, PAGE_SIZE};
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

    /// Retorna o valor interno como u64
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Retorna o valor interno como usize
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Alinha para baixo ao início do frame
    #[inline]
    pub fn frame_base(self) -> Self {
        Self(align_down(self.0 as usize, PAGE_SIZE) as u64)
    }

    /// Verifica se aponta para o início de um frame
    #[inline]
    pub fn is_frame_aligned(self) -> bool {
        is_aligned(self.0 as usize, PAGE_SIZE)
    }

    /// Adiciona offset
    #[inline]
    pub fn add(self, offset: u64) -> Self {
        Self(self.0 + offset)
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#x})", self.0)
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
