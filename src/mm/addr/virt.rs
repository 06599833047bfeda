use crate::mm::config::{align_down, is_aligned, PAGE_SIZE};
use core::fmt;

/// Endereço virtual (wrapper type-safe)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(u64);

impl VirtAddr {
    /// Cria novo endereço virtual
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

    /// Arredonda para baixo até o início da página
    #[inline]
    pub fn page_base(self) -> Self {
        Self(align_down(self.0 as usize, PAGE_SIZE) as u64)
    }

    /// Verifica se é início de página
    #[inline]
    pub fn is_page_aligned(self) -> bool {
        is_aligned(self.0 as usize, PAGE_SIZE)
    }

    /// Adiciona offset
    #[inline]
    pub fn add(self, offset: u64) -> Self {
        Self(self.0 + offset)
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#x})", self.0)
    }
}

impl fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_base_rounds_down() {
        assert_eq!(VirtAddr::new(0xbfff_f123).page_base(), VirtAddr::new(0xbfff_f000));
        assert_eq!(VirtAddr::new(0x1000).page_base(), VirtAddr::new(0x1000));
        assert!(VirtAddr::new(0x2000).is_page_aligned());
        assert!(!VirtAddr::new(0x2004).is_page_aligned());
    }
}
