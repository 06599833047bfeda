//! # Direct Map (HHDM)
//!
//! Janela linear `virt = offset + phys` pela qual o kernel alcança o conteúdo
//! de qualquer frame físico gerenciado. O pool de usuário usa a janela para
//! zerar frames; a área de swap, para copiar frames de/para o dispositivo.
//!
//! No kernel o offset é o do HHDM entregue pelo bootloader. Em testes de
//! host, uma arena de heap faz o papel da RAM física e o offset é escolhido
//! para que `base_phys` caia no início da arena.
//!
//! ```text
//! offset + phys ─┬─────────────────────────
//!                │ Frame físico (PAGE_SIZE)
//!                └─────────────────────────
//! ```

use crate::mm::addr::PhysAddr;
use crate::mm::config::PAGE_SIZE;

/// Janela de acesso direto à memória física.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectMap {
    offset: u64,
}

impl DirectMap {
    /// Cria a janela com o offset informado pelo bootloader.
    ///
    /// # Safety
    ///
    /// Toda RAM usada pelos pools deve estar mapeada em `offset + phys`.
    pub const unsafe fn new(offset: u64) -> Self {
        Self { offset }
    }

    /// Offset atual
    #[inline]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Converte endereço físico para ponteiro virtual
    #[inline(always)]
    pub fn phys_to_virt<T>(&self, phys: PhysAddr) -> *mut T {
        self.offset.wrapping_add(phys.as_u64()) as *mut T
    }

    /// Zera um frame físico inteiro
    ///
    /// # Safety
    ///
    /// `frame` deve ser um frame alinhado, mapeado pela janela, e ninguém mais
    /// pode estar acessando seu conteúdo.
    #[inline]
    pub unsafe fn zero_frame(&self, frame: PhysAddr) {
        let ptr: *mut u8 = self.phys_to_virt(frame);
        core::ptr::write_bytes(ptr, 0, PAGE_SIZE);
    }

    /// Copia o conteúdo de um frame para `dst`
    ///
    /// # Safety
    ///
    /// Mesmas condições de `zero_frame`.
    #[inline]
    pub unsafe fn read_frame(&self, frame: PhysAddr, dst: &mut [u8; PAGE_SIZE]) {
        let src: *const u8 = self.phys_to_virt(frame);
        core::ptr::copy_nonoverlapping(src, dst.as_mut_ptr(), PAGE_SIZE);
    }

    /// Sobrescreve o conteúdo de um frame com `src`
    ///
    /// # Safety
    ///
    /// Mesmas condições de `zero_frame`.
    #[inline]
    pub unsafe fn write_frame(&self, frame: PhysAddr, src: &[u8; PAGE_SIZE]) {
        let dst: *mut u8 = self.phys_to_virt(frame);
        core::ptr::copy_nonoverlapping(src.as_ptr(), dst, PAGE_SIZE);
    }
}
