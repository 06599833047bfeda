//! Entrada da tabela suplementar.

use crate::mm::addr::{PhysAddr, VirtAddr};
use crate::mm::swap::SwapSlot;

bitflags::bitflags! {
    /// Atributos de uma página virtual de usuário
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u32 {
        /// Mapeamento com escrita
        const WRITABLE = 1 << 0;
        /// Página de stack (criada por crescimento de stack)
        const STACK    = 1 << 1;
        /// Conteúdo inicial é zero (sem backing de arquivo)
        const ZERO     = 1 << 2;
    }
}

/// Onde o conteúdo da página está agora
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residency {
    /// Em um frame físico (`frame` válido)
    InFrame,
    /// Em swap (`swap_slot` válido)
    InSwap,
    /// Em lugar nenhum: refazer do backing original (zero-fill ou arquivo)
    Neither,
}

/// Metadados de uma página virtual de usuário
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEntry {
    pub vpage: VirtAddr,
    pub frame: Option<PhysAddr>,
    pub swap_slot: Option<SwapSlot>,
    pub residency: Residency,
    pub flags: PageFlags,
}

impl PageEntry {
    /// Entrada nova, ainda sem backing físico.
    pub fn new(vpage: VirtAddr, flags: PageFlags) -> Self {
        Self {
            vpage,
            frame: None,
            swap_slot: None,
            residency: Residency::Neither,
            flags,
        }
    }

    /// Entrada de stack recém-criada
    pub fn stack(vpage: VirtAddr) -> Self {
        Self::new(vpage, PageFlags::WRITABLE | PageFlags::STACK | PageFlags::ZERO)
    }

    pub fn is_writable(&self) -> bool {
        self.flags.contains(PageFlags::WRITABLE)
    }

    pub fn is_resident(&self) -> bool {
        self.residency == Residency::InFrame
    }

    /// Página passou a ocupar `frame`.
    ///
    /// O slot de swap, se houver, é preservado: quem faz o swap-in ainda
    /// precisa lê-lo e liberá-lo.
    pub fn mark_resident(&mut self, frame: PhysAddr) {
        self.frame = Some(frame);
        self.residency = Residency::InFrame;
    }

    /// Conteúdo foi gravado em `slot` e o frame foi tomado.
    pub fn mark_swapped(&mut self, slot: SwapSlot) {
        self.frame = None;
        self.swap_slot = Some(slot);
        self.residency = Residency::InSwap;
    }

    /// Frame foi tomado e o conteúdo descartado (limpo, refazível).
    pub fn mark_evicted(&mut self) {
        self.frame = None;
        self.residency = Residency::Neither;
    }

    /// `residency` concorda com os campos que ela declara válidos.
    pub fn is_consistent(&self) -> bool {
        match self.residency {
            Residency::InFrame => self.frame.is_some(),
            Residency::InSwap => self.frame.is_none() && self.swap_slot.is_some(),
            Residency::Neither => self.frame.is_none(),
        }
    }
}
