//! # VMM - Adaptador de Page Tables de Hardware
//!
//! O gerenciador de frames não mexe em PTEs diretamente. Tudo passa por
//! `PageTableHw`, que a camada de arquitetura implementa (x86_64: PML4 via
//! HHDM, com INVLPG após cada alteração).
//!
//! Todas as consultas são feitas pelo par `(aspace, vpage)` do mapeamento
//! DONO do frame. Nunca pelo address space da thread que está fazendo a
//! eviction: a vítima pode pertencer a outro processo.

use crate::mm::addr::{PhysAddr, VirtAddr};
use core::fmt;

/// Identificador de um address space (uma page table de processo).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct AspaceId(pub u64);

impl AspaceId {
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aspace#{}", self.0)
    }
}

/// Operações de page table que o gerenciador de frames consome.
///
/// Implementações fazem seu próprio locking por address space.
pub trait PageTableHw: Sync {
    /// Instala `vpage -> frame`. `false` se a page table não pôde ser
    /// estendida (sem memória para tabelas intermediárias).
    fn install_mapping(&self, aspace: AspaceId, vpage: VirtAddr, frame: PhysAddr, writable: bool)
        -> bool;

    /// Remove o mapeamento de `vpage` (com invalidação de TLB).
    fn clear_mapping(&self, aspace: AspaceId, vpage: VirtAddr);

    /// Bit de acesso (ACCESSED) da PTE de `vpage`.
    fn is_accessed(&self, aspace: AspaceId, vpage: VirtAddr) -> bool;

    /// Escreve o bit de acesso da PTE de `vpage`.
    fn set_accessed(&self, aspace: AspaceId, vpage: VirtAddr, accessed: bool);

    /// Bit de escrita (DIRTY) da PTE de `vpage`.
    fn is_dirty(&self, aspace: AspaceId, vpage: VirtAddr) -> bool;
}
