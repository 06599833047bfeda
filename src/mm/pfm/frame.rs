//! # Frame Entry
//!
//! Metadados de um frame físico do pool de usuário.

use crate::mm::addr::VirtAddr;
use crate::mm::vmm::AspaceId;

/// Dono de um frame: a página virtual que o mapeia.
///
/// É uma chave fraca para a entrada da tabela suplementar e, ao mesmo tempo,
/// o reverse mapping do frame (`aspace` é a page table onde os bits de
/// acesso e escrita devem ser consultados).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageOwner {
    pub aspace: AspaceId,
    pub vpage: VirtAddr,
}

impl PageOwner {
    pub const fn new(aspace: AspaceId, vpage: VirtAddr) -> Self {
        Self { aspace, vpage }
    }
}

/// Estado de um frame na tabela
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEntry {
    /// Página que ocupa o frame. `None` = frame está no pool bruto
    /// (ou acabou de ser tomado por eviction e ainda não foi reatribuído).
    pub owner: Option<PageOwner>,
    /// Frame fixado: a eviction nunca o escolhe.
    pub pinned: bool,
}

impl FrameEntry {
    pub const fn empty() -> Self {
        Self {
            owner: None,
            pinned: false,
        }
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Candidato à varredura do CLOCK
    #[inline]
    pub fn is_evictable(&self) -> bool {
        self.owner.is_some() && !self.pinned
    }
}
