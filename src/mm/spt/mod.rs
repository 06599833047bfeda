//! # SPT - Supplemental Page Table
//!
//! Registro autoritativo de onde cada página virtual de usuário está:
//! num frame, num slot de swap, ou em lugar nenhum (zero-fill / arquivo).
//!
//! O gerenciador de frames só lê e altera `frame`, `swap_slot` e
//! `residency` de uma entrada. Criação e destruição das entradas pertencem
//! ao caminho de page fault e ao teardown do processo.
//!
//! Entradas são referenciadas por chave `(AspaceId, VirtAddr)`, nunca por
//! ponteiro: a tabela de frames guarda a chave, a entrada guarda o
//! `PhysAddr` do frame. Destruir qualquer um dos lados não deixa ponteiro
//! pendurado no outro.

pub mod entry;
pub mod table;

pub use entry::{PageEntry, PageFlags, Residency};
pub use table::{SptRegistry, SupplementalPageTable};

use crate::mm::addr::VirtAddr;
use crate::mm::vmm::AspaceId;

/// Erros da tabela suplementar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SptError {
    /// Já existe entrada para a página
    AlreadyExists,
    /// Address space não registrado
    NoAddressSpace,
    /// Endereço não alinhado a página
    NotAligned,
}

impl SptError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyExists => "Entrada já existe",
            Self::NoAddressSpace => "Address space desconhecido",
            Self::NotAligned => "Endereço não alinhado a página",
        }
    }
}

impl core::fmt::Display for SptError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Contrato que o gerenciador de frames consome.
///
/// Implementações fazem seu próprio locking e nunca chamam de volta o PFM.
pub trait SupplementalTable: Sync {
    /// Cópia da entrada de `vpage`, se existir.
    fn lookup(&self, aspace: AspaceId, vpage: VirtAddr) -> Option<PageEntry>;

    /// Aplica `f` à entrada de `vpage`. `false` se a entrada não existe.
    fn update<F: FnOnce(&mut PageEntry)>(&self, aspace: AspaceId, vpage: VirtAddr, f: F) -> bool;

    /// Cria a entrada de uma nova página de stack (gravável, zero-fill).
    fn create_stack_entry(&self, aspace: AspaceId, vpage: VirtAddr) -> Result<(), SptError>;
}
