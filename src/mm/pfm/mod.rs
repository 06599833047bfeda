//! # Page Frame Manager (PFM)
//!
//! Dono dos frames físicos que sustentam páginas de usuário.
//!
//! Três peças:
//! - `FrameTable`: quem ocupa cada frame (reverse mapping).
//! - `FrameManager`: aquisição de frames para page fault e crescimento de
//!   stack, com eviction quando o pool bruto esgota.
//! - `reclaim`: o CLOCK que escolhe e retira vítimas.
//!
//! ## Locking
//!
//! Um único `spin::Mutex` protege tabela, ponteiro do CLOCK e estatísticas.
//! Cada operação pública roda inteira sob ele, inclusive a alocação bruta,
//! a escrita em swap e a instalação do mapeamento.
//!
//! Ordem: lock da tabela → locks internos dos colaboradores (pool bruto,
//! swap, tabela suplementar, page tables). Colaboradores nunca chamam o PFM.

pub mod frame;
pub mod manager;
pub mod table;

pub use frame::{FrameEntry, PageOwner};
pub use manager::FrameManager;
pub use table::FrameTable;

/// Contadores do PFM
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PfmStats {
    /// Frames entregues a páginas (fault + stack)
    pub allocations: u64,
    /// Frames entregues por crescimento de stack
    pub stack_growths: u64,
    /// Frames tomados de outra página
    pub evictions: u64,
    /// Evictions que gravaram em swap
    pub swap_outs: u64,
    /// Bits de acesso limpos pelo CLOCK
    pub second_chances: u64,
    /// Frames devolvidos ao pool por release
    pub releases: u64,
    /// Aquisições que falharam
    pub failed: u64,
}
