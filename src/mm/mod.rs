//! # Memory Management - Frames de Usuário
//!
//! Gerenciamento dos frames físicos que sustentam páginas virtuais de
//! usuário, com eviction por CLOCK e swap.
//!
//! ## Arquitetura dos Módulos
//!
//! | Módulo    | Responsabilidade |
//! |-----------|------------------|
//! | `pfm`     | Tabela de frames e `FrameManager` (aquisição, release, pin). |
//! | `reclaim` | CLOCK (second chance) e retirada de vítimas. |
//! | `pmm`     | Pool bruto de frames de usuário (bitmap). |
//! | `swap`    | Slots de swap sobre um dispositivo de páginas. |
//! | `spt`     | Tabela suplementar: onde cada página virtual está. |
//! | `vmm`     | Contrato com as page tables de hardware. |
//! | `hhdm`    | Janela direta para o conteúdo de frames físicos. |
//!
//! ## Fluxo
//!
//! ```text
//! page fault / stack ──▶ FrameManager ──▶ pmm (pool bruto)
//!                             │ pool vazio
//!                             ▼
//!                         reclaim (CLOCK) ──▶ swap (se suja)
//!                             │
//!                             ▼
//!                 spt + vmm: novo dono, novo mapeamento
//! ```
//!
//! ## Locking
//!
//! O lock da tabela de frames vem sempre primeiro. Pool, swap, tabela
//! suplementar e page tables têm locks próprios e nunca chamam o PFM de
//! volta, então a ordem é fixa e não há ciclo.

pub mod addr;
pub mod config;
pub mod error;
pub mod hhdm;
pub mod pfm;
pub mod pmm;
pub mod reclaim;
pub mod spt;
pub mod swap;
pub mod vmm;

#[cfg(test)]
mod test;

pub use addr::{PhysAddr, VirtAddr};
pub use config::{FrameManagerConfig, SwapExhaustionPolicy};
pub use error::{FrameError, FrameResult};
pub use pfm::{FrameManager, PageOwner, PfmStats};
pub use vmm::AspaceId;
