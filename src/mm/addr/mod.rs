//! # Addr - Wrappers Type-Safe para Endereços
//!
//! Tipos distintos para PhysAddr e VirtAddr evitando confusão entre o
//! endereço de um frame e o endereço da página de usuário mapeada nele.

mod phys;
mod virt;

pub use phys::PhysAddr;
pub use virt::VirtAddr;
