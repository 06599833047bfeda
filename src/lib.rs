//! Forge Frame Library.
//!
//! Gerenciador de frames físicos do subsistema de memória virtual do
//! Redstone OS: tabela de frames de usuário, alocação para page faults e
//! crescimento de stack, e eviction CLOCK (second-chance) com swap-out.
//!
//! Em testes de host o crate compila com `std`; no kernel é `no_std` + `alloc`.

#![cfg_attr(not(test), no_std)]

// Habilitar alocação dinâmica (necessário para Vec/Box/BTreeMap)
extern crate alloc;

// --- Infraestrutura ---
pub mod logging; // Macros kinfo!/kerror!/... e sink de saída

// --- Gerenciamento de Memória ---
pub mod mm; // Frame Table, Eviction, Swap, SPT

pub use mm::{FrameError, FrameManager, FrameResult};
