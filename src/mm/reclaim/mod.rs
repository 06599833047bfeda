//! # Page Reclaim Subsystem
//!
//! Eviction por CLOCK (second chance) sobre a tabela de frames.
//!
//! - `clock`: ponteiro circular e escolha da vítima (bits de acesso).
//! - `evict`: retirada da vítima (swap-out se suja, descarte se limpa).
//!
//! Tudo aqui roda com o lock da tabela de frames adquirido pelo PFM.

pub mod clock;
pub mod evict;

pub use clock::ClockHand;
pub use evict::{evict_frame, Eviction};
