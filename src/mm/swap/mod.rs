//! # Swap Subsystem
//!
//! Backing store para páginas sujas evicted pelo CLOCK.
//!
//! - `SwapStore`: contrato que a eviction consome (slot, escrita, leitura).
//! - `SwapArea`: implementação com bitmap de slots sobre um `SwapDevice`.
//! - `RamSwapDevice`: dispositivo em RAM (boot sem disco, testes).

pub mod area;
pub mod device;

pub use area::SwapArea;
pub use device::{RamSwapDevice, SwapDevice};

use crate::mm::addr::PhysAddr;

/// Slot de swap (índice no backing store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SwapSlot(pub u64);

impl SwapSlot {
    pub const INVALID: Self = Self(u64::MAX);

    pub fn is_valid(&self) -> bool {
        self.0 != u64::MAX
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Backing store de páginas.
///
/// Implementações fazem seu próprio locking. `write` e `read` podem
/// bloquear em I/O; o PFM aceita isso com o lock da tabela adquirido.
pub trait SwapStore: Sync {
    /// Reserva um slot livre. `None` = swap esgotado.
    fn allocate_slot(&self) -> Option<SwapSlot>;

    /// Copia o conteúdo de `frame` para `slot`.
    fn write(&self, slot: SwapSlot, frame: PhysAddr);

    /// Copia `slot` para `frame` (caminho de swap-in, fora do PFM).
    fn read(&self, slot: SwapSlot, frame: PhysAddr);

    /// Libera o slot.
    fn free_slot(&self, slot: SwapSlot);
}
