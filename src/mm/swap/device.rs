//! Dispositivos de swap com granularidade de página.

use crate::mm::config::PAGE_SIZE;
use alloc::vec;
use alloc::vec::Vec;
use spin::Mutex;

/// Dispositivo de bloco visto em unidades de página.
pub trait SwapDevice: Sync {
    /// Número de páginas que cabem no dispositivo
    fn slot_count(&self) -> usize;

    fn write_page(&self, slot: usize, data: &[u8; PAGE_SIZE]);

    fn read_page(&self, slot: usize, data: &mut [u8; PAGE_SIZE]);
}

/// Swap em RAM
pub struct RamSwapDevice {
    data: Mutex<Vec<u8>>,
    slots: usize,
}

impl RamSwapDevice {
    pub fn new(slots: usize) -> Self {
        Self {
            data: Mutex::new(vec![0u8; slots * PAGE_SIZE]),
            slots,
        }
    }
}

impl SwapDevice for RamSwapDevice {
    fn slot_count(&self) -> usize {
        self.slots
    }

    fn write_page(&self, slot: usize, data: &[u8; PAGE_SIZE]) {
        let start = slot * PAGE_SIZE;
        self.data.lock()[start..start + PAGE_SIZE].copy_from_slice(data);
    }

    fn read_page(&self, slot: usize, data: &mut [u8; PAGE_SIZE]) {
        let start = slot * PAGE_SIZE;
        data.copy_from_slice(&self.data.lock()[start..start + PAGE_SIZE]);
    }
}
