//! Área de swap: bitmap de slots sobre um `SwapDevice`.

use super::{SwapDevice, SwapSlot, SwapStore};
use crate::mm::addr::PhysAddr;
use crate::mm::config::PAGE_SIZE;
use crate::mm::hhdm::DirectMap;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

/// Área de swap com alocação de slots por bitmap (1 = ocupado).
pub struct SwapArea<D: SwapDevice> {
    device: D,
    window: DirectMap,
    slots: Mutex<Vec<u64>>,
    slot_count: usize,
    pages_swapped_out: AtomicU64,
    pages_swapped_in: AtomicU64,
}

impl<D: SwapDevice> SwapArea<D> {
    /// Inicializa a área com todos os slots livres.
    pub fn new(device: D, window: DirectMap) -> Self {
        let slot_count = device.slot_count();
        let mut bitmap = vec![0u64; (slot_count + 63) / 64];
        let tail = slot_count % 64;
        if tail != 0 {
            if let Some(last) = bitmap.last_mut() {
                *last = !((1u64 << tail) - 1);
            }
        }

        crate::kinfo!("(SWAP) Initialized, slots=", slot_count);

        Self {
            device,
            window,
            slots: Mutex::new(bitmap),
            slot_count,
            pages_swapped_out: AtomicU64::new(0),
            pages_swapped_in: AtomicU64::new(0),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Slots ainda livres
    pub fn free_slots(&self) -> usize {
        let bitmap = self.slots.lock();
        let set: usize = bitmap.iter().map(|w| w.count_ones() as usize).sum();
        let padding = bitmap.len() * 64 - self.slot_count;
        self.slot_count - (set - padding)
    }

    pub fn is_slot_used(&self, slot: SwapSlot) -> bool {
        if slot.index() >= self.slot_count {
            return false;
        }
        self.slots.lock()[slot.index() / 64] & (1 << (slot.index() % 64)) != 0
    }

    /// Estatísticas de swap (swapped out, swapped in)
    pub fn stats(&self) -> (u64, u64) {
        (
            self.pages_swapped_out.load(Ordering::Relaxed),
            self.pages_swapped_in.load(Ordering::Relaxed),
        )
    }

    fn frame_bytes(&self, frame: PhysAddr) -> *mut [u8; PAGE_SIZE] {
        self.window.phys_to_virt(frame)
    }
}

impl<D: SwapDevice> SwapStore for SwapArea<D> {
    fn allocate_slot(&self) -> Option<SwapSlot> {
        let mut bitmap = self.slots.lock();
        for (word_idx, word) in bitmap.iter_mut().enumerate() {
            if *word != u64::MAX {
                let bit = word.trailing_ones() as usize;
                *word |= 1 << bit;
                let slot = SwapSlot((word_idx * 64 + bit) as u64);
                crate::ktrace!("(SWAP) Slot alocado=", slot.0);
                return Some(slot);
            }
        }
        crate::kwarn!("(SWAP) Sem slots livres");
        None
    }

    fn write(&self, slot: SwapSlot, frame: PhysAddr) {
        // SAFETY: o PFM segura o lock da tabela e já desligou a vítima de
        // qualquer outro escritor; a janela cobre o pool de usuário.
        let data = unsafe { &*self.frame_bytes(frame) };
        self.device.write_page(slot.index(), data);
        self.pages_swapped_out.fetch_add(1, Ordering::Relaxed);
    }

    fn read(&self, slot: SwapSlot, frame: PhysAddr) {
        // SAFETY: o frame destino é exclusivo do caller durante o swap-in.
        let data = unsafe { &mut *self.frame_bytes(frame) };
        self.device.read_page(slot.index(), data);
        self.pages_swapped_in.fetch_add(1, Ordering::Relaxed);
    }

    fn free_slot(&self, slot: SwapSlot) {
        if !slot.is_valid() || slot.index() >= self.slot_count {
            crate::kerror!("(SWAP) Slot inválido=", slot.0);
            return;
        }
        let mut bitmap = self.slots.lock();
        let mask = 1u64 << (slot.index() % 64);
        if bitmap[slot.index() / 64] & mask == 0 {
            crate::kwarn!("(SWAP) Slot já livre=", slot.0);
            return;
        }
        bitmap[slot.index() / 64] &= !mask;
    }
}
