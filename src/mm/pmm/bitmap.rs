//! Pool de usuário baseado em bitmap.
//!
//! Cada bit representa um frame de 4KiB do `UserPoolLayout`.
//! 0 = Livre, 1 = Usado. Bits além de `frames` no último word ficam em 1.

use super::stats::PmmStats;
use super::{RawFrameSource, UserPoolLayout};
use crate::mm::addr::PhysAddr;
use crate::mm::hhdm::DirectMap;
use alloc::vec;
use alloc::vec::Vec;
use spin::Mutex;

/// Erros do pool bruto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmmError {
    /// Frame fora do pool
    OutOfBounds,
    /// Frame já estava livre
    DoubleFree,
}

struct BitmapInner {
    bitmap: Vec<u64>,
    /// Dica para a próxima alocação (round-robin simples).
    next_free: usize,
}

/// Alocador bruto do pool de usuário.
pub struct UserPool {
    layout: UserPoolLayout,
    window: DirectMap,
    inner: Mutex<BitmapInner>,
    stats: PmmStats,
}

impl UserPool {
    /// Cria o pool com todos os frames livres.
    ///
    /// `window` deve alcançar todo o layout (usado para zerar frames).
    pub fn new(layout: UserPoolLayout, window: DirectMap) -> Self {
        let words = (layout.frames + 63) / 64;
        let mut bitmap = vec![0u64; words];

        // Marcar bits excedentes do último word como ocupados
        let tail = layout.frames % 64;
        if tail != 0 {
            if let Some(last) = bitmap.last_mut() {
                *last = !((1u64 << tail) - 1);
            }
        }

        crate::kinfo!("(PMM) Pool de usuário: frames=", layout.frames);
        crate::kdebug!("(PMM) Base do pool=", layout.base.as_u64());

        Self {
            layout,
            window,
            inner: Mutex::new(BitmapInner {
                bitmap,
                next_free: 0,
            }),
            stats: PmmStats::new(layout.frames),
        }
    }

    pub fn layout(&self) -> UserPoolLayout {
        self.layout
    }

    pub fn stats(&self) -> &PmmStats {
        &self.stats
    }

    pub fn free_frames(&self) -> usize {
        self.stats.free()
    }

    /// Verifica se o frame está marcado como usado
    pub fn is_allocated(&self, frame: PhysAddr) -> bool {
        match self.layout.index_of(frame) {
            Some(index) => self.inner.lock().bitmap[index / 64] & (1 << (index % 64)) != 0,
            None => false,
        }
    }

    /// Devolve um frame, reportando frames estranhos e double free.
    pub fn try_free(&self, frame: PhysAddr) -> Result<(), PmmError> {
        let index = self.layout.index_of(frame).ok_or(PmmError::OutOfBounds)?;
        let word = index / 64;
        let bit = index % 64;

        let mut inner = self.inner.lock();
        if inner.bitmap[word] & (1 << bit) == 0 {
            return Err(PmmError::DoubleFree);
        }

        inner.bitmap[word] &= !(1 << bit);
        if word < inner.next_free {
            inner.next_free = word;
        }
        self.stats.inc_free();
        Ok(())
    }

    fn take_frame(&self) -> Option<PhysAddr> {
        let mut inner = self.inner.lock();
        let words = inner.bitmap.len();
        let start_search = inner.next_free;

        for i in 0..words {
            let idx = (start_search + i) % words;
            let entry = inner.bitmap[idx];

            if entry != u64::MAX {
                let bit = entry.trailing_ones() as usize;
                inner.bitmap[idx] |= 1 << bit;
                inner.next_free = idx;
                self.stats.inc_alloc();
                return Some(self.layout.frame_at(idx * 64 + bit));
            }
        }

        None
    }
}

impl RawFrameSource for UserPool {
    fn allocate(&self, zero: bool) -> Option<PhysAddr> {
        let Some(frame) = self.take_frame() else {
            self.stats.inc_failed();
            crate::ktrace!("(PMM) Pool de usuário vazio");
            return None;
        };

        if zero {
            self.zero(frame);
        }
        Some(frame)
    }

    fn free(&self, frame: PhysAddr) {
        match self.try_free(frame) {
            Ok(()) => {}
            Err(PmmError::DoubleFree) => {
                crate::kwarn!("(PMM) Double free ignorado em=", frame.as_u64());
            }
            Err(PmmError::OutOfBounds) => {
                crate::kerror!("(PMM) Frame fora do pool=", frame.as_u64());
            }
        }
    }

    fn zero(&self, frame: PhysAddr) {
        // SAFETY: frame veio deste pool, a janela cobre o layout e o caller
        // é o dono exclusivo do frame neste momento.
        unsafe { self.window.zero_frame(frame) };
    }
}
