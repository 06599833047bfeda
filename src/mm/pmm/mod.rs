//! # PMM - Physical Memory Manager
//!
//! Fonte bruta de frames de usuário. O gerenciador de frames (PFM) pede
//! frames aqui primeiro e só recorre à eviction quando o pool esgota.
//!
//! ## Layout do pool de usuário
//!
//! A memória acima de 1 MiB é dividida ao meio entre o pool do kernel e o
//! pool de usuário. Cada pool reserva sua primeira página para o bitmap.
//!
//! ```text
//! 0 ──── 1 MiB ─────────── kernel pool ──────┬─ bitmap ─┬── user frames ──▶
//!                (free_pages / 2 páginas)     │ 1 página │ free_pages/2 - 1
//! ```

pub mod bitmap;
pub mod stats;

pub use bitmap::{PmmError, UserPool};
pub use stats::PmmStats;

use crate::mm::addr::PhysAddr;
use crate::mm::config::{LOW_MEMORY_END, LOW_MEMORY_PAGES, PAGE_SIZE};

/// Alocador bruto de frames físicos.
///
/// Implementações fazem seu próprio locking; o PFM chama estes métodos com o
/// lock da tabela de frames já adquirido.
pub trait RawFrameSource: Sync {
    /// Retira um frame do pool. `zero` pede conteúdo zerado.
    /// `None` quando o pool está vazio.
    fn allocate(&self, zero: bool) -> Option<PhysAddr>;

    /// Devolve um frame ao pool.
    fn free(&self, frame: PhysAddr);

    /// Zera um frame já alocado (frames obtidos por eviction).
    fn zero(&self, frame: PhysAddr);
}

/// Região física coberta pela tabela de frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPoolLayout {
    /// Endereço do frame de índice 0
    pub base: PhysAddr,
    /// Número de frames de usuário
    pub frames: usize,
}

impl UserPoolLayout {
    pub const fn new(base: PhysAddr, frames: usize) -> Self {
        Self { base, frames }
    }

    /// Dimensiona o pool de usuário a partir do total de páginas de RAM.
    ///
    /// `free_pages` é tudo acima de 1 MiB. O pool de usuário começa depois
    /// da metade do kernel mais uma página de bitmap e contém
    /// `free_pages / 2 - 1` frames. `None` se não sobra nenhum frame.
    pub fn from_ram_pages(total_ram_pages: usize) -> Option<Self> {
        let free_pages = total_ram_pages.checked_sub(LOW_MEMORY_PAGES)?;
        let half = free_pages / 2;
        let frames = half.checked_sub(1)?;
        if frames == 0 {
            return None;
        }

        let base = LOW_MEMORY_END + ((half + 1) * PAGE_SIZE) as u64;
        Some(Self {
            base: PhysAddr::new(base),
            frames,
        })
    }

    /// Endereço físico do frame `index`
    #[inline]
    pub fn frame_at(&self, index: usize) -> PhysAddr {
        self.base.add((index * PAGE_SIZE) as u64)
    }

    /// Índice do frame, ou `None` se `frame` não pertence ao pool ou não
    /// está alinhado.
    #[inline]
    pub fn index_of(&self, frame: PhysAddr) -> Option<usize> {
        if !frame.is_frame_aligned() || frame < self.base {
            return None;
        }
        let index = ((frame.as_u64() - self.base.as_u64()) / PAGE_SIZE as u64) as usize;
        if index < self.frames {
            Some(index)
        } else {
            None
        }
    }

    /// Primeiro endereço após o pool
    #[inline]
    pub fn end(&self) -> PhysAddr {
        self.frame_at(self.frames)
    }
}
