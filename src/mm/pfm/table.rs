//! # Frame Table
//!
//! Uma `FrameEntry` por frame do pool de usuário, indexada por número de
//! frame. O tamanho é fixado no boot e nunca muda.

use super::frame::{FrameEntry, PageOwner};
use crate::mm::addr::PhysAddr;
use crate::mm::config::PAGE_OFFSET_BITS;
use crate::mm::error::{FrameError, FrameResult};
use crate::mm::pmm::UserPoolLayout;
use alloc::vec;
use alloc::vec::Vec;

pub struct FrameTable {
    layout: UserPoolLayout,
    entries: Vec<FrameEntry>,
}

impl FrameTable {
    /// Cria a tabela com todas as entradas vazias.
    pub fn new(layout: UserPoolLayout) -> Self {
        crate::kdebug!("(PFM) Tabela de frames, entradas=", layout.frames);
        Self {
            layout,
            entries: vec![FrameEntry::empty(); layout.frames],
        }
    }

    /// Dimensiona a tabela a partir do total de páginas de RAM.
    ///
    /// Roda no boot: um layout sem nenhum frame de usuário é irrecuperável.
    pub fn initialize(total_ram_pages: usize) -> Self {
        match UserPoolLayout::from_ram_pages(total_ram_pages) {
            Some(layout) => Self::new(layout),
            None => {
                crate::kerror!("(PFM) RAM insuficiente, paginas=", total_ram_pages);
                panic!("(PFM) Nenhum frame de usuário disponível");
            }
        }
    }

    pub fn layout(&self) -> UserPoolLayout {
        self.layout
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Índice de um frame vindo do pool bruto.
    ///
    /// Sem verificação: endereços fora do pool produzem índices sem sentido.
    #[inline]
    pub fn index_of(&self, frame: PhysAddr) -> usize {
        ((frame.as_u64().wrapping_sub(self.layout.base.as_u64())) >> PAGE_OFFSET_BITS) as usize
    }

    /// Índice de `frame`, ou `OutOfBounds` se ele não pertence ao pool.
    #[inline]
    pub fn try_index_of(&self, frame: PhysAddr) -> FrameResult<usize> {
        self.layout.index_of(frame).ok_or(FrameError::OutOfBounds)
    }

    /// Endereço físico do frame `index`
    #[inline]
    pub fn frame_at(&self, index: usize) -> PhysAddr {
        self.layout.frame_at(index)
    }

    #[inline]
    pub fn entry(&self, index: usize) -> &FrameEntry {
        &self.entries[index]
    }

    /// Registra `owner` como dono do frame, sobrescrevendo o anterior.
    pub fn assign(&mut self, index: usize, owner: PageOwner) {
        let entry = &mut self.entries[index];
        entry.owner = Some(owner);
        entry.pinned = false;
    }

    /// Remove apenas o vínculo de dono.
    pub fn clear(&mut self, index: usize) {
        self.entries[index] = FrameEntry::empty();
    }

    pub fn set_pinned(&mut self, index: usize, pinned: bool) {
        self.entries[index].pinned = pinned;
    }

    pub fn owner(&self, index: usize) -> Option<PageOwner> {
        self.entries.get(index).and_then(|e| e.owner)
    }

    /// Reverse lookup: frame ocupado por `owner`. Busca linear.
    pub fn frame_of(&self, owner: PageOwner) -> Option<PhysAddr> {
        self.entries
            .iter()
            .position(|e| e.owner == Some(owner))
            .map(|index| self.frame_at(index))
    }

    /// Itera `(frame, entrada)` em ordem de índice.
    pub fn iter(&self) -> impl Iterator<Item = (PhysAddr, &FrameEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(move |(index, entry)| (self.layout.frame_at(index), entry))
    }

    /// Frames com dono
    pub fn resident_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_owned()).count()
    }
}
