//! # Eviction Engine
//!
//! Retira a vítima escolhida pelo CLOCK do seu dono.

use crate::mm::addr::PhysAddr;
use crate::mm::config::SwapExhaustionPolicy;
use crate::mm::error::{FrameError, FrameResult};
use crate::mm::pfm::FrameTable;
use crate::mm::spt::SupplementalTable;
use crate::mm::swap::{SwapSlot, SwapStore};
use crate::mm::vmm::PageTableHw;

/// Resultado de uma eviction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    /// Frame liberado, sem dono e fora do pool bruto
    pub frame: PhysAddr,
    /// Slot onde o conteúdo foi gravado (vítima suja)
    pub swapped_to: Option<SwapSlot>,
}

/// Retira o frame `index` do seu dono.
///
/// 1. Suja: reserva slot, grava o frame, entrada vai para `InSwap`.
///    Limpa: conteúdo descartado, entrada vai para `Neither`.
/// 2. Remove o mapeamento na page table do dono.
/// 3. Desfaz o vínculo na tabela de frames.
///
/// Se a entrada da vítima suja sumiu, o slot é devolvido na hora.
///
/// Sem slot livre para uma vítima suja, a política decide: `Panic` derruba
/// o kernel, `Fail` retorna `SwapExhausted` sem tocar em nada.
pub fn evict_frame<H, S, T>(
    table: &mut FrameTable,
    index: usize,
    hw: &H,
    swap: &S,
    spt: &T,
    policy: SwapExhaustionPolicy,
) -> FrameResult<Eviction>
where
    H: PageTableHw,
    S: SwapStore,
    T: SupplementalTable,
{
    let owner = table.owner(index).ok_or(FrameError::Inconsistent)?;
    let frame = table.frame_at(index);

    let swapped_to = if hw.is_dirty(owner.aspace, owner.vpage) {
        let slot = match swap.allocate_slot() {
            Some(slot) => slot,
            None => {
                crate::kerror!("(SWAP) Swap esgotado, vitima=", frame.as_u64());
                match policy {
                    SwapExhaustionPolicy::Panic => {
                        panic!("(SWAP) Swap esgotado durante eviction")
                    }
                    SwapExhaustionPolicy::Fail => return Err(FrameError::SwapExhausted),
                }
            }
        };

        swap.write(slot, frame);
        if spt.update(owner.aspace, owner.vpage, |e| e.mark_swapped(slot)) {
            crate::ktrace!("(SWAP) Frame gravado no slot=", slot.0);
            Some(slot)
        } else {
            // Sem entrada ninguém vai ler o slot de volta
            crate::kwarn!("(CLOCK) Vitima suja sem entrada, vpage=", owner.vpage.as_u64());
            swap.free_slot(slot);
            None
        }
    } else {
        if !spt.update(owner.aspace, owner.vpage, |e| e.mark_evicted()) {
            crate::kwarn!("(CLOCK) Vitima limpa sem entrada, vpage=", owner.vpage.as_u64());
        }
        None
    };

    hw.clear_mapping(owner.aspace, owner.vpage);
    table.clear(index);

    crate::kdebug!("(CLOCK) Frame evicted=", frame.as_u64());
    Ok(Eviction { frame, swapped_to })
}
