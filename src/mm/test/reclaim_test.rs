//! Testes do CLOCK e da eviction.

use super::mock::{page, Fixture};
use crate::mm::addr::PhysAddr;
use crate::mm::config::FrameManagerConfig;
use crate::mm::error::FrameError;
use crate::mm::pfm::PageOwner;
use crate::mm::pmm::RawFrameSource;
use crate::mm::spt::Residency;
use crate::mm::swap::{SwapSlot, SwapStore};
use crate::mm::vmm::{AspaceId, PageTableHw};

const A: AspaceId = AspaceId(1);
const B: AspaceId = AspaceId(2);

/// Ocupa os `n` frames do pool com páginas acessadas.
fn full_and_accessed(fx: &Fixture, n: u64) -> Vec<PhysAddr> {
    let frames = (0..n)
        .map(|i| {
            let frame = fx.map(A, page(i));
            fx.mmu().touch(A, page(i));
            frame
        })
        .collect();
    assert_eq!(fx.pool().free_frames(), 0);
    frames
}

#[test]
fn test_all_accessed_picks_first_frame_and_moves_hand() {
    let fx = Fixture::new(4, 4);
    let frames = full_and_accessed(&fx, 4);

    let victim = fx.pfm.evict().unwrap();

    assert_eq!(victim, frames[0]);
    assert_eq!(fx.pfm.clock_position(), 1);
    assert_eq!(fx.pfm.stats().second_chances, 4);
    assert_eq!(fx.pfm.owner_of(victim), None);
    assert_eq!(fx.mmu().translate(A, page(0)), None);

    // Os outros perderam o bit de acesso mas continuam residentes
    for i in 1..4 {
        assert!(!fx.mmu().is_accessed(A, page(i)));
        assert_eq!(fx.entry(A, page(i)).residency, Residency::InFrame);
    }
}

#[test]
fn test_second_chance_spares_recently_used_frame() {
    let fx = Fixture::new(3, 4);
    for i in 0..3 {
        fx.map(A, page(i));
    }
    fx.mmu().touch(A, page(0));

    let victim = fx.pfm.evict().unwrap();
    assert_eq!(fx.pfm.owner_of(victim), None);
    assert_eq!(fx.entry(A, page(1)).frame, None);
    assert_eq!(fx.entry(A, page(0)).residency, Residency::InFrame);
    assert_eq!(fx.pfm.clock_position(), 2);
}

#[test]
fn test_dirty_victim_goes_to_swap() {
    let fx = Fixture::new(2, 4);
    let frame = fx.map(A, page(0));
    fx.map(A, page(1));
    fx.arena.fill(frame, 0x5a);
    fx.mmu().write(A, page(0));
    fx.mmu().touch(A, page(1));

    // page(0) perde o bit na primeira volta, page(1) também; vítima = page(0)
    assert_eq!(fx.pfm.evict(), Ok(frame));

    let entry = fx.entry(A, page(0));
    assert_eq!(entry.residency, Residency::InSwap);
    assert_eq!(entry.frame, None);
    let slot = entry.swap_slot.unwrap();
    assert_eq!(fx.pfm.swap().writes(), vec![(slot, frame)]);
    assert_eq!(fx.pfm.stats().swap_outs, 1);

    // Conteúdo preservado: sobrescreve o frame e lê o slot de volta
    fx.arena.fill(frame, 0);
    fx.pfm.swap().read(slot, frame);
    assert!(fx.arena.is_filled_with(frame, 0x5a));
}

#[test]
fn test_clean_victim_is_never_written() {
    let fx = Fixture::new(2, 4);
    fx.map(A, page(0));
    let frame = fx.map(A, page(1));
    fx.mmu().touch(A, page(0));

    assert_eq!(fx.pfm.evict(), Ok(frame));

    assert!(fx.pfm.swap().writes().is_empty());
    assert_eq!(fx.pfm.stats().swap_outs, 0);
    assert_eq!(fx.entry(A, page(1)).residency, Residency::Neither);
    assert_eq!(fx.entry(A, page(1)).swap_slot, None);
}

#[test]
fn test_pinned_and_empty_slots_are_skipped() {
    let fx = Fixture::new(4, 4);
    fx.map(A, page(0));
    fx.map(A, page(1));
    let target = fx.map(A, page(2));
    fx.pfm.pin(A, page(0)).unwrap();
    fx.pfm.pin(A, page(1)).unwrap();
    // Frame 3 fica no pool (vazio)

    assert_eq!(fx.pfm.evict(), Ok(target));
    assert_eq!(fx.pfm.clock_position(), 3);
    assert_eq!(fx.entry(A, page(0)).residency, Residency::InFrame);
    assert_eq!(fx.entry(A, page(1)).residency, Residency::InFrame);
}

#[test]
fn test_no_victim_when_everything_is_pinned() {
    let fx = Fixture::new(2, 4);
    fx.map(A, page(0));
    fx.map(A, page(1));
    fx.pfm.pin(A, page(0)).unwrap();
    fx.pfm.pin(A, page(1)).unwrap();

    assert_eq!(fx.pfm.evict(), Err(FrameError::NoVictim));

    fx.declare(A, page(2));
    assert_eq!(
        fx.pfm.acquire_for_fault(A, page(2), true),
        Err(FrameError::OutOfMemory)
    );
    fx.assert_consistent();
}

#[test]
fn test_empty_table_has_no_victim() {
    let fx = Fixture::new(4, 4);
    assert_eq!(fx.pfm.evict(), Err(FrameError::NoVictim));
    assert_eq!(fx.pfm.clock_position(), 0);
}

#[test]
fn test_short_scan_bound_still_finds_victim() {
    // Uma volta só limparia os bits; o limite sobe para duas
    for revolutions in [0, 1] {
        let config = FrameManagerConfig::new().with_scan_revolutions(revolutions);
        let fx = Fixture::with_config(4, 4, config);
        let frames = full_and_accessed(&fx, 4);

        assert_eq!(fx.pfm.evict(), Ok(frames[0]));
        assert_eq!(fx.pfm.clock_position(), 1);
    }
}

#[test]
fn test_dirty_victim_without_entry_returns_slot() {
    let fx = Fixture::new(1, 4);
    let frame = fx.map(A, page(0));
    fx.mmu().write(A, page(0));
    fx.spt().remove(A, page(0));

    assert_eq!(fx.pfm.evict(), Ok(frame));

    assert_eq!(fx.pfm.swap().area().free_slots(), 4);
    assert_eq!(fx.pfm.stats().swap_outs, 0);
    assert_eq!(fx.pfm.owner_of(frame), None);
    assert_eq!(fx.mmu().translate(A, page(0)), None);
}

#[test]
fn test_swap_exhaustion_fails_and_leaves_victim_intact() {
    let fx = Fixture::failing(2, 1);
    let first = fx.map(A, page(0));
    let second = fx.map(A, page(1));
    fx.mmu().write(A, page(0));
    fx.mmu().write(A, page(1));

    // Primeira eviction suja usa o único slot
    assert_eq!(fx.pfm.evict(), Ok(first));
    assert_eq!(fx.entry(A, page(0)).swap_slot, Some(SwapSlot(0)));
    fx.pfm.raw().free(first);

    // Segunda: sem slot
    assert_eq!(fx.pfm.evict(), Err(FrameError::SwapExhausted));
    assert!(FrameError::SwapExhausted.is_fatal());

    assert_eq!(fx.pfm.owner_of(second), Some(PageOwner::new(A, page(1))));
    assert_eq!(fx.entry(A, page(1)).residency, Residency::InFrame);
    assert_eq!(fx.mmu().translate(A, page(1)).map(|(f, _)| f), Some(second));
    assert_eq!(fx.pfm.swap().writes().len(), 1);
    fx.assert_consistent();
}

#[test]
#[should_panic]
fn test_swap_exhaustion_panics_by_default() {
    let fx = Fixture::new(1, 0);
    fx.map(A, page(0));
    fx.mmu().write(A, page(0));
    let _ = fx.pfm.evict();
}

#[test]
fn test_victim_bits_read_from_owner_aspace() {
    let fx = Fixture::new(2, 4);
    fx.map(A, page(0));
    let b_frame = fx.map(B, page(0));
    // Mesmo vpage em outro processo: só A foi acessado
    fx.mmu().touch(A, page(0));

    assert_eq!(fx.pfm.evict(), Ok(b_frame));
    assert_eq!(fx.entry(A, page(0)).residency, Residency::InFrame);
    assert_eq!(fx.entry(B, page(0)).residency, Residency::Neither);
}

#[test]
fn test_evicted_frame_reassigned_to_new_owner() {
    let fx = Fixture::new(1, 4);
    let frame = fx.map(A, page(0));
    fx.mmu().write(A, page(0));

    let again = fx.map(B, page(7));
    assert_eq!(again, frame);

    assert_eq!(fx.pfm.owner_of(frame), Some(PageOwner::new(B, page(7))));
    assert_eq!(fx.entry(A, page(0)).residency, Residency::InSwap);
    assert_eq!(fx.entry(B, page(7)).frame, Some(frame));
    fx.assert_consistent();

    // Swap-in de A: o fault reusa o frame de B, que é limpo
    let back = fx.pfm.acquire_for_fault(A, page(0), true).unwrap();
    let slot = fx.entry(A, page(0)).swap_slot.unwrap();
    fx.pfm.swap().read(slot, back);
    fx.pfm.swap().free_slot(slot);
    assert_eq!(fx.entry(B, page(7)).residency, Residency::Neither);
    assert_eq!(fx.pfm.swap().area().free_slots(), 4);
    fx.assert_consistent();
}

#[test]
fn test_zero_revolutions_in_raw_config_is_raised() {
    let mut config = FrameManagerConfig::new();
    config.scan_revolutions = 0;
    let fx = Fixture::with_config(2, 4, config);
    let frames = full_and_accessed(&fx, 2);

    assert_eq!(fx.pfm.config().scan_revolutions, 2);
    assert_eq!(fx.pfm.evict(), Ok(frames[0]));
}
