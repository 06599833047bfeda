//! Fixtures dos testes de memória.

use crate::mm::addr::{PhysAddr, VirtAddr};
use crate::mm::config::{FrameManagerConfig, SwapExhaustionPolicy, PAGE_SIZE};
use crate::mm::hhdm::DirectMap;
use crate::mm::pfm::FrameManager;
use crate::mm::pmm::{UserPool, UserPoolLayout};
use crate::mm::spt::{PageEntry, PageFlags, Residency, SptError, SptRegistry, SupplementalTable};
use crate::mm::swap::{RamSwapDevice, SwapArea, SwapSlot, SwapStore};
use crate::mm::vmm::{AspaceId, PageTableHw};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use spin::Mutex;

/// Endereço físico do primeiro frame de usuário nos testes
pub const TEST_POOL_BASE: u64 = 0x40_0000;

// =============================================================================
// RAM FALSA
// =============================================================================

/// Arena de heap que faz o papel da RAM física do pool de usuário.
pub struct PhysArena {
    _mem: Vec<u8>,
    window: DirectMap,
    layout: UserPoolLayout,
}

impl PhysArena {
    pub fn new(frames: usize) -> Self {
        let layout = UserPoolLayout::new(PhysAddr::new(TEST_POOL_BASE), frames);
        let mut mem = vec![0u8; frames * PAGE_SIZE];
        let offset = (mem.as_mut_ptr() as u64).wrapping_sub(TEST_POOL_BASE);
        // SAFETY: `mem` vive tanto quanto a arena e cobre exatamente o layout.
        let window = unsafe { DirectMap::new(offset) };
        Self {
            _mem: mem,
            window,
            layout,
        }
    }

    pub fn layout(&self) -> UserPoolLayout {
        self.layout
    }

    pub fn window(&self) -> DirectMap {
        self.window
    }

    pub fn fill(&self, frame: PhysAddr, byte: u8) {
        assert!(self.layout.index_of(frame).is_some());
        let page = [byte; PAGE_SIZE];
        unsafe { self.window.write_frame(frame, &page) };
    }

    pub fn contents(&self, frame: PhysAddr) -> Vec<u8> {
        assert!(self.layout.index_of(frame).is_some());
        let mut page = [0u8; PAGE_SIZE];
        unsafe { self.window.read_frame(frame, &mut page) };
        page.to_vec()
    }

    pub fn is_filled_with(&self, frame: PhysAddr, byte: u8) -> bool {
        self.contents(frame).iter().all(|&b| b == byte)
    }
}

// =============================================================================
// MMU POR SOFTWARE
// =============================================================================

bitflags::bitflags! {
    /// Bits de uma PTE simulada (subconjunto x86_64)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PteFlags: u8 {
        const PRESENT  = 1 << 0;
        const WRITABLE = 1 << 1;
        const USER     = 1 << 2;
        const ACCESSED = 1 << 5;
        const DIRTY    = 1 << 6;
    }
}

/// Page tables de todos os address spaces num único mapa.
#[derive(Default)]
pub struct SoftMmu {
    ptes: Mutex<BTreeMap<(AspaceId, VirtAddr), (PhysAddr, PteFlags)>>,
    fail_installs: AtomicBool,
}

impl SoftMmu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simula uma leitura da página pelo processo.
    pub fn touch(&self, aspace: AspaceId, vpage: VirtAddr) {
        if let Some((_, flags)) = self.ptes.lock().get_mut(&(aspace, vpage)) {
            flags.insert(PteFlags::ACCESSED);
        }
    }

    /// Simula uma escrita da página pelo processo.
    pub fn write(&self, aspace: AspaceId, vpage: VirtAddr) {
        if let Some((_, flags)) = self.ptes.lock().get_mut(&(aspace, vpage)) {
            flags.insert(PteFlags::ACCESSED | PteFlags::DIRTY);
        }
    }

    /// Liga só o bit DIRTY.
    pub fn set_dirty(&self, aspace: AspaceId, vpage: VirtAddr) {
        if let Some((_, flags)) = self.ptes.lock().get_mut(&(aspace, vpage)) {
            flags.insert(PteFlags::DIRTY);
        }
    }

    pub fn translate(&self, aspace: AspaceId, vpage: VirtAddr) -> Option<(PhysAddr, PteFlags)> {
        self.ptes.lock().get(&(aspace, vpage)).copied()
    }

    pub fn set_fail_installs(&self, fail: bool) {
        self.fail_installs.store(fail, Ordering::SeqCst);
    }

    pub fn mapping_count(&self) -> usize {
        self.ptes.lock().len()
    }
}

impl PageTableHw for SoftMmu {
    fn install_mapping(
        &self,
        aspace: AspaceId,
        vpage: VirtAddr,
        frame: PhysAddr,
        writable: bool,
    ) -> bool {
        if self.fail_installs.load(Ordering::SeqCst) {
            return false;
        }
        let mut flags = PteFlags::PRESENT | PteFlags::USER;
        if writable {
            flags |= PteFlags::WRITABLE;
        }
        self.ptes.lock().insert((aspace, vpage), (frame, flags));
        true
    }

    fn clear_mapping(&self, aspace: AspaceId, vpage: VirtAddr) {
        self.ptes.lock().remove(&(aspace, vpage));
    }

    fn is_accessed(&self, aspace: AspaceId, vpage: VirtAddr) -> bool {
        self.translate(aspace, vpage)
            .map_or(false, |(_, f)| f.contains(PteFlags::ACCESSED))
    }

    fn set_accessed(&self, aspace: AspaceId, vpage: VirtAddr, accessed: bool) {
        if let Some((_, flags)) = self.ptes.lock().get_mut(&(aspace, vpage)) {
            flags.set(PteFlags::ACCESSED, accessed);
        }
    }

    fn is_dirty(&self, aspace: AspaceId, vpage: VirtAddr) -> bool {
        self.translate(aspace, vpage)
            .map_or(false, |(_, f)| f.contains(PteFlags::DIRTY))
    }
}

// =============================================================================
// SWAP GRAVADO
// =============================================================================

/// `SwapArea` em RAM que registra cada escrita.
pub struct RecordingSwap {
    inner: SwapArea<RamSwapDevice>,
    writes: Mutex<Vec<(SwapSlot, PhysAddr)>>,
}

impl RecordingSwap {
    pub fn new(slots: usize, window: DirectMap) -> Self {
        Self {
            inner: SwapArea::new(RamSwapDevice::new(slots), window),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn area(&self) -> &SwapArea<RamSwapDevice> {
        &self.inner
    }

    pub fn writes(&self) -> Vec<(SwapSlot, PhysAddr)> {
        self.writes.lock().clone()
    }
}

impl SwapStore for RecordingSwap {
    fn allocate_slot(&self) -> Option<SwapSlot> {
        self.inner.allocate_slot()
    }

    fn write(&self, slot: SwapSlot, frame: PhysAddr) {
        self.writes.lock().push((slot, frame));
        self.inner.write(slot, frame);
    }

    fn read(&self, slot: SwapSlot, frame: PhysAddr) {
        self.inner.read(slot, frame);
    }

    fn free_slot(&self, slot: SwapSlot) {
        self.inner.free_slot(slot);
    }
}

// =============================================================================
// TABELA SUPLEMENTAR COM FALHAS
// =============================================================================

/// `SptRegistry` que pode perder entradas entre chamadas do PFM.
#[derive(Default)]
pub struct FlakySpt {
    inner: SptRegistry,
    /// `update` passa a responder "entrada não existe"
    fail_updates: AtomicBool,
    /// `lookup` passa a responder `None`
    hide_lookups: AtomicBool,
}

impl FlakySpt {
    pub fn registry(&self) -> &SptRegistry {
        &self.inner
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn set_hide_lookups(&self, hide: bool) {
        self.hide_lookups.store(hide, Ordering::SeqCst);
    }
}

impl SupplementalTable for FlakySpt {
    fn lookup(&self, aspace: AspaceId, vpage: VirtAddr) -> Option<PageEntry> {
        if self.hide_lookups.load(Ordering::SeqCst) {
            return None;
        }
        self.inner.lookup(aspace, vpage)
    }

    fn update<F: FnOnce(&mut PageEntry)>(&self, aspace: AspaceId, vpage: VirtAddr, f: F) -> bool {
        if self.fail_updates.load(Ordering::SeqCst) {
            return false;
        }
        self.inner.update(aspace, vpage, f)
    }

    fn create_stack_entry(&self, aspace: AspaceId, vpage: VirtAddr) -> Result<(), SptError> {
        self.inner.create_stack_entry(aspace, vpage)
    }
}

// =============================================================================
// FIXTURE COMPLETA
// =============================================================================

pub type TestManager = FrameManager<UserPool, SoftMmu, RecordingSwap, FlakySpt>;

pub struct Fixture {
    pub pfm: TestManager,
    pub arena: PhysArena,
}

impl Fixture {
    pub fn new(frames: usize, swap_slots: usize) -> Self {
        Self::with_config(frames, swap_slots, FrameManagerConfig::new())
    }

    /// Swap esgotado retorna erro em vez de panic.
    pub fn failing(frames: usize, swap_slots: usize) -> Self {
        Self::with_config(
            frames,
            swap_slots,
            FrameManagerConfig::new().with_swap_exhaustion(SwapExhaustionPolicy::Fail),
        )
    }

    pub fn with_config(frames: usize, swap_slots: usize, config: FrameManagerConfig) -> Self {
        let arena = PhysArena::new(frames);
        let pfm = FrameManager::new(
            arena.layout(),
            UserPool::new(arena.layout(), arena.window()),
            SoftMmu::new(),
            RecordingSwap::new(swap_slots, arena.window()),
            FlakySpt::default(),
            config,
        );
        Self { pfm, arena }
    }

    pub fn mmu(&self) -> &SoftMmu {
        self.pfm.hw()
    }

    pub fn spt(&self) -> &SptRegistry {
        self.pfm.spt().registry()
    }

    /// Controle de falhas da tabela suplementar
    pub fn flaky(&self) -> &FlakySpt {
        self.pfm.spt()
    }

    pub fn pool(&self) -> &UserPool {
        self.pfm.raw()
    }

    /// Registra uma página gravável de dados, ainda não residente.
    pub fn declare(&self, aspace: AspaceId, vpage: VirtAddr) {
        self.spt().create_aspace(aspace);
        self.spt()
            .insert(aspace, PageEntry::new(vpage, PageFlags::WRITABLE))
            .unwrap();
    }

    /// Declara e faz o page fault da página.
    pub fn map(&self, aspace: AspaceId, vpage: VirtAddr) -> PhysAddr {
        self.declare(aspace, vpage);
        self.pfm.acquire_for_fault(aspace, vpage, true).unwrap()
    }

    pub fn entry(&self, aspace: AspaceId, vpage: VirtAddr) -> PageEntry {
        self.spt().lookup(aspace, vpage).unwrap()
    }

    /// Verifica as invariantes globais entre tabela, entradas, MMU e pool.
    pub fn assert_consistent(&self) {
        let mut owners = BTreeSet::new();
        let mut frames = 0;

        self.pfm.for_each_owned(|frame, owner| {
            assert!(owners.insert(owner), "página com dois frames: {:?}", owner);
            frames += 1;

            let entry = self.entry(owner.aspace, owner.vpage);
            assert_eq!(entry.frame, Some(frame));
            assert_eq!(entry.residency, Residency::InFrame);

            let (mapped, flags) = self.mmu().translate(owner.aspace, owner.vpage).unwrap();
            assert_eq!(mapped, frame);
            assert!(flags.contains(PteFlags::PRESENT));

            assert!(self.pool().is_allocated(frame));
        });

        assert_eq!(frames, self.pfm.resident_frames());
        assert_eq!(self.mmu().mapping_count(), frames);
    }
}

pub fn page(n: u64) -> VirtAddr {
    VirtAddr::new(0x0800_0000 + n * PAGE_SIZE as u64)
}
