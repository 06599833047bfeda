//! # Frame Manager
//!
//! Aquisição de frames de usuário, com eviction por CLOCK.
//!
//! Pós-condição comum a toda aquisição bem sucedida: o frame saiu do pool
//! bruto (ou de uma vítima), a tabela registra o dono, a entrada suplementar
//! aponta para o frame com residência `InFrame` e o mapeamento de hardware
//! está instalado. Todo caminho de erro que consumiu um frame o devolve.

use super::{FrameTable, PageOwner, PfmStats};
use crate::mm::addr::{PhysAddr, VirtAddr};
use crate::mm::config::FrameManagerConfig;
use crate::mm::error::{FrameError, FrameResult};
use crate::mm::pmm::{RawFrameSource, UserPoolLayout};
use crate::mm::reclaim::{self, ClockHand};
use crate::mm::spt::{Residency, SupplementalTable};
use crate::mm::swap::SwapStore;
use crate::mm::vmm::{AspaceId, PageTableHw};
use spin::Mutex;

/// Estado protegido pelo lock da tabela
struct PfmState {
    table: FrameTable,
    clock: ClockHand,
    stats: PfmStats,
}

pub struct FrameManager<R, H, S, T>
where
    R: RawFrameSource,
    H: PageTableHw,
    S: SwapStore,
    T: SupplementalTable,
{
    raw: R,
    hw: H,
    swap: S,
    spt: T,
    config: FrameManagerConfig,
    state: Mutex<PfmState>,
}

impl<R, H, S, T> FrameManager<R, H, S, T>
where
    R: RawFrameSource,
    H: PageTableHw,
    S: SwapStore,
    T: SupplementalTable,
{
    /// Cria o gerenciador sobre `layout`, que deve ser o mesmo do pool bruto.
    pub fn new(
        layout: UserPoolLayout,
        raw: R,
        hw: H,
        swap: S,
        spt: T,
        config: FrameManagerConfig,
    ) -> Self {
        // Piso de voltas do CLOCK
        let config = config.with_scan_revolutions(config.scan_revolutions);
        crate::kinfo!("(PFM) Inicializando, frames=", layout.frames);
        crate::kdebug!("(PFM) Voltas do CLOCK=", config.scan_revolutions);

        Self {
            raw,
            hw,
            swap,
            spt,
            config,
            state: Mutex::new(PfmState {
                table: FrameTable::new(layout),
                clock: ClockHand::new(),
                stats: PfmStats::default(),
            }),
        }
    }

    pub fn raw(&self) -> &R {
        &self.raw
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn swap(&self) -> &S {
        &self.swap
    }

    pub fn spt(&self) -> &T {
        &self.spt
    }

    pub fn config(&self) -> FrameManagerConfig {
        self.config
    }

    // =========================================================================
    // AQUISIÇÃO
    // =========================================================================

    /// Frame para uma página que já tem entrada suplementar (page fault).
    ///
    /// O conteúdo do frame não é inicializado: o caller preenche a partir do
    /// swap, do arquivo ou com zeros conforme a entrada.
    pub fn acquire_for_fault(
        &self,
        aspace: AspaceId,
        vpage: VirtAddr,
        writable: bool,
    ) -> FrameResult<PhysAddr> {
        let vpage = vpage.page_base();
        let mut state = self.state.lock();

        let entry = match self.spt.lookup(aspace, vpage) {
            Some(entry) => entry,
            None => {
                crate::kwarn!("(PFM) Fault sem entrada, vpage=", vpage.as_u64());
                state.stats.failed += 1;
                return Err(FrameError::EntryNotFound);
            }
        };
        if entry.is_resident() {
            crate::kerror!("(PFM) Fault em pagina residente, vpage=", vpage.as_u64());
            state.stats.failed += 1;
            return Err(FrameError::Inconsistent);
        }

        let result = self.obtain_frame(&mut state, false).and_then(|(frame, index)| {
            let owner = PageOwner::new(aspace, vpage);
            state.table.assign(index, owner);

            if !self.spt.update(aspace, vpage, |e| e.mark_resident(frame)) {
                state.table.clear(index);
                self.raw.free(frame);
                return Err(FrameError::EntryVanished);
            }

            if !self.hw.install_mapping(aspace, vpage, frame, writable) {
                crate::kerror!("(PFM) Falha ao mapear, vpage=", vpage.as_u64());
                state.table.clear(index);
                self.spt.update(aspace, vpage, |e| {
                    e.frame = entry.frame;
                    e.residency = entry.residency;
                });
                self.raw.free(frame);
                return Err(FrameError::MappingFailed);
            }

            Ok(frame)
        });

        self.account(&mut state, result, false)
    }

    /// Frame zerado para uma nova página de stack em `fault_addr`.
    ///
    /// Cria a entrada suplementar de `round_down(fault_addr)` e instala um
    /// mapeamento gravável. Frames tomados por eviction também são zerados.
    pub fn acquire_for_stack_growth(
        &self,
        aspace: AspaceId,
        fault_addr: VirtAddr,
    ) -> FrameResult<PhysAddr> {
        let vpage = fault_addr.page_base();
        let mut state = self.state.lock();

        let result = self.obtain_frame(&mut state, true).and_then(|(frame, index)| {
            if self.spt.create_stack_entry(aspace, vpage).is_err() {
                crate::kwarn!("(PFM) Entrada de stack recusada, vpage=", vpage.as_u64());
                self.raw.free(frame);
                return Err(FrameError::EntryCreateFailed);
            }

            let entry = match self.spt.lookup(aspace, vpage) {
                Some(entry) => entry,
                None => {
                    crate::kerror!("(PFM) Entrada de stack sumiu, vpage=", vpage.as_u64());
                    self.raw.free(frame);
                    return Err(FrameError::EntryVanished);
                }
            };

            state.table.assign(index, PageOwner::new(aspace, vpage));
            if !self.spt.update(aspace, vpage, |e| e.mark_resident(frame)) {
                crate::kerror!("(PFM) Entrada de stack sumiu, vpage=", vpage.as_u64());
                state.table.clear(index);
                self.raw.free(frame);
                return Err(FrameError::EntryVanished);
            }

            if !self.hw.install_mapping(aspace, vpage, frame, entry.is_writable()) {
                crate::kerror!("(PFM) Falha ao mapear stack, vpage=", vpage.as_u64());
                state.table.clear(index);
                self.spt.update(aspace, vpage, |e| e.mark_evicted());
                self.raw.free(frame);
                return Err(FrameError::MappingFailed);
            }

            Ok(frame)
        });

        self.account(&mut state, result, true)
    }

    /// Tenta o pool bruto; se vazio, toma um frame por eviction.
    ///
    /// Retorna o frame e seu índice. O slot está sempre sem dono.
    fn obtain_frame(&self, state: &mut PfmState, zero: bool) -> FrameResult<(PhysAddr, usize)> {
        if let Some(frame) = self.raw.allocate(zero) {
            let index = match state.table.try_index_of(frame) {
                Ok(index) => index,
                Err(e) => {
                    crate::kerror!("(PFM) Frame fora da tabela=", frame.as_u64());
                    self.raw.free(frame);
                    return Err(e);
                }
            };
            if state.table.entry(index).is_owned() {
                crate::kerror!("(PFM) Pool entregou frame com dono=", frame.as_u64());
                return Err(FrameError::Inconsistent);
            }
            return Ok((frame, index));
        }

        crate::kdebug!("(PFM) Pool vazio, iniciando eviction");
        let frame = match self.evict_locked(state) {
            Ok(frame) => frame,
            Err(FrameError::NoVictim) => return Err(FrameError::OutOfMemory),
            Err(e) => return Err(e),
        };
        if zero {
            self.raw.zero(frame);
        }
        let index = state.table.try_index_of(frame)?;
        Ok((frame, index))
    }

    fn account(
        &self,
        state: &mut PfmState,
        result: FrameResult<PhysAddr>,
        stack: bool,
    ) -> FrameResult<PhysAddr> {
        match result {
            Ok(frame) => {
                state.stats.allocations += 1;
                if stack {
                    state.stats.stack_growths += 1;
                }
                crate::ktrace!("(PFM) Frame entregue=", frame.as_u64());
            }
            Err(e) => {
                state.stats.failed += 1;
                if e == FrameError::OutOfMemory {
                    crate::kwarn!("(PFM) OOM: sem frames e sem vitima");
                }
            }
        }
        result
    }

    // =========================================================================
    // EVICTION
    // =========================================================================

    /// Toma um frame de alguma página por CLOCK.
    ///
    /// O frame volta sem dono e fora do pool bruto: o caller passa a ser
    /// responsável por ele (atribuir ou devolver com `RawFrameSource::free`).
    pub fn evict(&self) -> FrameResult<PhysAddr> {
        let mut state = self.state.lock();
        self.evict_locked(&mut state)
    }

    fn evict_locked(&self, state: &mut PfmState) -> FrameResult<PhysAddr> {
        let PfmState { table, clock, stats } = state;

        let chances_before = clock.second_chances();
        let victim = clock.select_victim(table, &self.hw, self.config.scan_revolutions);
        stats.second_chances += clock.second_chances() - chances_before;
        let index = victim.ok_or(FrameError::NoVictim)?;

        let eviction = reclaim::evict_frame(
            table,
            index,
            &self.hw,
            &self.swap,
            &self.spt,
            self.config.swap_exhaustion,
        )?;

        clock.advance_past(index, table.len());
        stats.evictions += 1;
        if eviction.swapped_to.is_some() {
            stats.swap_outs += 1;
        }
        Ok(eviction.frame)
    }

    // =========================================================================
    // RELEASE / PIN
    // =========================================================================

    /// Índice do frame residente de `(aspace, vpage)`, validado contra a tabela.
    fn resident_index(
        &self,
        table: &FrameTable,
        aspace: AspaceId,
        vpage: VirtAddr,
    ) -> FrameResult<usize> {
        let entry = self
            .spt
            .lookup(aspace, vpage)
            .ok_or(FrameError::EntryNotFound)?;
        let frame = match (entry.residency, entry.frame) {
            (Residency::InFrame, Some(frame)) => frame,
            _ => return Err(FrameError::NotResident),
        };
        let index = table.try_index_of(frame)?;
        if table.owner(index) != Some(PageOwner::new(aspace, vpage)) {
            crate::kerror!("(PFM) Entrada e tabela divergem, frame=", frame.as_u64());
            return Err(FrameError::Inconsistent);
        }
        Ok(index)
    }

    /// Desfaz uma página residente: remove o mapeamento, solta o frame e o
    /// devolve ao pool bruto. A entrada fica com residência `Neither`.
    pub fn release(&self, aspace: AspaceId, vpage: VirtAddr) -> FrameResult<()> {
        let vpage = vpage.page_base();
        let mut state = self.state.lock();
        let index = self.resident_index(&state.table, aspace, vpage)?;
        let frame = state.table.frame_at(index);

        self.hw.clear_mapping(aspace, vpage);
        state.table.clear(index);
        self.spt.update(aspace, vpage, |e| e.mark_evicted());
        self.raw.free(frame);
        state.stats.releases += 1;

        crate::ktrace!("(PFM) Frame liberado=", frame.as_u64());
        Ok(())
    }

    /// Libera todos os frames de um address space (fim do processo).
    ///
    /// Retorna quantos frames voltaram ao pool.
    pub fn release_aspace(&self, aspace: AspaceId) -> usize {
        let mut state = self.state.lock();
        let mut released = 0;

        for index in 0..state.table.len() {
            let owner = match state.table.owner(index) {
                Some(owner) if owner.aspace == aspace => owner,
                _ => continue,
            };
            let frame = state.table.frame_at(index);

            self.hw.clear_mapping(owner.aspace, owner.vpage);
            state.table.clear(index);
            self.spt.update(owner.aspace, owner.vpage, |e| e.mark_evicted());
            self.raw.free(frame);
            released += 1;
        }

        state.stats.releases += released as u64;
        crate::kdebug!("(PFM) Address space liberado, frames=", released);
        released
    }

    /// Fixa o frame de uma página residente: o CLOCK passa a ignorá-lo.
    pub fn pin(&self, aspace: AspaceId, vpage: VirtAddr) -> FrameResult<PhysAddr> {
        self.set_pinned(aspace, vpage, true)
    }

    pub fn unpin(&self, aspace: AspaceId, vpage: VirtAddr) -> FrameResult<PhysAddr> {
        self.set_pinned(aspace, vpage, false)
    }

    fn set_pinned(&self, aspace: AspaceId, vpage: VirtAddr, pinned: bool) -> FrameResult<PhysAddr> {
        let vpage = vpage.page_base();
        let mut state = self.state.lock();
        let index = self.resident_index(&state.table, aspace, vpage)?;
        state.table.set_pinned(index, pinned);
        Ok(state.table.frame_at(index))
    }

    // =========================================================================
    // CONSULTAS
    // =========================================================================

    pub fn stats(&self) -> PfmStats {
        self.state.lock().stats
    }

    /// Dono atual de `frame`
    pub fn owner_of(&self, frame: PhysAddr) -> Option<PageOwner> {
        let state = self.state.lock();
        let index = state.table.try_index_of(frame).ok()?;
        state.table.owner(index)
    }

    pub fn is_pinned(&self, frame: PhysAddr) -> bool {
        let state = self.state.lock();
        match state.table.try_index_of(frame) {
            Ok(index) => state.table.entry(index).pinned,
            Err(_) => false,
        }
    }

    /// Frames atualmente ocupados por páginas
    pub fn resident_frames(&self) -> usize {
        self.state.lock().table.resident_count()
    }

    pub fn frame_count(&self) -> usize {
        self.state.lock().table.len()
    }

    /// Posição do ponteiro do CLOCK
    pub fn clock_position(&self) -> usize {
        self.state.lock().clock.position()
    }

    /// Visita cada frame com dono, sob o lock da tabela.
    pub fn for_each_owned<F: FnMut(PhysAddr, PageOwner)>(&self, mut f: F) {
        let state = self.state.lock();
        for (frame, entry) in state.table.iter() {
            if let Some(owner) = entry.owner {
                f(frame, owner);
            }
        }
    }
}
