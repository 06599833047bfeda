//! Tabelas suplementares por address space.

use super::{PageEntry, SptError, SupplementalTable};
use crate::mm::addr::VirtAddr;
use crate::mm::vmm::AspaceId;
use alloc::collections::BTreeMap;
use spin::Mutex;

/// Entradas de um address space, indexadas pela página virtual.
#[derive(Debug, Default)]
pub struct SupplementalPageTable {
    entries: BTreeMap<VirtAddr, PageEntry>,
}

impl SupplementalPageTable {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, entry: PageEntry) -> Result<(), SptError> {
        if !entry.vpage.is_page_aligned() {
            return Err(SptError::NotAligned);
        }
        if self.entries.contains_key(&entry.vpage) {
            return Err(SptError::AlreadyExists);
        }
        self.entries.insert(entry.vpage, entry);
        Ok(())
    }

    pub fn get(&self, vpage: VirtAddr) -> Option<&PageEntry> {
        self.entries.get(&vpage)
    }

    pub fn get_mut(&mut self, vpage: VirtAddr) -> Option<&mut PageEntry> {
        self.entries.get_mut(&vpage)
    }

    pub fn remove(&mut self, vpage: VirtAddr) -> Option<PageEntry> {
        self.entries.remove(&vpage)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageEntry> + '_ {
        self.entries.values()
    }
}

/// Conjunto de tabelas suplementares de todos os processos.
pub struct SptRegistry {
    tables: Mutex<BTreeMap<AspaceId, SupplementalPageTable>>,
}

impl SptRegistry {
    pub const fn new() -> Self {
        Self {
            tables: Mutex::new(BTreeMap::new()),
        }
    }

    /// Registra um address space vazio (criação de processo).
    pub fn create_aspace(&self, aspace: AspaceId) {
        self.tables.lock().entry(aspace).or_default();
    }

    /// Remove o address space e devolve suas entradas (teardown).
    ///
    /// O caller deve liberar os frames residentes antes (`release_aspace`).
    pub fn destroy_aspace(&self, aspace: AspaceId) -> Option<SupplementalPageTable> {
        self.tables.lock().remove(&aspace)
    }

    /// Insere uma entrada pronta (carregamento lazy de segmentos, mmap).
    pub fn insert(&self, aspace: AspaceId, entry: PageEntry) -> Result<(), SptError> {
        self.tables
            .lock()
            .get_mut(&aspace)
            .ok_or(SptError::NoAddressSpace)?
            .insert(entry)
    }

    pub fn remove(&self, aspace: AspaceId, vpage: VirtAddr) -> Option<PageEntry> {
        self.tables.lock().get_mut(&aspace)?.remove(vpage)
    }

    /// Número de entradas do address space
    pub fn entry_count(&self, aspace: AspaceId) -> usize {
        self.tables.lock().get(&aspace).map_or(0, |t| t.len())
    }
}

impl Default for SptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SupplementalTable for SptRegistry {
    fn lookup(&self, aspace: AspaceId, vpage: VirtAddr) -> Option<PageEntry> {
        self.tables.lock().get(&aspace)?.get(vpage).copied()
    }

    fn update<F: FnOnce(&mut PageEntry)>(&self, aspace: AspaceId, vpage: VirtAddr, f: F) -> bool {
        let mut tables = self.tables.lock();
        match tables.get_mut(&aspace).and_then(|t| t.get_mut(vpage)) {
            Some(entry) => {
                f(entry);
                true
            }
            None => false,
        }
    }

    fn create_stack_entry(&self, aspace: AspaceId, vpage: VirtAddr) -> Result<(), SptError> {
        crate::ktrace!("(SPT) Nova entrada de stack em=", vpage.as_u64());
        self.insert(aspace, PageEntry::stack(vpage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::addr::PhysAddr;
    use crate::mm::spt::Residency;

    #[test]
    fn test_stack_entry_lifecycle() {
        let spt = SptRegistry::new();
        let aspace = AspaceId(1);
        let vpage = VirtAddr::new(0xbfff_e000);

        assert_eq!(
            spt.create_stack_entry(aspace, vpage),
            Err(SptError::NoAddressSpace)
        );

        spt.create_aspace(aspace);
        assert_eq!(spt.create_stack_entry(aspace, vpage), Ok(()));
        assert_eq!(
            spt.create_stack_entry(aspace, vpage),
            Err(SptError::AlreadyExists)
        );

        let entry = spt.lookup(aspace, vpage).unwrap();
        assert_eq!(entry.residency, Residency::Neither);
        assert!(entry.is_writable());
    }

    #[test]
    fn test_update_and_isolation() {
        let spt = SptRegistry::new();
        let a = AspaceId(1);
        let b = AspaceId(2);
        let vpage = VirtAddr::new(0x8048_000);
        spt.create_aspace(a);
        spt.create_aspace(b);
        spt.create_stack_entry(a, vpage).unwrap();

        assert!(spt.update(a, vpage, |e| e.mark_resident(PhysAddr::new(0x40_0000))));
        assert!(!spt.update(b, vpage, |e| e.mark_evicted()));

        assert_eq!(spt.lookup(a, vpage).unwrap().frame, Some(PhysAddr::new(0x40_0000)));
        assert_eq!(spt.lookup(b, vpage), None);
    }

    #[test]
    fn test_insert_rejects_unaligned() {
        let spt = SptRegistry::new();
        let aspace = AspaceId(7);
        spt.create_aspace(aspace);
        let entry = PageEntry::stack(VirtAddr::new(0x1234));
        assert_eq!(spt.insert(aspace, entry), Err(SptError::NotAligned));
        assert_eq!(spt.entry_count(aspace), 0);
    }
}
