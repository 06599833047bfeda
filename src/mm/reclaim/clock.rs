//! # CLOCK
//!
//! Segunda chance: o ponteiro percorre a tabela de frames em círculo. Frame
//! com bit de acesso ligado perde o bit e é poupado; o primeiro frame com
//! bit desligado é a vítima.
//!
//! ```text
//!        hand
//!         ▼
//!   [A=1] [A=0] [vazio] [pinned] [A=1]
//!    limpa  vítima  pula    pula    limpa
//! ```

use crate::mm::pfm::FrameTable;
use crate::mm::vmm::PageTableHw;

/// Ponteiro do CLOCK
#[derive(Debug, Default)]
pub struct ClockHand {
    hand: usize,
    /// Bits de acesso limpos (segundas chances concedidas)
    second_chances: u64,
}

impl ClockHand {
    pub const fn new() -> Self {
        Self {
            hand: 0,
            second_chances: 0,
        }
    }

    /// Posição atual do ponteiro
    #[inline]
    pub fn position(&self) -> usize {
        self.hand
    }

    pub fn second_chances(&self) -> u64 {
        self.second_chances
    }

    #[inline]
    fn advance(&mut self, len: usize) {
        self.hand = (self.hand + 1) % len;
    }

    /// Move o ponteiro para depois da vítima já retirada.
    pub fn advance_past(&mut self, victim: usize, len: usize) {
        if len != 0 {
            self.hand = (victim + 1) % len;
        }
    }

    /// Procura uma vítima, no máximo `revolutions` voltas completas.
    ///
    /// Frames vazios e fixados são pulados. Os bits de acesso são lidos e
    /// limpos na page table do DONO de cada frame. Ao achar a vítima o
    /// ponteiro fica parado sobre ela: só avança depois que a retirada der
    /// certo (`advance_past`).
    pub fn select_victim<H: PageTableHw>(
        &mut self,
        table: &FrameTable,
        hw: &H,
        revolutions: usize,
    ) -> Option<usize> {
        let len = table.len();
        if len == 0 {
            return None;
        }
        if self.hand >= len {
            self.hand = 0;
        }

        let limit = revolutions.saturating_mul(len);
        for _ in 0..limit {
            let index = self.hand;
            let entry = table.entry(index);

            // Vazio ou fixado: pula
            match entry.owner {
                Some(owner) if entry.is_evictable() => {
                    if !hw.is_accessed(owner.aspace, owner.vpage) {
                        crate::ktrace!("(CLOCK) Vitima no indice=", index);
                        return Some(index);
                    }
                    hw.set_accessed(owner.aspace, owner.vpage, false);
                    self.second_chances += 1;
                }
                _ => {}
            }

            self.advance(len);
        }

        crate::kwarn!("(CLOCK) Nenhuma vitima apos passos=", limit);
        None
    }
}
