//! # Configuração do Módulo de Memória
//!
//! Define constantes e a configuração de runtime do gerenciador de frames.

// =============================================================================
// CONSTANTES DE TAMANHO
// =============================================================================

/// Tamanho de uma página (4 KiB)
pub const PAGE_SIZE: usize = 4096;

/// Bits de offset dentro de uma página
pub const PAGE_OFFSET_BITS: usize = 12;

// =============================================================================
// LAYOUT FÍSICO
// =============================================================================

/// Fim da memória baixa (1 MiB). Nada abaixo disso vai para os pools.
pub const LOW_MEMORY_END: u64 = 1024 * 1024;

/// Páginas abaixo de `LOW_MEMORY_END`
pub const LOW_MEMORY_PAGES: usize = LOW_MEMORY_END as usize / PAGE_SIZE;

// =============================================================================
// CONFIGURAÇÃO DA EVICTION
// =============================================================================

/// Voltas completas do ponteiro antes de desistir de achar uma vítima.
///
/// Uma volta pode ser gasta inteira limpando bits de acesso; a segunda
/// encontra a vítima se nenhum frame foi re-acessado nesse meio tempo.
pub const DEFAULT_SCAN_REVOLUTIONS: usize = 2;

/// O que fazer quando um frame sujo precisa ir para swap e não há slot livre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapExhaustionPolicy {
    /// Panic do kernel: o conteúdo da vítima não pode ser preservado.
    Panic,
    /// Retorna `FrameError::SwapExhausted` deixando a vítima intacta.
    Fail,
}

/// Configuração de runtime do `FrameManager`.
#[derive(Debug, Clone, Copy)]
pub struct FrameManagerConfig {
    /// Limite da varredura CLOCK, em voltas completas da tabela.
    pub scan_revolutions: usize,
    /// Política para swap esgotado durante eviction.
    pub swap_exhaustion: SwapExhaustionPolicy,
}

impl FrameManagerConfig {
    pub const fn new() -> Self {
        Self {
            scan_revolutions: DEFAULT_SCAN_REVOLUTIONS,
            swap_exhaustion: SwapExhaustionPolicy::Panic,
        }
    }

    pub const fn with_swap_exhaustion(mut self, policy: SwapExhaustionPolicy) -> Self {
        self.swap_exhaustion = policy;
        self
    }

    /// Menos de `DEFAULT_SCAN_REVOLUTIONS` voltas não garante vítima: a
    /// primeira volta pode terminar limpando todos os bits de acesso.
    pub const fn with_scan_revolutions(mut self, revolutions: usize) -> Self {
        self.scan_revolutions = if revolutions < DEFAULT_SCAN_REVOLUTIONS {
            DEFAULT_SCAN_REVOLUTIONS
        } else {
            revolutions
        };
        self
    }
}

impl Default for FrameManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FUNÇÕES UTILITÁRIAS
// =============================================================================

/// Alinha valor para baixo ao múltiplo de align
#[inline(always)]
pub const fn align_down(val: usize, align: usize) -> usize {
    val & !(align - 1)
}

/// Verifica se valor está alinhado
#[inline(always)]
pub const fn is_aligned(val: usize, align: usize) -> bool {
    val & (align - 1) == 0
}
