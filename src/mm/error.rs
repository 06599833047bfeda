//! Tipos de Erro do Gerenciador de Frames
//!
//! Define erros estruturados para diagnóstico preciso de falhas de alocação
//! e eviction.

/// Erros do gerenciador de frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Pool bruto vazio e nenhuma vítima disponível (OOM do sistema)
    OutOfMemory,
    /// Varredura CLOCK esgotou o limite sem achar vítima
    NoVictim,
    /// Vítima suja e nenhum slot de swap livre
    SwapExhausted,
    /// Instalação do mapeamento de hardware falhou
    MappingFailed,
    /// Entrada da tabela suplementar não existe para a página
    EntryNotFound,
    /// Criação da entrada de stack falhou (já existe ou sem memória)
    EntryCreateFailed,
    /// Entrada recém-criada não encontrada (violação de consistência)
    EntryVanished,
    /// Endereço fora da região gerenciada ou desalinhado
    OutOfBounds,
    /// Página não está residente em nenhum frame
    NotResident,
    /// Estado interno inconsistente (frame do pool já tem dono)
    Inconsistent,
}

impl FrameError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "OOM: sem frames físicos e sem vítima",
            Self::NoVictim => "CLOCK: nenhuma vítima após varredura limitada",
            Self::SwapExhausted => "Swap esgotado durante eviction",
            Self::MappingFailed => "Mapeamento de hardware falhou",
            Self::EntryNotFound => "Entrada suplementar não encontrada",
            Self::EntryCreateFailed => "Falha ao criar entrada de stack",
            Self::EntryVanished => "Entrada recém-criada desapareceu",
            Self::OutOfBounds => "Endereço fora da tabela de frames",
            Self::NotResident => "Página não residente",
            Self::Inconsistent => "Estado inconsistente na tabela de frames",
        }
    }

    /// Erros que o kernel não consegue absorver (dados de usuário em risco).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SwapExhausted)
    }
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tipo Result específico para operações de frame
pub type FrameResult<T> = Result<T, FrameError>;
