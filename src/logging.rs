// =============================================================================
// FRAME MANAGER LOGGING SYSTEM - ZERO OVERHEAD
// =============================================================================
//
// Sistema de logging do Forge com custo ZERO em release.
//
// ARQUITETURA:
// - Usa features do Cargo para compile-time filtering
// - Com feature "no_logs", TODOS os macros viram expressões vazias
// - SEM core::fmt - Apenas strings literais + um valor hexadecimal
// - SEM alocação
// - A saída vai para um `LogSink` registrado pelo kernel (serial no boot,
//   buffer em testes). Sem sink registrado, a saída é descartada.
//
// NÍVEIS DE LOG (do mais crítico ao menos):
// - ERROR: Erros fatais ou críticos
// - WARN:  Situações suspeitas mas recuperáveis
// - INFO:  Fluxo normal de execução
// - DEBUG: Informações de debugging
// - TRACE: Detalhes extremos (cada passo do ponteiro do clock)
//
// COMO USAR:
//   kinfo!("(PFM) Inicializando...");          // Apenas string
//   kinfo!("(PFM) Frame=", 0x1000);            // String + hex
//
// =============================================================================

use spin::RwLock;

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";
pub const P_OK: &str = "\x1b[32m[OK]\x1b[0m ";

// =============================================================================
// SINK
// =============================================================================

/// Destino das linhas de log (porta serial, ring buffer, captura de teste).
pub trait LogSink: Sync {
    fn write_str(&self, s: &str);
}

static SINK: RwLock<Option<&'static dyn LogSink>> = RwLock::new(None);

/// Registra o destino de log. Substitui o anterior.
pub fn set_sink(sink: &'static dyn LogSink) {
    *SINK.write() = Some(sink);
}

/// Remove o destino de log (saída passa a ser descartada).
pub fn clear_sink() {
    *SINK.write() = None;
}

#[doc(hidden)]
pub fn emit_str(s: &str) {
    if let Some(sink) = *SINK.read() {
        sink.write_str(s);
    }
}

#[doc(hidden)]
pub fn emit_nl() {
    emit_str("\n");
}

/// Emite `value` como `0x...` sem passar por core::fmt.
#[doc(hidden)]
pub fn emit_hex(value: u64) {
    let mut buf = [0u8; 18];
    let len = format_hex(value, &mut buf);
    // Apenas dígitos ASCII e "0x"
    if let Ok(s) = core::str::from_utf8(&buf[..len]) {
        emit_str(s);
    }
}

/// Escreve `value` em hexadecimal (sem zeros à esquerda) em `buf`.
/// Retorna o número de bytes escritos.
fn format_hex(value: u64, buf: &mut [u8; 18]) -> usize {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    buf[0] = b'0';
    buf[1] = b'x';

    let nibbles = if value == 0 {
        1
    } else {
        (64 - value.leading_zeros() as usize + 3) / 4
    };

    for i in 0..nibbles {
        let shift = (nibbles - 1 - i) * 4;
        buf[2 + i] = DIGITS[((value >> shift) & 0xF) as usize];
    }
    2 + nibbles
}

// =============================================================================
// MACROS DE LOG - NÍVEL ERROR / WARN
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_ERROR);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_ERROR);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_WARN);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_WARN);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL INFO
// =============================================================================

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kinfo {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_INFO);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_INFO);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL DEBUG
// =============================================================================

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kdebug {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_DEBUG);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_DEBUG);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL TRACE
// =============================================================================

#[cfg(all(not(feature = "no_logs"), feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_TRACE);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_TRACE);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(not(all(not(feature = "no_logs"), feature = "log_trace")))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE STATUS
// =============================================================================

/// kok! - Log de sucesso (prefixo verde [OK]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_OK);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}
