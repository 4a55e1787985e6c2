// =============================================================================
// KERNEL LOGGING SYSTEM - ZERO OVERHEAD
// =============================================================================
//
// Logging do núcleo com custo ZERO quando desligado.
//
// ARQUITETURA:
// - Features do Cargo filtram níveis em tempo de compilação
// - Com "no_logs", TODOS os macros viram expressões vazias
// - SEM core::fmt no caminho quente - apenas strings literais + hex
// - Escreve APENAS no sink serial (drivers::serial)
//
// NÍVEIS (do mais crítico ao menos):
// - ERROR: violação de contrato, logo antes do panic
// - WARN:  situação suspeita mas recuperável (ex: sem páginas livres)
// - INFO:  inicialização de subsistemas
// - DEBUG: eventos raros de concorrência (ex: corrida perdida no fallback)
// - TRACE: cada roubo de página / despejo entre buckets
//
// FEATURES:
// - no_logs:   remove tudo
// - log_error: ERROR e WARN
// - log_info:  + INFO (padrão)
// - log_debug: + DEBUG
// - log_trace: todos os níveis
//
// USO:
//   kinfo!("(PMM) Inicializando...");          // Apenas string
//   kinfo!("(PMM) Páginas livres=", n);        // String + hex
//
// =============================================================================

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";

/// Emite uma linha completa (prefixo + mensagem + valor opcional).
///
/// Os macros chamam isto em vez de emitir pedaço por pedaço, assim linhas de
/// cores diferentes não se intercalam.
#[doc(hidden)]
pub fn emit_line(prefix: &str, msg: &str, val: Option<u64>) {
    crate::drivers::serial::with_line(|out| {
        out.str(prefix);
        out.str(msg);
        if let Some(v) = val {
            out.hex(v);
        }
    });
}

// =============================================================================
// MACROS DE LOG - NÍVEL ERROR
// =============================================================================
//
// kerror! - Sempre ativo (exceto com no_logs).
//

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    // Apenas string literal
    ($msg:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_ERROR, $msg, None);
    }};
    // String + valor hex
    ($msg:expr, $val:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_ERROR, $msg, Some($val as u64));
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL WARN
// =============================================================================
//
// kwarn! - Ativo exceto com no_logs.
//

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    // Apenas string literal
    ($msg:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_WARN, $msg, None);
    }};
    // String + valor hex
    ($msg:expr, $val:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_WARN, $msg, Some($val as u64));
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
//
// kinfo! - Ativo com log_info, log_debug ou log_trace.
//

#[cfg(any(feature = "log_info", feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kinfo {
    // Apenas string literal
    ($msg:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_INFO, $msg, None);
    }};
    // String + valor hex
    ($msg:expr, $val:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_INFO, $msg, Some($val as u64));
    }};
}

#[cfg(not(any(feature = "log_info", feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL DEBUG
// =============================================================================
//
// kdebug! - Ativo com log_debug ou log_trace.
//

#[cfg(any(feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kdebug {
    // Apenas string literal
    ($msg:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_DEBUG, $msg, None);
    }};
    // String + valor hex
    ($msg:expr, $val:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_DEBUG, $msg, Some($val as u64));
    }};
}

#[cfg(not(any(feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL TRACE
// =============================================================================
//
// ktrace! - Ativo apenas com log_trace.
//

#[cfg(feature = "log_trace")]
#[macro_export]
macro_rules! ktrace {
    // Apenas string literal
    ($msg:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_TRACE, $msg, None);
    }};
    // String + valor hex
    ($msg:expr, $val:expr) => {{
        $crate::core::logging::emit_line($crate::core::logging::P_TRACE, $msg, Some($val as u64));
    }};
}

#[cfg(not(feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE STATUS (OK)
// =============================================================================

/// kok! - Log de sucesso (prefixo verde [OK]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {{
        $crate::core::logging::emit_line("\x1b[32m[OK]\x1b[0m ", $msg, None);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}
