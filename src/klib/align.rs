//! # Funções de Alinhamento de Memória
//!
//! `align` precisa ser potência de dois em todas as funções.

/// Alinha um valor para cima ao próximo múltiplo de `align`.
///
/// None se o resultado não cabe em `usize`.
#[inline(always)]
pub const fn align_up(val: usize, align: usize) -> Option<usize> {
    match val.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Verifica se um valor está alinhado a `align`.
#[inline(always)]
pub const fn is_aligned(val: usize, align: usize) -> bool {
    val & (align - 1) == 0
}
