//! Kernel Library (klib)
//!
//! Utilitários sem estado usados pelo resto do núcleo.

pub mod align;

pub use align::{align_up, is_aligned};
