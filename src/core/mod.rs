//! Core Module
//!
//! Infra do kernel independente de arquitetura que os subsistemas usam:
//! logging, seções críticas por CPU e o relógio lógico.

pub mod logging;
pub mod smp;
pub mod time;
