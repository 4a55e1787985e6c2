//! # Kernel Driver Layer
//!
//! | Driver   | Arquivo      | Status |
//! |----------|--------------|--------|
//! | Serial   | `serial.rs`  | Sink de logging do kernel |
//! | Block    | `block/`     | Contrato de disco + RamDisk |
//!
//! Drivers de hardware de verdade (VirtIO, AHCI) vivem no kernel e se
//! registram aqui através de [`block::BlockDevice`] e [`serial::Console`].

pub mod block;
pub mod serial;
