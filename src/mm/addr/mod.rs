//! Tipos de endereço.
//!
//! A memória física é acessada pelo direct map, então um `PhysAddr` também é
//! um ponteiro válido para o kernel.

pub mod phys;

pub use phys::PhysAddr;
