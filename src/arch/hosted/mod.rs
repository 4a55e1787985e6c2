//! Plataforma hosted.
//!
//! Roda o núcleo dentro de um processo comum: cada thread do SO faz o papel
//! de um contexto de hardware. A thread escolhe o seu core com
//! [`HostedCpu::bind`]; o flag de interrupções e a profundidade de push_off
//! são locais à thread, então não há migração no meio de uma seção crítica.

mod cpu;
mod wait;

pub use cpu::HostedCpu;
pub use wait::HostedWaitQueue;

/// CPU da plataforma
pub type Cpu = HostedCpu;

/// Fila de espera da plataforma
pub type WaitQueue = HostedWaitQueue;
