//! # Dispositivos de Bloco
//!
//! Contrato de driver e registro de dispositivos que o buffer cache consulta
//! para resolver o número de dispositivo de um bloco.
//!
//! | Driver      | Status      | Descrição                    |
//! |-------------|-------------|------------------------------|
//! | Ramdisk     | Funcional   | Disco em memória             |
//! | VirtIO-BLK  | Externo     | Registrado pelo kernel       |

pub mod ramdisk;
pub mod traits;

pub use ramdisk::RamDisk;
pub use traits::{BlockDevice, BlockError, Direction};

use crate::sync::Spinlock;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Registro de dispositivos de bloco. O id de um dispositivo é a ordem de registro.
pub struct DeviceTable {
    devices: Spinlock<Vec<Arc<dyn BlockDevice>>>,
}

impl DeviceTable {
    pub const fn new() -> Self {
        Self {
            devices: Spinlock::new(Vec::new(), "block_devices"),
        }
    }

    /// Registra um novo dispositivo de bloco e retorna o seu id
    pub fn register(&self, device: Arc<dyn BlockDevice>) -> u32 {
        let mut devices = self.devices.lock();
        devices.push(device);
        let id = (devices.len() - 1) as u32;
        crate::kinfo!("(Block) Dispositivo registrado id=", id);
        id
    }

    /// Obtém um dispositivo de bloco pelo id
    pub fn get(&self, id: u32) -> Option<Arc<dyn BlockDevice>> {
        self.devices.lock().get(id as usize).cloned()
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}
