//! Sink serial do kernel.
//!
//! O logging monta a linha inteira num buffer de pilha e a entrega de uma vez
//! ao `Console` registrado (UART no kernel). Sem console registrado, a
//! plataforma hosted escreve em stderr; as demais descartam.

use spin::{Mutex, Once};

/// Tamanho máximo de uma linha de log (o excesso é truncado)
const LINE_MAX: usize = 192;

/// Destino final das linhas de log
pub trait Console: Sync {
    /// Escreve uma linha já terminada (sem o '\n')
    fn write_line(&self, line: &[u8]);
}

static CONSOLE: Once<&'static dyn Console> = Once::new();

/// Serializa escritores: mutex cru (sem push_off) para o logging poder ser
/// usado de dentro dos próprios locks.
static WRITE_LOCK: Mutex<()> = Mutex::new(());

/// Registra o console. Só a primeira chamada tem efeito.
pub fn set_console(console: &'static dyn Console) {
    CONSOLE.call_once(|| console);
}

/// Montador de linha
pub struct LineWriter {
    buf: [u8; LINE_MAX],
    len: usize,
}

impl LineWriter {
    const fn new() -> Self {
        Self {
            buf: [0; LINE_MAX],
            len: 0,
        }
    }

    /// Anexa string
    pub fn str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.byte(b);
        }
    }

    /// Anexa valor em hexadecimal (0x...)
    pub fn hex(&mut self, val: u64) {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        self.str("0x");
        if val == 0 {
            self.byte(b'0');
            return;
        }
        let mut shift = 60;
        while (val >> shift) & 0xf == 0 {
            shift -= 4;
        }
        loop {
            self.byte(DIGITS[((val >> shift) & 0xf) as usize]);
            if shift == 0 {
                break;
            }
            shift -= 4;
        }
    }

    #[inline]
    fn byte(&mut self, b: u8) {
        if self.len < LINE_MAX {
            self.buf[self.len] = b;
            self.len += 1;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Monta uma linha com `f` e a entrega ao console.
pub fn with_line(f: impl FnOnce(&mut LineWriter)) {
    let mut line = LineWriter::new();
    f(&mut line);

    let _guard = WRITE_LOCK.lock();
    match CONSOLE.get() {
        Some(console) => console.write_line(line.as_bytes()),
        None => fallback(line.as_bytes()),
    }
}

#[cfg(any(test, feature = "hosted"))]
fn fallback(line: &[u8]) {
    std::eprintln!("{}", std::string::String::from_utf8_lossy(line));
}

#[cfg(not(any(test, feature = "hosted")))]
fn fallback(_line: &[u8]) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut LineWriter)) -> std::string::String {
        let mut line = LineWriter::new();
        f(&mut line);
        std::string::String::from_utf8(line.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(render(|l| l.hex(0)), "0x0");
        assert_eq!(render(|l| l.hex(0x1000)), "0x1000");
        assert_eq!(render(|l| l.hex(u64::MAX)), "0xffffffffffffffff");
        assert_eq!(render(|l| { l.str("(PMM) livres="); l.hex(0x2a) }), "(PMM) livres=0x2a");
    }

    #[test]
    fn test_line_truncates() {
        let s = render(|l| {
            for _ in 0..LINE_MAX {
                l.str("ab");
            }
        });
        assert_eq!(s.len(), LINE_MAX);
    }

    #[test]
    fn test_registered_console_receives_lines() {
        struct Recorder(Mutex<std::vec::Vec<std::string::String>>);

        impl Console for Recorder {
            fn write_line(&self, line: &[u8]) {
                self.0
                    .lock()
                    .push(std::string::String::from_utf8_lossy(line).into_owned());
            }
        }

        static REC: Recorder = Recorder(Mutex::new(std::vec::Vec::new()));
        set_console(&REC);

        with_line(|l| {
            l.str("marca=");
            l.hex(7);
        });
        assert!(REC.0.lock().iter().any(|line| line == "marca=0x7"));
    }
}
