//! Contrato de fila de espera (sleep/wakeup).
//!
//! O SleepLock não gira: quem não consegue o lock dorme aqui até o dono
//! liberar. Quem implementa é o scheduler da plataforma.

/// Fila de espera de um canal de sleep.
pub trait WaitQueueOps: Send + Sync {
    /// Cria fila vazia
    fn new() -> Self;

    /// Dorme enquanto `blocked()` retornar true.
    ///
    /// A checagem e o adormecer devem ser atômicos em relação a `wake_all`,
    /// senão um wakeup entre os dois se perde.
    fn sleep_while(&self, blocked: &mut dyn FnMut() -> bool);

    /// Acorda todos os que dormem nesta fila.
    fn wake_all(&self);
}
