//! Camada de blocos do sistema de arquivos.
//!
//! Submódulos:
//! - `bio`: Buffer cache de blocos (bread / bwrite / brelse / bpin).
//! - `config`: Tamanho de bloco e geometria do cache.
//!
//! O layout em disco (superbloco, inodes, log) fica acima daqui e só fala
//! com blocos através do [`bio::BufCache`].

pub mod bio;
pub mod config;
