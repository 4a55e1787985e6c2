//! Metadados de um bucket.
//!
//! Cada entrada aponta para um slot do array global de buffers. Tudo aqui
//! roda com o Spinlock do bucket segurado; nada toca o payload.

use alloc::vec::Vec;

use super::buf::BlockId;

/// Estado de um slot enquanto pertence a um bucket.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BufMeta {
    /// Índice no array de buffers
    pub slot: usize,
    /// Bloco em cache (None: slot nunca usado ou recém migrado)
    pub key: Option<BlockId>,
    /// Donos + pins. 0 = pode ser reaproveitado
    pub refcnt: u32,
    /// Tick do último acquire
    pub last_use: u64,
}

impl BufMeta {
    pub fn empty(slot: usize) -> Self {
        Self {
            slot,
            key: None,
            refcnt: 0,
            last_use: 0,
        }
    }
}

/// Candidato a despejo encontrado numa varredura
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Victim {
    pub slot: usize,
    pub last_use: u64,
}

#[derive(Default)]
pub(crate) struct Bucket {
    entries: Vec<BufMeta>,
}

impl Bucket {
    /// Bucket com `slots` e espaço reservado para `capacity` entradas.
    ///
    /// `capacity` precisa cobrir todos os slots do cache: migrações nunca
    /// realocam com o Spinlock segurado.
    pub fn with_slots(slots: impl Iterator<Item = usize>, capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.extend(slots.map(BufMeta::empty));
        Self { entries }
    }

    /// Bloco já em cache: ganha uma referência e um carimbo novo
    pub fn hit(&mut self, id: BlockId, now: u64) -> Option<usize> {
        let meta = self.entries.iter_mut().find(|m| m.key == Some(id))?;
        meta.refcnt += 1;
        meta.last_use = now;
        Some(meta.slot)
    }

    /// Slot livre menos usado recentemente. Empate: o primeiro da varredura.
    pub fn lru(&self) -> Option<Victim> {
        let mut best: Option<Victim> = None;
        for meta in self.entries.iter().filter(|m| m.refcnt == 0) {
            if best.map_or(true, |b| meta.last_use < b.last_use) {
                best = Some(Victim {
                    slot: meta.slot,
                    last_use: meta.last_use,
                });
            }
        }
        best
    }

    /// Reaproveita o slot livre menos usado para `id`
    pub fn claim_lru(&mut self, id: BlockId, now: u64) -> Option<usize> {
        let victim = self.lru()?;
        let meta = self.find_mut(victim.slot)?;
        meta.key = Some(id);
        meta.refcnt = 1;
        meta.last_use = now;
        Some(meta.slot)
    }

    /// Retira `slot` do bucket se ele ainda estiver livre.
    ///
    /// None: alguém pegou o slot entre a varredura e agora.
    pub fn detach(&mut self, slot: usize) -> Option<BufMeta> {
        let pos = self.entries.iter().position(|m| m.slot == slot)?;
        if self.entries[pos].refcnt != 0 {
            return None;
        }
        Some(self.entries.remove(pos))
    }

    /// Recebe um slot migrado de outro bucket, sem identidade
    pub fn adopt(&mut self, meta: BufMeta) {
        self.entries.push(BufMeta { key: None, ..meta });
    }

    /// Recebe um slot migrado já reivindicado para `id`
    pub fn adopt_claimed(&mut self, meta: BufMeta, id: BlockId, now: u64) -> usize {
        self.entries.push(BufMeta {
            slot: meta.slot,
            key: Some(id),
            refcnt: 1,
            last_use: now,
        });
        meta.slot
    }

    pub fn find_mut(&mut self, slot: usize) -> Option<&mut BufMeta> {
        self.entries.iter_mut().find(|m| m.slot == slot)
    }

    pub fn entries(&self) -> &[BufMeta] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Entradas com referência viva
    pub fn busy(&self) -> usize {
        self.entries.iter().filter(|m| m.refcnt > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(blockno: u32) -> BlockId {
        BlockId::new(1, blockno)
    }

    #[test]
    fn test_lru_prefers_oldest_then_first() {
        let mut b = Bucket::with_slots(0..3, 3);
        // Todos com last_use 0: o primeiro ganha
        assert_eq!(b.lru().map(|v| v.slot), Some(0));

        assert_eq!(b.claim_lru(id(7), 10), Some(0));
        assert_eq!(b.claim_lru(id(8), 10), Some(1));
        assert_eq!(b.claim_lru(id(9), 10), Some(2));
        assert_eq!(b.lru(), None);

        // Liberados com o mesmo tick: empate vai para o primeiro
        for slot in [2, 1] {
            b.find_mut(slot).unwrap().refcnt = 0;
        }
        assert_eq!(b.lru().map(|v| v.slot), Some(1));

        // Tick menor vence independente da posição
        b.find_mut(2).unwrap().last_use = 3;
        assert_eq!(b.lru().map(|v| v.slot), Some(2));
    }

    #[test]
    fn test_hit_bumps_refcnt_and_stamp() {
        let mut b = Bucket::with_slots(0..2, 2);
        b.claim_lru(id(5), 1);
        assert_eq!(b.hit(id(5), 9), Some(0));
        let meta = b.find_mut(0).unwrap();
        assert_eq!((meta.refcnt, meta.last_use), (2, 9));
        assert_eq!(b.hit(id(6), 9), None);
    }

    #[test]
    fn test_detach_only_free_slots() {
        let mut b = Bucket::with_slots(4..6, 2);
        b.claim_lru(id(1), 1);
        assert!(b.detach(4).is_none());
        let meta = b.detach(5).unwrap();
        assert_eq!(meta.slot, 5);
        assert_eq!(b.len(), 1);
        assert!(b.detach(5).is_none());

        let mut other = Bucket::default();
        assert_eq!(other.adopt_claimed(meta, id(2), 3), 5);
        assert_eq!(other.busy(), 1);
        assert_eq!(other.hit(id(2), 4), Some(5));
    }

    #[test]
    fn test_adopted_slot_is_parked_empty() {
        let mut home = Bucket::with_slots(0..1, 3);
        let cap = home.capacity();
        let mut remote = Bucket::with_slots(1..3, 3);
        assert_eq!(home.claim_lru(id(4), 2), Some(0));
        remote.claim_lru(id(9), 5);
        assert_eq!(remote.claim_lru(id(10), 5), Some(2));
        remote.find_mut(2).unwrap().refcnt = 0;

        // Outro core trouxe o bloco 4 enquanto o slot 2 era retirado
        let meta = remote.detach(2).unwrap();
        assert_eq!(meta.key, Some(id(10)));
        assert_eq!(home.hit(id(4), 7), Some(0));
        home.adopt(meta);

        let parked = *home.find_mut(2).unwrap();
        assert_eq!((parked.key, parked.refcnt), (None, 0));
        assert_eq!(home.busy(), 1);
        // Sem identidade, nunca responde por um bloco
        assert_eq!(home.hit(id(10), 8), None);
        assert_eq!(home.lru().map(|v| v.slot), Some(2));
        assert!(cap >= 3);
        assert_eq!(home.capacity(), cap);
    }

    #[test]
    fn test_moves_stay_within_reserved_capacity() {
        let mut a = Bucket::with_slots(0..2, 4);
        let mut b = Bucket::with_slots(2..4, 4);
        let (cap_a, cap_b) = (a.capacity(), b.capacity());

        for slot in [2, 3] {
            let meta = b.detach(slot).unwrap();
            a.adopt_claimed(meta, id(slot as u32), 1);
        }
        assert_eq!((a.len(), b.len()), (4, 0));
        assert_eq!((a.capacity(), b.capacity()), (cap_a, cap_b));
    }
}
