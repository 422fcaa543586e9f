//! Content-addressed interning of identifier bytes into dense, stable ids.
//!
//! `IdentMap` is a double-hashed open-addressing table: the primary probe
//! is `hash & mask`, the first collision probes with `hash >> table_bits`,
//! and any further collision walks linearly. This is the exact probe
//! sequence of Luanova's `mapgetadd`, not a textbook generic scheme.
//!
//! Growth doubles the table whenever the next insertion would push
//! occupancy past 50%, and fully re-probes every existing id's stored hash
//! against the new mask. `Vec` already gives the mini-pool/heap promotion
//! the original hand-rolls with its `expand()`; there is no need to
//! reimplement that allocator tier here.

mod hash;

pub use hash::{fnv1a_32, fnv1a_64};

/// Dense interned identifier. `0` is reserved to mean "no identifier".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ident(u32);

impl Ident {
    pub const NONE: Ident = Ident(0);

    #[must_use]
    pub fn from_u32(raw: u32) -> Self {
        Ident(raw)
    }

    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

const MIN_TABLE_BITS: u32 = 3;

/// Interning map from identifier bytes to a stable [`Ident`].
pub struct IdentMap {
    table: Vec<u32>,
    table_bits: u32,
    hashes: Vec<u64>,
    key_offsets: Vec<u32>,
    key_lens: Vec<u32>,
    key_pool: Vec<u8>,
    next_id: u32,
}

impl Default for IdentMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentMap {
    #[must_use]
    pub fn new() -> Self {
        IdentMap::with_capacity_hint(0)
    }

    /// Sizes the initial table for roughly `estimated_count` identifiers,
    /// mirroring `mkmap`'s estimate-driven sizing.
    #[must_use]
    pub fn with_capacity_hint(estimated_count: u32) -> Self {
        let mut bits = MIN_TABLE_BITS;
        while (1u32 << bits) < estimated_count.saturating_mul(2) {
            bits += 1;
        }
        IdentMap {
            table: vec![0; 1 << bits],
            table_bits: bits,
            hashes: vec![0],
            key_offsets: vec![0],
            key_lens: vec![0],
            key_pool: Vec::new(),
            next_id: 1,
        }
    }

    /// Returns the existing id for `bytes`, or interns it as a new one.
    pub fn get_or_add(&mut self, bytes: &[u8]) -> Ident {
        let hash = fnv1a_64(bytes);
        if let Some(id) = self.find(bytes, hash) {
            return Ident(id);
        }
        if (u64::from(self.next_id) + 1) * 2 > self.table.len() as u64 {
            self.grow();
        }
        Ident(self.insert_new(bytes, hash))
    }

    /// Looks up `bytes` without inserting.
    #[must_use]
    pub fn get(&self, bytes: &[u8]) -> Option<Ident> {
        self.find(bytes, fnv1a_64(bytes)).map(Ident)
    }

    /// Zero-terminated view into the key pool for `id`.
    #[must_use]
    pub fn key(&self, id: Ident) -> &[u8] {
        let idx = id.0 as usize;
        let off = self.key_offsets[idx] as usize;
        let len = self.key_lens[idx] as usize;
        &self.key_pool[off..off + len]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        (self.next_id - 1) as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_id == 1
    }

    fn mask(&self) -> u32 {
        (1u32 << self.table_bits) - 1
    }

    fn check(&self, id: u32, bytes: &[u8]) -> bool {
        let idx = id as usize;
        self.key_lens[idx] as usize == bytes.len()
            && &self.key_pool
                [self.key_offsets[idx] as usize..self.key_offsets[idx] as usize + bytes.len()]
                == bytes
    }

    fn find(&self, bytes: &[u8], hash: u64) -> Option<u32> {
        let msk = self.mask();
        let mut v = (hash as u32) & msk;
        let mut x = self.table[v as usize];
        if x == 0 {
            return None;
        }
        if self.check(x, bytes) {
            return Some(x);
        }

        let hc2 = (hash >> self.table_bits) as u32;
        v = (v + hc2) & msk;
        x = self.table[v as usize];
        if x == 0 {
            return None;
        }
        if self.check(x, bytes) {
            return Some(x);
        }

        loop {
            v = (v + 1) & msk;
            x = self.table[v as usize];
            if x == 0 {
                return None;
            }
            if self.check(x, bytes) {
                return Some(x);
            }
        }
    }

    /// Finds the empty slot `bytes`/`hash` would land in, assuming it is
    /// not already present (caller's responsibility, as in `mapgetadd`).
    fn empty_slot(&self, hash: u64) -> u32 {
        let msk = self.mask();
        let mut v = (hash as u32) & msk;
        if self.table[v as usize] == 0 {
            return v;
        }
        let hc2 = (hash >> self.table_bits) as u32;
        v = (v + hc2) & msk;
        if self.table[v as usize] == 0 {
            return v;
        }
        loop {
            v = (v + 1) & msk;
            if self.table[v as usize] == 0 {
                return v;
            }
        }
    }

    fn insert_new(&mut self, bytes: &[u8], hash: u64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let offset = self.key_pool.len() as u32;
        self.key_pool.extend_from_slice(bytes);
        self.key_pool.push(0);

        self.hashes.push(hash);
        self.key_offsets.push(offset);
        self.key_lens.push(bytes.len() as u32);

        let slot = self.empty_slot(hash);
        self.table[slot as usize] = id;
        id
    }

    fn grow(&mut self) {
        self.table_bits += 1;
        self.table = vec![0; 1 << self.table_bits];
        for id in 1..self.next_id {
            let hash = self.hashes[id as usize];
            let slot = self.empty_slot(hash);
            self.table[slot as usize] = id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_is_id_one() {
        let mut m = IdentMap::new();
        assert_eq!(m.get_or_add(b"x").as_u32(), 1);
    }

    #[test]
    fn same_bytes_yield_same_id() {
        let mut m = IdentMap::new();
        let a = m.get_or_add(b"hello");
        let b = m.get_or_add(b"hello");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_bytes_yield_distinct_ids() {
        let mut m = IdentMap::new();
        let a = m.get_or_add(b"foo");
        let b = m.get_or_add(b"bar");
        assert_ne!(a, b);
    }

    #[test]
    fn key_round_trips() {
        let mut m = IdentMap::new();
        let id = m.get_or_add(b"variable_name");
        assert_eq!(m.key(id), b"variable_name");
    }

    #[test]
    fn survives_growth_past_fifty_percent_load() {
        let mut m = IdentMap::with_capacity_hint(0);
        let mut ids = Vec::new();
        for i in 0..500 {
            let name = format!("ident_{i}");
            ids.push((name.clone(), m.get_or_add(name.as_bytes())));
        }
        for (name, id) in &ids {
            assert_eq!(m.get(name.as_bytes()), Some(*id));
        }
    }

    #[test]
    fn get_without_insert_returns_none_for_unknown() {
        let m = IdentMap::new();
        assert_eq!(m.get(b"nope"), None);
    }
}
