//! Typed node records and the packed `(Astyp, index)` handle.

use lunac_intern::Ident;
use lunac_ir::Label;
use lunac_syn::{Bop, Uop};

/// Closed node-type enumeration. 26 bits are reserved for the arena index
/// (`ATYBIT`), leaving 6 for the discriminant, matching the original's
/// `(Astyp << 26) | index` packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Astyp {
    Aid,
    Avar,
    Ailit,
    Aflit,
    Aslit,
    Atru,
    Afal,
    Auexp,
    Abexp,
    Aaexp,
    Ablk,
    Aif,
    Awhile,
    Afndef,
    Aparam,
    Atgtid,
    Aasgnst,
    Astmt,
    Astmtlst,
    Aparamlst,
    Aeof,
}

pub const ATYBIT: u32 = 26;
pub const ATYMSK: u32 = (1 << ATYBIT) - 1;

/// Packed `(Astyp << 26) | index` node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node(u32);

impl Node {
    #[must_use]
    pub fn new(typ: Astyp, index: u32) -> Self {
        debug_assert!(index <= ATYMSK, "arena index overflows 26-bit field");
        Node(((typ as u32) << ATYBIT) | (index & ATYMSK))
    }

    #[must_use]
    pub fn typ(self) -> Astyp {
        // SAFETY-free: constructed only via `new`, which always encodes a
        // valid discriminant produced from the `Astyp` enum itself.
        match self.0 >> ATYBIT {
            0 => Astyp::Aid,
            1 => Astyp::Avar,
            2 => Astyp::Ailit,
            3 => Astyp::Aflit,
            4 => Astyp::Aslit,
            5 => Astyp::Atru,
            6 => Astyp::Afal,
            7 => Astyp::Auexp,
            8 => Astyp::Abexp,
            9 => Astyp::Aaexp,
            10 => Astyp::Ablk,
            11 => Astyp::Aif,
            12 => Astyp::Awhile,
            13 => Astyp::Afndef,
            14 => Astyp::Aparam,
            15 => Astyp::Atgtid,
            16 => Astyp::Aasgnst,
            17 => Astyp::Astmt,
            18 => Astyp::Astmtlst,
            19 => Astyp::Aparamlst,
            _ => Astyp::Aeof,
        }
    }

    #[must_use]
    pub fn index(self) -> u32 {
        self.0 & ATYMSK
    }

    #[must_use]
    pub fn to_bits(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Aid {
    pub id: Ident,
    pub lvl: u8,
}

/// A resolved variable binding: `id` is the per-function dense `vid`.
#[derive(Debug, Clone, Copy)]
pub struct Avar {
    pub id: u32,
    pub tlo: u32,
    pub ofs: u32,
    pub lvl: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct Ailit {
    pub val: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Aflit {
    pub val: f64,
}

/// `(pool_offset, length)` packed the same way the lexer packs string
/// literal `bits[i]` values.
#[derive(Debug, Clone, Copy)]
pub struct Aslit {
    pub val: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Auexp {
    pub e: Node,
    pub op: Uop,
}

#[derive(Debug, Clone, Copy)]
pub struct Abexp {
    pub l: Node,
    pub r: Node,
    pub op: Bop,
}

#[derive(Debug, Clone, Copy)]
pub struct Aaexp {
    pub id: Node,
    pub e: Node,
}

#[derive(Debug, Clone)]
pub struct Ablk {
    pub s: Node,
    pub lvl: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct Aif {
    pub e: Node,
    pub tb: Node,
    pub fb: Option<Node>,
    pub bcc: Label,
    pub tail: Label,
    pub lvl: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct Awhile {
    pub e: Node,
    pub tb: Node,
    pub fb: Option<Node>,
    pub head: Label,
    pub bcc: Label,
    pub tail: Label,
    pub lvl: u8,
}

#[derive(Debug, Clone)]
pub struct Afndef {
    pub id: Ident,
    /// Points at an `Aparamlst` node owning the bound `Aparam`s.
    pub plst: Node,
    pub blk: Node,
    pub ret: Option<Node>,
    pub parfn: u32,
    pub parvid: u32,
    pub vid0: u32,
    pub vidf0: u32,
    pub pc0: u32,
    pub pc1: u32,
    pub argc: u16,
    pub vidcnt: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct Aparam {
    pub id: Ident,
    pub t: u32,
    pub def: Option<Node>,
}

#[derive(Debug, Clone, Copy)]
pub struct Atgtid {
    pub id: Ident,
}

#[derive(Debug, Clone, Copy)]
pub struct Aasgnst {
    pub tgt: Node,
    pub e: Node,
}

#[derive(Debug, Clone, Copy)]
pub struct Astmt {
    pub s: Node,
}

#[derive(Debug, Clone)]
pub struct Astmtlst {
    pub stmts: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct Aparamlst {
    pub params: Vec<Node>,
}
