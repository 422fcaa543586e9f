//! Raw argument-stream AST: the parser's direct output, before the
//! post-processor resolves identifiers into bound variables, rewrites flat
//! expression lists by precedence, or folds constants.
//!
//! A single flat arena (`Vec<RawNode>`) stands in for the original's
//! per-type arenas plus repetition pool; `nhs`/`fpos` become the parallel
//! `Vec<Pos>` kept alongside it, matching §3's node/position pairing
//! without literally reimplementing the `(Astyp << 26) | index` packing,
//! which `lunac-ast` applies instead for the typed arenas downstream.

use crate::ops::{Bop, Uop};
use lunac_diag::Pos;
use lunac_intern::Ident;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// One operand plus its trailing operator in a flat precedence-unresolved
/// expression list. The last entry in a list always carries `Bop::Obcnt`.
#[derive(Debug, Clone, Copy)]
pub struct PExpItem {
    pub operand: NodeId,
    pub op: Bop,
}

#[derive(Debug, Clone)]
pub enum RawNode {
    Id(Ident),
    IntLit(u64),
    FloatLit(f64),
    /// `(pool_offset, length)` packed the same way the lexer packs
    /// `bits[i]` for a string-literal token: `(len << 32) | offset`.
    StrLit(u64),
    True,
    False,
    UnExp { op: Uop, e: NodeId },
    /// Flat, precedence-unresolved operand/operator list (`Apexplst`).
    PExpList(Vec<PExpItem>),
    /// Subscript/attribute expression `id[e]` (`Aaexp`).
    Subscript { id: NodeId, e: NodeId },
    Block(Vec<NodeId>),
    If {
        cond: NodeId,
        tb: NodeId,
        fb: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    FnDef {
        id: Ident,
        params: Vec<NodeId>,
        body: NodeId,
    },
    Param(Ident),
    /// Assignment target identifier (`Atgt_id`), distinct from an rvalue
    /// `Aid` occurrence so the binder can tell def-position from use.
    TargetId(Ident),
    AssignStmt {
        tgt: NodeId,
        e: NodeId,
    },
    ExprStmt(NodeId),
    Eof,
}

#[derive(Debug, Default)]
pub struct RawArena {
    nodes: Vec<RawNode>,
    fpos: Vec<Pos>,
}

impl RawArena {
    #[must_use]
    pub fn new() -> Self {
        RawArena::default()
    }

    pub fn push(&mut self, node: RawNode, pos: Pos) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.fpos.push(pos);
        id
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &RawNode {
        &self.nodes[id.0 as usize]
    }

    #[must_use]
    pub fn pos(&self, id: NodeId) -> Pos {
        self.fpos[id.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parse result: the raw arena plus the root statement list node.
#[derive(Debug)]
pub struct RawProgram {
    pub arena: RawArena,
    pub root: NodeId,
}
