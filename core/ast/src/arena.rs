//! Typed per-node-type arenas plus the `nhs`/`fpos` parallel arrays that
//! record every node's packed handle and source position in creation
//! order, mirroring §3's data model.

use crate::node::*;
use lunac_diag::Pos;

#[derive(Debug, Default)]
pub struct Arena {
    aid: Vec<Aid>,
    avar: Vec<Avar>,
    ailit: Vec<Ailit>,
    aflit: Vec<Aflit>,
    aslit: Vec<Aslit>,
    auexp: Vec<Auexp>,
    abexp: Vec<Abexp>,
    aaexp: Vec<Aaexp>,
    ablk: Vec<Ablk>,
    aif: Vec<Aif>,
    awhile: Vec<Awhile>,
    afndef: Vec<Afndef>,
    aparam: Vec<Aparam>,
    atgtid: Vec<Atgtid>,
    aasgnst: Vec<Aasgnst>,
    astmt: Vec<Astmt>,
    astmtlst: Vec<Astmtlst>,
    aparamlst: Vec<Aparamlst>,
    aeof_count: u32,

    nhs: Vec<u32>,
    fpos: Vec<Pos>,
}

macro_rules! typed_push {
    ($name:ident, $field:ident, $variant:ident, $rec:ty) => {
        pub fn $name(&mut self, rec: $rec, pos: Pos) -> Node {
            let idx = self.$field.len() as u32;
            self.$field.push(rec);
            self.record(Node::new(Astyp::$variant, idx), pos)
        }
    };
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Arena::default()
    }

    fn record(&mut self, node: Node, pos: Pos) -> Node {
        self.nhs.push(node.to_bits());
        self.fpos.push(pos);
        node
    }

    typed_push!(push_aid, aid, Aid, Aid);
    typed_push!(push_avar, avar, Avar, Avar);
    typed_push!(push_ailit, ailit, Ailit, Ailit);
    typed_push!(push_aflit, aflit, Aflit, Aflit);
    typed_push!(push_aslit, aslit, Aslit, Aslit);
    typed_push!(push_auexp, auexp, Auexp, Auexp);
    typed_push!(push_abexp, abexp, Abexp, Abexp);
    typed_push!(push_aaexp, aaexp, Aaexp, Aaexp);
    typed_push!(push_ablk, ablk, Ablk, Ablk);
    typed_push!(push_aif, aif, Aif, Aif);
    typed_push!(push_awhile, awhile, Awhile, Awhile);
    typed_push!(push_afndef, afndef, Afndef, Afndef);
    typed_push!(push_aparam, aparam, Aparam, Aparam);
    typed_push!(push_atgtid, atgtid, Atgtid, Atgtid);
    typed_push!(push_aasgnst, aasgnst, Aasgnst, Aasgnst);
    typed_push!(push_astmt, astmt, Astmt, Astmt);
    typed_push!(push_astmtlst, astmtlst, Astmtlst, Astmtlst);
    typed_push!(push_aparamlst, aparamlst, Aparamlst, Aparamlst);

    pub fn push_aeof(&mut self, pos: Pos) -> Node {
        let idx = self.aeof_count;
        self.aeof_count += 1;
        self.record(Node::new(Astyp::Aeof, idx), pos)
    }

    pub fn push_atru(&mut self, pos: Pos) -> Node {
        self.record(Node::new(Astyp::Atru, 0), pos)
    }

    pub fn push_afal(&mut self, pos: Pos) -> Node {
        self.record(Node::new(Astyp::Afal, 0), pos)
    }

    #[must_use]
    pub fn aid(&self, n: Node) -> &Aid {
        &self.aid[n.index() as usize]
    }

    #[must_use]
    pub fn avar(&self, n: Node) -> &Avar {
        &self.avar[n.index() as usize]
    }

    #[must_use]
    pub fn ailit(&self, n: Node) -> &Ailit {
        &self.ailit[n.index() as usize]
    }

    #[must_use]
    pub fn aflit(&self, n: Node) -> &Aflit {
        &self.aflit[n.index() as usize]
    }

    #[must_use]
    pub fn aslit(&self, n: Node) -> &Aslit {
        &self.aslit[n.index() as usize]
    }

    #[must_use]
    pub fn auexp(&self, n: Node) -> &Auexp {
        &self.auexp[n.index() as usize]
    }

    #[must_use]
    pub fn abexp(&self, n: Node) -> &Abexp {
        &self.abexp[n.index() as usize]
    }

    #[must_use]
    pub fn aaexp(&self, n: Node) -> &Aaexp {
        &self.aaexp[n.index() as usize]
    }

    #[must_use]
    pub fn ablk(&self, n: Node) -> &Ablk {
        &self.ablk[n.index() as usize]
    }

    #[must_use]
    pub fn aif(&self, n: Node) -> &Aif {
        &self.aif[n.index() as usize]
    }

    #[must_use]
    pub fn awhile(&self, n: Node) -> &Awhile {
        &self.awhile[n.index() as usize]
    }

    #[must_use]
    pub fn afndef(&self, n: Node) -> &Afndef {
        &self.afndef[n.index() as usize]
    }

    #[must_use]
    pub fn aparam(&self, n: Node) -> &Aparam {
        &self.aparam[n.index() as usize]
    }

    #[must_use]
    pub fn atgtid(&self, n: Node) -> &Atgtid {
        &self.atgtid[n.index() as usize]
    }

    #[must_use]
    pub fn aasgnst(&self, n: Node) -> &Aasgnst {
        &self.aasgnst[n.index() as usize]
    }

    #[must_use]
    pub fn astmt(&self, n: Node) -> &Astmt {
        &self.astmt[n.index() as usize]
    }

    #[must_use]
    pub fn astmtlst(&self, n: Node) -> &Astmtlst {
        &self.astmtlst[n.index() as usize]
    }

    #[must_use]
    pub fn aparamlst(&self, n: Node) -> &Aparamlst {
        &self.aparamlst[n.index() as usize]
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nhs.len()
    }

    #[must_use]
    pub fn nhs(&self) -> &[u32] {
        &self.nhs
    }

    #[must_use]
    pub fn fpos(&self) -> &[Pos] {
        &self.fpos
    }

    /// Overwrites `avar`'s record in place (used when the binder discovers
    /// the variable's frame offset after the fact).
    pub fn set_avar(&mut self, n: Node, rec: Avar) {
        self.avar[n.index() as usize] = rec;
    }
}
