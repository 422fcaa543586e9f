//! Converts `lunac-syn`'s raw argument-stream AST into the typed, bound,
//! partially-evaluated arena (§4.6). An ordinary recursive walk stands in
//! for the source's explicit `(node, pass)` stack: this front end's
//! trimmed grammar has no construct that needs mid-node re-entry deeper
//! than a handful of frames, so the call stack already bounds recursion
//! depth adequately without the bookkeeping an explicit stack buys the
//! original for much larger programs.

use crate::arena::Arena;
use crate::binder::Binder;
use crate::node::*;
use crate::precedence::shunting_yard;
use lunac_diag::{CompileError, Pos};
use lunac_syn::{RawArena, RawNode, RawProgram};

pub struct BuildOutput {
    pub arena: Arena,
    pub root: Node,
    pub vid_count: u32,
    /// `vid -> Ident`, for recovering a binding's source spelling (the
    /// pretty-printer's only use of it so far).
    pub vid_names: Vec<lunac_intern::Ident>,
    /// Owns every label minted for `Aif`/`Awhile` nodes while building, so
    /// the IR-emission pass keeps allocating from the same label space
    /// instead of renumbering.
    pub emitter: lunac_ir::Emitter,
}

struct Builder<'r> {
    raw: &'r RawArena,
    arena: Arena,
    binder: Binder,
    emitter: lunac_ir::Emitter,
}

/// Builds the typed AST for a complete program.
pub fn build(raw: &RawProgram) -> Result<BuildOutput, CompileError> {
    let mut b = Builder {
        raw: &raw.arena,
        arena: Arena::new(),
        binder: Binder::new(),
        emitter: lunac_ir::Emitter::new(),
    };
    let root = b.build_stmt_list_as_block(raw.root, b.raw.pos(raw.root))?;
    Ok(BuildOutput {
        arena: b.arena,
        root,
        vid_count: b.binder.vid_count(),
        vid_names: b.binder.var_names().to_vec(),
        emitter: b.emitter,
    })
}

impl<'r> Builder<'r> {
    fn build_stmt_list_as_block(
        &mut self,
        id: lunac_syn::NodeId,
        pos: Pos,
    ) -> Result<Node, CompileError> {
        let stmts = match self.raw.get(id) {
            RawNode::Block(stmts) => stmts.clone(),
            other => {
                return Err(CompileError::semantic(
                    pos,
                    format!("expected a statement list, found {other:?}"),
                ))
            }
        };
        let built: Result<Vec<Node>, CompileError> =
            stmts.iter().map(|s| self.build_stmt(*s)).collect();
        let built = built?;
        let lst = self.arena.push_astmtlst(Astmtlst { stmts: built }, pos);
        Ok(self.arena.push_ablk(
            Ablk {
                s: lst,
                lvl: u16::from(self.binder.level()),
            },
            pos,
        ))
    }

    fn build_block(&mut self, id: lunac_syn::NodeId) -> Result<Node, CompileError> {
        let pos = self.raw.pos(id);
        self.binder.enter_block(pos)?;
        let node = self.build_stmt_list_as_block(id, pos);
        self.binder.leave_block();
        node
    }

    fn build_stmt(&mut self, id: lunac_syn::NodeId) -> Result<Node, CompileError> {
        let pos = self.raw.pos(id);
        let inner = match self.raw.get(id).clone() {
            RawNode::Block(_) => self.build_block(id)?,
            RawNode::AssignStmt { tgt, e } => {
                let rhs = self.build_expr(e)?;
                let raw_uid = match self.raw.get(tgt) {
                    RawNode::TargetId(id) => *id,
                    other => {
                        return Err(CompileError::semantic(
                            pos,
                            format!("invalid assignment target {other:?}"),
                        ))
                    }
                };
                // Materializes the pre-binding target occurrence before
                // resolving it, mirroring the `Aid`/expr-occurrence split.
                let tgtid_node = self.arena.push_atgtid(Atgtid { id: raw_uid }, pos);
                let uid = self.arena.atgtid(tgtid_node).id;
                let vid = self.binder.define(uid);
                let tgt_node = self.arena.push_avar(
                    Avar {
                        id: vid,
                        tlo: 0,
                        ofs: 0,
                        lvl: self.binder.level(),
                    },
                    pos,
                );
                self.arena
                    .push_aasgnst(Aasgnst { tgt: tgt_node, e: rhs }, pos)
            }
            RawNode::While { cond, body } => {
                let e = self.build_expr(cond)?;
                let tb = self.build_stmt(body)?;
                let head = self.emitter.mklb();
                let bcc = self.emitter.mklb();
                let tail = self.emitter.mklb();
                self.arena.push_awhile(
                    Awhile {
                        e,
                        tb,
                        fb: None,
                        head,
                        bcc,
                        tail,
                        lvl: self.binder.level(),
                    },
                    pos,
                )
            }
            RawNode::If { cond, tb, fb } => {
                let e = self.build_expr(cond)?;
                let tbn = self.build_block(tb)?;
                let fbn = fb.map(|f| self.build_block(f)).transpose()?;
                let bcc = self.emitter.mklb();
                let tail = self.emitter.mklb();
                self.arena.push_aif(
                    Aif {
                        e,
                        tb: tbn,
                        fb: fbn,
                        bcc,
                        tail,
                        lvl: self.binder.level(),
                    },
                    pos,
                )
            }
            RawNode::FnDef { id: fid, params, body } => {
                self.binder.enter_block(pos)?;
                let built_params: Result<Vec<Node>, CompileError> = params
                    .iter()
                    .map(|p| {
                        let ppos = self.raw.pos(*p);
                        let puid = match self.raw.get(*p) {
                            RawNode::Param(u) => *u,
                            other => {
                                return Err(CompileError::semantic(
                                    ppos,
                                    format!("expected a parameter, found {other:?}"),
                                ))
                            }
                        };
                        self.binder.define(puid);
                        Ok(self.arena.push_aparam(
                            Aparam {
                                id: puid,
                                t: 0,
                                def: None,
                            },
                            ppos,
                        ))
                    })
                    .collect();
                let built_params = built_params?;
                let argc = built_params.len() as u16;
                let plst = self
                    .arena
                    .push_aparamlst(Aparamlst { params: built_params }, pos);
                let vid0 = self.binder.vid_count();
                let blk = self.build_stmt_list_as_block(body, pos)?;
                let vidf0 = self.binder.vid_count();
                self.binder.leave_block();
                self.arena.push_afndef(
                    Afndef {
                        id: fid,
                        plst,
                        blk,
                        ret: None,
                        parfn: 0,
                        parvid: 0,
                        vid0,
                        vidf0,
                        pc0: 0,
                        pc1: 0,
                        argc,
                        vidcnt: (vidf0 - vid0) as u16,
                    },
                    pos,
                )
            }
            RawNode::ExprStmt(e) => {
                let en = self.build_expr(e)?;
                return Ok(self.arena.push_astmt(Astmt { s: en }, pos));
            }
            other => {
                return Err(CompileError::semantic(
                    pos,
                    format!("unexpected node in statement position: {other:?}"),
                ))
            }
        };
        Ok(self.arena.push_astmt(Astmt { s: inner }, pos))
    }

    fn build_expr(&mut self, id: lunac_syn::NodeId) -> Result<Node, CompileError> {
        let pos = self.raw.pos(id);
        match self.raw.get(id).clone() {
            RawNode::IntLit(val) => Ok(self.arena.push_ailit(Ailit { val }, pos)),
            RawNode::FloatLit(val) => Ok(self.arena.push_aflit(Aflit { val }, pos)),
            RawNode::StrLit(bits) => Ok(self.arena.push_aslit(Aslit { val: bits }, pos)),
            RawNode::True => Ok(self.arena.push_atru(pos)),
            RawNode::False => Ok(self.arena.push_afal(pos)),
            RawNode::Id(uid) => {
                // Materializes the pre-binding occurrence before
                // resolving it against the current scope.
                let occurrence = self.arena.push_aid(
                    Aid {
                        id: uid,
                        lvl: self.binder.level(),
                    },
                    pos,
                );
                let lookup_id = self.arena.aid(occurrence).id;
                match self.binder.lookup(lookup_id) {
                    Some(vid) => Ok(self.arena.push_avar(
                        Avar {
                            id: vid,
                            tlo: 0,
                            ofs: 0,
                            lvl: self.binder.level(),
                        },
                        pos,
                    )),
                    None => Err(CompileError::semantic(
                        pos,
                        "reference to an undefined variable",
                    )),
                }
            }
            RawNode::UnExp { op, e } => {
                let inner = self.build_expr(e)?;
                Ok(self.arena.push_auexp(Auexp { e: inner, op }, pos))
            }
            RawNode::Subscript { id: base, e } => {
                let base_node = self.build_expr(base)?;
                let idx = self.build_expr(e)?;
                Ok(self.arena.push_aaexp(
                    Aaexp {
                        id: base_node,
                        e: idx,
                    },
                    pos,
                ))
            }
            RawNode::PExpList(items) => {
                let built: Result<Vec<(Node, lunac_syn::Bop)>, CompileError> = items
                    .iter()
                    .map(|item| Ok((self.build_expr(item.operand)?, item.op)))
                    .collect();
                shunting_yard(&mut self.arena, &built?, pos)
            }
            other => Err(CompileError::semantic(
                pos,
                format!("unexpected node in expression position: {other:?}"),
            )),
        }
    }
}
