//! Emits IR (C7) from the typed, bound, folded arena built by
//! [`crate::builder`], following the `while`-loop template worked through
//! in full (label/branch sequencing for head/bcc/tail) plus the natural
//! generalization to `if`/`else` and arithmetic/boolean expressions.
//!
//! Variables live in flat memory, addressed by their dense `vid` via
//! `Mod::Gofs` — there is exactly one implicit top-level frame in this
//! front end, since the grammar never reaches a call site that would
//! make `Afndef` bodies (and a real local/global distinction) reachable.

use crate::arena::Arena;
use crate::node::{Astyp, Node};
use lunac_diag::{CompileError, Pos};
use lunac_ir::{Cc, Emitter, Insn, Label, Mod, Op, Operand, Reg, Typ};
use lunac_syn::{Bop, Uop};

pub struct EmitOutput {
    pub code: Vec<u32>,
    /// Peak live-register count ("hit") across the whole program.
    pub hit: u8,
}

struct CodeGen<'a> {
    arena: &'a Arena,
    emitter: Emitter,
    next_reg: u8,
    hit: u8,
}

/// Emits IR for a complete program rooted at `root` (an `Ablk`), reusing
/// the label space `emitter` already minted while building `arena`.
pub fn emit_program(
    arena: &Arena,
    root: Node,
    emitter: Emitter,
) -> Result<EmitOutput, CompileError> {
    let mut cg = CodeGen {
        arena,
        emitter,
        next_reg: 0,
        hit: 0,
    };
    cg.emit_node(root)?;
    let code = cg.emitter.finish();
    Ok(EmitOutput { code, hit: cg.hit })
}

impl<'a> CodeGen<'a> {
    fn alloc_reg(&mut self, pos: Pos) -> Result<Reg, CompileError> {
        if usize::from(self.next_reg) >= lunac_ir::NREGS {
            return Err(CompileError::resource(format!(
                "expression at {pos:?} needs more live registers than the IR machine has"
            )));
        }
        let r = self.next_reg;
        self.next_reg += 1;
        self.hit = self.hit.max(self.next_reg);
        Ok(r)
    }

    fn load_imm(&mut self, rd: Reg, value: i32) {
        self.emitter.mkop(Insn::Load {
            typ: Typ::S4,
            rd,
            mode: Mod::Imm,
            operand: value,
        });
    }

    fn emit_node(&mut self, n: Node) -> Result<(), CompileError> {
        match n.typ() {
            Astyp::Astmtlst => {
                for s in self.arena.astmtlst(n).stmts.clone() {
                    self.emit_node(s)?;
                }
                Ok(())
            }
            Astyp::Astmt => {
                self.next_reg = 0;
                self.emit_node(self.arena.astmt(n).s)
            }
            Astyp::Ablk => self.emit_node(self.arena.ablk(n).s),
            Astyp::Aasgnst => {
                let rec = *self.arena.aasgnst(n);
                let r = self.emit_expr(rec.e)?;
                let var = self.arena.avar(rec.tgt);
                self.emitter.mkop(Insn::Store {
                    typ: Typ::S4,
                    rd: r,
                    mode: Mod::Gofs,
                    operand: var.id as i32,
                });
                Ok(())
            }
            Astyp::Awhile => self.emit_while(n),
            Astyp::Aif => self.emit_if(n),
            Astyp::Afndef => Ok(()), // unreachable without a call site; nothing to lower
            _ => {
                self.emit_expr(n)?;
                Ok(())
            }
        }
    }

    fn emit_while(&mut self, n: Node) -> Result<(), CompileError> {
        let rec = *self.arena.awhile(n);
        let pos = Pos::default();
        self.emitter.setlb(rec.head);
        self.next_reg = 0;
        self.emitter.setlb(rec.bcc);
        self.emit_cond(rec.e, rec.tail, pos)?;
        self.next_reg = 0;
        self.emit_node(rec.tb)?;
        self.emitter.mkjmp(rec.head);
        self.emitter.setlb(rec.tail);
        Ok(())
    }

    fn emit_if(&mut self, n: Node) -> Result<(), CompileError> {
        let rec = *self.arena.aif(n);
        let pos = Pos::default();
        self.emitter.setlb(rec.bcc);
        match rec.fb {
            Some(fb) => {
                let else_lbl = self.emitter.mklb();
                self.emit_cond(rec.e, else_lbl, pos)?;
                self.next_reg = 0;
                self.emit_node(rec.tb)?;
                self.emitter.mkjmp(rec.tail);
                self.emitter.setlb(else_lbl);
                self.next_reg = 0;
                self.emit_node(fb)?;
                self.emitter.setlb(rec.tail);
            }
            None => {
                self.emit_cond(rec.e, rec.tail, pos)?;
                self.next_reg = 0;
                self.emit_node(rec.tb)?;
                self.emitter.setlb(rec.tail);
            }
        }
        Ok(())
    }

    /// Branches to `false_label` when `n` does not hold, falling through
    /// otherwise. Relational/`and`/`or` operators branch directly off
    /// their operands; anything else is materialized to a register first
    /// and tested against zero.
    fn emit_cond(&mut self, n: Node, false_label: Label, pos: Pos) -> Result<(), CompileError> {
        if n.typ() == Astyp::Abexp {
            let rec = *self.arena.abexp(n);
            if let Some((cc, swap)) = false_cc(rec.op) {
                let l = self.emit_expr(rec.l)?;
                let r = self.emit_expr(rec.r)?;
                let (a, b) = if swap { (r, l) } else { (l, r) };
                self.emitter.mkbcc(cc, a, b, false_label);
                return Ok(());
            }
            if rec.op == Bop::Oreland {
                self.emit_cond(rec.l, false_label, pos)?;
                return self.emit_cond(rec.r, false_label, pos);
            }
            if rec.op == Bop::Orelor {
                let check_r = self.emitter.mklb();
                let done = self.emitter.mklb();
                let l = self.emit_expr(rec.l)?;
                self.emitter.mkbcc(Cc::Z, l, 0, check_r);
                self.emitter.mkjmp(done);
                self.emitter.setlb(check_r);
                self.emit_cond(rec.r, false_label, pos)?;
                self.emitter.setlb(done);
                return Ok(());
            }
        }
        let r = self.emit_expr(n)?;
        self.emitter.mkbcc(Cc::Z, r, 0, false_label);
        Ok(())
    }

    fn emit_expr(&mut self, n: Node) -> Result<Reg, CompileError> {
        let pos = Pos::default();
        match n.typ() {
            Astyp::Ailit => {
                let rd = self.alloc_reg(pos)?;
                self.load_imm(rd, self.arena.ailit(n).val as i32);
                Ok(rd)
            }
            Astyp::Atru => {
                let rd = self.alloc_reg(pos)?;
                self.load_imm(rd, 1);
                Ok(rd)
            }
            Astyp::Afal => {
                let rd = self.alloc_reg(pos)?;
                self.load_imm(rd, 0);
                Ok(rd)
            }
            Astyp::Avar => {
                let rd = self.alloc_reg(pos)?;
                let var = self.arena.avar(n);
                self.emitter.mkop(Insn::Load {
                    typ: Typ::S4,
                    rd,
                    mode: Mod::Gofs,
                    operand: var.id as i32,
                });
                Ok(rd)
            }
            Astyp::Auexp => {
                let rec = *self.arena.auexp(n);
                let r = self.emit_expr(rec.e)?;
                self.emitter.mkop(Insn::Arith {
                    op: map_uop(rec.op),
                    rd: r,
                    rs1: r,
                    mode: Mod::Imm,
                    src2: Operand::Imm(0),
                });
                Ok(r)
            }
            Astyp::Abexp => {
                let rec = *self.arena.abexp(n);
                if let Some(op) = map_bop_arith(rec.op) {
                    let l = self.emit_expr(rec.l)?;
                    let r = self.emit_expr(rec.r)?;
                    let rd = self.alloc_reg_or_reuse(l, r);
                    self.emitter.mkop(Insn::Arith {
                        op,
                        rd,
                        rs1: l,
                        mode: Mod::Reg,
                        src2: Operand::Reg(r),
                    });
                    return Ok(rd);
                }
                if rec.op == Bop::Oreland {
                    return self.emit_shortcircuit(rec.l, rec.r, true);
                }
                if rec.op == Bop::Orelor {
                    return self.emit_shortcircuit(rec.l, rec.r, false);
                }
                if let Some((cc, swap)) = true_cc(rec.op) {
                    let l = self.emit_expr(rec.l)?;
                    let r = self.emit_expr(rec.r)?;
                    let (a, b) = if swap { (r, l) } else { (l, r) };
                    return self.materialize_cc(cc, a, b, pos);
                }
                Err(CompileError::semantic(
                    pos,
                    format!("{:?} has no IR representation", rec.op),
                ))
            }
            Astyp::Aflit => Err(CompileError::semantic(
                pos,
                "floating-point values have no IR representation in this machine",
            )),
            Astyp::Aslit => Err(CompileError::semantic(
                pos,
                "string values have no IR representation in this machine",
            )),
            Astyp::Aaexp => Err(CompileError::semantic(
                pos,
                "subscript expressions have no IR representation in this machine",
            )),
            other => Err(CompileError::semantic(
                pos,
                format!("{other:?} cannot appear in expression position"),
            )),
        }
    }

    fn alloc_reg_or_reuse(&mut self, l: Reg, _r: Reg) -> Reg {
        l
    }

    fn materialize_cc(&mut self, cc: Cc, a: Reg, b: Reg, pos: Pos) -> Result<Reg, CompileError> {
        let rd = self.alloc_reg(pos)?;
        let true_lbl = self.emitter.mklb();
        let join_lbl = self.emitter.mklb();
        self.emitter.mkbcc(cc, a, b, true_lbl);
        self.load_imm(rd, 0);
        self.emitter.mkjmp(join_lbl);
        self.emitter.setlb(true_lbl);
        self.load_imm(rd, 1);
        self.emitter.setlb(join_lbl);
        Ok(rd)
    }

    /// Materializes `l && r` (`is_and = true`) or `l || r` into a 0/1
    /// register without evaluating `r` unless `l`'s value leaves the
    /// result undecided.
    fn emit_shortcircuit(&mut self, l: Node, r: Node, is_and: bool) -> Result<Reg, CompileError> {
        let pos = Pos::default();
        let rd = self.alloc_reg(pos)?;
        let check_r = self.emitter.mklb();
        let short_circuit = self.emitter.mklb();
        let join = self.emitter.mklb();

        let lr = self.emit_expr(l)?;
        // `&&`: l == 0 decides the result (false) without checking r.
        // `||`: l != 0 decides the result (true) without checking r;
        // tested the same way since only `Cc::Z` is available.
        self.emitter.mkbcc(Cc::Z, lr, 0, check_r);
        if is_and {
            let rr = self.emit_expr(r)?;
            self.emitter.mkbcc(Cc::Z, rr, 0, short_circuit);
            self.load_imm(rd, 1);
            self.emitter.mkjmp(join);
        } else {
            self.load_imm(rd, 1);
            self.emitter.mkjmp(join);
        }
        self.emitter.setlb(check_r);
        if is_and {
            self.load_imm(rd, 0);
            self.emitter.mkjmp(join);
        } else {
            let rr = self.emit_expr(r)?;
            self.emitter.mkbcc(Cc::Z, rr, 0, short_circuit);
            self.load_imm(rd, 1);
            self.emitter.mkjmp(join);
        }
        self.emitter.setlb(short_circuit);
        self.load_imm(rd, 0);
        self.emitter.setlb(join);
        Ok(rd)
    }
}

fn map_uop(op: Uop) -> Op {
    match op {
        Uop::Upls => Op::Upls,
        Uop::Umin => Op::Umin,
        Uop::Not => Op::Not,
        Uop::Neg => Op::Neg,
    }
}

fn map_bop_arith(op: Bop) -> Option<Op> {
    Some(match op {
        Bop::Oadd => Op::Add,
        Bop::Osub => Op::Sub,
        Bop::Omul => Op::Mul,
        Bop::Odiv => Op::Div,
        Bop::Omod => Op::Mod,
        Bop::Oand => Op::And,
        Bop::Oor => Op::Or,
        Bop::Oxor => Op::Xor,
        Bop::Oshl => Op::Shl,
        Bop::Oshr => Op::Shr,
        _ => return None,
    })
}

/// `(cc, swap)` such that branching when `cc(a, b)` holds (`swap` picks
/// `(r, l)` over `(l, r)` for `a, b`) is true exactly when `l <op> r`.
fn true_cc(op: Bop) -> Option<(Cc, bool)> {
    Some(match op {
        Bop::Olt => (Cc::Lt, false),
        Bop::Ogt => (Cc::Lt, true),
        Bop::Ole => (Cc::Ge, true),
        Bop::Oge => (Cc::Ge, false),
        Bop::Oeq => (Cc::Eq, false),
        Bop::One => (Cc::Ne, false),
        _ => return None,
    })
}

/// The false-branch mirror of [`true_cc`]: branching when `cc(a, b)`
/// holds is true exactly when `l <op> r` does *not* hold.
fn false_cc(op: Bop) -> Option<(Cc, bool)> {
    Some(match op {
        Bop::Olt => (Cc::Ge, false),
        Bop::Ogt => (Cc::Ge, true),
        Bop::Ole => (Cc::Lt, true),
        Bop::Oge => (Cc::Lt, false),
        Bop::Oeq => (Cc::Ne, false),
        Bop::One => (Cc::Eq, false),
        _ => return None,
    })
}
