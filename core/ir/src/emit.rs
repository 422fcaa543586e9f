//! Label allocation and back-patched code emission: `mklb`/`mkop`/`setlb`.
//!
//! Grounded on the worked `while` template in spec §4.6.5: a label may be
//! referenced by a jump/branch before its target pc is known (a forward
//! reference to `:tail`) or after (a backward jump to `:head`). Forward
//! references are recorded and patched in place once `setlb` resolves the
//! label; backward references encode immediately since the target pc is
//! already known.

use crate::insn::{encode, Cc, Insn, Op, Reg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(u32);

enum Pending {
    Jmp,
    Bcc { cc: Cc, rd: Reg, rs1: Reg },
}

pub struct Emitter {
    code: Vec<u32>,
    labels: Vec<Option<u32>>,
    pending: Vec<(u32, Label, Pending)>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    #[must_use]
    pub fn new() -> Self {
        Emitter {
            code: Vec::new(),
            labels: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Allocates a new, as-yet-unresolved label.
    pub fn mklb(&mut self) -> Label {
        self.labels.push(None);
        Label((self.labels.len() - 1) as u32)
    }

    /// Emits a non-branch instruction, returning the pc it was written at.
    pub fn mkop(&mut self, insn: Insn) -> u32 {
        let pc = self.code.len() as u32;
        self.code.push(encode(insn));
        pc
    }

    /// Emits an unconditional jump to `label`, resolved immediately if the
    /// label's pc is already known, deferred otherwise.
    pub fn mkjmp(&mut self, label: Label) -> u32 {
        let pc = self.code.len() as u32;
        match self.labels[label.0 as usize] {
            Some(target) => self.code.push(encode(Insn::Jmp { target })),
            None => {
                self.code.push(0);
                self.pending.push((pc, label, Pending::Jmp));
            }
        }
        pc
    }

    /// Emits a conditional branch to `label`.
    pub fn mkbcc(&mut self, cc: Cc, rd: Reg, rs1: Reg, label: Label) -> u32 {
        let pc = self.code.len() as u32;
        match self.labels[label.0 as usize] {
            Some(target) => self.code.push(encode(Insn::Bcc {
                cc,
                rd,
                rs1,
                target,
            })),
            None => {
                self.code.push(0);
                self.pending.push((pc, label, Pending::Bcc { cc, rd, rs1 }));
            }
        }
        pc
    }

    /// Resolves `label` to the current pc, back-patching any instruction
    /// emitted earlier that referenced it as a forward reference.
    pub fn setlb(&mut self, label: Label) -> u32 {
        let pc = self.code.len() as u32;
        self.labels[label.0 as usize] = Some(pc);
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].1 == label {
                let (patch_pc, _, kind) = self.pending.remove(i);
                let word = match kind {
                    Pending::Jmp => encode(Insn::Jmp { target: pc }),
                    Pending::Bcc { cc, rd, rs1 } => encode(Insn::Bcc {
                        cc,
                        rd,
                        rs1,
                        target: pc,
                    }),
                };
                self.code[patch_pc as usize] = word;
            } else {
                i += 1;
            }
        }
        pc
    }

    pub fn finish(mut self) -> Vec<u32> {
        self.mkop(Insn::Halt);
        debug_assert!(
            self.pending.is_empty(),
            "label referenced but never resolved"
        );
        self.code
    }

    #[must_use]
    pub fn arith_reg(&mut self, op: Op, rd: Reg, rs1: Reg, rs2: Reg) -> u32 {
        use crate::insn::{Mod, Operand};
        self.mkop(Insn::Arith {
            op,
            rd,
            rs1,
            mode: Mod::Reg,
            src2: Operand::Reg(rs2),
        })
    }

    #[must_use]
    pub fn arith_imm(&mut self, op: Op, rd: Reg, rs1: Reg, imm: i32) -> u32 {
        use crate::insn::{Mod, Operand};
        self.mkop(Insn::Arith {
            op,
            rd,
            rs1,
            mode: Mod::Imm,
            src2: Operand::Imm(imm),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::{decode, Mod, Operand, Typ};

    #[test]
    fn backward_jump_resolves_immediately() {
        let mut e = Emitter::new();
        let head = e.mklb();
        e.setlb(head);
        e.mkop(Insn::Load {
            typ: Typ::U4,
            rd: 0,
            mode: Mod::Lofs,
            operand: 0,
        });
        e.mkjmp(head);
        let code = e.finish();
        assert_eq!(decode(code[1]), Insn::Jmp { target: 0 });
    }

    #[test]
    fn forward_branch_is_patched_on_resolve() {
        let mut e = Emitter::new();
        let tail = e.mklb();
        let bcc_pc = e.mkbcc(Cc::Z, 0, 0, tail);
        e.mkop(Insn::Load {
            typ: Typ::U4,
            rd: 1,
            mode: Mod::Imm,
            operand: 1,
        });
        let resolved = e.setlb(tail);
        let code = e.finish();
        match decode(code[bcc_pc as usize]) {
            Insn::Bcc { target, .. } => assert_eq!(target, resolved),
            other => panic!("expected Bcc, got {other:?}"),
        }
    }
}
