//! Minimal fetch-decode-execute VM (C7), for testing the IR this crate's
//! emitter produces. Registers reset to zero at entry; a flat word-
//! addressable memory backs local/global loads and stores.

use crate::insn::{decode, Cc, Insn, Mod, Op, Operand, Typ, HALT_TARGET};
use thiserror::Error;

pub const NREGS: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VmError {
    #[error("division by zero at pc {pc}")]
    DivByZero { pc: u32 },
    #[error("program counter {pc} out of bounds")]
    PcOutOfBounds { pc: u32 },
    #[error("memory offset {ofs} out of bounds")]
    MemOutOfBounds { ofs: i32 },
    #[error("Ctret is not implemented in this VM")]
    RetUnimplemented,
}

pub struct Vm {
    pub regs: [u32; NREGS],
    pub mem: Vec<u32>,
    pub pc: u32,
    pub steps: u64,
}

impl Vm {
    #[must_use]
    pub fn new(mem_words: usize) -> Self {
        Vm {
            regs: [0; NREGS],
            mem: vec![0; mem_words],
            pc: 0,
            steps: 0,
        }
    }

    fn mem_index(&self, ofs: i32) -> Result<usize, VmError> {
        let idx = ofs as isize;
        if idx < 0 || idx as usize >= self.mem.len() {
            return Err(VmError::MemOutOfBounds { ofs });
        }
        Ok(idx as usize)
    }

    /// Runs `code` to completion (the `Ctcal` halt sentinel) or until a
    /// VM error occurs.
    pub fn run(&mut self, code: &[u32]) -> Result<(), VmError> {
        loop {
            let pc = self.pc as usize;
            let word = *code
                .get(pc)
                .ok_or(VmError::PcOutOfBounds { pc: self.pc })?;
            let insn = decode(word);
            self.steps += 1;
            match insn {
                Insn::Load {
                    typ, rd, mode, operand,
                } => {
                    let raw = match mode {
                        Mod::Imm => operand as u32,
                        Mod::Reg => self.regs[operand as usize & 0xf],
                        Mod::Lofs | Mod::Gofs => {
                            let idx = self.mem_index(operand)?;
                            self.mem[idx]
                        }
                    };
                    self.regs[rd as usize] = extend(typ, raw);
                    self.pc += 1;
                }
                Insn::Store {
                    typ, rd, mode, operand,
                } => {
                    let narrowed = narrow(typ, self.regs[rd as usize]);
                    match mode {
                        Mod::Lofs | Mod::Gofs | Mod::Reg | Mod::Imm => {
                            let idx = self.mem_index(operand)?;
                            self.mem[idx] = narrowed;
                        }
                    }
                    self.pc += 1;
                }
                Insn::Arith {
                    op, rd, rs1, src2, ..
                } => {
                    let a = self.regs[rs1 as usize];
                    let b = match src2 {
                        Operand::Reg(r) => self.regs[r as usize],
                        Operand::Imm(i) => i as u32,
                    };
                    self.regs[rd as usize] = exec_arith(op, a, b, self.pc)?;
                    self.pc += 1;
                }
                Insn::Jmp { target } => {
                    self.pc = target;
                }
                Insn::Bcc {
                    cc,
                    rd,
                    rs1,
                    target,
                } => {
                    if eval_cc(cc, self.regs[rd as usize], self.regs[rs1 as usize]) {
                        self.pc = target;
                    } else {
                        self.pc += 1;
                    }
                }
                Insn::Halt => return Ok(()),
                Insn::Ret => return Err(VmError::RetUnimplemented),
            }
            if self.pc == HALT_TARGET {
                return Ok(());
            }
        }
    }
}

/// Sign- or zero-extends a memory/immediate word to a full register value
/// per `Typ`, covering the `{u1,u2,u4,s1,s2,s4}` widths `vm.c`/`vmrun.c`
/// split across `regsu4`/`regss4`. Wider or dynamic types (`s8`, `u8`,
/// `f4`, `f8`, `str`, `dyn`) pass through verbatim: this VM's memory is a
/// flat array of 32-bit words, so there is no second word to carry their
/// extra width.
fn extend(typ: Typ, raw: u32) -> u32 {
    match typ {
        Typ::S1 => (raw as u8 as i8) as i32 as u32,
        Typ::U1 => raw & 0xff,
        Typ::S2 => (raw as u16 as i16) as i32 as u32,
        Typ::U2 => raw & 0xffff,
        Typ::S4 | Typ::U4 | Typ::Tf => raw,
        Typ::S8 | Typ::U8 | Typ::F4 | Typ::F8 | Typ::Str | Typ::Dyn => raw,
    }
}

/// Narrows a register value to `Typ`'s width before it is written to
/// memory, the store-side half of `extend`.
fn narrow(typ: Typ, word: u32) -> u32 {
    match typ {
        Typ::S1 | Typ::U1 => word & 0xff,
        Typ::S2 | Typ::U2 => word & 0xffff,
        Typ::S4 | Typ::U4 | Typ::Tf => word,
        Typ::S8 | Typ::U8 | Typ::F4 | Typ::F8 | Typ::Str | Typ::Dyn => word,
    }
}

fn exec_arith(op: Op, a: u32, b: u32, pc: u32) -> Result<u32, VmError> {
    Ok(match op {
        Op::Add => a.wrapping_add(b),
        Op::Sub => a.wrapping_sub(b),
        Op::Mul => a.wrapping_mul(b),
        Op::Div => {
            if b == 0 {
                return Err(VmError::DivByZero { pc });
            }
            a.wrapping_div(b)
        }
        Op::Mod => {
            if b == 0 {
                return Err(VmError::DivByZero { pc });
            }
            a.wrapping_rem(b)
        }
        Op::And => a & b,
        Op::Or => a | b,
        Op::Xor => a ^ b,
        Op::Shl => a.wrapping_shl(b),
        Op::Shr => a.wrapping_shr(b),
        Op::Not => {
            if a == 0 {
                1
            } else {
                0
            }
        }
        Op::Neg => !a,
        Op::Umin => (-(a as i32)) as u32,
        Op::Upls => a,
    })
}

fn eval_cc(cc: Cc, rd: u32, rs1: u32) -> bool {
    match cc {
        Cc::Z => rd == 0,
        Cc::Eq => rd == rs1,
        Cc::Ne => rd != rs1,
        Cc::Lt => (rd as i32) < (rs1 as i32),
        Cc::Ltu => rd < rs1,
        Cc::Ge => (rd as i32) >= (rs1 as i32),
        Cc::Geu => rd >= rs1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Emitter;
    use crate::insn::{Insn, Mod, Typ};

    /// Builds and runs the `while n > 0: n = n - 1` program from the
    /// spec's worked scenario, starting with `n` stored at memory word 0.
    fn run_countdown(n0: u32) -> (Vm, Result<(), VmError>) {
        let mut e = Emitter::new();
        let head = e.mklb();
        let tail = e.mklb();

        e.setlb(head);
        e.mkop(Insn::Load {
            typ: Typ::U4,
            rd: 0,
            mode: Mod::Lofs,
            operand: 0,
        });
        e.mkop(Insn::Load {
            typ: Typ::U4,
            rd: 1,
            mode: Mod::Imm,
            operand: 0,
        });
        // branch to :tail when 0 >= n, i.e. the loop condition n > 0 is false
        e.mkbcc(Cc::Ge, 1, 0, tail);
        e.arith_imm(Op::Sub, 0, 0, 1);
        e.mkop(Insn::Store {
            typ: Typ::U4,
            rd: 0,
            mode: Mod::Lofs,
            operand: 0,
        });
        e.mkjmp(head);
        e.setlb(tail);
        let code = e.finish();

        let mut vm = Vm::new(4);
        vm.mem[0] = n0;
        let result = vm.run(&code);
        (vm, result)
    }

    #[test]
    fn countdown_terminates_with_zero() {
        let (vm, result) = run_countdown(1 << 10);
        assert!(result.is_ok());
        assert_eq!(vm.mem[0], 0);
    }

    #[test]
    fn division_by_zero_is_a_fatal_vm_error() {
        let mut e = Emitter::new();
        e.mkop(Insn::Load {
            typ: Typ::U4,
            rd: 0,
            mode: Mod::Imm,
            operand: 10,
        });
        e.mkop(Insn::Load {
            typ: Typ::U4,
            rd: 1,
            mode: Mod::Imm,
            operand: 0,
        });
        e.arith_reg(Op::Div, 2, 0, 1);
        let code = e.finish();
        let mut vm = Vm::new(1);
        assert!(matches!(vm.run(&code), Err(VmError::DivByZero { .. })));
    }

    #[test]
    fn registers_start_at_zero() {
        let vm = Vm::new(1);
        assert_eq!(vm.regs, [0u32; NREGS]);
    }

    #[test]
    fn s1_load_sign_extends_a_negative_byte() {
        let mut e = Emitter::new();
        e.mkop(Insn::Load {
            typ: Typ::S1,
            rd: 0,
            mode: Mod::Imm,
            operand: 0xff,
        });
        let code = e.finish();
        let mut vm = Vm::new(1);
        vm.run(&code).unwrap();
        assert_eq!(vm.regs[0], 0xffff_ffff);
    }

    #[test]
    fn u1_load_zero_extends_the_same_byte() {
        let mut e = Emitter::new();
        e.mkop(Insn::Load {
            typ: Typ::U1,
            rd: 0,
            mode: Mod::Imm,
            operand: 0xff,
        });
        let code = e.finish();
        let mut vm = Vm::new(1);
        vm.run(&code).unwrap();
        assert_eq!(vm.regs[0], 0xff);
    }

    #[test]
    fn s2_store_then_load_narrows_then_sign_extends() {
        let mut e = Emitter::new();
        e.mkop(Insn::Load {
            typ: Typ::U4,
            rd: 0,
            mode: Mod::Imm,
            operand: -1,
        });
        e.mkop(Insn::Store {
            typ: Typ::S2,
            rd: 0,
            mode: Mod::Lofs,
            operand: 0,
        });
        e.mkop(Insn::Load {
            typ: Typ::S2,
            rd: 1,
            mode: Mod::Lofs,
            operand: 0,
        });
        let code = e.finish();
        let mut vm = Vm::new(1);
        vm.run(&code).unwrap();
        assert_eq!(vm.mem[0], 0xffff);
        assert_eq!(vm.regs[1], 0xffff_ffff);
    }
}
