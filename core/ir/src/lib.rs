//! Packed IR instruction format, label-patching emitter, and a small
//! fetch-decode-execute VM (C7).

mod emit;
mod insn;
mod vm;

pub use emit::{Emitter, Label};
pub use insn::{decode, encode, Cc, Insgrp, Insn, Mod, Op, Operand, Reg, Typ, HALT_TARGET};
pub use vm::{Vm, VmError, NREGS};
