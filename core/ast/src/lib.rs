//! Post-processor: converts `lunac-syn`'s raw parse tree into a typed,
//! bound, partially-evaluated arena and emits IR from it (C6, plus the
//! C7 hookup).

mod arena;
mod binder;
mod builder;
mod ir_emit;
mod node;
mod precedence;
mod pretty;

pub use arena::Arena;
pub use binder::{Binder, MAX_LEVELS};
pub use builder::{build, BuildOutput};
pub use ir_emit::{emit_program, EmitOutput};
pub use node::{
    Aaexp, Aasgnst, Afndef, Aid, Ailit, Aflit, Aif, Aparam, Aparamlst, Aslit, Astmt, Astmtlst,
    Astyp, Atgtid, Auexp, Avar, Abexp, Ablk, Awhile, Node, ATYBIT, ATYMSK,
};
pub use precedence::{shunting_yard, EXPDEP};
pub use pretty::pretty_print;
