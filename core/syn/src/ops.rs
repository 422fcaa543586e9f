//! Unary/binary operator vocabulary, mirroring the original compiler's
//! `Uop`/`Bop` enumerations so the precedence table in `lunac-ast` can be
//! indexed the same way regardless of which operators this front end's
//! grammar actually reaches.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uop {
    Upls,
    Umin,
    Not,
    Neg,
}

/// Binary operators. Several variants (`Oshl`, `Oxor`, `Omxm`, ...) have no
/// surface syntax in this front end's trimmed grammar and are never
/// constructed by the parser; they stay in the enum so the precedence
/// table mirrors the original's full 20-entry shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bop {
    Orelor,
    Oreland,
    One,
    Oeq,
    Oshl,
    Oshr,
    Oxor,
    Oor,
    Oand,
    Oadd,
    Osub,
    Omul,
    Odiv,
    Odivf,
    Omod,
    Omxm,
    Oexp,
    Olt,
    Ogt,
    Ole,
    Oge,
    /// Sentinel: "no trailing operator", used to terminate a flat operand
    /// list and (reused by the IR encoder) to mark a pure register load.
    Obcnt,
}
