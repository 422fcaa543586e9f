//! Shunting-yard precedence rewrite (§4.6.1): converts a flat, left-to-
//! right operand/operator list into a properly nested `Abexp` tree,
//! folding any subtree whose both operands are integer literals as it
//! goes (§4.6.4) rather than as a disjoint second pass — the fold
//! condition only ever applies at the moment two literal operands meet
//! under an arithmetic operator, which is exactly when this rewrite
//! visits that pair.

use crate::arena::Arena;
use crate::node::{Abexp, Ailit, Astyp, Node};
use lunac_diag::{ice, CompileError, Pos};
use lunac_syn::{Bop, PExpItem};

/// Maximum shunting-yard operator-stack depth (`Expdep`).
pub const EXPDEP: usize = 16;

fn precedence(op: Bop) -> u8 {
    match op {
        Bop::Orelor => 2,
        Bop::Oreland => 3,
        Bop::Oeq | Bop::One => 7,
        Bop::Olt | Bop::Ogt | Bop::Ole | Bop::Oge => 9,
        Bop::Oor => 4,
        Bop::Oxor => 5,
        Bop::Oand => 6,
        Bop::Oshl | Bop::Oshr => 10,
        Bop::Oadd | Bop::Osub => 11,
        Bop::Omul | Bop::Odiv | Bop::Odivf | Bop::Omod => 12,
        Bop::Oexp => 14,
        Bop::Omxm => 12,
        Bop::Obcnt => 0,
    }
}

struct OpFrame {
    op: Bop,
    prec: u8,
}

/// Rewrites a flat `items` list (each entry pairing an operand `Node`
/// with the `Bop` that *follows* it, the last entry carrying
/// `Bop::Obcnt`) into a single properly nested `Node`, left-to-right
/// associative, bounded to `EXPDEP` live operators.
pub fn shunting_yard(
    arena: &mut Arena,
    items: &[(Node, Bop)],
    pos: Pos,
) -> Result<Node, CompileError> {
    if items.is_empty() {
        return Err(CompileError::semantic(pos, "empty expression list"));
    }
    if items.len() == 1 {
        // a single-operand "list" with no trailing operator: §9's
        // `precexp` edge case at n == 1 short-circuits to the operand.
        return Ok(items[0].0);
    }

    let mut operands: Vec<Node> = vec![items[0].0];
    let mut operators: Vec<OpFrame> = Vec::new();

    for i in 1..items.len() {
        let op = items[i - 1].1;
        let operand = items[i].0;
        let incoming_prec = precedence(op);

        while let Some(top) = operators.last() {
            if top.prec >= incoming_prec && operands.len() >= 2 {
                let top = operators.pop().unwrap();
                reduce(arena, &mut operands, top.op, pos)?;
            } else {
                break;
            }
        }

        if operators.len() >= EXPDEP {
            return Err(CompileError::semantic(
                pos,
                "expression exceeds the maximum precedence-stack depth",
            ));
        }
        operators.push(OpFrame {
            op,
            prec: incoming_prec,
        });
        operands.push(operand);
    }

    while let Some(top) = operators.pop() {
        reduce(arena, &mut operands, top.op, pos)?;
    }

    debug_assert_eq!(operands.len(), 1);
    Ok(operands[0])
}

fn reduce(
    arena: &mut Arena,
    operands: &mut Vec<Node>,
    op: Bop,
    pos: Pos,
) -> Result<(), CompileError> {
    // Both pops are a shunting-yard invariant, never user-triggerable: a
    // `reduce` is only ever called once two operands are already on the
    // stack (see the `operands.len() >= 2` guard above).
    let r = operands
        .pop()
        .ok_or_else(|| ice!(pos, "precedence stack underflow"))?;
    let l = operands
        .pop()
        .ok_or_else(|| ice!(pos, "precedence stack underflow"))?;

    if let (Astyp::Ailit, Astyp::Ailit) = (l.typ(), r.typ()) {
        if let Some(val) = fold_int(arena, l, r, op) {
            operands.push(arena.push_ailit(Ailit { val }, pos));
            return Ok(());
        }
    }

    operands.push(arena.push_abexp(Abexp { l, r, op }, pos));
    Ok(())
}

/// Folds a pure integer-literal binary expression, per §4.6.4. Returns
/// `None` for operators the spec doesn't define over integers here
/// (string/relational/logical results aren't representable as `Ailit`).
fn fold_int(arena: &Arena, l: Node, r: Node, op: Bop) -> Option<u64> {
    let lv = arena.ailit(l).val;
    let rv = arena.ailit(r).val;
    Some(match op {
        Bop::Oadd => lv.wrapping_add(rv),
        Bop::Osub => lv.wrapping_sub(rv),
        Bop::Omul => lv.wrapping_mul(rv),
        Bop::Odiv if rv != 0 => lv.wrapping_div(rv),
        Bop::Omod if rv != 0 => lv.wrapping_rem(rv),
        Bop::Oand => lv & rv,
        Bop::Oor => lv | rv,
        Bop::Oxor => lv ^ rv,
        Bop::Oshl => lv.wrapping_shl(rv as u32),
        Bop::Oshr => lv.wrapping_shr(rv as u32),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunac_diag::Pos;

    #[test]
    fn single_operand_short_circuits() {
        let mut arena = Arena::new();
        let lit = arena.push_ailit(Ailit { val: 5 }, Pos::default());
        let items = [(lit, Bop::Obcnt)];
        let out = shunting_yard(&mut arena, &items, Pos::default()).unwrap();
        assert_eq!(out, lit);
    }

    #[test]
    fn constant_fold_collapses_into_single_ailit() {
        let mut arena = Arena::new();
        let one = arena.push_ailit(Ailit { val: 1 }, Pos::default());
        let two = arena.push_ailit(Ailit { val: 2 }, Pos::default());
        let three = arena.push_ailit(Ailit { val: 3 }, Pos::default());
        // 1 + 2 * 3
        let items = [
            (one, Bop::Oadd),
            (two, Bop::Omul),
            (three, Bop::Obcnt),
        ];
        let out = shunting_yard(&mut arena, &items, Pos::default()).unwrap();
        assert_eq!(out.typ(), Astyp::Ailit);
        assert_eq!(arena.ailit(out).val, 7);
    }

    #[test]
    fn left_to_right_associativity_for_equal_precedence() {
        let mut arena = Arena::new();
        let ten = arena.push_ailit(Ailit { val: 10 }, Pos::default());
        let three = arena.push_ailit(Ailit { val: 3 }, Pos::default());
        let two = arena.push_ailit(Ailit { val: 2 }, Pos::default());
        // (10 - 3) - 2 == 5, not 10 - (3 - 2) == 9
        let items = [
            (ten, Bop::Osub),
            (three, Bop::Osub),
            (two, Bop::Obcnt),
        ];
        let out = shunting_yard(&mut arena, &items, Pos::default()).unwrap();
        assert_eq!(arena.ailit(out).val, 5);
    }
}
