//! Optional pretty-printer (§4.6.6): walks the typed, bound AST back into
//! textual form. Variable names are re-derived from the identifier map
//! the binder consumed at build time (`var_names[vid]` gives back the
//! `Ident` a `vid` was minted from); shadowed names print identically to
//! their source spelling even though they're distinct `vid`s, which is
//! exactly what makes the round trip comparable "modulo whitespace" per
//! the testable property in §8 rather than byte-for-byte.

use crate::arena::Arena;
use crate::node::{Astyp, Node};
use lunac_intern::{Ident, IdentMap};
use lunac_syn::{Bop, Uop};
use std::fmt::Write as _;

/// Renders `root` (an `Ablk`) back to source text. `var_names` maps a
/// bound `vid` back to the `Ident` it was defined from, the reverse of
/// `lunac_ast::Binder`'s internal `var2uid` table.
#[must_use]
pub fn pretty_print(arena: &Arena, root: Node, idents: &IdentMap, var_names: &[Ident]) -> String {
    let mut out = String::new();
    write_stmts(&mut out, arena, root, idents, var_names, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn var_name(idents: &IdentMap, var_names: &[Ident], vid: u32) -> String {
    match var_names.get(vid as usize) {
        Some(&uid) => String::from_utf8_lossy(idents.key(uid)).into_owned(),
        None => format!("$v{vid}"),
    }
}

/// Writes the statement list held by a block node (`Ablk` or the
/// `Astmtlst` it wraps).
fn write_stmts(out: &mut String, arena: &Arena, n: Node, idents: &IdentMap, var_names: &[Ident], depth: usize) {
    let lst = match n.typ() {
        Astyp::Ablk => arena.ablk(n).s,
        Astyp::Astmtlst => n,
        _ => n,
    };
    if lst.typ() != Astyp::Astmtlst {
        write_stmt(out, arena, n, idents, var_names, depth);
        return;
    }
    for s in &arena.astmtlst(lst).stmts {
        write_stmt(out, arena, *s, idents, var_names, depth);
    }
}

fn write_stmt(out: &mut String, arena: &Arena, n: Node, idents: &IdentMap, var_names: &[Ident], depth: usize) {
    match n.typ() {
        Astyp::Astmt => write_stmt(out, arena, arena.astmt(n).s, idents, var_names, depth),
        Astyp::Ablk => write_stmts(out, arena, n, idents, var_names, depth),
        Astyp::Aasgnst => {
            indent(out, depth);
            let rec = arena.aasgnst(n);
            write_expr(out, arena, rec.tgt, idents, var_names);
            out.push_str(" = ");
            write_expr(out, arena, rec.e, idents, var_names);
            out.push('\n');
        }
        Astyp::Awhile => {
            let rec = arena.awhile(n);
            indent(out, depth);
            out.push_str("while ");
            write_expr(out, arena, rec.e, idents, var_names);
            out.push_str(":\n");
            write_stmts(out, arena, rec.tb, idents, var_names, depth + 1);
        }
        Astyp::Aif => {
            let rec = arena.aif(n);
            indent(out, depth);
            out.push_str("if ");
            write_expr(out, arena, rec.e, idents, var_names);
            out.push_str(":\n");
            write_stmts(out, arena, rec.tb, idents, var_names, depth + 1);
            if let Some(fb) = rec.fb {
                indent(out, depth);
                out.push_str("else:\n");
                write_stmts(out, arena, fb, idents, var_names, depth + 1);
            }
        }
        Astyp::Afndef => {
            let rec = arena.afndef(n);
            indent(out, depth);
            let _ = write!(out, "function {}(", String::from_utf8_lossy(idents.key(rec.id)));
            let plst = arena.aparamlst(rec.plst);
            for (i, p) in plst.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let param = arena.aparam(*p);
                out.push_str(&String::from_utf8_lossy(idents.key(param.id)));
            }
            out.push_str("):\n");
            write_stmts(out, arena, rec.blk, idents, var_names, depth + 1);
        }
        _ => {
            indent(out, depth);
            write_expr(out, arena, n, idents, var_names);
            out.push('\n');
        }
    }
}

fn write_expr(out: &mut String, arena: &Arena, n: Node, idents: &IdentMap, var_names: &[Ident]) {
    match n.typ() {
        Astyp::Ailit => {
            let _ = write!(out, "{}", arena.ailit(n).val);
        }
        Astyp::Aflit => {
            let _ = write!(out, "{}", arena.aflit(n).val);
        }
        Astyp::Aslit => out.push_str("<string literal>"),
        Astyp::Atru => out.push_str("true"),
        Astyp::Afal => out.push_str("false"),
        Astyp::Avar => out.push_str(&var_name(idents, var_names, arena.avar(n).id)),
        Astyp::Auexp => {
            let rec = arena.auexp(n);
            out.push_str(uop_str(rec.op));
            write_expr(out, arena, rec.e, idents, var_names);
        }
        Astyp::Abexp => {
            let rec = arena.abexp(n);
            out.push('(');
            write_expr(out, arena, rec.l, idents, var_names);
            let _ = write!(out, " {} ", bop_str(rec.op));
            write_expr(out, arena, rec.r, idents, var_names);
            out.push(')');
        }
        Astyp::Aaexp => {
            let rec = arena.aaexp(n);
            write_expr(out, arena, rec.id, idents, var_names);
            out.push('[');
            write_expr(out, arena, rec.e, idents, var_names);
            out.push(']');
        }
        _ => out.push_str("<?>"),
    }
}

fn uop_str(op: Uop) -> &'static str {
    match op {
        Uop::Upls => "+",
        Uop::Umin => "-",
        Uop::Not => "!",
        Uop::Neg => "~",
    }
}

fn bop_str(op: Bop) -> &'static str {
    match op {
        Bop::Orelor => "||",
        Bop::Oreland => "&&",
        Bop::One => "!=",
        Bop::Oeq => "==",
        Bop::Oshl => "<<",
        Bop::Oshr => ">>",
        Bop::Oxor => "^",
        Bop::Oor => "|",
        Bop::Oand => "&",
        Bop::Oadd => "+",
        Bop::Osub => "-",
        Bop::Omul => "*",
        Bop::Odiv => "/",
        Bop::Odivf => "//",
        Bop::Omod => "%",
        Bop::Omxm => "<matmul>",
        Bop::Oexp => "**",
        Bop::Olt => "<",
        Bop::Ogt => ">",
        Bop::Ole => "<=",
        Bop::Oge => ">=",
        Bop::Obcnt => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use lunac_intern::IdentMap;

    #[test]
    fn prints_an_assignment_and_a_while_loop() {
        let mut idents = IdentMap::new();
        let mut sink = lunac_diag::DiagSink::new(lunac_diag::Level::Verbose);
        let src = b"n = 3\nwhile n > 0: n = n - 1\n";
        let lex = lunac_lex::lex(src, &mut idents, &mut sink);
        let raw = lunac_syn::parse(&lex).unwrap();
        let built = build(&raw).unwrap();

        let text = pretty_print(&built.arena, built.root, &idents, &built.vid_names);
        assert!(text.contains("n = 3"));
        assert!(text.contains("while (n > 0):"));
        assert!(text.contains("n = (n - 1)"));
    }
}
