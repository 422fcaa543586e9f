//! Predictive recursive-descent walker over `LexOutput`'s token arrays.
//!
//! The original's grammar tables (`Production`, `Ctl` control bytes,
//! `Laset` lookahead sets) are the output of `gensyn`, a build-time
//! generator this system treats as an external collaborator whose
//! *output* — not its generation logic — would normally be linked in as
//! constant data. No such generated table ships in this source tree, so
//! the productions below are hand-written directly as Rust match arms
//! instead of being driven by an interpreted byte-code table; the
//! lookahead this parser actually needs never exceeds `Laset`'s bound of
//! four tokens; most decisions need only one.

use crate::ops::{Bop, Uop};
use crate::raw::{NodeId, PExpItem, RawArena, RawNode, RawProgram};
use lunac_diag::{CompileError, Pos};
use lunac_intern::Ident;
use lunac_lex::{Keyword, LexOutput, TokenKind};

/// Walks a token stream already interned by `lunac-lex`; identifiers are
/// dense ids by the time they reach this pass, so no interner handle is
/// needed here.
pub struct Parser<'a> {
    lex: &'a LexOutput,
    i: usize,
    arena: RawArena,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(lex: &'a LexOutput) -> Self {
        Parser {
            lex,
            i: 0,
            arena: RawArena::new(),
        }
    }

    fn kind(&self) -> TokenKind {
        self.lex.toks[self.i]
    }

    fn pos(&self) -> Pos {
        self.lex.pos(self.i)
    }

    fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    fn bump(&mut self) -> usize {
        let cur = self.i;
        if self.i + 1 < self.lex.len() {
            self.i += 1;
        }
        cur
    }

    fn expect(&mut self, kind: TokenKind) -> Result<usize, CompileError> {
        if self.kind() == kind {
            Ok(self.bump())
        } else {
            Err(CompileError::syntax(
                self.pos(),
                format!("expected {kind:?}, found {:?}", self.kind()),
            ))
        }
    }

    fn ident_at(&self, tok_idx: usize) -> Ident {
        Ident::from_u32(self.lex.bits[tok_idx] as u32)
    }

    /// Top-level entry: a statement list terminated by end-of-file.
    pub fn parse_program(mut self) -> Result<RawProgram, CompileError> {
        let start = self.pos();
        let stmts = self.parse_stmt_list(&[TokenKind::Eof])?;
        let root = self.arena.push(RawNode::Block(stmts), start);
        Ok(RawProgram {
            arena: self.arena,
            root,
        })
    }

    fn parse_stmt_list(&mut self, stop: &[TokenKind]) -> Result<Vec<NodeId>, CompileError> {
        let mut stmts = Vec::new();
        while !stop.contains(&self.kind()) && !self.at_eof() {
            stmts.push(self.parse_stmt()?);
            if self.kind() == TokenKind::Semi {
                self.bump();
            }
        }
        Ok(stmts)
    }

    fn parse_block(&mut self) -> Result<NodeId, CompileError> {
        let start = self.pos();
        self.expect(TokenKind::LBrace)?;
        let stmts = self.parse_stmt_list(&[TokenKind::RBrace])?;
        self.expect(TokenKind::RBrace)?;
        Ok(self.arena.push(RawNode::Block(stmts), start))
    }

    fn parse_stmt(&mut self) -> Result<NodeId, CompileError> {
        let start = self.pos();
        match self.kind() {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Keyword(Keyword::While) => {
                self.bump();
                let cond = self.parse_expr()?;
                // colon-bodied single statement, not a block: the
                // surface grammar this front end targets is not Lua's.
                self.expect(TokenKind::Colon)?;
                let body = self.parse_stmt()?;
                Ok(self.arena.push(RawNode::While { cond, body }, start))
            }
            TokenKind::Keyword(Keyword::If) => {
                self.bump();
                let cond = self.parse_expr()?;
                let tb = self.parse_block()?;
                let fb = if self.kind() == TokenKind::Keyword(Keyword::Else) {
                    self.bump();
                    Some(self.parse_block()?)
                } else {
                    None
                };
                Ok(self.arena.push(RawNode::If { cond, tb, fb }, start))
            }
            TokenKind::Keyword(Keyword::Function) => self.parse_fndef(),
            TokenKind::Ident if self.peek_is_assign() => {
                let tgt_tok = self.bump();
                let tgt = self
                    .arena
                    .push(RawNode::TargetId(self.ident_at(tgt_tok)), start);
                self.expect(TokenKind::Assign)?;
                let e = self.parse_expr()?;
                Ok(self.arena.push(RawNode::AssignStmt { tgt, e }, start))
            }
            _ => {
                let e = self.parse_expr()?;
                Ok(self.arena.push(RawNode::ExprStmt(e), start))
            }
        }
    }

    fn peek_is_assign(&self) -> bool {
        self.i + 1 < self.lex.len() && self.lex.toks[self.i + 1] == TokenKind::Assign
    }

    fn parse_fndef(&mut self) -> Result<NodeId, CompileError> {
        let start = self.pos();
        self.bump();
        let name_tok = self.expect_ident()?;
        let id = self.ident_at(name_tok);
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while self.kind() != TokenKind::RParen {
            let p_tok = self.expect_ident()?;
            let ppos = self.lex.pos(p_tok);
            params.push(self.arena.push(RawNode::Param(self.ident_at(p_tok)), ppos));
            if self.kind() == TokenKind::Comma {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(self
            .arena
            .push(RawNode::FnDef { id, params, body }, start))
    }

    fn expect_ident(&mut self) -> Result<usize, CompileError> {
        if self.kind() == TokenKind::Ident {
            Ok(self.bump())
        } else {
            Err(CompileError::syntax(
                self.pos(),
                format!("expected identifier, found {:?}", self.kind()),
            ))
        }
    }

    /// Parses a flat, precedence-unresolved operand/operator list. No
    /// precedence climbing happens here; that is `lunac-ast`'s job.
    fn parse_expr(&mut self) -> Result<NodeId, CompileError> {
        let start = self.pos();
        let mut items = Vec::new();
        loop {
            let operand = self.parse_unary()?;
            match self.current_bop() {
                Some(op) => {
                    self.bump();
                    items.push(PExpItem { operand, op });
                }
                None => {
                    items.push(PExpItem {
                        operand,
                        op: Bop::Obcnt,
                    });
                    break;
                }
            }
        }
        if items.len() == 1 {
            Ok(items[0].operand)
        } else {
            Ok(self.arena.push(RawNode::PExpList(items), start))
        }
    }

    fn current_bop(&self) -> Option<Bop> {
        Some(match self.kind() {
            TokenKind::Keyword(Keyword::Or) => Bop::Orelor,
            TokenKind::Keyword(Keyword::And) => Bop::Oreland,
            TokenKind::EqEq => Bop::Oeq,
            TokenKind::NotEq => Bop::One,
            TokenKind::Plus => Bop::Oadd,
            TokenKind::Minus => Bop::Osub,
            TokenKind::Star => Bop::Omul,
            TokenKind::Slash => Bop::Odiv,
            TokenKind::Percent => Bop::Omod,
            TokenKind::Caret => Bop::Oexp,
            TokenKind::Lt => Bop::Olt,
            TokenKind::Gt => Bop::Ogt,
            TokenKind::Le => Bop::Ole,
            TokenKind::Ge => Bop::Oge,
            _ => return None,
        })
    }

    fn parse_unary(&mut self) -> Result<NodeId, CompileError> {
        let start = self.pos();
        let op = match self.kind() {
            TokenKind::Minus => Some(Uop::Umin),
            TokenKind::Plus => Some(Uop::Upls),
            TokenKind::Keyword(Keyword::Not) => Some(Uop::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let e = self.parse_unary()?;
            return Ok(self.arena.push(RawNode::UnExp { op, e }, start));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<NodeId, CompileError> {
        let start = self.pos();
        match self.kind() {
            TokenKind::IntLit => {
                let tok = self.bump();
                let val = decode_int(self.lex, tok);
                Ok(self.arena.push(RawNode::IntLit(val), start))
            }
            TokenKind::FloatLit => {
                let tok = self.bump();
                let val = f64::from_bits(self.lex.bits[tok]);
                Ok(self.arena.push(RawNode::FloatLit(val), start))
            }
            TokenKind::StrLit => {
                let tok = self.bump();
                Ok(self.arena.push(RawNode::StrLit(self.lex.bits[tok]), start))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.bump();
                Ok(self.arena.push(RawNode::True, start))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.bump();
                Ok(self.arena.push(RawNode::False, start))
            }
            TokenKind::LParen => {
                self.bump();
                let e = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            TokenKind::Ident => {
                let tok = self.bump();
                let id_node = self.arena.push(RawNode::Id(self.ident_at(tok)), start);
                if self.kind() == TokenKind::LBracket {
                    self.bump();
                    let e = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    Ok(self
                        .arena
                        .push(RawNode::Subscript { id: id_node, e }, start))
                } else {
                    Ok(id_node)
                }
            }
            other => Err(CompileError::syntax(
                start,
                format!("unexpected token in expression: {other:?}"),
            )),
        }
    }
}

fn decode_int(lex: &LexOutput, tok: usize) -> u64 {
    use lunac_lex::attr;
    let a = lex.atrs[tok];
    if a & attr::NUM_INLINE != 0 {
        u64::from(a & attr::NUM_INLINE_MASK)
    } else {
        lex.bits[tok]
    }
}

/// Parses a complete token stream into a raw AST.
pub fn parse(lex: &LexOutput) -> Result<RawProgram, CompileError> {
    Parser::new(lex).parse_program()
}
