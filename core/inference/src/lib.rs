//! # lunac
//!
//! Orchestration crate wiring the front end's four passes behind a single
//! [`CompilerContext`] value: lexing (C3/C4), parsing (C5), AST building
//! plus constant folding and IR emission (C6), and the IR virtual machine
//! (C7). No pass reads from a process-wide static; every mutable piece of
//! state a compilation needs — the identifier map, the diagnostic sink —
//! lives on `CompilerContext` and is threaded through explicitly.
//!
//! ## Architecture
//!
//! ```text
//! bytes ──▶ lex (C3/C4) ──▶ parse (C5) ──▶ compile (C6) ──▶ run (C7)
//!              │                │               │              │
//!         LexOutput        RawProgram      CompileOutput       Vm
//! ```
//!
//! Each arrow is one `CompilerContext` method; each box is the value the
//! next phase consumes. Nothing downstream of `lex` touches source bytes
//! again, and nothing downstream of `compile` touches the AST again.
//!
//! ## Example
//!
//! ```rust
//! use lunac::CompilerContext;
//!
//! let mut ctx = CompilerContext::new();
//! let lex = ctx.lex("n = 3\nwhile n > 0: n = n - 1").unwrap();
//! let raw = ctx.parse(&lex).unwrap();
//! let compiled = ctx.compile(&raw).unwrap();
//! let vm = ctx.run(&compiled).unwrap();
//! assert_eq!(vm.mem[0], 0); // `n` (vid 0) counted down to zero
//! ```
//!
//! ## Error handling
//! Every phase that can fail returns [`anyhow::Result`]; the crate-
//! boundary passes underneath (`lunac-lex`, `lunac-syn`, `lunac-ast`,
//! `lunac-ir`) raise their own typed `lunac_diag::CompileError` or
//! `lunac_ir::VmError`, which `anyhow`'s blanket `From` impl wraps with no
//! extra boilerplate here. Non-fatal issues (an unterminated string, an
//! unexpected byte) are instead recorded in the context's
//! [`DiagSink`](lunac_diag::DiagSink), retrievable via
//! [`CompilerContext::diagnostics`], and do not interrupt lexing — they
//! surface only if a later phase trips over the resulting malformed
//! token.
//!
//! ## Limitations
//! The trimmed grammar this front end accepts has no call expression, so
//! `run` executes only the program's top-level statements; `Afndef`
//! bodies are parsed and bound but never reached by the VM (see
//! `lunac-ast`'s `ir_emit` module for the full rationale).
//!
//! ## See also
//! The `lunac` binary in the `cli` crate drives this API end to end and
//! is the reference caller for phase-gated, flag-controlled compilation.

use lunac_ast::{Arena, BuildOutput, EmitOutput, Node};
use lunac_diag::DiagSink;
use lunac_intern::IdentMap;
use lunac_ir::Vm;
use lunac_lex::LexOutput;
use lunac_syn::RawProgram;

/// The finished product of the `compile` phase: a typed AST plus the IR
/// lowered from it, ready for [`CompilerContext::run`].
pub struct CompileOutput {
    pub arena: Arena,
    pub root: Node,
    pub vid_count: u32,
    pub vid_names: Vec<lunac_intern::Ident>,
    pub code: Vec<u32>,
    pub hit: u8,
}

impl CompileOutput {
    /// Renders the typed AST back to source text (§4.6.6), resolving
    /// variable spellings through `idents` (normally
    /// [`CompilerContext::identifiers`]).
    #[must_use]
    pub fn pretty_print(&self, idents: &IdentMap) -> String {
        lunac_ast::pretty_print(&self.arena, self.root, idents, &self.vid_names)
    }
}

/// Holds the state a compilation needs across passes: the identifier map
/// (populated by `lex`, read thereafter) and the diagnostic sink every
/// pass may push non-fatal findings into.
///
/// Per-compilation, not global — running two unrelated sources through
/// two `CompilerContext` values never lets one's identifiers or
/// diagnostics leak into the other's.
pub struct CompilerContext {
    idents: IdentMap,
    sink: DiagSink,
}

impl Default for CompilerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerContext {
    #[must_use]
    pub fn new() -> Self {
        CompilerContext {
            idents: IdentMap::new(),
            sink: DiagSink::new(lunac_diag::Level::Verbose),
        }
    }

    #[must_use]
    pub fn with_verbosity(level: lunac_diag::Level) -> Self {
        CompilerContext {
            idents: IdentMap::new(),
            sink: DiagSink::new(level),
        }
    }

    /// Runs only the pre-lexer (C3): the line-start table plus the
    /// counts that size the lexer's arenas. Exposed separately from
    /// [`CompilerContext::lex`] so a caller that only wants this phase
    /// (e.g. `--until prelex`) doesn't have to run the lexer to get it.
    pub fn prelex(&self, src: &str) -> anyhow::Result<lunac_lex::PreLexOutput> {
        Ok(lunac_lex::prelex(src.as_bytes())?)
    }

    /// Runs the pre-lexer (C3) then the lexer (C4) over `src`, returning
    /// the four parallel token arrays plus side tables. Non-fatal lexer
    /// errors (an unexpected byte, an unterminated short string) are
    /// pushed to [`CompilerContext::diagnostics`] rather than aborting;
    /// an unterminated block comment or long string is the one pre-lexer
    /// condition serious enough to fail outright.
    pub fn lex(&mut self, src: &str) -> anyhow::Result<LexOutput> {
        let bytes = src.as_bytes();
        lunac_lex::prelex(bytes)?;
        Ok(lunac_lex::lex(bytes, &mut self.idents, &mut self.sink))
    }

    /// Runs the parser (C5) over a lexed token stream, producing the raw,
    /// unbound, precedence-unresolved AST.
    pub fn parse(&self, lex: &LexOutput) -> anyhow::Result<RawProgram> {
        Ok(lunac_syn::parse(lex)?)
    }

    /// Runs the AST builder (binding, precedence rewrite, constant
    /// folding) and IR emission (C6) over a parsed program.
    pub fn compile(&self, raw: &RawProgram) -> anyhow::Result<CompileOutput> {
        let BuildOutput {
            arena,
            root,
            vid_count,
            vid_names,
            emitter,
        } = lunac_ast::build(raw)?;
        let EmitOutput { code, hit } = lunac_ast::emit_program(&arena, root, emitter)?;
        Ok(CompileOutput {
            arena,
            root,
            vid_count,
            vid_names,
            code,
            hit,
        })
    }

    /// Executes a compiled program's IR on the C7 virtual machine. Memory
    /// is sized to hold every bound variable (`vid_count`, at least one
    /// word so an empty program still gets a valid `Vm`); registers reset
    /// to zero at entry per §4.7.
    pub fn run(&self, compiled: &CompileOutput) -> anyhow::Result<Vm> {
        let mem_words = (compiled.vid_count as usize).max(1);
        let mut vm = Vm::new(mem_words);
        vm.run(&compiled.code)?;
        Ok(vm)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &DiagSink {
        &self.sink
    }

    #[must_use]
    pub fn identifiers(&self) -> &IdentMap {
        &self.idents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_lexes_to_a_lone_eof_token() {
        let mut ctx = CompilerContext::new();
        let lex = ctx.lex("").unwrap();
        assert_eq!(lex.len(), 1);
        assert!(!ctx.diagnostics().has_errors());
    }

    #[test]
    fn full_pipeline_runs_a_countdown_to_zero() {
        let mut ctx = CompilerContext::new();
        let lex = ctx.lex("n = 4\nwhile n > 0: n = n - 1").unwrap();
        let raw = ctx.parse(&lex).unwrap();
        let compiled = ctx.compile(&raw).unwrap();
        let vm = ctx.run(&compiled).unwrap();
        assert_eq!(vm.mem[0], 0);
    }

    #[test]
    fn constant_fold_reaches_the_compiled_tree() {
        let mut ctx = CompilerContext::new();
        let lex = ctx.lex("y = 1 + 2 * 3").unwrap();
        let raw = ctx.parse(&lex).unwrap();
        let compiled = ctx.compile(&raw).unwrap();
        assert!(compiled.code.len() > 1);
    }
}
