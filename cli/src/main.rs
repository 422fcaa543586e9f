//! # lunac CLI
//!
//! Command-line driver for the `lunac` compiler: lexes, parses, builds,
//! and (unless `--until` stops it early) runs a single source file or
//! inline string.
//!
//! Phases execute in canonical order (`prelex` -> `lex` -> `syn` -> `ast`
//! -> run) regardless of the order flags are given on the command line;
//! `--until <phase>` halts after the named phase.
//!
//! ## Exit codes
//! * 0 - success.
//! * 1 - usage error, phase failure, or any diagnostic at error severity
//!   or above.
//!
//! ## Example
//! ```bash
//! lunac examples/countdown.lun -r
//! lunac -c "n = 3" --until ast -P
//! ```

mod parser;

use clap::Parser as _;
use lunac::CompilerContext;
use lunac_diag::Level;
use parser::{Cli, Pass, Phase, MAX_INCLUDE_DIRS};
use std::{fs, process};

fn main() {
    let args = Cli::parse();

    if args.list_passes {
        print_passes();
        process::exit(0);
    }

    if args.include_dirs.len() > MAX_INCLUDE_DIRS {
        eprintln!("Error: at most {MAX_INCLUDE_DIRS} -I directories are allowed");
        process::exit(1);
    }

    if args.path.is_none() && args.inline_src.is_none() {
        eprintln!("Error: supply a source path or -c <string>");
        process::exit(1);
    }

    if let Some(path) = &args.path {
        if !path.exists() {
            eprintln!("Error: path not found");
            process::exit(1);
        }
    }

    // `cmd`: the command line itself is all that's being validated.
    if args.until == Some(Phase::Cmd) {
        process::exit(0);
    }

    let source_name = args
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<inline>".to_string());

    let source = match &args.inline_src {
        Some(s) => s.clone(),
        None => match fs::read_to_string(args.path.as_ref().unwrap()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading source file: {e}");
                process::exit(1);
            }
        },
    };

    let level = if args.quiet {
        Level::Error
    } else {
        match args.verbose.unwrap_or(0) {
            0 => Level::Warn,
            1 => Level::Info,
            _ => Level::Verbose,
        }
    };
    let mut ctx = CompilerContext::with_verbosity(level);

    let pre = match ctx.prelex(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{source_name}: {e}");
            process::exit(1);
        }
    };
    trace_emit(&args, Pass::Lex, || {
        format!(
            "{} lines, ~{} tokens, ~{} identifiers",
            pre.line_starts.len(),
            pre.token_estimate,
            pre.id_count
        )
    });
    if args.until == Some(Phase::Prelex) {
        exit_with_diagnostics(&ctx, &source_name, &pre.line_starts);
    }

    let lex = match ctx.lex(&source) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{source_name}: {e}");
            process::exit(1);
        }
    };
    trace_emit(&args, Pass::Lex, || format!("{} tokens", lex.len()));
    if args.until == Some(Phase::Lex) {
        exit_with_diagnostics(&ctx, &source_name, &pre.line_starts);
    }

    let raw = match ctx.parse(&lex) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{source_name}: {e}");
            process::exit(1);
        }
    };
    trace_emit(&args, Pass::Syn, || format!("{} raw nodes", raw.arena.len()));
    if args.until == Some(Phase::Syn) {
        exit_with_diagnostics(&ctx, &source_name, &pre.line_starts);
    }

    let compiled = match ctx.compile(&raw) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{source_name}: {e}");
            process::exit(1);
        }
    };
    trace_emit(&args, Pass::Ast, || {
        format!(
            "{} typed nodes, {} IR words",
            compiled.arena.node_count(),
            compiled.code.len()
        )
    });
    trace_emit(&args, Pass::Sem, || {
        format!(
            "{} bound variables, peak {} live registers",
            compiled.vid_count, compiled.hit
        )
    });
    if args.pretty {
        println!("{}", compiled.pretty_print(ctx.identifiers()));
    }
    if args.until == Some(Phase::Ast) {
        exit_with_diagnostics(&ctx, &source_name, &pre.line_starts);
    }

    let vm = match ctx.run(&compiled) {
        Ok(vm) => vm,
        Err(e) => {
            eprintln!("{source_name}: {e}");
            process::exit(1);
        }
    };
    if args.report_vm_usage {
        eprintln!(
            "{source_name}: {} VM steps, {} peak live registers",
            vm.steps, compiled.hit
        );
    }

    exit_with_diagnostics(&ctx, &source_name, &pre.line_starts);
}

fn wants(set: &[Pass], target: Pass) -> bool {
    set.iter().any(|p| *p == Pass::Pass || *p == target)
}

/// Prints `detail()` to stderr if `--trace` named this pass, to stdout if
/// `--emit` did (both may fire; `detail` runs at most once either way).
fn trace_emit(args: &Cli, pass: Pass, detail: impl FnOnce() -> String) {
    let traced = wants(&args.trace, pass);
    let emitted = wants(&args.emit, pass);
    if !traced && !emitted {
        return;
    }
    let text = detail();
    if traced {
        eprintln!("[trace] {pass:?}: {text}");
    }
    if emitted {
        println!("{pass:?}: {text}");
    }
}

/// Resolves a byte offset to a 1-based `(line, col)` pair via the
/// pre-lexer's line-start table.
fn line_col(line_starts: &[u32], offset: u32) -> (u32, u32) {
    let line = match line_starts.binary_search(&offset) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    let col = offset - line_starts[line];
    ((line + 1) as u32, col + 1)
}

/// Prints every recorded diagnostic (§7's `<source>.<line>:<col> level
/// message` format) and exits 1 if any reached error severity, 0
/// otherwise.
fn exit_with_diagnostics(ctx: &CompilerContext, source_name: &str, line_starts: &[u32]) -> ! {
    for d in ctx.diagnostics().diagnostics() {
        let (line, col) = line_col(line_starts, d.pos.offset());
        eprintln!("{}", d.render(source_name, line, col));
    }
    if ctx.diagnostics().has_errors() {
        process::exit(1);
    }
    process::exit(0);
}

fn print_passes() {
    println!("phases (--until): cmd prelex lex syn ast");
    println!("passes (--emit/--trace): pass lex syn ast sem");
}
