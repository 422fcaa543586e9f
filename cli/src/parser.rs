//! Command-line argument parsing (§6's External Interfaces / CLI).
//!
//! Flags map straight onto the phase-gated driver in `main.rs`: whichever
//! phase `--until` names is the last one that runs, regardless of the
//! order flags appear in on the command line.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Pipeline phase names accepted by `--until`, in canonical execution
/// order (`cmd` first, `ast` last before the VM would otherwise run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
#[value(rename_all = "lower")]
pub enum Phase {
    Cmd,
    Prelex,
    Lex,
    Syn,
    Ast,
}

/// Pass names accepted by `--emit`/`--trace`. `Pass` itself is a wildcard
/// meaning "every pass that actually runs".
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum Pass {
    Pass,
    Lex,
    Syn,
    Ast,
    Sem,
}

/// Maximum number of `-I` include directories (§6).
pub const MAX_INCLUDE_DIRS: usize = 64;

#[derive(Parser)]
#[command(
    name = "lunac",
    author,
    version,
    about = "lunac: Lua-family front end (lex, parse, build, emit, run)",
    long_about = "Compiles a single source file (or an inline -c string) through the \
front end's four passes and, unless --until stops it early, runs the resulting IR on \
the bundled virtual machine."
)]
pub struct Cli {
    /// Source file to compile. Mutually exclusive with `-c`; one of the
    /// two must be supplied.
    #[arg(conflicts_with = "inline_src")]
    pub path: Option<PathBuf>,

    /// Compile `<string>` directly instead of reading a file.
    #[arg(short = 'c', value_name = "SOURCE", conflicts_with = "path")]
    pub inline_src: Option<String>,

    /// Halt after the named phase instead of running the program.
    #[arg(long, value_enum)]
    pub until: Option<Phase>,

    /// Dump the named pass's output to stdout. Repeatable; `pass` means
    /// every pass that runs.
    #[arg(long, value_enum, action = clap::ArgAction::Append)]
    pub emit: Vec<Pass>,

    /// Trace the named pass's execution to stderr. Repeatable; `pass`
    /// means every pass that runs.
    #[arg(long, value_enum, action = clap::ArgAction::Append)]
    pub trace: Vec<Pass>,

    /// Pretty-print the reconstructed source once the AST is built.
    #[arg(short = 'P')]
    pub pretty: bool,

    /// Add an include search directory (max 64).
    #[arg(short = 'I', value_name = "DIR", action = clap::ArgAction::Append)]
    pub include_dirs: Vec<PathBuf>,

    /// Raise diagnostic verbosity. A bare `-v` means level 1; `-v 3` sets
    /// it explicitly.
    #[arg(short = 'v', value_name = "LVL", num_args = 0..=1, default_missing_value = "1")]
    pub verbose: Option<u8>,

    /// Suppress all but error-level diagnostics.
    #[arg(short = 'q')]
    pub quiet: bool,

    /// List the available `--until`/`--emit`/`--trace` names and exit.
    #[arg(short = 'L')]
    pub list_passes: bool,

    /// Report peak VM register usage and step count on exit.
    #[arg(short = 'r')]
    pub report_vm_usage: bool,
}
