//! Shared source-position type, diagnostic sink and error taxonomy used by
//! every pass from the lexer through the IR builder.

mod error;

pub use error::CompileError;

/// Number of bits used for the byte offset in a packed [`Pos`].
pub const OFFSET_BITS: u32 = 26;
const OFFSET_MASK: u32 = (1 << OFFSET_BITS) - 1;
/// Number of bits used for the attribute field in a packed [`Pos`].
pub const ATTR_BITS: u32 = 32 - OFFSET_BITS;
const ATTR_MASK: u8 = (1 << ATTR_BITS) - 1;
/// Top bit of the attribute field: when set, `offset` carries a line number
/// rather than a byte offset (used when no file/line table is available).
const LINE_ONLY_BIT: u8 = 1 << (ATTR_BITS - 1);

/// A source position: a 26-bit byte offset and a 6-bit attribute, packed
/// into one 32-bit word so it can travel alongside tokens and AST nodes
/// without an extra allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Pos(u32);

impl Pos {
    /// Builds a position from an offset (truncated to 26 bits) and an
    /// attribute (truncated to 6 bits).
    #[must_use]
    pub fn new(offset: u32, attr: u8) -> Self {
        Pos(((attr & ATTR_MASK) as u32) << OFFSET_BITS | (offset & OFFSET_MASK))
    }

    #[must_use]
    pub fn offset(self) -> u32 {
        self.0 & OFFSET_MASK
    }

    #[must_use]
    pub fn attr(self) -> u8 {
        ((self.0 >> OFFSET_BITS) & ATTR_MASK as u32) as u8
    }

    #[must_use]
    pub fn is_line_only(self) -> bool {
        self.attr() & LINE_ONLY_BIT != 0
    }

    #[must_use]
    pub fn with_line_only(self, line_only: bool) -> Self {
        let attr = if line_only {
            self.attr() | LINE_ONLY_BIT
        } else {
            self.attr() & !LINE_ONLY_BIT
        };
        Pos::new(self.offset(), attr)
    }

    #[must_use]
    pub fn to_bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        Pos(bits)
    }
}

/// Diagnostic severity, ordered from most to least severe so a configured
/// verbosity threshold can filter with a plain `<=` comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Fatal,
    Assert,
    Error,
    Warn,
    Info,
    Verbose,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Level::Fatal => "fatal",
            Level::Assert => "assert",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Verbose => "verbose",
        };
        f.write_str(s)
    }
}

/// A single recorded diagnostic, pushed to a `DiagSink` in source order.
/// Internal-compiler-error conditions raise `CompileError::Internal`
/// instead, which carries its own call site and aborts the pass outright
/// rather than being recorded here.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub pos: Pos,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(level: Level, pos: Pos, message: impl Into<String>) -> Self {
        Diagnostic {
            level,
            pos,
            message: message.into(),
        }
    }

    /// Renders `<source>.<line>:<col>  <level>  <message>`.
    #[must_use]
    pub fn render(&self, source_name: &str, line: u32, col: u32) -> String {
        format!(
            "{source_name}.{line}:{col}  {}  {}",
            self.level, self.message
        )
    }
}

/// Collects diagnostics in source order, filtering by a configured maximum
/// verbosity and counting errors/warnings to drive the process exit status.
#[derive(Debug, Default)]
pub struct DiagSink {
    max_level: Option<Level>,
    diagnostics: Vec<Diagnostic>,
    errcnt: u32,
    warncnt: u32,
}

impl DiagSink {
    #[must_use]
    pub fn new(max_level: Level) -> Self {
        DiagSink {
            max_level: Some(max_level),
            ..Default::default()
        }
    }

    pub fn push(&mut self, diag: Diagnostic) {
        match diag.level {
            Level::Fatal | Level::Assert | Level::Error => self.errcnt += 1,
            Level::Warn => self.warncnt += 1,
            Level::Info | Level::Verbose => {}
        }
        if self.max_level.is_none_or(|max| diag.level <= max) {
            self.diagnostics.push(diag);
        }
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.errcnt
    }

    #[must_use]
    pub fn warning_count(&self) -> u32 {
        self.warncnt
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errcnt > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_round_trips_offset_and_attr() {
        let p = Pos::new(12345, 0b10_1010 & 0x3f);
        assert_eq!(p.offset(), 12345);
    }

    #[test]
    fn pos_line_only_flag_round_trips() {
        let p = Pos::new(7, 0).with_line_only(true);
        assert!(p.is_line_only());
        assert_eq!(p.offset(), 7);
    }

    #[test]
    fn level_ordering_matches_severity() {
        assert!(Level::Fatal < Level::Error);
        assert!(Level::Error < Level::Warn);
        assert!(Level::Warn < Level::Verbose);
    }

    #[test]
    fn sink_counts_errors_and_warnings() {
        let mut sink = DiagSink::new(Level::Verbose);
        sink.push(Diagnostic::new(Level::Error, Pos::default(), "bad"));
        sink.push(Diagnostic::new(Level::Warn, Pos::default(), "hmm"));
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.warning_count(), 1);
        assert!(sink.has_errors());
    }

    #[test]
    fn sink_filters_below_max_level() {
        let mut sink = DiagSink::new(Level::Warn);
        sink.push(Diagnostic::new(Level::Verbose, Pos::default(), "noisy"));
        assert!(sink.diagnostics().is_empty());
        assert_eq!(sink.error_count(), 0);
    }
}
