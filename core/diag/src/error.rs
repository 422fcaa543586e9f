use crate::Pos;

/// Crate-boundary error taxonomy shared by the lexer, parser, AST builder
/// and IR VM. Each pass returns this directly; the orchestration crate
/// wraps it in `anyhow`.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error at {pos:?}: {message}")]
    Syntax { pos: Pos, message: String },

    #[error("semantic error at {pos:?}: {message}")]
    Semantic { pos: Pos, message: String },

    #[error("resource error: {message}")]
    Resource { message: String },

    #[error("internal compiler error ({site_file}:{site_line}) at {pos:?}: {message}")]
    Internal {
        pos: Pos,
        message: String,
        site_file: &'static str,
        site_line: u32,
    },
}

impl CompileError {
    #[must_use]
    pub fn syntax(pos: Pos, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            pos,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn semantic(pos: Pos, message: impl Into<String>) -> Self {
        CompileError::Semantic {
            pos,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn resource(message: impl Into<String>) -> Self {
        CompileError::Resource {
            message: message.into(),
        }
    }
}

/// Raises a [`CompileError::Internal`] carrying the call site, mirroring
/// the original compiler's self-coordinated assertion macros.
#[macro_export]
macro_rules! ice {
    ($pos:expr, $($arg:tt)*) => {
        $crate::CompileError::Internal {
            pos: $pos,
            message: format!($($arg)*),
            site_file: file!(),
            site_line: line!(),
        }
    };
}
