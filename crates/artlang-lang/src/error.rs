use thiserror::Error as ThisError;

/// Error codes prefixed by phase: L = lexer, P = parser, S = semantic, W = lint warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal
    L003, // invalid escape sequence

    // Parser
    P001, // unexpected token
    P002, // missing expected token
    P003, // `return` outside of a function
    P004, // function declaration outside of top level

    // Semantic
    S001, // duplicate function declaration
    S002, // assignment to a read-only variable

    // Lint
    W001, // call to an unknown function
    W002, // entry point declared with parameters
    W003, // both `loop` and `draw` declared
}

impl ErrorCode {
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::W001 | Self::W002 | Self::W003)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::L003 => "L003",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
            Self::S001 => "S001",
            Self::S002 => "S002",
            Self::W001 => "W001",
            Self::W002 => "W002",
            Self::W003 => "W003",
        }
    }
}

/// A compile-time diagnostic with an exact source position.
#[derive(Debug, Clone, ThisError)]
#[error("[{}] line {line}:{column}: {message}", .code.as_str())]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }
}

// ─── Runtime ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// Unknown variable or function name.
    Undefined,
    /// List index outside `[0, len)`.
    Bounds,
    /// Operand or argument of the wrong kind.
    Type,
    /// Wrong number of arguments to a builtin.
    Arity,
    /// Raised by a library call on bad input (e.g. malformed `decrypt` token).
    Raised,
    /// The run was stopped or replaced while this code was suspended.
    Stopped,
    /// Call depth exceeded `EngineConfig::max_call_depth`.
    Overflow,
}

/// One entry of the user-level call trace, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    pub function: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, ThisError)]
#[error("{}", describe(.line, .message))]
pub struct RuntimeError {
    /// 1-based source line, or 0 when unknown.
    pub line: usize,
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub trace: Vec<TraceFrame>,
}

impl RuntimeError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self::with_kind(RuntimeErrorKind::Type, line, message)
    }

    pub fn with_kind(kind: RuntimeErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self { line, kind, message: message.into(), trace: Vec::new() }
    }

    pub fn undefined(line: usize, message: impl Into<String>) -> Self {
        Self::with_kind(RuntimeErrorKind::Undefined, line, message)
    }

    pub fn bounds(line: usize, message: impl Into<String>) -> Self {
        Self::with_kind(RuntimeErrorKind::Bounds, line, message)
    }

    pub fn raised(line: usize, message: impl Into<String>) -> Self {
        Self::with_kind(RuntimeErrorKind::Raised, line, message)
    }

    pub fn stopped() -> Self {
        Self::with_kind(RuntimeErrorKind::Stopped, 0, "execution stopped")
    }

    pub fn is_stopped(&self) -> bool {
        self.kind == RuntimeErrorKind::Stopped
    }

    /// Renders the trace in `at name (sketch:L:C)` form, one frame per line.
    pub fn stack(&self) -> String {
        self.trace
            .iter()
            .map(|f| format!("    at {} (sketch:{}:{})", f.function, f.line, f.column))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn describe(line: &usize, message: &str) -> String {
    if *line == 0 { message.to_string() } else { format!("line {line}: {message}") }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Failure surfaced synchronously by `Engine::execute`.
#[derive(Debug, Clone, ThisError)]
pub enum EngineError {
    #[error("{}", join(.0))]
    Compile(Vec<Error>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl EngineError {
    /// Line of the first failure, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Compile(errs) => errs.first().map(|e| e.line),
            Self::Runtime(e) => (e.line > 0).then_some(e.line),
        }
    }
}

fn join(errors: &[Error]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_error_display_mentions_line() {
        let e = RuntimeError::undefined(7, "undefined variable `x`");
        assert_eq!(e.to_string(), "line 7: undefined variable `x`");
    }

    #[test]
    fn runtime_error_without_line() {
        let e = RuntimeError::raised(0, "boom");
        assert_eq!(e.to_string(), "boom");
    }

    #[test]
    fn warnings_are_not_errors() {
        assert!(!ErrorCode::W001.is_error());
        assert!(ErrorCode::P001.is_error());
    }

    #[test]
    fn stack_lists_frames() {
        let mut e = RuntimeError::new(3, "bad");
        e.trace.push(TraceFrame { function: "helper".into(), line: 3, column: 5 });
        e.trace.push(TraceFrame { function: "setup".into(), line: 9, column: 3 });
        assert_eq!(e.stack(), "    at helper (sketch:3:5)\n    at setup (sketch:9:3)");
    }

    #[test]
    fn engine_error_line() {
        let e = EngineError::Compile(vec![Error::new(ErrorCode::P001, 4, 2, "x")]);
        assert_eq!(e.line(), Some(4));
        let e = EngineError::from(RuntimeError::new(0, "y"));
        assert_eq!(e.line(), None);
    }
}
