pub mod syntax;
pub mod types;
pub mod runtime;
pub mod analysis;
pub mod error;
pub mod namespaces;
pub mod host;
pub mod config;
pub mod diagnostics;
pub mod format;

pub use types::draw::{Color, DrawCommand, ShapeData, ShapeDesc, Style, TextBaseline};
pub use error::{EngineError, Error, ErrorCode, RuntimeError, RuntimeErrorKind};
pub use syntax::token::{Token, TokenKind};
pub use runtime::value::{Map, Value};
pub use runtime::input::{InputHandle, MouseButton};
pub use runtime::scheduler::{Engine, EngineStatus};
pub use host::{Host, InputFuture, Message, MessageKind, RecordingHost};
pub use config::{EngineConfig, ENGINE_STACK_SIZE};
pub use format::format_source;

use crate::syntax::ast::Program;

// ─── Public API ───────────────────────────────────────────────────────────────

/// Lex, parse and analyze a sketch.
///
/// On success returns the program together with any lint warnings. Fails
/// with the lexer, parser or analysis errors, whichever stage fails first.
pub fn compile(source: &str) -> Result<(Program, Vec<Error>), Vec<Error>> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    let program = syntax::parser::Parser::new(tokens).parse()?;

    let (errors, warnings): (Vec<_>, Vec<_>) = analysis::analyze(&program)
        .into_iter()
        .partition(|e| e.code.is_error());

    if errors.is_empty() {
        Ok((program, warnings))
    } else {
        Err(errors)
    }
}
