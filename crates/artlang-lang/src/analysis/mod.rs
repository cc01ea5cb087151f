pub mod collector;
pub mod validator;


use crate::error::Error;
use crate::namespaces::NamespaceRegistry;
use crate::syntax::ast;
use collector::Collector;
use validator::Validator;
pub use collector::FunctionTable;

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Static checks run before execution:
/// 1. Collector: function table and declaration checks
/// 2. Validator: calls and assignments in every body
///
/// Returns errors and warnings together, in pass order. Use
/// `ErrorCode::is_error` to tell them apart.
pub fn analyze(program: &ast::Program) -> Vec<Error> {
    analyze_with(program, &NamespaceRegistry::standard())
}

pub fn analyze_with(program: &ast::Program, registry: &NamespaceRegistry) -> Vec<Error> {
    let mut all: Vec<Error> = Vec::new();

    // ── Pass 1: declarations ─────────────────────────────────────────────────
    let (table, collect_errors) = Collector::new().collect(program);
    all.extend(collect_errors);

    // ── Pass 2: bodies ───────────────────────────────────────────────────────
    all.extend(Validator::new(&table, registry).validate(program));

    all
}
