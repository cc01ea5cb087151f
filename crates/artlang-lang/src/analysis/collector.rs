//! Pass 1: function table.
//!
//! Records every top-level function declaration and checks the declarations
//! themselves:
//! - a name declared twice (S001)
//! - `setup` / `loop` / `draw` declared with parameters (W002)
//! - both `loop` and `draw` declared (W003)

use std::collections::HashMap;

use crate::error::{Error, ErrorCode};
use crate::syntax::ast::*;

/// Entry points the engine calls with no arguments.
pub const ENTRY_POINTS: [&str; 3] = ["setup", "loop", "draw"];

/// Declared user functions by name: parameter count and declaration site.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<String, (usize, Span)>,
}

impl FunctionTable {
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn arity(&self, name: &str) -> Option<usize> {
        self.functions.get(name).map(|(n, _)| *n)
    }
}

pub struct Collector {
    pub table: FunctionTable,
    pub errors: Vec<Error>,
}

impl Collector {
    pub fn new() -> Self {
        Self { table: FunctionTable::default(), errors: Vec::new() }
    }

    pub fn collect(mut self, program: &Program) -> (FunctionTable, Vec<Error>) {
        for f in program.functions() {
            self.collect_fn(f);
        }
        self.check_frame_functions();
        (self.table, self.errors)
    }

    fn collect_fn(&mut self, f: &FnDef) {
        if let Some((_, first)) = self.table.functions.get(&f.name) {
            self.errors.push(Error::new(
                ErrorCode::S001, f.span.line, f.span.column,
                format!("function `{}` is already declared on line {}", f.name, first.line),
            ));
            return;
        }

        if ENTRY_POINTS.contains(&f.name.as_str()) && !f.params.is_empty() {
            self.errors.push(Error::new(
                ErrorCode::W002, f.span.line, f.span.column,
                format!("`{}` is called without arguments; its parameters will be nil", f.name),
            ));
        }

        self.table.functions.insert(f.name.clone(), (f.params.len(), f.span.clone()));
    }

    fn check_frame_functions(&mut self) {
        if !self.table.contains("loop") {
            return;
        }
        let Some((_, draw)) = self.table.functions.get("draw") else { return };
        self.errors.push(Error::new(
            ErrorCode::W003, draw.line, draw.column,
            "both `loop` and `draw` are declared; only `loop` will run",
        ));
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
