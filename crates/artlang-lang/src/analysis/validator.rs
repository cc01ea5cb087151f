//! Pass 2: body walk.
//!
//! Visits every statement and expression, top level and function bodies:
//! - calls to names that are neither declared nor built in (W001)
//! - assignment to a read-only pseudo-variable such as `mouseX` (S002)

use crate::error::{Error, ErrorCode};
use crate::namespaces::NamespaceRegistry;
use crate::syntax::ast::*;
use super::collector::FunctionTable;

pub struct Validator<'a> {
    table: &'a FunctionTable,
    registry: &'a NamespaceRegistry,
    pub errors: Vec<Error>,
}

impl<'a> Validator<'a> {
    pub fn new(table: &'a FunctionTable, registry: &'a NamespaceRegistry) -> Self {
        Self { table, registry, errors: Vec::new() }
    }

    pub fn validate(mut self, program: &Program) -> Vec<Error> {
        for item in &program.items {
            match item {
                Item::FnDef(f) => self.check_block(&f.body),
                Item::Stmt(s) => self.check_stmt(s),
            }
        }
        self.errors
    }

    fn check_block(&mut self, stmts: &[Stmt]) {
        for s in stmts {
            self.check_stmt(s);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(d) => {
                self.check_writable(&d.name, &d.span);
                if let Some(init) = &d.initializer {
                    self.check_expr(init);
                }
            }
            Stmt::Assign(a) => {
                match &a.target {
                    AssignTarget::Name(name) => self.check_writable(name, &a.span),
                    AssignTarget::Index { object, index } => {
                        self.check_expr(object);
                        self.check_expr(index);
                    }
                    AssignTarget::Field { object, .. } => self.check_expr(object),
                }
                self.check_expr(&a.value);
            }
            Stmt::If(s) => {
                for (cond, body) in &s.branches {
                    self.check_expr(cond);
                    self.check_block(body);
                }
                if let Some(body) = &s.else_block {
                    self.check_block(body);
                }
            }
            Stmt::For(s) => {
                self.check_writable(&s.var, &s.span);
                self.check_expr(&s.start);
                self.check_expr(&s.stop);
                if let Some(step) = &s.step {
                    self.check_expr(step);
                }
                self.check_block(&s.body);
            }
            Stmt::CFor(s) => {
                if let Some(init) = &s.init {
                    self.check_stmt(init);
                }
                if let Some(cond) = &s.condition {
                    self.check_expr(cond);
                }
                if let Some(step) = &s.step {
                    self.check_stmt(step);
                }
                self.check_block(&s.body);
            }
            Stmt::While(s) => {
                self.check_expr(&s.condition);
                self.check_block(&s.body);
            }
            Stmt::Return(value, _) => {
                if let Some(v) = value {
                    self.check_expr(v);
                }
            }
            Stmt::Expr(e) => self.check_expr(e),
        }
    }

    fn check_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(..) | Expr::Bool(..) | Expr::StringLit(..) | Expr::Nil(_) | Expr::Ident(..) => {}
            Expr::BinOp { left, right, .. } => {
                self.check_expr(left);
                self.check_expr(right);
            }
            Expr::UnOp { operand, .. } => self.check_expr(operand),
            Expr::Call { callee, args, span } => {
                if !self.table.contains(callee) && !self.registry.is_function(callee) {
                    self.errors.push(Error::new(
                        ErrorCode::W001, span.line, span.column,
                        format!("unknown function `{callee}`"),
                    ));
                }
                args.iter().for_each(|a| self.check_expr(a));
            }
            Expr::MethodCall { object, args, .. } => {
                self.check_expr(object);
                args.iter().for_each(|a| self.check_expr(a));
            }
            Expr::Field { object, .. } => self.check_expr(object),
            Expr::Index { object, index, .. } => {
                self.check_expr(object);
                self.check_expr(index);
            }
            Expr::List(items, _) => items.iter().for_each(|i| self.check_expr(i)),
            Expr::Map(entries, _) => entries.iter().for_each(|(_, v)| self.check_expr(v)),
        }
    }

    fn check_writable(&mut self, name: &str, span: &Span) {
        if self.registry.is_read_only(name) {
            self.errors.push(Error::new(
                ErrorCode::S002, span.line, span.column,
                format!("`{name}` is read-only"),
            ));
        }
    }
}
