//! Async tree-walking interpreter.
//! Library calls are dispatched through the NamespaceRegistry; `delay` and
//! `input` are the only awaits. Side effects are flushed to the host after
//! every library call, so nothing is buffered across a suspension.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use tokio::sync::Notify;

use crate::config::EngineConfig;
use crate::error::{RuntimeError, RuntimeErrorKind, TraceFrame};
use crate::host::Host;
use crate::namespaces::io::{self, Suspension};
use crate::namespaces::lists::checked_index;
use crate::namespaces::{NamespaceRegistry, RuntimeState};
use crate::runtime::value::{Map, Value, values_equal};
use crate::syntax::ast::{self, AssignTarget, BinOp, Expr, FnDef, Item, Span, Stmt, UnOp};
use crate::types::binop_registry::BinopRegistry;
use crate::types::registry::TypeRegistry;

/// Boxed future returned by the recursive evaluator.
pub type Eval<'a, T> = Pin<Box<dyn Future<Output = Result<T, RuntimeError>> + 'a>>;

/// How a statement finished.
enum Flow {
    Normal,
    Return(Value),
}

/// One active user function call.
struct Frame {
    function: String,
    params: HashMap<String, Value>,
    /// Statement currently executing in this call.
    pos: Span,
}

// ─── Interpreter ──────────────────────────────────────────────────────────────

pub struct Interpreter {
    top_level: Vec<Stmt>,
    functions: HashMap<String, FnDef>,
    registry: NamespaceRegistry,
    binops: BinopRegistry,
    types: TypeRegistry,
    globals: RefCell<HashMap<String, Value>>,
    frames: RefCell<Vec<Frame>>,
    state: RefCell<RuntimeState>,
    host: Rc<dyn Host>,
    cancelled: Cell<bool>,
    /// Wakes a pending `delay` or `input` when the run is cancelled.
    stop: Notify,
    max_call_depth: usize,
}

impl Interpreter {
    pub fn new(program: ast::Program, state: RuntimeState, host: Rc<dyn Host>, config: &EngineConfig) -> Self {
        let mut top_level = Vec::new();
        let mut functions = HashMap::new();
        for item in program.items {
            match item {
                // duplicates are rejected at compile time; first one wins otherwise
                Item::FnDef(f) => { functions.entry(f.name.clone()).or_insert(f); }
                Item::Stmt(s) => top_level.push(s),
            }
        }
        Self {
            top_level,
            functions,
            registry: NamespaceRegistry::standard(),
            binops: BinopRegistry::default(),
            types: TypeRegistry::default(),
            globals: RefCell::new(HashMap::new()),
            frames: RefCell::new(Vec::new()),
            state: RefCell::new(state),
            host,
            cancelled: Cell::new(false),
            stop: Notify::new(),
            max_call_depth: config.max_call_depth,
        }
    }

    fn err(&self, line: usize, msg: impl Into<String>) -> RuntimeError {
        RuntimeError::new(line, msg)
    }

    // ─── Lifecycle ────────────────────────────────────────────────────────────

    /// Makes every pending and future suspension fail with a `Stopped` error.
    pub fn cancel(&self) {
        self.cancelled.set(true);
        self.stop.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    fn check_cancelled(&self) -> Result<(), RuntimeError> {
        if self.cancelled.get() { Err(RuntimeError::stopped()) } else { Ok(()) }
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Name of the per-frame entry point: `loop` wins over `draw`.
    pub fn frame_function(&self) -> Option<&'static str> {
        ["loop", "draw"].into_iter().find(|n| self.has_function(n))
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name).cloned()
    }

    pub fn frame_count(&self) -> u64 {
        self.state.borrow().frame_count
    }

    /// Runs `f` against the run state. Must not be held across an await.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut RuntimeState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    /// Sends queued drawing, messages and resizes to the host.
    pub fn flush(&self) {
        let outbox = self.state.borrow_mut().take_outbox();
        if !outbox.is_empty() {
            outbox.deliver(self.host.as_ref());
        }
    }

    // ─── Entry points ─────────────────────────────────────────────────────────

    /// Top-level statements, in source order.
    pub async fn run_top_level(&self) -> Result<(), RuntimeError> {
        for stmt in &self.top_level {
            if let Flow::Return(_) = self.exec_stmt(stmt).await? {
                break;
            }
        }
        Ok(())
    }

    /// Calls a parameterless entry point such as `setup` or `loop`.
    /// Returns `false` when the sketch does not declare it.
    pub async fn call_entry(&self, name: &str) -> Result<bool, RuntimeError> {
        let Some(f) = self.functions.get(name) else {
            return Ok(false);
        };
        self.call_user(f, Vec::new(), f.span.line).await?;
        Ok(true)
    }

    // ─── Variables ────────────────────────────────────────────────────────────

    /// Parameters, then globals, then pseudo-variables, then constants.
    fn read_var(&self, name: &str, span: &Span) -> Result<Value, RuntimeError> {
        let param = self.frames.borrow().last().and_then(|f| f.params.get(name).cloned());
        if let Some(v) = param {
            return Ok(v);
        }
        let global = self.globals.borrow().get(name).cloned();
        if let Some(v) = global {
            return Ok(v);
        }
        let pseudo = self.registry.get_variable(name, &self.state.borrow());
        pseudo
            .or_else(|| self.registry.get_constant(name))
            .ok_or_else(|| RuntimeError::undefined(span.line, format!("undefined variable `{name}`")))
    }

    fn is_defined(&self, name: &str) -> bool {
        let is_param = self.frames.borrow().last().is_some_and(|f| f.params.contains_key(name));
        is_param || self.globals.borrow().contains_key(name)
    }

    /// Writes the current call's parameter when `name` is one, else the global.
    fn assign_var(&self, name: &str, value: Value) {
        let mut frames = self.frames.borrow_mut();
        if let Some(slot) = frames.last_mut().and_then(|f| f.params.get_mut(name)) {
            *slot = value;
            return;
        }
        drop(frames);
        self.globals.borrow_mut().insert(name.to_string(), value);
    }

    fn set_pos(&self, span: &Span) {
        if let Some(f) = self.frames.borrow_mut().last_mut() {
            f.pos = span.clone();
        }
    }

    // ─── Statement executor ───────────────────────────────────────────────────

    fn exec_block<'a>(&'a self, stmts: &'a [Stmt]) -> Eval<'a, Flow> {
        Box::pin(async move {
            for stmt in stmts {
                if let Flow::Return(v) = self.exec_stmt(stmt).await? {
                    return Ok(Flow::Return(v));
                }
            }
            Ok(Flow::Normal)
        })
    }

    fn exec_stmt<'a>(&'a self, stmt: &'a Stmt) -> Eval<'a, Flow> {
        Box::pin(async move {
            self.set_pos(stmt.span());
            match stmt {
                Stmt::VarDecl(v) => match &v.initializer {
                    Some(init) => {
                        let val = self.eval_expr(init).await?;
                        self.assign_var(&v.name, val);
                    }
                    // `var x` never clobbers an existing value
                    None => {
                        if !self.is_defined(&v.name) {
                            self.assign_var(&v.name, Value::Null);
                        }
                    }
                },

                Stmt::Assign(a) => self.exec_assign(a).await?,

                Stmt::If(i) => {
                    for (cond, block) in &i.branches {
                        if self.eval_expr(cond).await?.is_truthy() {
                            return self.exec_block(block).await;
                        }
                    }
                    if let Some(block) = &i.else_block {
                        return self.exec_block(block).await;
                    }
                }

                Stmt::For(f) => {
                    let line = f.span.line;
                    let start = self.eval_number(&f.start, "for start").await?;
                    let stop = self.eval_number(&f.stop, "for limit").await?;
                    let step = match &f.step {
                        Some(e) => self.eval_number(e, "for step").await?,
                        None => 1.0,
                    };
                    if step == 0.0 || step.is_nan() {
                        return Err(self.err(line, "`for` step must not be 0"));
                    }
                    let mut i = start;
                    while (step > 0.0 && i <= stop) || (step < 0.0 && i >= stop) {
                        self.assign_var(&f.var, Value::Number(i));
                        if let Flow::Return(v) = self.exec_block(&f.body).await? {
                            return Ok(Flow::Return(v));
                        }
                        i += step;
                    }
                }

                Stmt::CFor(f) => {
                    if let Some(init) = &f.init {
                        self.exec_stmt(init).await?;
                    }
                    loop {
                        if let Some(cond) = &f.condition {
                            if !self.eval_expr(cond).await?.is_truthy() {
                                break;
                            }
                        }
                        if let Flow::Return(v) = self.exec_block(&f.body).await? {
                            return Ok(Flow::Return(v));
                        }
                        if let Some(step) = &f.step {
                            self.exec_stmt(step).await?;
                        }
                    }
                }

                Stmt::While(w) => {
                    while self.eval_expr(&w.condition).await?.is_truthy() {
                        if let Flow::Return(v) = self.exec_block(&w.body).await? {
                            return Ok(Flow::Return(v));
                        }
                    }
                }

                Stmt::Return(expr, _) => {
                    let val = match expr {
                        Some(e) => self.eval_expr(e).await?,
                        None => Value::Null,
                    };
                    return Ok(Flow::Return(val));
                }

                Stmt::Expr(e) => {
                    self.eval_expr(e).await?;
                }
            }
            Ok(Flow::Normal)
        })
    }

    async fn exec_assign(&self, a: &ast::Assign) -> Result<(), RuntimeError> {
        let line = a.span.line;
        match &a.target {
            AssignTarget::Name(name) => {
                let val = match a.op {
                    Some(op) => {
                        let current = self.read_var(name, &a.span)?;
                        let rhs = self.eval_expr(&a.value).await?;
                        self.apply_binop(op, current, rhs, line)?
                    }
                    None => self.eval_expr(&a.value).await?,
                };
                self.assign_var(name, val);
            }
            AssignTarget::Index { object, index } => {
                let obj = self.eval_expr(object).await?;
                let idx = self.eval_expr(index).await?;
                let val = match a.op {
                    Some(op) => {
                        let current = self.index_get(&obj, &idx, line)?;
                        let rhs = self.eval_expr(&a.value).await?;
                        self.apply_binop(op, current, rhs, line)?
                    }
                    None => self.eval_expr(&a.value).await?,
                };
                self.index_set(&obj, &idx, val, line)?;
            }
            AssignTarget::Field { object, field } => {
                let obj = self.eval_expr(object).await?;
                let val = match a.op {
                    Some(op) => {
                        let current = self.field_get(&obj, field, line)?;
                        let rhs = self.eval_expr(&a.value).await?;
                        self.apply_binop(op, current, rhs, line)?
                    }
                    None => self.eval_expr(&a.value).await?,
                };
                match &obj {
                    Value::Map(map) => map.borrow_mut().insert(field.clone(), val),
                    other => {
                        return Err(self.err(line, format!(
                            "cannot set field `{field}` on {}", other.type_name()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    // ─── Expression evaluator ─────────────────────────────────────────────────

    pub fn eval_expr<'a>(&'a self, expr: &'a Expr) -> Eval<'a, Value> {
        Box::pin(async move {
            match expr {
                Expr::Number(n, _)    => Ok(Value::Number(*n)),
                Expr::Bool(b, _)      => Ok(Value::Bool(*b)),
                Expr::StringLit(s, _) => Ok(Value::Str(s.clone())),
                Expr::Nil(_)          => Ok(Value::Null),
                Expr::Ident(name, span) => self.read_var(name, span),

                // `and` / `or` short-circuit and yield the deciding operand
                Expr::BinOp { left, op: BinOp::And, right, .. } => {
                    let l = self.eval_expr(left).await?;
                    if !l.is_truthy() { return Ok(l); }
                    self.eval_expr(right).await
                }
                Expr::BinOp { left, op: BinOp::Or, right, .. } => {
                    let l = self.eval_expr(left).await?;
                    if l.is_truthy() { return Ok(l); }
                    self.eval_expr(right).await
                }
                Expr::BinOp { left, op, right, span } => {
                    let l = self.eval_expr(left).await?;
                    let r = self.eval_expr(right).await?;
                    self.apply_binop(*op, l, r, span.line)
                }

                Expr::UnOp { op, operand, span } => {
                    let v = self.eval_expr(operand).await?;
                    match op {
                        UnOp::Not => Ok(Value::Bool(!v.is_truthy())),
                        UnOp::Neg => match v {
                            Value::Number(n) => Ok(Value::Number(-n)),
                            other => Err(self.err(span.line, format!(
                                "unary `-` not supported on {}", other.type_name()
                            ))),
                        },
                    }
                }

                Expr::Call { callee, args, span } => {
                    let arg_vals = self.eval_args(args).await?;
                    self.call_function(callee, arg_vals, span).await
                }

                Expr::MethodCall { object, method, args, span } => {
                    let obj = self.eval_expr(object).await?;
                    let arg_vals = self.eval_args(args).await?;
                    self.call_method(obj, method, arg_vals, span.line)
                }

                Expr::Field { object, field, span } => {
                    let obj = self.eval_expr(object).await?;
                    self.field_get(&obj, field, span.line)
                }

                Expr::Index { object, index, span } => {
                    let obj = self.eval_expr(object).await?;
                    let idx = self.eval_expr(index).await?;
                    self.index_get(&obj, &idx, span.line)
                }

                Expr::List(items, _) => Ok(Value::list(self.eval_args(items).await?)),

                Expr::Map(entries, _) => {
                    let mut map = Map::new();
                    for (key, value) in entries {
                        let v = self.eval_expr(value).await?;
                        map.insert(key.clone(), v);
                    }
                    Ok(Value::map(map))
                }
            }
        })
    }

    async fn eval_args(&self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        let mut vals = Vec::with_capacity(args.len());
        for a in args {
            vals.push(self.eval_expr(a).await?);
        }
        Ok(vals)
    }

    async fn eval_number(&self, expr: &Expr, what: &str) -> Result<f64, RuntimeError> {
        match self.eval_expr(expr).await? {
            Value::Number(n) => Ok(n),
            other => Err(self.err(expr.span().line, format!(
                "{what} must be a number, got {}", other.type_name()
            ))),
        }
    }

    fn apply_binop(&self, op: BinOp, l: Value, r: Value, line: usize) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Eq    => return Ok(Value::Bool(values_equal(&l, &r))),
            BinOp::NotEq => return Ok(Value::Bool(!values_equal(&l, &r))),
            _ => {}
        }
        let (lt, rt) = (l.type_name(), r.type_name());
        self.binops.eval(op, l, r, line).unwrap_or_else(|| {
            Err(self.err(line, format!("operator `{}` not supported for {lt} and {rt}", op.symbol())))
        })
    }

    // ─── Members ──────────────────────────────────────────────────────────────

    fn field_get(&self, obj: &Value, field: &str, line: usize) -> Result<Value, RuntimeError> {
        match obj {
            Value::Map(map) => Ok(map.borrow().get(field).cloned().unwrap_or(Value::Null)),
            Value::Namespace(ns) => self.registry
                .get(ns)
                .and_then(|p| p.get_constant(field))
                .ok_or_else(|| RuntimeError::undefined(line, format!("`{ns}` has no value `{field}`"))),
            other => self.types.get_field(other, field).ok_or_else(|| {
                self.err(line, format!("{} has no field `{field}`", other.type_name()))
            }),
        }
    }

    fn index_get(&self, obj: &Value, idx: &Value, line: usize) -> Result<Value, RuntimeError> {
        match obj {
            Value::List(items) => {
                let items = items.borrow();
                Ok(items[checked_index(idx, items.len(), line)?].clone())
            }
            Value::Map(map) => Ok(map.borrow().get(&idx.to_string()).cloned().unwrap_or(Value::Null)),
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = checked_index(idx, chars.len(), line)?;
                Ok(Value::Str(chars[i].to_string()))
            }
            other => Err(self.err(line, format!("cannot index {}", other.type_name()))),
        }
    }

    fn index_set(&self, obj: &Value, idx: &Value, val: Value, line: usize) -> Result<(), RuntimeError> {
        match obj {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let i = checked_index(idx, items.len(), line)?;
                items[i] = val;
            }
            Value::Map(map) => map.borrow_mut().insert(idx.to_string(), val),
            other => return Err(self.err(line, format!("cannot assign into {}", other.type_name()))),
        }
        Ok(())
    }

    fn call_method(&self, obj: Value, method: &str, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
        if let Value::Namespace(ns) = &obj {
            let Some(provider) = self.registry.get(ns) else {
                return Err(RuntimeError::undefined(line, format!("unknown namespace `{ns}`")));
            };
            let result = provider.call(method, &args, &mut self.state.borrow_mut(), line);
            self.flush();
            return result?.ok_or_else(|| {
                RuntimeError::undefined(line, format!("undefined function `{ns}.{method}`"))
            });
        }
        self.types.call_method(&obj, method, &args, line).unwrap_or_else(|| {
            Err(self.err(line, format!("{} has no method `{method}`", obj.type_name())))
        })
    }

    // ─── Call dispatch ────────────────────────────────────────────────────────

    /// User functions first, then the suspending built-ins, then the library.
    async fn call_function(&self, name: &str, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
        let line = span.line;
        if let Some(f) = self.functions.get(name) {
            return self.call_user(f, args, line).await;
        }

        if let Some(suspension) = io::suspension(name, &args, line)? {
            self.check_cancelled()?;
            self.flush();
            self.host.present();
            return match suspension {
                Suspension::Delay(wait) => {
                    log::trace!("delay {wait:?} at line {line}");
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = self.stop.notified() => {}
                    }
                    self.check_cancelled()?;
                    Ok(Value::Null)
                }
                Suspension::Input(prompt) => {
                    let reply = tokio::select! {
                        reply = self.host.request_input(&prompt) => reply,
                        _ = self.stop.notified() => None,
                    };
                    self.check_cancelled()?;
                    self.host.message(io::input_echo(&reply));
                    Ok(reply.map_or(Value::Null, Value::Str))
                }
            };
        }

        let result = self.registry.call_any(name, &args, &mut self.state.borrow_mut(), line);
        self.flush();
        result?.ok_or_else(|| RuntimeError::undefined(line, format!("undefined function `{name}`")))
    }

    /// Extra arguments are ignored and missing ones are `nil`.
    fn call_user<'a>(&'a self, f: &'a FnDef, args: Vec<Value>, line: usize) -> Eval<'a, Value> {
        Box::pin(async move {
            if self.frames.borrow().len() >= self.max_call_depth {
                return Err(RuntimeError::with_kind(
                    RuntimeErrorKind::Overflow,
                    line,
                    format!("maximum call depth of {} exceeded in `{}`", self.max_call_depth, f.name),
                ));
            }

            let mut args = args.into_iter();
            let params = f.params
                .iter()
                .map(|p| (p.name.clone(), args.next().unwrap_or(Value::Null)))
                .collect();
            self.frames.borrow_mut().push(Frame { function: f.name.clone(), params, pos: f.span.clone() });

            let result = self.exec_block(&f.body).await;
            let frame = self.frames.borrow_mut().pop();

            match result {
                Ok(Flow::Return(v)) => Ok(v),
                Ok(Flow::Normal) => Ok(Value::Null),
                Err(mut e) => {
                    if let (Some(frame), false) = (frame, e.is_stopped()) {
                        e.trace.push(TraceFrame {
                            function: frame.function,
                            line: frame.pos.line,
                            column: frame.pos.column,
                        });
                    }
                    Err(e)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MessageKind, RecordingHost};

    fn interp(src: &str) -> (Interpreter, Rc<RecordingHost>) {
        let host = Rc::new(RecordingHost::new());
        let program = match crate::compile(src) {
            Ok((program, _)) => program,
            Err(errs) => panic!("compile failed: {errs:?}"),
        };
        let config = EngineConfig::default();
        let state = RuntimeState::new(&config, (0.0, 0.0));
        let dyn_host: Rc<dyn Host> = host.clone();
        (Interpreter::new(program, state, dyn_host, &config), host)
    }

    async fn run(src: &str) -> (Interpreter, Rc<RecordingHost>, Result<(), RuntimeError>) {
        let (it, host) = interp(src);
        let result = async {
            it.run_top_level().await?;
            it.call_entry("setup").await?;
            Ok(())
        }.await;
        (it, host, result)
    }

    /// `run` on a thread sized like the app's engine thread. Deep recursion
    /// needs more than the test harness's default stack.
    fn run_on_engine_stack(src: &str) -> (Vec<String>, Result<(), (RuntimeErrorKind, String)>) {
        let src = src.to_string();
        std::thread::Builder::new()
            .stack_size(crate::config::ENGINE_STACK_SIZE)
            .spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
                rt.block_on(async {
                    let (_, host, r) = run(&src).await;
                    (host.texts(MessageKind::Info), r.map_err(|e| (e.kind, e.message)))
                })
            })
            .unwrap()
            .join()
            .unwrap()
    }

    #[tokio::test]
    async fn globals_leak_out_of_blocks() {
        let (it, _, r) = run("function setup() { if true { y = 2 } while y < 5 { y = y + 1 } }").await;
        assert!(r.is_ok());
        assert_eq!(it.global("y"), Some(Value::Number(5.0)));
    }

    #[tokio::test]
    async fn params_shadow_globals_without_leaking() {
        let src = "x = 1\nfunction f(x) { x = x + 10; return x }\nfunction setup() { r = f(5) }";
        let (it, _, r) = run(src).await;
        assert!(r.is_ok());
        assert_eq!(it.global("x"), Some(Value::Number(1.0)));
        assert_eq!(it.global("r"), Some(Value::Number(15.0)));
    }

    #[tokio::test]
    async fn return_leaves_only_the_function() {
        let src = "function f() { i = 0; while true { i = i + 1; if i == 3 { return i } } }\n\
                   function setup() { a = f(); b = 1 }";
        let (it, _, r) = run(src).await;
        assert!(r.is_ok());
        assert_eq!(it.global("a"), Some(Value::Number(3.0)));
        assert_eq!(it.global("b"), Some(Value::Number(1.0)));
    }

    #[tokio::test]
    async fn missing_args_are_nil_and_extra_ignored() {
        let src = "function f(a, b) { return b }\nfunction setup() { p = f(1); q = f(1, 2, 3) }";
        let (it, _, r) = run(src).await;
        assert!(r.is_ok());
        assert_eq!(it.global("p"), Some(Value::Null));
        assert_eq!(it.global("q"), Some(Value::Number(2.0)));
    }

    #[tokio::test]
    async fn counted_for_is_inclusive_and_counts_down() {
        let src = "s = 0\nfor i = 1, 4 do s = s + i end\nt = \"\"\nfor j = 3, 1, -1 do t = t + j end";
        let (it, _, r) = run(src).await;
        assert!(r.is_ok());
        assert_eq!(it.global("s"), Some(Value::Number(10.0)));
        assert_eq!(it.global("t"), Some(Value::str("321")));
        assert_eq!(it.global("i"), Some(Value::Number(4.0)));
    }

    #[tokio::test]
    async fn zero_step_is_an_error() {
        let (_, _, r) = run("for i = 1, 2, 0 do end").await;
        assert!(r.is_err());
    }

    #[tokio::test]
    async fn undefined_names_are_reported() {
        let (_, _, r) = run("function setup() { print(nope) }").await;
        let e = r.unwrap_err();
        assert_eq!(e.kind, RuntimeErrorKind::Undefined);
        assert_eq!(e.message, "undefined variable `nope`");

        let (_, _, r) = run("function setup() {\n  ghost(1)\n}").await;
        let e = r.unwrap_err();
        assert_eq!(e.message, "undefined function `ghost`");
        assert_eq!(e.line, 2);
        assert_eq!(e.stack(), "    at setup (sketch:2:3)");
    }

    #[tokio::test]
    async fn trace_lists_nested_calls() {
        let src = "function inner() {\n  return 1 / 0\n}\nfunction setup() {\n  inner()\n}";
        let (_, _, r) = run(src).await;
        let e = r.unwrap_err();
        assert_eq!(e.trace.iter().map(|f| f.function.as_str()).collect::<Vec<_>>(), vec!["inner", "setup"]);
        assert_eq!(e.trace[1].line, 5);
    }

    #[tokio::test]
    async fn print_reaches_the_host() {
        let (_, host, r) = run("function setup() { print(\"ok\", 1 + 1) }").await;
        assert!(r.is_ok());
        assert_eq!(host.texts(MessageKind::Info), vec!["ok 2"]);
    }

    #[tokio::test]
    async fn lists_maps_and_members() {
        let src = "xs = [1, 2]\nxs.push(3)\nxs[0] = 10\nxs[1] += 5\n\
                   p = {x: 1, \"y\": 2}\np.x += 1\np.z = xs.length\nn = p.w\nc = \"abc\"[1]";
        let (it, _, r) = run(src).await;
        assert!(r.is_ok(), "{r:?}");
        assert_eq!(it.global("xs").map(|v| v.to_string()), Some("[10, 7, 3]".into()));
        assert_eq!(it.global("p").map(|v| v.to_string()), Some("{x: 2, y: 2, z: 3}".into()));
        assert_eq!(it.global("n"), Some(Value::Null));
        assert_eq!(it.global("c"), Some(Value::str("b")));
    }

    #[tokio::test]
    async fn index_out_of_bounds() {
        let (_, _, r) = run("xs = [1]\ny = xs[1]").await;
        assert_eq!(r.unwrap_err().kind, RuntimeErrorKind::Bounds);
    }

    #[tokio::test]
    async fn logic_yields_operands() {
        let (it, _, r) = run("a = nil or \"d\"\nb = 0 and x\nc = not 0\nd = 1 != 2 and 3 ~= 3").await;
        assert!(r.is_ok());
        assert_eq!(it.global("a"), Some(Value::str("d")));
        assert_eq!(it.global("b"), Some(Value::Number(0.0)));
        assert_eq!(it.global("c"), Some(Value::Bool(true)));
        assert_eq!(it.global("d"), Some(Value::Bool(false)));
    }

    #[tokio::test]
    async fn math_namespace_calls() {
        let (it, _, r) = run("a = math.sqrt(16) + math.PI * 0\nb = floor(2.7)").await;
        assert!(r.is_ok());
        assert_eq!(it.global("a"), Some(Value::Number(4.0)));
        assert_eq!(it.global("b"), Some(Value::Number(2.0)));
    }

    #[tokio::test]
    async fn user_function_shadows_builtin() {
        let (it, _, r) = run("function random() { return 4 }\nfunction setup() { r = random() }").await;
        assert!(r.is_ok());
        assert_eq!(it.global("r"), Some(Value::Number(4.0)));
    }

    #[test]
    fn recursion_limit() {
        let (_, r) = run_on_engine_stack("function f(n) { return f(n + 1) }\nfunction setup() { f(0) }");
        let (kind, message) = r.unwrap_err();
        assert_eq!(kind, RuntimeErrorKind::Overflow);
        assert_eq!(message, "maximum call depth of 100 exceeded in `f`");
    }

    #[test]
    fn deep_recursion_below_the_limit_finishes() {
        let src = "function fact(n) {\n  if n <= 1 { return 1 }\n  return n * fact(n - 1)\n}\n\
                   function setup() { print(fact(60) == fact(59) * 60, fact(10)) }";
        let (printed, r) = run_on_engine_stack(src);
        assert!(r.is_ok(), "{r:?}");
        assert_eq!(printed, vec!["true 3628800"]);
    }

    #[tokio::test]
    async fn mismatched_operands() {
        let (_, _, r) = run("a = [1] - 1").await;
        assert_eq!(r.unwrap_err().message, "operator `-` not supported for list and number");
        let (_, _, r) = run("a = 1 < \"2\"").await;
        assert!(r.is_err());
    }

    #[tokio::test]
    async fn input_resumes_with_reply() {
        let host = Rc::new(RecordingHost::with_replies([Some("Ada"), None]));
        let program = crate::compile("name = input(\"Name?\")\nother = input(\"Again?\")").map(|(p, _)| p);
        let Ok(program) = program else { panic!("compile failed") };
        let config = EngineConfig::default();
        let dyn_host: Rc<dyn Host> = host.clone();
        let it = Interpreter::new(program, RuntimeState::new(&config, (0.0, 0.0)), dyn_host, &config);
        it.run_top_level().await.unwrap();
        assert_eq!(it.global("name"), Some(Value::str("Ada")));
        assert_eq!(it.global("other"), Some(Value::Null));
        assert_eq!(host.prompts(), vec!["Name?", "Again?"]);
        assert_eq!(host.texts(MessageKind::Info), vec!["Input: Ada"]);
        assert_eq!(host.texts(MessageKind::Warning), vec!["Input cancelled"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_suspends_without_blocking() {
        let (it, _) = interp("a = 1\ndelay(2)\na = 2");
        let start = tokio::time::Instant::now();
        it.run_top_level().await.unwrap();
        assert!(start.elapsed() >= std::time::Duration::from_secs(2));
        assert_eq!(it.global("a"), Some(Value::Number(2.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_after_suspension() {
        let (it, _) = interp("a = 1\ndelay(1)\na = 2");
        it.cancel();
        let e = it.run_top_level().await.unwrap_err();
        assert!(e.is_stopped());
        assert_eq!(it.global("a"), Some(Value::Number(1.0)));
    }
}
