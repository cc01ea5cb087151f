use crate::config::EngineConfig;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::host::{Host, Message};
use crate::runtime::input::{ButtonRegistry, FrameInput};
use crate::types::draw::{Color, DrawCommand, ShapeData, ShapeDesc, Style};
use crate::types::mat::{M3, m3_identity};
use crate::Value;

pub mod canvas;
pub mod cipher;
pub mod input;
pub mod io;
pub mod lists;
pub mod math;

// ─── Runtime state ────────────────────────────────────────────────────────────

/// Drawing context saved by `push()` and restored by `pop()`.
#[derive(Debug, Clone)]
pub struct SavedContext {
    pub style: Style,
    pub transform: M3,
    pub text_size: f64,
}

/// Side effects produced by library calls, flushed to the host by the
/// interpreter after every call.
#[derive(Debug, Default)]
pub struct Outbox {
    pub commands: Vec<DrawCommand>,
    pub messages: Vec<Message>,
    pub resized: Option<(f64, f64)>,
}

impl Outbox {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.messages.is_empty() && self.resized.is_none()
    }

    /// Hands everything to the host: resize first, then drawing, then messages.
    pub fn deliver(self, host: &dyn Host) {
        if let Some((w, h)) = self.resized {
            host.resize(w, h);
        }
        for cmd in self.commands {
            host.draw(cmd);
        }
        for msg in self.messages {
            host.message(msg);
        }
    }
}

/// Interpreter-level state passed to every namespace call. One instance per
/// run; `execute` replaces it wholesale.
#[derive(Debug)]
pub struct RuntimeState {
    pub width: f64,
    pub height: f64,
    pub style: Style,
    pub transform: M3,
    pub text_size: f64,
    pub saved: Vec<SavedContext>,
    pub input: FrameInput,
    pub buttons: ButtonRegistry,
    pub frame_count: u64,
    outbox: Outbox,
}

impl RuntimeState {
    /// Fresh run state: default canvas cleared to white, default paint.
    pub fn new(config: &EngineConfig, mouse: (f64, f64)) -> Self {
        let mut state = Self {
            width: config.canvas_width,
            height: config.canvas_height,
            style: Style::default(),
            transform: m3_identity(),
            text_size: config.text_size,
            saved: Vec::new(),
            input: FrameInput::starting_at(mouse),
            buttons: ButtonRegistry::default(),
            frame_count: 0,
            outbox: Outbox::default(),
        };
        state.outbox.resized = Some((state.width, state.height));
        state.clear(Color::WHITE);
        state
    }

    pub fn clear(&mut self, color: Color) {
        self.outbox.commands.push(DrawCommand::Clear { width: self.width, height: self.height, color });
    }

    /// Emits a shape with the current style and transform.
    pub fn draw(&mut self, desc: ShapeDesc) {
        self.draw_styled(desc, self.style.clone());
    }

    pub fn draw_styled(&mut self, desc: ShapeDesc, style: Style) {
        let shape = ShapeData::new(desc, style).with_transform(self.transform);
        self.outbox.commands.push(DrawCommand::Shape(shape));
    }

    pub fn say(&mut self, msg: Message) {
        self.outbox.messages.push(msg);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.outbox.resized = Some((width, height));
    }

    pub fn take_outbox(&mut self) -> Outbox {
        std::mem::take(&mut self.outbox)
    }
}

// ─── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportKind {
    Function,
    Constant,
    /// Read-only per-frame value such as `mouseX`.
    Variable,
}

#[derive(Debug, Clone)]
pub struct Export {
    pub name: &'static str,
    pub kind: ExportKind,
}

impl Export {
    pub const fn function(name: &'static str) -> Self {
        Self { name, kind: ExportKind::Function }
    }

    pub const fn constant(name: &'static str) -> Self {
        Self { name, kind: ExportKind::Constant }
    }

    pub const fn variable(name: &'static str) -> Self {
        Self { name, kind: ExportKind::Variable }
    }
}

// ─── Compile-time interface ───────────────────────────────────────────────────

/// What the analyzer needs: exported names only.
/// No dependency on `Value`, `RuntimeError`, or runtime state.
pub trait NamespaceInfo {
    fn name(&self) -> &'static str;
    fn exports(&self) -> Vec<Export>;
}

// ─── Runtime interface ────────────────────────────────────────────────────────

/// What the interpreter needs: call dispatch, constants and pseudo-variables.
/// Extends `NamespaceInfo` so a single object serves both roles.
/// `call` returns `Ok(None)` for names the namespace does not own.
pub trait NamespaceProvider: NamespaceInfo {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        state: &mut RuntimeState,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError>;

    fn get_constant(&self, _name: &str) -> Option<Value> {
        None
    }

    fn get_variable(&self, _name: &str, _state: &RuntimeState) -> Option<Value> {
        None
    }
}

// ─── Registry ─────────────────────────────────────────────────────────────────

pub struct NamespaceRegistry {
    providers: Vec<Box<dyn NamespaceProvider>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self { Self { providers: Vec::new() } }

    pub fn register(&mut self, p: Box<dyn NamespaceProvider>) { self.providers.push(p); }

    pub fn get(&self, name: &str) -> Option<&dyn NamespaceProvider> {
        self.providers.iter().find(|p| p.name() == name).map(|p| p.as_ref())
    }

    pub fn call_any(
        &self,
        name: &str,
        args: &[Value],
        state: &mut RuntimeState,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        for p in &self.providers {
            if let Some(v) = p.call(name, args, state, line)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    pub fn get_constant(&self, name: &str) -> Option<Value> {
        self.providers.iter().find_map(|p| p.get_constant(name))
    }

    pub fn get_variable(&self, name: &str, state: &RuntimeState) -> Option<Value> {
        self.providers.iter().find_map(|p| p.get_variable(name, state))
    }

    fn has_export(&self, name: &str, kind: ExportKind) -> bool {
        // a name may be exported twice, e.g. `keyPressed` as function and variable
        self.providers.iter().any(|p| p.exports().iter().any(|e| e.name == name && e.kind == kind))
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.has_export(name, ExportKind::Function)
    }

    pub fn is_read_only(&self, name: &str) -> bool {
        self.has_export(name, ExportKind::Variable)
    }

    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register(Box::new(canvas::CanvasNamespace));
        r.register(Box::new(math::MathNamespace));
        r.register(Box::new(lists::ListsNamespace));
        r.register(Box::new(io::IoNamespace));
        r.register(Box::new(input::InputNamespace));
        r.register(Box::new(cipher::CipherNamespace));
        r
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self { Self::standard() }
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// Positional argument, `nil` when missing.
pub(crate) fn arg(args: &[Value], i: usize) -> &Value {
    args.get(i).unwrap_or(&Value::Null)
}

pub(crate) fn as_number(name: &str, v: &Value, line: usize) -> Result<f64, RuntimeError> {
    match v {
        Value::Number(x) => Ok(*x),
        _ => Err(RuntimeError::new(line, format!("`{name}` expects a number, got {}", v.type_name()))),
    }
}

pub(crate) fn num_arg(name: &str, args: &[Value], i: usize, line: usize) -> Result<f64, RuntimeError> {
    as_number(name, arg(args, i), line)
}

/// Optional numeric argument: missing or `nil` yields `None`.
pub(crate) fn opt_num_arg(name: &str, args: &[Value], i: usize, line: usize) -> Result<Option<f64>, RuntimeError> {
    match arg(args, i) {
        Value::Null => Ok(None),
        v => as_number(name, v, line).map(Some),
    }
}

pub(crate) fn check_argc(name: &str, args: &[Value], n: usize, line: usize) -> Result<(), RuntimeError> {
    check_arg_range(name, args, n, n, line)
}

pub(crate) fn check_arg_range(
    name: &str,
    args: &[Value],
    min: usize,
    max: usize,
    line: usize,
) -> Result<(), RuntimeError> {
    if args.len() >= min && args.len() <= max {
        return Ok(());
    }
    let expected = if min == max { format!("{min}") } else { format!("{min} to {max}") };
    Err(RuntimeError::with_kind(
        RuntimeErrorKind::Arity,
        line,
        format!("`{name}` expects {expected} args, got {}", args.len()),
    ))
}

/// Color from 1 (gray), 2 (gray, alpha), 3 (rgb) or 4 (rgba) numbers.
pub(crate) fn color_args(name: &str, args: &[Value], line: usize) -> Result<Color, RuntimeError> {
    check_arg_range(name, args, 1, 4, line)?;
    let n: Vec<f64> = args.iter().map(|v| as_number(name, v, line)).collect::<Result<_, _>>()?;
    Ok(match n.as_slice() {
        [v]          => Color::gray(*v),
        [v, a]       => Color::rgba(*v, *v, *v, *a),
        [r, g, b]    => Color::rgb(*r, *g, *b),
        [r, g, b, a] => Color::rgba(*r, *g, *b, *a),
        _            => Color::BLACK,
    })
}
