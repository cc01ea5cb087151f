//! Mouse and keyboard tracking.
//!
//! The host feeds raw events into an [`InputHandle`] at any time. The engine
//! takes a [`FrameInput`] snapshot at the start of every tick: level state
//! (held keys, pressed buttons) is copied, edge state (clicks) is drained, so
//! each edge is seen by exactly one tick.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Numeric code exposed to sketches as `leftMouse` / `middleMouse` / `rightMouse`.
    pub fn code(self) -> u8 {
        match self {
            MouseButton::Left   => 0,
            MouseButton::Middle => 1,
            MouseButton::Right  => 2,
        }
    }

    pub fn from_code(code: f64) -> Option<Self> {
        match code as i64 {
            0 if code == 0.0 => Some(MouseButton::Left),
            1 if code == 1.0 => Some(MouseButton::Middle),
            2 if code == 2.0 => Some(MouseButton::Right),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left"   => Some(MouseButton::Left),
            "middle" => Some(MouseButton::Middle),
            "right"  => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Keys compare trimmed and case-insensitive; a lone whitespace key (space)
/// keeps its single character so it does not collapse to "".
pub fn normalize_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() && !key.is_empty() {
        " ".to_string()
    } else {
        trimmed.to_lowercase()
    }
}

// ─── Raw event state ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RawInput {
    mouse: (f64, f64),
    buttons_down: HashSet<MouseButton>,
    last_button: Option<MouseButton>,
    buttons_clicked: Vec<MouseButton>,
    /// Held keys in press order: (normalized, as reported).
    keys_down: Vec<(String, String)>,
    keys_clicked: HashSet<String>,
    clicked_key: Option<String>,
}

/// Cloneable entry point for host input events.
#[derive(Debug, Clone, Default)]
pub struct InputHandle {
    raw: Rc<RefCell<RawInput>>,
}

impl InputHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse_moved(&self, x: f64, y: f64) {
        self.raw.borrow_mut().mouse = (x, y);
    }

    pub fn mouse_down(&self, button: MouseButton) {
        let mut raw = self.raw.borrow_mut();
        if raw.buttons_down.insert(button) {
            raw.buttons_clicked.push(button);
        }
        raw.last_button = Some(button);
    }

    /// Releasing the last held button resets `mouseButton` to left.
    pub fn mouse_up(&self, button: MouseButton) {
        let mut raw = self.raw.borrow_mut();
        raw.buttons_down.remove(&button);
        if raw.buttons_down.is_empty() {
            raw.last_button = None;
        }
    }

    /// A repeated `key_down` for a key that is already held is not a new click.
    pub fn key_down(&self, key: &str) {
        let mut raw = self.raw.borrow_mut();
        let norm = normalize_key(key);
        if norm.is_empty() {
            return;
        }
        if raw.keys_down.iter().any(|(k, _)| *k == norm) {
            return;
        }
        raw.keys_clicked.insert(norm.clone());
        raw.clicked_key = Some(key.to_string());
        raw.keys_down.push((norm, key.to_string()));
    }

    /// `key` falls back to the most recent key still held.
    pub fn key_up(&self, key: &str) {
        let norm = normalize_key(key);
        self.raw.borrow_mut().keys_down.retain(|(k, _)| *k != norm);
    }

    /// Copies level state and the pointer, and drains edges accumulated
    /// since the last call. `pmouse*` is left to [`FrameInput::advance`].
    pub fn snapshot(&self, frame: &mut FrameInput) {
        let mut raw = self.raw.borrow_mut();
        (frame.mouse_x, frame.mouse_y) = raw.mouse;
        frame.mouse_pressed = !raw.buttons_down.is_empty();
        frame.mouse_button = raw.last_button;
        frame.mouse_clicked = std::mem::take(&mut raw.buttons_clicked);
        frame.keys_down = raw.keys_down.iter().map(|(k, _)| k.clone()).collect();
        frame.key = raw.keys_down.last().map(|(_, shown)| shown.clone());
        frame.keys_clicked = std::mem::take(&mut raw.keys_clicked);
        frame.clicked_key = raw.clicked_key.take();
    }

    /// Forgets pending edges, keeping held keys and buttons.
    pub fn discard_edges(&self) {
        let mut raw = self.raw.borrow_mut();
        raw.buttons_clicked.clear();
        raw.keys_clicked.clear();
        raw.clicked_key = None;
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.raw.borrow().mouse
    }
}

// ─── Per-frame view ───────────────────────────────────────────────────────────

/// What sketch code sees during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub mouse_x: f64,
    pub mouse_y: f64,
    pub pmouse_x: f64,
    pub pmouse_y: f64,
    pub mouse_pressed: bool,
    pub mouse_button: Option<MouseButton>,
    /// Buttons that went down since the previous snapshot.
    pub mouse_clicked: Vec<MouseButton>,
    pub keys_down: HashSet<String>,
    /// Most recently pressed key still held, as the host reported it.
    pub key: Option<String>,
    pub keys_clicked: HashSet<String>,
    pub clicked_key: Option<String>,
}

impl FrameInput {
    /// Starts a run with the pointer where it currently is.
    pub fn starting_at(mouse: (f64, f64)) -> Self {
        Self {
            mouse_x: mouse.0,
            mouse_y: mouse.1,
            pmouse_x: mouse.0,
            pmouse_y: mouse.1,
            ..Self::default()
        }
    }

    /// Rolls the mouse forward after a tick and clears this tick's edges.
    pub fn advance(&mut self, mouse: (f64, f64)) {
        self.pmouse_x = self.mouse_x;
        self.pmouse_y = self.mouse_y;
        self.mouse_x = mouse.0;
        self.mouse_y = mouse.1;
        self.mouse_clicked.clear();
        self.keys_clicked.clear();
        self.clicked_key = None;
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys_down.contains(&normalize_key(key))
    }

    pub fn was_key_clicked(&self, key: &str) -> bool {
        self.keys_clicked.contains(&normalize_key(key))
    }

    pub fn any_mouse_clicked(&self) -> bool {
        !self.mouse_clicked.is_empty()
    }

    pub fn was_mouse_clicked(&self, button: MouseButton) -> bool {
        self.mouse_clicked.contains(&button)
    }
}

// ─── Buttons ──────────────────────────────────────────────────────────────────

/// Immediate-mode button widgets, keyed by id. Click flags are cleared at
/// the start of every tick and set at most once per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonRegistry {
    clicked: HashMap<String, bool>,
}

impl ButtonRegistry {
    pub fn clear_clicks(&mut self) {
        for flag in self.clicked.values_mut() {
            *flag = false;
        }
    }

    /// Records a hit test for `id`. A button already clicked this tick stays clicked.
    pub fn record(&mut self, id: &str, hit: bool) -> bool {
        let flag = self.clicked.entry(id.to_string()).or_insert(false);
        *flag |= hit;
        *flag
    }

    pub fn clicked(&self, id: &str) -> bool {
        self.clicked.get(id).copied().unwrap_or(false)
    }
}

/// Inclusive on every edge.
pub fn hit_test(px: f64, py: f64, x: f64, y: f64, w: f64, h: f64) -> bool {
    px >= x && px <= x + w && py >= y && py <= y + h
}
