use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Dynamic value flowing through sketches. Lists and maps are shared and
/// mutable: copying a value copies the handle, not the contents.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Number(f64),
    Bool(bool),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<Map>>),
    /// A library namespace such as `math`, reachable as `math.sin(x)`.
    Namespace(String),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn map(map: Map) -> Self {
        Value::Map(Rc::new(RefCell::new(map)))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null         => "nil",
            Value::Number(_)    => "number",
            Value::Bool(_)      => "bool",
            Value::Str(_)       => "string",
            Value::List(_)      => "list",
            Value::Map(_)       => "map",
            Value::Namespace(_) => "namespace",
        }
    }

    /// `nil`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null      => false,
            Value::Bool(b)   => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s)    => !s.is_empty(),
            _ => true,
        }
    }

    /// Numeric coercion used by `Number(x)`: strings parse after trimming
    /// (empty is 0), booleans are 0/1, nil is 0, anything else is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b)   => if *b { 1.0 } else { 0.0 },
            Value::Null      => 0.0,
            Value::Str(s) => {
                let t = s.trim();
                if t.is_empty() { 0.0 } else { parse_number(t).unwrap_or(f64::NAN) }
            }
            _ => f64::NAN,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

/// Scalars compare by value, lists and maps by identity.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null)                 => true,
        (Value::Number(x), Value::Number(y))       => x == y,
        (Value::Bool(x), Value::Bool(y))           => x == y,
        (Value::Str(x), Value::Str(y))             => x == y,
        (Value::List(x), Value::List(y))           => Rc::ptr_eq(x, y),
        (Value::Map(x), Value::Map(y))             => Rc::ptr_eq(x, y),
        (Value::Namespace(x), Value::Namespace(y)) => x == y,
        _ => false,
    }
}

// ─── Map ──────────────────────────────────────────────────────────────────────

/// Insertion-ordered string-keyed map.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replaces in place when the key exists, so order stays stable.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ─── Formatting ───────────────────────────────────────────────────────────────

/// Formats a number the way sketches print it: integers without a fraction,
/// `-0` as `0`, and `NaN` / `Infinity` spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else if n == 0.0 {
        "0".into()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// Parses a decimal literal, also accepting `Infinity` and a leading sign.
pub fn parse_number(s: &str) -> Option<f64> {
    match s {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => None,
        _ => s.parse::<f64>().ok(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

/// `open` holds the containers currently being printed. A list or map that
/// reaches itself again prints as `[...]` or `{...}`.
fn write_value(f: &mut fmt::Formatter<'_>, v: &Value, open: &mut Vec<*const ()>) -> fmt::Result {
    match v {
        Value::Null         => write!(f, "null"),
        Value::Number(n)    => write!(f, "{}", format_number(*n)),
        Value::Bool(b)      => write!(f, "{b}"),
        Value::Str(s)       => write!(f, "{s}"),
        Value::Namespace(n) => write!(f, "<namespace {n}>"),
        Value::List(items) => {
            let ptr = Rc::as_ptr(items) as *const ();
            if open.contains(&ptr) {
                return write!(f, "[...]");
            }
            open.push(ptr);
            write!(f, "[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write_nested(f, item, open)?;
            }
            open.pop();
            write!(f, "]")
        }
        Value::Map(map) => {
            let ptr = Rc::as_ptr(map) as *const ();
            if open.contains(&ptr) {
                return write!(f, "{{...}}");
            }
            open.push(ptr);
            write!(f, "{{")?;
            for (i, (k, v)) in map.borrow().iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write!(f, "{k}: ")?;
                write_nested(f, v, open)?;
            }
            open.pop();
            write!(f, "}}")
        }
    }
}

/// Strings inside containers are quoted so `["1"]` and `[1]` print differently.
fn write_nested(f: &mut fmt::Formatter<'_>, v: &Value, open: &mut Vec<*const ()>) -> fmt::Result {
    match v {
        Value::Str(s) => write!(f, "{s:?}"),
        other => write_value(f, other, open),
    }
}
