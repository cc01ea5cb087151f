//! Built-in fields and methods on runtime values (`xs.length`, `xs.push(v)`,
//! `name.toUpperCase()`).
//!
//! Adding a method to a built-in type = registering one `MethodDesc` here.
//! Map keys are dynamic and handled by the interpreter, not this table.

use std::collections::HashMap;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::value::{Value, values_equal};

// ─── Function pointer aliases ─────────────────────────────────────────────────

/// Read a field from a value. Caller guarantees `v` is the right variant.
pub type FieldGetter = fn(&Value) -> Value;

/// Call a method on a receiver with pre-evaluated args.
pub type MethodFn = fn(&Value, &[Value], usize) -> Result<Value, RuntimeError>;

// ─── Descriptors ──────────────────────────────────────────────────────────────

pub struct FieldDesc {
    pub name: &'static str,
    pub get:  FieldGetter,
}

pub struct MethodDesc {
    pub name:     &'static str,
    pub min_args: usize,
    /// `None` for variadic methods.
    pub max_args: Option<usize>,
    pub call:     MethodFn,
}

pub struct TypeDesc {
    pub name:    &'static str,
    pub fields:  Vec<FieldDesc>,
    pub methods: Vec<MethodDesc>,
}

// ─── Registry ─────────────────────────────────────────────────────────────────

pub struct TypeRegistry {
    types: HashMap<&'static str, TypeDesc>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self { types: HashMap::new() }
    }

    pub fn register(&mut self, desc: TypeDesc) {
        self.types.insert(desc.name, desc);
    }

    /// Returns None if the type or field isn't registered.
    pub fn get_field(&self, v: &Value, field: &str) -> Option<Value> {
        self.types.get(v.type_name())?
            .fields.iter()
            .find(|f| f.name == field)
            .map(|f| (f.get)(v))
    }

    /// Returns None if the type or method isn't registered.
    pub fn call_method(
        &self,
        recv:   &Value,
        method: &str,
        args:   &[Value],
        line:   usize,
    ) -> Option<Result<Value, RuntimeError>> {
        self.types.get(recv.type_name())?
            .methods.iter()
            .find(|m| m.name == method)
            .map(|m| {
                let too_many = m.max_args.is_some_and(|max| args.len() > max);
                if args.len() < m.min_args || too_many {
                    return Err(RuntimeError::with_kind(RuntimeErrorKind::Arity, line, format!(
                        "`{method}` got {} argument(s)", args.len()
                    )));
                }
                (m.call)(recv, args, line)
            })
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut r = Self::new();
        r.register(list_desc());
        r.register(string_desc());
        r
    }
}

// ─── list ─────────────────────────────────────────────────────────────────────

fn items(v: &Value) -> &std::rc::Rc<std::cell::RefCell<Vec<Value>>> {
    match v {
        Value::List(items) => items,
        _ => unreachable!("list descriptor called on a non-list"),
    }
}

fn list_desc() -> TypeDesc {
    TypeDesc {
        name: "list",
        fields: vec![
            FieldDesc { name: "length", get: |v| Value::Number(items(v).borrow().len() as f64) },
        ],
        methods: vec![
            // returns the new length
            MethodDesc { name: "push", min_args: 1, max_args: None, call: |v, args, _| {
                let mut xs = items(v).borrow_mut();
                xs.extend(args.iter().cloned());
                Ok(Value::Number(xs.len() as f64))
            }},
            MethodDesc { name: "pop", min_args: 0, max_args: Some(0), call: |v, _, _| {
                Ok(items(v).borrow_mut().pop().unwrap_or(Value::Null))
            }},
            MethodDesc { name: "includes", min_args: 1, max_args: Some(1), call: |v, args, _| {
                Ok(Value::Bool(items(v).borrow().iter().any(|x| values_equal(x, &args[0]))))
            }},
            MethodDesc { name: "indexOf", min_args: 1, max_args: Some(1), call: |v, args, _| {
                let pos = items(v).borrow().iter().position(|x| values_equal(x, &args[0]));
                Ok(Value::Number(pos.map_or(-1.0, |p| p as f64)))
            }},
            MethodDesc { name: "join", min_args: 0, max_args: Some(1), call: |v, args, _| {
                let sep = args.first().map_or(",".to_string(), |s| s.to_string());
                let parts: Vec<String> = items(v).borrow().iter().map(|x| x.to_string()).collect();
                Ok(Value::Str(parts.join(&sep)))
            }},
        ],
    }
}

// ─── string ───────────────────────────────────────────────────────────────────

fn text(v: &Value) -> &str {
    match v {
        Value::Str(s) => s,
        _ => unreachable!("string descriptor called on a non-string"),
    }
}

fn string_desc() -> TypeDesc {
    TypeDesc {
        name: "string",
        fields: vec![
            FieldDesc { name: "length", get: |v| Value::Number(text(v).chars().count() as f64) },
        ],
        methods: vec![
            MethodDesc { name: "toUpperCase", min_args: 0, max_args: Some(0), call: |v, _, _| {
                Ok(Value::Str(text(v).to_uppercase()))
            }},
            MethodDesc { name: "toLowerCase", min_args: 0, max_args: Some(0), call: |v, _, _| {
                Ok(Value::Str(text(v).to_lowercase()))
            }},
            MethodDesc { name: "trim", min_args: 0, max_args: Some(0), call: |v, _, _| {
                Ok(Value::Str(text(v).trim().to_string()))
            }},
            MethodDesc { name: "includes", min_args: 1, max_args: Some(1), call: |v, args, _| {
                Ok(Value::Bool(text(v).contains(args[0].to_string().as_str())))
            }},
        ],
    }
}
