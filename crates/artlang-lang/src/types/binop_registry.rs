//! Operator registry: maps (BinOp, lhs_type, rhs_type) to an implementation.
//!
//! `==`, `!=`, `and` and `or` are handled by the interpreter; everything else
//! is looked up here. A missing entry is a runtime type error.

use std::collections::HashMap;

use crate::syntax::ast::BinOp;
use crate::error::RuntimeError;
use crate::runtime::value::Value;

// ─── Function pointer ─────────────────────────────────────────────────────────

pub type BinopFn = fn(Value, Value, usize) -> Result<Value, RuntimeError>;

/// Every runtime type key, for registrations that accept any operand.
const ALL_TYPES: [&str; 7] = ["nil", "number", "bool", "string", "list", "map", "namespace"];

// ─── Registry ─────────────────────────────────────────────────────────────────

pub struct BinopRegistry {
    ops: HashMap<(BinOp, &'static str, &'static str), BinopFn>,
}

impl BinopRegistry {
    pub fn new() -> Self {
        Self { ops: HashMap::new() }
    }

    pub fn register(&mut self, op: BinOp, lhs: &'static str, rhs: &'static str, f: BinopFn) {
        self.ops.insert((op, lhs, rhs), f);
    }

    /// Evaluates `l op r`, or `None` when no handler is registered for the pair.
    pub fn eval(&self, op: BinOp, l: Value, r: Value, line: usize) -> Option<Result<Value, RuntimeError>> {
        let f = self.ops.get(&(op, l.type_name(), r.type_name()))?;
        Some(f(l, r, line))
    }
}

impl Default for BinopRegistry {
    fn default() -> Self {
        let mut r = Self::new();
        register_number(&mut r);
        register_string(&mut r);
        r
    }
}

// ─── number ───────────────────────────────────────────────────────────────────

fn nums(l: Value, r: Value) -> (f64, f64) {
    (l.as_number().unwrap_or(f64::NAN), r.as_number().unwrap_or(f64::NAN))
}

fn register_number(r: &mut BinopRegistry) {
    use BinOp::*;
    r.register(Add, "number", "number", |l, r, _| {
        let (a, b) = nums(l, r);
        Ok(Value::Number(a + b))
    });
    r.register(Sub, "number", "number", |l, r, _| {
        let (a, b) = nums(l, r);
        Ok(Value::Number(a - b))
    });
    r.register(Mul, "number", "number", |l, r, _| {
        let (a, b) = nums(l, r);
        Ok(Value::Number(a * b))
    });
    r.register(Div, "number", "number", |l, r, line| {
        let (a, b) = nums(l, r);
        if b == 0.0 { Err(RuntimeError::new(line, "division by zero")) }
        else { Ok(Value::Number(a / b)) }
    });
    // sign follows the dividend, like `fmod`
    r.register(Mod, "number", "number", |l, r, line| {
        let (a, b) = nums(l, r);
        if b == 0.0 { Err(RuntimeError::new(line, "modulo by zero")) }
        else { Ok(Value::Number(a % b)) }
    });
    r.register(Lt, "number", "number", |l, r, _| {
        let (a, b) = nums(l, r);
        Ok(Value::Bool(a < b))
    });
    r.register(LtEq, "number", "number", |l, r, _| {
        let (a, b) = nums(l, r);
        Ok(Value::Bool(a <= b))
    });
    r.register(Gt, "number", "number", |l, r, _| {
        let (a, b) = nums(l, r);
        Ok(Value::Bool(a > b))
    });
    r.register(GtEq, "number", "number", |l, r, _| {
        let (a, b) = nums(l, r);
        Ok(Value::Bool(a >= b))
    });
}

// ─── string ───────────────────────────────────────────────────────────────────

fn concat(l: Value, r: Value, _line: usize) -> Result<Value, RuntimeError> {
    Ok(Value::Str(format!("{l}{r}")))
}

fn register_string(r: &mut BinopRegistry) {
    use BinOp::*;
    // `+` concatenates when either side is a string
    for other in ALL_TYPES {
        r.register(Add, "string", other, concat);
        r.register(Add, other, "string", concat);
    }

    fn strs(l: &Value, r: &Value) -> (String, String) {
        (l.to_string(), r.to_string())
    }
    r.register(Lt, "string", "string", |l, r, _| {
        let (a, b) = strs(&l, &r);
        Ok(Value::Bool(a < b))
    });
    r.register(LtEq, "string", "string", |l, r, _| {
        let (a, b) = strs(&l, &r);
        Ok(Value::Bool(a <= b))
    });
    r.register(Gt, "string", "string", |l, r, _| {
        let (a, b) = strs(&l, &r);
        Ok(Value::Bool(a > b))
    });
    r.register(GtEq, "string", "string", |l, r, _| {
        let (a, b) = strs(&l, &r);
        Ok(Value::Bool(a >= b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: BinOp, l: Value, r: Value) -> Option<Result<Value, RuntimeError>> {
        BinopRegistry::default().eval(op, l, r, 1)
    }

    #[test]
    fn arithmetic() {
        let got = eval(BinOp::Mul, Value::Number(3.0), Value::Number(4.0));
        assert_eq!(got.and_then(Result::ok), Some(Value::Number(12.0)));
        let got = eval(BinOp::Mod, Value::Number(-7.0), Value::Number(3.0));
        assert_eq!(got.and_then(Result::ok), Some(Value::Number(-1.0)));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(matches!(eval(BinOp::Div, Value::Number(1.0), Value::Number(0.0)), Some(Err(_))));
        assert!(matches!(eval(BinOp::Mod, Value::Number(1.0), Value::Number(0.0)), Some(Err(_))));
    }

    #[test]
    fn plus_concatenates_strings() {
        let got = eval(BinOp::Add, Value::str("Score: "), Value::Number(10.0));
        assert_eq!(got.and_then(Result::ok), Some(Value::str("Score: 10")));
        let got = eval(BinOp::Add, Value::Null, Value::str("!"));
        assert_eq!(got.and_then(Result::ok), Some(Value::str("null!")));
    }

    #[test]
    fn mismatched_operands_are_unregistered() {
        assert!(eval(BinOp::Sub, Value::str("a"), Value::Number(1.0)).is_none());
        assert!(eval(BinOp::Lt, Value::Number(1.0), Value::str("2")).is_none());
        assert!(eval(BinOp::Add, Value::Bool(true), Value::Number(1.0)).is_none());
    }

    #[test]
    fn strings_compare_lexically() {
        let got = eval(BinOp::Lt, Value::str("apple"), Value::str("banana"));
        assert_eq!(got.and_then(Result::ok), Some(Value::Bool(true)));
    }
}
