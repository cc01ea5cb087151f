//! Console output, value conversions, and the two suspending built-ins.
//!
//! `delay` and `input` cannot run inside a synchronous namespace call, so
//! they are described by [`suspension`] and awaited by the interpreter.

use std::time::Duration;

use crate::error::RuntimeError;
use crate::host::Message;
use crate::runtime::value::parse_number;
use crate::Value;
use super::{Export, NamespaceInfo, NamespaceProvider, RuntimeState, arg, as_number, check_argc};

pub struct IoNamespace;

/// A built-in call that must be awaited.
#[derive(Debug, Clone, PartialEq)]
pub enum Suspension {
    Delay(Duration),
    /// Prompt text for the host.
    Input(String),
}

/// Classifies a call to `delay` or `input`; `Ok(None)` for everything else.
pub fn suspension(name: &str, args: &[Value], line: usize) -> Result<Option<Suspension>, RuntimeError> {
    match name {
        "delay" => {
            check_argc(name, args, 1, line)?;
            let secs = as_number(name, arg(args, 0), line)?;
            let wait = if secs.is_finite() && secs > 0.0 { Duration::from_secs_f64(secs) } else { Duration::ZERO };
            Ok(Some(Suspension::Delay(wait)))
        }
        "input" => {
            let prompt = match args.first() {
                None | Some(Value::Null) => String::new(),
                Some(v) => v.to_string(),
            };
            Ok(Some(Suspension::Input(prompt)))
        }
        _ => Ok(None),
    }
}

impl NamespaceInfo for IoNamespace {
    fn name(&self) -> &'static str { "io" }

    fn exports(&self) -> Vec<Export> {
        vec![
            Export::function("print"),
            Export::function("delay"),
            Export::function("input"),
            Export::function("String"),
            Export::function("str"),
            Export::function("Number"),
            Export::function("num"),
            Export::function("parseInt"),
            Export::function("parseFloat"),
        ]
    }
}

impl NamespaceProvider for IoNamespace {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        state: &mut RuntimeState,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        let result = match name {
            "print" => {
                let text = args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
                state.say(Message::info(text));
                Value::Null
            }
            "String" | "str" => {
                check_argc(name, args, 1, line)?;
                Value::Str(arg(args, 0).to_string())
            }
            "Number" | "num" => {
                check_argc(name, args, 1, line)?;
                Value::Number(arg(args, 0).to_number())
            }
            "parseInt" => {
                check_argc(name, args, 1, line)?;
                Value::Number(parse_int(&arg(args, 0).to_string()))
            }
            "parseFloat" => {
                check_argc(name, args, 1, line)?;
                Value::Number(parse_float(&arg(args, 0).to_string()))
            }
            _ => return Ok(None),
        };
        Ok(Some(result))
    }
}

/// Leading optional sign and decimal digits; `NaN` when there are none.
pub fn parse_int(s: &str) -> f64 {
    let t = s.trim_start();
    let (sign, rest) = split_sign(t);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    digits.parse::<f64>().map_or(f64::NAN, |n| sign * n)
}

/// Longest decimal prefix, e.g. `"3.5px"` is 3.5.
pub fn parse_float(s: &str) -> f64 {
    let t = s.trim_start();
    let (sign, rest) = split_sign(t);
    if rest.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let bytes = rest.as_bytes();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return f64::NAN;
    }

    // optional exponent, only taken when digits follow it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    parse_number(&rest[..end]).map_or(f64::NAN, |n| sign * n)
}

fn split_sign(s: &str) -> (f64, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (-1.0, rest)
    } else {
        (1.0, s.strip_prefix('+').unwrap_or(s))
    }
}

/// Console text for a resolved `input()`.
pub fn input_echo(value: &Option<String>) -> Message {
    match value {
        Some(v) => Message::info(format!("Input: {v}")),
        None => Message::warning("Input cancelled"),
    }
}
