//! List and map helpers. Lists are shared handles, so `append` and `setItem`
//! mutate the caller's value in place and also return it.

use crate::error::RuntimeError;
use crate::runtime::value::format_number;
use crate::Value;
use super::{Export, NamespaceInfo, NamespaceProvider, RuntimeState, arg, check_argc};

pub struct ListsNamespace;

impl NamespaceInfo for ListsNamespace {
    fn name(&self) -> &'static str { "lists" }

    fn exports(&self) -> Vec<Export> {
        vec![
            Export::function("createList"),
            Export::function("append"),
            Export::function("getLength"),
            Export::function("getItem"),
            Export::function("setItem"),
        ]
    }
}

impl NamespaceProvider for ListsNamespace {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        _state: &mut RuntimeState,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        let result = match name {
            "createList" => Value::list(args.to_vec()),
            "append" => {
                check_argc(name, args, 2, line)?;
                append(arg(args, 0), arg(args, 1), line)?
            }
            "getLength" => {
                check_argc(name, args, 1, line)?;
                Value::Number(length(arg(args, 0), line)? as f64)
            }
            "getItem" => {
                check_argc(name, args, 2, line)?;
                get_item(arg(args, 0), arg(args, 1), line)?
            }
            "setItem" => {
                check_argc(name, args, 3, line)?;
                set_item(arg(args, 0), arg(args, 1), arg(args, 2).clone(), line)?
            }
            _ => return Ok(None),
        };
        Ok(Some(result))
    }
}

/// Pushes onto a list, or shallow-merges a map into a map (later keys win).
pub fn append(target: &Value, item: &Value, line: usize) -> Result<Value, RuntimeError> {
    match target {
        Value::List(items) => items.borrow_mut().push(item.clone()),
        Value::Map(map) => {
            let Value::Map(extra) = item else {
                return Err(RuntimeError::raised(
                    line,
                    "Cannot append non-object to object. Use object syntax: obj.key = value",
                ));
            };
            // snapshot first: `append(m, m)` aliases both handles
            let entries: Vec<(String, Value)> =
                extra.borrow().iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
            let mut map = map.borrow_mut();
            for (k, v) in entries {
                map.insert(k, v);
            }
        }
        _ => {
            return Err(RuntimeError::raised(line, "append() only works with arrays [] or objects {}"));
        }
    }
    Ok(target.clone())
}

pub fn length(v: &Value, line: usize) -> Result<usize, RuntimeError> {
    match v {
        Value::List(items) => Ok(items.borrow().len()),
        Value::Map(map) => Ok(map.borrow().len()),
        Value::Str(s) => Ok(s.chars().count()),
        other => Err(RuntimeError::new(line, format!("`getLength` expects a list, got {}", other.type_name()))),
    }
}

pub fn get_item(target: &Value, key: &Value, line: usize) -> Result<Value, RuntimeError> {
    match target {
        Value::List(items) => {
            let items = items.borrow();
            let i = checked_index(key, items.len(), line)?;
            Ok(items[i].clone())
        }
        Value::Map(map) => Ok(map.borrow().get(&key.to_string()).cloned().unwrap_or(Value::Null)),
        other => Err(RuntimeError::new(line, format!("`getItem` expects a list, got {}", other.type_name()))),
    }
}

pub fn set_item(target: &Value, key: &Value, value: Value, line: usize) -> Result<Value, RuntimeError> {
    match target {
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let i = checked_index(key, items.len(), line)?;
            items[i] = value;
        }
        Value::Map(map) => map.borrow_mut().insert(key.to_string(), value),
        _ => {
            return Err(RuntimeError::raised(line, "setItem() only works with arrays [] or objects {}"));
        }
    }
    Ok(target.clone())
}

/// Validates a list index against `[0, len)`. Fractional indices are type errors.
pub fn checked_index(key: &Value, len: usize, line: usize) -> Result<usize, RuntimeError> {
    let Value::Number(i) = key else {
        return Err(RuntimeError::new(line, format!("list index must be a number, got {}", key.type_name())));
    };
    if i.fract() != 0.0 {
        return Err(RuntimeError::new(line, format!("list index must be a whole number, got {}", format_number(*i))));
    }
    if *i < 0.0 || *i >= len as f64 {
        return Err(RuntimeError::bounds(
            line,
            format!("Index {} is out of bounds. List has {len} items.", format_number(*i)),
        ));
    }
    Ok(*i as usize)
}
