//! Math built-ins. Every function is also reachable as `math.name(...)`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use rand::Rng;

use crate::error::RuntimeError;
use crate::Value;
use super::{Export, NamespaceInfo, NamespaceProvider, RuntimeState, as_number, check_arg_range, check_argc, num_arg};

pub struct MathNamespace;

const UNARY: &[(&str, fn(f64) -> f64)] = &[
    ("sin",   f64::sin),
    ("cos",   f64::cos),
    ("tan",   f64::tan),
    ("asin",  f64::asin),
    ("acos",  f64::acos),
    ("atan",  f64::atan),
    ("sqrt",  f64::sqrt),
    ("abs",   f64::abs),
    ("floor", f64::floor),
    ("ceil",  f64::ceil),
    ("round", round_half_up),
];

/// Rounds .5 toward positive infinity (`round(-2.5) == -2`).
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

pub fn remap(v: f64, start1: f64, stop1: f64, start2: f64, stop2: f64) -> f64 {
    start2 + (stop2 - start2) * ((v - start1) / (stop1 - start1))
}

pub fn constrain(v: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(v))
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl NamespaceInfo for MathNamespace {
    fn name(&self) -> &'static str { "math" }

    fn exports(&self) -> Vec<Export> {
        let mut exports: Vec<Export> = UNARY.iter().map(|&(name, _)| Export::function(name)).collect();
        exports.extend([
            Export::function("atan2"),
            Export::function("pow"),
            Export::function("min"),
            Export::function("max"),
            Export::function("random"),
            Export::function("map"),
            Export::function("constrain"),
            Export::function("dist"),
            Export::function("lerp"),
            Export::constant("PI"),
            Export::constant("TWO_PI"),
            Export::constant("HALF_PI"),
            Export::constant("TAU"),
            Export::constant("math"),
        ]);
        exports
    }
}

impl NamespaceProvider for MathNamespace {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        _state: &mut RuntimeState,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        if let Some((_, f)) = UNARY.iter().find(|(n, _)| *n == name) {
            check_argc(name, args, 1, line)?;
            return Ok(Some(Value::Number(f(num_arg(name, args, 0, line)?))));
        }

        let n = |i: usize| num_arg(name, args, i, line);

        let result = match name {
            "atan2" => {
                check_argc(name, args, 2, line)?;
                n(0)?.atan2(n(1)?)
            }
            "pow" => {
                check_argc(name, args, 2, line)?;
                n(0)?.powf(n(1)?)
            }
            "min" | "max" => {
                let nums = numbers_of(name, args, line)?;
                if nums.is_empty() {
                    return Err(RuntimeError::new(line, format!("`{name}` needs at least one number")));
                }
                let fold: fn(f64, f64) -> f64 = if name == "min" { f64::min } else { f64::max };
                nums.into_iter().reduce(fold).unwrap_or(f64::NAN)
            }
            "random" => {
                check_arg_range(name, args, 0, 2, line)?;
                let unit: f64 = rand::thread_rng().r#gen();
                match args.len() {
                    0 => unit,
                    1 => unit * n(0)?,
                    _ => {
                        let (lo, hi) = (n(0)?, n(1)?);
                        lo + unit * (hi - lo)
                    }
                }
            }
            "map" => {
                check_argc(name, args, 5, line)?;
                remap(n(0)?, n(1)?, n(2)?, n(3)?, n(4)?)
            }
            "constrain" => {
                check_argc(name, args, 3, line)?;
                constrain(n(0)?, n(1)?, n(2)?)
            }
            "dist" => {
                check_argc(name, args, 4, line)?;
                (n(2)? - n(0)?).hypot(n(3)? - n(1)?)
            }
            "lerp" => {
                check_argc(name, args, 3, line)?;
                lerp(n(0)?, n(1)?, n(2)?)
            }
            _ => return Ok(None),
        };

        Ok(Some(Value::Number(result)))
    }

    fn get_constant(&self, name: &str) -> Option<Value> {
        match name {
            "PI"      => Some(Value::Number(PI)),
            "TWO_PI"  => Some(Value::Number(TAU)),
            "TAU"     => Some(Value::Number(TAU)),
            "HALF_PI" => Some(Value::Number(FRAC_PI_2)),
            "math"    => Some(Value::Namespace("math".into())),
            _ => None,
        }
    }
}

/// `min(a, b, c)` or `min(list)`.
fn numbers_of(name: &str, args: &[Value], line: usize) -> Result<Vec<f64>, RuntimeError> {
    if let [Value::List(items)] = args {
        return items.borrow().iter().map(|v| as_number(name, v, line)).collect();
    }
    args.iter().map(|v| as_number(name, v, line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn call(name: &str, args: &[f64]) -> f64 {
        let mut st = RuntimeState::new(&EngineConfig::default(), (0.0, 0.0));
        let args: Vec<Value> = args.iter().map(|n| Value::Number(*n)).collect();
        match MathNamespace.call(name, &args, &mut st, 1) {
            Ok(Some(Value::Number(n))) => n,
            other => panic!("{name}: unexpected {other:?}"),
        }
    }

    #[test]
    fn map_is_linear() {
        assert_eq!(call("map", &[0.0, 0.0, 10.0, 0.0, 100.0]), 0.0);
        assert_eq!(call("map", &[5.0, 0.0, 10.0, 0.0, 100.0]), 50.0);
        assert_eq!(call("map", &[10.0, 0.0, 10.0, 0.0, 100.0]), 100.0);
    }

    #[test]
    fn constrain_clamps() {
        assert_eq!(call("constrain", &[15.0, 0.0, 10.0]), 10.0);
        assert_eq!(call("constrain", &[-1.0, 0.0, 10.0]), 0.0);
        assert_eq!(call("constrain", &[4.0, 0.0, 10.0]), 4.0);
    }

    #[test]
    fn dist_and_lerp() {
        assert_eq!(call("dist", &[0.0, 0.0, 3.0, 4.0]), 5.0);
        assert_eq!(call("lerp", &[10.0, 20.0, 0.25]), 12.5);
    }

    #[test]
    fn round_half_goes_up() {
        assert_eq!(call("round", &[2.5]), 3.0);
        assert_eq!(call("round", &[-2.5]), -2.0);
        assert_eq!(call("round", &[-2.6]), -3.0);
    }

    #[test]
    fn min_max_variadic_and_list() {
        assert_eq!(call("min", &[3.0, 1.0, 2.0]), 1.0);
        assert_eq!(call("max", &[3.0, 1.0, 2.0]), 3.0);
        let mut st = RuntimeState::new(&EngineConfig::default(), (0.0, 0.0));
        let list = Value::list(vec![Value::Number(4.0), Value::Number(9.0)]);
        let got = MathNamespace.call("max", &[list], &mut st, 1).ok().flatten();
        assert_eq!(got, Some(Value::Number(9.0)));
    }

    #[test]
    fn random_ranges() {
        for _ in 0..200 {
            let a = call("random", &[5.0]);
            assert!((0.0..5.0).contains(&a));
            let b = call("random", &[-2.0, 2.0]);
            assert!((-2.0..2.0).contains(&b));
        }
    }

    #[test]
    fn constants() {
        assert_eq!(MathNamespace.get_constant("TWO_PI"), Some(Value::Number(TAU)));
        assert!(matches!(MathNamespace.get_constant("math"), Some(Value::Namespace(_))));
    }
}
