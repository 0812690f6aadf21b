use minel_core::{MinelError, Value};

use crate::{arg, eval_args, expect_number, register_fn};

/// Bound used by `random` when no limit is given.
const RANDOM_DEFAULT_BOUND: u64 = 1 << 31;

pub fn register(env: &minel_core::Env) {
    register_fn(env, "+", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let mut sum = 0.0;
        for a in &args {
            sum += expect_number(a)?;
        }
        Ok(Value::Number(sum))
    });

    // The first operand is the base; each later one is subtracted.
    register_fn(env, "-", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let Some((first, rest)) = args.split_first() else {
            return Ok(Value::Number(0.0));
        };
        let mut acc = expect_number(first)?;
        for a in rest {
            acc -= expect_number(a)?;
        }
        Ok(Value::Number(acc))
    });

    register_fn(env, "1+", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        Ok(Value::Number(expect_number(&arg(&args, 0))? + 1.0))
    });

    register_fn(env, "abs", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        Ok(Value::Number(expect_number(&arg(&args, 0))?.abs()))
    });

    register_fn(env, "random", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let bound = match arg(&args, 0) {
            Value::Nil | Value::T => RANDOM_DEFAULT_BOUND,
            Value::Number(n) if n == f64::INFINITY => RANDOM_DEFAULT_BOUND,
            Value::Number(n) => {
                let n = n.trunc();
                if !(n.is_finite() && n >= 1.0) {
                    return Err(MinelError::eval(format!(
                        "random: limit must be positive, got {n}"
                    )));
                }
                n as u64
            }
            other => {
                return Err(MinelError::type_error_with_value(
                    "number, t or nil",
                    other.type_name(),
                    &other,
                ))
            }
        };
        Ok(Value::Number(ctx.random_below(bound) as f64))
    });
}

#[cfg(test)]
mod tests {
    use crate::test_util::{eval_str, show};
    use minel_core::{MinelError, Value};

    #[test]
    fn test_add() {
        assert_eq!(show("(+ 1 2 3)"), "6");
        assert_eq!(show("(+)"), "0");
        assert_eq!(show("(+ 0.5 0.25)"), "0.75");
    }

    #[test]
    fn test_subtract_uses_first_as_base() {
        assert_eq!(show("(- 10 3 2)"), "5");
        assert_eq!(show("(- 5)"), "5");
        assert_eq!(show("(-)"), "0");
    }

    #[test]
    fn test_one_plus_and_abs() {
        assert_eq!(show("(1+ 41)"), "42");
        assert_eq!(show("(abs -7)"), "7");
    }

    #[test]
    fn test_arithmetic_rejects_non_numbers() {
        assert!(matches!(eval_str("(+ 1 \"2\")"), Err(MinelError::Type { .. })));
        assert!(matches!(eval_str("(1+ nil)"), Err(MinelError::Type { .. })));
    }

    #[test]
    fn test_random_in_range() {
        for _ in 0..20 {
            let n = eval_str("(random 6)").unwrap().as_number().unwrap();
            assert!((0.0..6.0).contains(&n));
            assert_eq!(n.fract(), 0.0);
        }
        let big = eval_str("(random t)").unwrap().as_number().unwrap();
        assert!(big < 2f64.powi(31));
        assert!(matches!(eval_str("(random)").unwrap(), Value::Number(_)));
    }

    #[test]
    fn test_random_rejects_bad_limits() {
        assert!(matches!(eval_str("(random 0)"), Err(MinelError::Eval(_))));
        assert!(matches!(eval_str("(random 'x)"), Err(MinelError::Type { .. })));
        assert!(matches!(eval_str("(random 0.5)"), Err(MinelError::Eval(_))));
    }

    #[test]
    fn test_random_non_finite_limits() {
        assert!(matches!(
            eval_str("(random (- 1e400 1e400))"),
            Err(MinelError::Eval(_))
        ));
        assert!(matches!(eval_str("(random (- 0 1e400))"), Err(MinelError::Eval(_))));
        let n = eval_str("(random 1e400)").unwrap().as_number().unwrap();
        assert!((0.0..2f64.powi(31)).contains(&n));
    }
}
