use minel_core::{EvalContext, Env, MinelError, Value};

use crate::{arg, eval_args, expect_number, register_fn};

/// Binary numeric comparison; both operands must be numbers.
fn num_cmp(
    ctx: &EvalContext,
    args: &Value,
    env: &Env,
    f: impl Fn(f64, f64) -> bool,
) -> Result<Value, MinelError> {
    let args = eval_args(ctx, args, env)?;
    let a = expect_number(&arg(&args, 0))?;
    let b = expect_number(&arg(&args, 1))?;
    Ok(Value::bool(f(a, b)))
}

pub fn register(env: &Env) {
    register_fn(env, "<", |ctx, args, env| num_cmp(ctx, args, env, |a, b| a < b));
    register_fn(env, "=", |ctx, args, env| num_cmp(ctx, args, env, |a, b| a == b));
    register_fn(env, ">", |ctx, args, env| num_cmp(ctx, args, env, |a, b| a > b));
    register_fn(env, ">=", |ctx, args, env| num_cmp(ctx, args, env, |a, b| a >= b));
}

#[cfg(test)]
mod tests {
    use crate::test_util::{eval_str, show};
    use minel_core::MinelError;

    #[test]
    fn test_comparisons() {
        assert_eq!(show("(< 1 2)"), "t");
        assert_eq!(show("(< 2 1)"), "nil");
        assert_eq!(show("(= 3 3.0)"), "t");
        assert_eq!(show("(> 3 1)"), "t");
        assert_eq!(show("(>= 3 3)"), "t");
        assert_eq!(show("(>= 2 3)"), "nil");
    }

    #[test]
    fn test_comparison_requires_numbers() {
        assert!(matches!(eval_str("(< 1 'a)"), Err(MinelError::Type { .. })));
        assert!(matches!(eval_str("(= 1)"), Err(MinelError::Type { .. })));
    }
}
