use minel_core::{eq_value, equal_value, Value};

use crate::{arg, eval_args, register_fn};

pub fn register(env: &minel_core::Env) {
    register_fn(env, "not", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        Ok(Value::bool(arg(&args, 0).is_nil()))
    });

    register_fn(env, "eq", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        Ok(Value::bool(eq_value(&arg(&args, 0), &arg(&args, 1))))
    });

    register_fn(env, "equal", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        Ok(Value::bool(equal_value(&arg(&args, 0), &arg(&args, 1))))
    });

    register_fn(env, "stringp", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        Ok(Value::bool(matches!(arg(&args, 0), Value::Str(_))))
    });
}
