use minel_core::{MinelError, Value};

use crate::{arg, eval_args, expect_index, register_fn};

fn out_of_range(idx: usize, len: usize) -> MinelError {
    MinelError::eval(format!("args out of range: index {idx} for length {len}"))
}

pub fn register(env: &minel_core::Env) {
    // Vectors yield the element; strings yield the character code.
    register_fn(env, "aref", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let idx = expect_index(&arg(&args, 1))?;
        match arg(&args, 0) {
            Value::Vector(items) => {
                let items = items.borrow();
                items
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| out_of_range(idx, items.len()))
            }
            Value::Str(s) => {
                let s = s.borrow();
                s.chars()
                    .nth(idx)
                    .map(|c| Value::Number(c as u32 as f64))
                    .ok_or_else(|| out_of_range(idx, s.chars().count()))
            }
            other => Err(MinelError::type_error_with_value(
                "array",
                other.type_name(),
                &other,
            )),
        }
    });

    register_fn(env, "aset", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let idx = expect_index(&arg(&args, 1))?;
        let value = arg(&args, 2);
        match arg(&args, 0) {
            Value::Vector(items) => {
                let mut items = items.borrow_mut();
                let len = items.len();
                let slot = items.get_mut(idx).ok_or_else(|| out_of_range(idx, len))?;
                *slot = value.clone();
                Ok(value)
            }
            other => Err(MinelError::type_error_with_value(
                "vector",
                other.type_name(),
                &other,
            )),
        }
    });

    // Every slot holds the same init value.
    register_fn(env, "make-vector", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let len = expect_index(&arg(&args, 0))?;
        Ok(Value::vector(vec![arg(&args, 1); len]))
    });
}
