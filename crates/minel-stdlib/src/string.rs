use minel_core::{format_number, resolve, MinelError, Value};

use crate::{arg, eval_args, expect_number, expect_string, register_fn};

/// Map the first character of a case conversion back to a code.
fn convert_code(code: f64, f: impl Fn(char) -> Option<char>) -> f64 {
    match char::from_u32(code as u32) {
        Some(c) if code >= 0.0 && code.fract() == 0.0 => f(c).map_or(code, |c| c as u32 as f64),
        _ => code,
    }
}

fn change_case(
    v: &Value,
    on_str: fn(&str) -> String,
    on_char: fn(char) -> Option<char>,
) -> Result<Value, MinelError> {
    match v {
        Value::Number(n) => Ok(Value::Number(convert_code(*n, on_char))),
        Value::Str(s) => Ok(Value::string_owned(on_str(&s.borrow()))),
        other => Err(MinelError::type_error_with_value(
            "string or character",
            other.type_name(),
            other,
        )),
    }
}

/// Text compared by `string=`: a string's contents or a symbol's name.
fn string_designator(v: &Value) -> Result<String, MinelError> {
    match v {
        Value::Str(s) => Ok(s.borrow().clone()),
        Value::Symbol(spur) => Ok(resolve(*spur)),
        Value::Nil => Ok("nil".to_string()),
        Value::T => Ok("t".to_string()),
        other => Err(MinelError::type_error_with_value(
            "string or symbol",
            other.type_name(),
            other,
        )),
    }
}

/// Resolve a possibly negative character index against `len`.
fn char_index(v: &Value, len: usize) -> Result<usize, MinelError> {
    let n = expect_number(v)?;
    let idx = if n < 0.0 { len as f64 + n } else { n };
    if idx < 0.0 || idx > len as f64 || idx.fract() != 0.0 {
        return Err(MinelError::eval(format!(
            "args out of range: index {} for length {len}",
            format_number(n)
        )));
    }
    Ok(idx as usize)
}

pub fn register(env: &minel_core::Env) {
    register_fn(env, "concat", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let mut out = String::new();
        for a in &args {
            out.push_str(&expect_string(a)?);
        }
        Ok(Value::string_owned(out))
    });

    register_fn(env, "substring", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let s = expect_string(&arg(&args, 0))?;
        let len = s.chars().count();
        let from = char_index(&arg(&args, 1), len)?;
        let to = match arg(&args, 2) {
            Value::Nil => len,
            end => char_index(&end, len)?,
        };
        if from > to {
            return Err(MinelError::eval(format!(
                "args out of range: {from} > {to}"
            )));
        }
        Ok(Value::string_owned(
            s.chars().skip(from).take(to - from).collect(),
        ))
    });

    register_fn(env, "upcase", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        change_case(&arg(&args, 0), str::to_uppercase, |c| c.to_uppercase().next())
    });

    register_fn(env, "downcase", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        change_case(&arg(&args, 0), str::to_lowercase, |c| c.to_lowercase().next())
    });

    register_fn(env, "string=", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let a = string_designator(&arg(&args, 0))?;
        let b = string_designator(&arg(&args, 1))?;
        Ok(Value::bool(a == b))
    });

    register_fn(env, "prin1-to-string", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let text = match arg(&args, 0) {
            Value::Str(s) => s.borrow().clone(),
            Value::Number(n) => format_number(n),
            other => other.to_string(),
        };
        Ok(Value::string_owned(text))
    });

    register_fn(env, "intern", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let name = expect_string(&arg(&args, 0))?;
        Ok(match name.as_str() {
            "nil" => Value::Nil,
            "t" => Value::T,
            _ => Value::symbol(&name),
        })
    });
}
