mod arithmetic;
mod comparison;
mod io;
mod keymap;
mod list;
mod predicates;
mod regex_ops;
mod string;
mod vector;

use minel_core::{Env, EvalContext, MinelError, PrimitiveFn, Value};

/// Bind every data primitive plus the `emacs-version` and `noninteractive`
/// globals. Special forms are registered separately by `minel-eval`.
pub fn register_stdlib(env: &Env) {
    arithmetic::register(env);
    comparison::register(env);
    predicates::register(env);
    list::register(env);
    string::register(env);
    vector::register(env);
    regex_ops::register(env);
    keymap::register(env);
    io::register(env);

    env.define_str("emacs-version", Value::string("22.1.1"));
    env.define_str("noninteractive", Value::T);
}

fn register_fn(env: &Env, name: &'static str, f: PrimitiveFn) {
    env.define_str(name, Value::primitive(name, f));
}

/// Evaluate each argument form left to right.
fn eval_args(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Vec<Value>, MinelError> {
    args.iter()
        .map(|form| minel_eval::eval_value(ctx, &form?, env))
        .collect()
}

/// The `i`th evaluated argument; a missing argument is nil.
fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Nil)
}

fn expect_number(v: &Value) -> Result<f64, MinelError> {
    v.as_number()
        .ok_or_else(|| MinelError::type_error_with_value("number", v.type_name(), v))
}

fn expect_index(v: &Value) -> Result<usize, MinelError> {
    v.as_index()
        .ok_or_else(|| MinelError::type_error_with_value("natural number", v.type_name(), v))
}

fn expect_string(v: &Value) -> Result<String, MinelError> {
    v.as_string()
        .ok_or_else(|| MinelError::type_error_with_value("string", v.type_name(), v))
}

fn expect_list(v: &Value) -> Result<&Value, MinelError> {
    if v.is_list() {
        Ok(v)
    } else {
        Err(MinelError::type_error_with_value("list", v.type_name(), v))
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use minel_core::{Env, EvalContext, Host, MinelError, Value};

    pub fn context_with(host: impl Host + 'static) -> (EvalContext, Env) {
        let env = Env::new();
        minel_eval::register_special_forms(&env);
        super::register_stdlib(&env);
        let ctx = EvalContext::with_host(Box::new(host));
        ctx.seed_rng(42);
        (ctx, env)
    }

    pub fn eval_in(ctx: &EvalContext, env: &Env, src: &str) -> Result<Value, MinelError> {
        let program = minel_reader::read_program(src)?;
        minel_eval::eval_value(ctx, &program, env)
    }

    pub fn eval_str(src: &str) -> Result<Value, MinelError> {
        let (ctx, env) = context_with(minel_core::NullHost);
        eval_in(&ctx, &env, src)
    }

    /// Evaluate and render the result with `Display`.
    pub fn show(src: &str) -> String {
        match eval_str(src) {
            Ok(v) => v.to_string(),
            Err(e) => format!("error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::{eval_str, show};
    use minel_core::Value;

    #[test]
    fn globals_are_defined() {
        assert_eq!(show("emacs-version"), "\"22.1.1\"");
        assert!(matches!(eval_str("noninteractive").unwrap(), Value::T));
    }

    #[test]
    fn missing_arguments_read_as_nil() {
        assert!(eval_str("(car)").unwrap().is_nil());
    }
}
