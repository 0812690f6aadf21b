use minel_core::{resolve, Env, EvalContext, Function, MinelError, PrimitiveFn, Spur, Value};
use tracing::debug;

use crate::eval::{eval_nth, eval_sequence, eval_value, EvalResult};

/// Bind the evaluation-controlling primitives and the `nil`/`t` globals.
pub fn register_special_forms(env: &Env) {
    env.define_str("nil", Value::Nil);
    env.define_str("t", Value::T);

    register(env, "quote", eval_quote);
    register(env, "if", eval_if);
    register(env, "unless", eval_unless);
    register(env, "while", eval_while);
    register(env, "dolist", eval_dolist);
    register(env, "let", eval_let);
    register(env, "progn", eval_progn);
    register(env, "and", eval_and);
    register(env, "or", eval_or);
    register(env, "eval", eval_eval);
    register(env, "defun", eval_defun);
    register(env, "defvar", eval_defvar);
    register(env, "defconst", eval_defvar);
    register(env, "setq", eval_setq);
    register(env, "fset", eval_fset);

    // declarations with no runtime meaning
    register(env, "defgroup", eval_ignore);
    register(env, "defcustom", eval_ignore);
    register(env, "eval-when-compile", eval_ignore);
}

fn register(env: &Env, name: &'static str, func: PrimitiveFn) {
    env.define_str(name, Value::primitive(name, func));
}

fn expect_symbol(v: &Value) -> Result<Spur, MinelError> {
    v.as_symbol_spur()
        .ok_or_else(|| MinelError::type_error_with_value("symbol", v.type_name(), v))
}

fn eval_quote(_ctx: &EvalContext, args: &Value, _env: &Env) -> EvalResult {
    args.car()
}

/// `(if COND THEN ELSE...)`
fn eval_if(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    if eval_nth(ctx, args, 0, env)?.is_truthy() {
        eval_nth(ctx, args, 1, env)
    } else {
        eval_sequence(ctx, &args.nthcdr(2)?, env)
    }
}

fn eval_unless(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    if eval_nth(ctx, args, 0, env)?.is_nil() {
        eval_sequence(ctx, &args.cdr()?, env)
    } else {
        Ok(Value::Nil)
    }
}

fn eval_while(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let body = args.cdr()?;
    let mut result = Value::Nil;
    while eval_nth(ctx, args, 0, env)?.is_truthy() {
        result = eval_sequence(ctx, &body, env)?;
    }
    Ok(result)
}

/// `(dolist (VAR LIST [RESULT]) BODY...)`
fn eval_dolist(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let spec = args.car()?;
    if !matches!(spec, Value::Cons(_)) {
        return Err(MinelError::type_error_with_value(
            "(var list [result])",
            spec.type_name(),
            &spec,
        ));
    }
    let var = expect_symbol(&spec.car()?)?;
    let items = eval_nth(ctx, &spec, 1, env)?;
    if !items.is_list() {
        return Err(MinelError::type_error_with_value(
            "list",
            items.type_name(),
            &items,
        ));
    }

    let body = args.cdr()?;
    let scope = Env::with_parent(env);
    for item in items.iter() {
        scope.define_local(var, item?);
        eval_sequence(ctx, &body, &scope)?;
    }
    eval_nth(ctx, &spec, 2, &scope)
}

/// `(let (BINDING...) BODY...)` where a binding is `SYM` or `(SYM INIT)`.
/// Inits see the bindings made before them.
fn eval_let(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let scope = Env::with_parent(env);
    for binding in args.car()?.iter() {
        match binding? {
            Value::Symbol(name) => scope.define_local(name, Value::Nil),
            spec @ Value::Cons(_) => {
                let name = expect_symbol(&spec.car()?)?;
                let value = eval_nth(ctx, &spec, 1, &scope)?;
                scope.define_local(name, value);
            }
            other => {
                return Err(MinelError::type_error_with_value(
                    "let binding",
                    other.type_name(),
                    &other,
                ))
            }
        }
    }
    eval_sequence(ctx, &args.cdr()?, &scope)
}

fn eval_progn(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    eval_sequence(ctx, args, env)
}

fn eval_and(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let mut result = Value::T;
    for form in args.iter() {
        result = eval_value(ctx, &form?, env)?;
        if result.is_nil() {
            return Ok(Value::Nil);
        }
    }
    Ok(result)
}

fn eval_or(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    for form in args.iter() {
        let result = eval_value(ctx, &form?, env)?;
        if result.is_truthy() {
            return Ok(result);
        }
    }
    Ok(Value::Nil)
}

fn eval_eval(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let form = eval_nth(ctx, args, 0, env)?;
    eval_value(ctx, &form, env)
}

/// `(defun NAME (PARAM...) BODY...)` binds into the current scope.
fn eval_defun(_ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let name = expect_symbol(&args.car()?)?;
    let params = args
        .nth(1)?
        .iter()
        .map(|p| expect_symbol(&p?))
        .collect::<Result<Vec<_>, _>>()?;
    let body = args.nthcdr(2)?.to_vec()?;
    debug!(name = %resolve(name), params = params.len(), "defun");
    let func = Value::function(Function { name, params, body });
    env.define_local(name, func.clone());
    Ok(func)
}

/// `defvar` and `defconst`: evaluate the initializer here, bind globally.
fn eval_defvar(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let name = expect_symbol(&args.car()?)?;
    let value = eval_nth(ctx, args, 1, env)?;
    debug!(name = %resolve(name), "defvar");
    env.root().define_local(name, value);
    Ok(Value::Symbol(name))
}

/// `(setq SYM VAL [SYM VAL]...)` assigns where each symbol is visible,
/// or globally. Returns the last value.
fn eval_setq(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let mut result = Value::Nil;
    let mut rest = args.clone();
    while !rest.is_nil() {
        let name = expect_symbol(&rest.car()?)?;
        let target = env.assignment_target(name);
        result = eval_nth(ctx, &rest, 1, env)?;
        target.define_local(name, result.clone());
        rest = rest.nthcdr(2)?;
    }
    Ok(result)
}

/// `(fset 'NAME 'OTHER)` gives NAME the current value of OTHER.
fn eval_fset(ctx: &EvalContext, args: &Value, env: &Env) -> EvalResult {
    let target = eval_nth(ctx, args, 0, env)?;
    let target = expect_symbol(&target)?;
    let source = eval_nth(ctx, args, 1, env)?;
    let source = expect_symbol(&source)?;
    let value = env
        .lookup(source)
        .ok_or_else(|| MinelError::unbound(resolve(source)))?;
    env.assign(target, value);
    Ok(Value::Symbol(source))
}

fn eval_ignore(_ctx: &EvalContext, _args: &Value, _env: &Env) -> EvalResult {
    Ok(Value::Nil)
}
