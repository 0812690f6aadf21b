use minel_core::{resolve, CallFrame, Env, EvalContext, Function, MinelError, Value};
use tracing::trace;

pub type EvalResult = Result<Value, MinelError>;

/// RAII guard that truncates the call stack on drop.
struct CallStackGuard<'a> {
    ctx: &'a EvalContext,
    entry_depth: usize,
}

impl Drop for CallStackGuard<'_> {
    fn drop(&mut self) {
        self.ctx.truncate_call_stack(self.entry_depth);
    }
}

/// RAII guard for one level of form evaluation.
struct EvalDepthGuard<'a> {
    ctx: &'a EvalContext,
}

impl<'a> EvalDepthGuard<'a> {
    fn enter(ctx: &'a EvalContext) -> Result<Self, MinelError> {
        ctx.enter_eval()?;
        Ok(EvalDepthGuard { ctx })
    }
}

impl Drop for EvalDepthGuard<'_> {
    fn drop(&mut self) {
        self.ctx.leave_eval();
    }
}

/// The core eval function: evaluate a Value in an environment.
pub fn eval_value(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    match expr {
        // Self-evaluating forms
        Value::Nil
        | Value::T
        | Value::Number(_)
        | Value::Str(_)
        | Value::Vector(_)
        | Value::Function(_)
        | Value::Primitive(_) => Ok(expr.clone()),

        Value::Quoted(inner) => Ok((**inner).clone()),

        Value::Symbol(name) => env
            .lookup(*name)
            .ok_or_else(|| MinelError::unbound(resolve(*name))),

        Value::Cons(cell) => {
            let _depth = EvalDepthGuard::enter(ctx)?;
            let (head, args) = {
                let pair = cell.borrow();
                (pair.car.clone(), pair.cdr.clone())
            };
            match callee(ctx, &head, env)? {
                Value::Primitive(prim) => (prim.func)(ctx, &args, env),
                Value::Function(func) => apply_function(ctx, &func, &args, env),
                Value::Nil => Err(MinelError::UnboundFunction(head.to_string())),
                other => Err(MinelError::NotCallable(format!(
                    "{other} ({})",
                    other.type_name()
                ))),
            }
        }
    }
}

/// The value in call position. An unbound head symbol is reported as a
/// missing function rather than a missing variable.
fn callee(ctx: &EvalContext, head: &Value, env: &Env) -> EvalResult {
    match head {
        Value::Symbol(name) => env
            .lookup(*name)
            .ok_or_else(|| MinelError::UnboundFunction(resolve(*name))),
        other => eval_value(ctx, other, env),
    }
}

/// Call a user function. Argument forms are evaluated in the caller's scope
/// and bound pairwise until either list runs out; the new frame's parent is
/// the caller's scope.
pub fn apply_function(
    ctx: &EvalContext,
    func: &Function,
    args: &Value,
    env: &Env,
) -> EvalResult {
    let entry_depth = ctx.call_stack_depth();
    let frame = Env::with_parent(env);
    let mut remaining = args.clone();
    for param in &func.params {
        let (form, rest) = match &remaining {
            Value::Cons(cell) => {
                let pair = cell.borrow();
                (pair.car.clone(), pair.cdr.clone())
            }
            _ => break,
        };
        frame.define_local(*param, eval_value(ctx, &form, env)?);
        remaining = rest;
    }

    let name = resolve(func.name);
    let _guard = CallStackGuard { ctx, entry_depth };
    ctx.push_call_frame(CallFrame { name: name.clone() });
    trace!(function = %name, depth = entry_depth + 1, "enter");

    match eval_body(ctx, &func.body, &frame) {
        Ok(v) => {
            trace!(function = %name, "exit");
            Ok(v)
        }
        Err(e) if e.stack_trace().is_none() => Err(e.with_stack_trace(ctx.capture_stack_trace())),
        Err(e) => Err(e),
    }
}

/// Evaluate forms in order, returning the last value (nil when empty).
pub fn eval_body(ctx: &EvalContext, body: &[Value], env: &Env) -> EvalResult {
    let mut result = Value::Nil;
    for form in body {
        result = eval_value(ctx, form, env)?;
    }
    Ok(result)
}

/// Like [`eval_body`] over a form list.
pub fn eval_sequence(ctx: &EvalContext, forms: &Value, env: &Env) -> EvalResult {
    let mut result = Value::Nil;
    for form in forms.iter() {
        result = eval_value(ctx, &form?, env)?;
    }
    Ok(result)
}

/// Evaluate the `n`th raw argument form. A missing argument evaluates to nil.
pub fn eval_nth(ctx: &EvalContext, args: &Value, n: usize, env: &Env) -> EvalResult {
    eval_value(ctx, &args.nth(n)?, env)
}
