//! # Minel
//!
//! A minimal Emacs Lisp interpreter for running self-contained
//! text-adventure scripts inside a host application.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minel::{Interpreter, ScriptedHost};
//!
//! let host = ScriptedHost::new(["look"]);
//! let output = host.output_handle();
//! let interp = Interpreter::builder().with_host(host).build();
//! interp
//!     .run_program(r#"(send-string-to-terminal (read-from-minibuffer "> "))"#)
//!     .unwrap();
//! assert_eq!(output.borrow().concat(), "> look");
//! ```
//!
//! Scripts are dynamically scoped: a function body sees the bindings of
//! whoever called it. Strings, vectors and cons cells are shared by
//! reference, so `aset`, `rplaca` and `append` are visible through every
//! binding of the same object.
//!
//! A fatal error leaves the interpreter unusable; build a new one to run
//! another script.

use std::cell::Cell;

pub use minel_core::{
    intern, resolve, CallFrame, Env, EvalContext, Host, MinelError, NullHost, PrimitiveFn,
    ScriptedHost, StackTrace, Value, DEFAULT_MAX_DEPTH,
};
pub use minel_reader::{read, read_many, read_program, scan_identifiers};

pub type Result<T> = std::result::Result<T, MinelError>;

/// Builder for configuring an [`Interpreter`] before construction.
///
/// ```rust
/// use minel::Interpreter;
///
/// let interp = Interpreter::builder()
///     .with_seed(7)
///     .with_max_depth(64)
///     .build();
/// let val = interp.eval_str("(random 10)").unwrap();
/// assert!(val.as_number().unwrap() < 10.0);
/// ```
pub struct InterpreterBuilder {
    host: Box<dyn Host>,
    max_depth: usize,
    seed: Option<u64>,
    stdlib: bool,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            host: Box::new(NullHost),
            max_depth: DEFAULT_MAX_DEPTH,
            seed: None,
            stdlib: true,
        }
    }

    /// Route terminal output, minibuffer input and exit requests to `host`.
    pub fn with_host(mut self, host: impl Host + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Maximum nesting of evaluated forms, counting special forms and calls alike.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Make `random` reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether to register the data primitives. Special forms are always
    /// available.
    pub fn with_stdlib(mut self, enabled: bool) -> Self {
        self.stdlib = enabled;
        self
    }

    pub fn without_stdlib(self) -> Self {
        self.with_stdlib(false)
    }

    pub fn build(self) -> Interpreter {
        let global_env = Env::new();
        minel_eval::register_special_forms(&global_env);
        if self.stdlib {
            minel_stdlib::register_stdlib(&global_env);
        }

        let ctx = EvalContext::with_host(self.host);
        ctx.set_max_depth(self.max_depth);
        if let Some(seed) = self.seed {
            ctx.seed_rng(seed);
        }

        Interpreter {
            global_env,
            ctx,
            poisoned: Cell::new(false),
        }
    }
}

/// One script run: a global environment, a call stack and a host.
pub struct Interpreter {
    global_env: Env,
    ctx: EvalContext,
    poisoned: Cell<bool>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter with the full library and a [`NullHost`].
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Evaluate one form in the global environment.
    pub fn eval(&self, expr: &Value) -> Result<Value> {
        self.check_usable()?;
        let result = minel_eval::eval_value(&self.ctx, expr, &self.global_env);
        self.settle(result)
    }

    /// Read every form in `input`, then evaluate them in order and return the
    /// last result. Nothing is evaluated if the source does not parse.
    pub fn eval_str(&self, input: &str) -> Result<Value> {
        self.check_usable()?;
        let forms = self.settle(read_many(input))?;
        let mut result = Value::Nil;
        for form in &forms {
            result = self.settle(minel_eval::eval_value(&self.ctx, form, &self.global_env))?;
        }
        Ok(result)
    }

    /// Read the whole source as one `(progn ...)` form and evaluate it.
    pub fn run_program(&self, source: &str) -> Result<Value> {
        self.check_usable()?;
        let program = self.settle(read_program(source))?;
        self.eval(&program)
    }

    pub fn global_env(&self) -> &Env {
        &self.global_env
    }

    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// Bind a host-provided primitive. It receives its argument forms
    /// unevaluated.
    pub fn register_primitive(&self, name: &'static str, func: PrimitiveFn) {
        self.global_env.define_str(name, Value::primitive(name, func));
    }

    /// True once a fatal error has been returned.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.get()
    }

    fn check_usable(&self) -> Result<()> {
        if self.poisoned.get() {
            return Err(MinelError::eval(
                "interpreter is unusable after a fatal error",
            ));
        }
        Ok(())
    }

    fn settle<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.poisoned.set(true);
            self.ctx.truncate_call_stack(0);
        }
        result
    }
}

/// Run a whole script against `host`. A `kill-emacs` counts as a normal end.
/// Any other error is reported, with its call stack, to the log and to the
/// host's diagnostic channel before being returned.
pub fn evaluate_program(source: &str, host: impl Host + 'static) -> Result<()> {
    let interp = Interpreter::builder().with_host(host).build();
    match interp.run_program(source) {
        Ok(_) => Ok(()),
        Err(e) if e.is_exit() => {
            tracing::debug!("script requested exit");
            Ok(())
        }
        Err(e) => {
            let report = error_report(&e);
            tracing::warn!("{}", report.trim_end());
            interp.context().debug(&report);
            Err(e)
        }
    }
}

/// An error message followed by its call stack, innermost frame last.
pub fn error_report(err: &MinelError) -> String {
    let mut report = format!("{err}\n");
    if let Some(trace) = err.stack_trace() {
        report.push_str(&trace.to_string());
    }
    report
}
