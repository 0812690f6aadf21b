use std::cell::{Cell, RefCell};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::host::{Host, NullHost};
use crate::{CallFrame, MinelError, StackTrace};

/// Nesting limit for form evaluation before a run is aborted. Sized so a
/// runaway recursion stops well inside a 2 MB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 300;

/// Per-interpreter state shared by the evaluator and every primitive.
pub struct EvalContext {
    pub call_stack: RefCell<Vec<CallFrame>>,
    pub max_depth: Cell<usize>,
    eval_depth: Cell<usize>,
    host: RefCell<Box<dyn Host>>,
    rng: RefCell<StdRng>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::with_host(Box::new(NullHost))
    }

    pub fn with_host(host: Box<dyn Host>) -> Self {
        EvalContext {
            call_stack: RefCell::new(Vec::new()),
            max_depth: Cell::new(DEFAULT_MAX_DEPTH),
            eval_depth: Cell::new(0),
            host: RefCell::new(host),
            rng: RefCell::new(StdRng::from_os_rng()),
        }
    }

    /// Make `random` reproducible.
    pub fn seed_rng(&self, seed: u64) {
        *self.rng.borrow_mut() = StdRng::seed_from_u64(seed);
    }

    pub fn set_max_depth(&self, depth: usize) {
        self.max_depth.set(depth);
    }

    /// Enter one level of form evaluation, failing once `max_depth` levels
    /// are already active. Pair every `Ok` with [`EvalContext::leave_eval`].
    pub fn enter_eval(&self) -> Result<(), MinelError> {
        let depth = self.eval_depth.get();
        let limit = self.max_depth.get();
        if depth >= limit {
            return Err(MinelError::DepthExceeded(limit));
        }
        self.eval_depth.set(depth + 1);
        Ok(())
    }

    pub fn leave_eval(&self) {
        self.eval_depth.set(self.eval_depth.get().saturating_sub(1));
    }

    pub fn eval_depth(&self) -> usize {
        self.eval_depth.get()
    }

    pub fn push_call_frame(&self, frame: CallFrame) {
        self.call_stack.borrow_mut().push(frame);
    }

    pub fn pop_call_frame(&self) {
        self.call_stack.borrow_mut().pop();
    }

    pub fn call_stack_depth(&self) -> usize {
        self.call_stack.borrow().len()
    }

    pub fn truncate_call_stack(&self, depth: usize) {
        self.call_stack.borrow_mut().truncate(depth);
    }

    pub fn capture_stack_trace(&self) -> StackTrace {
        StackTrace(self.call_stack.borrow().clone())
    }

    pub fn print(&self, text: &str) {
        self.host.borrow_mut().print(text);
    }

    pub fn read_line(&self) -> Result<String, MinelError> {
        self.host
            .borrow_mut()
            .read_line()
            .map_err(|e| MinelError::Io(e.to_string()))
    }

    /// Notify the host and produce the error that unwinds the run.
    pub fn exit(&self) -> MinelError {
        self.host.borrow_mut().on_exit();
        MinelError::Exit
    }

    pub fn debug(&self, message: &str) {
        self.host.borrow_mut().debug(message);
    }

    /// Uniform integer in `0..bound`. `bound` must be positive.
    pub fn random_below(&self, bound: u64) -> u64 {
        self.rng.borrow_mut().random_range(0..bound)
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}
