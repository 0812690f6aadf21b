pub mod context;
pub mod env;
pub mod error;
pub mod host;
pub mod value;

pub use context::{EvalContext, DEFAULT_MAX_DEPTH};
pub use env::Env;
pub use error::{CallFrame, MinelError, StackTrace};
pub use host::{Host, NullHost, ScriptedHost};
pub use value::{
    eq_value, equal_value, format_number, intern, resolve, with_resolved, ConsCell, Function, ListIter,
    Primitive, PrimitiveFn, Value,
};

pub use lasso::Spur;
