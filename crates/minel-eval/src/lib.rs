mod eval;
mod special_forms;

pub use eval::{apply_function, eval_body, eval_nth, eval_sequence, eval_value, EvalResult};
pub use special_forms::register_special_forms;
