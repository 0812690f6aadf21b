use std::fmt;

use crate::value::Value;

/// A single active user-function call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    pub name: String,
}

/// A captured call stack, outermost first and innermost last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackTrace(pub Vec<CallFrame>);

impl StackTrace {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.name.as_str()).collect()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.0 {
            writeln!(f, "  in {}", frame.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MinelError {
    #[error("Parse error at {line}:{col}: {message}")]
    Parse {
        message: String,
        line: usize,
        col: usize,
    },

    #[error("Unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("Unbound function: {0}")]
    UnboundFunction(String),

    #[error("Type error: expected {expected}, got {got}{}", got_value.as_ref().map(|v| format!(" ({v})")).unwrap_or_default())]
    Type {
        expected: String,
        got: String,
        got_value: Option<String>,
    },

    #[error("Not callable: {0}")]
    NotCallable(String),

    #[error("Eval error: {0}")]
    Eval(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Evaluation depth limit of {0} exceeded")]
    DepthExceeded(usize),

    /// The script asked to end the session. Not a failure.
    #[error("exit requested")]
    Exit,

    #[error("{inner}")]
    WithTrace {
        inner: Box<MinelError>,
        trace: StackTrace,
    },
}

impl MinelError {
    pub fn parse(message: impl Into<String>, line: usize, col: usize) -> Self {
        MinelError::Parse {
            message: message.into(),
            line,
            col,
        }
    }

    pub fn eval(msg: impl Into<String>) -> Self {
        MinelError::Eval(msg.into())
    }

    pub fn unbound(name: impl Into<String>) -> Self {
        MinelError::UnboundSymbol(name.into())
    }

    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        MinelError::Type {
            expected: expected.into(),
            got: got.into(),
            got_value: None,
        }
    }

    pub fn type_error_with_value(
        expected: impl Into<String>,
        got: impl Into<String>,
        value: &Value,
    ) -> Self {
        let display = format!("{value}");
        let truncated = if display.chars().count() > 40 {
            let head: String = display.chars().take(39).collect();
            format!("{head}…")
        } else {
            display
        };
        MinelError::Type {
            expected: expected.into(),
            got: got.into(),
            got_value: Some(truncated),
        }
    }

    /// Wrap this error with a stack trace (no-op if already wrapped, if the
    /// trace is empty, or for an exit request).
    pub fn with_stack_trace(self, trace: StackTrace) -> Self {
        if trace.is_empty() {
            return self;
        }
        match self {
            MinelError::WithTrace { .. } | MinelError::Exit => self,
            other => MinelError::WithTrace {
                inner: Box::new(other),
                trace,
            },
        }
    }

    pub fn stack_trace(&self) -> Option<&StackTrace> {
        match self {
            MinelError::WithTrace { trace, .. } => Some(trace),
            _ => None,
        }
    }

    pub fn inner(&self) -> &MinelError {
        match self {
            MinelError::WithTrace { inner, .. } => inner.inner(),
            other => other,
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.inner(), MinelError::Exit)
    }
}
