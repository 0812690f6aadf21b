use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use lasso::{Rodeo, Spur};

use crate::context::EvalContext;
use crate::env::Env;
use crate::error::MinelError;

thread_local! {
    static INTERNER: RefCell<Rodeo> = RefCell::new(Rodeo::default());
}

/// Intern a string, returning a Spur key.
pub fn intern(s: &str) -> Spur {
    INTERNER.with(|r| r.borrow_mut().get_or_intern(s))
}

/// Resolve a Spur key back to a String.
pub fn resolve(spur: Spur) -> String {
    INTERNER.with(|r| r.borrow().resolve(&spur).to_string())
}

/// Resolve a Spur and call f with the &str, avoiding allocation.
pub fn with_resolved<F, R>(spur: Spur, f: F) -> R
where
    F: FnOnce(&str) -> R,
{
    INTERNER.with(|r| {
        let interner = r.borrow();
        f(interner.resolve(&spur))
    })
}

/// A built-in operation. Receives its argument forms unevaluated together with
/// the calling scope and decides itself what to evaluate.
pub type PrimitiveFn = fn(&EvalContext, &Value, &Env) -> Result<Value, MinelError>;

pub struct Primitive {
    pub name: &'static str,
    pub func: PrimitiveFn,
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<subr {}>", self.name)
    }
}

/// A function created by `defun`. Parameters are a flat list of symbols.
#[derive(Debug)]
pub struct Function {
    pub name: Spur,
    pub params: Vec<Spur>,
    pub body: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct ConsCell {
    pub car: Value,
    pub cdr: Value,
}

// Unlink the cdr chain in a loop so freeing a long list does not recurse
// once per cell. A cell still shared elsewhere stops the walk.
impl Drop for ConsCell {
    fn drop(&mut self) {
        let mut next = std::mem::replace(&mut self.cdr, Value::Nil);
        while let Value::Cons(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(cell) => {
                    let mut cell = cell.into_inner();
                    next = std::mem::replace(&mut cell.cdr, Value::Nil);
                }
                Err(_) => break,
            }
        }
    }
}

/// Every runtime value. Strings, vectors and cons cells are shared handles:
/// cloning a `Value` aliases the same storage, so in-place mutation through
/// one binding is visible through every other.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    /// `t`, the canonical true value.
    T,
    Number(f64),
    Symbol(Spur),
    Str(Rc<RefCell<String>>),
    Vector(Rc<RefCell<Vec<Value>>>),
    Cons(Rc<RefCell<ConsCell>>),
    Quoted(Rc<Value>),
    Function(Rc<Function>),
    Primitive(Rc<Primitive>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::T => "t",
            Value::Number(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::Vector(_) => "vector",
            Value::Cons(_) => "cons",
            Value::Quoted(_) => "quoted",
            Value::Function(_) => "function",
            Value::Primitive(_) => "subr",
        }
    }

    pub fn symbol(s: &str) -> Value {
        Value::Symbol(intern(s))
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    pub fn string(s: &str) -> Value {
        Value::Str(Rc::new(RefCell::new(s.to_string())))
    }

    pub fn string_owned(s: String) -> Value {
        Value::Str(Rc::new(RefCell::new(s)))
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(Rc::new(RefCell::new(items)))
    }

    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Cons(Rc::new(RefCell::new(ConsCell { car, cdr })))
    }

    pub fn quoted(form: Value) -> Value {
        Value::Quoted(Rc::new(form))
    }

    pub fn primitive(name: &'static str, func: PrimitiveFn) -> Value {
        Value::Primitive(Rc::new(Primitive { name, func }))
    }

    pub fn function(f: Function) -> Value {
        Value::Function(Rc::new(f))
    }

    /// `t` for true, `nil` for false.
    pub fn bool(b: bool) -> Value {
        if b {
            Value::T
        } else {
            Value::Nil
        }
    }

    /// Build a proper list.
    pub fn list(items: Vec<Value>) -> Value {
        Value::list_with_tail(items, Value::Nil)
    }

    /// Build a list whose last cdr is `tail` instead of nil.
    pub fn list_with_tail(items: Vec<Value>, tail: Value) -> Value {
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Value::cons(item, acc))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    /// Nil or a cons cell.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::Nil | Value::Cons(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// A number usable as a non-negative index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
            _ => None,
        }
    }

    pub fn as_symbol_spur(&self) -> Option<Spur> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    /// Contents of a boxed string.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.borrow().clone()),
            _ => None,
        }
    }

    /// The car of a list; nil for nil.
    pub fn car(&self) -> Result<Value, MinelError> {
        match self {
            Value::Nil => Ok(Value::Nil),
            Value::Cons(cell) => Ok(cell.borrow().car.clone()),
            other => Err(MinelError::type_error_with_value(
                "list",
                other.type_name(),
                other,
            )),
        }
    }

    /// The cdr of a list; nil for nil.
    pub fn cdr(&self) -> Result<Value, MinelError> {
        match self {
            Value::Nil => Ok(Value::Nil),
            Value::Cons(cell) => Ok(cell.borrow().cdr.clone()),
            other => Err(MinelError::type_error_with_value(
                "list",
                other.type_name(),
                other,
            )),
        }
    }

    /// Drop `n` cells from the front, stopping early at nil.
    pub fn nthcdr(&self, n: usize) -> Result<Value, MinelError> {
        let mut cursor = self.clone();
        for _ in 0..n {
            if cursor.is_nil() {
                return Ok(Value::Nil);
            }
            cursor = cursor.cdr()?;
        }
        Ok(cursor)
    }

    /// The `n`th element, or nil if the list is shorter.
    pub fn nth(&self, n: usize) -> Result<Value, MinelError> {
        self.nthcdr(n)?.car()
    }

    pub fn iter(&self) -> ListIter {
        ListIter {
            cursor: self.clone(),
            done: false,
        }
    }

    /// Collect a proper list into a Vec.
    pub fn to_vec(&self) -> Result<Vec<Value>, MinelError> {
        self.iter().collect()
    }
}

/// Walks a list cell by cell. Yields a type error if the chain ends in
/// something other than nil.
pub struct ListIter {
    cursor: Value,
    done: bool,
}

impl Iterator for ListIter {
    type Item = Result<Value, MinelError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match std::mem::replace(&mut self.cursor, Value::Nil) {
            Value::Nil => {
                self.done = true;
                None
            }
            Value::Cons(cell) => {
                let pair = cell.borrow();
                self.cursor = pair.cdr.clone();
                Some(Ok(pair.car.clone()))
            }
            other => {
                self.done = true;
                Some(Err(MinelError::type_error_with_value(
                    "list",
                    other.type_name(),
                    &other,
                )))
            }
        }
    }
}

/// `eq`: identity for boxed values, value equality for atoms.
pub fn eq_value(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,
        (Value::T, Value::T) => true,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
        (Value::Vector(a), Value::Vector(b)) => Rc::ptr_eq(a, b),
        (Value::Cons(a), Value::Cons(b)) => Rc::ptr_eq(a, b),
        (Value::Quoted(a), Value::Quoted(b)) => Rc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Primitive(a), Value::Primitive(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// `equal`: structural comparison through conses, strings and vectors.
pub fn equal_value(left: &Value, right: &Value) -> bool {
    let mut left = left.clone();
    let mut right = right.clone();
    loop {
        let (next_left, next_right) = match (&left, &right) {
            (Value::Cons(a), Value::Cons(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                if !equal_value(&a.car, &b.car) {
                    return false;
                }
                (a.cdr.clone(), b.cdr.clone())
            }
            (Value::Str(a), Value::Str(b)) => return *a.borrow() == *b.borrow(),
            (Value::Vector(a), Value::Vector(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                return a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| equal_value(x, y));
            }
            (Value::Quoted(a), Value::Quoted(b)) => return equal_value(a, b),
            _ => return eq_value(&left, &right),
        };
        left = next_left;
        right = next_right;
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal_value(self, other)
    }
}

/// Integral values print without a decimal point.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::T => write!(f, "t"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Symbol(s) => with_resolved(*s, |name| write!(f, "{name}")),
            Value::Str(s) => write_escaped(f, &s.borrow()),
            Value::Vector(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Cons(_) => {
                write!(f, "(")?;
                let mut cursor = self.clone();
                let mut first = true;
                loop {
                    match cursor {
                        Value::Cons(cell) => {
                            let pair = cell.borrow();
                            if !first {
                                write!(f, " ")?;
                            }
                            first = false;
                            write!(f, "{}", pair.car)?;
                            cursor = pair.cdr.clone();
                        }
                        Value::Nil => break,
                        tail => {
                            write!(f, " . {tail}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Quoted(form) => write!(f, "'{form}"),
            Value::Function(func) => with_resolved(func.name, |n| write!(f, "#<function {n}>")),
            Value::Primitive(p) => write!(f, "#<subr {}>", p.name),
        }
    }
}
