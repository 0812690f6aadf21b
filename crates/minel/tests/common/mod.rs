#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use minel::{Host, Interpreter, MinelError, Value};

#[derive(Debug, Default)]
pub struct Recording {
    pub printed: Vec<String>,
    pub diagnostics: Vec<String>,
    pub exits: usize,
    pub reads: usize,
}

impl Recording {
    pub fn transcript(&self) -> String {
        self.printed.concat()
    }
}

/// Replays canned input and records everything the interpreter sends back.
pub struct RecordingHost {
    input: VecDeque<String>,
    log: Rc<RefCell<Recording>>,
}

impl RecordingHost {
    pub fn new(lines: &[&str]) -> (Self, Rc<RefCell<Recording>>) {
        let log = Rc::new(RefCell::new(Recording::default()));
        let host = RecordingHost {
            input: lines.iter().map(|l| format!("{l}\n")).collect(),
            log: Rc::clone(&log),
        };
        (host, log)
    }
}

impl Host for RecordingHost {
    fn print(&mut self, text: &str) {
        self.log.borrow_mut().printed.push(text.to_string());
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.log.borrow_mut().reads += 1;
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script input exhausted"))
    }

    fn on_exit(&mut self) {
        self.log.borrow_mut().exits += 1;
    }

    fn debug(&mut self, message: &str) {
        self.log.borrow_mut().diagnostics.push(message.to_string());
    }
}

/// Run a whole program and return its value.
pub fn run(source: &str) -> Value {
    Interpreter::new()
        .run_program(source)
        .unwrap_or_else(|e| panic!("program failed: {source}\n{e}"))
}

pub fn run_err(source: &str) -> MinelError {
    match Interpreter::new().run_program(source) {
        Ok(v) => panic!("expected error for: {source}, got {v}"),
        Err(e) => e,
    }
}

/// Run a program and render its value with `Display`.
pub fn show(source: &str) -> String {
    run(source).to_string()
}

/// Run a program against scripted input, returning the result and the log.
pub fn run_with_input(
    source: &str,
    lines: &[&str],
) -> (Result<Value, MinelError>, Rc<RefCell<Recording>>) {
    let (host, log) = RecordingHost::new(lines);
    let interp = Interpreter::builder().with_host(host).with_seed(1).build();
    (interp.run_program(source), log)
}
