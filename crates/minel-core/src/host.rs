use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

/// The world outside the interpreter: where terminal output goes, where
/// minibuffer input comes from, and who hears about an exit request.
pub trait Host {
    fn print(&mut self, text: &str);

    /// One line of input including its trailing newline, if any.
    fn read_line(&mut self) -> io::Result<String>;

    fn on_exit(&mut self) {}

    fn debug(&mut self, _message: &str) {}
}

/// Discards output; input is always at end of file.
#[derive(Debug, Default)]
pub struct NullHost;

impl Host for NullHost {
    fn print(&mut self, _text: &str) {}

    fn read_line(&mut self) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no input available"))
    }
}

/// Replays canned input lines and records output. The output log is shared
/// so a caller can keep a handle after boxing the host into an interpreter.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    input: VecDeque<String>,
    output: Rc<RefCell<Vec<String>>>,
    exits: Rc<RefCell<usize>>,
}

impl ScriptedHost {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedHost {
            input: lines.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn output_handle(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.output)
    }

    pub fn exit_handle(&self) -> Rc<RefCell<usize>> {
        Rc::clone(&self.exits)
    }

    /// Everything printed so far, concatenated.
    pub fn transcript(&self) -> String {
        self.output.borrow().concat()
    }
}

impl Host for ScriptedHost {
    fn print(&mut self, text: &str) {
        self.output.borrow_mut().push(text.to_string());
    }

    fn read_line(&mut self) -> io::Result<String> {
        match self.input.pop_front() {
            Some(mut line) => {
                if !line.ends_with('\n') {
                    line.push('\n');
                }
                Ok(line)
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted input exhausted",
            )),
        }
    }

    fn on_exit(&mut self) {
        *self.exits.borrow_mut() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_host_has_no_input() {
        let mut host = NullHost;
        host.print("ignored");
        let err = host.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn scripted_host_replays_lines_with_newline() {
        let mut host = ScriptedHost::new(["look", "quit\n"]);
        assert_eq!(host.read_line().unwrap(), "look\n");
        assert_eq!(host.read_line().unwrap(), "quit\n");
        assert!(host.read_line().is_err());
    }

    #[test]
    fn scripted_host_output_is_shared() {
        let mut host = ScriptedHost::new(Vec::<String>::new());
        let out = host.output_handle();
        let exits = host.exit_handle();
        host.print("a");
        host.print("b");
        host.on_exit();
        assert_eq!(out.borrow().concat(), "ab");
        assert_eq!(host.transcript(), "ab");
        assert_eq!(*exits.borrow(), 1);
    }
}
