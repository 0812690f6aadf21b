use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use minel::{error_report, Host, Interpreter, InterpreterBuilder, DEFAULT_MAX_DEPTH};

#[derive(Parser)]
#[command(name = "minel", about = "Minel: a minimal Emacs Lisp for text adventures")]
struct Cli {
    /// Script to run
    file: Option<String>,

    /// Evaluate an expression and print the result
    #[arg(short, long)]
    eval: Option<String>,

    /// Seed for `random`
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum nesting of evaluated forms
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// List the symbols in FILE starting with PREFIX instead of running it
    #[arg(long, value_name = "PREFIX")]
    symbols: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

/// Terminal I/O: output to stdout, input through a line editor when stdin is
/// a terminal.
struct TerminalHost {
    editor: Option<DefaultEditor>,
    /// Text printed since the last newline, reused as the input prompt.
    pending: String,
}

impl TerminalHost {
    fn new() -> Self {
        let editor = if io::stdin().is_terminal() {
            DefaultEditor::new().ok()
        } else {
            None
        };
        TerminalHost {
            editor,
            pending: String::new(),
        }
    }
}

impl Host for TerminalHost {
    fn print(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
        match text.rfind('\n') {
            Some(pos) => self.pending = text[pos + 1..].to_string(),
            None => self.pending.push_str(text),
        }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let prompt = std::mem::take(&mut self.pending);
        match &mut self.editor {
            Some(editor) => match editor.readline(&prompt) {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    Ok(line + "\n")
                }
                Err(ReadlineError::Eof) => Err(io::ErrorKind::UnexpectedEof.into()),
                Err(ReadlineError::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
                Err(ReadlineError::Io(e)) => Err(e),
                Err(e) => Err(io::Error::other(e.to_string())),
            },
            None => {
                let mut line = String::new();
                if io::stdin().lock().read_line(&mut line)? == 0 {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
                Ok(line)
            }
        }
    }

    fn on_exit(&mut self) {
        tracing::debug!("kill-emacs called");
    }

    fn debug(&mut self, message: &str) {
        eprint!("{message}");
        if !message.ends_with('\n') {
            eprintln!();
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn builder(cli: &Cli) -> InterpreterBuilder {
    let builder = Interpreter::builder()
        .with_host(TerminalHost::new())
        .with_max_depth(cli.max_depth);
    match cli.seed {
        Some(seed) => builder.with_seed(seed),
        None => builder,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(expr) = &cli.eval {
        let interpreter = builder(&cli).build();
        return match interpreter.eval_str(expr) {
            Ok(val) => {
                println!("{val}");
                ExitCode::SUCCESS
            }
            Err(e) if e.is_exit() => ExitCode::SUCCESS,
            Err(e) => {
                eprint!("Error: {}", error_report(&e));
                ExitCode::FAILURE
            }
        };
    }

    if let Some(file) = &cli.file {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Error reading {file}: {e}");
                return ExitCode::FAILURE;
            }
        };

        if let Some(prefix) = &cli.symbols {
            return match minel::scan_identifiers(&source, |name| name.starts_with(prefix.as_str())) {
                Ok(names) => {
                    for name in names {
                        println!("{name}");
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error in {file}: {e}");
                    ExitCode::FAILURE
                }
            };
        }

        let interpreter = builder(&cli).build();
        return match interpreter.run_program(&source) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) if e.is_exit() => ExitCode::SUCCESS,
            Err(e) => {
                tracing::warn!("{file} failed: {e}");
                eprint!("Error in {file}: {}", error_report(&e));
                ExitCode::FAILURE
            }
        };
    }

    if cli.symbols.is_some() {
        eprintln!("--symbols needs a FILE");
        return ExitCode::FAILURE;
    }

    repl(&cli)
}

fn repl(cli: &Cli) -> ExitCode {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Minel v{}", env!("CARGO_PKG_VERSION"));
    println!("Type ,quit to exit\n");

    let mut interpreter = builder(cli).build();
    let mut buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "  ... " } else { "minel> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if !in_multiline && matches!(line.trim(), ",quit" | ",exit" | ",q") {
                    break;
                }

                if in_multiline {
                    buffer.push('\n');
                    buffer.push_str(&line);
                } else {
                    buffer = line;
                }

                if !is_balanced(&buffer) {
                    in_multiline = true;
                    continue;
                }

                in_multiline = false;
                let input = buffer.trim().to_string();
                buffer.clear();
                if input.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&input);

                match interpreter.eval_str(&input) {
                    Ok(val) => println!("{val}"),
                    Err(e) if e.is_exit() => break,
                    Err(e) => {
                        eprint!("Error: {}", error_report(&e));
                        eprintln!("(session reset)");
                        interpreter = builder(cli).build();
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    buffer.clear();
                    in_multiline = false;
                    println!("^C");
                    continue;
                }
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// True when every paren outside strings and comments is closed.
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut in_comment = false;
    let mut escape = false;
    for ch in input.chars() {
        if in_comment {
            in_comment = ch != '\n';
            continue;
        }
        if escape {
            escape = false;
            continue;
        }
        if ch == '\\' {
            escape = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match ch {
            ';' => in_comment = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0 && !in_string
}
