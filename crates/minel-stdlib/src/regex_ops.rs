use minel_core::{MinelError, Value};
use regex::Regex;

use crate::{arg, eval_args, expect_string, register_fn};

/// Rewrite an Emacs regexp into `regex` crate syntax. Emacs groups,
/// alternation and intervals are backslashed; bare parens, bars and braces
/// match literally.
fn translate_emacs_regex(pattern: &str) -> Result<String, MinelError> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(g @ ('(' | ')' | '|' | '{' | '}')) => {
                    out.push(g);
                    // shy group
                    if g == '(' && chars.peek() == Some(&'?') {
                        chars.next();
                        if chars.next() != Some(':') {
                            return Err(MinelError::eval("unsupported group syntax in regexp"));
                        }
                        out.push_str("?:");
                    }
                }
                Some('`') => out.push_str("\\A"),
                Some('\'') => out.push_str("\\z"),
                Some('<' | '>') => out.push_str("\\b"),
                Some(e @ ('w' | 'W' | 'b' | 'B')) => {
                    out.push('\\');
                    out.push(e);
                }
                Some(d) if d.is_ascii_digit() => {
                    return Err(MinelError::eval("back references are not supported"));
                }
                Some(negate @ ('s' | 'S')) => {
                    out.push_str(syntax_class(chars.next(), negate == 'S')?)
                }
                Some(other) if other.is_ascii_alphanumeric() => {
                    return Err(MinelError::eval(format!(
                        "unsupported escape \\{other} in regexp"
                    )));
                }
                Some(other) => out.push_str(&regex::escape(&other.to_string())),
                None => return Err(MinelError::eval("trailing backslash in regexp")),
            },
            '(' | ')' | '|' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '[' => translate_class(&mut chars, &mut out)?,
            c => out.push(c),
        }
    }
    Ok(out)
}

/// `\sC` and `\SC` for the whitespace and word syntax codes.
fn syntax_class(code: Option<char>, negated: bool) -> Result<&'static str, MinelError> {
    match (code, negated) {
        (Some('-' | ' '), false) => Ok("\\s"),
        (Some('-' | ' '), true) => Ok("\\S"),
        (Some('w'), false) => Ok("\\w"),
        (Some('w'), true) => Ok("\\W"),
        (Some(c), _) => Err(MinelError::eval(format!(
            "unsupported syntax class `{c}` in regexp"
        ))),
        (None, _) => Err(MinelError::eval("trailing syntax class escape in regexp")),
    }
}

/// Copy a bracket expression. Backslash is literal inside Emacs classes.
fn translate_class(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
) -> Result<(), MinelError> {
    out.push('[');
    if chars.peek() == Some(&'^') {
        chars.next();
        out.push('^');
    }
    if chars.peek() == Some(&']') {
        chars.next();
        out.push_str("\\]");
    }
    loop {
        match chars.next() {
            None => return Err(MinelError::eval("unmatched [ in regexp")),
            Some(']') => break,
            Some('[') if chars.peek() == Some(&':') => {
                out.push_str("[:");
                chars.next();
                for c in chars.by_ref() {
                    out.push(c);
                    if c == ']' {
                        break;
                    }
                }
            }
            Some(c @ ('\\' | '[' | '&' | '~')) => {
                out.push('\\');
                out.push(c);
            }
            Some(c) => out.push(c),
        }
    }
    out.push(']');
    Ok(())
}

fn compile_regex(pattern: &str) -> Result<Regex, MinelError> {
    let translated = translate_emacs_regex(pattern)?;
    Regex::new(&translated).map_err(|e| MinelError::eval(format!("invalid regexp: {e}")))
}

pub fn register(env: &minel_core::Env) {
    // Returns the character index of the first match, or nil.
    register_fn(env, "string-match", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let pattern = expect_string(&arg(&args, 0))?;
        let text = expect_string(&arg(&args, 1))?;
        let re = compile_regex(&pattern)?;
        Ok(match re.find(&text) {
            Some(m) => Value::Number(text[..m.start()].chars().count() as f64),
            None => Value::Nil,
        })
    });
}
