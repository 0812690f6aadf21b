use minel_core::MinelError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    Number(f64),
    Str(String),
    Symbol(String),
    /// A lone `.` word, the dotted-pair marker.
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r')
}

/// Characters that end a bare word.
fn is_word_end(c: char) -> bool {
    is_space(c) || c == ')' || c == '"'
}

fn string_escape(c: char) -> Option<char> {
    Some(match c {
        'a' => '\x07',
        'b' => '\x08',
        't' => '\t',
        'n' => '\n',
        'v' => '\x0b',
        'f' => '\x0c',
        'r' => '\r',
        'e' => '\x1b',
        's' => ' ',
        'd' => '\x7f',
        _ => return None,
    })
}

/// Optional sign, then a digit or a `.` followed by a digit.
fn looks_numeric(word: &str) -> bool {
    let rest = word.strip_prefix(['+', '-']).unwrap_or(word);
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn classify_word(word: String, span: Span) -> Result<Token, MinelError> {
    if word == "." {
        return Ok(Token::Dot);
    }
    if looks_numeric(&word) {
        if let Ok(n) = word.parse::<f64>() {
            return Ok(Token::Number(n));
        }
    }
    if let Some(rest) = word.strip_prefix('?') {
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Token::Number(c as u32 as f64)),
            _ => Err(MinelError::parse(
                format!("malformed character literal: {word}"),
                span.line,
                span.col,
            )),
        };
    }
    Ok(Token::Symbol(word))
}

pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, MinelError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut line = 1;
    let mut col = 1;

    while i < chars.len() {
        let ch = chars[i];
        let span = Span { line, col };

        match ch {
            '\n' => {
                line += 1;
                col = 1;
                i += 1;
            }
            c if is_space(c) => {
                col += 1;
                i += 1;
            }

            ';' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                    col += 1;
                }
            }

            '(' => {
                tokens.push(SpannedToken {
                    token: Token::LParen,
                    span,
                });
                col += 1;
                i += 1;
            }
            ')' => {
                tokens.push(SpannedToken {
                    token: Token::RParen,
                    span,
                });
                col += 1;
                i += 1;
            }
            '\'' => {
                tokens.push(SpannedToken {
                    token: Token::Quote,
                    span,
                });
                col += 1;
                i += 1;
            }

            '"' => {
                let mut s = String::new();
                i += 1;
                col += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        i += 1;
                        col += 1;
                        match chars[i] {
                            // line continuation
                            '\n' => {
                                line += 1;
                                col = 0;
                            }
                            c => s.push(string_escape(c).unwrap_or(c)),
                        }
                    } else {
                        if chars[i] == '\n' {
                            line += 1;
                            col = 0;
                        }
                        s.push(chars[i]);
                    }
                    i += 1;
                    col += 1;
                }
                if i >= chars.len() {
                    return Err(MinelError::parse("unterminated string", span.line, span.col));
                }
                i += 1; // closing quote
                col += 1;
                tokens.push(SpannedToken {
                    token: Token::Str(s),
                    span,
                });
            }

            _ => {
                let start = i;
                while i < chars.len() && !is_word_end(chars[i]) {
                    i += 1;
                    col += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(SpannedToken {
                    token: classify_word(word, span)?,
                    span,
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        tokenize(src).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn numbers_and_symbols() {
        assert_eq!(
            kinds("42 -3 +7 1.5 .5 1+ - foo-bar"),
            vec![
                Token::Number(42.0),
                Token::Number(-3.0),
                Token::Number(7.0),
                Token::Number(1.5),
                Token::Number(0.5),
                Token::Symbol("1+".into()),
                Token::Symbol("-".into()),
                Token::Symbol("foo-bar".into()),
            ]
        );
    }

    #[test]
    fn words_stop_at_close_paren_and_quote_char() {
        assert_eq!(
            kinds("(a b)\"s\""),
            vec![
                Token::LParen,
                Token::Symbol("a".into()),
                Token::Symbol("b".into()),
                Token::RParen,
                Token::Str("s".into()),
            ]
        );
    }

    #[test]
    fn char_literal_is_code() {
        assert_eq!(kinds("?a ?\\"), vec![Token::Number(97.0), Token::Number(92.0)]);
    }

    #[test]
    fn malformed_char_literal() {
        assert!(matches!(tokenize("?ab"), Err(MinelError::Parse { .. })));
        assert!(matches!(tokenize("?"), Err(MinelError::Parse { .. })));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\tb\nc\sd\e\q\"""#),
            vec![Token::Str("a\tb\nc d\x1bq\"".into())]
        );
        assert_eq!(kinds("\"one \\\ntwo\""), vec![Token::Str("one two".into())]);
    }

    #[test]
    fn unterminated_string_reports_position() {
        match tokenize("(foo\n  \"abc") {
            Err(MinelError::Parse { line, col, .. }) => assert_eq!((line, col), (2, 3)),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn comments_and_form_feed_are_skipped() {
        assert_eq!(
            kinds("; header\n\x0cfoo ; trailing\r\n"),
            vec![Token::Symbol("foo".into())]
        );
    }

    #[test]
    fn lone_dot() {
        assert_eq!(
            kinds("(a . b)"),
            vec![
                Token::LParen,
                Token::Symbol("a".into()),
                Token::Dot,
                Token::Symbol("b".into()),
                Token::RParen,
            ]
        );
    }
}
