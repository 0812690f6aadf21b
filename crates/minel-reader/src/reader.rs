use minel_core::{MinelError, Value};

use crate::lexer::{tokenize, Span, SpannedToken, Token};

/// Deepest nesting of lists and quotes the reader accepts.
const MAX_PARSE_DEPTH: usize = 512;

fn parse_error(message: impl Into<String>, span: Span) -> MinelError {
    MinelError::parse(message, span.line, span.col)
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
    end: Span,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>, end: Span) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            end,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn span(&self) -> Span {
        self.tokens.get(self.pos).map(|t| t.span).unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_expr(&mut self) -> Result<Value, MinelError> {
        let span = self.span();
        match self.peek() {
            None => Err(parse_error("unexpected end of input", span)),
            Some(Token::LParen) => self.nested(span, Self::parse_list),
            Some(Token::Quote) => self.nested(span, |p| {
                p.advance();
                Ok(Value::quoted(p.parse_expr()?))
            }),
            Some(_) => self.parse_atom(),
        }
    }

    fn nested(
        &mut self,
        span: Span,
        parse: impl FnOnce(&mut Self) -> Result<Value, MinelError>,
    ) -> Result<Value, MinelError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(parse_error(
                format!("expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
                span,
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_list(&mut self) -> Result<Value, MinelError> {
        self.advance();
        let mut items = Vec::new();
        loop {
            let span = self.span();
            match self.peek() {
                None => return Err(parse_error("unexpected end of input in list", span)),
                Some(Token::RParen) => {
                    self.advance();
                    return Ok(Value::list(items));
                }
                Some(Token::Dot) => {
                    if items.is_empty() {
                        return Err(parse_error("nothing before `.` in list", span));
                    }
                    self.advance();
                    let tail = self.parse_expr()?;
                    let close = self.span();
                    return match self.advance().map(|t| &t.token) {
                        Some(Token::RParen) => Ok(Value::list_with_tail(items, tail)),
                        Some(_) => Err(parse_error("expected `)` after dotted tail", close)),
                        None => Err(parse_error("unexpected end of input in list", close)),
                    };
                }
                Some(_) => items.push(self.parse_expr()?),
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Value, MinelError> {
        let span = self.span();
        let token = match self.advance() {
            Some(t) => t.token.clone(),
            None => return Err(parse_error("unexpected end of input", span)),
        };
        match token {
            Token::Number(n) => Ok(Value::Number(n)),
            Token::Str(s) => Ok(Value::string_owned(s)),
            Token::Symbol(s) => Ok(match s.as_str() {
                "nil" => Value::Nil,
                "t" => Value::T,
                _ => Value::symbol(&s),
            }),
            Token::Dot => Err(parse_error("`.` outside of a list", span)),
            Token::RParen => Err(parse_error("unexpected `)`", span)),
            Token::LParen | Token::Quote => Err(parse_error("unexpected token", span)),
        }
    }
}

fn parser_for(input: &str) -> Result<Parser, MinelError> {
    let tokens = tokenize(input)?;
    let line = input.lines().count().max(1);
    let col = input.lines().last().map_or(0, |l| l.chars().count()) + 1;
    Ok(Parser::new(tokens, Span { line, col }))
}

/// Read a single datum. Anything after it is ignored.
pub fn read(input: &str) -> Result<Value, MinelError> {
    let mut parser = parser_for(input)?;
    parser.parse_expr()
}

/// Read every top-level datum in order.
pub fn read_many(input: &str) -> Result<Vec<Value>, MinelError> {
    let mut parser = parser_for(input)?;
    let mut exprs = Vec::new();
    while parser.peek().is_some() {
        exprs.push(parser.parse_expr()?);
    }
    Ok(exprs)
}

/// Read a whole script as one `(progn ...)` form.
pub fn read_program(input: &str) -> Result<Value, MinelError> {
    let forms = read_many(input)?;
    Ok(Value::cons(Value::symbol("progn"), Value::list(forms)))
}
