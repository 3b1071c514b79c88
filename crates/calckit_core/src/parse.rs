//! Numeric input parsing.
//!
//! Every calculator field accepts either a plain numeral or a small arithmetic
//! expression such as `2*sqrt(9)` or `(1 + 0.05)^12`. Parsing happens in two
//! stages: a lexer turns the raw text into tokens, and a recursive descent
//! parser evaluates them directly to an `f64`.
//!
//! Grammar:
//!
//! ```text
//! expression     --> additive
//! additive       --> multiplicative ( ("+" | "-") multiplicative )*
//! multiplicative --> unary ( ("*" | "/" | "%") unary )*
//! unary          --> ("-" | "+") unary | power
//! power          --> primary ( ("^" | "**") unary )?
//! primary        --> NUMBER | CONSTANT | function_call | "(" expression ")"
//! function_call  --> IDENT "(" expression ("," expression)* ")"
//! ```
//!
//! There are no variables and no side effects; the only names are the
//! constants `pi`, `e`, `tau` and the functions listed on `call_function`.

use std::f64::consts;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
    Eof,
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some((pos, ch)) = self.chars.next() else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => {
                if self.chars.next_if(|(_, c)| *c == '*').is_some() {
                    Token::Caret
                } else {
                    Token::Star
                }
            }
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            c if c.is_ascii_digit() || c == '.' => self.read_number(pos)?,
            c if c.is_ascii_alphabetic() => self.read_identifier(pos),
            c => return Err(ParseError::UnexpectedChar { ch: c, position: pos }),
        };
        Ok(token)
    }

    fn read_number(&mut self, start: usize) -> Result<Token, ParseError> {
        let mut end = start + 1;
        let mut seen_dot = self.input[start..].starts_with('.');

        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                end = pos + 1;
                self.chars.next();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                end = pos + 1;
                self.chars.next();
            } else {
                break;
            }
        }

        // Exponent only when followed by digits, so `2e` stays a syntax error
        // rather than silently swallowing the constant `e`.
        if let Some(&(pos, c)) = self.chars.peek() {
            if c != 'e' && c != 'E' {
                return self.finish_number(start, end);
            }
            let rest = &self.input[pos + 1..];
            let digits_at = if rest.starts_with('+') || rest.starts_with('-') {
                1
            } else {
                0
            };
            if rest[digits_at..].starts_with(|d: char| d.is_ascii_digit()) {
                self.chars.next();
                if digits_at == 1 {
                    self.chars.next();
                }
                end = pos + 1 + digits_at;
                while let Some(&(p, d)) = self.chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = p + 1;
                    self.chars.next();
                }
            }
        }

        self.finish_number(start, end)
    }

    fn finish_number(&self, start: usize, end: usize) -> Result<Token, ParseError> {
        let text = &self.input[start..end];
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ParseError::Syntax(format!("malformed number '{text}'")))
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        let mut end = start + 1;
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                end = pos + 1;
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Ident(self.input[start..end].to_ascii_lowercase())
    }
}

/// Deepest nesting of parentheses, calls and unary signs accepted
pub const MAX_NESTING_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if *self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Syntax(format!(
                "expected {expected:?}, found {:?}",
                self.current()
            )))
        }
    }

    fn parse_expression(&mut self) -> Result<f64, ParseError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<f64, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            match self.current() {
                Token::Plus => {
                    self.advance();
                    left += self.parse_multiplicative()?;
                }
                Token::Minus => {
                    self.advance();
                    left -= self.parse_multiplicative()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_multiplicative(&mut self) -> Result<f64, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            match self.current() {
                Token::Star => {
                    self.advance();
                    left *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.advance();
                    left /= self.parse_unary()?;
                }
                Token::Percent => {
                    self.advance();
                    left %= self.parse_unary()?;
                }
                _ => return Ok(left),
            }
        }
    }

    // Every recursive path re-enters here, so the depth is bounded in one place
    fn parse_unary(&mut self) -> Result<f64, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::Syntax("expression nested too deeply".into()));
        }
        self.depth += 1;
        let value = self.parse_signed();
        self.depth -= 1;
        value
    }

    fn parse_signed(&mut self) -> Result<f64, ParseError> {
        match self.current() {
            Token::Minus => {
                self.advance();
                Ok(-self.parse_unary()?)
            }
            Token::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<f64, ParseError> {
        let base = self.parse_primary()?;
        if *self.current() == Token::Caret {
            self.advance();
            // Right associative: 2^3^2 == 2^(3^2)
            let exponent = self.parse_unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<f64, ParseError> {
        match self.advance() {
            Token::Number(n) => Ok(n),
            Token::LParen => {
                let value = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Token::Ident(name) => {
                if *self.current() == Token::LParen {
                    self.advance();
                    let args = self.parse_arguments()?;
                    call_function(&name, &args)
                } else {
                    constant(&name).ok_or(ParseError::UnknownIdentifier(name))
                }
            }
            Token::Eof => Err(ParseError::Syntax("unexpected end of input".into())),
            other => Err(ParseError::Syntax(format!("unexpected {other:?}"))),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<f64>, ParseError> {
        let mut args = Vec::new();
        if *self.current() == Token::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.advance() {
                Token::Comma => continue,
                Token::RParen => return Ok(args),
                other => {
                    return Err(ParseError::Syntax(format!(
                        "expected ',' or ')' in argument list, found {other:?}"
                    )));
                }
            }
        }
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(consts::PI),
        "e" => Some(consts::E),
        "tau" => Some(consts::TAU),
        _ => None,
    }
}

/// Evaluate a named function.
///
/// Supported: `sqrt abs ln log log2 log10 exp sin cos tan asin acos atan
/// floor ceil round min max pow`. `log(x)` is base 10, `log(x, b)` base `b`.
fn call_function(name: &str, args: &[f64]) -> Result<f64, ParseError> {
    let unary = |f: fn(f64) -> f64, function: &'static str| {
        if args.len() == 1 {
            Ok(f(args[0]))
        } else {
            Err(ParseError::Arity {
                function,
                expected: "1",
                found: args.len(),
            })
        }
    };

    match name {
        "sqrt" => unary(f64::sqrt, "sqrt"),
        "abs" => unary(f64::abs, "abs"),
        "ln" => unary(f64::ln, "ln"),
        "log2" => unary(f64::log2, "log2"),
        "log10" => unary(f64::log10, "log10"),
        "exp" => unary(f64::exp, "exp"),
        "sin" => unary(f64::sin, "sin"),
        "cos" => unary(f64::cos, "cos"),
        "tan" => unary(f64::tan, "tan"),
        "asin" => unary(f64::asin, "asin"),
        "acos" => unary(f64::acos, "acos"),
        "atan" => unary(f64::atan, "atan"),
        "floor" => unary(f64::floor, "floor"),
        "ceil" => unary(f64::ceil, "ceil"),
        "round" => unary(f64::round, "round"),
        "log" => match args {
            [x] => Ok(x.log10()),
            [x, base] => Ok(x.log(*base)),
            _ => Err(ParseError::Arity {
                function: "log",
                expected: "1 or 2",
                found: args.len(),
            }),
        },
        "pow" => match args {
            [base, exponent] => Ok(base.powf(*exponent)),
            _ => Err(ParseError::Arity {
                function: "pow",
                expected: "2",
                found: args.len(),
            }),
        },
        "min" | "max" => {
            if args.is_empty() {
                return Err(ParseError::Arity {
                    function: if name == "min" { "min" } else { "max" },
                    expected: "at least 1",
                    found: 0,
                });
            }
            let pick: fn(f64, f64) -> f64 = if name == "min" { f64::min } else { f64::max };
            Ok(args[1..].iter().fold(args[0], |acc, &x| pick(acc, x)))
        }
        _ => Err(ParseError::UnknownIdentifier(name.to_string())),
    }
}

/// Parse a raw token into a finite number.
///
/// Accepts plain numerals and arithmetic expressions. Fails on empty input,
/// malformed syntax, unknown names, and results that are NaN or infinite.
///
/// # Example
/// ```
/// use calckit_core::parse::parse_number;
/// assert_eq!(parse_number("2*sqrt(9)").unwrap(), 6.0);
/// assert!(parse_number("1/0").is_err());
/// ```
pub fn parse_number(token: &str) -> Result<f64, ParseError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let tokens = Lexer::new(trimmed).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.parse_expression()?;

    if *parser.current() != Token::Eof {
        return Err(ParseError::Syntax(format!(
            "unexpected {:?} after expression",
            parser.current()
        )));
    }

    if !value.is_finite() {
        return Err(ParseError::NotFinite {
            token: trimmed.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Parse a list of raw tokens, stopping at the first failure
pub fn parse_numbers<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<f64>, (usize, ParseError)> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, t)| parse_number(t.as_ref()).map_err(|e| (i, e)))
        .collect()
}
