use crate::token::{Span, Spanned, Token};

#[derive(Debug, Clone, PartialEq)]
pub struct ScanError {
    pub message: String,
    pub pos: usize,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "offset {}: {}", self.pos, self.message)
    }
}

/// On-demand tokenizer with one token of lookahead.
///
/// `next` consumes and returns the next token, skipping whitespace; `fetch`
/// returns the same token without consuming it (the result is cached, so the
/// source is only scanned once per token). There is no lexical error class:
/// any non-space, non-digit character becomes a one-character `Op` token and
/// the parser decides whether it means anything. The one thing that can fail
/// here is an integer literal too large for `i64`.
pub struct Scanner {
    source: Vec<char>,
    pos: usize,
    lookahead: Option<Spanned>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            pos: 0,
            lookahead: None,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Consumes and returns the next token.
    pub fn next(&mut self) -> Result<Spanned, ScanError> {
        if let Some(t) = self.lookahead.take() {
            return Ok(t);
        }
        self.scan()
    }

    /// Returns the next token without consuming it.
    pub fn fetch(&mut self) -> Result<Spanned, ScanError> {
        match self.lookahead {
            Some(t) => Ok(t),
            None => {
                let t = self.scan()?;
                self.lookahead = Some(t);
                Ok(t)
            }
        }
    }

    fn scan(&mut self) -> Result<Spanned, ScanError> {
        self.skip_whitespace();

        let start = self.pos;
        match self.current() {
            None => Ok(Spanned {
                token: Token::End,
                span: Span { start, end: start },
            }),
            Some(ch) if ch.is_ascii_digit() => self.read_number(start),
            Some(ch) => {
                self.pos += 1;
                Ok(Spanned {
                    token: Token::Op(ch),
                    span: Span {
                        start,
                        end: self.pos,
                    },
                })
            }
        }
    }

    fn read_number(&mut self, start: usize) -> Result<Spanned, ScanError> {
        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }

        let value = digits.parse::<i64>().map_err(|_| ScanError {
            message: format!("integer literal out of range: {}", digits),
            pos: start,
        })?;

        Ok(Spanned {
            token: Token::Int(value),
            span: Span {
                start,
                end: self.pos,
            },
        })
    }
}
