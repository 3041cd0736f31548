use crate::ast::{BinOp, Expr};
use crate::parser_error::ParseError;
use crate::scanner::Scanner;
use crate::token::{Spanned, Token};

/// Precedence-climbing expression parser.
///
/// Binding powers: `+` and `-` bind at 1, `*`, `/` and `%` at 2, and `)` at 0
/// so it terminates any sub-expression. Operators at the same level associate
/// to the left (`1-2-3` parses as `(1-2)-3`): an operator's right binding
/// power equals its left binding power, and the climb only continues while
/// the next operator binds strictly tighter than the current minimum.
///
/// The parser pulls tokens from the scanner on demand and never needs more
/// than the one cached lookahead.
pub struct Parser {
    scanner: Scanner,
}

impl Parser {
    pub fn new(scanner: Scanner) -> Self {
        Parser { scanner }
    }

    /// Parses a complete expression.
    ///
    /// The whole input must be consumed: a dangling `)` or any other leftover
    /// token after the expression is an error, never silently ignored.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.expr(0)?;

        let t = self.scanner.fetch()?;
        match t.token {
            Token::End => Ok(expr),
            Token::Op(')') => Err(self.error("unmatched ')'", &t)),
            other => Err(self.error(&format!("unexpected '{}' after expression", other), &t)),
        }
    }

    /// Parses an expression whose operators must bind tighter than `rbp`.
    fn expr(&mut self, rbp: u8) -> Result<Expr, ParseError> {
        let mut node = self.atom()?;
        loop {
            let t = self.scanner.fetch()?;
            if t.token == Token::End || rbp >= self.left_bp(&t)? {
                return Ok(node);
            }
            node = self.infix(node)?;
        }
    }

    /// Parses an integer literal or a parenthesized sub-expression.
    fn atom(&mut self) -> Result<Expr, ParseError> {
        let t = self.scanner.next()?;
        match t.token {
            Token::Int(value) => Ok(Expr::Int(value)),
            Token::Op('(') => {
                let inner = self.expr(0)?;
                let close = self.scanner.next()?;
                if close.token != Token::Op(')') {
                    return Err(self.error("expected ')'", &close));
                }
                Ok(inner)
            }
            _ => Err(self.error("expected integer literal or '('", &t)),
        }
    }

    /// Consumes an operator token and parses its right operand.
    fn infix(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let t = self.scanner.next()?;
        let op = match t.token {
            Token::Op(c) => BinOp::from_char(c)
                .ok_or_else(|| self.error(&format!("unknown operator '{}'", c), &t))?,
            _ => return Err(self.error("expected operator", &t)),
        };
        let right = self.expr(self.right_bp(op))?;
        Ok(Expr::binary(op, left, right))
    }

    /// Left binding power of the token in operator position.
    ///
    /// `)` legitimately binds at 0; everything else that is not an arithmetic
    /// operator is a syntax error here.
    fn left_bp(&self, t: &Spanned) -> Result<u8, ParseError> {
        match t.token {
            Token::Op('+') | Token::Op('-') => Ok(1),
            Token::Op('*') | Token::Op('/') | Token::Op('%') => Ok(2),
            Token::Op(')') => Ok(0),
            Token::Op(c) => Err(self.error(&format!("unknown operator '{}'", c), t)),
            _ => Err(self.error(&format!("expected operator, found '{}'", t.token), t)),
        }
    }

    /// Right binding power: equal to the left one, giving left associativity.
    fn right_bp(&self, op: BinOp) -> u8 {
        match op {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 2,
        }
    }

    fn error(&self, message: &str, at: &Spanned) -> ParseError {
        ParseError {
            message: message.to_string(),
            pos: at.span.start,
        }
    }
}

/// Parses a source string into an expression tree.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    Parser::new(Scanner::new(source)).parse()
}
