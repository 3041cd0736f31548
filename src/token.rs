/// A half-open byte range into the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Maximal run of ASCII digits.
    Int(i64),

    /// Any single non-space, non-digit character, parentheses included.
    /// The scanner does not reject anything here; whether the character
    /// means something is the parser's problem.
    Op(char),

    /// Input exhausted.
    End,
}

/// A token together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{}", n),
            Token::Op(c) => write!(f, "{}", c),
            Token::End => write!(f, "<end>"),
        }
    }
}
