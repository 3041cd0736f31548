use crate::scanner::ScanError;

/// A parsing error with the byte offset it was detected at.
///
/// Offsets come from the scanner's spans; errors detected at end of input
/// (missing operand, missing `)`) use the offset where the missing token
/// would have started.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub pos: usize,
}

impl std::fmt::Display for ParseError {
    /// Formats as `offset N: message` for CLI-friendly diagnostics.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "offset {}: {}", self.pos, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<ScanError> for ParseError {
    fn from(e: ScanError) -> Self {
        ParseError {
            message: e.message,
            pos: e.pos,
        }
    }
}
