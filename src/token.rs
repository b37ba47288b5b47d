//! Token model for the bb lexer.
//!
//! The lexer publishes a flat stream of [`Token`]s; each token carries its
//! exact source slice so emitters (data, syntax, preview) can reconstruct
//! the input verbatim.

use std::fmt;

/// The closed set of token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A lexing error; the token's `message` holds the diagnostic text.
    Error,
    /// `true` or `false`.
    Bool,
    /// `null`.
    Null,
    /// End of input. Always the last token of a stream.
    Eof,
    /// A bare number.
    Number,
    /// A quoted, raw-quoted, or unquoted string literal.
    String,
    /// A single separating space.
    Space,
    /// Two or more space units (a literal tab counts as two).
    Tab,
    /// A newline together with the indentation that follows it.
    Newline,
    /// A typed quantity: `[quantity] unit [value] [modifier value]…`.
    TypedQuantity,
    /// A whole type definition. Reserved for highlighting; the current
    /// lexer decomposes definitions into Assignment/PropName/PropValue.
    Definition,
    /// Definition punctuation (`… = {`, `,`, `:`, `}`), highlighting only.
    Assignment,
    /// A definition prop name, highlighting only.
    PropName,
    /// A definition prop value, highlighting only.
    PropValue,
    /// An inline `//…` or block `/*…*/` comment.
    Comment,
}

/// One lexed token. The lexeme borrows from the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// The exact source slice this token covers.
    pub lexeme: &'a str,
    /// Line number at the start of the token (1-based, advisory).
    pub line: usize,
    /// Byte offset of the token start in the source.
    pub pos: usize,
    /// Diagnostic text for [`TokenKind::Error`] tokens.
    pub message: Option<String>,
}

impl<'a> Token<'a> {
    pub(crate) fn new(kind: TokenKind, lexeme: &'a str, line: usize, pos: usize) -> Self {
        Token { kind, lexeme, line, pos, message: None }
    }

    /// True for tokens the data emitter ignores outright.
    #[inline]
    pub fn is_layout(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Space | TokenKind::Tab | TokenKind::Newline | TokenKind::Comment
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Error => {
                write!(f, "{}", self.message.as_deref().unwrap_or(self.lexeme))
            }
            _ if self.lexeme.chars().count() > 10 => {
                let short: String = self.lexeme.chars().take(10).collect();
                write!(f, "{:?}...", short)
            }
            _ => write!(f, "{:?}", self.lexeme),
        }
    }
}

/// The resolved unit and modifier chain of one `TypedQuantity` token, in
/// emission order. The parser consumes these in lockstep with the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedInstance {
    /// The registry key the unit scan resolved to.
    pub unit: String,
    /// `(modifier, raw value slice)` pairs in source order.
    pub modifiers: Vec<(String, String)>,
}
