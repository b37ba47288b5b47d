//! Lexical error kinds.
//!
//! The lexer is lenient: every error becomes a [`TokenKind::Error`] token
//! carrying one of these kinds as its message, and scanning resumes so that
//! editors and previewers still receive the rest of the stream.
//!
//! [`TokenKind::Error`]: crate::token::TokenKind::Error

use std::fmt;

/// The ways a bb scan can go wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A `"…"` string hit a newline or EOF before its closing quote.
    UnterminatedString,
    /// A `` `…` `` string hit EOF before its closing backquote.
    UnterminatedRawString,
    /// A `/*…*/` comment with no closing marker.
    UnclosedComment,
    /// A numeric scan that produced no usable number.
    BadNumber(String),
    /// A malformed type definition; the payload says which part.
    InvalidDefinition(&'static str),
    /// A modifier whose value failed to scan.
    InvalidModifierValue,
    /// A scan that started as a typed quantity but could not complete.
    InvalidUdt,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnterminatedString => write!(f, "unterminated quoted string"),
            ErrorKind::UnterminatedRawString => write!(f, "unterminated raw quoted string"),
            ErrorKind::UnclosedComment => write!(f, "unclosed comment"),
            ErrorKind::BadNumber(text) => write!(f, "bad number syntax: {:?}", text),
            ErrorKind::InvalidDefinition(detail) => write!(f, "invalid definition: {}", detail),
            ErrorKind::InvalidModifierValue => write!(f, "modifier has an invalid value"),
            ErrorKind::InvalidUdt => write!(f, "invalid typed quantity"),
        }
    }
}

impl std::error::Error for ErrorKind {}
