//! Inline type-definition lexing.
//!
//! A definition looks like `∆ = { unit: pizza, +: topping, f: d => d.x }`.
//! The main lexer dispatches here once it has absorbed a word, optional
//! spaces and an `=`. Definitions are lexed and applied in one pass: the
//! punctuation and prop spans are emitted for syntax highlighting only,
//! and the resulting [`Udt`] is written to the registry so every later
//! typed-quantity scan can resolve the unit.
//!
//! [`Udt`]: crate::registry::Udt

use crate::error::ErrorKind;
use crate::lexer::{Lexer, State};
use crate::log_debug;
use crate::registry::Udt;
use crate::token::TokenKind;

impl<'a> Lexer<'a> {
    /// Lex one definition. The pending span holds `unit … =`.
    pub(crate) fn lex_definition(&mut self) -> State {
        log_debug!("lexDefinition");

        let pending = self.s.pending();
        let unit = pending[..pending.len() - 1].trim().to_string();
        if unit.is_empty() {
            self.emit_error(ErrorKind::InvalidDefinition("unit cannot be empty"));
            return State::Bb;
        }

        self.s.accept_run(" ");
        if !self.s.accept("{") {
            self.emit_error(ErrorKind::InvalidDefinition("expected '{' after '='"));
            return State::Bb;
        }
        // the whole `unit = {` prefix, for highlighting only
        self.emit(TokenKind::Assignment);

        let mut props: Vec<(String, String)> = Vec::new();
        loop {
            match self.s.next() {
                None => {
                    self.emit_error(ErrorKind::InvalidDefinition(
                        "expected '}' at the end of the definition",
                    ));
                    return State::Bb;
                }
                Some('}') => break,
                Some(',') => self.emit(TokenKind::Assignment),
                Some(' ') | Some('\n') => {}
                Some('/') => match self.s.peek() {
                    Some('/') => {
                        self.s.next();
                        self.lex_line_comment();
                    }
                    Some('*') => {
                        self.s.next();
                        if let Err(kind) = self.lex_block_comment() {
                            self.emit_error(kind);
                            return State::Bb;
                        }
                    }
                    _ => {}
                },
                Some(_) => {
                    self.s.backup();
                    match self.scan_prop() {
                        Ok(prop) => props.push(prop),
                        Err(kind) => {
                            self.emit_error(kind);
                            return State::Bb;
                        }
                    }
                }
            }
        }
        // the closing '}'
        self.emit(TokenKind::Assignment);

        self.ctx.registry.define(Udt::from_definition(&unit, props));
        State::Bb
    }

    /// Scan one `name:value` prop. Quoted spans are absorbed verbatim,
    /// `\:`/`\}` escape inside names and `\,`/`\}` inside values, and a
    /// brace-delimited span in a value (an arrow-function body) is absorbed
    /// whole, nested braces included.
    fn scan_prop(&mut self) -> Result<(String, String), ErrorKind> {
        log_debug!("scanProp");

        let name_start = self.s.offset();
        loop {
            match self.s.next() {
                None | Some('}') => {
                    return Err(ErrorKind::InvalidDefinition(
                        "expected ':' at the end of the prop name",
                    ))
                }
                Some(q @ ('"' | '`')) => self.scan_quoted_span(q)?,
                Some('\\') => {
                    self.s.accept("}:");
                }
                Some(':') => {
                    self.s.backup();
                    if self.s.offset() == name_start {
                        return Err(ErrorKind::InvalidDefinition("prop name cannot be empty"));
                    }
                    break;
                }
                Some(_) => {}
            }
        }
        let name = self.s.slice(name_start, self.s.offset()).to_string();
        self.emit(TokenKind::PropName);

        self.s.accept(":");
        self.emit(TokenKind::Assignment);

        self.s.accept_run(" \n");

        // a comment may sit between the name and the value
        if self.s.peek() == Some('/') {
            let mark = self.s.offset();
            self.s.next();
            match self.s.peek() {
                Some('/') => {
                    self.s.next();
                    self.lex_line_comment();
                    self.s.accept_run(" \n");
                }
                Some('*') => {
                    self.s.next();
                    self.lex_block_comment()?;
                    self.s.accept_run(" \n");
                }
                _ => self.s.seek(mark),
            }
        }

        let value_start = self.s.offset();
        loop {
            match self.s.next() {
                None => {
                    return Err(ErrorKind::InvalidDefinition(
                        "expected '}' at the end of the definition",
                    ))
                }
                Some(q @ ('"' | '`')) => self.scan_quoted_span(q)?,
                Some('\\') => {
                    self.s.accept("},");
                }
                Some('{') => self.scan_brace_block()?,
                Some(',') | Some('}') => {
                    self.s.backup();
                    if self.s.offset() == value_start {
                        return Err(ErrorKind::InvalidDefinition("prop value cannot be empty"));
                    }
                    break;
                }
                Some(_) => {}
            }
        }
        let value = self.s.slice(value_start, self.s.offset()).to_string();
        self.emit(TokenKind::PropValue);

        Ok((name, value))
    }

    /// Absorb a quoted span, honouring `\<quote>` escapes. A stray backslash
    /// stays in the span.
    fn scan_quoted_span(&mut self, quote: char) -> Result<(), ErrorKind> {
        log_debug!("scanQuotedString");
        let unterminated = if quote == '`' {
            ErrorKind::UnterminatedRawString
        } else {
            ErrorKind::UnterminatedString
        };
        loop {
            match self.s.next() {
                None => return Err(unterminated),
                Some('\\') => match self.s.next() {
                    Some(r) if r == quote => {}
                    Some(_) => self.s.backup(),
                    None => return Err(unterminated),
                },
                Some(r) if r == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    /// Absorb a `{ … }` span with nesting; quoted strings inside may contain
    /// braces. The opening brace has been consumed.
    fn scan_brace_block(&mut self) -> Result<(), ErrorKind> {
        log_debug!("scanJavaScript");
        loop {
            match self.s.next() {
                None => {
                    return Err(ErrorKind::InvalidDefinition(
                        "expected '}' at the end of a block",
                    ))
                }
                Some('{') => self.scan_brace_block()?,
                Some(q @ ('"' | '\'' | '`')) => self.scan_quoted_span(q)?,
                Some('}') => return Ok(()),
                Some(_) => {}
            }
        }
    }
}
