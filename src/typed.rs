//! Typed-quantity scanning.
//!
//! A typed quantity is `[quantity] unit [value] [modifier value]…`, all
//! without spaces. Recognising one against a registry that grows as the
//! document is read takes several speculative scans; each saves the cursor
//! and restores it on a miss so a failed attempt leaves no trace. The
//! instance queue is only written when the whole scan commits, so it can
//! never disagree with the emitted token stream.

use crate::error::ErrorKind;
use crate::lexer::{Lexer, State};
use crate::log_debug;
use crate::scanner::classes;
use crate::token::TokenKind;

impl<'a> Lexer<'a> {
    /// Dispatch for a rune that could start a typed quantity: a digit or
    /// the first rune of a registered unit.
    pub(crate) fn lex_udt(&mut self) -> State {
        log_debug!("lexUDT");
        let entry = self.s.offset();

        if self.s.peek().is_some_and(classes::is_numeric) {
            // quantity-led form: number, then unit, then the tail
            self.scan_number_prefix();
            if let Some(unit) = self.scan_unit() {
                match self.scan_tail(&unit) {
                    Ok(modifiers) => {
                        self.commit_instance(unit, modifiers);
                        return State::Bb;
                    }
                    Err(_) => {
                        // not a typed quantity after all; re-scan as a number
                        self.s.seek(entry);
                        return State::Number;
                    }
                }
            }
            self.s.seek(entry);
            return State::Number;
        }

        // unit-led form
        match self.scan_unit() {
            Some(unit) => match self.scan_tail(&unit) {
                Ok(modifiers) => {
                    self.commit_instance(unit, modifiers);
                    State::Bb
                }
                Err(kind) => {
                    self.emit_error(kind);
                    State::Bb
                }
            },
            None => {
                if self.s.peek().is_some_and(classes::is_numeric) {
                    State::Number
                } else {
                    State::Identifier
                }
            }
        }
    }

    /// A number that is not part of a typed quantity. A trailing
    /// alphanumeric rune rejects the scan and the whole word is emitted as
    /// a string instead (`12x` reads as the string "12x").
    pub(crate) fn lex_number(&mut self) -> State {
        log_debug!("lexNumber");
        let start = self.s.offset();
        self.scan_number_prefix();

        if self.s.peek().is_some_and(classes::is_alphanumeric) {
            self.s.seek(start);
            return self.lex_word();
        }
        if self.s.offset() == start {
            // dispatch promised a numeric start it could not deliver
            self.s.next();
            let text = self.s.pending().to_string();
            self.emit_error(ErrorKind::BadNumber(text));
            return State::Bb;
        }
        self.emit(TokenKind::Number);
        State::Bb
    }

    /// Consume the rest of a whitespace-delimited word and emit it as a
    /// string literal.
    fn lex_word(&mut self) -> State {
        loop {
            match self.s.next() {
                Some(r) if !classes::is_space(r) => {}
                Some(_) => {
                    self.s.backup();
                    break;
                }
                None => break,
            }
        }
        self.emit(TokenKind::String);
        State::Bb
    }

    /// `[-] digits [. digits]`, all optional.
    fn scan_number_prefix(&mut self) {
        self.s.accept("-");
        self.s.accept_run("0123456789");
        if self.s.accept(".") {
            self.s.accept_run("0123456789");
        }
    }

    /// Primary value and modifier chain after the unit.
    fn scan_tail(&mut self, unit: &str) -> Result<Vec<(String, String)>, ErrorKind> {
        let (colon_value, quote_modifiers) = match self.ctx.registry.get(unit) {
            Some(udt) => (udt.allows_colon_value(), udt.quote_modifiers),
            None => (false, false),
        };
        if !self.scan_value(colon_value, quote_modifiers) {
            return Err(ErrorKind::InvalidUdt);
        }
        match self.scan_modifiers(unit, colon_value, quote_modifiers) {
            Some(modifiers) => Ok(modifiers),
            None => Err(ErrorKind::InvalidModifierValue),
        }
    }

    /// Find the longest registered unit starting at the cursor. The word is
    /// everything up to the next whitespace; it must not be a keyword or
    /// the head of a definition, and the longest registered prefix of it
    /// wins. The cursor ends just past the matched unit.
    fn scan_unit(&mut self) -> Option<String> {
        log_debug!("scanUnit");
        let start = self.s.offset();

        loop {
            match self.s.next() {
                Some(r) if !classes::is_space(r) => {}
                Some(_) => {
                    self.s.backup();
                    break;
                }
                None => break,
            }
        }
        let word = self.s.slice(start, self.s.offset());
        if word.is_empty() {
            return None;
        }
        let word_end = self.s.offset();

        // a `word = {` ahead means this is a definition, not a quantity
        self.s.accept_run(" ");
        if self.s.accept("=") {
            self.s.accept_run(" ");
            if self.s.accept("{") {
                self.s.seek(start);
                return None;
            }
        }
        if matches!(word, "true" | "false" | "null") {
            self.s.seek(start);
            return None;
        }
        self.s.seek(word_end);

        match self.ctx.registry.longest_prefix(word).map(str::to_string) {
            Some(unit) => {
                self.s.seek(start + unit.len());
                Some(unit)
            }
            None => {
                self.s.seek(start);
                None
            }
        }
    }

    /// Optional value directly after a unit or a modifier: quoted, unquoted
    /// after `:` (only for units that declare `:` as a modifier), or
    /// numeric. Returns false only for an unterminated quoted value, and
    /// even that becomes "no value" when the unit uses quote modifiers.
    fn scan_value(&mut self, colon_value: bool, quote_modifiers: bool) -> bool {
        log_debug!("scanValue");
        let start = self.s.offset();

        match self.s.peek() {
            Some(q) if classes::is_quote_char(q) => {
                self.s.next();
                loop {
                    match self.s.next() {
                        None => {
                            if quote_modifiers {
                                // the quote was a modifier, not a value
                                self.s.seek(start);
                                return true;
                            }
                            return false;
                        }
                        Some('\\') => match self.s.next() {
                            Some(r) if r == q => {}
                            Some(_) => self.s.backup(),
                            None => {
                                if quote_modifiers {
                                    self.s.seek(start);
                                    return true;
                                }
                                return false;
                            }
                        },
                        Some(r) if r == q => return true,
                        Some(_) => {}
                    }
                }
            }
            Some(':') if colon_value => {
                self.s.next();
                loop {
                    match self.s.next() {
                        None => break,
                        Some('\\') => {
                            // an escaped space stays in the value
                            self.s.accept(" ");
                        }
                        Some(r) if classes::is_space(r) => {
                            self.s.backup();
                            break;
                        }
                        Some(_) => {}
                    }
                }
                true
            }
            _ => {
                let mut is_decimal = false;
                loop {
                    match self.s.next() {
                        None => break,
                        Some('-') => {
                            // a sign is only valid in first position
                            if self.s.offset() != start + 1 {
                                self.s.backup();
                                break;
                            }
                        }
                        Some('.') => {
                            if is_decimal {
                                self.s.backup();
                                break;
                            }
                            is_decimal = true;
                        }
                        Some(r) if r.is_numeric() => {}
                        Some(_) => {
                            self.s.backup();
                            break;
                        }
                    }
                }
                let consumed = self.s.slice(start, self.s.offset());
                if consumed == "-" || consumed == "." {
                    // a lone sign or dot could still be a modifier
                    self.s.seek(start);
                } else if consumed.ends_with('.') {
                    // `2.` would block modifiers that start with '.'
                    self.s.seek(self.s.offset() - 1);
                }
                true
            }
        }
    }

    /// Scan chained `modifier value` pairs. Each candidate run (up to the
    /// next whitespace) is trimmed from its end, one rune at a time, until
    /// it names a declared prop of the unit; an unmatched run is handed
    /// back for the next token. Fails only when a matched modifier has an
    /// invalid value.
    fn scan_modifiers(
        &mut self,
        unit: &str,
        colon_value: bool,
        quote_modifiers: bool,
    ) -> Option<Vec<(String, String)>> {
        log_debug!("scanModifier");
        let mut pairs = Vec::new();
        let mut mod_start = self.s.offset();

        loop {
            match self.s.peek() {
                Some(r) if !classes::is_space(r) => {
                    self.s.next();
                }
                _ => {
                    let candidate = self.s.slice(mod_start, self.s.offset());
                    match self.longest_declared_modifier(unit, candidate) {
                        Some(modifier) => {
                            self.s.seek(mod_start + modifier.len());
                            let value_start = self.s.offset();
                            if !self.scan_value(colon_value, quote_modifiers) {
                                return None;
                            }
                            let raw = self.s.slice(value_start, self.s.offset()).to_string();
                            pairs.push((modifier, raw));
                            mod_start = self.s.offset();
                        }
                        None => {
                            // the unmatched run belongs to the next token
                            self.s.seek(mod_start);
                            return Some(pairs);
                        }
                    }
                }
            }
        }
    }

    /// The longest end-trimmed prefix of `candidate` that is a declared
    /// string prop of `unit`.
    fn longest_declared_modifier(&self, unit: &str, candidate: &str) -> Option<String> {
        let udt = self.ctx.registry.get(unit)?;
        let mut m = candidate;
        while !m.is_empty() {
            if udt.string_props.contains_key(m) {
                return Some(m.to_string());
            }
            let mut chars = m.chars();
            chars.next_back();
            m = chars.as_str();
        }
        None
    }
}
