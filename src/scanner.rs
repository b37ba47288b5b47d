//! Rune-level cursor over the source text.
//!
//! One scanner drives a whole parse. The cursor works in byte positions but
//! always moves by whole code points, so multi-byte units (`∆`, `§µ🚀`,
//! `°C`) need no special handling anywhere above this module. Line counting
//! is advisory and used only for diagnostics.

/// Character classes of the notation.
pub(crate) mod classes {
    /// The standard modifier characters. String props starting with one of
    /// these are never copied into output records.
    pub const MODIFIERS: &str = "+~<>:;/|#&≠≥≤^*$£,?!•°·";

    /// Quote characters accepted around values and prop strings.
    pub const QUOTES: &str = "`\"";

    #[inline]
    pub fn is_space(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\r' | '\n')
    }

    /// Runes that may begin a number scan: digits, `.`, leading `-`.
    #[inline]
    pub fn is_numeric(c: char) -> bool {
        c.is_numeric() || c == '.' || c == '-'
    }

    #[inline]
    pub fn is_alphanumeric(c: char) -> bool {
        c == '_' || c.is_alphanumeric()
    }

    /// Valid inside a unit: anything that is not whitespace or a digit.
    #[inline]
    pub fn is_unit_char(c: char) -> bool {
        !is_space(c) && !c.is_numeric()
    }

    #[inline]
    pub fn is_modifier_char(c: char) -> bool {
        MODIFIERS.contains(c)
    }

    #[inline]
    pub fn is_quote_char(c: char) -> bool {
        QUOTES.contains(c)
    }
}

/// Byte-position cursor with one-rune lookahead and backtracking support.
#[derive(Debug)]
pub(crate) struct Scanner<'a> {
    input: &'a str,
    /// Start of the pending token.
    start: usize,
    /// Current position.
    pos: usize,
    /// Width of the last rune returned by `next` (0 after backup/seek).
    width: usize,
    /// 1 + number of newlines consumed.
    line: usize,
    /// Line at the start of the pending token.
    start_line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner { input, start: 0, pos: 0, width: 0, line: 1, start_line: 1 }
    }

    /// Advance one code point and return it, or `None` at end of input.
    pub fn next(&mut self) -> Option<char> {
        let c = self.input[self.pos..].chars().next()?;
        self.width = c.len_utf8();
        self.pos += self.width;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Return the next rune without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Everything from the cursor to the end of input.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Byte length of the whole input.
    #[inline]
    pub fn end(&self) -> usize {
        self.input.len()
    }

    /// Step back one rune. Valid at most once per call to `next`; a second
    /// call before the next `next` is a no-op.
    pub fn backup(&mut self) {
        self.pos -= self.width;
        if self.width == 1 && self.input.as_bytes().get(self.pos) == Some(&b'\n') {
            self.line -= 1;
        }
        self.width = 0;
    }

    /// Consume the next rune if it is in `valid`.
    pub fn accept(&mut self, valid: &str) -> bool {
        match self.next() {
            Some(c) if valid.contains(c) => true,
            Some(_) => {
                self.backup();
                false
            }
            None => false,
        }
    }

    /// Consume a run of runes from `valid`.
    pub fn accept_run(&mut self, valid: &str) {
        while let Some(c) = self.next() {
            if !valid.contains(c) {
                self.backup();
                break;
            }
        }
    }

    /// Drop the pending span: the next token starts at the current position.
    pub fn ignore(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
    }

    /// Current byte offset, for speculative scans.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Restore the cursor to a previously saved offset. Keeps the advisory
    /// line counter consistent in either direction.
    pub fn seek(&mut self, target: usize) {
        if target < self.pos {
            self.line -= count_newlines(&self.input[target..self.pos]);
        } else {
            self.line += count_newlines(&self.input[self.pos..target]);
        }
        self.pos = target;
        self.width = 0;
    }

    /// The pending span, from the last emit/ignore to the cursor.
    #[inline]
    pub fn pending(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    #[inline]
    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        &self.input[from..to]
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn start_line(&self) -> usize {
        self.start_line
    }

}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::classes::*;
    use super::*;

    #[test]
    fn test_next_handles_multibyte_runes() {
        let mut s = Scanner::new("∆x");
        assert_eq!(s.next(), Some('∆'));
        assert_eq!(s.offset(), '∆'.len_utf8());
        assert_eq!(s.next(), Some('x'));
        assert_eq!(s.next(), None);
    }

    #[test]
    fn test_backup_restores_newline_count() {
        let mut s = Scanner::new("a\nb");
        s.next();
        s.next();
        assert_eq!(s.line, 2);
        s.backup();
        assert_eq!(s.line, 1);
        // A second backup before the next `next` is a no-op.
        s.backup();
        assert_eq!(s.offset(), 1);
    }

    #[test]
    fn test_accept_and_accept_run() {
        let mut s = Scanner::new("-123.4x");
        assert!(s.accept("-"));
        s.accept_run("0123456789");
        assert!(s.accept("."));
        s.accept_run("0123456789");
        assert_eq!(s.pending(), "-123.4");
        assert!(!s.accept("0123456789"));
    }

    #[test]
    fn test_seek_adjusts_lines_both_ways() {
        let mut s = Scanner::new("a\nb\nc");
        while s.next().is_some() {}
        assert_eq!(s.line, 3);
        s.seek(0);
        assert_eq!(s.line, 1);
        s.seek(4);
        assert_eq!(s.line, 3);
    }

    #[test]
    fn test_character_classes() {
        assert!(is_space('\r'));
        assert!(!is_space('\u{a0}'));
        assert!(is_numeric('.') && is_numeric('-') && is_numeric('7'));
        assert!(is_unit_char('∆') && is_unit_char('°'));
        assert!(!is_unit_char('4') && !is_unit_char(' '));
        assert!(is_modifier_char('≠') && is_modifier_char('•'));
        assert!(is_quote_char('`') && is_quote_char('"'));
    }
}
