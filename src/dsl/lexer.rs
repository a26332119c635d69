//! Tokenizer for the netlist format.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{KirchhoffError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types of the netlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Device or node name
    Identifier,
    /// Numeric literal, possibly with a unit suffix (`10k`, `-3`, `1e-3`)
    Number,
    /// Word starting with '.'
    Directive,
    /// '='
    Equals,
    Newline,
    Eof,
}

/// Lexer over netlist text.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_blanks_and_comments();

        let (line, column) = (self.line, self.column);
        let token = |kind, text: String| Token {
            kind,
            text,
            line,
            column,
        };

        let Some(&ch) = self.chars.peek() else {
            return Ok(token(TokenKind::Eof, String::new()));
        };

        match ch {
            '\n' => {
                self.advance();
                Ok(token(TokenKind::Newline, "\n".to_string()))
            }
            '=' => {
                self.advance();
                Ok(token(TokenKind::Equals, "=".to_string()))
            }
            '.' => {
                self.advance();
                let word = self.read_word();
                if word.is_empty() {
                    return Err(KirchhoffError::lexer(line, column, "directive name expected after '.'"));
                }
                Ok(token(TokenKind::Directive, format!(".{}", word)))
            }
            '-' | '+' | '0'..='9' => {
                let mut text = String::new();
                if ch == '-' || ch == '+' {
                    text.push(ch);
                    self.advance();
                }
                text.push_str(&self.read_numeric());
                text.push_str(&self.read_word());
                // `2a` is a node name, `2k` a value
                let kind = if parse_value(&text).is_some() {
                    TokenKind::Number
                } else if text.starts_with(['-', '+']) {
                    return Err(KirchhoffError::lexer(line, column, format!("malformed number '{}'", text)));
                } else {
                    TokenKind::Identifier
                };
                Ok(token(kind, text))
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let text = self.read_word();
                Ok(token(TokenKind::Identifier, text))
            }
            _ => Err(KirchhoffError::lexer(line, column, format!("unexpected character '{}'", ch))),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn advance_while(&mut self, mut accept: impl FnMut(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            self.advance_while(|c| c == ' ' || c == '\t' || c == '\r');
            match self.chars.peek() {
                Some('#') | Some(';') => {
                    self.advance_while(|c| c != '\n');
                }
                _ => break,
            }
        }
    }

    fn read_word(&mut self) -> String {
        self.advance_while(|c| c.is_alphanumeric() || c == '_')
    }

    /// Digits, an optional fraction and an optional exponent.
    fn read_numeric(&mut self) -> String {
        let mut text = self.advance_while(|c| c.is_ascii_digit());
        if self.chars.peek() == Some(&'.') {
            self.advance();
            text.push('.');
            text.push_str(&self.advance_while(|c| c.is_ascii_digit()));
        }

        // An exponent needs a digit after the optional sign; `5e` stays a
        // word tail for read_word
        let mut probe = self.chars.clone();
        if matches!(probe.next(), Some('e') | Some('E')) {
            let signed = matches!(probe.peek(), Some('-') | Some('+'));
            if signed {
                probe.next();
            }
            if probe.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.extend(self.advance());
                if signed {
                    text.extend(self.advance());
                }
                text.push_str(&self.advance_while(|c| c.is_ascii_digit()));
            }
        }
        text
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    /// Yields tokens up to, not including, end of input.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(tok) if tok.kind == TokenKind::Eof => None,
            other => Some(other),
        }
    }
}

/// Parse a number with an optional unit suffix.
///
/// Suffixes: `p n u m k M G` (`µ` and `K` also accepted). The words `inf`
/// and `infinity` denote an ideal open.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("inf") || text.eq_ignore_ascii_case("infinity") {
        return Some(f64::INFINITY);
    }

    let last = text.chars().last()?;
    let multiplier = match last {
        'p' => 1e-12,
        'n' => 1e-9,
        'u' | 'µ' => 1e-6,
        'm' => 1e-3,
        'k' | 'K' => 1e3,
        'M' => 1e6,
        'G' => 1e9,
        _ => 1.0,
    };
    let digits = if multiplier == 1.0 {
        text
    } else {
        &text[..text.len() - last.len_utf8()]
    };

    // f64's parser also accepts "nan" and "inf" spellings; require a digit
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<f64>().ok().map(|v| v * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kinds(input: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(input)
            .map(|t| t.map(|t| (t.kind, t.text)))
            .collect::<Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_parse_value() {
        assert_relative_eq!(parse_value("10k").unwrap(), 10_000.0);
        assert_relative_eq!(parse_value("100n").unwrap(), 100e-9);
        assert_relative_eq!(parse_value("4.7u").unwrap(), 4.7e-6);
        assert_relative_eq!(parse_value("1M").unwrap(), 1_000_000.0);
        assert_relative_eq!(parse_value("2.2").unwrap(), 2.2);
        assert_relative_eq!(parse_value("1e-9").unwrap(), 1e-9);
        assert_relative_eq!(parse_value("-3m").unwrap(), -3e-3);
        assert_eq!(parse_value("inf"), Some(f64::INFINITY));
        assert_eq!(parse_value("nan"), None);
        assert_eq!(parse_value("out"), None);
        assert_eq!(parse_value("2a"), None);
    }

    #[test]
    fn test_device_line() {
        assert_eq!(
            kinds("V1 in 0 9 r=50m\n"),
            vec![
                (TokenKind::Identifier, "V1".to_string()),
                (TokenKind::Identifier, "in".to_string()),
                (TokenKind::Number, "0".to_string()),
                (TokenKind::Number, "9".to_string()),
                (TokenKind::Identifier, "r".to_string()),
                (TokenKind::Equals, "=".to_string()),
                (TokenKind::Number, "50m".to_string()),
                (TokenKind::Newline, "\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_digit_led_names_and_negatives() {
        assert_eq!(
            kinds("R1 2a -1 1e3"),
            vec![
                (TokenKind::Identifier, "R1".to_string()),
                (TokenKind::Identifier, "2a".to_string()),
                (TokenKind::Number, "-1".to_string()),
                (TokenKind::Number, "1e3".to_string()),
            ]
        );
    }

    #[test]
    fn test_directive_and_comments() {
        assert_eq!(
            kinds("# header\n.wire a b ; trailing"),
            vec![
                (TokenKind::Newline, "\n".to_string()),
                (TokenKind::Directive, ".wire".to_string()),
                (TokenKind::Identifier, "a".to_string()),
                (TokenKind::Identifier, "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_position_tracking() {
        let mut lexer = Lexer::new("R1 a b 1\n  R2 b c 2");
        let tokens: Vec<Token> = (&mut lexer).collect::<Result<_>>().unwrap();
        let r2 = tokens.iter().find(|t| t.text == "R2").unwrap();
        assert_eq!((r2.line, r2.column), (2, 3));
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("R1 a b 1\nR2 a $ 2").collect::<Result<Vec<_>>>().unwrap_err();
        assert!(matches!(err, KirchhoffError::LexerError { line: 2, column: 6, .. }));
    }
}
