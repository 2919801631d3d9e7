//! Centralised error hierarchy for the **Kiwi parser**.
//!
//! The parser aborts on the first syntax error: every grammar rule returns a
//! [`Result`] and propagates failures with `?` until they reach the entry
//! point that started the parse. There is no recovery and no partial tree.
//!
//! The module **does not** print diagnostics itself.

use thiserror::Error;

use log::info;

use crate::token::Token;

/// Canonical error type used throughout the crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KiwiError {
    /// An explicit `consume` found a different token than the grammar requires.
    #[error("{}Expected {expected} but saw {found}", location(.line))]
    UnexpectedToken {
        /// Token spelling or description of what the rule needed.
        expected: String,

        /// The lookahead token at the point of failure.
        found: Token,

        /// Source text backing `found`.
        lexeme: String,

        /// 1‑based line, when the token source tracks one.
        line: Option<usize>,
    },

    /// Statement or term dispatch found no alternative for the lookahead.
    #[error("{}Expected {expected} but saw {found}", location(.line))]
    NoMatchingRule {
        expected: String,
        found: Token,
        lexeme: String,
        line: Option<usize>,
    },

    /// Nesting went past the parser's depth bound.
    #[error("{}Nesting deeper than {limit} levels at {found}", location(.line))]
    TooDeep {
        limit: usize,
        found: Token,
        lexeme: String,
        line: Option<usize>,
    },

    /// UTF‑8 decoding failure when ingesting source text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn location(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("[line {}] ", line),
        None => String::new(),
    }
}

impl KiwiError {
    /// Helper constructor for a failed `consume`.
    pub fn unexpected<S: Into<String>>(
        expected: S,
        found: Token,
        lexeme: &str,
        line: Option<usize>,
    ) -> Self {
        let expected: String = expected.into();

        info!(
            "Creating UnexpectedToken error: expected={}, found={}, line={:?}",
            expected, found, line
        );

        KiwiError::UnexpectedToken {
            expected,
            found,
            lexeme: lexeme.to_owned(),
            line,
        }
    }

    /// Helper constructor for a dispatch with no matching alternative.
    pub fn no_rule<S: Into<String>>(
        expected: S,
        found: Token,
        lexeme: &str,
        line: Option<usize>,
    ) -> Self {
        let expected: String = expected.into();

        info!(
            "Creating NoMatchingRule error: expected={}, found={}, line={:?}",
            expected, found, line
        );

        KiwiError::NoMatchingRule {
            expected,
            found,
            lexeme: lexeme.to_owned(),
            line,
        }
    }

    /// Helper constructor for input nested past `limit` levels.
    pub fn too_deep(limit: usize, found: Token, lexeme: &str, line: Option<usize>) -> Self {
        info!(
            "Creating TooDeep error: limit={}, found={}, line={:?}",
            limit, found, line
        );

        KiwiError::TooDeep {
            limit,
            found,
            lexeme: lexeme.to_owned(),
            line,
        }
    }

    /// `true` for errors raised while parsing, `false` for decoding failures.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            KiwiError::UnexpectedToken { .. }
                | KiwiError::NoMatchingRule { .. }
                | KiwiError::TooDeep { .. }
        )
    }

    /// The token the parser was looking at when it aborted.
    pub fn found(&self) -> Option<Token> {
        match self {
            KiwiError::UnexpectedToken { found, .. }
            | KiwiError::NoMatchingRule { found, .. }
            | KiwiError::TooDeep { found, .. } => Some(*found),
            _ => None,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, KiwiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_without_line() {
        let err = KiwiError::unexpected("}", Token::EOF, "", None);

        assert_eq!(err.to_string(), "Expected } but saw EOF");
        assert!(err.is_syntax());
    }

    #[test]
    fn renders_with_line() {
        let err = KiwiError::no_rule("a value or identifier", Token::SEMICOLON, ";", Some(3));

        assert_eq!(
            err.to_string(),
            "[line 3] Expected a value or identifier but saw ;"
        );
        assert_eq!(err.found(), Some(Token::SEMICOLON));
    }

    #[test]
    fn renders_depth_limit() {
        let err = KiwiError::too_deep(256, Token::LPAREN, "(", Some(1));

        assert_eq!(err.to_string(), "[line 1] Nesting deeper than 256 levels at (");
        assert!(err.is_syntax());
    }

    #[test]
    fn decoding_errors_are_not_syntax_errors() {
        let err: KiwiError = String::from_utf8(vec![0xff, 0xfe]).unwrap_err().into();

        assert!(!err.is_syntax());
        assert_eq!(err.found(), None);
    }
}
