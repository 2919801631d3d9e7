//! Module `scanner` implements a one‑pass, streaming lexer for Kiwi source.
//!
//! It turns a `&str` into `(Token, lexeme)` pairs for the parser. Whitespace is
//! skipped; comments are *classified* (emitted as [`Token::COMMENT`]) rather
//! than dropped, leaving it to the consumer to ignore them.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//! - `impl TokenSource for Scanner<'a>`: `next_token()` yields the next pair, and
//!   `(EOF, "")` forever once input is exhausted. `line()` reports the line
//!   the last token ended on.
//! - `impl Iterator for Scanner<'a>`: the same pairs, ending after one `EOF`.
//!
//! # Token Recognition
//!
//! - Single‑character tokens: `+ - * % = > < ( ) { } , ;` and `~`, `:`.
//! - Two‑character operators: `~=`, `>=`, `<=`, `:=`, `&&`, `||`.
//! - Comments: `//` to end of line, `/* … */` (runs to EOF if unterminated).
//! - Strings: `"…"` with `\"`, `\\`, `\n`, `\t` escapes. Unterminated → `UNKNOWN`.
//! - Numbers: digits with an optional `.digits` fraction.
//! - Identifiers: letter, `_` or non‑ASCII start. Keywords come from a perfect
//!   hash map; `true` / `false` in any letter case are `BOOL`.
//! - Anything else is a single‑character `UNKNOWN` token.

use crate::parser::TokenSource;
use crate::token::Token;
use log::{debug, info};
use memchr::{memchr, memchr2, memmem};
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], Token> = phf_map! {
    b"if"     => Token::IF,
    b"else"   => Token::ELSE,
    b"func"   => Token::FUNC,
    b"return" => Token::RETURN,
    b"while"  => Token::WHILE,
};

/// A single pass lexer over borrowed source text.
pub struct Scanner<'a> {
    src: &'a str,
    start: usize,  // index of the *first* byte of the current lexeme
    curr: usize,   // index *one past* the last byte examined
    line: usize,   // 1‑based line counter (\n increments)
    done: bool,    // EOF already handed out by the iterator
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            done: false,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Peek at the current byte without consuming it. Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.bytes().get(self.curr).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.bytes().get(self.curr + 1).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.peek();
        self.curr += 1;
        b
    }

    /// Consume the current byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.curr += 1;
            true
        } else {
            false
        }
    }

    /// Source text of the current lexeme. Lexemes always start and end on
    /// ASCII bytes or at end of input, so the slice lands on char boundaries.
    fn lexeme(&self) -> String {
        self.src
            .get(self.start..self.curr.min(self.src.len()))
            .unwrap_or_default()
            .to_owned()
    }

    fn count_lines(&mut self, from: usize, to: usize) {
        self.line += memchr::memchr_iter(b'\n', &self.bytes()[from..to]).count();
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Skip whitespace, then scan one token starting at `self.curr`.
    fn scan_token(&mut self) -> (Token, String) {
        loop {
            match self.peek() {
                b' ' | b'\r' | b'\t' => self.curr += 1,
                b'\n' => {
                    self.line += 1;
                    self.curr += 1;
                }
                _ => break,
            }
        }

        self.start = self.curr;

        if self.is_at_end() {
            return (Token::EOF, String::new());
        }

        let b = self.advance();

        let tkn: Token = match b {
            b'+' => Token::ADD,
            b'-' => Token::SUBTRACT,
            b'*' => Token::MULTIPLY,
            b'%' => Token::MODULO,
            b'=' => Token::EQUAL,
            b'(' => Token::LPAREN,
            b')' => Token::RPAREN,
            b'{' => Token::LBRACE,
            b'}' => Token::RBRACE,
            b',' => Token::COMMA,
            b';' => Token::SEMICOLON,

            b'~' => {
                if self.match_byte(b'=') {
                    Token::NOT_EQUAL
                } else {
                    Token::NOT
                }
            }

            b'>' => {
                if self.match_byte(b'=') {
                    Token::GREATER_EQ
                } else {
                    Token::GREATER
                }
            }

            b'<' => {
                if self.match_byte(b'=') {
                    Token::LESS_EQ
                } else {
                    Token::LESS
                }
            }

            b':' => {
                if self.match_byte(b'=') {
                    Token::ASSIGN
                } else {
                    Token::COLON
                }
            }

            b'&' => {
                if self.match_byte(b'&') {
                    Token::AND
                } else {
                    Token::UNKNOWN
                }
            }

            b'|' => {
                if self.match_byte(b'|') {
                    Token::OR
                } else {
                    Token::UNKNOWN
                }
            }

            b'/' => {
                if self.match_byte(b'/') {
                    self.line_comment()
                } else if self.match_byte(b'*') {
                    self.block_comment()
                } else {
                    Token::DIVIDE
                }
            }

            b'"' => return self.string(),

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' | 0x80..=0xff => self.identifier(),

            _ => Token::UNKNOWN,
        };

        (tkn, self.lexeme())
    }

    /// `// …` up to (not including) the newline.
    fn line_comment(&mut self) -> Token {
        match memchr(b'\n', &self.bytes()[self.curr..]) {
            Some(pos) => self.curr += pos,
            None => self.curr = self.src.len(),
        }

        Token::COMMENT
    }

    /// `/* … */`; an unterminated comment swallows the rest of the input.
    fn block_comment(&mut self) -> Token {
        let from = self.curr;

        match memmem::find(&self.bytes()[self.curr..], b"*/") {
            Some(pos) => self.curr += pos + 2,
            None => self.curr = self.src.len(),
        }

        self.count_lines(from, self.curr);

        Token::COMMENT
    }

    /// A double‑quoted string. The lexeme is the unescaped contents.
    fn string(&mut self) -> (Token, String) {
        let mut value = String::new();

        loop {
            let rest = &self.bytes()[self.curr..];

            let Some(pos) = memchr2(b'"', b'\\', rest) else {
                self.count_lines(self.curr, self.src.len());
                self.curr = self.src.len();

                debug!("Unterminated string on line {}", self.line);

                return (Token::UNKNOWN, self.lexeme());
            };

            let chunk_end = self.curr + pos;
            value.push_str(self.src.get(self.curr..chunk_end).unwrap_or_default());
            self.count_lines(self.curr, chunk_end);
            self.curr = chunk_end;

            if self.advance() == b'"' {
                return (Token::STRING, value);
            }

            match self.advance() {
                b'"' => value.push('"'),
                b'\\' => value.push('\\'),
                b'n' => value.push('\n'),
                b't' => value.push('\t'),
                0 => {
                    return (Token::UNKNOWN, self.lexeme());
                }
                other => {
                    // unknown escapes are kept verbatim
                    value.push('\\');
                    if other.is_ascii() {
                        if other == b'\n' {
                            self.line += 1;
                        }
                        value.push(other as char);
                    } else {
                        self.curr -= 1;
                    }
                }
            }
        }
    }

    /// Digits with an optional fractional part.
    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.curr += 1;
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.curr += 1;

            while self.peek().is_ascii_digit() {
                self.curr += 1;
            }
        }

        Token::NUMBER
    }

    /// An identifier, keyword or boolean literal.
    fn identifier(&mut self) -> Token {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80
        } {
            self.curr += 1;
        }

        let slice: &[u8] = &self.bytes()[self.start..self.curr];

        if slice.eq_ignore_ascii_case(b"true") || slice.eq_ignore_ascii_case(b"false") {
            return Token::BOOL;
        }

        KEYWORDS.get(slice).copied().unwrap_or(Token::IDENTIFIER)
    }
}

impl<'a> TokenSource for Scanner<'a> {
    fn next_token(&mut self) -> (Token, String) {
        let (tkn, lexeme) = self.scan_token();

        debug!("Scanned token ({}) {:?} on line {}", tkn, lexeme, self.line);

        (tkn, lexeme)
    }

    fn line(&self) -> Option<usize> {
        Some(self.line)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = (Token, String);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let pair = self.next_token();

        if pair.0 == Token::EOF {
            self.done = true;
        }

        Some(pair)
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
