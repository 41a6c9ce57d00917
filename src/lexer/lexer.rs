//! Lazy, single-pass lexer over a source buffer.
//!
//! `Lexer::next_token` advances the cursor and returns exactly one token;
//! callers (the parser) hold at most one token of lookahead. The lexer
//! never stops early on a malformed character — it reports a diagnostic
//! and synthesizes a one-byte `LexError` token so the parser still has
//! something to advance past.

use std::path::PathBuf;
use std::rc::Rc;
use std::str::CharIndices;

use crate::diagnostics::{CompilerError, Diagnostics, Level, SourceLocation, codes};
use crate::lexer::tokens::{Keyword, Operator, Punct, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<CharIndices<'a>>,
    file: Rc<PathBuf>,
    line: u32,
    column: u32,
    /// Byte offset one past the last character yielded by `chars`, used to
    /// compute an EOF location once the iterator is exhausted.
    end_of_source: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: Rc<PathBuf>) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
            file,
            line: 1,
            column: 1,
            end_of_source: source.len() as u32,
        }
    }

    fn location(&self, start_byte: u32, start_line: u32, start_col: u32, end_byte: u32) -> SourceLocation {
        SourceLocation::new(self.file.clone(), start_line, start_col, start_byte, end_byte)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<(u32, char)> {
        let (byte, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some((byte as u32, ch))
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    // Only a line comment if followed by a second '/'; a
                    // lone '/' is the division operator and must not be
                    // consumed here.
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek().map(|&(_, c)| c) == Some('/') {
                        self.bump(); // first '/'
                        self.bump(); // second '/'
                        while let Some(c) = self.peek_char() {
                            if c == '\n' {
                                break;
                            }
                            self.bump();
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Returns one token and advances the cursor. Always eventually
    /// returns `Eof` and never consumes past the end of `source`.
    pub fn next_token(&mut self, diagnostics: &mut Diagnostics) -> Token {
        self.skip_whitespace_and_comments();

        let start_line = self.line;
        let start_col = self.column;
        let start_byte = self.chars.peek().map(|&(b, _)| b as u32).unwrap_or(self.end_of_source);

        let Some((_, first)) = self.bump() else {
            let loc = self.location(start_byte, start_line, start_col, start_byte);
            return Token::new(TokenKind::Eof, loc);
        };

        if first.is_alphabetic() || first == '_' {
            return self.lex_identifier(first, start_byte, start_line, start_col);
        }
        if first.is_ascii_digit() {
            return self.lex_number(first, start_byte, start_line, start_col, diagnostics);
        }

        self.lex_punct_or_operator(first, start_byte, start_line, start_col, diagnostics)
    }

    fn lex_identifier(&mut self, first: char, start_byte: u32, start_line: u32, start_col: u32) -> Token {
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let end_byte = start_byte + text.len() as u32;
        let loc = self.location(start_byte, start_line, start_col, end_byte);
        let kind = match Keyword::classify(&text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(text),
        };
        Token::new(kind, loc)
    }

    fn lex_number(
        &mut self,
        first: char,
        start_byte: u32,
        start_line: u32,
        start_col: u32,
        diagnostics: &mut Diagnostics,
    ) -> Token {
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let end_byte = start_byte + text.len() as u32;
        let loc = self.location(start_byte, start_line, start_col, end_byte);

        match text.parse::<i64>() {
            Ok(value) if value <= i64::from(i32::MAX) && value >= 0 => {
                Token::new(TokenKind::IntLiteral(value), loc)
            }
            _ => {
                diagnostics.add(
                    CompilerError::new(
                        codes::NUMBER_TOO_LARGE,
                        Level::Lexical,
                        loc.clone(),
                        format!("integer literal '{text}' does not fit in a 32-bit signed integer"),
                    )
                    .with_suggestion("use a value between 0 and 2147483647"),
                );
                Token::new(TokenKind::IntLiteral(0), loc)
            }
        }
    }

    fn lex_punct_or_operator(
        &mut self,
        first: char,
        start_byte: u32,
        start_line: u32,
        start_col: u32,
        diagnostics: &mut Diagnostics,
    ) -> Token {
        let single = |kind: TokenKind, end: u32, lexer: &Lexer<'a>| {
            Token::new(kind, lexer.location(start_byte, start_line, start_col, end))
        };
        let end_one = start_byte + first.len_utf8() as u32;

        macro_rules! two_char {
            ($second:literal, $kind:expr, $fallback:expr) => {{
                if self.peek_char() == Some($second) {
                    self.bump();
                    let end = start_byte + first.len_utf8() as u32 + $second.len_utf8() as u32;
                    return single($kind, end, self);
                }
                return single($fallback, end_one, self);
            }};
        }

        match first {
            '(' => single(TokenKind::Punct(Punct::LParen), end_one, self),
            ')' => single(TokenKind::Punct(Punct::RParen), end_one, self),
            '{' => single(TokenKind::Punct(Punct::LBrace), end_one, self),
            '}' => single(TokenKind::Punct(Punct::RBrace), end_one, self),
            ';' => single(TokenKind::Punct(Punct::Semicolon), end_one, self),
            '?' => single(TokenKind::Punct(Punct::Question), end_one, self),
            ':' => single(TokenKind::Punct(Punct::Colon), end_one, self),

            '!' => two_char!('=', TokenKind::Operator(Operator::NotEq), TokenKind::Operator(Operator::Bang)),
            '=' => two_char!('=', TokenKind::Operator(Operator::Eq), TokenKind::Operator(Operator::Assign)),
            '<' => two_char!('=', TokenKind::Operator(Operator::LtEq), TokenKind::Operator(Operator::Lt)),
            '>' => two_char!('=', TokenKind::Operator(Operator::GtEq), TokenKind::Operator(Operator::Gt)),

            '~' => single(TokenKind::Operator(Operator::Tilde), end_one, self),
            '-' => single(TokenKind::Operator(Operator::Minus), end_one, self),
            '+' => single(TokenKind::Operator(Operator::Plus), end_one, self),
            '*' => single(TokenKind::Operator(Operator::Star), end_one, self),
            '/' => single(TokenKind::Operator(Operator::Slash), end_one, self),
            '%' => single(TokenKind::Operator(Operator::Percent), end_one, self),

            '&' => {
                if self.peek_char() == Some('&') {
                    self.bump();
                    let end = start_byte + 2;
                    single(TokenKind::Operator(Operator::AndAnd), end, self)
                } else {
                    let loc = self.location(start_byte, start_line, start_col, end_one);
                    diagnostics.add(
                        CompilerError::new(
                            codes::INVALID_CHARACTER,
                            Level::Lexical,
                            loc.clone(),
                            "unexpected single '&'",
                        )
                        .with_suggestion("use '&&' for logical AND"),
                    );
                    Token::new(TokenKind::LexError, loc)
                }
            }
            '|' => {
                if self.peek_char() == Some('|') {
                    self.bump();
                    let end = start_byte + 2;
                    single(TokenKind::Operator(Operator::OrOr), end, self)
                } else {
                    let loc = self.location(start_byte, start_line, start_col, end_one);
                    diagnostics.add(
                        CompilerError::new(
                            codes::INVALID_CHARACTER,
                            Level::Lexical,
                            loc.clone(),
                            "unexpected single '|'",
                        )
                        .with_suggestion("use '||' for logical OR"),
                    );
                    Token::new(TokenKind::LexError, loc)
                }
            }

            other => {
                let loc = self.location(start_byte, start_line, start_col, end_one);
                diagnostics.add(CompilerError::new(
                    codes::INVALID_CHARACTER,
                    Level::Lexical,
                    loc.clone(),
                    format!("unexpected character '{other}'"),
                ));
                Token::new(TokenKind::LexError, loc)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> (Vec<TokenKind>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut lexer = Lexer::new(source, Rc::new(PathBuf::from("test.c")));
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token(&mut diagnostics);
            let is_eof = token.is_eof();
            kinds.push(token.kind);
            if is_eof {
                break;
            }
        }
        (kinds, diagnostics)
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let (kinds, diags) = lex_all("int main return x");
        assert!(diags.is_empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Int),
                TokenKind::Identifier("main".into()),
                TokenKind::Keyword(Keyword::Return),
                TokenKind::Identifier("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_multi_char_operators_by_one_char_lookahead() {
        let (kinds, _) = lex_all("== != <= >= && || = < >");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Operator(Operator::Eq),
                TokenKind::Operator(Operator::NotEq),
                TokenKind::Operator(Operator::LtEq),
                TokenKind::Operator(Operator::GtEq),
                TokenKind::Operator(Operator::AndAnd),
                TokenKind::Operator(Operator::OrOr),
                TokenKind::Operator(Operator::Assign),
                TokenKind::Operator(Operator::Lt),
                TokenKind::Operator(Operator::Gt),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lone_ampersand_is_lex_error_with_suggestion() {
        let (kinds, diags) = lex_all("&");
        assert_eq!(kinds, vec![TokenKind::LexError, TokenKind::Eof]);
        assert_eq!(diags.errors().len(), 1);
        assert_eq!(diags.errors()[0].id, codes::INVALID_CHARACTER);
        assert!(diags.has_fatal());
    }

    #[test]
    fn skips_line_comments() {
        let (kinds, diags) = lex_all("int // a comment\nmain");
        assert!(diags.is_empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Int),
                TokenKind::Identifier("main".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn division_operator_is_not_mistaken_for_comment() {
        let (kinds, _) = lex_all("6 / 2");
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral(6),
                TokenKind::Operator(Operator::Slash),
                TokenKind::IntLiteral(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_overflowing_i32_is_reported_but_still_tokenized() {
        let (kinds, diags) = lex_all("99999999999");
        assert_eq!(kinds, vec![TokenKind::IntLiteral(0), TokenKind::Eof]);
        assert_eq!(diags.errors()[0].id, codes::NUMBER_TOO_LARGE);
    }

    #[test]
    fn total_token_length_covers_the_whole_source() {
        let source = "int main ( ) { return 0 ; }";
        let mut diagnostics = Diagnostics::new();
        let mut lexer = Lexer::new(source, Rc::new(PathBuf::from("test.c")));
        let mut last_end = 0u32;
        loop {
            let token = lexer.next_token(&mut diagnostics);
            let is_eof = token.is_eof();
            last_end = token.location.end_byte.max(last_end);
            if is_eof {
                break;
            }
        }
        assert_eq!(last_end as usize, source.len());
    }

    proptest::proptest! {
        /// For any UTF-8 input, `next_token` must terminate in a bounded
        /// number of calls, every token's span is non-decreasing, and the
        /// final `Eof` always sits at the end of the buffer. The lexer must
        /// never panic, loop, or leave bytes unaccounted for, regardless of
        /// how garbled the input is.
        #[test]
        fn lexing_is_total_over_arbitrary_input(source in ".{0,200}") {
            let mut diagnostics = Diagnostics::new();
            let mut lexer = Lexer::new(&source, Rc::new(PathBuf::from("fuzz.c")));
            let mut last_end = 0u32;
            let mut iterations = 0;
            loop {
                let token = lexer.next_token(&mut diagnostics);
                proptest::prop_assert!(token.location.start_byte >= last_end || token.is_eof());
                proptest::prop_assert!(token.location.end_byte >= token.location.start_byte);
                last_end = token.location.end_byte.max(last_end);
                iterations += 1;
                proptest::prop_assert!(iterations <= source.len() + 2, "lexer did not terminate");
                if token.is_eof() {
                    break;
                }
            }
            proptest::prop_assert_eq!(last_end as usize, source.len());
        }
    }
}
