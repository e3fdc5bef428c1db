//! Character stream → token stream.

use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::span::Span;
use crate::token::{lookup_keyword, Token, TokenKind};

pub struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Tokenizes the full source, ending with one `Eof` sentinel. Aborts on
    /// the first unrecognised character — there is no lexical recovery.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.cursor.pos();
            let Some(c) = self.cursor.peek() else {
                tokens.push(Token::eof(start));
                return Ok(tokens);
            };
            let token = if c.is_ascii_digit() || (c == '-' && self.cursor.peek_next().is_some_and(|n| n.is_ascii_digit())) {
                self.lex_number()?
            } else if c == '\'' || c == '"' {
                self.lex_string(c)?
            } else if is_ident_start(c) {
                self.lex_identifier()
            } else {
                self.lex_punctuation()?
            };
            tokens.push(token);
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('-') if self.cursor.peek_next() == Some('-') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('/') if self.cursor.peek_next() == Some('*') => {
                    let start = self.cursor.pos();
                    self.cursor.advance();
                    self.cursor.advance();
                    loop {
                        match self.cursor.peek() {
                            None => {
                                return Err(ParseError::lex(
                                    "Unterminated block comment",
                                    Span::point(start),
                                ))
                            }
                            Some('*') if self.cursor.peek_next() == Some('/') => {
                                self.cursor.advance();
                                self.cursor.advance();
                                break;
                            }
                            Some(_) => {
                                self.cursor.advance();
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_number(&mut self) -> Result<Token, ParseError> {
        let start = self.cursor.pos();
        if self.cursor.peek() == Some('-') {
            self.cursor.advance();
        }
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let end = self.cursor.pos();
        Ok(Token {
            kind: TokenKind::Number,
            text: self.cursor.slice(start, end).to_string(),
            pos: start,
        })
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, ParseError> {
        let start = self.cursor.pos();
        self.cursor.advance();
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(ParseError::lex(
                        "Unterminated string literal",
                        Span::point(start),
                    ))
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    if self.cursor.peek() == Some(quote) {
                        // Doubled quote escapes to one literal quote.
                        value.push(quote);
                        self.cursor.advance();
                        continue;
                    }
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        Ok(Token {
            kind: TokenKind::String,
            text: value,
            pos: start,
        })
    }

    fn lex_identifier(&mut self) -> Token {
        let start = self.cursor.pos();
        self.cursor.eat_while(is_ident_continue);
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end).to_string();
        let upper = text.to_ascii_uppercase();
        let kind = lookup_keyword(&upper).unwrap_or(TokenKind::Identifier);
        Token {
            kind,
            text,
            pos: start,
        }
    }

    fn lex_punctuation(&mut self) -> Result<Token, ParseError> {
        let start = self.cursor.pos();
        let c = self.cursor.advance().expect("checked by caller");
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '*' => TokenKind::Star,
            '~' => TokenKind::Tilde,
            '=' => TokenKind::Equal,
            '<' => {
                if self.cursor.peek() == Some('>') {
                    self.cursor.advance();
                    TokenKind::NotEqual
                } else if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            '!' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    TokenKind::NotEqual
                } else {
                    return Err(ParseError::lex(
                        format!("Unexpected character '{c}'"),
                        Span::point(start),
                    ));
                }
            }
            other => {
                return Err(ParseError::lex(
                    format!("Unexpected character '{other}'"),
                    Span::point(start),
                ))
            }
        };
        let end = self.cursor.pos();
        Ok(Token {
            kind,
            text: self.cursor.slice(start, end).to_string(),
            pos: start,
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenizes `source`, discarding successful results into a `Vec<Token>` or
/// surfacing the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_select_star_from_doc() {
        let ks = kinds("SELECT * FROM doc");
        assert_eq!(
            ks,
            vec![
                TokenKind::KeywordSelect,
                TokenKind::Star,
                TokenKind::KeywordFrom,
                TokenKind::KeywordDoc,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_matching_is_case_insensitive() {
        let ks = kinds("select Where");
        assert_eq!(ks[0], TokenKind::KeywordSelect);
        assert_eq!(ks[1], TokenKind::KeywordWhere);
    }

    #[test]
    fn string_literal_unescapes_doubled_quote() {
        let tokens = tokenize("'it''s'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "it's");
    }

    #[test]
    fn double_quoted_string_also_supported() {
        let tokens = tokenize("\"a\"\"b\"").unwrap();
        assert_eq!(tokens[0].text, "a\"b");
    }

    #[test]
    fn comments_are_skipped() {
        let ks = kinds("SELECT -- trailing comment\n* FROM /* block */ doc");
        assert_eq!(
            ks,
            vec![
                TokenKind::KeywordSelect,
                TokenKind::Star,
                TokenKind::KeywordFrom,
                TokenKind::KeywordDoc,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn operators_lex_longest_match() {
        let ks = kinds("<> <= >= = < >");
        assert_eq!(
            ks,
            vec![
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Equal,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn negative_number_literal() {
        let tokens = tokenize("-42").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "-42");
    }

    #[test]
    fn unterminated_string_is_lex_error() {
        let err = tokenize("'oops").unwrap_err();
        assert!(matches!(err, ParseError::Lex { .. }));
    }

    #[test]
    fn unknown_character_is_lex_error() {
        let err = tokenize("SELECT # FROM doc").unwrap_err();
        assert!(matches!(err, ParseError::Lex { .. }));
    }

    #[test]
    fn positions_are_byte_offsets() {
        let tokens = tokenize("SELECT tag").unwrap();
        assert_eq!(tokens[0].pos, 0);
        assert_eq!(tokens[1].pos, 7);
    }
}
