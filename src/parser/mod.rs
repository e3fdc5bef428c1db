//! Recursive-descent parser: token stream → [`Query`](crate::ast::Query).

mod expr;
mod select;
mod source;

use std::collections::HashSet;

use crate::ast::*;
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::span::Span;
use crate::token::{Token, TokenKind};

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// CTE names currently in scope, saved/restored around nested subqueries
    /// so an inner `WITH` cannot leak names to an outer `FROM`.
    cte_names: HashSet<String>,
    pub(crate) config: ParserConfig,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>, config: ParserConfig) -> Self {
        Self {
            tokens,
            pos: 0,
            cte_names: HashSet::new(),
            config,
        }
    }

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn peek(&self, ahead: usize) -> &Token {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let current = self.current();
        ParseError::syntax(
            format!(
                "Expected {expected}, found '{}' at position {}",
                if current.kind == TokenKind::Eof {
                    "<eof>"
                } else {
                    current.text.as_str()
                },
                current.pos
            ),
            Span::point(current.pos),
        )
    }

    pub(crate) fn pos_span(&self) -> Span {
        Span::point(self.current().pos)
    }

    /// Matches a keyword-by-text identifier case-insensitively without
    /// consuming on failure. Used for axis/field-kind words and function
    /// names that are plain identifiers, not dedicated keyword tokens.
    pub(crate) fn at_word(&self, word: &str) -> bool {
        let current = self.current();
        (current.kind == TokenKind::Identifier || current.kind.is_tag_identifier())
            && current.text.eq_ignore_ascii_case(word)
    }
}

/// Parses a complete statement: optional `WITH`, `SELECT`, optional
/// `FROM`/`WHERE`/`ORDER BY`/`LIMIT`/`TO`, terminated by `;` or end-of-input.
pub(crate) fn parse_query(parser: &mut Parser) -> Result<Query, ParseError> {
    let start = parser.current().pos;
    let ctes = parse_with_clause(parser)?;

    parser.expect(TokenKind::KeywordSelect, "SELECT")?;
    let (select_items, select_star_excludes) = select::parse_select_list(parser)?;

    let source = if parser.eat(TokenKind::KeywordFrom) {
        Some(source::parse_source(parser)?)
    } else {
        None
    };

    let where_expr = if parser.eat(TokenKind::KeywordWhere) {
        Some(expr::parse_expr(parser)?)
    } else {
        None
    };

    let order_by = if parser.eat(TokenKind::KeywordOrder) {
        parser.expect(TokenKind::KeywordBy, "BY")?;
        parse_order_by_list(parser)?
    } else {
        Vec::new()
    };

    let limit = if parser.eat(TokenKind::KeywordLimit) {
        Some(parse_limit(parser)?)
    } else {
        None
    };

    let sink = if parser.eat(TokenKind::KeywordTo) {
        Some(parse_sink(parser)?)
    } else {
        None
    };

    parser.eat(TokenKind::Semicolon);
    let end = parser.current().pos;

    Ok(Query {
        ctes,
        select_items,
        select_star_excludes,
        source,
        where_expr,
        order_by,
        limit,
        sink,
        span: Span::new(start, end),
    })
}

fn parse_with_clause(parser: &mut Parser) -> Result<Vec<(String, Query)>, ParseError> {
    if !parser.eat(TokenKind::KeywordWith) {
        return Ok(Vec::new());
    }
    let mut ctes = Vec::new();
    loop {
        let name_token = parser.expect(TokenKind::Identifier, "a CTE name")?;
        parser.expect(TokenKind::KeywordAs, "AS")?;
        parser.expect(TokenKind::LParen, "'('")?;

        // A nested WITH inside this subquery must not see, nor leak into,
        // the enclosing scope's CTE names.
        let saved = std::mem::take(&mut parser.cte_names);
        for (name, _) in &ctes {
            parser.cte_names.insert(name.clone());
        }
        let subquery = parse_query(parser)?;
        parser.cte_names = saved;

        parser.expect(TokenKind::RParen, "')'")?;
        parser.cte_names.insert(name_token.text.clone());
        ctes.push((name_token.text, subquery));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    Ok(ctes)
}

fn parse_order_by_list(parser: &mut Parser) -> Result<Vec<OrderByItem>, ParseError> {
    let mut items = Vec::new();
    loop {
        let expr = expr::parse_scalar(parser)?;
        let direction = if parser.eat(TokenKind::KeywordAsc) {
            OrderDirection::Asc
        } else if parser.eat(TokenKind::KeywordDesc) {
            OrderDirection::Desc
        } else {
            OrderDirection::Asc
        };
        items.push(OrderByItem { expr, direction });
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    Ok(items)
}

fn parse_limit(parser: &mut Parser) -> Result<u64, ParseError> {
    let token = parser.expect(TokenKind::Number, "a non-negative integer")?;
    token
        .text
        .parse::<u64>()
        .map_err(|_| ParseError::syntax("LIMIT must be a non-negative integer", Span::point(token.pos)))
}

fn parse_sink(parser: &mut Parser) -> Result<Sink, ParseError> {
    let path_arg = |parser: &mut Parser| -> Result<String, ParseError> {
        parser.expect(TokenKind::LParen, "'('")?;
        let path = parser.expect(TokenKind::String, "a path string")?.text;
        parser.expect(TokenKind::RParen, "')'")?;
        Ok(path)
    };

    if parser.at_word("CSV") {
        parser.advance();
        Ok(Sink::Csv { path: path_arg(parser)? })
    } else if parser.at_word("PARQUET") {
        parser.advance();
        Ok(Sink::Parquet { path: path_arg(parser)? })
    } else if parser.eat(TokenKind::KeywordJson) {
        Ok(Sink::Json { path: path_arg(parser)? })
    } else if parser.eat(TokenKind::KeywordNdjson) {
        Ok(Sink::Ndjson { path: path_arg(parser)? })
    } else if parser.eat(TokenKind::KeywordList) {
        parser.expect(TokenKind::LParen, "'('")?;
        parser.expect(TokenKind::RParen, "')'")?;
        Ok(Sink::List)
    } else if parser.eat(TokenKind::KeywordTable) {
        parser.expect(TokenKind::LParen, "'('")?;
        parser.expect(TokenKind::RParen, "')'")?;
        Ok(Sink::Table)
    } else {
        Err(parser.unexpected("a sink (CSV, PARQUET, JSON, NDJSON, LIST, or TABLE)"))
    }
}

/// Parses `source` end to end and maps the crate's internal error type to the
/// public [`crate::error::Diagnostic`].
pub fn parse_source_text(source: &str, config: ParserConfig) -> Result<Query, ParseError> {
    let tokens = crate::lexer::tokenize(source)?;
    let mut parser = Parser::new(tokens, config);
    let query = parse_query(&mut parser)?;
    if !parser.at(TokenKind::Eof) {
        return Err(parser.unexpected("end of statement"));
    }
    Ok(query)
}
