//! `FROM` clause parsing: documents, paths/URLs, `RAW`, `FRAGMENTS`,
//! `PARSE`, CTE references, and derived subqueries.

use crate::ast::*;
use crate::error::ParseError;
use crate::span::Span;
use crate::token::TokenKind;

use super::expr;
use super::parse_query;
use super::Parser;

pub(crate) fn parse_source(parser: &mut Parser) -> Result<Source, ParseError> {
    let start = parser.current().pos;

    if parser.eat(TokenKind::LParen) {
        return parse_subquery_source(parser, start);
    }

    if parser.at(TokenKind::KeywordRaw) && parser.peek(1).kind == TokenKind::LParen {
        parser.advance();
        parser.advance();
        let html = parser.expect(TokenKind::String, "an HTML string literal")?.text;
        parser.expect(TokenKind::RParen, "')'")?;
        let alias = parse_source_alias(parser, None)?;
        return Ok(Source {
            kind: SourceKind::RawHtml { value: html },
            alias,
            span: Span::new(start, parser.end()),
        });
    }

    if parser.at(TokenKind::KeywordFragments) && parser.peek(1).kind == TokenKind::LParen {
        parser.advance();
        parser.advance();
        let inner = if parser.at(TokenKind::KeywordRaw) {
            parser.advance();
            parser.expect(TokenKind::LParen, "'('")?;
            let html = parser.expect(TokenKind::String, "an HTML string literal")?.text;
            parser.expect(TokenKind::RParen, "')'")?;
            FragmentsInner::Raw(html)
        } else {
            FragmentsInner::Query(Box::new(parse_nested_subquery(parser)?))
        };
        parser.expect(TokenKind::RParen, "')'")?;
        let alias = parse_source_alias(parser, None)?;
        return Ok(Source {
            kind: SourceKind::Fragments { inner },
            alias,
            span: Span::new(start, parser.end()),
        });
    }

    if parser.at(TokenKind::KeywordParse) && parser.peek(1).kind == TokenKind::LParen {
        parser.advance();
        parser.advance();
        let inner = if parser.at(TokenKind::KeywordSelect) {
            ParseInner::Query(Box::new(parse_nested_subquery(parser)?))
        } else {
            ParseInner::Expr(Box::new(expr::parse_scalar(parser)?))
        };
        parser.expect(TokenKind::RParen, "')'")?;
        let alias = parse_source_alias(parser, None)?;
        return Ok(Source {
            kind: SourceKind::Parse { inner },
            alias,
            span: Span::new(start, parser.end()),
        });
    }

    if parser.at(TokenKind::String) {
        let token = parser.advance();
        let kind = if token.text.starts_with("http://") || token.text.starts_with("https://") {
            SourceKind::Url { value: token.text }
        } else {
            SourceKind::Path { value: token.text }
        };
        let alias = parse_source_alias(parser, None)?;
        return Ok(Source {
            kind,
            alias,
            span: Span::new(start, parser.end()),
        });
    }

    if parser.at(TokenKind::Identifier) || parser.at(TokenKind::KeywordDoc) || parser.at(TokenKind::KeywordDocument) {
        let ident = parser.advance();
        if parser.cte_names.contains(&ident.text) {
            let alias = parse_source_alias(parser, None)?;
            return Ok(Source {
                kind: SourceKind::CteRef { name: ident.text },
                alias,
                span: Span::new(start, parser.end()),
            });
        }
        if ident.text.eq_ignore_ascii_case("doc") || ident.text.eq_ignore_ascii_case("document") {
            let alias = parse_source_alias(parser, Some("doc".to_string()))?;
            return Ok(Source {
                kind: SourceKind::Document,
                alias,
                span: Span::new(start, parser.end()),
            });
        }
        // Legacy `FROM table` compatibility: treat any other bare identifier
        // as the document, aliased to the identifier itself.
        let alias = parse_source_alias(parser, Some(ident.text))?;
        return Ok(Source {
            kind: SourceKind::Document,
            alias,
            span: Span::new(start, parser.end()),
        });
    }

    Err(parser.unexpected("a FROM source"))
}

fn parse_subquery_source(parser: &mut Parser, start: usize) -> Result<Source, ParseError> {
    let subquery = parse_nested_subquery(parser)?;
    parser.expect(TokenKind::RParen, "')'")?;
    let alias = parse_source_alias(parser, None)?;
    if alias.is_none() {
        return Err(ParseError::shape(
            "A derived subquery source requires an alias",
            parser.pos_span(),
        ));
    }
    Ok(Source {
        kind: SourceKind::DerivedSubquery { query: Box::new(subquery) },
        alias,
        span: Span::new(start, parser.end()),
    })
}

/// Parses a `(…)`-wrapped or bare nested query, saving and restoring the
/// enclosing scope's CTE names so an inner `WITH` cannot leak outward.
fn parse_nested_subquery(parser: &mut Parser) -> Result<Query, ParseError> {
    let saved = parser.cte_names.clone();
    let result = parse_query(parser);
    parser.cte_names = saved;
    result
}

fn parse_source_alias(parser: &mut Parser, default: Option<String>) -> Result<Option<String>, ParseError> {
    if parser.eat(TokenKind::KeywordAs) {
        let token = parser.expect(TokenKind::Identifier, "an alias")?;
        return Ok(Some(token.text));
    }
    if parser.at(TokenKind::Identifier) {
        let token = parser.advance();
        return Ok(Some(token.text));
    }
    Ok(default)
}
