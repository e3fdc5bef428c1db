//! SELECT-list parsing: the ten select-item kinds, `EXCLUDE`, `PROJECT`,
//! `FLATTEN`, aggregates, and `TRIM` wrapping.

use crate::ast::*;
use crate::error::ParseError;
use crate::span::Span;
use crate::token::TokenKind;

use super::expr;
use super::Parser;

pub(crate) fn parse_select_list(parser: &mut Parser) -> Result<(Vec<SelectItem>, Vec<String>), ParseError> {
    let mut items = Vec::new();
    let mut excludes = Vec::new();

    loop {
        let mut parsed = parse_select_item(parser)?;
        if parsed.len() == 1
            && matches!(parsed[0], SelectItem::Star { .. })
            && parser.eat(TokenKind::KeywordExclude)
        {
            excludes = parse_exclude_list(parser)?;
        }
        items.append(&mut parsed);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    if items.is_empty() {
        return Err(ParseError::shape("SELECT list cannot be empty", parser.pos_span()));
    }

    let has_tag_only = items.iter().any(|i| matches!(i, SelectItem::TagOnly { .. }));
    let has_field = items.iter().any(SelectItem::is_field_projection);
    if has_tag_only && has_field {
        return Err(ParseError::shape(
            "Cannot mix a tag-only select item with a field projection",
            parser.pos_span(),
        ));
    }

    Ok((items, excludes))
}

fn parse_exclude_list(parser: &mut Parser) -> Result<Vec<String>, ParseError> {
    if parser.eat(TokenKind::LParen) {
        let mut names = vec![exclude_name(parser)?];
        while parser.eat(TokenKind::Comma) {
            names.push(exclude_name(parser)?);
        }
        parser.expect(TokenKind::RParen, "')'")?;
        Ok(names)
    } else {
        Ok(vec![exclude_name(parser)?])
    }
}

fn exclude_name(parser: &mut Parser) -> Result<String, ParseError> {
    let token = parser.expect(TokenKind::Identifier, "a field name")?;
    Ok(token.text.to_ascii_lowercase())
}

fn parse_select_item(parser: &mut Parser) -> Result<Vec<SelectItem>, ParseError> {
    let start = parser.current().pos;

    if parser.eat(TokenKind::Star) {
        return Ok(vec![SelectItem::Star {
            span: Span::new(start, parser.end()),
        }]);
    }

    if parser.at(TokenKind::KeywordCount) {
        return Ok(vec![parse_count(parser, start)?]);
    }
    if parser.at_word("SUMMARIZE") {
        parser.advance();
        parser.expect(TokenKind::LParen, "'('")?;
        parser.expect(TokenKind::Star, "'*'")?;
        parser.expect(TokenKind::RParen, "')'")?;
        return Ok(vec![SelectItem::Aggregate {
            aggregate: Aggregate::Summarize,
            span: Span::new(start, parser.end()),
        }]);
    }
    if parser.at_word("TFIDF") {
        return Ok(vec![parse_tfidf(parser, start)?]);
    }
    if parser.at_word("FLATTEN") || parser.at_word("FLATTEN_TEXT") {
        return Ok(vec![parse_flatten(parser, start)?]);
    }
    if parser.at(TokenKind::KeywordProject) {
        return Ok(vec![parse_project(parser, start)?]);
    }
    if parser.at_word("TRIM") && parser.peek(1).kind == TokenKind::LParen {
        return Ok(vec![parse_trim(parser, start)?]);
    }
    if parser.at_word("TEXT") && parser.peek(1).kind == TokenKind::LParen {
        return Ok(vec![parse_text_function(parser, start, false)?]);
    }
    if parser.at_word("DIRECT_TEXT") && parser.peek(1).kind == TokenKind::LParen {
        return Ok(vec![parse_text_function(parser, start, true)?]);
    }
    if (parser.at_word("INNER_HTML") || parser.at_word("RAW_INNER_HTML")) && parser.peek(1).kind == TokenKind::LParen
    {
        return Ok(vec![parse_inner_html_item(parser, start)?]);
    }

    // A tag identifier followed by `(field1, field2, ...)` is multi-field
    // shorthand expanding to one Field item per name; `tag.field` is a
    // single field projection; a bare tag with no further punctuation is
    // tag-only; anything else falls back to a whitelisted scalar-function
    // projection.
    if parser.current().kind.is_tag_identifier() {
        if parser.peek(1).kind == TokenKind::LParen && is_known_scalar_function(parser) {
            return Ok(vec![parse_scalar_projection(parser, start)?]);
        }
        if parser.peek(1).kind == TokenKind::LParen {
            return parse_multi_field_shorthand(parser, start);
        }
        if parser.peek(1).kind == TokenKind::Dot {
            let tag_token = parser.advance();
            parser.advance();
            let field_token = parser.expect(TokenKind::Identifier, "a field name")?;
            return Ok(vec![SelectItem::Field {
                tag: tag_token.text,
                field: field_token.text,
                span: Span::new(start, parser.end()),
            }]);
        }
        let tag_token = parser.advance();
        return Ok(vec![SelectItem::TagOnly {
            tag: tag_token.text,
            span: Span::new(start, parser.end()),
        }]);
    }

    Ok(vec![parse_scalar_projection(parser, start)?])
}

fn is_known_scalar_function(parser: &Parser) -> bool {
    const NAMES: &[&str] = &[
        "CONCAT",
        "SUBSTRING",
        "SUBSTR",
        "LENGTH",
        "CHAR_LENGTH",
        "POSITION",
        "LOCATE",
        "REPLACE",
        "LOWER",
        "UPPER",
        "LTRIM",
        "RTRIM",
        "TRIM",
        "DIRECT_TEXT",
        "COALESCE",
        "ATTR",
    ];
    let current = parser.current();
    current.kind == TokenKind::Identifier && NAMES.iter().any(|n| current.text.eq_ignore_ascii_case(n))
}

fn parse_scalar_projection(parser: &mut Parser, start: usize) -> Result<SelectItem, ParseError> {
    let scalar = expr::parse_scalar(parser)?;
    let alias = if parser.eat(TokenKind::KeywordAs) {
        parser.expect(TokenKind::Identifier, "an alias")?.text
    } else {
        default_alias(&scalar)
    };
    Ok(SelectItem::ScalarProjection {
        expr: scalar,
        alias,
        span: Span::new(start, parser.end()),
    })
}

fn default_alias(scalar: &ScalarExpr) -> String {
    match scalar {
        ScalarExpr::FunctionCall { name, .. } => name.to_ascii_lowercase(),
        _ => "value".to_string(),
    }
}

fn parse_count(parser: &mut Parser, start: usize) -> Result<SelectItem, ParseError> {
    parser.expect(TokenKind::KeywordCount, "COUNT")?;
    parser.expect(TokenKind::LParen, "'('")?;
    let tag = if parser.eat(TokenKind::Star) {
        "*".to_string()
    } else {
        parser.expect(TokenKind::Identifier, "a tag name or '*'")?.text
    };
    parser.expect(TokenKind::RParen, "')'")?;
    Ok(SelectItem::Aggregate {
        aggregate: Aggregate::Count { tag },
        span: Span::new(start, parser.end()),
    })
}

fn parse_tfidf(parser: &mut Parser, start: usize) -> Result<SelectItem, ParseError> {
    parser.advance();
    parser.expect(TokenKind::LParen, "'('")?;

    let mut tags = Vec::new();
    let mut all_tags = false;
    let mut saw_tag_or_star = false;
    if parser.eat(TokenKind::Star) {
        all_tags = true;
        saw_tag_or_star = true;
    } else if !parser.at(TokenKind::RParen) && !is_tfidf_option_start(parser) {
        tags.push(parser.expect(TokenKind::Identifier, "a tag name")?.text);
        saw_tag_or_star = true;
        // Only consume the comma here when it separates two tags; a comma
        // before an option (`NAME=value`) belongs to the option loop below.
        while parser.at(TokenKind::Comma) && !is_tfidf_option_start_after_comma(parser) {
            parser.advance();
            tags.push(parser.expect(TokenKind::Identifier, "a tag name")?.text);
        }
    }

    let mut top_terms = None;
    let mut min_df = None;
    let mut max_df = None;
    let mut stopwords = None;

    while parser.eat(TokenKind::Comma) {
        if all_tags {
            return Err(ParseError::shape("TFIDF(*) cannot combine with tag arguments", parser.pos_span()));
        }
        let name_token = parser.expect(TokenKind::Identifier, "an option name")?;
        parser.expect(TokenKind::Equal, "'='")?;
        let upper = name_token.text.to_ascii_uppercase();
        match upper.as_str() {
            "TOP_TERMS" => {
                let n = parse_positive_number(parser)?;
                top_terms = Some(n);
            }
            "MIN_DF" => min_df = Some(parse_positive_number(parser)?),
            "MAX_DF" => max_df = Some(parse_positive_number(parser)?),
            "STOPWORDS" => {
                let word_token = parser.expect(TokenKind::Identifier, "ENGLISH, DEFAULT, NONE, or OFF")?;
                stopwords = Some(match word_token.text.to_ascii_uppercase().as_str() {
                    "ENGLISH" | "DEFAULT" => TfidfStopwords::English,
                    "NONE" | "OFF" => TfidfStopwords::None,
                    _ => {
                        return Err(ParseError::shape(
                            "STOPWORDS must be ENGLISH, DEFAULT, NONE, or OFF",
                            Span::point(word_token.pos),
                        ))
                    }
                });
            }
            other => {
                return Err(ParseError::shape(
                    format!("Unknown TFIDF option '{other}'"),
                    Span::point(name_token.pos),
                ))
            }
        }
    }

    if !saw_tag_or_star {
        return Err(ParseError::shape(
            "TFIDF() requires at least one tag or *",
            parser.pos_span(),
        ));
    }

    parser.expect(TokenKind::RParen, "')'")?;
    Ok(SelectItem::Aggregate {
        aggregate: Aggregate::Tfidf {
            tags,
            all_tags,
            top_terms,
            min_df,
            max_df,
            stopwords,
        },
        span: Span::new(start, parser.end()),
    })
}

fn is_tfidf_option_start(parser: &Parser) -> bool {
    parser.current().kind == TokenKind::Identifier && parser.peek(1).kind == TokenKind::Equal
}

/// Like [`is_tfidf_option_start`], but checked while still sitting on the
/// comma that would precede the option (one token further ahead).
fn is_tfidf_option_start_after_comma(parser: &Parser) -> bool {
    parser.peek(1).kind == TokenKind::Identifier && parser.peek(2).kind == TokenKind::Equal
}

fn parse_positive_number(parser: &mut Parser) -> Result<u64, ParseError> {
    let token = parser.expect(TokenKind::Number, "a positive integer")?;
    let value = token
        .text
        .parse::<u64>()
        .map_err(|_| ParseError::shape("Expected a positive integer", Span::point(token.pos)))?;
    if value == 0 {
        return Err(ParseError::shape("TOP_TERMS must be greater than zero", Span::point(token.pos)));
    }
    Ok(value)
}

fn parse_flatten(parser: &mut Parser, start: usize) -> Result<SelectItem, ParseError> {
    let text_only = parser.at_word("FLATTEN_TEXT");
    parser.advance();
    parser.expect(TokenKind::LParen, "'('")?;
    let tag = parser.expect(TokenKind::Identifier, "a tag name")?.text;
    let depth = if parser.eat(TokenKind::Comma) {
        parser.expect(TokenKind::Number, "a depth")?.text.parse::<usize>().unwrap_or(2)
    } else {
        2
    };
    parser.expect(TokenKind::RParen, "')'")?;

    let aliases = if parser.eat(TokenKind::KeywordAs) {
        parser.expect(TokenKind::LParen, "'('")?;
        if parser.at(TokenKind::RParen) {
            return Err(ParseError::shape("Expected column alias", parser.pos_span()));
        }
        let mut names = vec![parser.expect(TokenKind::Identifier, "an alias")?.text];
        while parser.eat(TokenKind::Comma) {
            names.push(parser.expect(TokenKind::Identifier, "an alias")?.text);
        }
        parser.expect(TokenKind::RParen, "')'")?;
        names
    } else {
        vec!["flatten_text".to_string()]
    };

    Ok(SelectItem::Flatten {
        tag,
        depth,
        aliases,
        text_only,
        span: Span::new(start, parser.end()),
    })
}

fn parse_project(parser: &mut Parser, start: usize) -> Result<SelectItem, ParseError> {
    parser.expect(TokenKind::KeywordProject, "PROJECT")?;
    parser.expect(TokenKind::LParen, "'('")?;
    let tag = parser.expect(TokenKind::Identifier, "a tag name")?.text;
    parser.expect(TokenKind::RParen, "')'")?;
    parser.expect(TokenKind::KeywordAs, "AS")?;
    parser.expect(TokenKind::LParen, "'('")?;

    let mut fields = vec![parse_project_field(parser)?];
    while parser.eat(TokenKind::Comma) {
        fields.push(parse_project_field(parser)?);
    }
    if fields.is_empty() {
        return Err(ParseError::shape(
            "PROJECT requires at least one alias",
            parser.pos_span(),
        ));
    }
    parser.expect(TokenKind::RParen, "')'")?;

    Ok(SelectItem::Project {
        tag,
        fields,
        span: Span::new(start, parser.end()),
    })
}

fn parse_project_field(parser: &mut Parser) -> Result<ProjectField, ParseError> {
    let alias_token = parser.expect(TokenKind::Identifier, "a valid alias identifier")?;
    parser.expect(TokenKind::Colon, "':'")?;
    let expr = parse_project_expr(parser)?;
    Ok(ProjectField {
        alias: alias_token.text,
        expr,
    })
}

/// The constrained sub-grammar accepted inside `PROJECT(...) AS (alias: expr,
/// …)`: literals, alias references, `TEXT`/`ATTR`/`COALESCE`/other scalar
/// functions, and comparison chains desugared to `__CMP_*` calls.
fn parse_project_expr(parser: &mut Parser) -> Result<ProjectExpr, ParseError> {
    let lhs = parse_project_atom(parser)?;
    if let Some((name, op_len)) = project_cmp_operator(parser) {
        let start = lhs.span().begin;
        for _ in 0..op_len {
            parser.advance();
        }
        let rhs = parse_project_atom(parser)?;
        return Ok(ProjectExpr::FunctionCall {
            name: name.to_string(),
            args: vec![lhs, rhs],
            span: Span::new(start, parser.end()),
        });
    }
    Ok(lhs)
}

fn project_cmp_operator(parser: &Parser) -> Option<(&'static str, usize)> {
    Some(match parser.current().kind {
        TokenKind::Equal => ("__CMP_EQ", 1),
        TokenKind::NotEqual => ("__CMP_NE", 1),
        TokenKind::Less => ("__CMP_LT", 1),
        TokenKind::LessEqual => ("__CMP_LE", 1),
        TokenKind::Greater => ("__CMP_GT", 1),
        TokenKind::GreaterEqual => ("__CMP_GE", 1),
        TokenKind::KeywordLike => ("__CMP_LIKE", 1),
        _ => return None,
    })
}

fn parse_project_atom(parser: &mut Parser) -> Result<ProjectExpr, ParseError> {
    let start = parser.current().pos;

    if parser.at(TokenKind::String) {
        let token = parser.advance();
        return Ok(ProjectExpr::StringLit {
            value: token.text,
            span: Span::new(start, parser.end()),
        });
    }
    if parser.at(TokenKind::Number) {
        let token = parser.advance();
        let value = token
            .text
            .parse::<i64>()
            .map_err(|_| ParseError::syntax("Invalid integer literal", Span::point(token.pos)))?;
        return Ok(ProjectExpr::NumberLit {
            value,
            span: Span::new(start, parser.end()),
        });
    }
    if parser.eat(TokenKind::KeywordNull) {
        return Ok(ProjectExpr::NullLit {
            span: Span::new(start, parser.end()),
        });
    }

    if parser.at_word("TEXT") && parser.peek(1).kind == TokenKind::LParen {
        parser.advance();
        parser.advance();
        let tag = parser.expect(TokenKind::Identifier, "a tag name")?.text.to_ascii_lowercase();
        let where_expr = parse_optional_project_where(parser)?;
        parser.expect(TokenKind::RParen, "')'")?;
        return Ok(ProjectExpr::Text {
            tag,
            where_expr,
            span: Span::new(start, parser.end()),
        });
    }
    if parser.at_word("ATTR") && parser.peek(1).kind == TokenKind::LParen {
        parser.advance();
        parser.advance();
        let tag = parser.expect(TokenKind::Identifier, "a tag name")?.text.to_ascii_lowercase();
        parser.expect(TokenKind::Comma, "','")?;
        let attribute = parser.expect(TokenKind::Identifier, "an attribute name")?.text.to_ascii_lowercase();
        parser.expect(TokenKind::RParen, "')'")?;
        return Ok(ProjectExpr::Attr {
            tag,
            attribute,
            where_expr: None,
            span: Span::new(start, parser.end()),
        });
    }
    if parser.at_word("COALESCE") && parser.peek(1).kind == TokenKind::LParen {
        parser.advance();
        parser.advance();
        let mut args = vec![parse_project_expr(parser)?];
        while parser.eat(TokenKind::Comma) {
            args.push(parse_project_expr(parser)?);
        }
        parser.expect(TokenKind::RParen, "')'")?;
        return Ok(ProjectExpr::Coalesce {
            args,
            span: Span::new(start, parser.end()),
        });
    }

    if parser.current().kind == TokenKind::Identifier && parser.peek(1).kind == TokenKind::LParen {
        let name = parser.advance().text;
        parser.advance();
        let mut args = Vec::new();
        if !parser.at(TokenKind::RParen) {
            args.push(parse_project_expr(parser)?);
            while parser.eat(TokenKind::Comma) {
                args.push(parse_project_expr(parser)?);
            }
        }
        parser.expect(TokenKind::RParen, "')'")?;
        return Ok(ProjectExpr::FunctionCall {
            name,
            args,
            span: Span::new(start, parser.end()),
        });
    }

    let token = parser.expect(TokenKind::Identifier, "an alias reference or expression")?;
    Ok(ProjectExpr::AliasRef {
        name: token.text,
        span: Span::new(start, parser.end()),
    })
}

fn parse_optional_project_where(parser: &mut Parser) -> Result<Option<Box<crate::ast::Expr>>, ParseError> {
    if parser.eat(TokenKind::KeywordWhere) {
        Ok(Some(Box::new(expr::parse_expr(parser)?)))
    } else {
        Ok(None)
    }
}

fn parse_trim(parser: &mut Parser, start: usize) -> Result<SelectItem, ParseError> {
    parser.advance();
    parser.expect(TokenKind::LParen, "'('")?;
    let mut inner = parse_select_item(parser)?;
    if inner.len() != 1 {
        return Err(ParseError::shape(
            "TRIM cannot wrap a multi-field shorthand item",
            parser.pos_span(),
        ));
    }
    parser.expect(TokenKind::RParen, "')'")?;
    Ok(SelectItem::Trim {
        inner: Box::new(inner.remove(0)),
        span: Span::new(start, parser.end()),
    })
}

fn parse_text_function(parser: &mut Parser, start: usize, direct: bool) -> Result<SelectItem, ParseError> {
    parser.advance();
    parser.expect(TokenKind::LParen, "'('")?;
    let tag = parser.expect(TokenKind::Identifier, "a tag name")?.text;
    parser.expect(TokenKind::RParen, "')'")?;
    Ok(SelectItem::TextFunction {
        tag,
        direct,
        span: Span::new(start, parser.end()),
    })
}

fn parse_inner_html_item(parser: &mut Parser, start: usize) -> Result<SelectItem, ParseError> {
    let raw = parser.at_word("RAW_INNER_HTML");
    parser.advance();
    parser.expect(TokenKind::LParen, "'('")?;
    let tag = parser.expect(TokenKind::Identifier, "a tag name")?.text;
    // Unlike the scalar-function form used in expressions, the select-list
    // form only accepts a literal depth, never MAX_DEPTH.
    let depth = if parser.eat(TokenKind::Comma) {
        let token = parser.expect(TokenKind::Number, "a numeric depth")?;
        Some(
            token
                .text
                .parse::<u64>()
                .map_err(|_| ParseError::syntax("Invalid depth literal", Span::point(token.pos)))?,
        )
    } else {
        None
    };
    parser.expect(TokenKind::RParen, "')'")?;
    Ok(SelectItem::InnerHtmlFunction {
        tag,
        depth,
        raw,
        span: Span::new(start, parser.end()),
    })
}

fn parse_multi_field_shorthand(parser: &mut Parser, start: usize) -> Result<Vec<SelectItem>, ParseError> {
    let tag_token = parser.advance();
    parser.advance();
    let mut fields = vec![parser.expect(TokenKind::Identifier, "a field name")?.text];
    while parser.eat(TokenKind::Comma) {
        fields.push(parser.expect(TokenKind::Identifier, "a field name")?.text);
    }
    parser.expect(TokenKind::RParen, "')'")?;
    let end = parser.end();
    Ok(fields
        .into_iter()
        .map(|field| SelectItem::Field {
            tag: tag_token.text.clone(),
            field,
            span: Span::new(start, end),
        })
        .collect())
}

impl Parser {
    pub(crate) fn end(&self) -> usize {
        self.tokens_end()
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Aggregate, SelectItem, TfidfStopwords};
    use crate::parse;

    #[test]
    fn flatten_defaults_to_depth_two_and_flatten_text_alias() {
        let query = parse("SELECT FLATTEN(li) FROM doc").unwrap();
        let SelectItem::Flatten { tag, depth, aliases, text_only, .. } = &query.select_items[0] else {
            panic!("expected flatten")
        };
        assert_eq!(tag, "li");
        assert_eq!(*depth, 2);
        assert_eq!(aliases, &vec!["flatten_text".to_string()]);
        assert!(!text_only);
    }

    #[test]
    fn flatten_text_variant_sets_text_only_flag() {
        let query = parse("SELECT FLATTEN_TEXT(li, 3) AS (body) FROM doc").unwrap();
        let SelectItem::Flatten { depth, aliases, text_only, .. } = &query.select_items[0] else {
            panic!("expected flatten")
        };
        assert_eq!(*depth, 3);
        assert_eq!(aliases, &vec!["body".to_string()]);
        assert!(text_only);
    }

    #[test]
    fn flatten_as_with_empty_alias_list_is_illegal() {
        assert!(parse("SELECT FLATTEN(li) AS () FROM doc").is_err());
    }

    #[test]
    fn project_requires_at_least_one_alias() {
        assert!(parse("SELECT PROJECT(li) AS () FROM doc").is_err());
    }

    #[test]
    fn project_field_comparison_chain_desugars_to_cmp_function_call() {
        let query = parse("SELECT PROJECT(li) AS (ok: ATTR(a, href) = 'x') FROM doc").unwrap();
        let SelectItem::Project { fields, .. } = &query.select_items[0] else { panic!("expected project") };
        match &fields[0].expr {
            crate::ast::ProjectExpr::FunctionCall { name, args, .. } => {
                assert_eq!(name, "__CMP_EQ");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected project expr {other:?}"),
        }
    }

    #[test]
    fn count_star_and_count_tag() {
        let star = parse("SELECT COUNT(*) FROM doc").unwrap();
        assert!(matches!(
            &star.select_items[0],
            SelectItem::Aggregate { aggregate: Aggregate::Count { tag }, .. } if tag == "*"
        ));
        let tag = parse("SELECT COUNT(div) FROM doc").unwrap();
        assert!(matches!(
            &tag.select_items[0],
            SelectItem::Aggregate { aggregate: Aggregate::Count { tag }, .. } if tag == "div"
        ));
    }

    #[test]
    fn tfidf_positional_tags_then_options() {
        let query = parse("SELECT TFIDF(p, li, TOP_TERMS=5, STOPWORDS=ENGLISH) FROM doc").unwrap();
        let SelectItem::Aggregate { aggregate: Aggregate::Tfidf { tags, top_terms, stopwords, all_tags, .. }, .. } =
            &query.select_items[0]
        else {
            panic!("expected tfidf")
        };
        assert_eq!(tags, &vec!["p".to_string(), "li".to_string()]);
        assert_eq!(*top_terms, Some(5));
        assert_eq!(*stopwords, Some(TfidfStopwords::English));
        assert!(!all_tags);
    }

    #[test]
    fn tfidf_star_cannot_combine_with_tag_arguments() {
        assert!(parse("SELECT TFIDF(*, li) FROM doc").is_err());
    }

    #[test]
    fn tfidf_requires_at_least_one_tag_or_star() {
        assert!(parse("SELECT TFIDF() FROM doc").is_err());
    }

    #[test]
    fn tfidf_single_tag_followed_by_option_does_not_swallow_the_separating_comma() {
        let query = parse("SELECT TFIDF(li, TOP_TERMS=5) FROM doc").unwrap();
        let SelectItem::Aggregate { aggregate: Aggregate::Tfidf { tags, top_terms, .. }, .. } = &query.select_items[0]
        else {
            panic!("expected tfidf")
        };
        assert_eq!(tags, &vec!["li".to_string()]);
        assert_eq!(*top_terms, Some(5));
    }

    #[test]
    fn multi_field_shorthand_expands_to_one_field_item_per_name() {
        let query = parse("SELECT a(href, text) FROM doc").unwrap();
        assert_eq!(query.select_items.len(), 2);
        assert!(matches!(&query.select_items[0], SelectItem::Field { tag, field, .. } if tag == "a" && field == "href"));
        assert!(matches!(&query.select_items[1], SelectItem::Field { tag, field, .. } if tag == "a" && field == "text"));
    }

    #[test]
    fn trim_wraps_a_single_select_item() {
        let query = parse("SELECT TRIM(a.href) FROM doc").unwrap();
        assert!(matches!(&query.select_items[0], SelectItem::Trim { .. }));
    }

    #[test]
    fn empty_select_list_is_an_error() {
        assert!(parse("SELECT FROM doc").is_err());
    }

    #[test]
    fn exclude_single_field_without_parens() {
        let query = parse("SELECT * EXCLUDE inner_html FROM doc").unwrap();
        assert_eq!(query.select_star_excludes, vec!["inner_html".to_string()]);
    }
}
