//! Boolean/comparison expression grammar, scalar functions, and operands.
//!
//! Mirrors, in precedence and tie-break order, the grammar documented in
//! SPEC_FULL.md §4.2: `expr := and_expr (OR and_expr)*`,
//! `and_expr := cmp_expr (AND cmp_expr)*`, with `cmp_expr` covering grouping,
//! `EXISTS`, the legacy `HAS_DIRECT_TEXT` shorthand, and the general
//! `scalar cmp_tail?` form.

use crate::ast::*;
use crate::error::ParseError;
use crate::span::Span;
use crate::token::TokenKind;

use super::Parser;

pub(crate) fn parse_expr(parser: &mut Parser) -> Result<Expr, ParseError> {
    let start = parser.current().pos;
    let mut left = parse_and_expr(parser)?;
    while parser.eat(TokenKind::KeywordOr) {
        let right = parse_and_expr(parser)?;
        let end = parser.tokens_end();
        left = Expr::Binary {
            op: BinaryOp::Or,
            left: Box::new(left),
            right: Box::new(right),
            span: Span::new(start, end),
        };
    }
    Ok(left)
}

fn parse_and_expr(parser: &mut Parser) -> Result<Expr, ParseError> {
    let start = parser.current().pos;
    let mut left = parse_cmp_expr(parser)?;
    while parser.eat(TokenKind::KeywordAnd) {
        let right = parse_cmp_expr(parser)?;
        let end = parser.tokens_end();
        left = Expr::Binary {
            op: BinaryOp::And,
            left: Box::new(left),
            right: Box::new(right),
            span: Span::new(start, end),
        };
    }
    Ok(left)
}

fn parse_cmp_expr(parser: &mut Parser) -> Result<Expr, ParseError> {
    let start = parser.current().pos;

    if parser.eat(TokenKind::LParen) {
        let inner = parse_expr(parser)?;
        parser.expect(TokenKind::RParen, "')'")?;
        return Ok(inner);
    }

    if parser.eat(TokenKind::KeywordExists) {
        parser.expect(TokenKind::LParen, "'('")?;
        let axis = parse_axis_name(parser)?;
        let where_expr = if parser.eat(TokenKind::KeywordWhere) {
            Some(Box::new(parse_expr(parser)?))
        } else {
            None
        };
        parser.expect(TokenKind::RParen, "')'")?;
        let end = parser.tokens_end();
        return Ok(Expr::Exists {
            axis,
            where_expr,
            span: Span::new(start, end),
        });
    }

    // Legacy shorthand: `tag HAS_DIRECT_TEXT 'needle'` desugars to
    // `self.tag = 'tag' AND DIRECT_TEXT(tag) LIKE '%needle%'`, distinguished
    // from the general `scalar cmp_tail?` form by one token of lookahead.
    // Disabled by `ParserConfig::allow_legacy_has_direct_text`, in which case
    // the same tokens fall through to the plain `HasDirectText` cmp_tail.
    if parser.config.allow_legacy_has_direct_text
        && parser.at(TokenKind::Identifier)
        && parser.peek(1).kind == TokenKind::KeywordHasDirectText
    {
        return parse_legacy_has_direct_text(parser, start);
    }

    let scalar = parse_scalar(parser)?;
    parse_cmp_tail(parser, scalar, start)
}

fn parse_legacy_has_direct_text(parser: &mut Parser, start: usize) -> Result<Expr, ParseError> {
    let tag_token = parser.advance();
    let tag = tag_token.text.to_ascii_lowercase();
    parser.expect(TokenKind::KeywordHasDirectText, "HAS_DIRECT_TEXT")?;
    let needle_token = parser.expect(TokenKind::String, "a string literal")?;

    let tag_span = Span::new(tag_token.pos, tag_token.end_pos());
    let mut tag_operand = Operand::new(Axis::SelfAxis, FieldKind::Tag, tag_span);
    tag_operand.span = tag_span;

    let tag_eq = CompareExpr {
        lhs_expr: ScalarExpr::Operand(tag_operand.clone()),
        lhs: Some(tag_operand),
        op: CompareOp::Eq,
        rhs_expr: Some(ScalarExpr::StringLit {
            value: tag.clone(),
            span: tag_span,
        }),
        rhs_expr_list: Vec::new(),
        rhs_values: vec![tag.clone()],
        span: tag_span,
    };

    let direct_text_call = ScalarExpr::FunctionCall {
        name: "DIRECT_TEXT".to_string(),
        args: vec![ScalarExpr::StringLit {
            value: tag,
            span: tag_span,
        }],
        span: tag_span,
    };
    let needle_span = Span::new(needle_token.pos, needle_token.end_pos());
    let pattern = format!("%{}%", needle_token.text);
    let like = CompareExpr {
        lhs_expr: direct_text_call,
        lhs: None,
        op: CompareOp::Like,
        rhs_expr: Some(ScalarExpr::StringLit {
            value: pattern.clone(),
            span: needle_span,
        }),
        rhs_expr_list: Vec::new(),
        rhs_values: vec![pattern],
        span: needle_span,
    };

    let end = parser.tokens_end();
    Ok(Expr::Binary {
        op: BinaryOp::And,
        left: Box::new(Expr::Compare(Box::new(tag_eq))),
        right: Box::new(Expr::Compare(Box::new(like))),
        span: Span::new(start, end),
    })
}

fn parse_cmp_tail(parser: &mut Parser, lhs: ScalarExpr, start: usize) -> Result<Expr, ParseError> {
    let lhs_operand = match &lhs {
        ScalarExpr::Operand(operand) => Some(operand.clone()),
        _ => None,
    };

    if parser.eat(TokenKind::KeywordContains) {
        let (op, values) = if parser.eat(TokenKind::KeywordAll) {
            (CompareOp::ContainsAll, parse_value_list(parser)?)
        } else if parser.eat(TokenKind::KeywordAny) {
            (CompareOp::ContainsAny, parse_value_list(parser)?)
        } else {
            let values = parse_value_list(parser)?;
            if values.len() != 1 {
                return Err(ParseError::shape(
                    "CONTAINS without ALL/ANY requires exactly one value",
                    parser.pos_span(),
                ));
            }
            (CompareOp::Contains, values)
        };
        return Ok(finish_list_compare(parser, lhs, lhs_operand, op, values, start));
    }

    if parser.eat(TokenKind::KeywordHasDirectText) {
        let needle = parser.expect(TokenKind::String, "a string literal")?;
        let needle_span = Span::new(needle.pos, needle.end_pos());
        let rhs = ScalarExpr::StringLit {
            value: needle.text.clone(),
            span: needle_span,
        };
        let end = parser.tokens_end();
        let cmp = CompareExpr {
            lhs_expr: lhs,
            lhs: lhs_operand,
            op: CompareOp::HasDirectText,
            rhs_expr: Some(rhs),
            rhs_expr_list: Vec::new(),
            rhs_values: vec![needle.text],
            span: Span::new(start, end),
        };
        return Ok(Expr::Compare(Box::new(cmp)));
    }

    if parser.eat(TokenKind::KeywordIn) {
        let values = if parser.eat(TokenKind::LParen) {
            let mut list = vec![parse_scalar(parser)?];
            while parser.eat(TokenKind::Comma) {
                list.push(parse_scalar(parser)?);
            }
            parser.expect(TokenKind::RParen, "')'")?;
            list
        } else {
            vec![parse_scalar(parser)?]
        };
        if values.is_empty() {
            return Err(ParseError::shape("IN requires a non-empty value list", parser.pos_span()));
        }
        return Ok(finish_expr_list_compare(parser, lhs, lhs_operand, CompareOp::In, values, start));
    }

    if parser.eat(TokenKind::KeywordIs) {
        let negate = parser.eat(TokenKind::KeywordNot);
        parser.expect(TokenKind::KeywordNull, "NULL")?;
        let op = if negate { CompareOp::IsNotNull } else { CompareOp::IsNull };
        let end = parser.tokens_end();
        let cmp = CompareExpr {
            lhs_expr: lhs,
            lhs: lhs_operand,
            op,
            rhs_expr: None,
            rhs_expr_list: Vec::new(),
            rhs_values: Vec::new(),
            span: Span::new(start, end),
        };
        return Ok(Expr::Compare(Box::new(cmp)));
    }

    if let Some(op) = comparison_operator(parser) {
        parser.advance();
        let rhs = parse_scalar(parser)?;
        let end = parser.tokens_end();
        let rhs_values = rhs.literal_string().into_iter().collect();
        let cmp = CompareExpr {
            lhs_expr: lhs,
            lhs: lhs_operand,
            op,
            rhs_expr: Some(rhs),
            rhs_expr_list: Vec::new(),
            rhs_values,
            span: Span::new(start, end),
        };
        return Ok(Expr::Compare(Box::new(cmp)));
    }

    Err(parser.unexpected("a comparison operator, CONTAINS, IN, IS, or HAS_DIRECT_TEXT"))
}

fn comparison_operator(parser: &Parser) -> Option<CompareOp> {
    Some(match parser.current().kind {
        TokenKind::Equal => CompareOp::Eq,
        TokenKind::NotEqual => CompareOp::NotEq,
        TokenKind::Less => CompareOp::Lt,
        TokenKind::LessEqual => CompareOp::Lte,
        TokenKind::Greater => CompareOp::Gt,
        TokenKind::GreaterEqual => CompareOp::Gte,
        TokenKind::Tilde => CompareOp::Regex,
        TokenKind::KeywordLike => CompareOp::Like,
        _ => return None,
    })
}

fn finish_list_compare(
    parser: &Parser,
    lhs: ScalarExpr,
    lhs_operand: Option<Operand>,
    op: CompareOp,
    values: Vec<String>,
    start: usize,
) -> Expr {
    let end = parser.tokens_end();
    let rhs_expr_list = values
        .iter()
        .map(|v| ScalarExpr::StringLit {
            value: v.clone(),
            span: Span::point(end),
        })
        .collect();
    Expr::Compare(Box::new(CompareExpr {
        lhs_expr: lhs,
        lhs: lhs_operand,
        op,
        rhs_expr: None,
        rhs_expr_list,
        rhs_values: values,
        span: Span::new(start, end),
    }))
}

fn finish_expr_list_compare(
    parser: &Parser,
    lhs: ScalarExpr,
    lhs_operand: Option<Operand>,
    op: CompareOp,
    values: Vec<ScalarExpr>,
    start: usize,
) -> Expr {
    let end = parser.tokens_end();
    // The legacy `rhs_values` mirror is populated only when every element is
    // a literal — a mixed list cannot be faithfully stringified.
    let rhs_values = values
        .iter()
        .map(ScalarExpr::literal_string)
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();
    Expr::Compare(Box::new(CompareExpr {
        lhs_expr: lhs,
        lhs: lhs_operand,
        op,
        rhs_expr: None,
        rhs_expr_list: values,
        rhs_values,
        span: Span::new(start, end),
    }))
}

/// Parses the value list after `CONTAINS`/`CONTAINS ALL`/`CONTAINS ANY`.
/// Accepts either a parenthesized comma list (`('a', 'b')`) or, for the
/// single-value case, a bare string literal with no parens at all — both
/// forms appear in real statements (e.g. `attributes.class CONTAINS 'card'`).
pub(crate) fn parse_value_list(parser: &mut Parser) -> Result<Vec<String>, ParseError> {
    if !parser.eat(TokenKind::LParen) {
        return Ok(vec![parser.expect(TokenKind::String, "a string literal")?.text]);
    }
    let mut values = vec![parser.expect(TokenKind::String, "a string literal")?.text];
    while parser.eat(TokenKind::Comma) {
        values.push(parser.expect(TokenKind::String, "a string literal")?.text);
    }
    parser.expect(TokenKind::RParen, "')'")?;
    Ok(values)
}

fn parse_axis_name(parser: &mut Parser) -> Result<Axis, ParseError> {
    let axis = axis_from_word(parser).ok_or_else(|| parser.unexpected("an axis name"))?;
    parser.advance();
    Ok(axis)
}

fn axis_from_word(parser: &Parser) -> Option<Axis> {
    if parser.at(TokenKind::KeywordSelf) || parser.at_word("self") {
        Some(Axis::SelfAxis)
    } else if parser.at_word("parent") {
        Some(Axis::Parent)
    } else if parser.at_word("child") {
        Some(Axis::Child)
    } else if parser.at_word("ancestor") {
        Some(Axis::Ancestor)
    } else if parser.at_word("descendant") {
        Some(Axis::Descendant)
    } else {
        None
    }
}

const FIELD_WORDS: &[(&str, FieldKind)] = &[
    ("tag", FieldKind::Tag),
    ("text", FieldKind::Text),
    ("node_id", FieldKind::NodeId),
    ("parent_id", FieldKind::ParentId),
    ("sibling_pos", FieldKind::SiblingPos),
    ("max_depth", FieldKind::MaxDepth),
    ("doc_order", FieldKind::DocOrder),
];

pub(crate) fn parse_scalar(parser: &mut Parser) -> Result<ScalarExpr, ParseError> {
    let start = parser.current().pos;

    if parser.at(TokenKind::String) {
        let token = parser.advance();
        return Ok(ScalarExpr::StringLit {
            value: token.text,
            span: Span::new(start, parser.tokens_end()),
        });
    }
    if parser.at(TokenKind::Number) {
        let token = parser.advance();
        let value = token
            .text
            .parse::<i64>()
            .map_err(|_| ParseError::syntax("Invalid integer literal", Span::point(token.pos)))?;
        return Ok(ScalarExpr::NumberLit {
            value,
            span: Span::new(start, parser.tokens_end()),
        });
    }
    if parser.eat(TokenKind::KeywordNull) {
        return Ok(ScalarExpr::NullLit {
            span: Span::new(start, parser.tokens_end()),
        });
    }
    if parser.at(TokenKind::KeywordSelf) && parser.peek(1).kind != TokenKind::Dot {
        parser.advance();
        return Ok(ScalarExpr::SelfRef {
            span: Span::new(start, parser.tokens_end()),
        });
    }

    let is_call = parser.peek(1).kind == TokenKind::LParen && function_name(parser).is_some();
    if is_call {
        return parse_scalar_function(parser);
    }

    parse_operand(parser).map(ScalarExpr::Operand)
}

fn function_name(parser: &Parser) -> Option<&'static str> {
    const NAMES: &[&str] = &[
        "TEXT",
        "DIRECT_TEXT",
        "INNER_HTML",
        "RAW_INNER_HTML",
        "ATTR",
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
        "TRIM",
        "LTRIM",
        "RTRIM",
        "COALESCE",
        "FIRST_TEXT",
        "LAST_TEXT",
        "FIRST_ATTR",
        "LAST_ATTR",
    ];
    let current = parser.current();
    if current.kind != TokenKind::Identifier {
        return None;
    }
    let upper = current.text.to_ascii_uppercase();
    NAMES.iter().find(|n| **n == upper).copied()
}

fn parse_scalar_function(parser: &mut Parser) -> Result<ScalarExpr, ParseError> {
    let start = parser.current().pos;
    let name = function_name(parser).expect("checked by caller").to_string();
    parser.advance();
    parser.expect(TokenKind::LParen, "'('")?;

    let args = match name.as_str() {
        "POSITION" | "LOCATE" => {
            let needle = parse_scalar(parser)?;
            parser.expect(TokenKind::KeywordIn, "IN")?;
            let haystack = parse_scalar(parser)?;
            vec![needle, haystack]
        }
        "TEXT" | "DIRECT_TEXT" => vec![parse_self_or_tag_arg(parser, true)?],
        "INNER_HTML" | "RAW_INNER_HTML" => {
            let tag = parse_self_or_tag_arg(parser, true)?;
            let mut args = vec![tag];
            if parser.eat(TokenKind::Comma) {
                args.push(parse_depth_or_max_depth_arg(parser)?);
            }
            args
        }
        "ATTR" => {
            let tag = parse_self_or_tag_arg(parser, true)?;
            parser.expect(TokenKind::Comma, "','")?;
            let attr_token = parser.expect(TokenKind::Identifier, "an attribute name")?;
            let attr_span = Span::new(attr_token.pos, attr_token.end_pos());
            vec![
                tag,
                ScalarExpr::StringLit {
                    value: attr_token.text.to_ascii_lowercase(),
                    span: attr_span,
                },
            ]
        }
        _ => parse_generic_arg_list(parser)?,
    };

    parser.expect(TokenKind::RParen, "')'")?;
    Ok(ScalarExpr::FunctionCall {
        name,
        args,
        span: Span::new(start, parser.tokens_end()),
    })
}

/// Parses the leading `tag|self` argument shared by `TEXT`, `DIRECT_TEXT`,
/// `INNER_HTML`, `RAW_INNER_HTML`, and `ATTR`. A bare tag identifier is
/// lower-cased into a string literal; `self` stays a `SelfRef`.
fn parse_self_or_tag_arg(parser: &mut Parser, lower_case: bool) -> Result<ScalarExpr, ParseError> {
    let start = parser.current().pos;
    if parser.eat(TokenKind::KeywordSelf) {
        return Ok(ScalarExpr::SelfRef {
            span: Span::new(start, parser.tokens_end()),
        });
    }
    let token = parser.expect(TokenKind::Identifier, "a tag name or self")?;
    let value = if lower_case {
        token.text.to_ascii_lowercase()
    } else {
        token.text
    };
    Ok(ScalarExpr::StringLit {
        value,
        span: Span::new(start, parser.tokens_end()),
    })
}

fn parse_depth_or_max_depth_arg(parser: &mut Parser) -> Result<ScalarExpr, ParseError> {
    let start = parser.current().pos;
    if parser.at_word("MAX_DEPTH") {
        parser.advance();
        let operand = Operand::new(Axis::SelfAxis, FieldKind::MaxDepth, Span::new(start, parser.tokens_end()));
        return Ok(ScalarExpr::Operand(operand));
    }
    let token = parser.expect(TokenKind::Number, "a depth or MAX_DEPTH")?;
    let value = token
        .text
        .parse::<i64>()
        .map_err(|_| ParseError::syntax("Invalid depth literal", Span::point(token.pos)))?;
    Ok(ScalarExpr::NumberLit {
        value,
        span: Span::new(start, parser.tokens_end()),
    })
}

fn parse_generic_arg_list(parser: &mut Parser) -> Result<Vec<ScalarExpr>, ParseError> {
    if parser.at(TokenKind::RParen) {
        return Ok(Vec::new());
    }
    let mut args = vec![parse_scalar(parser)?];
    while parser.eat(TokenKind::Comma) {
        args.push(parse_scalar(parser)?);
    }
    Ok(args)
}

/// Parses the five-axis, nine-field-kind operand sub-grammar. See
/// SPEC_FULL.md §4.2 for the full tie-break table; the branch order below
/// matches it exactly, including the confirmed quirk that a qualified
/// `qualifier.tag` / `qualifier.text` path (no intervening axis word) falls
/// through to an `Attribute` lookup named "tag"/"text" rather than resolving
/// to the Tag/Text field kinds — preserved deliberately, not a bug.
pub(crate) fn parse_operand(parser: &mut Parser) -> Result<Operand, ParseError> {
    let start = parser.current().pos;

    if parser.at(TokenKind::KeywordSelf) && parser.peek(1).kind == TokenKind::Dot {
        parser.advance();
        parser.advance();
        return parse_axis_tail(parser, Axis::SelfAxis, None, start);
    }
    if let Some(axis) = axis_from_word(parser) {
        if axis != Axis::SelfAxis && parser.peek(1).kind == TokenKind::Dot {
            parser.advance();
            parser.advance();
            return parse_axis_tail(parser, axis, None, start);
        }
    }
    // A bare (unqualified) `attributes.name` / `attributes` is the self
    // axis's attribute accessor, not a qualifier — this is what lets
    // `attributes.class CONTAINS '...'` resolve to `self.attribute:class`
    // rather than treating "attributes" as a tag alias.
    if parser.at_word("attributes") {
        return parse_attributes_tail(parser, Axis::SelfAxis, None, start);
    }

    // Bare identifier with no `.`: a field-kind word resolves to that field
    // on the self axis, anything else is `self.attributes.<ident>`.
    if !matches!(parser.peek(1).kind, TokenKind::Dot) {
        let token = parser.expect(TokenKind::Identifier, "an operand")?;
        if let Some((_, field_kind)) = FIELD_WORDS.iter().find(|(w, _)| token.text.eq_ignore_ascii_case(w)) {
            let span = Span::new(start, parser.tokens_end());
            return Ok(Operand::new(Axis::SelfAxis, *field_kind, span));
        }
        let span = Span::new(start, parser.tokens_end());
        let mut operand = Operand::new(Axis::SelfAxis, FieldKind::Attribute, span);
        operand.attribute = Some(token.text);
        return Ok(operand);
    }

    // `X.Y`: if X is an axis keyword it was already handled above, so here X
    // is a qualifier (source/tag alias) and the remainder follows the
    // self-axis sub-grammar, possibly with a further nested `axis.field`.
    let qualifier_token = parser.expect(TokenKind::Identifier, "a qualifier or field name")?;
    parser.expect(TokenKind::Dot, "'.'")?;

    if let Some(axis) = axis_from_word(parser) {
        if axis != Axis::SelfAxis && parser.peek(1).kind == TokenKind::Dot {
            parser.advance();
            parser.advance();
            return parse_axis_tail(parser, axis, Some(qualifier_token.text), start);
        }
    }

    parse_qualified_self_tail(parser, qualifier_token.text, start)
}

fn parse_axis_tail(
    parser: &mut Parser,
    axis: Axis,
    qualifier: Option<String>,
    start: usize,
) -> Result<Operand, ParseError> {
    if parser.at_word("attributes") {
        return parse_attributes_tail(parser, axis, qualifier, start);
    }
    let token = parser.expect(TokenKind::Identifier, "a field name")?;
    if let Some((_, field_kind)) = FIELD_WORDS.iter().find(|(w, _)| token.text.eq_ignore_ascii_case(w)) {
        let span = Span::new(start, parser.tokens_end());
        let mut operand = Operand::new(axis, *field_kind, span);
        operand.qualifier = qualifier;
        return Ok(operand);
    }
    let span = Span::new(start, parser.tokens_end());
    let mut operand = Operand::new(axis, FieldKind::Attribute, span);
    operand.qualifier = qualifier;
    operand.attribute = Some(token.text);
    Ok(operand)
}

/// The qualifier-dot-path tail (`qualifier.field` with no axis word): field
/// names `tag`/`text` are intentionally absent from this branch's lookup, so
/// they fall through to the attribute arm below. See module docs.
fn parse_qualified_self_tail(parser: &mut Parser, qualifier: String, start: usize) -> Result<Operand, ParseError> {
    if parser.at_word("attributes") {
        return parse_attributes_tail(parser, Axis::SelfAxis, Some(qualifier), start);
    }
    const QUALIFIED_FIELD_WORDS: &[(&str, FieldKind)] = &[
        ("node_id", FieldKind::NodeId),
        ("parent_id", FieldKind::ParentId),
        ("sibling_pos", FieldKind::SiblingPos),
        ("max_depth", FieldKind::MaxDepth),
        ("doc_order", FieldKind::DocOrder),
    ];
    let token = parser.expect(TokenKind::Identifier, "a field name")?;
    if let Some((_, field_kind)) = QUALIFIED_FIELD_WORDS.iter().find(|(w, _)| token.text.eq_ignore_ascii_case(w)) {
        let span = Span::new(start, parser.tokens_end());
        let mut operand = Operand::new(Axis::SelfAxis, *field_kind, span);
        operand.qualifier = Some(qualifier);
        return Ok(operand);
    }
    let span = Span::new(start, parser.tokens_end());
    let mut operand = Operand::new(Axis::SelfAxis, FieldKind::Attribute, span);
    operand.qualifier = Some(qualifier);
    operand.attribute = Some(token.text);
    Ok(operand)
}

fn parse_attributes_tail(
    parser: &mut Parser,
    axis: Axis,
    qualifier: Option<String>,
    start: usize,
) -> Result<Operand, ParseError> {
    parser.advance();
    if parser.eat(TokenKind::Dot) {
        let name_token = parser.expect(TokenKind::Identifier, "an attribute name")?;
        let span = Span::new(start, parser.tokens_end());
        let mut operand = Operand::new(axis, FieldKind::Attribute, span);
        operand.qualifier = qualifier;
        operand.attribute = Some(name_token.text);
        return Ok(operand);
    }
    let span = Span::new(start, parser.tokens_end());
    let mut operand = Operand::new(axis, FieldKind::AttributesMap, span);
    operand.qualifier = qualifier;
    Ok(operand)
}

impl Parser {
    /// Byte offset just past the last consumed token; the canonical "end" for
    /// a span closing at the current parse position.
    pub(crate) fn tokens_end(&self) -> usize {
        if self.pos == 0 {
            return 0;
        }
        self.tokens[self.pos - 1].end_pos()
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Axis, CompareOp, Expr, FieldKind, ScalarExpr};
    use crate::config::ParserConfig;
    use crate::{parse, parse_with_config};

    fn where_expr(source: &str) -> Expr {
        parse(source).unwrap().where_expr.unwrap()
    }

    fn compare(source: &str) -> crate::ast::CompareExpr {
        let Expr::Compare(cmp) = where_expr(source) else { panic!("expected compare") };
        *cmp
    }

    #[test]
    fn bare_field_word_resolves_to_field_kind() {
        let cmp = compare("SELECT * FROM doc WHERE sibling_pos = 0");
        let lhs = cmp.lhs.unwrap();
        assert_eq!(lhs.axis, Axis::SelfAxis);
        assert_eq!(lhs.field_kind, FieldKind::SiblingPos);
        assert!(lhs.attribute.is_none());
    }

    #[test]
    fn bare_non_field_identifier_becomes_self_attribute_unlowered() {
        let cmp = compare("SELECT * FROM doc WHERE DataFoo = 'x'");
        let lhs = cmp.lhs.unwrap();
        assert_eq!(lhs.field_kind, FieldKind::Attribute);
        assert_eq!(lhs.attribute.as_deref(), Some("DataFoo"));
    }

    #[test]
    fn axis_qualified_operand_parses_descendant_attribute() {
        let cmp = compare("SELECT * FROM doc WHERE descendant.attributes.class = 'x'");
        let lhs = cmp.lhs.unwrap();
        assert_eq!(lhs.axis, Axis::Descendant);
        assert_eq!(lhs.field_kind, FieldKind::Attribute);
        assert_eq!(lhs.attribute.as_deref(), Some("class"));
    }

    #[test]
    fn qualifier_dot_tag_falls_through_to_attribute_named_tag() {
        // Per SPEC_FULL.md §4.2: `qualifier.tag` (no axis word) is NOT the
        // Tag field kind — `tag`/`text` are absent from the qualified-field
        // lookup table by design, so this resolves to an attribute lookup.
        let cmp = compare("SELECT * FROM doc WHERE mytable.tag = 'div'");
        let lhs = cmp.lhs.unwrap();
        assert_eq!(lhs.qualifier.as_deref(), Some("mytable"));
        assert_eq!(lhs.field_kind, FieldKind::Attribute);
        assert_eq!(lhs.attribute.as_deref(), Some("tag"));
    }

    #[test]
    fn qualified_node_id_resolves_to_field_kind() {
        let cmp = compare("SELECT * FROM doc WHERE mytable.node_id = 1");
        let lhs = cmp.lhs.unwrap();
        assert_eq!(lhs.qualifier.as_deref(), Some("mytable"));
        assert_eq!(lhs.field_kind, FieldKind::NodeId);
    }

    #[test]
    fn attributes_with_no_trailing_name_resolves_to_attributes_map() {
        let cmp = compare("SELECT * FROM doc WHERE attributes = 'x'");
        let lhs = cmp.lhs.unwrap();
        assert_eq!(lhs.field_kind, FieldKind::AttributesMap);
        assert!(lhs.attribute.is_none());
    }

    #[test]
    fn attr_function_lowercases_attribute_name_but_not_attributes_dot_path() {
        let cmp = compare("SELECT * FROM doc WHERE ATTR(div, HREF) = 'x'");
        let ScalarExpr::FunctionCall { args, .. } = cmp.lhs_expr else { panic!() };
        let ScalarExpr::StringLit { value, .. } = &args[1] else { panic!("expected string literal arg") };
        assert_eq!(value, "href");

        let cmp2 = compare("SELECT * FROM doc WHERE attributes.HREF = 'x'");
        assert_eq!(cmp2.lhs.unwrap().attribute.as_deref(), Some("HREF"));
    }

    #[test]
    fn text_and_attr_function_tag_args_are_lowercased() {
        let cmp = compare("SELECT * FROM doc WHERE TEXT(DIV) = 'x'");
        let ScalarExpr::FunctionCall { args, .. } = cmp.lhs_expr else { panic!() };
        let ScalarExpr::StringLit { value, .. } = &args[0] else { panic!() };
        assert_eq!(value, "div");
    }

    #[test]
    fn position_uses_in_keyword_as_separator() {
        let cmp = compare("SELECT * FROM doc WHERE POSITION('a' IN self.text) = 1");
        let ScalarExpr::FunctionCall { name, args, .. } = cmp.lhs_expr else { panic!() };
        assert_eq!(name, "POSITION");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn inner_html_accepts_max_depth_sentinel_as_operand() {
        let cmp = compare("SELECT * FROM doc WHERE INNER_HTML(div, MAX_DEPTH) = 'x'");
        let ScalarExpr::FunctionCall { args, .. } = cmp.lhs_expr else { panic!() };
        match &args[1] {
            ScalarExpr::Operand(op) => assert_eq!(op.field_kind, FieldKind::MaxDepth),
            other => panic!("expected MAX_DEPTH operand, got {other:?}"),
        }
    }

    #[test]
    fn contains_single_value_is_legal() {
        let cmp = compare("SELECT * FROM doc WHERE attributes.class CONTAINS 'x'");
        assert_eq!(cmp.op, CompareOp::Contains);
        assert_eq!(cmp.rhs_values, vec!["x".to_string()]);
    }

    #[test]
    fn contains_two_values_without_all_any_is_a_parse_error() {
        assert!(parse("SELECT * FROM doc WHERE attributes.class CONTAINS ('x', 'y')").is_err());
    }

    #[test]
    fn contains_all_with_two_values_is_legal() {
        let cmp = compare("SELECT * FROM doc WHERE attributes.class CONTAINS ALL ('x', 'y')");
        assert_eq!(cmp.op, CompareOp::ContainsAll);
        assert_eq!(cmp.rhs_values, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn contains_any_with_two_values_is_legal() {
        let cmp = compare("SELECT * FROM doc WHERE attributes.class CONTAINS ANY ('x', 'y')");
        assert_eq!(cmp.op, CompareOp::ContainsAny);
    }

    #[test]
    fn is_null_and_is_not_null_produce_distinct_ops() {
        let null_cmp = compare("SELECT * FROM doc WHERE attributes.href IS NULL");
        assert_eq!(null_cmp.op, CompareOp::IsNull);
        let not_null_cmp = compare("SELECT * FROM doc WHERE attributes.href IS NOT NULL");
        assert_eq!(not_null_cmp.op, CompareOp::IsNotNull);
    }

    #[test]
    fn is_followed_by_unexpected_token_is_an_error() {
        assert!(parse("SELECT * FROM doc WHERE attributes.href IS 'x'").is_err());
    }

    #[test]
    fn in_list_requires_at_least_one_value() {
        assert!(parse("SELECT * FROM doc WHERE tag IN ()").is_err());
    }

    #[test]
    fn in_with_parenthesized_list_parses() {
        let cmp = compare("SELECT * FROM doc WHERE tag IN ('div', 'span')");
        assert_eq!(cmp.op, CompareOp::In);
        assert_eq!(cmp.rhs_values, vec!["div".to_string(), "span".to_string()]);
    }

    #[test]
    fn in_with_bare_scalar_parses_as_single_element_list() {
        let cmp = compare("SELECT * FROM doc WHERE tag IN 'div'");
        assert_eq!(cmp.rhs_values, vec!["div".to_string()]);
    }

    #[test]
    fn regex_and_like_operators() {
        let regex_cmp = compare("SELECT * FROM doc WHERE attributes.href ~ '^/'");
        assert_eq!(regex_cmp.op, CompareOp::Regex);
        let like_cmp = compare("SELECT * FROM doc WHERE attributes.href LIKE '%x%'");
        assert_eq!(like_cmp.op, CompareOp::Like);
    }

    #[test]
    fn exists_with_no_where_clause() {
        let Expr::Exists { axis, where_expr, .. } = where_expr("SELECT * FROM doc WHERE EXISTS(child)") else {
            panic!("expected exists")
        };
        assert_eq!(axis, Axis::Child);
        assert!(where_expr.is_none());
    }

    #[test]
    fn legacy_has_direct_text_shorthand_desugars_to_and_of_two_comparisons() {
        let expr = where_expr("SELECT * FROM doc WHERE div HAS_DIRECT_TEXT 'hello'");
        let Expr::Binary { op, left, right, .. } = expr else { panic!("expected binary and") };
        assert_eq!(op, crate::ast::BinaryOp::And);
        assert!(matches!(*left, Expr::Compare(ref c) if c.op == CompareOp::Eq));
        assert!(matches!(*right, Expr::Compare(ref c) if c.op == CompareOp::Like));
    }

    #[test]
    fn legacy_has_direct_text_can_be_disabled_via_config() {
        let config = ParserConfig {
            allow_legacy_has_direct_text: false,
            ..ParserConfig::default()
        };
        let query =
            parse_with_config("SELECT * FROM doc WHERE div HAS_DIRECT_TEXT 'hello'", config).unwrap();
        let Expr::Compare(cmp) = query.where_expr.unwrap() else { panic!("expected a single compare, not desugared AND") };
        assert_eq!(cmp.op, CompareOp::HasDirectText);
    }

    #[test]
    fn binary_and_or_precedence() {
        let expr = where_expr("SELECT * FROM doc WHERE tag = 'a' OR tag = 'b' AND tag = 'c'");
        let Expr::Binary { op, right, .. } = expr else { panic!("expected top-level OR") };
        assert_eq!(op, crate::ast::BinaryOp::Or);
        assert!(matches!(*right, Expr::Binary { op: crate::ast::BinaryOp::And, .. }));
    }

    #[test]
    fn grouping_parens_override_precedence() {
        let expr = where_expr("SELECT * FROM doc WHERE (tag = 'a' OR tag = 'b') AND tag = 'c'");
        let Expr::Binary { op, left, .. } = expr else { panic!("expected top-level AND") };
        assert_eq!(op, crate::ast::BinaryOp::And);
        assert!(matches!(*left, Expr::Binary { op: crate::ast::BinaryOp::Or, .. }));
    }
}
