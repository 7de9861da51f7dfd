//! Query option translation
//!
//! Compiles the OData query options of a request (`$filter`, `$select`,
//! `$orderby`, `$top`, `$skip`) against a resolved entity type into a
//! [`QuerySpec`] ready to execute against storage. Pure translation, no I/O.
//!
//! The `$filter` grammar is the OData v2 comparison subset:
//!
//! ```text
//! expr     := and_expr ( 'or' and_expr )*
//! and_expr := cmp      ( 'and' cmp )*
//! cmp      := '(' expr ')' | field op literal
//! op       := eq | ne | gt | ge | lt | le
//! literal  := 'text' | datetime'ISO-8601'
//! ```
//!
//! String functions (`substringof`, `startswith`, ...) are not supported and
//! fail translation.

use std::collections::HashMap;

use super::errors::{GatewayError, GatewayResult};
use super::filter::{CompareOp, FilterExpr, FilterValue};
use super::time::parse_instant;
use crate::schema::{EntityType, FieldType};

/// Compiled representation of the query options of one request
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Filter predicate, if `$filter` was given
    pub filter: Option<FilterExpr>,

    /// Projection set in declaration order, if `$select` was given
    pub select: Option<Vec<String>>,

    /// Sort keys in priority order
    pub order: Vec<OrderKey>,

    /// Result count bound from `$top`
    pub top: Option<usize>,

    /// Result offset from `$skip`, applied before `top`
    pub skip: Option<usize>,
}

/// One `$orderby` sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    /// Declared field to sort on
    pub field: String,

    /// Ascending unless `desc` was given
    pub ascending: bool,

    /// Declared type of the field; instants sort as points in time
    pub field_type: FieldType,
}

/// Translate raw query options into a [`QuerySpec`]
pub fn translate(
    options: &HashMap<String, String>,
    entity: &EntityType,
) -> GatewayResult<QuerySpec> {
    let mut spec = QuerySpec::default();

    for (key, value) in options {
        match key.as_str() {
            "$filter" => spec.filter = Some(parse_filter(value, entity)?),
            "$select" => spec.select = Some(parse_select(value, entity)?),
            "$orderby" => spec.order = parse_orderby(value, entity)?,
            "$top" => spec.top = Some(parse_count(key, value)?),
            "$skip" => spec.skip = Some(parse_count(key, value)?),
            other if other.starts_with('$') => {
                return Err(GatewayError::Query(format!(
                    "unsupported query option '{other}'"
                )));
            }
            // Non-OData query keys are ignored.
            _ => {}
        }
    }

    Ok(spec)
}

/// Parse `$select`: comma-separated declared field names
fn parse_select(value: &str, entity: &EntityType) -> GatewayResult<Vec<String>> {
    let mut fields = Vec::new();
    for part in value.split(',') {
        let name = part.trim();
        if name.is_empty() {
            return Err(GatewayError::Query("$select contains an empty field".into()));
        }
        if entity.field(name).is_none() {
            return Err(unknown_field(name, entity));
        }
        fields.push(name.to_string());
    }
    if fields.is_empty() {
        return Err(GatewayError::Query("$select must name at least one field".into()));
    }
    Ok(fields)
}

/// Parse `$orderby`: comma-separated `field [asc|desc]`
fn parse_orderby(value: &str, entity: &EntityType) -> GatewayResult<Vec<OrderKey>> {
    let mut keys = Vec::new();
    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let mut words = part.split_whitespace();
        let name = words.next().unwrap_or_default();
        let ascending = match words.next() {
            None | Some("asc") => true,
            Some("desc") => false,
            Some(other) => {
                return Err(GatewayError::Query(format!(
                    "invalid $orderby direction '{other}'"
                )));
            }
        };
        if words.next().is_some() {
            return Err(GatewayError::Query(format!(
                "invalid $orderby clause '{part}'"
            )));
        }

        let field = entity.field(name).ok_or_else(|| unknown_field(name, entity))?;
        keys.push(OrderKey {
            field: field.name.clone(),
            ascending,
            field_type: field.field_type,
        });
    }

    if keys.is_empty() {
        return Err(GatewayError::Query("$orderby must name at least one field".into()));
    }
    Ok(keys)
}

/// Parse `$top` / `$skip`: non-negative integer
fn parse_count(option: &str, value: &str) -> GatewayResult<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        GatewayError::Query(format!("{option} must be a non-negative integer, got '{value}'"))
    })
}

fn unknown_field(name: &str, entity: &EntityType) -> GatewayError {
    GatewayError::Query(format!(
        "unknown field '{}' for entity type '{}'",
        name, entity.name
    ))
}

// ---------------------------------------------------------------------------
// $filter parsing
// ---------------------------------------------------------------------------

/// Parse a `$filter` expression against an entity type
pub fn parse_filter(input: &str, entity: &EntityType) -> GatewayResult<FilterExpr> {
    let tokens = tokenize(input)?;
    let mut parser = FilterParser {
        tokens,
        position: 0,
        entity,
    };
    let expr = parser.parse_or()?;
    if let Some(extra) = parser.peek() {
        return Err(GatewayError::Query(format!(
            "unexpected trailing token '{}' in $filter",
            extra.describe()
        )));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Field name, operator, or connective keyword
    Word(String),
    /// Quoted string literal
    Text(String),
    /// `datetime'...'` literal, already parsed
    Instant(chrono::DateTime<chrono::Utc>),
    OpenParen,
    CloseParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Text(t) => format!("'{t}'"),
            Token::Instant(_) => "datetime literal".to_string(),
            Token::OpenParen => "(".to_string(),
            Token::CloseParen => ")".to_string(),
        }
    }
}

/// Split a `$filter` string into tokens
///
/// String literals use single quotes with `''` escaping a quote, per OData
/// v2. A `datetime` keyword immediately followed by a quote starts an
/// instant literal.
fn tokenize(input: &str) -> GatewayResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::OpenParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::CloseParen);
            }
            '\'' => {
                chars.next();
                tokens.push(Token::Text(read_quoted(&mut chars)?));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }

                if word == "datetime" && chars.peek() == Some(&'\'') {
                    chars.next();
                    let text = read_quoted(&mut chars)?;
                    let instant = parse_instant(&text).ok_or_else(|| {
                        GatewayError::Query(format!("invalid datetime literal '{text}'"))
                    })?;
                    tokens.push(Token::Instant(instant));
                } else {
                    tokens.push(Token::Word(word));
                }
            }
            other => {
                return Err(GatewayError::Query(format!(
                    "unexpected character '{other}' in $filter"
                )));
            }
        }
    }

    Ok(tokens)
}

/// Read a quoted literal body after the opening quote has been consumed
fn read_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> GatewayResult<String> {
    let mut text = String::new();
    loop {
        match chars.next() {
            Some('\'') => {
                // '' escapes a single quote
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    text.push('\'');
                } else {
                    return Ok(text);
                }
            }
            Some(c) => text.push(c),
            None => {
                return Err(GatewayError::Query("unterminated string literal in $filter".into()));
            }
        }
    }
}

struct FilterParser<'a> {
    tokens: Vec<Token>,
    position: usize,
    entity: &'a EntityType,
}

impl FilterParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn parse_or(&mut self) -> GatewayResult<FilterExpr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Word("or".to_string())) {
            self.next();
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> GatewayResult<FilterExpr> {
        let mut left = self.parse_comparison()?;
        while self.peek() == Some(&Token::Word("and".to_string())) {
            self.next();
            let right = self.parse_comparison()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> GatewayResult<FilterExpr> {
        if self.peek() == Some(&Token::OpenParen) {
            self.next();
            let expr = self.parse_or()?;
            match self.next() {
                Some(Token::CloseParen) => return Ok(expr),
                _ => return Err(GatewayError::Query("missing ')' in $filter".into())),
            }
        }

        let field_name = match self.next() {
            Some(Token::Word(word)) => word,
            Some(other) => {
                return Err(GatewayError::Query(format!(
                    "expected field name in $filter, got '{}'",
                    other.describe()
                )));
            }
            None => return Err(GatewayError::Query("empty $filter expression".into())),
        };

        let field = self
            .entity
            .field(&field_name)
            .ok_or_else(|| unknown_field(&field_name, self.entity))?;

        let op = match self.next() {
            Some(Token::Word(word)) => CompareOp::from_keyword(&word).ok_or_else(|| {
                GatewayError::Query(format!("unsupported operator '{word}' in $filter"))
            })?,
            Some(other) => {
                return Err(GatewayError::Query(format!(
                    "expected comparison operator in $filter, got '{}'",
                    other.describe()
                )));
            }
            None => {
                return Err(GatewayError::Query(format!(
                    "missing comparison operator after field '{field_name}'"
                )));
            }
        };

        let value = match (self.next(), field.field_type) {
            (Some(Token::Text(text)), FieldType::String) => FilterValue::String(text),
            (Some(Token::Instant(instant)), FieldType::DateTime) => FilterValue::DateTime(instant),
            // A plain string literal against a date-time field must itself
            // parse as an instant.
            (Some(Token::Text(text)), FieldType::DateTime) => {
                let instant = parse_instant(&text).ok_or_else(|| {
                    GatewayError::Query(format!(
                        "field '{field_name}' is a datetime, cannot compare to '{text}'"
                    ))
                })?;
                FilterValue::DateTime(instant)
            }
            (Some(Token::Instant(_)), FieldType::String) => {
                return Err(GatewayError::Query(format!(
                    "field '{field_name}' is a string, cannot compare to a datetime literal"
                )));
            }
            (Some(other), _) => {
                return Err(GatewayError::Query(format!(
                    "expected literal in $filter, got '{}'",
                    other.describe()
                )));
            }
            (None, _) => {
                return Err(GatewayError::Query(format!(
                    "missing literal after '{field_name} {}'",
                    op.as_str()
                )));
            }
        };

        Ok(FilterExpr::compare(field.name.clone(), op, value))
    }
}
