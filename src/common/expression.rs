//! Condition expressions with caller-chosen placeholders.
//!
//! A condition is written with `#name` tokens standing for attribute names and
//! `:value` tokens standing for values supplied out of band:
//!
//! ```text
//! #name = :name AND #age > :min_age
//! ```
//!
//! Before a request is issued every token is renamed into a generated
//! namespace (`#KEY0`, `:VALUE0`, ...), the attribute-name map is derived from
//! the token text and the value map is narrowed to the values the expression
//! actually references.

use crate::common;

use aws_sdk_dynamodb::types;
use indexmap::{IndexMap, map};
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Prefix of attribute-name tokens.
const NAME_PREFIX: char = '#';

/// Prefix of attribute-value tokens.
const VALUE_PREFIX: char = ':';

/// Errors produced while rewriting an expression.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    /// A `#` or `:` prefix is not followed by a token body.
    #[error("empty placeholder token at byte {position}")]
    EmptyToken {
        /// Byte offset of the prefix character.
        position: usize,
    },
    /// A value token has no entry in the value map.
    #[error("unresolved expression attribute value: {placeholder}")]
    UnresolvedValue {
        /// The token text, including its `:` prefix.
        placeholder: String,
    },
    /// An update patch neither sets nor removes any attribute.
    #[error("update patch has no attributes to set or remove")]
    EmptyPatch,
}

/// Rule deciding where a placeholder token ends.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Tokenizer {
    /// A token body is the longest run of ASCII alphanumerics, `_` and `-`.
    ///
    /// Tokens may abut operators: `#age>=:min` splits into `#age`, `>=` and `:min`.
    /// Since `-` belongs to the body, `#order-date` is a single name; a
    /// subtraction must keep a space before the `-`.
    #[default]
    Identifier,
    /// A token runs until the next whitespace character or the end of input.
    ///
    /// Callers must separate tokens from operators with spaces: `#age>=:min`
    /// is read as a single name token.
    Whitespace,
}

impl Tokenizer {
    fn continues(self, ch: char) -> bool {
        match self {
            Self::Identifier => ch.is_ascii_alphanumeric() || ch == '_' || ch == '-',
            Self::Whitespace => !ch.is_whitespace(),
        }
    }
}

/// What to do with a value token missing from the value map.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum MissingValue {
    /// Fail with [`ExpressionError::UnresolvedValue`].
    #[default]
    Error,
    /// Bind the placeholder to the DynamoDB `NULL` value.
    Null,
}

/// Rewrite settings.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RewriteOptions {
    /// Token boundary rule.
    pub tokenizer: Tokenizer,
    /// Missing value policy.
    pub missing_value: MissingValue,
}

/// Kind of a placeholder token.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    /// `#`-prefixed attribute name.
    Name,
    /// `:`-prefixed attribute value.
    Value,
}

/// A placeholder token found in an expression.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Token<'a> {
    /// Whether the token names an attribute or a value.
    pub kind: TokenKind,
    /// Byte offset of the prefix character.
    pub position: usize,
    /// Token text including its prefix.
    pub text: &'a str,
}

impl Token<'_> {
    fn end(&self) -> usize {
        self.position + self.text.len()
    }
}

/// Find every placeholder token of `expression`, left to right.
///
/// Text outside tokens is not inspected. Repeated tokens are reported once per
/// occurrence.
///
/// ```rust
/// use dynamodb_typed::common::expression;
///
/// let tokens = expression::tokenize("#age >= :min", expression::Tokenizer::default()).unwrap();
/// let texts: Vec<_> = tokens.iter().map(|token| token.text).collect();
/// assert_eq!(texts, ["#age", ":min"]);
/// ```
pub fn tokenize(expression: &str, tokenizer: Tokenizer) -> Result<Vec<Token<'_>>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();
    while let Some((position, ch)) = chars.next() {
        let kind = match ch {
            NAME_PREFIX => TokenKind::Name,
            VALUE_PREFIX => TokenKind::Value,
            _ => continue,
        };
        let body_start = position + ch.len_utf8();
        let mut end = body_start;
        while let Some(&(index, next)) = chars.peek() {
            if !tokenizer.continues(next) {
                break;
            }
            end = index + next.len_utf8();
            chars.next();
        }
        if end == body_start {
            return Err(ExpressionError::EmptyToken { position });
        }
        tokens.push(Token {
            kind,
            position,
            text: &expression[position..end],
        });
    }
    Ok(tokens)
}

/// Generated placeholder namespace of one expression slot.
///
/// Slots sharing a request use disjoint namespaces so that their generated
/// placeholders never collide.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Namespace {
    name: &'static str,
    value: &'static str,
}

impl Namespace {
    pub(crate) const CONDITION: Self = Self {
        name: "COND_KEY",
        value: "COND_VALUE",
    };
    pub(crate) const FILTER: Self = Self {
        name: "FILTER_KEY",
        value: "FILTER_VALUE",
    };
    pub(crate) const KEY_CONDITION: Self = Self {
        name: "KEY",
        value: "VALUE",
    };
    pub(crate) const UPDATE: Self = Self::KEY_CONDITION;

    pub(crate) fn name_placeholder(self, index: usize) -> String {
        format!("{NAME_PREFIX}{}{index}", self.name)
    }

    pub(crate) fn value_placeholder(self, index: usize) -> String {
        format!("{VALUE_PREFIX}{}{index}", self.value)
    }
}

/// A condition expression with its value map.
///
/// ```rust
/// use dynamodb_typed::common::expression;
/// use std::collections::HashMap;
///
/// let condition = expression::ConditionExpression {
///     expression: "#status = :active".to_string(),
///     values: HashMap::from([(":active".to_string(), "ACTIVE".to_string())]),
///     ..Default::default()
/// };
/// let rewrite = condition.rewrite().unwrap();
/// assert_eq!(rewrite.expression, "#KEY0 = :VALUE0");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConditionExpression<T> {
    /// Expression text using `#name` and `:value` tokens.
    pub expression: String,
    /// Rewrite settings.
    pub options: RewriteOptions,
    /// Values keyed by token text, `:` prefix included.
    pub values: collections::HashMap<String, T>,
}

/// Result of rewriting a [`ConditionExpression`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rewrite<T> {
    /// The expression with every token replaced by its generated placeholder.
    pub expression: String,
    /// Generated name placeholder to attribute name.
    pub expression_attribute_names: collections::HashMap<String, String>,
    /// Generated value placeholder to value.
    ///
    /// `None` marks a placeholder left unresolved under [`MissingValue::Null`].
    pub expression_attribute_values: collections::HashMap<String, Option<T>>,
}

fn assign<'a>(
    assigned: &mut IndexMap<&'a str, String>,
    text: &'a str,
    generate: impl FnOnce(usize) -> String,
) -> (String, bool) {
    let index = assigned.len();
    match assigned.entry(text) {
        map::Entry::Occupied(entry) => (entry.get().clone(), false),
        map::Entry::Vacant(entry) => (entry.insert(generate(index)).clone(), true),
    }
}

impl<T> ConditionExpression<T> {
    /// Rewrite into the `#KEY{i}` / `:VALUE{i}` namespace.
    ///
    /// Each distinct token gets the next index of its kind in order of first
    /// appearance; repeated tokens share their placeholder. Values the
    /// expression never references are dropped.
    pub fn rewrite(self) -> Result<Rewrite<T>, ExpressionError> {
        self.rewrite_in(Namespace::KEY_CONDITION)
    }

    pub(crate) fn rewrite_in(self, namespace: Namespace) -> Result<Rewrite<T>, ExpressionError> {
        let Self {
            expression,
            options,
            mut values,
        } = self;
        let tokens = tokenize(&expression, options.tokenizer)?;
        let mut names = IndexMap::new();
        let mut placeholders = IndexMap::new();
        let mut rewrite = Rewrite {
            expression: String::with_capacity(expression.len()),
            expression_attribute_names: collections::HashMap::new(),
            expression_attribute_values: collections::HashMap::new(),
        };
        let mut cursor = 0;
        for token in tokens {
            rewrite
                .expression
                .push_str(&expression[cursor..token.position]);
            cursor = token.end();
            let placeholder = match token.kind {
                TokenKind::Name => {
                    let (placeholder, is_new) =
                        assign(&mut names, token.text, |index| namespace.name_placeholder(index));
                    if is_new {
                        let name = token.text.strip_prefix(NAME_PREFIX).unwrap_or(token.text);
                        rewrite
                            .expression_attribute_names
                            .insert(placeholder.clone(), name.to_string());
                    }
                    placeholder
                }
                TokenKind::Value => {
                    let (placeholder, is_new) = assign(&mut placeholders, token.text, |index| {
                        namespace.value_placeholder(index)
                    });
                    if is_new {
                        let value = match (values.remove(token.text), options.missing_value) {
                            (Some(value), _) => Some(value),
                            (None, MissingValue::Null) => {
                                #[cfg(feature = "tracing")]
                                tracing::warn!(
                                    placeholder = token.text,
                                    "unresolved expression attribute value bound to NULL"
                                );
                                None
                            }
                            (None, MissingValue::Error) => {
                                return Err(ExpressionError::UnresolvedValue {
                                    placeholder: token.text.to_string(),
                                });
                            }
                        };
                        rewrite
                            .expression_attribute_values
                            .insert(placeholder.clone(), value);
                    }
                    placeholder
                }
            };
            rewrite.expression.push_str(&placeholder);
        }
        rewrite.expression.push_str(&expression[cursor..]);
        Ok(rewrite)
    }
}

impl<T: Serialize> ConditionExpression<T> {
    pub(crate) fn into_expression_input(
        self,
        namespace: Namespace,
    ) -> crate::error::Result<common::ExpressionInput> {
        let rewrite = self.rewrite_in(namespace)?;
        let operation: common::ExpressionInput = rewrite.try_into()?;
        Ok(operation)
    }
}

impl<T: Serialize> TryFrom<Rewrite<T>> for common::ExpressionInput {
    type Error = serde_dynamo::Error;

    fn try_from(rewrite: Rewrite<T>) -> serde_dynamo::Result<Self> {
        let mut expression_attribute_values =
            collections::HashMap::with_capacity(rewrite.expression_attribute_values.len());
        for (placeholder, value) in rewrite.expression_attribute_values {
            let value = match value {
                Some(value) => to_attribute_value(value)?,
                None => types::AttributeValue::Null(true),
            };
            expression_attribute_values.insert(placeholder, value);
        }
        let operation = Self {
            expression: rewrite.expression,
            expression_attribute_names: rewrite.expression_attribute_names,
            expression_attribute_values,
        };
        Ok(operation)
    }
}
