use crate::common;

use indexmap::IndexMap;
use std::collections;

/// Separator between the segments of a document path.
const PATH_SEPARATOR: &str = ".";

/// Prefix of generated projection placeholders.
const PLACEHOLDER_PREFIX: &str = "#ATTR";

/// Attributes to return from a read.
///
/// ```rust
/// use dynamodb_typed::common::projection;
///
/// let projection = projection::Projection::Attributes(vec![
///     "id".to_string(),
///     "address.city".to_string(),
///     "tags[0]".to_string(),
/// ]);
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Projection {
    /// Attribute paths. Every path segment is replaced by a generated placeholder.
    ///
    /// Empty segments (`"a..b"`) and empty paths are skipped. When nothing is
    /// left, the request carries no projection and every attribute is returned.
    Attributes(Vec<String>),
    /// A projection expression sent verbatim.
    ///
    /// `#name` references must be resolved through the request's
    /// `expression_attribute_names`.
    Expression(String),
}

fn get_segment_placeholder(
    placeholders: &mut IndexMap<String, String>,
    segment: &str,
) -> String {
    let (name, index) = segment.split_at(segment.find('[').unwrap_or(segment.len()));
    let next = placeholders.len();
    let placeholder = placeholders
        .entry(name.to_string())
        .or_insert_with(|| format!("{PLACEHOLDER_PREFIX}{next}"));
    format!("{placeholder}{index}")
}

impl From<Projection> for common::ExpressionInput {
    fn from(projection: Projection) -> Self {
        match projection {
            Projection::Attributes(paths) => {
                let mut placeholders = IndexMap::new();
                let mut expressions = Vec::with_capacity(paths.len());
                for path in &paths {
                    let segments: Vec<_> = path
                        .split(PATH_SEPARATOR)
                        .filter(|segment| !segment.is_empty())
                        .map(|segment| get_segment_placeholder(&mut placeholders, segment))
                        .collect();
                    if !segments.is_empty() {
                        expressions.push(segments.join(PATH_SEPARATOR));
                    }
                }
                let expression_attribute_names: collections::HashMap<_, _> = placeholders
                    .into_iter()
                    .map(|(name, placeholder)| (placeholder, name))
                    .collect();
                Self {
                    expression: expressions.join(", "),
                    expression_attribute_names,
                    ..Default::default()
                }
            }
            Projection::Expression(expression) => Self {
                expression,
                ..Default::default()
            },
        }
    }
}
