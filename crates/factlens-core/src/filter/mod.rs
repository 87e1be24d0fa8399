//! Backend-agnostic filter expressions and their Qdrant compilation.
//!
//! Callers build [`FilterExpression`] values from recognized fields; the
//! compiler turns a conjunction of them into a Qdrant [`Filter`]. Nothing
//! downstream interprets filters ad hoc: unsupported combinations fail
//! here, before any query is issued.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::FilterError;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use qdrant_client::qdrant::{Condition, Filter, Range};

/// Payload key for the article source.
pub const FIELD_SOURCE: &str = "source";
/// Payload key for the article category.
pub const FIELD_CATEGORY: &str = "category";
/// Payload key for the article language.
pub const FIELD_LANGUAGE: &str = "language";
/// Payload key for the source credibility score.
pub const FIELD_CREDIBILITY: &str = "credibility_score";
/// Payload key for the publication timestamp (unix seconds).
pub const FIELD_PUBLISHED_AT: &str = "published_at";

/// A filterable metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Source,
    Category,
    Language,
    CredibilityScore,
    PublishedAt,
}

impl FilterField {
    /// The payload key this field is stored under.
    pub fn key(&self) -> &'static str {
        match self {
            FilterField::Source => FIELD_SOURCE,
            FilterField::Category => FIELD_CATEGORY,
            FilterField::Language => FIELD_LANGUAGE,
            FilterField::CredibilityScore => FIELD_CREDIBILITY,
            FilterField::PublishedAt => FIELD_PUBLISHED_AT,
        }
    }
}

/// Inclusive numeric bounds for a range condition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeBounds {
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}

/// One declarative filter condition.
///
/// Closed variant set validated at compile time; never a free-form map.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// Exact keyword match.
    Equals(FilterField, String),
    /// Set membership.
    In(FilterField, BTreeSet<String>),
    /// Numeric range.
    Range(FilterField, RangeBounds),
    /// Nested conjunction; flattened during compilation.
    And(Vec<FilterExpression>),
}

impl FilterExpression {
    /// Articles from any of `sources`.
    pub fn source_in<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterExpression::In(
            FilterField::Source,
            sources.into_iter().map(Into::into).collect(),
        )
    }

    /// Articles in any of `categories`.
    pub fn category_in<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterExpression::In(
            FilterField::Category,
            categories.into_iter().map(Into::into).collect(),
        )
    }

    /// Articles whose source credibility is at least `floor`.
    pub fn min_credibility(floor: f64) -> Self {
        FilterExpression::Range(
            FilterField::CredibilityScore,
            RangeBounds {
                gte: Some(floor),
                lte: None,
            },
        )
    }

    /// Articles published inside the (optionally half-open) window.
    pub fn published_between(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        FilterExpression::Range(
            FilterField::PublishedAt,
            RangeBounds {
                gte: from.map(|t| t.timestamp() as f64),
                lte: to.map(|t| t.timestamp() as f64),
            },
        )
    }
}

/// Compiles a conjunction of expressions into a Qdrant filter.
///
/// - zero conditions → `None` ("no filter", distinct from "exclude
///   everything");
/// - one condition → a filter whose `must` holds exactly that condition;
/// - N conditions → a filter whose `must` holds all N.
///
/// Range bounds emit one clause per bound, so a `publishedAt` window
/// produces up to two clauses.
pub fn compile(expressions: &[FilterExpression]) -> Result<Option<Filter>, FilterError> {
    let mut conditions = Vec::new();
    for expression in expressions {
        compile_node(expression, &mut conditions)?;
    }

    if conditions.is_empty() {
        return Ok(None);
    }

    Ok(Some(Filter::must(conditions)))
}

/// Validates a conjunction without materializing the backend filter.
///
/// Same rules as [`compile`]; used by backends that evaluate expressions
/// directly (the in-memory mock).
pub fn validate(expressions: &[FilterExpression]) -> Result<(), FilterError> {
    compile(expressions).map(|_| ())
}

fn compile_node(
    expression: &FilterExpression,
    out: &mut Vec<Condition>,
) -> Result<(), FilterError> {
    match expression {
        FilterExpression::Equals(field, value) => match field {
            FilterField::Source | FilterField::Category | FilterField::Language => {
                out.push(Condition::matches(field.key(), value.clone()));
                Ok(())
            }
            FilterField::CredibilityScore | FilterField::PublishedAt => {
                Err(FilterError::UnsupportedFilter {
                    field: field.key(),
                    operator: "equals",
                })
            }
        },

        FilterExpression::In(field, values) => match field {
            FilterField::Source | FilterField::Category => {
                if values.is_empty() {
                    return Err(FilterError::EmptySet { field: field.key() });
                }
                out.push(Condition::matches(
                    field.key(),
                    values.iter().cloned().collect::<Vec<String>>(),
                ));
                Ok(())
            }
            _ => Err(FilterError::UnsupportedFilter {
                field: field.key(),
                operator: "in",
            }),
        },

        FilterExpression::Range(field, bounds) => match field {
            FilterField::PublishedAt => {
                if bounds.gte.is_none() && bounds.lte.is_none() {
                    return Err(FilterError::EmptyRange { field: field.key() });
                }
                if let Some(gte) = bounds.gte {
                    out.push(Condition::range(
                        field.key(),
                        Range {
                            gte: Some(gte),
                            ..Default::default()
                        },
                    ));
                }
                if let Some(lte) = bounds.lte {
                    out.push(Condition::range(
                        field.key(),
                        Range {
                            lte: Some(lte),
                            ..Default::default()
                        },
                    ));
                }
                Ok(())
            }
            FilterField::CredibilityScore => {
                // Only a floor makes sense for credibility; a ceiling is
                // not a supported use case.
                if bounds.lte.is_some() {
                    return Err(FilterError::UnsupportedBound {
                        field: field.key(),
                        bound: "lte",
                    });
                }
                let gte = bounds
                    .gte
                    .ok_or(FilterError::EmptyRange { field: field.key() })?;
                out.push(Condition::range(
                    field.key(),
                    Range {
                        gte: Some(gte),
                        ..Default::default()
                    },
                ));
                Ok(())
            }
            _ => Err(FilterError::UnsupportedFilter {
                field: field.key(),
                operator: "range",
            }),
        },

        FilterExpression::And(children) => {
            for child in children {
                compile_node(child, out)?;
            }
            Ok(())
        }
    }
}
