use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
/// Filter compilation errors. All are caller errors surfaced at compile
/// time, never at query time.
pub enum FilterError {
    /// Field/operator pair the backend mapping does not support.
    #[error("unsupported filter: {operator} on '{field}'")]
    UnsupportedFilter {
        /// Field name.
        field: &'static str,
        /// Operator name.
        operator: &'static str,
    },

    /// A range bound not supported for this field.
    #[error("unsupported bound: {bound} on '{field}'")]
    UnsupportedBound {
        /// Field name.
        field: &'static str,
        /// Bound name (`gte`/`lte`).
        bound: &'static str,
    },

    /// A range with neither bound set.
    #[error("range on '{field}' has no bounds")]
    EmptyRange {
        /// Field name.
        field: &'static str,
    },

    /// A set-membership condition with an empty set. Distinct from "no
    /// filter"; the caller almost certainly did not mean "match nothing".
    #[error("membership set for '{field}' is empty")]
    EmptySet {
        /// Field name.
        field: &'static str,
    },
}
