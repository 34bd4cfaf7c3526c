//! Region predicates applied to data queries.
//!
//! The resolver turns a principal's region scope into a [`RegionPredicate`]
//! and hands it to any query type implementing [`RegionFilterable`]. An
//! empty scope always becomes [`RegionPredicate::MatchNone`].

use std::collections::BTreeSet;

use warden_types::RegionId;

use crate::error::{Result, ScopeError};

/// Constraint on a query's region column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionPredicate {
    /// No constraint (global visibility).
    Unrestricted,
    /// Matches zero rows.
    MatchNone,
    /// Region column must be one of `ids`, or NULL when `allow_null` is set.
    InSet {
        column: String,
        ids: BTreeSet<RegionId>,
        allow_null: bool,
    },
}

impl RegionPredicate {
    /// Builds a set predicate. An empty `ids` collapses to
    /// [`RegionPredicate::MatchNone`] regardless of `allow_null`.
    pub fn in_set(column: &str, ids: BTreeSet<RegionId>, allow_null: bool) -> Result<Self> {
        validate_column(column)?;
        if ids.is_empty() {
            return Ok(RegionPredicate::MatchNone);
        }
        Ok(RegionPredicate::InSet {
            column: column.to_string(),
            ids,
            allow_null,
        })
    }

    /// Evaluates the predicate against a row's region value.
    pub fn matches(&self, value: Option<RegionId>) -> bool {
        match self {
            RegionPredicate::Unrestricted => true,
            RegionPredicate::MatchNone => false,
            RegionPredicate::InSet {
                ids, allow_null, ..
            } => match value {
                Some(id) => ids.contains(&id),
                None => *allow_null,
            },
        }
    }

    /// Renders the predicate as a SQL boolean expression.
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use warden_abac::filter::RegionPredicate;
    /// use warden_types::RegionId;
    ///
    /// let ids = BTreeSet::from([RegionId::new(2), RegionId::new(3)]);
    /// let p = RegionPredicate::in_set("region_id", ids, true).unwrap();
    /// assert_eq!(p.to_sql(), "(region_id IN (2, 3) OR region_id IS NULL)");
    ///
    /// let none = RegionPredicate::in_set("region_id", BTreeSet::new(), true).unwrap();
    /// assert_eq!(none.to_sql(), "1 = 0");
    /// ```
    pub fn to_sql(&self) -> String {
        match self {
            RegionPredicate::Unrestricted => "1 = 1".to_string(),
            RegionPredicate::MatchNone => "1 = 0".to_string(),
            RegionPredicate::InSet {
                column,
                ids,
                allow_null,
            } => {
                let list = ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                if *allow_null {
                    format!("({column} IN ({list}) OR {column} IS NULL)")
                } else {
                    format!("{column} IN ({list})")
                }
            }
        }
    }
}

/// A query that can be narrowed by a region predicate.
pub trait RegionFilterable: Sized {
    /// Returns the query with `predicate` AND-ed onto it.
    fn apply_region_predicate(self, predicate: RegionPredicate) -> Self;
}

/// Minimal WHERE-clause builder.
///
/// Accumulates predicates that are AND-ed together. Useful directly for SQL
/// generation and as an in-memory row filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFilter {
    predicates: Vec<RegionPredicate>,
}

impl SqlFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated predicates.
    pub fn predicates(&self) -> &[RegionPredicate] {
        &self.predicates
    }

    /// Returns whether any predicate makes the filter match nothing.
    pub fn is_empty_result(&self) -> bool {
        self.predicates
            .iter()
            .any(|p| matches!(p, RegionPredicate::MatchNone))
    }

    /// Generates the WHERE clause (without the `WHERE` keyword), or an empty
    /// string when there is no constraint.
    pub fn where_clause(&self) -> String {
        self.predicates
            .iter()
            .filter(|p| !matches!(p, RegionPredicate::Unrestricted))
            .map(RegionPredicate::to_sql)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Evaluates every predicate against a row. `column_value` returns the
    /// row's region for a given column name.
    pub fn matches_row<F>(&self, column_value: F) -> bool
    where
        F: Fn(&str) -> Option<RegionId>,
    {
        self.predicates.iter().all(|p| match p {
            RegionPredicate::InSet { column, .. } => p.matches(column_value(column)),
            other => other.matches(None),
        })
    }
}

impl RegionFilterable for SqlFilter {
    fn apply_region_predicate(mut self, predicate: RegionPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

/// Accepts `column` or `table.column`, each part `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn validate_column(column: &str) -> Result<()> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = column.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|p| valid_part(p)) {
        Ok(())
    } else {
        Err(ScopeError::InvalidColumn(column.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> BTreeSet<RegionId> {
        raw.iter().copied().map(RegionId::new).collect()
    }

    #[test]
    fn test_in_set_sql_without_null() {
        let p = RegionPredicate::in_set("shipments.region_id", ids(&[7, 3]), false).unwrap();
        assert_eq!(p.to_sql(), "shipments.region_id IN (3, 7)");
    }

    #[test]
    fn test_empty_set_is_match_none_even_with_null() {
        let p = RegionPredicate::in_set("region_id", BTreeSet::new(), true).unwrap();
        assert_eq!(p, RegionPredicate::MatchNone);
        assert!(!p.matches(None));
        assert!(!p.matches(Some(RegionId::new(1))));
    }

    #[test]
    fn test_matches_null_only_when_allowed() {
        let strict = RegionPredicate::in_set("region_id", ids(&[1]), false).unwrap();
        let lenient = RegionPredicate::in_set("region_id", ids(&[1]), true).unwrap();

        assert!(strict.matches(Some(RegionId::new(1))));
        assert!(!strict.matches(Some(RegionId::new(2))));
        assert!(!strict.matches(None));
        assert!(lenient.matches(None));
    }

    #[test]
    fn test_rejects_injection_in_column() {
        for bad in ["", "1col", "region_id; DROP TABLE x", "a.b.c", "region id", "a."] {
            assert!(
                matches!(
                    RegionPredicate::in_set(bad, ids(&[1]), false),
                    Err(ScopeError::InvalidColumn(_))
                ),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_sql_filter_where_clause() {
        let filter = SqlFilter::new()
            .apply_region_predicate(RegionPredicate::Unrestricted)
            .apply_region_predicate(RegionPredicate::in_set("origin", ids(&[1]), false).unwrap())
            .apply_region_predicate(
                RegionPredicate::in_set("destination", ids(&[2]), true).unwrap(),
            );

        assert_eq!(
            filter.where_clause(),
            "origin IN (1) AND (destination IN (2) OR destination IS NULL)"
        );
        assert!(!filter.is_empty_result());
        assert!(filter.matches_row(|col| match col {
            "origin" => Some(RegionId::new(1)),
            _ => None,
        }));
        assert!(!filter.matches_row(|_| Some(RegionId::new(2))));
    }

    #[test]
    fn test_unconstrained_filter() {
        let filter = SqlFilter::new();
        assert_eq!(filter.where_clause(), "");
        assert!(filter.matches_row(|_| None));
    }
}
