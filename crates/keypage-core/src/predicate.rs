//! Parameterized predicate builder.
//!
//! Predicates are plain data: sources interpret them (the in-memory source
//! evaluates them, SQL sources render them with bound parameters), so field
//! values never get spliced into query text.

use std::cmp::Ordering;

use crate::{CursorDirection, SortBy, SortOrder, Value};

/// Strict comparison operator in the nulls-last total order of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// Strictly greater than.
    Gt,
    /// Strictly less than.
    Lt,
}

impl Comparator {
    /// Returns the comparator selecting rows past the anchor on one sort key.
    ///
    /// `>` for ascending keys paged forward and descending keys paged
    /// backward; `<` otherwise.
    #[inline]
    pub fn for_key(order: SortOrder, direction: CursorDirection) -> Self {
        match (order, direction) {
            (SortOrder::Asc, CursorDirection::After) | (SortOrder::Desc, CursorDirection::Before) => {
                Self::Gt
            }
            _ => Self::Lt,
        }
    }

    /// Returns whether `ordering` (of a row value against a bound) satisfies this comparator.
    #[inline]
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            Self::Gt => ordering == Ordering::Greater,
            Self::Lt => ordering == Ordering::Less,
        }
    }

    /// Returns the SQL operator for this comparator.
    #[inline]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

/// A boolean filter over record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Always true.
    True,
    /// Null-safe equality: `NULL` equals `NULL`.
    Eq {
        /// Field to compare.
        field: String,
        /// Value to compare against.
        value: Value,
    },
    /// Strict comparison in the nulls-last total order.
    Compare {
        /// Field to compare.
        field: String,
        /// Comparison operator.
        op: Comparator,
        /// Value to compare against.
        value: Value,
    },
    /// All of the inner predicates hold.
    And(Vec<Predicate>),
    /// At least one of the inner predicates holds.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Null-safe equality on `field`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field > value` in the nulls-last total order.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparator::Gt, value)
    }

    /// `field < value` in the nulls-last total order.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparator::Lt, value)
    }

    /// Strict comparison on `field`.
    pub fn compare(field: impl Into<String>, op: Comparator, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Conjunction of `predicates`, flattening to the single predicate when there is one.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut predicates: Vec<_> = predicates
            .into_iter()
            .filter(|predicate| !matches!(predicate, Self::True))
            .collect();

        match predicates.len() {
            0 => Self::True,
            1 => predicates.remove(0),
            _ => Self::And(predicates),
        }
    }

    /// Disjunction of `predicates`, flattening to the single predicate when there is one.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut predicates: Vec<_> = predicates.into_iter().collect();

        match predicates.len() {
            1 => predicates.remove(0),
            _ => Self::Or(predicates),
        }
    }

    /// Returns `self AND other`.
    pub fn and(self, other: Predicate) -> Self {
        Self::all([self, other])
    }

    /// Returns `self OR other`.
    pub fn or(self, other: Predicate) -> Self {
        Self::any([self, other])
    }

    /// Builds the boundary selecting rows strictly past `anchor` in `direction`.
    ///
    /// For keys `k0..kn` this is the row-wise tuple comparison decomposed per
    /// column:
    ///
    /// ```text
    /// (k0 ? a0)
    /// OR (k0 = a0 AND k1 ? a1)
    /// OR (k0 = a0 AND k1 = a1 AND k2 ? a2) ...
    /// ```
    ///
    /// where `=` is null-safe and each `?` is chosen by [`Comparator::for_key`].
    /// `anchor` holds the anchor record's value for each key, in key order.
    pub fn keyset(keys: &[SortBy], anchor: &[Value], direction: CursorDirection) -> Self {
        debug_assert_eq!(keys.len(), anchor.len());

        let branches = keys.iter().zip(anchor).enumerate().map(|(index, (key, value))| {
            let prefix = keys[..index]
                .iter()
                .zip(anchor)
                .map(|(tied, tied_value)| Self::eq(tied.field.clone(), tied_value.clone()));

            let diverge = Self::compare(
                key.field.clone(),
                Comparator::for_key(key.order, direction),
                value.clone(),
            );

            Self::all(prefix.chain(std::iter::once(diverge)))
        });

        Self::any(branches)
    }

    /// Evaluates this predicate, reading field values through `lookup`.
    ///
    /// Fields the lookup cannot resolve are treated as `NULL`.
    pub fn evaluate<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<Value>,
    {
        match self {
            Self::True => true,
            Self::Eq { field, value } => lookup(field)
                .unwrap_or(Value::Null)
                .null_safe_eq(value),
            Self::Compare { field, op, value } => {
                op.matches(lookup(field).unwrap_or(Value::Null).total_cmp(value))
            }
            Self::And(predicates) => predicates.iter().all(|p| p.evaluate(lookup)),
            Self::Or(predicates) => predicates.iter().any(|p| p.evaluate(lookup)),
        }
    }

    /// Returns every field referenced by this predicate, in visiting order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, fields: &mut Vec<&'a str>) {
        match self {
            Self::True => {}
            Self::Eq { field, .. } | Self::Compare { field, .. } => fields.push(field),
            Self::And(predicates) | Self::Or(predicates) => {
                for predicate in predicates {
                    predicate.collect_fields(fields);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn row(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect()
    }

    fn eval(predicate: &Predicate, row: &HashMap<String, Value>) -> bool {
        predicate.evaluate(&|field: &str| row.get(field).cloned())
    }

    #[test]
    fn comparator_rule() {
        use CursorDirection::*;
        use SortOrder::*;

        assert_eq!(Comparator::for_key(Asc, After), Comparator::Gt);
        assert_eq!(Comparator::for_key(Desc, Before), Comparator::Gt);
        assert_eq!(Comparator::for_key(Asc, Before), Comparator::Lt);
        assert_eq!(Comparator::for_key(Desc, After), Comparator::Lt);
    }

    #[test]
    fn comparator_operators() {
        assert_eq!(Comparator::Gt.as_sql(), ">");
        assert_eq!(Comparator::Lt.as_sql(), "<");
        assert!(Comparator::Gt.matches(Ordering::Greater));
        assert!(!Comparator::Lt.matches(Ordering::Equal));
    }

    #[test]
    fn single_key_boundary() {
        let keys = [SortBy::asc("id")];
        let predicate = Predicate::keyset(&keys, &[Value::Int(2)], CursorDirection::After);

        assert_eq!(predicate, Predicate::gt("id", 2));
        assert!(eval(&predicate, &row(&[("id", Value::Int(3))])));
        assert!(!eval(&predicate, &row(&[("id", Value::Int(2))])));
    }

    #[test]
    fn composite_boundary_shape() {
        let keys = [SortBy::asc("status"), SortBy::desc("created_at"), SortBy::asc("id")];
        let anchor = [Value::from("open"), Value::Int(10), Value::Int(7)];
        let predicate = Predicate::keyset(&keys, &anchor, CursorDirection::After);

        let expected = Predicate::Or(vec![
            Predicate::gt("status", "open"),
            Predicate::And(vec![
                Predicate::eq("status", "open"),
                Predicate::lt("created_at", 10),
            ]),
            Predicate::And(vec![
                Predicate::eq("status", "open"),
                Predicate::eq("created_at", 10),
                Predicate::gt("id", 7),
            ]),
        ]);

        assert_eq!(predicate, expected);
    }

    #[test]
    fn composite_boundary_ties_fall_through() {
        let keys = [SortBy::asc("status"), SortBy::desc("created_at"), SortBy::asc("id")];
        let anchor = [Value::from("open"), Value::Int(10), Value::Int(7)];
        let predicate = Predicate::keyset(&keys, &anchor, CursorDirection::After);

        // same status, older timestamp: after the anchor
        assert!(eval(
            &predicate,
            &row(&[("status", "open".into()), ("created_at", 9.into()), ("id", 1.into())])
        ));
        // same status and timestamp, larger id: after the anchor
        assert!(eval(
            &predicate,
            &row(&[("status", "open".into()), ("created_at", 10.into()), ("id", 8.into())])
        ));
        // the anchor itself is excluded
        assert!(!eval(
            &predicate,
            &row(&[("status", "open".into()), ("created_at", 10.into()), ("id", 7.into())])
        ));
        // newer timestamp within the same status: before the anchor
        assert!(!eval(
            &predicate,
            &row(&[("status", "open".into()), ("created_at", 11.into()), ("id", 99.into())])
        ));
    }

    #[test]
    fn null_prefix_uses_null_safe_equality() {
        let keys = [SortBy::asc("archived_at"), SortBy::asc("id")];
        let anchor = [Value::Null, Value::Int(3)];
        let predicate = Predicate::keyset(&keys, &anchor, CursorDirection::After);

        assert!(eval(&predicate, &row(&[("archived_at", Value::Null), ("id", 4.into())])));
        assert!(!eval(&predicate, &row(&[("archived_at", Value::Null), ("id", 2.into())])));
        // non-null values sort before nulls, so they precede the anchor
        assert!(!eval(&predicate, &row(&[("archived_at", 5.into()), ("id", 9.into())])));
    }

    #[test]
    fn all_and_any_flatten() {
        assert_eq!(Predicate::all([]), Predicate::True);
        assert_eq!(Predicate::all([Predicate::True, Predicate::eq("a", 1)]), Predicate::eq("a", 1));
        assert_eq!(Predicate::any([Predicate::eq("a", 1)]), Predicate::eq("a", 1));
        assert!(!eval(&Predicate::any([]), &row(&[])));
    }

    #[test]
    fn referenced_fields() {
        let predicate = Predicate::eq("a", 1).and(Predicate::gt("b", 2).or(Predicate::lt("c", 3)));
        assert_eq!(predicate.fields(), vec!["a", "b", "c"]);
    }
}
