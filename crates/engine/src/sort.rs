//! Sort Util - value comparison for facet option lists
//!
//! `compare_values` is the per-pair primitive. `sort_values` applies the
//! field-level policy: a numeric field sorts numerically only when *every*
//! value parses, otherwise the whole list sorts lexicographically.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::record::FieldKind;

/// How a value list ended up ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Numeric,
    Lexicographic,
}

/// Parse a trimmed value as a finite number
pub fn parse_number(raw: &str) -> Option<OrderedFloat<f64>> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(OrderedFloat)
}

/// Compare two raw values.
///
/// Numeric mode compares parsed numbers when both operands parse (raw text
/// breaks ties such as "1" vs "1.0"); anything else is a case-sensitive
/// comparison of the raw strings.
pub fn compare_values(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        if let (Some(x), Some(y)) = (parse_number(a), parse_number(b)) {
            return x.cmp(&y).then_with(|| a.cmp(b));
        }
    }
    a.cmp(b)
}

/// Decide the mode for a whole list of values of the given kind
pub fn sort_mode_for<S: AsRef<str>>(values: &[S], kind: FieldKind) -> SortMode {
    if kind.is_numeric() && values.iter().all(|v| parse_number(v.as_ref()).is_some()) {
        SortMode::Numeric
    } else {
        SortMode::Lexicographic
    }
}

/// Sort values in place under the all-or-nothing policy, returning the mode used
pub fn sort_values<S: AsRef<str>>(values: &mut [S], kind: FieldKind) -> SortMode {
    let mode = sort_mode_for(values, kind);
    let numeric = mode == SortMode::Numeric;
    values.sort_by(|a, b| compare_values(a.as_ref(), b.as_ref(), numeric));
    mode
}
