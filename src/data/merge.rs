//! Date alignment of two series.

use std::collections::BTreeMap;

use crate::domain::{MergedTable, SeriesTable, Units};

/// Inner-join two series on date, labelling columns by series id.
///
/// When both tables carry the same id the labels become `ID:units`. If the
/// units match as well the labels collide; use [`merge_labeled`] then.
pub fn merge(left: &SeriesTable, right: &SeriesTable) -> MergedTable {
    let (left_label, right_label) = column_labels(&left.series_id, left.units, &right.series_id, right.units);
    merge_labeled(left, right, &left_label, &right_label)
}

/// Column labels for a merged pair: series ids, disambiguated by units when
/// both sides name the same series.
pub fn column_labels(left_id: &str, left_units: Units, right_id: &str, right_units: Units) -> (String, String) {
    if left_id == right_id {
        (
            format!("{left_id}:{}", left_units.as_param()),
            format!("{right_id}:{}", right_units.as_param()),
        )
    } else {
        (left_id.to_string(), right_id.to_string())
    }
}

/// Inner-join two series on date with explicit column labels.
///
/// Dates missing from either side, or with a non-finite value on either side,
/// are dropped.
pub fn merge_labeled(left: &SeriesTable, right: &SeriesTable, left_label: &str, right_label: &str) -> MergedTable {
    let rows: BTreeMap<_, _> = left
        .iter()
        .filter_map(|(date, l)| right.get(&date).map(|r| (date, (l, r))))
        .filter(|(_, (l, r))| l.is_finite() && r.is_finite())
        .collect();

    MergedTable::new(left_label, right_label, rows)
}
