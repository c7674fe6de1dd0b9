use crate::tables::RowIdentity;
use std::collections::HashSet;

/// Drop exact duplicate rows, keeping the first occurrence of each.
pub fn drop_duplicates<R, I>(rows: I) -> Vec<R>
where
    R: RowIdentity,
    I: IntoIterator<Item = R>,
{
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.row_key()))
        .collect()
}
