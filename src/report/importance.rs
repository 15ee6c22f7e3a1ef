use crate::data::model::{ImportanceEntry, ImportanceTable};

/// The `n` most important features, highest score first.
///
/// Equal scores keep the table's load order (`sort_by` is stable). Asking for
/// more than the table holds returns every entry.
pub fn top_importances(table: &ImportanceTable, n: usize) -> Vec<&ImportanceEntry> {
    let mut ranked: Vec<&ImportanceEntry> = table.entries().iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(n);
    ranked
}
