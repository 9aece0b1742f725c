use std::collections::HashMap;
use std::ops::Range;

use tracing::{debug, error, warn};

use crate::helpers::partition::run_partitioned;
use crate::processor::{GroupedSumEntry, GroupedSumTable, ProcessorError, Row};

/// Group totals keyed by group value, remembering first-appearance order
#[derive(Debug, Default)]
struct GroupAccumulator {
    entries: Vec<GroupedSumEntry>,
    index: HashMap<String, usize>,
}

impl GroupAccumulator {
    fn group(&mut self, key: &str) -> &mut GroupedSumEntry {
        let pos = match self.index.get(key) {
            Some(&pos) => pos,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(GroupedSumEntry::new(key.to_string()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos]
    }

    fn merge(&mut self, other: GroupAccumulator) {
        for entry in other.entries {
            let target = self.group(&entry.key);
            for (column, value) in entry.totals {
                let total = target.totals.entry(column).or_insert(0);
                *total = total.saturating_add(value);
            }
        }
    }

    fn into_table(self) -> GroupedSumTable {
        self.entries
    }
}

/// One worker's contribution
#[derive(Debug)]
enum Partial {
    Groups(GroupAccumulator),
    Empty,
    Failed(ProcessorError),
}

/// Groups `rows` by `group_by` and sums each of `sum_columns` per group.
///
/// Rows are split into `workers` contiguous partitions (0 is treated as 1), summed
/// independently and merged additively. A row lacking the group-by column or any
/// sum column fails the whole call with [`ProcessorError::InvalidData`]; so does an
/// empty `rows`. A cell that is not a non-negative integer is logged and skipped.
///
/// With `sort_by` set to one of `sum_columns`, entries are ordered by that total,
/// largest first. Any other `sort_by` is logged and the table is returned in
/// first-appearance order.
pub fn group_and_sum<S: AsRef<str> + Sync>(
    rows: &[Row],
    group_by: &str,
    sum_columns: &[S],
    workers: usize,
    sort_by: Option<&str>,
) -> Result<GroupedSumTable, ProcessorError> {
    let partials = run_partitioned(rows.len(), workers, |worker, range| {
        let partial = sum_partition(rows, range, group_by, sum_columns);
        if let Partial::Groups(acc) = &partial {
            debug!(worker, groups = acc.entries.len(), "group-sum partition done");
        }
        partial
    });

    let mut merged: Option<GroupAccumulator> = None;
    for partial in partials {
        match partial {
            Partial::Failed(e) => return Err(e),
            Partial::Empty => {}
            Partial::Groups(acc) => match merged.as_mut() {
                Some(total) => total.merge(acc),
                None => merged = Some(acc),
            },
        }
    }

    let mut table = merged
        .ok_or_else(|| ProcessorError::InvalidData("no rows to group".into()))?
        .into_table();

    if let Some(column) = sort_by {
        sort_table(&mut table, sum_columns, column);
    }

    Ok(table)
}

fn sum_partition<S: AsRef<str>>(
    rows: &[Row],
    range: Range<usize>,
    group_by: &str,
    sum_columns: &[S],
) -> Partial {
    if range.is_empty() {
        return Partial::Empty;
    }

    let mut acc = GroupAccumulator::default();

    for row in &rows[range] {
        let Some(group_value) = row.get(group_by) else {
            error!(column = group_by, "missing group-by column");
            return Partial::Failed(ProcessorError::InvalidData(format!(
                "missing group-by column: {group_by}"
            )));
        };

        let entry = acc.group(group_value);
        for column in sum_columns {
            let column = column.as_ref();
            let total = entry.totals.entry(column.to_string()).or_insert(0);

            let Some(value) = row.get(column) else {
                error!(column, "missing summation column");
                return Partial::Failed(ProcessorError::InvalidData(format!(
                    "missing summation column: {column}"
                )));
            };

            match parse_count(value) {
                Some(n) => *total = total.saturating_add(n),
                None => warn!(column, value = %value, "invalid numeric value, skipped"),
            }
        }
    }

    Partial::Groups(acc)
}

fn parse_count(value: &str) -> Option<u64> {
    atoi_simd::parse::<u64>(value.trim_ascii().as_bytes()).ok()
}

fn sort_table<S: AsRef<str>>(table: &mut GroupedSumTable, sum_columns: &[S], column: &str) {
    if !sum_columns.iter().any(|c| c.as_ref() == column) {
        warn!(column, "sort column is not summed, returning unsorted data");
        return;
    }
    table.sort_by(|a, b| b.total(column).cmp(&a.total(column)));
}
