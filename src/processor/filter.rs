use std::collections::HashSet;
use std::ops::Range;

use tracing::debug;

use crate::helpers::partition::run_partitioned;
use crate::processor::{
    ColumnFilter, Projection, Row, row_source::CsvSource, wildcard::matches_any,
};

/// What to do with the cell at one header position
struct ColumnPlan<'a> {
    name: &'a str,
    keep: bool,
    patterns: Option<&'a HashSet<String>>,
}

/// Selects rows of `source` matching every column of `column_values` and projects
/// them onto `columns_to_keep`.
///
/// Within a column the patterns are OR-ed; across columns the matches are AND-ed.
/// An empty `column_values` selects every row. A filter column that is not in the
/// header can never match, so nothing is selected.
///
/// The row range is split into `workers` contiguous partitions (0 is treated as 1)
/// and the output keeps file order.
pub fn filter_rows(
    source: &CsvSource,
    column_values: &ColumnFilter,
    columns_to_keep: &Projection,
    workers: usize,
) -> Vec<Row> {
    let plan: Vec<ColumnPlan> = source
        .headers()
        .iter()
        .map(|name| ColumnPlan {
            name,
            keep: columns_to_keep.contains(name),
            patterns: column_values.get(name),
        })
        .collect();
    let required = column_values.len();

    let partials = run_partitioned(source.row_count(), workers, |worker, range| {
        let selected = filter_partition(source, &plan, required, range);
        debug!(worker, selected = selected.len(), "filter partition done");
        selected
    });

    let total = partials.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    for partial in partials {
        out.extend(partial);
    }
    out
}

fn filter_partition(
    source: &CsvSource,
    plan: &[ColumnPlan],
    required: usize,
    range: Range<usize>,
) -> Vec<Row> {
    let mut selected = Vec::new();

    for idx in range {
        let Some(cells) = source.cells(idx) else {
            continue;
        };

        let mut matched = 0;
        let mut row = Row::new();
        for (column, value) in plan.iter().zip(cells) {
            if column.keep {
                row.insert(column.name.to_string(), value.to_string());
            }
            if let Some(patterns) = column.patterns {
                if matches_any(value, patterns) {
                    matched += 1;
                }
            }
        }

        if matched == required {
            selected.push(row);
        }
    }

    selected
}
