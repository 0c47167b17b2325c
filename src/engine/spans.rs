//! Cell-span resolver: declared merges to a per-cell coverage map.
//!
//! Spans are resolved against the *current* view: row positions are flattened
//! row indices, column positions are visible column indices. Merges whose
//! anchor is not visible are skipped; spans clamp at the view edge. Conflict
//! policy is first-registrant-wins in merge declaration order — a later merge
//! touching any already-claimed cell is dropped whole and reported.

use std::collections::HashMap;

use crate::types::{cell_key, CellSpan, Merge, MergeConflict, ViewColumn, ViewRow};

/// Resolve merges into the cell-span map, collecting dropped merges.
pub fn resolve_spans(
    rows: &[ViewRow],
    columns: &[ViewColumn],
    merges: &[Merge],
) -> (HashMap<String, CellSpan>, Vec<MergeConflict>) {
    let row_pos: HashMap<&str, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.row_id.as_str(), i))
        .collect();
    let col_pos: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.column_key.as_str(), i))
        .collect();

    let mut map: HashMap<String, CellSpan> = HashMap::new();
    let mut conflicts: Vec<MergeConflict> = Vec::new();

    for merge in merges {
        let (Some(&r0), Some(&c0)) = (
            row_pos.get(merge.row_id.as_str()),
            col_pos.get(merge.col_key.as_str()),
        ) else {
            // Anchor row collapsed/filtered out or column hidden: nothing to
            // cover in this view.
            continue;
        };

        // Clamp to the view so declared spans past the edge stay well-formed.
        let row_span = merge.row_span.max(1).min(span_limit(rows.len(), r0));
        let col_span = merge.col_span.max(1).min(span_limit(columns.len(), c0));

        let anchor = cell_key(&merge.row_id, &merge.col_key);
        let covered = covered_keys(rows, columns, r0, c0, row_span, col_span);

        // First registrant wins: check every touched key before writing any.
        let collision = std::iter::once(&anchor)
            .chain(covered.iter())
            .find(|key| map.contains_key(key.as_str()));
        if let Some(taken) = collision {
            log::warn!(
                "dropping merge at {anchor}: cell {taken} already claimed by an earlier merge"
            );
            conflicts.push(MergeConflict {
                row_id: merge.row_id.clone(),
                col_key: merge.col_key.clone(),
                conflicts_at: taken.clone(),
            });
            continue;
        }

        map.insert(
            anchor.clone(),
            CellSpan {
                row_span,
                col_span,
                covered_by: None,
            },
        );
        for key in covered {
            map.insert(
                key,
                CellSpan {
                    row_span: 1,
                    col_span: 1,
                    covered_by: Some(anchor.clone()),
                },
            );
        }
    }

    (map, conflicts)
}

fn span_limit(len: usize, pos: usize) -> u32 {
    u32::try_from(len.saturating_sub(pos)).unwrap_or(u32::MAX)
}

/// All covered (non-anchor) cell keys of a merge region.
fn covered_keys(
    rows: &[ViewRow],
    columns: &[ViewColumn],
    r0: usize,
    c0: usize,
    row_span: u32,
    col_span: u32,
) -> Vec<String> {
    let mut keys = Vec::new();
    for dr in 0..row_span as usize {
        for dc in 0..col_span as usize {
            if dr == 0 && dc == 0 {
                continue;
            }
            let (Some(row), Some(col)) = (rows.get(r0 + dr), columns.get(c0 + dc)) else {
                continue;
            };
            keys.push(cell_key(&row.row_id, &col.column_key));
        }
    }
    keys
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::{Field, Record};

    fn row(id: &str) -> ViewRow {
        ViewRow {
            row_id: id.to_string(),
            record: Record::new(id),
            depth: 0,
            has_children: false,
            is_expanded: false,
        }
    }

    fn column(key: &str) -> ViewColumn {
        ViewColumn {
            column_key: key.to_string(),
            field: Field::text(key, key),
            width: None,
        }
    }

    fn merge(row_id: &str, col_key: &str, row_span: u32, col_span: u32) -> Merge {
        Merge {
            row_id: row_id.to_string(),
            col_key: col_key.to_string(),
            row_span,
            col_span,
        }
    }

    #[test]
    fn vertical_merge_covers_row_below() {
        let rows = vec![row("1"), row("2")];
        let cols = vec![column("name")];
        let (map, conflicts) = resolve_spans(&rows, &cols, &[merge("1", "name", 2, 1)]);

        assert!(conflicts.is_empty());
        let anchor = map.get("1:name").unwrap();
        assert_eq!(anchor.row_span, 2);
        assert_eq!(anchor.covered_by, None);
        let covered = map.get("2:name").unwrap();
        assert_eq!(covered.covered_by.as_deref(), Some("1:name"));
    }

    #[test]
    fn covered_count_is_area_minus_anchor() {
        let rows = vec![row("1"), row("2"), row("3")];
        let cols = vec![column("a"), column("b"), column("c")];
        let (map, conflicts) = resolve_spans(&rows, &cols, &[merge("1", "a", 3, 2)]);

        assert!(conflicts.is_empty());
        let covered = map.values().filter(|s| s.covered_by.is_some()).count();
        assert_eq!(covered, 3 * 2 - 1);
        assert_eq!(map.len(), 3 * 2);
    }

    #[test]
    fn conflicting_merge_is_dropped_whole() {
        let rows = vec![row("1"), row("2"), row("3")];
        let cols = vec![column("a")];
        let merges = vec![merge("1", "a", 2, 1), merge("2", "a", 2, 1)];
        let (map, conflicts) = resolve_spans(&rows, &cols, &merges);

        // First merge fully registered
        assert_eq!(map.get("1:a").unwrap().row_span, 2);
        assert_eq!(map.get("2:a").unwrap().covered_by.as_deref(), Some("1:a"));
        // Second dropped entirely: row 3 untouched
        assert!(!map.contains_key("3:a"));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].row_id, "2");
        assert_eq!(conflicts[0].conflicts_at, "2:a");
    }

    #[test]
    fn hidden_anchor_skips_merge_silently() {
        let rows = vec![row("1")];
        let cols = vec![column("a")];
        let (map, conflicts) = resolve_spans(&rows, &cols, &[merge("ghost", "a", 2, 2)]);
        assert!(map.is_empty());
        assert!(conflicts.is_empty());
    }

    #[test]
    fn spans_clamp_at_view_edge() {
        let rows = vec![row("1"), row("2")];
        let cols = vec![column("a")];
        let (map, _) = resolve_spans(&rows, &cols, &[merge("2", "a", 5, 5)]);
        let anchor = map.get("2:a").unwrap();
        assert_eq!(anchor.row_span, 1);
        assert_eq!(anchor.col_span, 1);
    }
}
