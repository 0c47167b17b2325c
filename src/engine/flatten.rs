//! Hierarchy flattener: parent-linked records to a depth-ordered sequence.
//!
//! Depth-first pre-order from the roots. A node's children are emitted
//! immediately after it only when the node's id is in the expanded set;
//! collapsed subtrees are omitted from the output entirely, not merely
//! hidden. Records whose parent was filtered out (dangling parent) are
//! treated as roots so filtering cannot orphan rows invisibly; records whose
//! parents form a cycle are dropped with a warning.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::types::{Record, ViewRow};

/// Flatten filtered records into annotated view rows.
pub fn flatten_rows(records: &[&Record], expanded: &BTreeSet<String>) -> Vec<ViewRow> {
    let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

    // Children indices per parent, preserving filtered order.
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match record.parent_id.as_deref().filter(|p| ids.contains(p)) {
            Some(parent_id) => children.entry(parent_id).or_default().push(idx),
            None => roots.push(idx),
        }
    }

    warn_on_parent_cycles(records, &children, &roots);

    let mut rows = Vec::with_capacity(records.len());
    // Explicit stack; pushed in reverse so pre-order pops left to right.
    let mut stack: Vec<(usize, usize)> = roots.iter().rev().map(|&i| (i, 0)).collect();

    while let Some((idx, depth)) = stack.pop() {
        let Some(record) = records.get(idx) else {
            continue;
        };
        let kids = children.get(record.id.as_str());
        let has_children = kids.is_some_and(|k| !k.is_empty());
        let is_expanded = expanded.contains(&record.id);

        if has_children && is_expanded {
            if let Some(kids) = kids {
                for &child in kids.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }

        rows.push(ViewRow {
            row_id: record.id.clone(),
            record: (*record).clone(),
            depth,
            has_children,
            is_expanded,
        });
    }

    rows
}

/// Records whose parent ids form a cycle hang off no root, so the traversal
/// never reaches them (collapsed descendants are reachable, just not
/// emitted). Warn for each so the data problem is visible.
fn warn_on_parent_cycles(
    records: &[&Record],
    children: &HashMap<&str, Vec<usize>>,
    roots: &[usize],
) {
    let mut reachable: HashSet<&str> = HashSet::new();
    let mut pending: Vec<usize> = roots.to_vec();
    while let Some(idx) = pending.pop() {
        let Some(record) = records.get(idx) else {
            continue;
        };
        if reachable.insert(record.id.as_str()) {
            if let Some(kids) = children.get(record.id.as_str()) {
                pending.extend(kids);
            }
        }
    }
    for record in records {
        if !reachable.contains(record.id.as_str()) {
            log::warn!(
                "record {} unreachable from any root (parent cycle), dropped from view",
                record.id
            );
        }
    }
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

    fn record(id: &str, parent: Option<&str>) -> Record {
        let mut r = Record::new(id);
        r.parent_id = parent.map(ToString::to_string);
        r
    }

    fn expanded(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn collapsed_children_are_omitted() {
        let records = vec![record("1", None), record("2", Some("1"))];
        let refs: Vec<&Record> = records.iter().collect();

        let rows = flatten_rows(&refs, &expanded(&[]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_id, "1");
        assert!(rows[0].has_children);
        assert!(!rows[0].is_expanded);
    }

    #[test]
    fn expanded_children_follow_their_parent_with_depth() {
        let records = vec![record("1", None), record("2", Some("1"))];
        let refs: Vec<&Record> = records.iter().collect();

        let rows = flatten_rows(&refs, &expanded(&["1"]));
        let ids: Vec<&str> = rows.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[1].depth, 1);
        assert!(!rows[1].has_children);
    }

    #[test]
    fn preorder_across_multiple_roots_and_levels() {
        let records = vec![
            record("a", None),
            record("a1", Some("a")),
            record("a2", Some("a")),
            record("a1x", Some("a1")),
            record("b", None),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let rows = flatten_rows(&refs, &expanded(&["a", "a1"]));
        let ids: Vec<&str> = rows.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a1x", "a2", "b"]);
        assert_eq!(rows[2].depth, 2);
    }

    #[test]
    fn dangling_parent_promotes_to_root() {
        let records = vec![record("2", Some("gone")), record("3", None)];
        let refs: Vec<&Record> = records.iter().collect();

        let rows = flatten_rows(&refs, &expanded(&[]));
        let ids: Vec<&str> = rows.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(rows[0].depth, 0);
    }

    #[test]
    fn parent_cycle_rows_are_dropped_without_hanging() {
        let records = vec![
            record("a", Some("b")),
            record("b", Some("a")),
            record("c", None),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let rows = flatten_rows(&refs, &expanded(&["a", "b", "c"]));
        let ids: Vec<&str> = rows.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn depth_equals_visible_ancestor_count() {
        let records = vec![
            record("r", None),
            record("c", Some("r")),
            record("g", Some("c")),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let rows = flatten_rows(&refs, &expanded(&["r", "c"]));
        for row in &rows {
            let mut ancestors = 0;
            let mut current = row.record.parent_id.clone();
            while let Some(pid) = current {
                if rows.iter().any(|r| r.row_id == pid) {
                    ancestors += 1;
                }
                current = records
                    .iter()
                    .find(|r| r.id == pid)
                    .and_then(|r| r.parent_id.clone());
            }
            assert_eq!(row.depth, ancestors, "row {}", row.row_id);
        }
    }
}
