//! Filter/sort stage: runs before hierarchy flattening.
//!
//! Filtering is a case-insensitive substring match against the stringified
//! value of every visible field. A record survives when it matches directly
//! or when any descendant matches — ancestor chains of matches are preserved
//! so the hierarchy stays navigable. Sort applies after filtering and is
//! stable with respect to original order on ties.

use std::collections::{HashMap, HashSet};

use crate::types::{CellValue, FilterSettings, Record, SortDirection, SortSpec};

/// Apply the global text filter, preserving ancestor chains of matches.
pub fn filter_records<'a>(
    records: &'a [Record],
    filter: &FilterSettings,
    visible_keys: &[String],
) -> Vec<&'a Record> {
    let needle = filter.global.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    let by_id: HashMap<&str, &Record> = records.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut keep: HashSet<&str> = HashSet::new();

    for record in records {
        if !matches(record, &needle, visible_keys) {
            continue;
        }
        keep.insert(record.id.as_str());
        // Walk up the parent chain; stop at already-kept ancestors or cycles.
        let mut current = record.parent_id.as_deref();
        while let Some(parent_id) = current {
            if !keep.insert(parent_id) {
                break;
            }
            current = by_id.get(parent_id).and_then(|r| r.parent_id.as_deref());
        }
    }

    records
        .iter()
        .filter(|r| keep.contains(r.id.as_str()))
        .collect()
}

fn matches(record: &Record, needle: &str, visible_keys: &[String]) -> bool {
    visible_keys.iter().any(|key| {
        record
            .cells
            .get(key)
            .is_some_and(|v| v.display().to_lowercase().contains(needle))
    })
}

/// Sort filtered records by the spec's field, stable on ties.
pub fn sort_records<'a>(mut records: Vec<&'a Record>, sort: Option<&SortSpec>) -> Vec<&'a Record> {
    let Some(spec) = sort else {
        return records;
    };

    records.sort_by(|a, b| {
        let av = a.cells.get(&spec.key);
        let bv = b.cells.get(&spec.key);
        let ordering = compare_values(av, bv);
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    records
}

/// Typed comparison: numeric when both sides are numbers, otherwise
/// case-insensitive lexical on display text. Missing values compare as empty.
fn compare_values(a: Option<&CellValue>, b: Option<&CellValue>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(CellValue::Number(x)), Some(CellValue::Number(y))) => {
            x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal)
        }
        _ => {
            let ax = a.map(CellValue::display).unwrap_or_default().to_lowercase();
            let bx = b.map(CellValue::display).unwrap_or_default().to_lowercase();
            ax.cmp(&bx)
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

    fn record(id: &str, parent: Option<&str>, name: &str) -> Record {
        let mut r = Record::new(id);
        r.parent_id = parent.map(ToString::to_string);
        r.cells
            .insert("name".to_string(), CellValue::Text(name.to_string()));
        r
    }

    fn keys() -> Vec<String> {
        vec!["name".to_string()]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let records = vec![record("1", None, "Ann"), record("2", Some("1"), "Bob")];
        let filter = FilterSettings::default();
        assert_eq!(filter_records(&records, &filter, &keys()).len(), 2);
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        let records = vec![record("1", None, "Annika"), record("2", None, "Bob")];
        let filter = FilterSettings {
            global: "NIK".to_string(),
        };
        let kept = filter_records(&records, &filter, &keys());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "1");
    }

    #[test]
    fn ancestors_of_a_match_are_preserved() {
        let records = vec![
            record("1", None, "root"),
            record("2", Some("1"), "mid"),
            record("3", Some("2"), "needle"),
            record("4", None, "other"),
        ];
        let filter = FilterSettings {
            global: "needle".to_string(),
        };
        let kept: Vec<&str> = filter_records(&records, &filter, &keys())
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(kept, vec!["1", "2", "3"]);
    }

    #[test]
    fn filter_only_sees_visible_fields() {
        let mut r = record("1", None, "Ann");
        r.cells
            .insert("hidden".to_string(), CellValue::Text("secret".to_string()));
        let records = vec![r];
        let filter = FilterSettings {
            global: "secret".to_string(),
        };
        assert!(filter_records(&records, &filter, &keys()).is_empty());
    }

    #[test]
    fn sort_is_numeric_for_number_cells_and_stable() {
        let mut a = Record::new("a");
        a.cells.insert("n".to_string(), CellValue::Number(10.0));
        let mut b = Record::new("b");
        b.cells.insert("n".to_string(), CellValue::Number(2.0));
        let mut c = Record::new("c");
        c.cells.insert("n".to_string(), CellValue::Number(2.0));
        let records = vec![a, b, c];

        let spec = SortSpec {
            key: "n".to_string(),
            direction: SortDirection::Ascending,
        };
        let sorted: Vec<&str> = sort_records(records.iter().collect(), Some(&spec))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        // "b" before "c": equal keys keep original order
        assert_eq!(sorted, vec!["b", "c", "a"]);
    }

    #[test]
    fn descending_reverses_order() {
        let records = vec![record("1", None, "alpha"), record("2", None, "beta")];
        let spec = SortSpec {
            key: "name".to_string(),
            direction: SortDirection::Descending,
        };
        let sorted: Vec<&str> = sort_records(records.iter().collect(), Some(&spec))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(sorted, vec!["2", "1"]);
    }
}
