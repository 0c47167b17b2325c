//! End-to-end view computation tests: columns from settings, filter/sort
//! through hierarchy flattening, span resolution, and selection — the full
//! Schema + Dataset + Settings → View pipeline.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{
    assert_anchor, assert_covered_by, assert_row_order, expanded_settings, text_schema,
    DatasetBuilder,
};
use tableview::engine::TableEngine;
use tableview::types::{renderable_cells, Settings, SortDirection, SortSpec};

#[test]
fn collapsed_parent_hides_children() {
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("name", "Ann")])
        .record("2", Some("1"), &[("name", "Bob")])
        .build();
    let mut engine = TableEngine::new(text_schema("tpl:t", &["name"]), Settings::default());
    engine.set_dataset(dataset);

    let view = engine.compute();
    assert_row_order(&view, &["1"]);
    assert!(view.rows[0].has_children);
}

#[test]
fn expanded_parent_emits_child_at_depth_one() {
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("name", "Ann")])
        .record("2", Some("1"), &[("name", "Bob")])
        .build();
    let mut engine = TableEngine::new(text_schema("tpl:t", &["name"]), expanded_settings(&["1"]));
    engine.set_dataset(dataset);

    let view = engine.compute();
    assert_row_order(&view, &["1", "2"]);
    assert_eq!(view.rows[1].depth, 1);
}

#[test]
fn toggle_expand_twice_restores_previous_sequence() {
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("name", "Ann")])
        .record("2", Some("1"), &[("name", "Bob")])
        .build();
    let mut engine = TableEngine::new(text_schema("tpl:t", &["name"]), expanded_settings(&["1"]));
    engine.set_dataset(dataset);

    let before: Vec<String> = engine.compute().rows.iter().map(|r| r.row_id.clone()).collect();
    engine.toggle_expand("1");
    engine.toggle_expand("1");
    let after: Vec<String> = engine.compute().rows.iter().map(|r| r.row_id.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn vertical_merge_anchors_and_covers() {
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("name", "Ann")])
        .record("2", None, &[("name", "Bob")])
        .merge("1", "name", 2, 1)
        .build();
    let mut engine = TableEngine::new(text_schema("tpl:t", &["name"]), Settings::default());
    engine.set_dataset(dataset);

    let view = engine.compute();
    assert_anchor(&view, "1", "name", 2, 1);
    assert_covered_by(&view, "2", "name", "1:name");
    assert!(view.merge_conflicts.is_empty());
}

#[test]
fn renderable_cells_skip_covered_positions() {
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("a", "x"), ("b", "y")])
        .record("2", None, &[("a", "z")])
        .merge("1", "a", 2, 2)
        .build();
    let mut engine = TableEngine::new(text_schema("tpl:t", &["a", "b"]), Settings::default());
    engine.set_dataset(dataset);

    let view = engine.compute();
    let first = renderable_cells(&view.rows[0], &view.columns, &view.cell_span_map);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].col_key, "a");
    assert_eq!(first[0].span.col_span, 2);

    let second = renderable_cells(&view.rows[1], &view.columns, &view.cell_span_map);
    assert!(second.is_empty());
}

#[test]
fn merge_spanning_collapsed_rows_resolves_against_visible_positions() {
    // Row "2" is a collapsed child; the merge covers the next *visible* row.
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("name", "Ann")])
        .record("2", Some("1"), &[("name", "hidden")])
        .record("3", None, &[("name", "Cid")])
        .merge("1", "name", 2, 1)
        .build();
    let mut engine = TableEngine::new(text_schema("tpl:t", &["name"]), Settings::default());
    engine.set_dataset(dataset);

    let view = engine.compute();
    assert_row_order(&view, &["1", "3"]);
    assert_covered_by(&view, "3", "name", "1:name");
}

#[test]
fn hidden_column_drops_from_view_and_filter() {
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("a", "visible"), ("b", "findme")])
        .build();
    let mut settings = Settings::default();
    settings.columns.visibility.insert("b".to_string(), false);
    settings.filter.global = "findme".to_string();

    let mut engine = TableEngine::new(text_schema("tpl:t", &["a", "b"]), settings);
    engine.set_dataset(dataset);

    let view = engine.compute();
    assert_eq!(view.columns.len(), 1);
    assert_eq!(view.columns[0].column_key, "a");
    // the match lived in the hidden column, so the row is filtered out
    assert!(view.rows.is_empty());
}

#[test]
fn column_order_and_widths_come_from_settings() {
    let mut settings = Settings::default();
    settings.columns.order = Some(vec!["b".to_string(), "a".to_string()]);
    settings.columns.widths.insert("b".to_string(), Some(120.0));
    // a cleared width behaves like no stored width at all
    settings.columns.widths.insert("a".to_string(), None);

    let mut engine = TableEngine::new(text_schema("tpl:t", &["a", "b"]), settings);
    engine.set_dataset(DatasetBuilder::new().record("1", None, &[]).build());

    let view = engine.compute();
    let keys: Vec<&str> = view.columns.iter().map(|c| c.column_key.as_str()).collect();
    assert_eq!(keys, vec!["b", "a"]);
    assert_eq!(view.columns[0].width, Some(120.0));
    assert_eq!(view.columns[1].width, None);
}

#[test]
fn duplicate_keys_in_stored_order_produce_one_column_each() {
    let mut settings = Settings::default();
    settings.columns.order = Some(vec![
        "b".to_string(),
        "a".to_string(),
        "b".to_string(),
    ]);

    let mut engine = TableEngine::new(text_schema("tpl:t", &["a", "b"]), settings);
    engine.set_dataset(DatasetBuilder::new().record("1", None, &[]).build());

    let keys: Vec<String> = engine
        .compute()
        .columns
        .iter()
        .map(|c| c.column_key.clone())
        .collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn stale_column_order_appends_new_schema_keys() {
    let mut settings = Settings::default();
    settings.columns.order = Some(vec!["a".to_string()]);

    let mut engine = TableEngine::new(text_schema("tpl:t", &["a", "b"]), settings);
    engine.set_dataset(DatasetBuilder::new().record("1", None, &[]).build());

    let keys: Vec<String> = engine
        .compute()
        .columns
        .iter()
        .map(|c| c.column_key.clone())
        .collect();
    assert_eq!(keys, vec!["b", "a"]);
}

#[test]
fn filter_keeps_ancestors_and_drops_the_rest() {
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("name", "root")])
        .record("2", Some("1"), &[("name", "needle")])
        .record("3", None, &[("name", "other")])
        .build();
    let mut settings = expanded_settings(&["1"]);
    settings.filter.global = "NEEDLE".to_string();

    let mut engine = TableEngine::new(text_schema("tpl:t", &["name"]), settings);
    engine.set_dataset(dataset);

    assert_row_order(&engine.compute(), &["1", "2"]);
}

#[test]
fn sort_applies_after_filter_and_respects_direction() {
    let dataset = DatasetBuilder::new()
        .number("a", "n", 1.0)
        .number("b", "n", 3.0)
        .number("c", "n", 2.0)
        .build();
    let mut settings = Settings::default();
    settings.sort = Some(SortSpec {
        key: "n".to_string(),
        direction: SortDirection::Descending,
    });

    let mut engine = TableEngine::new(text_schema("tpl:t", &["n"]), settings);
    engine.set_dataset(dataset);

    assert_row_order(&engine.compute(), &["b", "c", "a"]);
}

#[test]
fn toggle_select_twice_leaves_selection_unchanged() {
    let mut engine = TableEngine::new(text_schema("tpl:t", &["name"]), Settings::default());
    engine.set_dataset(DatasetBuilder::new().record("1", None, &[]).build());

    let before = engine.compute().selection;
    engine.toggle_select("1");
    assert!(engine.compute().selection.contains("1"));
    engine.toggle_select("1");
    assert_eq!(engine.compute().selection, before);
}

#[test]
fn sentinel_schema_computes_an_empty_column_view() {
    let mut engine = TableEngine::new(
        tableview::types::Schema::sentinel(),
        Settings::default(),
    );
    engine.set_dataset(DatasetBuilder::new().record("1", None, &[]).build());

    let view = engine.compute();
    assert!(view.columns.is_empty());
    // rows still flatten; the consumer renders "no columns configured"
    assert_eq!(view.rows.len(), 1);
}

#[test]
fn overlapping_merges_surface_a_conflict() {
    let dataset = DatasetBuilder::new()
        .record("1", None, &[("a", "x")])
        .record("2", None, &[("a", "y")])
        .record("3", None, &[("a", "z")])
        .merge("1", "a", 2, 1)
        .merge("2", "a", 2, 1)
        .build();
    let mut engine = TableEngine::new(text_schema("tpl:t", &["a"]), Settings::default());
    engine.set_dataset(dataset);

    let view = engine.compute();
    assert_anchor(&view, "1", "a", 2, 1);
    assert_eq!(view.merge_conflicts.len(), 1);
    assert_eq!(view.merge_conflicts[0].row_id, "2");
}
