//! Benchmarks for the view-computation pipeline.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tableview::engine::TableEngine;
use tableview::types::{
    CellValue, Dataset, Field, FieldType, Merge, Record, Schema, Settings,
};

/// A wide-ish dataset: `roots` root rows, each with `children` expanded
/// children, a merge on every tenth root.
fn build_inputs(roots: usize, children: usize) -> (Schema, Settings, Dataset) {
    let schema = Schema::new(
        "tpl:bench",
        vec![
            Field::text("name", "Name"),
            Field::text("qty", "Qty").with_type(FieldType::Number),
            Field::text("note", "Note"),
        ],
    );

    let mut settings = Settings::default();
    let mut dataset = Dataset::default();

    for r in 0..roots {
        let root_id = format!("r{r}");
        let mut record = Record::new(&root_id);
        record
            .cells
            .insert("name".to_string(), CellValue::Text(format!("root {r}")));
        record
            .cells
            .insert("qty".to_string(), CellValue::Number(r as f64));
        dataset.records.push(record);
        settings.expanded_row_ids.insert(root_id.clone());

        for c in 0..children {
            let mut child = Record::new(format!("r{r}c{c}"));
            child.parent_id = Some(root_id.clone());
            child
                .cells
                .insert("name".to_string(), CellValue::Text(format!("child {c}")));
            dataset.records.push(child);
        }

        if r % 10 == 0 {
            dataset.merges.push(Merge {
                row_id: root_id,
                col_key: "name".to_string(),
                row_span: 1,
                col_span: 2,
            });
        }
    }

    (schema, settings, dataset)
}

fn bench_compute(c: &mut Criterion) {
    let (schema, settings, dataset) = build_inputs(500, 10);
    let mut engine = TableEngine::new(schema, settings);
    engine.set_dataset(dataset);

    c.bench_function("compute_5500_rows", |b| {
        b.iter(|| black_box(engine.compute()))
    });
}

fn bench_compute_filtered(c: &mut Criterion) {
    let (schema, mut settings, dataset) = build_inputs(500, 10);
    settings.filter.global = "child 3".to_string();
    let mut engine = TableEngine::new(schema, settings);
    engine.set_dataset(dataset);

    c.bench_function("compute_filtered", |b| {
        b.iter(|| black_box(engine.compute()))
    });
}

criterion_group!(benches, bench_compute, bench_compute_filtered);
criterion_main!(benches);
