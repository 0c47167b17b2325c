//! CLI tool for tableview - computes a view from a JSON document
//!
//! Usage:
//!   tableview_cli <input.json>              # Output view JSON to stdout
//!   tableview_cli <input.json> -o out.json  # Output view JSON to file
//!
//! The input document holds the three engine inputs:
//!   { "schema": {...}, "settings": {...}, "dataset": {...} }
//! `settings` and `dataset` may be omitted.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use serde::Deserialize;
use tableview::engine::TableEngine;
use tableview::types::{Dataset, Schema, Settings};

#[derive(Deserialize)]
struct Input {
    schema: Schema,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    dataset: Dataset,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: tableview_cli <input.json> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    // Read input file
    let data = match fs::read_to_string(input_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    // Parse the input document
    let input: Input = match serde_json::from_str(&data) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error parsing input: {}", e);
            std::process::exit(1);
        }
    };

    // Compute the view
    let mut engine = TableEngine::new(input.schema, input.settings);
    engine.set_dataset(input.dataset);
    let view = engine.compute();

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(&view) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
