//! Simple inspector: normalizes a JSON file and prints the resulting graph.

use std::fs;

use normcache::model::format_path;
use normcache::{check_graph, Model, Slot, Store};

fn format_slot(slot: &Slot) -> String {
    match slot {
        Slot::Scalar(value) => {
            let text = value.to_string();
            if text.len() > 60 {
                let preview: String = text.chars().take(60).collect();
                format!("{}...", preview)
            } else {
                text
            }
        }
        Slot::Empty(marker) => format!("EMPTY({:?})", marker),
    }
}

fn print_model(model: &Model) {
    println!("{}", model.store_id());

    let mut parents: Vec<_> = model.parents().iter().map(ToString::to_string).collect();
    parents.sort();
    if !parents.is_empty() {
        println!("    parents: {}", parents.join(", "));
    }
    for (path, child) in model.refs().iter() {
        println!("    ref  {} -> {}", format_path(path), child);
    }
    for (path, slot) in model.template().slots().iter().take(8) {
        println!("    leaf {} = {}", format_path(path), format_slot(slot));
    }
    if model.template().len() > 8 {
        println!("    ... and {} more leaves", model.template().len() - 8);
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/payload.json".to_string());

    println!("Reading: {}", path);

    let text = fs::read_to_string(&path).expect("Failed to read file");
    let payload: serde_json::Value = serde_json::from_str(&text).expect("Failed to parse JSON");

    let mut store = Store::default();
    let normalized = store.parse(&payload).expect("Failed to normalize");

    println!("\n=== Payload ===");
    println!("Root refs: {}", normalized.refs.len());
    println!("Root leaves: {}", normalized.template.len());

    println!("\n=== Entities ({}) ===", store.len());
    let mut models: Vec<&Model> = store.models().collect();
    models.sort_by(|a, b| a.store_id().cmp(b.store_id()));
    for model in models {
        print_model(model);
    }

    match check_graph(&store) {
        Ok(()) => println!("\nGraph: consistent"),
        Err(err) => println!("\nGraph: {}", err),
    }

    let joined = store
        .join_refs(&normalized.template, &normalized.refs)
        .expect("Failed to join");
    println!("\n=== Rejoined ===");
    println!(
        "{}",
        serde_json::to_string_pretty(&*joined).expect("Failed to render")
    );
    println!("Matches input: {}", *joined == payload);
}
