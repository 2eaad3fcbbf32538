use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use mutbson_core::{Document, Value};

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    workload: String,
    timestamp: String,
    total_ops: u64,
    duration_ms: f64,
    ops_per_sec: f64,
    extra: Extra,
    source_file: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Extra {
    count: u64,
    elements: usize,
    heap_bytes: usize,
}

fn main() {
    let mut count: u64 = 200;
    let mut out_file: Option<PathBuf> = None;
    for arg in env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--count=") {
            count = val.parse().unwrap_or(count);
        } else if let Some(val) = arg.strip_prefix("--out=") {
            out_file = Some(PathBuf::from(val));
        }
    }

    let source = Value::doc((0..count).map(|i| {
        (
            format!("f{i}"),
            Value::doc([("n", Value::Int64(i as i64)), ("s", Value::from("value"))]),
        )
    }));

    let start = Instant::now();
    let doc = Document::from_value(&source).unwrap();
    let exported = doc.to_object().unwrap();
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    assert_eq!(exported, source);

    let output = Output {
        workload: format!("build-export-{}", count),
        timestamp: chrono::Utc::now().to_rfc3339(),
        total_ops: count * 2,
        duration_ms,
        ops_per_sec: if duration_ms > 0.0 {
            (count as f64 * 2.0) / duration_ms * 1000.0
        } else {
            f64::INFINITY
        },
        extra: Extra {
            count,
            elements: doc.element_count(),
            heap_bytes: doc.heap().len(),
        },
        source_file: out_file.as_ref().map(|p| p.display().to_string()),
    };

    let json = serde_json::to_string_pretty(&output).expect("serialize");
    if let Some(path) = out_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdirs");
        }
        fs::write(&path, &json).expect("write output");
    }
    println!("{}", json);
}
