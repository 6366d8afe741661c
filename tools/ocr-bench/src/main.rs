//! OCR Benchmark CLI for Mileage Lens.
//!
//! Runs the same tesseract engine and mileage parser the service uses
//! against saved odometer crops.
//!
//! Usage:
//!   cargo run -p ocr-bench -- <crop.jpg>                 Single image
//!   cargo run -p ocr-bench -- --batch <directory>        All images → CSV output
//!   cargo run -p ocr-bench -- ... --lang deu             Other tesseract language

use std::io::Write;
use std::path::{Path, PathBuf};

use mileage_lens_lib::ocr::{parse_mileage, OcrEngine, TesseractEngine};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage:");
        eprintln!("  ocr-bench <crop.jpg> [--lang <lang>]");
        eprintln!("  ocr-bench --batch <directory> [--lang <lang>]");
        std::process::exit(1);
    }

    let lang = flag_value(&args, "--lang").unwrap_or("eng");
    let engine = TesseractEngine::new("tesseract", lang);
    if !engine.warm_up() {
        eprintln!("tesseract is not installed or not on PATH");
        std::process::exit(1);
    }

    if args[1] == "--batch" {
        let Some(dir) = args.get(2) else {
            eprintln!("--batch requires a directory path");
            std::process::exit(1);
        };
        run_batch(&engine, dir);
    } else {
        run_single(&engine, &args[1]);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).map(String::as_str)
}

/// Reads one image and prints the recognised text and mileage.
fn run_single(engine: &TesseractEngine, image_path: &str) {
    let bytes = std::fs::read(image_path).unwrap_or_else(|e| {
        eprintln!("Cannot read {}: {}", image_path, e);
        std::process::exit(1);
    });

    match engine.recognize(&bytes) {
        Ok(output) => {
            println!("text:    {:?}", output.text.trim());
            match parse_mileage(&output.text) {
                Some(m) => println!("mileage: {}", m.digits),
                None => println!("mileage: (not recognised)"),
            }
            eprintln!("--- OCR latency: {:.1}ms ---", output.latency_ms);
        }
        Err(e) => {
            eprintln!("OCR failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Runs every image in a directory and prints CSV plus a summary.
fn run_batch(engine: &TesseractEngine, dir_path: &str) {
    let dir = Path::new(dir_path);
    if !dir.is_dir() {
        eprintln!("Not a directory: {}", dir_path);
        std::process::exit(1);
    }

    let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(read) => read
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == "png" || ext == "jpg" || ext == "jpeg")
                    .unwrap_or(false)
            })
            .collect(),
        Err(e) => {
            eprintln!("Failed to read directory: {}", e);
            std::process::exit(1);
        }
    };
    entries.sort();

    if entries.is_empty() {
        eprintln!("No image files found in {}", dir_path);
        std::process::exit(1);
    }

    println!("filename,mileage,char_count,latency_ms");

    let mut latencies: Vec<f64> = Vec::new();
    let mut recognised = 0usize;

    for image_path in &entries {
        let filename = image_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let bytes = match std::fs::read(image_path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("  WARNING: cannot read {}: {}", filename, e);
                continue;
            }
        };

        match engine.recognize(&bytes) {
            Ok(output) => {
                let mileage = parse_mileage(&output.text);
                if mileage.is_some() {
                    recognised += 1;
                }
                println!(
                    "{},{},{},{:.1}",
                    filename,
                    mileage.map(|m| m.digits).unwrap_or_default(),
                    output.char_count,
                    output.latency_ms
                );
                latencies.push(output.latency_ms);
                std::io::stdout().flush().ok();
            }
            Err(e) => {
                eprintln!("  WARNING: OCR failed for {}: {}", filename, e);
            }
        }
    }

    if !latencies.is_empty() {
        latencies.sort_by(|a, b| a.total_cmp(b));
        let median = latencies[latencies.len() / 2];
        let p99_idx = ((latencies.len() as f64 * 0.99).ceil() as usize).min(latencies.len() - 1);
        let p99 = latencies[p99_idx];
        let avg: f64 = latencies.iter().sum::<f64>() / latencies.len() as f64;

        eprintln!("\n--- Benchmark Summary ---");
        eprintln!("  Images processed: {}", latencies.len());
        eprintln!("  Mileage read:     {}/{}", recognised, latencies.len());
        eprintln!("  Median latency:   {:.1}ms", median);
        eprintln!("  Average latency:  {:.1}ms", avg);
        eprintln!("  P99 latency:      {:.1}ms", p99);
    }
}
