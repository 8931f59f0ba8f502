//! Print the properties, metadata and frontal record of a DAFF file.
//!
//! Run with: cargo run -p daff-reader --example inspect -- <file.daff> [options.toml]
//!
//! Set `RUST_LOG=debug` to see per-block parse events.

use daff_reader::{Content, DaffContent, DaffReader, MetadataValue, ReaderOptions, View};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: inspect <file.daff> [options.toml]");
        std::process::exit(2);
    };
    let options = match args.next() {
        Some(options_path) => ReaderOptions::load(options_path)?,
        None => ReaderOptions::default(),
    };

    let mut reader = DaffReader::new();
    if reader.open_with(&path, &options).is_err() {
        eprintln!("{}", reader.last_error().unwrap_or("open failed"));
        std::process::exit(1);
    }
    let file = reader.file()?;

    // --- Properties ---
    println!("{}", file.summary().to_json()?);

    // --- Global metadata ---
    println!("\n=== Metadata ===\n");
    if file.metadata().is_empty() {
        println!("(none)");
    }
    for (key, value) in file.metadata().iter() {
        match value {
            MetadataValue::String(s) => println!("  {key}: \"{s}\""),
            MetadataValue::Bool(b) => println!("  {key}: {b}"),
            MetadataValue::Int(i) => println!("  {key}: {i}"),
            MetadataValue::Float(f) => println!("  {key}: {f}"),
        }
    }

    // --- Frontal record ---
    println!("\n=== Frontal record ===\n");
    let content = file.content();
    let hit = content.nearest_neighbour(View::Object, 0.0, 0.0);
    let (alpha, beta) = content.record_coords(hit.record, View::Data)?;
    println!(
        "record {} at alpha {:.1}°, beta {:.1}°{}",
        hit.record,
        alpha.to_degrees(),
        beta.to_degrees(),
        if hit.out_of_bounds { " (out of bounds)" } else { "" }
    );

    for channel in 0..content.num_channels() {
        let data = content.data(hit.record, channel)?;
        let peak = data.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        let label = file.properties().channel_label(channel).unwrap_or("-");
        println!("  channel {channel} ({label}): {} values, peak {peak:.4}", data.len());
    }

    if let Content::Ir(ir) = content {
        println!(
            "\neffective window: offset {} length {}",
            ir.min_effective_offset(),
            ir.max_effective_length()
        );
    }

    Ok(())
}
