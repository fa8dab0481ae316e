/// Print a sample's file listing the way the tracker's files page shows it.
/// Drives the lazy scan directly and writes no artifact.
use spectra_addressbook::listing::SampleFiles;
use spectra_addressbook::sink::MemorySink;
use spectra_addressbook::ScanEvent;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spectra_addressbook=info".parse()?),
        )
        .init();

    let root = std::env::args().nth(1);
    let limit = std::env::args().nth(2).map(|n| n.parse::<usize>()).transpose()?;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 SPECTRA ADDRESS BOOK REPORT                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Root:  {}", root.as_deref().unwrap_or("(not set)"));
    if let Some(limit) = limit {
        println!("Limit: {} rows", limit);
    }
    println!();

    let sink = Arc::new(MemorySink::new());
    let start = std::time::Instant::now();
    let listing = SampleFiles::collect_with_sink(root.as_deref(), limit, sink.clone());
    let duration = start.elapsed();

    if let Some(error) = &listing.error {
        println!("  ✗ {}", error);
        return Ok(());
    }

    println!("┌─ FILES ────────────────────────────────────────────────────┐");
    for row in &listing.files {
        println!("  {:>10.3} GB  {}", row.size_gb, row.location);
    }
    let total_gb: f64 = listing.files.iter().map(|r| r.size_gb).sum();
    println!("└────────────────────────────────────────────────────────────┘");
    println!();

    let warnings = sink.warnings();
    if !warnings.is_empty() {
        println!("┌─ WARNINGS ─────────────────────────────────────────────────┐");
        for event in &warnings {
            match event {
                ScanEvent::Skipped { path, reason } => {
                    println!("  ⚠ skipped ({:?}): {}", reason, path.display())
                }
                ScanEvent::EntryUnreadable { path, message, .. }
                | ScanEvent::DirectoryUnreadable { path, message, .. } => {
                    println!("  ⚠ unreadable: {} ({})", path.display(), message)
                }
                other => println!("  ⚠ {:?}", other),
            }
        }
        println!("└────────────────────────────────────────────────────────────┘");
        println!();
    }

    println!("Summary:");
    println!("  • Rows:      {}", listing.files.len());
    println!("  • Total:     {:.3} GB", total_gb);
    println!("  • Warnings:  {}", warnings.len());
    println!("  • Scan time: {:.2}s", duration.as_secs_f64());

    Ok(())
}
