use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use mailweave::config::Config;
use mailweave::pipeline::export_archive;

fn main() -> Result<()> {
    println!("--- mailweave: threaded mbox archive exporter ---");

    let config = Config::load();

    let raw_input = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => prompt_for_input()?,
    };
    // drag-and-drop paths arrive quoted
    let cleaned = raw_input.trim().trim_matches('\'').trim_matches('"');
    let input = PathBuf::from(shellexpand::tilde(cleaned).into_owned());

    if !input.exists() {
        anyhow::bail!("Folder not found: {}", input.display());
    }

    let summary = export_archive(&input, &config)?;

    println!(
        "\nIngested {} messages from {} folders into {} conversations ({} skipped)",
        summary.messages, summary.folders, summary.conversations, summary.skipped
    );
    println!("Done! Open: {}", summary.output_dir.join("index.html").display());
    Ok(())
}

fn prompt_for_input() -> Result<String> {
    print!("Drag and drop your mail export folder here: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}
