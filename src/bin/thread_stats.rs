use std::path::PathBuf;

use anyhow::Result;

use mailweave::pipeline::build_graph;
use mailweave::thread::{flatten_forest, rank_threads};

/// Threading diagnostics: builds the graph for an export tree without
/// rendering anything and prints the conversation size distribution.
fn main() -> Result<()> {
    let input = std::env::args()
        .nth(1)
        .map(|arg| PathBuf::from(shellexpand::tilde(&arg).into_owned()))
        .ok_or_else(|| anyhow::anyhow!("usage: thread_stats <mail-export-dir>"))?;

    let (mut graph, stats) = build_graph(&input, |_, _| Ok(String::new()))?;
    graph.link_references();
    graph.link_conversation_keys();

    let mut threads = flatten_forest(&graph);
    rank_threads(&mut threads);

    println!("\nMessages:      {}", stats.parsed);
    println!("Skipped:       {}", stats.skipped);
    println!("Nodes:         {}", graph.node_count());
    println!("Ghost nodes:   {}", graph.ghost_count());
    println!("Conversations: {}", threads.len());

    let size_of = |lo: usize, hi: usize| {
        threads
            .iter()
            .filter(|t| t.len() >= lo && t.len() <= hi)
            .count()
    };
    println!("\nConversation size distribution:");
    println!("  single message: {}", size_of(1, 1));
    println!("  2-5 messages:   {}", size_of(2, 5));
    println!("  6-10 messages:  {}", size_of(6, 10));
    println!("  11-50 messages: {}", size_of(11, 50));
    println!("  50+ messages:   {}", size_of(51, usize::MAX));

    println!("\nLargest conversations:");
    let mut by_size: Vec<_> = threads.iter().collect();
    by_size.sort_by(|a, b| b.len().cmp(&a.len()));
    for thread in by_size.iter().take(10) {
        println!(
            "  {:>4}  {}",
            thread.len(),
            thread.representative().subject
        );
    }

    Ok(())
}
