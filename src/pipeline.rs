use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use rayon::prelude::*;

use crate::config::Config;
use crate::mbox::{discover_folders, read_mbox_records, scan_thread_headers};
use crate::site;
use crate::thread::{
    extract_conversation_key, extract_references, flatten_forest, rank_threads,
    resolve_message_id, Message, ThreadGraph, TIMESTAMP_FALLBACK,
};

pub struct ScanStats {
    /// Per-folder ingested message counts, in enumeration order
    pub folder_counts: Vec<(String, usize)>,
    pub parsed: usize,
    pub skipped: usize,
}

pub struct ExportSummary {
    pub output_dir: PathBuf,
    pub folders: usize,
    pub messages: usize,
    pub skipped: usize,
    pub conversations: usize,
}

/// Ingest every folder under `input` into a thread graph.
///
/// `render` turns a parsed message into its content handle; the stats
/// binary passes a no-op here. Records are parsed and rendered in parallel
/// per folder, but the indexed collect keeps source order, and ingestion
/// itself is sequential: folder labels sort lexicographically and records
/// keep their mbox order, so the order-sensitive linking rules downstream
/// see the same sequence on every run.
pub fn build_graph<F>(input: &Path, render: F) -> Result<(ThreadGraph, ScanStats)>
where
    F: Fn(&mail_parser::Message, &str) -> Result<String> + Sync,
{
    let folders = discover_folders(input);
    let mut graph = ThreadGraph::new();
    let mut stats = ScanStats {
        folder_counts: Vec::new(),
        parsed: 0,
        skipped: 0,
    };
    let skipped = AtomicUsize::new(0);
    let mut next_email_id = 0usize;

    for folder in &folders {
        println!("Processing: {}...", folder.label);
        let records = match read_mbox_records(&folder.mbox_path) {
            Ok(records) => records,
            Err(e) => {
                eprintln!("Error reading {}: {}", folder.label, e);
                continue;
            }
        };

        let base = next_email_id;
        next_email_id += records.len();

        let parsed: Vec<Option<Message>> = records
            .par_iter()
            .enumerate()
            .map(|(i, raw)| {
                let email_id = format!("msg_{}", base + i);
                match build_message(raw, &email_id, &folder.label, &render) {
                    Ok(msg) => Some(msg),
                    Err(e) => {
                        eprintln!("Skipping record {} in {}: {}", i, folder.label, e);
                        skipped.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                }
            })
            .collect();

        let mut count = 0;
        for msg in parsed.into_iter().flatten() {
            graph.ingest(msg);
            count += 1;
        }
        stats.folder_counts.push((folder.label.clone(), count));
        stats.parsed += count;
    }

    stats.skipped = skipped.load(Ordering::Relaxed);
    Ok((graph, stats))
}

fn build_message<F>(raw: &[u8], email_id: &str, folder: &str, render: &F) -> Result<Message>
where
    F: Fn(&mail_parser::Message, &str) -> Result<String> + Sync,
{
    let parsed = mail_parser::MessageParser::default()
        .parse(raw)
        .ok_or_else(|| anyhow::anyhow!("unparseable message"))?;

    let headers = scan_thread_headers(raw);
    let timestamp = parsed
        .date()
        .map(|d| d.to_timestamp())
        .unwrap_or(TIMESTAMP_FALLBACK);
    let subject = parsed.subject().unwrap_or("(No Subject)").to_string();
    let sender = site::sender_display(&parsed);
    let content_path = render(&parsed, email_id)?;

    Ok(Message {
        id: resolve_message_id(headers.message_id.as_deref(), &subject, timestamp),
        subject,
        sender,
        date: headers.date.clone().unwrap_or_default(),
        timestamp,
        folder: folder.to_string(),
        references: extract_references(
            headers.references.as_deref(),
            headers.in_reply_to.as_deref(),
        ),
        conversation_key: extract_conversation_key(headers.thread_index.as_deref()),
        content_path,
    })
}

/// One-shot export: ingest, link, flatten, rank, write the archive.
/// An existing archive directory is replaced.
pub fn export_archive(input: &Path, config: &Config) -> Result<ExportSummary> {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let output_dir = parent.join(&config.output_dir_name);
    if output_dir.exists() {
        fs::remove_dir_all(&output_dir)?;
    }
    let data_dir = output_dir.join("data");
    fs::create_dir_all(&data_dir)?;

    let (mut graph, stats) = build_graph(input, |parsed, email_id| {
        site::render_message_page(parsed, email_id, &data_dir)
    })?;

    graph.link_references();
    graph.link_conversation_keys();

    let mut threads = flatten_forest(&graph);
    rank_threads(&mut threads);

    site::write_index(&threads, &stats.folder_counts, config, &output_dir)?;
    site::write_manifest(&threads, &output_dir)?;

    Ok(ExportSummary {
        output_dir,
        folders: stats.folder_counts.len(),
        messages: stats.parsed,
        skipped: stats.skipped,
        conversations: threads.len(),
    })
}
