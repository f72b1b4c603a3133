use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Result;

/// Raw header values the threading engine cares about, captured by a fast
/// scan of the header block. Body and MIME structure are left to
/// `mail-parser` later; this avoids a full parse just to read five headers.
#[derive(Debug, Default, Clone)]
pub struct ThreadHeaders {
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    pub references: Option<String>,
    pub thread_index: Option<String>,
    pub date: Option<String>,
}

/// Split one mbox file into raw message records.
///
/// A record starts at each `From ` separator line; the separator itself is
/// dropped and `>From ` quoting inside bodies is undone (mboxrd style).
pub fn read_mbox_records(path: &Path) -> Result<Vec<Vec<u8>>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut records: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    for line in reader.split(b'\n') {
        let line = line?;
        if line.starts_with(b"From ") {
            if let Some(record) = current.take() {
                records.push(record);
            }
            current = Some(Vec::new());
            continue;
        }
        // content before the first separator is not a message
        let Some(record) = current.as_mut() else {
            continue;
        };
        record.extend_from_slice(unquote_from_line(&line));
        record.push(b'\n');
    }

    if let Some(record) = current.take() {
        if !record.is_empty() {
            records.push(record);
        }
    }

    Ok(records)
}

/// ">>From " -> ">From ", ">From " -> "From "
fn unquote_from_line(line: &[u8]) -> &[u8] {
    let mut rest = line;
    while let Some(stripped) = rest.strip_prefix(b">") {
        if stripped.starts_with(b"From ") {
            return &line[1..];
        }
        rest = stripped;
    }
    line
}

/// Scan the header block for threading headers, folding continuation lines.
/// Stops at the first blank line; never fails, absent headers stay None.
pub fn scan_thread_headers(raw: &[u8]) -> ThreadHeaders {
    let mut headers = ThreadHeaders::default();
    let mut current_name: Option<String> = None;
    let mut current_value = String::new();

    for line in raw.split(|&b| b == b'\n') {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            // continuation of the previous header
            current_value.push(' ');
            current_value.push_str(line.trim());
        } else {
            store_header(&mut headers, current_name.take(), &current_value);
            if let Some(colon) = line.find(':') {
                current_name = Some(line[..colon].to_ascii_lowercase());
                current_value = line[colon + 1..].trim().to_string();
            } else {
                current_value.clear();
            }
        }
    }

    store_header(&mut headers, current_name.take(), &current_value);
    headers
}

fn store_header(headers: &mut ThreadHeaders, name: Option<String>, value: &str) {
    let Some(name) = name else {
        return;
    };
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    match name.as_str() {
        "message-id" => headers.message_id = Some(value.to_string()),
        "in-reply-to" => headers.in_reply_to = Some(value.to_string()),
        "references" => headers.references = Some(value.to_string()),
        "thread-index" => headers.thread_index = Some(value.to_string()),
        "date" => headers.date = Some(value.to_string()),
        _ => {}
    }
}
