use std::fs;
use std::path::Path;

use anyhow::Result;

use super::render::escape_html;
use crate::config::Config;
use crate::thread::Thread;

/// Three-pane shell: folder sidebar, conversation list, iframe preview.
/// Theme color tokens are substituted from the config.
const STYLE: &str = r#"<style>
    :root {
        --bg: __BG__;
        --fg: __FG__;
        --pane-bg: __PANE_BG__;
        --border: 2px solid __BORDER__;
        --highlight: __HIGHLIGHT_BG__;
        --highlight-text: __HIGHLIGHT_FG__;
    }
    * { box-sizing: border-box; }
    body, html {
        margin: 0; padding: 0;
        height: 100%; width: 100%;
        font-family: "Geneva", "Verdana", sans-serif;
        background-color: #777;
        background-image: radial-gradient(#999 25%, transparent 25%);
        background-size: 4px 4px;
        overflow: hidden;
    }
    .window {
        display: flex; flex-direction: column;
        height: 100vh; width: 100vw;
        background: var(--bg);
        color: var(--fg);
        border: var(--border);
    }
    .title-bar {
        height: 30px;
        border-bottom: var(--border);
        background: repeating-linear-gradient(0deg, #fff, #fff 2px, #999 2px, #999 4px);
        display: flex; align-items: center; justify-content: center;
        flex-shrink: 0;
    }
    .title-text {
        background: var(--bg);
        padding: 2px 20px;
        border: 1px solid __BORDER__;
        box-shadow: 2px 2px 0 __BORDER__;
        font-weight: bold; font-size: 13px;
    }
    .main-view { display: flex; flex: 1; overflow: hidden; }
    .sidebar {
        width: 220px; min-width: 200px;
        border-right: var(--border);
        background: var(--pane-bg);
        overflow-y: auto;
    }
    .folder-item {
        padding: 8px 12px; cursor: pointer; font-size: 12px;
        border-bottom: 1px dotted #ccc;
        display: flex; justify-content: space-between;
    }
    .folder-item:hover { background: #ccc; }
    .folder-item.active { background: var(--highlight); color: var(--highlight-text); }
    .list-pane {
        width: 380px; min-width: 320px;
        border-right: var(--border);
        background: var(--bg);
        overflow-y: auto;
    }
    .thread-head {
        padding: 6px 10px; font-size: 12px; font-weight: bold;
        background: var(--pane-bg);
        border-bottom: 1px solid #999;
        display: flex; justify-content: space-between;
    }
    .thread-count { color: #555; font-weight: normal; }
    .mail-row {
        padding: 6px 10px 6px 22px; cursor: pointer; font-size: 12px;
        border-bottom: 1px dotted #ccc;
    }
    .mail-row:hover { background: #eee; }
    .mail-row.selected { background: var(--highlight); color: var(--highlight-text); }
    .mail-row-date { font-size: 10px; color: #777; }
    .mail-row.selected .mail-row-date { color: var(--highlight-text); }
    .mail-row-sender { font-weight: bold; }
    .preview-pane { flex: 1; display: flex; background: var(--bg); }
    .preview-placeholder {
        margin: auto; color: #999; font-size: 13px;
    }
    #previewFrame { width: 100%; height: 100%; border: none; display: none; }
</style>"#;

const SCRIPT: &str = r#"<script>
    function filterFolder(folderName, el) {
        document.querySelectorAll('.folder-item').forEach(item => item.classList.remove('active'));
        el.classList.add('active');

        document.querySelectorAll('.thread').forEach(thread => {
            let visible = 0;
            thread.querySelectorAll('.mail-row').forEach(row => {
                const show = folderName === 'all' || row.getAttribute('data-folder') === folderName;
                row.style.display = show ? 'block' : 'none';
                if (show) visible++;
            });
            thread.style.display = visible > 0 ? 'block' : 'none';
        });
    }

    function loadEmail(url, el) {
        document.querySelectorAll('.mail-row').forEach(row => row.classList.remove('selected'));
        el.classList.add('selected');

        document.getElementById('placeholder').style.display = 'none';
        const frame = document.getElementById('previewFrame');
        frame.style.display = 'block';
        frame.src = url;
    }
</script>"#;

/// Write `index.html`: ranked conversations in the list pane, one block per
/// thread with its members in chronological order.
pub fn write_index(
    threads: &[Thread],
    folder_counts: &[(String, usize)],
    config: &Config,
    output_dir: &Path,
) -> Result<()> {
    let total: usize = folder_counts.iter().map(|(_, count)| count).sum();

    let style = STYLE
        .replace("__BG__", &config.theme.bg)
        .replace("__FG__", &config.theme.fg)
        .replace("__PANE_BG__", &config.theme.pane_bg)
        .replace("__BORDER__", &config.theme.border)
        .replace("__HIGHLIGHT_BG__", &config.theme.highlight_bg)
        .replace("__HIGHLIGHT_FG__", &config.theme.highlight_fg);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"><title>");
    html.push_str(&escape_html(&config.title));
    html.push_str("</title>");
    html.push_str(&style);
    html.push_str("</head>\n<body>\n<div class=\"window\">\n");

    html.push_str(&format!(
        "<div class=\"title-bar\"><div class=\"title-text\">{} - {} messages in {} conversations</div></div>\n",
        escape_html(&config.title),
        total,
        threads.len()
    ));

    html.push_str("<div class=\"main-view\">\n<div class=\"sidebar\">\n");
    html.push_str(&format!(
        "<div class=\"folder-item active\" onclick=\"filterFolder('all', this)\"><span>All Mailboxes</span><span>{}</span></div>\n",
        total
    ));
    for (label, count) in folder_counts {
        html.push_str(&format!(
            "<div class=\"folder-item\" onclick=\"filterFolder('{}', this)\"><span>{}</span><span>{}</span></div>\n",
            escape_html(label),
            escape_html(label),
            count
        ));
    }
    html.push_str("</div>\n<div class=\"list-pane\" id=\"emailList\">\n");

    for thread in threads {
        let rep = thread.representative();
        html.push_str("<div class=\"thread\">\n");
        html.push_str(&format!(
            "<div class=\"thread-head\"><span>{}</span><span class=\"thread-count\">{} · {}</span></div>\n",
            escape_html(truncate(&rep.subject, 60)),
            thread.len(),
            escape_html(truncate(&rep.date, 16)),
        ));
        for msg in &thread.messages {
            html.push_str(&format!(
                "<div class=\"mail-row\" data-folder=\"{}\" onclick=\"loadEmail('{}', this)\">\
<div class=\"mail-row-date\">{}</div>\
<div class=\"mail-row-sender\">{}</div>\
<div class=\"mail-row-subject\">{}</div>\
</div>\n",
                escape_html(&msg.folder),
                escape_html(&msg.content_path),
                escape_html(truncate(&msg.date, 16)),
                escape_html(truncate(&msg.sender, 35)),
                escape_html(truncate(&msg.subject, 60)),
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str(
        "</div>\n<div class=\"preview-pane\">\n\
<div id=\"placeholder\" class=\"preview-placeholder\">Select an email to view</div>\n\
<iframe id=\"previewFrame\" name=\"previewFrame\"></iframe>\n\
</div>\n</div>\n</div>\n",
    );
    html.push_str(SCRIPT);
    html.push_str("\n</body>\n</html>\n");

    fs::write(output_dir.join("index.html"), html)?;
    Ok(())
}

/// Machine-readable companion to the index: the ranked thread list with
/// member metadata and content handles.
pub fn write_manifest(threads: &[Thread], output_dir: &Path) -> Result<()> {
    let manifest = serde_json::json!({
        "conversation_count": threads.len(),
        "threads": threads
            .iter()
            .map(|thread| {
                serde_json::json!({
                    "subject": thread.representative().subject,
                    "message_count": thread.len(),
                    "folders": thread.folders,
                    "last_date": thread.representative().date,
                    "messages": thread.messages,
                })
            })
            .collect::<Vec<_>>(),
    });

    fs::write(
        output_dir.join("threads.json"),
        serde_json::to_string_pretty(&manifest)?,
    )?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::Message;
    use std::collections::BTreeSet;

    fn thread_with(ids: &[&str]) -> Thread {
        let messages = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Message {
                id: id.to_string(),
                subject: format!("Subject {}", id),
                sender: "Alice".to_string(),
                date: "2026-01-01".to_string(),
                timestamp: i as i64,
                folder: "Inbox".to_string(),
                references: Vec::new(),
                conversation_key: None,
                content_path: format!("data/{}.html", id),
            })
            .collect();
        Thread {
            messages,
            folders: BTreeSet::from(["Inbox".to_string()]),
        }
    }

    #[test]
    fn index_lists_threads_and_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let threads = vec![thread_with(&["msg_0", "msg_1"]), thread_with(&["msg_2"])];
        let counts = vec![("Inbox".to_string(), 3)];
        let config = Config::default();

        write_index(&threads, &counts, &config, tmp.path()).unwrap();
        let html = fs::read_to_string(tmp.path().join("index.html")).unwrap();

        assert!(html.contains("3 messages in 2 conversations"));
        assert!(html.contains("data/msg_1.html"));
        assert!(html.contains("data-folder=\"Inbox\""));
    }

    #[test]
    fn manifest_serializes_ranked_threads() {
        let tmp = tempfile::tempdir().unwrap();
        let threads = vec![thread_with(&["msg_0"])];

        write_manifest(&threads, tmp.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("threads.json")).unwrap())
                .unwrap();

        assert_eq!(json["conversation_count"], 1);
        assert_eq!(json["threads"][0]["message_count"], 1);
        assert_eq!(
            json["threads"][0]["messages"][0]["content_path"],
            "data/msg_0.html"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
