use std::fs;
use std::path::Path;

use anyhow::Result;
use mail_parser::{MimeHeaders, PartType};

/// An attachment written next to its message page
struct SavedAttachment {
    name: String,
    is_image: bool,
}

/// Render one message into a standalone page under `data_dir`, writing any
/// attachments alongside it. Returns the content handle (path relative to
/// the archive root) that the index embeds in an iframe.
pub fn render_message_page(
    parsed: &mail_parser::Message,
    email_id: &str,
    data_dir: &Path,
) -> Result<String> {
    let subject = parsed.subject().unwrap_or("(No Subject)");
    let sender = sender_display(parsed);
    let date = parsed
        .date()
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(String::new);

    let attachments = save_attachments(parsed, email_id, data_dir)?;
    let body = extract_body(parsed);

    let mut att_html = String::new();
    let links: String = attachments
        .iter()
        .filter(|a| !a.is_image)
        .map(|a| {
            format!(
                "<li><a href='{}_att/{}' target='_blank'>{}</a></li>",
                email_id,
                urlencoding::encode(&a.name),
                escape_html(&a.name)
            )
        })
        .collect();
    let images: String = attachments
        .iter()
        .filter(|a| a.is_image)
        .map(|a| {
            format!(
                "<img src='{}_att/{}' style='max-width:100%; border:1px solid #000; margin:10px 0;'>",
                email_id,
                urlencoding::encode(&a.name)
            )
        })
        .collect();
    if !links.is_empty() {
        att_html.push_str(&format!(
            "<div class='attachments'><b>Attachments:</b><ul>{}</ul></div>",
            links
        ));
    }
    if !images.is_empty() {
        att_html.push_str(&format!("<div>{}</div>", images));
    }

    let page = format!(
        r#"<!DOCTYPE html><html><head><meta charset="UTF-8">
<style>
    body {{ font-family: "Geneva", sans-serif; padding: 20px; font-size: 14px; }}
    .header {{ border-bottom: 2px solid black; margin-bottom: 20px; background: #f9f9f9; padding: 15px; }}
    h2 {{ margin: 0 0 10px 0; font-size: 18px; }}
    .meta {{ color: #555; margin-bottom: 5px; }}
    .attachments {{ border: 1px dashed #000; padding: 10px; background: #eee; }}
    pre {{ white-space: pre-wrap; font-family: Courier; }}
</style>
</head><body>
<div class="header">
    <h2>{subject}</h2>
    <div class="meta"><b>From:</b> {sender}</div>
    <div class="meta"><b>Date:</b> {date}</div>
</div>
{att_html}
<div>{body}</div>
</body></html>
"#,
        subject = escape_html(subject),
        sender = escape_html(&sender),
        date = escape_html(&date),
        att_html = att_html,
        body = body,
    );

    let page_name = format!("{}.html", email_id);
    fs::write(data_dir.join(&page_name), page)?;
    Ok(format!("data/{}", page_name))
}

/// Display form of the From header: name when present, address otherwise
pub fn sender_display(parsed: &mail_parser::Message) -> String {
    parsed
        .from()
        .and_then(|from| from.first())
        .map(|addr| {
            addr.name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .or(addr.address.as_deref())
                .unwrap_or("Unknown")
                .to_string()
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

/// HTML body if the message has one, otherwise escaped plain text
fn extract_body(parsed: &mail_parser::Message) -> String {
    if let Some(html) = parsed.body_html(0) {
        return html.to_string();
    }
    if let Some(text) = parsed.body_text(0) {
        return format!("<pre>{}</pre>", escape_html(&text));
    }
    "<pre>(No readable text content)</pre>".to_string()
}

fn save_attachments(
    parsed: &mail_parser::Message,
    email_id: &str,
    data_dir: &Path,
) -> Result<Vec<SavedAttachment>> {
    let mut saved: Vec<SavedAttachment> = Vec::new();
    let att_dir = data_dir.join(format!("{}_att", email_id));

    for part in parsed.parts.iter() {
        let content_type = part
            .content_type()
            .map(|ct| format!("{}/{}", ct.ctype(), ct.subtype().unwrap_or("octet-stream")))
            .unwrap_or_default();
        let is_image = content_type.starts_with("image/");

        let filename = part.attachment_name();
        if filename.is_none() && !is_image {
            continue;
        }

        let data: &[u8] = match &part.body {
            PartType::Binary(data) | PartType::InlineBinary(data) => data,
            PartType::Text(text) if filename.is_some() => text.as_bytes(),
            _ => continue,
        };

        let name = match filename {
            Some(name) => name.to_string(),
            None => format!("embedded_{}{}", saved.len(), extension_for(&content_type)),
        };
        let safe_name = clean_filename(&name);

        if saved.is_empty() {
            fs::create_dir_all(&att_dir)?;
        }
        fs::write(att_dir.join(&safe_name), data)?;
        saved.push(SavedAttachment {
            name: safe_name,
            is_image,
        });
    }

    Ok(saved)
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        _ => ".bin",
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Strip path separators and shell-unfriendly characters, cap the length
pub fn clean_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .take(60)
        .collect();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn cleans_unsafe_filenames() {
        assert_eq!(clean_filename("a/b\\c:d.txt"), "a_b_c_d.txt");
        assert_eq!(clean_filename(""), "untitled");
        assert_eq!(clean_filename(&"x".repeat(100)).len(), 60);
    }

    #[test]
    fn renders_plain_text_message_page() {
        let raw = b"From: Alice <alice@example.com>\r\n\
Subject: Greetings\r\n\
Date: Thu, 1 Jan 2026 10:00:00 +0000\r\n\
Content-Type: text/plain\r\n\
\r\n\
Hello <world>\r\n";
        let parsed = mail_parser::MessageParser::default().parse(&raw[..]).unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let handle = render_message_page(&parsed, "msg_0", tmp.path()).unwrap();
        assert_eq!(handle, "data/msg_0.html");

        let page = std::fs::read_to_string(tmp.path().join("msg_0.html")).unwrap();
        assert!(page.contains("Greetings"));
        assert!(page.contains("Alice"));
        assert!(page.contains("Hello &lt;world&gt;"));
    }

    #[test]
    fn sender_display_prefers_name_over_address() {
        let raw = b"From: Alice <alice@example.com>\r\n\r\nhi\r\n";
        let parsed = mail_parser::MessageParser::default().parse(&raw[..]).unwrap();
        assert_eq!(sender_display(&parsed), "Alice");

        let raw = b"From: bob@example.com\r\n\r\nhi\r\n";
        let parsed = mail_parser::MessageParser::default().parse(&raw[..]).unwrap();
        assert_eq!(sender_display(&parsed), "bob@example.com");
    }
}
