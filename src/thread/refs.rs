use super::identity::strip_angle_brackets;

/// Length of the Thread-Index prefix that identifies a conversation.
/// Exchange encodes a GUID plus send time in the first 22 base64 characters;
/// reply blocks are appended after it.
const CONVERSATION_KEY_LEN: usize = 22;

/// Normalize a message's declared ancestry into an ordered identifier list.
///
/// References tokens come first in document order (oldest ancestor first),
/// then the In-Reply-To token, deduplicated keeping the first occurrence.
/// Absent or empty headers yield an empty list; this never fails.
pub fn extract_references(references: Option<&str>, in_reply_to: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    if let Some(refs) = references {
        for token in refs.split_whitespace() {
            push_unique(&mut out, strip_angle_brackets(token));
        }
    }

    if let Some(reply) = in_reply_to {
        // In-Reply-To occasionally carries trailing comment text; take only
        // the first token
        if let Some(token) = reply.split_whitespace().next() {
            push_unique(&mut out, strip_angle_brackets(token));
        }
    }

    out
}

fn push_unique(list: &mut Vec<String>, id: String) {
    if !id.is_empty() && !list.iter().any(|existing| *existing == id) {
        list.push(id);
    }
}

/// Extract the vendor conversation key from a Thread-Index header value.
///
/// Returns the fixed-length conversation prefix, or None when the header is
/// absent or too short to contain one.
pub fn extract_conversation_key(thread_index: Option<&str>) -> Option<String> {
    let value = thread_index?.trim();
    let key = value.get(..CONVERSATION_KEY_LEN)?;
    Some(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_keep_document_order() {
        let refs = extract_references(Some("<a@x> <b@x> <c@x>"), None);
        assert_eq!(refs, vec!["a@x", "b@x", "c@x"]);
    }

    #[test]
    fn in_reply_to_is_appended_last() {
        let refs = extract_references(Some("<a@x> <b@x>"), Some("<c@x>"));
        assert_eq!(refs, vec!["a@x", "b@x", "c@x"]);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let refs = extract_references(Some("<a@x> <b@x> <a@x>"), Some("<b@x>"));
        assert_eq!(refs, vec!["a@x", "b@x"]);
    }

    #[test]
    fn absent_headers_yield_empty_list() {
        assert!(extract_references(None, None).is_empty());
        assert!(extract_references(Some("   "), Some("")).is_empty());
    }

    #[test]
    fn conversation_key_is_fixed_length_prefix() {
        let raw = "AdTvQq0FkLxGhQqrR0aBcDeFgHiJkL+extra-reply-blocks";
        let key = extract_conversation_key(Some(raw)).unwrap();
        assert_eq!(key.len(), 22);
        assert!(raw.starts_with(&key));
    }

    #[test]
    fn short_or_missing_thread_index_yields_none() {
        assert_eq!(extract_conversation_key(None), None);
        assert_eq!(extract_conversation_key(Some("tooshort")), None);
    }
}
