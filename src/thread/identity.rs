use sha2::{Digest, Sha256};

/// Prefix marking identifiers that were synthesized rather than declared
pub const SYNTHETIC_PREFIX: &str = "synth-";

/// Resolve a stable identifier for a message.
///
/// Declared Message-IDs are trimmed and stripped of one layer of angle
/// brackets. Messages without a usable Message-ID get a deterministic
/// synthetic identifier hashed from subject and timestamp, so the same
/// input always resolves the same way across runs.
pub fn resolve_message_id(raw: Option<&str>, subject: &str, timestamp: i64) -> String {
    if let Some(raw) = raw {
        let id = strip_angle_brackets(raw);
        if !id.is_empty() {
            return id;
        }
    }
    synthesize_id(subject, timestamp)
}

/// Extract message ID from angle brackets: <foo@bar.com> -> foo@bar.com
pub fn strip_angle_brackets(s: &str) -> String {
    let s = s.trim();
    if s.starts_with('<') && s.ends_with('>') && s.len() >= 2 {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

fn synthesize_id(subject: &str, timestamp: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(subject.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{:02x}", byte));
    }
    format!("{}{}", SYNTHETIC_PREFIX, hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_id_is_trimmed_and_unwrapped() {
        assert_eq!(
            resolve_message_id(Some("  <abc@example.com>  "), "subj", 100),
            "abc@example.com"
        );
        assert_eq!(
            resolve_message_id(Some("plain@example.com"), "subj", 100),
            "plain@example.com"
        );
    }

    #[test]
    fn missing_id_synthesizes_deterministically() {
        let a = resolve_message_id(None, "Hello", 1_700_000_000);
        let b = resolve_message_id(None, "Hello", 1_700_000_000);
        assert_eq!(a, b);
        assert!(a.starts_with(SYNTHETIC_PREFIX));
        assert!(a.len() > SYNTHETIC_PREFIX.len());
    }

    #[test]
    fn empty_brackets_fall_back_to_synthesis() {
        let id = resolve_message_id(Some("<>"), "Hello", 5);
        assert!(id.starts_with(SYNTHETIC_PREFIX));
    }

    #[test]
    fn different_inputs_synthesize_different_ids() {
        let a = resolve_message_id(None, "Hello", 100);
        let b = resolve_message_id(None, "Hello", 101);
        let c = resolve_message_id(None, "Goodbye", 100);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
