use super::graph::ThreadGraph;
use super::types::{Message, Thread};

/// Flatten the linked forest into display-ready conversations.
///
/// Each discovered root is walked depth-first (a node's own message first,
/// then its children in attach order), ghosts contribute nothing, and the
/// collected members are re-sorted chronologically: link topology decides
/// membership, never final order. Subtrees without any real message are
/// dropped.
pub fn flatten_forest(graph: &ThreadGraph) -> Vec<Thread> {
    let mut threads = Vec::new();

    for root in graph.roots_in_discovery_order() {
        let mut messages: Vec<Message> = Vec::new();
        collect_subtree(graph, &root, &mut messages);
        if messages.is_empty() {
            continue;
        }
        // stable, so equal timestamps keep traversal order
        messages.sort_by_key(|m| m.timestamp);

        let folders = messages.iter().map(|m| m.folder.clone()).collect();
        threads.push(Thread { messages, folders });
    }

    threads
}

fn collect_subtree(graph: &ThreadGraph, id: &str, out: &mut Vec<Message>) {
    let Some(node) = graph.node(id) else {
        return;
    };
    if let Some(msg) = &node.message {
        out.push(msg.clone());
    }
    for child in &node.children {
        collect_subtree(graph, child, out);
    }
}

/// Order conversations for presentation: most recently active first.
/// Stable, so threads sharing a timestamp keep their discovery order.
pub fn rank_threads(threads: &mut [Thread]) {
    threads.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::types::Message;

    fn msg(id: &str, timestamp: i64) -> Message {
        Message {
            id: id.to_string(),
            subject: format!("subject {}", id),
            sender: "a@example.com".to_string(),
            date: String::new(),
            timestamp,
            folder: "Inbox".to_string(),
            references: Vec::new(),
            conversation_key: None,
            content_path: String::new(),
        }
    }

    fn msg_with_refs(id: &str, timestamp: i64, refs: &[&str]) -> Message {
        let mut m = msg(id, timestamp);
        m.references = refs.iter().map(|r| r.to_string()).collect();
        m
    }

    fn member_ids(thread: &Thread) -> Vec<&str> {
        thread.messages.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn linear_chain_flattens_chronologically() {
        let mut g = ThreadGraph::new();
        g.ingest(msg("a", 1));
        g.ingest(msg_with_refs("b", 2, &["a"]));
        g.ingest(msg_with_refs("c", 3, &["a", "b"]));
        g.link_references();

        let threads = flatten_forest(&g);
        assert_eq!(threads.len(), 1);
        assert_eq!(member_ids(&threads[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn member_order_ignores_link_topology() {
        // the newest message arrives first and becomes the Pass A survivor's
        // sibling, but output order is still by timestamp
        let mut g = ThreadGraph::new();
        g.ingest(msg_with_refs("late", 30, &["root"]));
        g.ingest(msg_with_refs("early", 10, &["root"]));
        g.ingest(msg("root", 5));
        g.link_references();

        let threads = flatten_forest(&g);
        assert_eq!(threads.len(), 1);
        assert_eq!(member_ids(&threads[0]), vec!["root", "early", "late"]);

        let stamps: Vec<i64> = threads[0].messages.iter().map(|m| m.timestamp).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
    }

    #[test]
    fn ghost_root_thread_contains_only_real_messages() {
        let mut g = ThreadGraph::new();
        g.ingest(msg_with_refs("z", 7, &["ghost-1"]));
        g.link_references();

        let threads = flatten_forest(&g);
        assert_eq!(threads.len(), 1);
        assert_eq!(member_ids(&threads[0]), vec!["z"]);
        assert_eq!(threads[0].representative().id, "z");
    }

    #[test]
    fn every_message_lands_in_exactly_one_thread() {
        let mut g = ThreadGraph::new();
        g.ingest(msg("a", 1));
        g.ingest(msg_with_refs("b", 2, &["a"]));
        g.ingest(msg("solo", 4));
        g.ingest(msg_with_refs("c", 3, &["a", "b"]));
        g.link_references();

        let threads = flatten_forest(&g);
        let mut all: Vec<&str> = threads.iter().flat_map(member_ids).collect();
        all.sort();
        assert_eq!(all, vec!["a", "b", "c", "solo"]);
    }

    #[test]
    fn folders_and_representative_aggregate() {
        let mut g = ThreadGraph::new();
        let mut a = msg("a", 1);
        a.folder = "Inbox".to_string();
        let mut b = msg_with_refs("b", 9, &["a"]);
        b.folder = "Sent".to_string();
        g.ingest(a);
        g.ingest(b);
        g.link_references();

        let threads = flatten_forest(&g);
        let thread = &threads[0];
        assert!(thread.folders.contains("Inbox"));
        assert!(thread.folders.contains("Sent"));
        assert_eq!(thread.representative().id, "b");
        assert_eq!(thread.sort_key(), 9);
    }

    #[test]
    fn ranking_is_most_recent_first_and_stable() {
        let mut g = ThreadGraph::new();
        g.ingest(msg("old", 10));
        g.ingest(msg("tie-a", 50));
        g.ingest(msg("tie-b", 50));
        g.ingest(msg("new", 90));
        g.link_references();

        let mut threads = flatten_forest(&g);
        rank_threads(&mut threads);

        let reps: Vec<&str> = threads.iter().map(|t| t.representative().id.as_str()).collect();
        assert_eq!(reps, vec!["new", "tie-a", "tie-b", "old"]);
    }
}
