use std::collections::{HashMap, HashSet};

use super::identity::SYNTHETIC_PREFIX;
use super::types::{Message, TIMESTAMP_FALLBACK};

/// One node in the thread forest.
///
/// A node exists for every identifier ever observed, either because a real
/// message was ingested under it or because some message referenced it. The
/// latter case is a "ghost": a placeholder for a message we know existed but
/// never saw, kept so reference chains stay connected across gaps.
#[derive(Debug, Clone)]
pub struct ThreadNode {
    pub id: String,
    /// Payload; None for ghosts
    pub message: Option<Message>,
    /// Parent identifier. Set at most once, first writer wins.
    pub parent: Option<String>,
    /// Child identifiers in attach order
    pub children: Vec<String>,
}

impl ThreadNode {
    fn ghost(id: String) -> Self {
        ThreadNode {
            id,
            message: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.message.is_none()
    }
}

/// Identifier-addressed registry of thread nodes plus the two linking passes.
///
/// All messages must be ingested before either pass runs: the reference pass
/// creates ghosts for identifiers it has not seen, and both passes rely on a
/// fully populated registry for their first-writer-wins parent decisions.
/// Ingestion order is recorded and pins every order-dependent choice, so the
/// output is reproducible for a given enumeration of the input.
#[derive(Debug, Default)]
pub struct ThreadGraph {
    nodes: HashMap<String, ThreadNode>,
    /// Real-message identifiers in the order they arrived
    ingestion_order: Vec<String>,
}

impl ThreadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a real message, returning the identifier it was stored under.
    ///
    /// A synthetic identifier that is already occupied by a real message is
    /// disambiguated with an ordinal suffix so both messages survive. A
    /// declared Message-ID collision (the same message delivered to several
    /// folders) keeps the last payload, matching the source archives.
    pub fn ingest(&mut self, mut msg: Message) -> String {
        if msg.id.starts_with(SYNTHETIC_PREFIX) && self.has_real_message(&msg.id) {
            let base = msg.id.clone();
            let mut ordinal = 2;
            loop {
                let candidate = format!("{}-{}", base, ordinal);
                if !self.has_real_message(&candidate) {
                    msg.id = candidate;
                    break;
                }
                ordinal += 1;
            }
        }

        let id = msg.id.clone();
        let node = self
            .nodes
            .entry(id.clone())
            .or_insert_with(|| ThreadNode::ghost(id.clone()));
        let overwrite = node.message.is_some();
        node.message = Some(msg);
        if !overwrite {
            self.ingestion_order.push(id.clone());
        }
        id
    }

    fn has_real_message(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| n.message.is_some())
    }

    fn ensure_node(&mut self, id: &str) {
        if !self.nodes.contains_key(id) {
            self.nodes
                .insert(id.to_string(), ThreadNode::ghost(id.to_string()));
        }
    }

    pub fn node(&self, id: &str) -> Option<&ThreadNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn message_count(&self) -> usize {
        self.ingestion_order.len()
    }

    pub fn ghost_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_ghost()).count()
    }

    /// Make `child_id` a child of `parent_id` if the link is admissible.
    ///
    /// No-ops: identical identifiers, a child that already has a parent, a
    /// link that would make a node its own ancestor, or an unknown node.
    /// Calling it again with the same pair changes nothing.
    pub fn attach(&mut self, parent_id: &str, child_id: &str) {
        if parent_id == child_id {
            return;
        }
        if !self.nodes.contains_key(parent_id) || !self.nodes.contains_key(child_id) {
            return;
        }
        if self.nodes[child_id].parent.is_some() {
            return;
        }
        if self.is_ancestor(child_id, parent_id) {
            return;
        }

        if let Some(child) = self.nodes.get_mut(child_id) {
            child.parent = Some(parent_id.to_string());
        }
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            if !parent.children.iter().any(|c| c == child_id) {
                parent.children.push(child_id.to_string());
            }
        }
    }

    /// Walk the parent chain from `node_id`; true if it passes through
    /// `candidate`. Used to refuse links that would close a cycle.
    fn is_ancestor(&self, candidate: &str, node_id: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = Some(node_id);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            if !visited.insert(id) {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent.as_deref());
        }
        false
    }

    /// Pass A: link reference chains, in ingestion order.
    ///
    /// For each message with references `[r0, .., rk]`, ghosts are created
    /// for unseen identifiers, consecutive references are chained, and the
    /// message itself becomes a child of `rk`. Because parents are
    /// first-writer-wins, ingestion order decides which candidate parent
    /// sticks when messages disagree; that ordering dependency is part of
    /// the contract, not an accident.
    pub fn link_references(&mut self) {
        let order = self.ingestion_order.clone();
        for id in order {
            let refs = match self.nodes.get(&id).and_then(|n| n.message.as_ref()) {
                Some(msg) if !msg.references.is_empty() => msg.references.clone(),
                _ => continue,
            };

            for reference in &refs {
                self.ensure_node(reference);
            }
            for pair in refs.windows(2) {
                self.attach(&pair[0], &pair[1]);
            }
            if let Some(nearest) = refs.last() {
                self.attach(nearest, &id);
            }
        }
    }

    /// Pass B: repair orphans that share a vendor conversation key.
    ///
    /// Real messages are grouped by key (groups in first-seen order), each
    /// group of two or more is sorted by timestamp, and adjacent members are
    /// chained. Runs after Pass A and never replaces a parent it set; the
    /// key only reconnects messages whose intermediate reference headers
    /// were stripped.
    pub fn link_conversation_keys(&mut self) {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();

        for id in &self.ingestion_order {
            let key = match self.nodes.get(id).and_then(|n| n.message.as_ref()) {
                Some(msg) => match &msg.conversation_key {
                    Some(key) => key.clone(),
                    None => continue,
                },
                None => continue,
            };
            let slot = *slots.entry(key.clone()).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(id.clone());
        }

        for (_, mut members) in groups {
            if members.len() < 2 {
                continue;
            }
            members.sort_by_key(|id| {
                self.nodes
                    .get(id)
                    .and_then(|n| n.message.as_ref())
                    .map(|m| m.timestamp)
                    .unwrap_or(TIMESTAMP_FALLBACK)
            });
            for pair in members.windows(2) {
                self.attach(&pair[0], &pair[1]);
            }
        }
    }

    /// Forest roots, in the order they are first reached from an ingested
    /// message. Deterministic, and skips subtrees that contain no real
    /// messages at all.
    pub fn roots_in_discovery_order(&self) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut roots = Vec::new();
        for id in &self.ingestion_order {
            let root = self.root_of(id);
            if seen.insert(root.clone()) {
                roots.push(root);
            }
        }
        roots
    }

    fn root_of(&self, id: &str) -> String {
        let mut current = id;
        let mut steps = 0;
        while let Some(parent) = self.nodes.get(current).and_then(|n| n.parent.as_deref()) {
            current = parent;
            steps += 1;
            if steps > self.nodes.len() {
                break; // defensive bound; links are checked for cycles
            }
        }
        current.to_string()
    }
}
