//! Consistent Hash Ring
//!
//! Maps keys to node identifiers. Each real node is placed on the ring at
//! `replicas` virtual positions, `hash("{i}{node}")` for `i in 0..replicas`.
//! A key belongs to the first position clockwise from `hash(key)`, wrapping
//! around past the largest position.
//!
//! Adding a node only moves the keys that fall between its new positions and
//! their predecessors; everything else keeps its owner.


use std::collections::HashMap;

/// Hash function used to place nodes and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    positions: Vec<u32>,
    owners: HashMap<u32, String>,
    members: Vec<String>,
}

impl HashRing {
    /// Creates an empty ring. `hash` defaults to CRC-32 (IEEE).
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas,
            positions: Vec::new(),
            owners: HashMap::new(),
            members: Vec::new(),
        }
    }

    /// Places each node at `replicas` positions. When two positions collide
    /// the node added last owns it; the position list holds no duplicates.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.positions.len();
        for node in nodes {
            let node = node.as_ref();
            if !self.members.iter().any(|member| member == node) {
                self.members.push(node.to_string());
            }
            self.place(node);
        }
        if self.positions.len() != before {
            self.positions.sort_unstable();
            self.positions.dedup();
        }
    }

    /// Takes `node` off the ring. The remaining nodes are placed again in
    /// their original order, so a position `node` had taken over from a
    /// colliding node goes back to that node.
    pub fn remove(&mut self, node: &str) {
        let before = self.members.len();
        self.members.retain(|member| member != node);
        if self.members.len() == before {
            return;
        }

        self.positions.clear();
        self.owners.clear();
        let members = std::mem::take(&mut self.members);
        for member in &members {
            self.place(member);
        }
        self.members = members;
        self.positions.sort_unstable();
        self.positions.dedup();
    }

    fn place(&mut self, node: &str) {
        for i in 0..self.replicas {
            let position = (self.hash)(format!("{}{}", i, node).as_bytes());
            self.positions.push(position);
            self.owners.insert(position, node.to_string());
        }
    }

    /// Returns the node owning `key`, or `None` when the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.positions.partition_point(|&position| position < hash);
        let position = self.positions[idx % self.positions.len()];
        self.owners.get(&position).map(String::as_str)
    }

    /// Distinct real nodes on the ring, sorted.
    pub fn nodes(&self) -> Vec<String> {
        let mut nodes = self.members.clone();
        nodes.sort();
        nodes
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Number of virtual positions on the ring.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
