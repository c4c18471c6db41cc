//! Byte-bounded least-recently-used cache.
//!
//! Entries live in a slot arena and are linked into a recency list by slot
//! index, so promotion and eviction are O(1) without pointer juggling.
//!
//! ```text
//!   index: HashMap<String, usize>        slots: Vec<Option<Node<V>>>
//!
//!   head ─► [k3] ◄──► [k1] ◄──► [k2] ◄── tail
//!           MRU                  LRU (evicted first)
//! ```
//!
//! The cache is not synchronized; wrap it in a lock when sharing it.

use std::collections::HashMap;

/// Values stored in an [`LruCache`] report how many bytes they account for.
pub trait Weighted {
    fn weight(&self) -> usize;
}

impl Weighted for Vec<u8> {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Weighted for String {
    fn weight(&self) -> usize {
        self.len()
    }
}

/// Called with every entry removed by eviction.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

pub struct LruCache<V> {
    max_bytes: usize,
    used_bytes: usize,
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: Weighted> LruCache<V> {
    /// Creates a cache holding at most `max_bytes` of keys plus values.
    /// A budget of 0 disables eviction.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted: None,
        }
    }

    pub fn with_eviction_callback<F>(max_bytes: usize, on_evicted: F) -> Self
    where
        F: FnMut(&str, &V) + Send + 'static,
    {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(Box::new(on_evicted));
        cache
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.move_to_front(id);
        self.slots[id].as_ref().map(|node| &node.value)
    }

    /// Inserts or replaces `key`, then evicts from the tail until the cache
    /// fits its budget again.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&id) = self.index.get(&key) {
            if let Some(node) = self.slots[id].as_mut() {
                self.used_bytes = self.used_bytes - node.value.weight() + value.weight();
                node.value = value;
            }
            self.move_to_front(id);
        } else {
            self.used_bytes += key.len() + value.weight();
            let id = self.alloc(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.attach_front(id);
            self.index.insert(key, id);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    /// Evicts the least recently used entry, firing the eviction callback.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let id = self.tail?;
        let node = self.release(id)?;
        if let Some(callback) = self.on_evicted.as_mut() {
            callback(&node.key, &node.value);
        }
        Some((node.key, node.value))
    }

    /// Removes `key` without treating it as an eviction.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = *self.index.get(key)?;
        self.release(id).map(|node| node.value)
    }

    /// Checks for `key` without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn bytes_used(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            match self.slots[id].as_ref() {
                Some(node) => {
                    keys.push(node.key.clone());
                    cursor = node.next;
                }
                None => break,
            }
        }
        keys
    }

    fn alloc(&mut self, node: Node<V>) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, id: usize) -> Option<Node<V>> {
        self.detach(id);
        let node = self.slots[id].take()?;
        self.free.push(id);
        self.index.remove(&node.key);
        self.used_bytes -= node.key.len() + node.value.weight();
        Some(node)
    }

    fn move_to_front(&mut self, id: usize) {
        if self.head == Some(id) {
            return;
        }
        self.detach(id);
        self.attach_front(id);
    }

    fn detach(&mut self, id: usize) {
        let (prev, next) = match self.slots[id].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.slots[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.slots[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slots[id].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, id: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[id].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head
            && let Some(node) = self.slots[h].as_mut()
        {
            node.prev = Some(id);
        }
        self.head = Some(id);
        if self.tail.is_none() {
            self.tail = Some(id);
        }
    }
}
