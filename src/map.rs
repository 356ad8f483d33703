use crate::{Augment, Redwood, RedwoodNode};

#[derive(Debug)]
struct MapValue<V>(V);

impl<K, V> Augment<K> for MapValue<V> {
    fn refresh(&mut self, _key: &K, _left: Option<&Self>, _right: Option<&Self>) {}
}

/// An associative array, storing key-value pairs.
///
/// Uses a Redwood red-black tree carrying the value as node payload. Keys are unique.
#[derive(Debug)]
pub struct RedwoodMap<K: Ord, V> {
    tree: Redwood<K, MapValue<V>>,
}

impl<K: Ord, V> RedwoodMap<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Redwood::new(),
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Inserts a key-value pair. If the key was already present its value is replaced and the
    /// previous one returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let node = self.tree.search(&key);

        if let Some(slot) = self.tree.payload_mut(node) {
            return Some(core::mem::replace(&mut slot.0, value));
        }

        self.tree
            .insert_node(RedwoodNode::with_payload(key, MapValue(value)));

        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let node = self.tree.search(key);

        self.tree.node(node).payload().map(|v| &v.0)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.tree.search(key);

        self.tree.payload_mut(node).map(|v| &mut v.0)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.tree.search(key);

        self.tree.delete_node(node).ok().map(|(_, value)| value.0)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.tree.nodes().filter_map(|node| {
            let node = self.tree.node(node);
            Some((node.key()?, &node.payload()?.0))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<K: Ord, V> Default for RedwoodMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
