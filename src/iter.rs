use alloc::vec::Vec;

use crate::{Augment, NodeIndex, Redwood};

/// In-order walk over the handles of a tree, leftmost first.
pub struct RedwoodNodes<'a, K: Ord, A> {
    pub(crate) tree: &'a Redwood<K, A>,
    pub(crate) curr: NodeIndex,
    pub(crate) stack: Vec<NodeIndex>,
}

impl<K: Ord, A: Augment<K>> Iterator for RedwoodNodes<'_, K, A> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr != Redwood::<K, A>::NIL {
            self.stack.push(self.curr);
            self.curr = self.tree.get_node_by_idx(self.curr).left();
        }

        let node = self.stack.pop()?;
        self.curr = self.tree.get_node_by_idx(node).right();

        Some(node)
    }
}

/// Sorted iterator over the keys of a tree.
pub struct RedwoodIter<'a, K: Ord, A> {
    pub(crate) nodes: RedwoodNodes<'a, K, A>,
}

impl<'a, K: Ord, A: Augment<K>> Iterator for RedwoodIter<'a, K, A> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.next()?;

        Some(self.nodes.tree.key_of(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.nodes.tree.len()))
    }
}

impl<K: Ord, A: Augment<K>> Redwood<K, A> {
    #[must_use]
    pub fn iter(&self) -> RedwoodIter<'_, K, A> {
        RedwoodIter { nodes: self.nodes() }
    }

    #[must_use]
    pub fn nodes(&self) -> RedwoodNodes<'_, K, A> {
        RedwoodNodes {
            tree: self,
            curr: self.root,
            stack: Vec::new(),
        }
    }
}

impl<'a, K: Ord, A: Augment<K>> IntoIterator for &'a Redwood<K, A> {
    type Item = &'a K;
    type IntoIter = RedwoodIter<'a, K, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
