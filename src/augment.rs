use crate::{NodeIndex, Redwood};

/// Extra data carried by every node of a [`Redwood`].
///
/// `refresh` is called bottom-up whenever the subtree below a node changes shape: when the node
/// is attached, along the path of a removal and inside every rotation. Implementations that
/// summarize their subtree (sizes, interval maxima) recompute themselves from `left` and `right`,
/// which are `None` where the child is the sentinel.
pub trait Augment<K> {
    fn refresh(&mut self, key: &K, left: Option<&Self>, right: Option<&Self>);
}

impl<K> Augment<K> for () {
    #[inline]
    fn refresh(&mut self, _key: &K, _left: Option<&Self>, _right: Option<&Self>) {}
}

/// Number of nodes in the subtree rooted at the node, the node included.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubtreeSize(usize);

impl SubtreeSize {
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl<K> Augment<K> for SubtreeSize {
    fn refresh(&mut self, _key: &K, left: Option<&Self>, right: Option<&Self>) {
        self.0 = 1 + left.map_or(0, |s| s.0) + right.map_or(0, |s| s.0);
    }
}

impl<K: Ord> Redwood<K, SubtreeSize> {
    /// Node holding the `rank`-th smallest key (zero based), or the sentinel when `rank` is past
    /// the end.
    #[must_use]
    pub fn select(&self, rank: usize) -> NodeIndex {
        let mut remaining = rank;
        let mut current_node = self.root;

        while current_node != Self::NIL {
            let left = self.storage[current_node.0].left;
            let left_size = self.subtree_size(left);

            if remaining < left_size {
                current_node = left;
            } else if remaining == left_size {
                return current_node;
            } else {
                remaining -= left_size + 1;
                current_node = self.storage[current_node.0].right;
            }
        }

        Self::NIL
    }

    /// Number of nodes that come before `node` in order.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    #[must_use]
    pub fn rank(&self, node: NodeIndex) -> usize {
        assert!(self.is_live(node), "{node} is not a live node of this tree");

        let mut rank = self.subtree_size(self.storage[node.0].left);
        let mut child = node;
        let mut parent = self.storage[node.0].parent;

        while parent != Self::NIL {
            if self.storage[parent.0].right == child {
                rank += self.subtree_size(self.storage[parent.0].left) + 1;
            }

            child = parent;
            parent = self.storage[parent.0].parent;
        }

        rank
    }

    fn subtree_size(&self, node: NodeIndex) -> usize {
        self.storage[node.0].payload().map_or(0, |s| s.0)
    }
}
