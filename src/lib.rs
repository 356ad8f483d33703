//! Red-black tree over an index arena.
//!
//! Every absent child, and the parent of the root, is the per-tree sentinel [`Redwood::NIL`]: a
//! permanently black slot without a key. Nodes are addressed through [`NodeIndex`] handles that
//! compare by identity, so "not found" is reported by returning the sentinel handle.
//!
//! ```
//! use redwood::Redwood;
//!
//! let mut tree = Redwood::<u32>::new();
//! for key in [10, 20, 30] {
//!     tree.insert_key(key);
//! }
//!
//! assert_eq!(tree.key(tree.root()), Some(&20));
//! assert!(tree.check_invariants());
//! assert_eq!(tree.search(&40), tree.nil());
//! ```

extern crate alloc;

mod augment;
mod check;
mod error;
mod iter;
mod map;
mod node;

use alloc::vec::Vec;
use core::cmp::Ordering;

use log::{debug, trace};

pub use augment::{Augment, SubtreeSize};
pub use check::Violation;
pub use error::{RedwoodError, Result};
pub use iter::{RedwoodIter, RedwoodNodes};
pub use map::RedwoodMap;
pub use node::{Color, NodeIndex, RedwoodNode};

use node::{Entry, Side};

/*
removed nodes leave a vacant cell behind. vacant cells are chained in a linked list whose head is
stored in `free`:
- to get a new cell, use the head of the list, new head is head = storage[head].parent
- to free a cell, set storage[cell].parent = head, and then head = cell
*/

#[derive(Debug)]
pub struct Redwood<K: Ord, A = ()> {
    storage: Vec<RedwoodNode<K, A>>,
    root: NodeIndex,
    free: NodeIndex,
    len: usize,
}

impl<K: Ord, A: Augment<K>> Redwood<K, A> {
    pub const NIL: NodeIndex = NodeIndex(0, 0);

    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tree able to hold `capacity` keys without reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut storage = Vec::with_capacity(capacity + 1);
        storage.push(RedwoodNode::sentinel());

        Self {
            storage,
            root: Self::NIL,
            free: Self::NIL,
            len: 0,
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every key. Slots are kept as vacant cells so that handles taken before the
    /// clear stay detectably stale.
    pub fn clear(&mut self) {
        self.storage[0] = RedwoodNode::sentinel();
        self.root = Self::NIL;
        self.free = Self::NIL;
        self.len = 0;

        for slot in (1..self.storage.len()).rev() {
            let free_head = self.free;
            let cell = &mut self.storage[slot];

            cell.entry = None;
            cell.color = Color::Black;
            cell.left = Self::NIL;
            cell.right = Self::NIL;
            cell.parent = free_head;

            self.free = NodeIndex(slot, cell.generation);
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    #[must_use]
    pub fn nil(&self) -> NodeIndex {
        Self::NIL
    }

    #[must_use]
    pub fn is_nil(&self, node: NodeIndex) -> bool {
        node == Self::NIL
    }

    /// Read-only view of a slot. Reading never mutates the tree, so a walker may call this as
    /// often as it likes.
    ///
    /// # Panics
    ///
    /// Panics if `node` is neither the sentinel nor a live node of this tree, including a
    /// handle whose node has since been removed.
    #[must_use]
    pub fn node(&self, node: NodeIndex) -> &RedwoodNode<K, A> {
        assert!(
            node == Self::NIL || self.is_live(node),
            "{node} is not a live node of this tree"
        );

        self.get_node_by_idx(node)
    }

    /// Key stored at `node`, `None` for the sentinel.
    ///
    /// # Panics
    ///
    /// Panics on a stale handle, like [`node`](Self::node).
    #[must_use]
    pub fn key(&self, node: NodeIndex) -> Option<&K> {
        self.node(node).key()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.search(key) != Self::NIL
    }

    /// Looks `key` up from the root. Returns the sentinel if it is absent.
    #[must_use]
    pub fn search(&self, key: &K) -> NodeIndex {
        self.search_from(key, self.root)
    }

    #[must_use]
    pub fn search_from(&self, key: &K, from: NodeIndex) -> NodeIndex {
        let mut current_node = from;

        while current_node != Self::NIL {
            let curr_node_storage = self.get_node_by_idx(current_node);

            match key.cmp(self.key_of(current_node)) {
                Ordering::Less => {
                    current_node = curr_node_storage.left;
                }
                Ordering::Equal => {
                    return current_node;
                }
                Ordering::Greater => {
                    current_node = curr_node_storage.right;
                }
            }
        }

        Self::NIL
    }

    #[must_use]
    pub fn minimum(&self) -> Option<NodeIndex> {
        (self.root != Self::NIL).then(|| self.minimum_in(self.root))
    }

    #[must_use]
    pub fn maximum(&self) -> Option<NodeIndex> {
        (self.root != Self::NIL).then(|| self.maximum_in(self.root))
    }

    /// Leftmost node of the subtree rooted at `from`.
    ///
    /// # Panics
    ///
    /// Panics if `from` is the sentinel: an empty subtree has no minimum.
    #[must_use]
    pub fn minimum_in(&self, from: NodeIndex) -> NodeIndex {
        assert!(from != Self::NIL, "minimum of an empty subtree");

        let mut current_node = from;
        while self.storage[current_node.0].left != Self::NIL {
            current_node = self.storage[current_node.0].left;
        }

        current_node
    }

    /// Rightmost node of the subtree rooted at `from`.
    ///
    /// # Panics
    ///
    /// Panics if `from` is the sentinel: an empty subtree has no maximum.
    #[must_use]
    pub fn maximum_in(&self, from: NodeIndex) -> NodeIndex {
        assert!(from != Self::NIL, "maximum of an empty subtree");

        let mut current_node = from;
        while self.storage[current_node.0].right != Self::NIL {
            current_node = self.storage[current_node.0].right;
        }

        current_node
    }

    /// In-order successor of `node`, or the sentinel if `node` holds the largest key.
    #[must_use]
    pub fn successor(&self, node: NodeIndex) -> NodeIndex {
        self.assert_live(node);

        let right = self.storage[node.0].right;
        if right != Self::NIL {
            return self.minimum_in(right);
        }

        let mut child = node;
        let mut parent = self.storage[node.0].parent;
        while parent != Self::NIL && self.storage[parent.0].right == child {
            child = parent;
            parent = self.storage[parent.0].parent;
        }

        parent
    }

    /// In-order predecessor of `node`, or the sentinel if `node` holds the smallest key.
    #[must_use]
    pub fn predecessor(&self, node: NodeIndex) -> NodeIndex {
        self.assert_live(node);

        let left = self.storage[node.0].left;
        if left != Self::NIL {
            return self.maximum_in(left);
        }

        let mut child = node;
        let mut parent = self.storage[node.0].parent;
        while parent != Self::NIL && self.storage[parent.0].left == child {
            child = parent;
            parent = self.storage[parent.0].parent;
        }

        parent
    }

    pub fn insert_key(&mut self, key: K) -> NodeIndex
    where
        A: Default,
    {
        self.insert_node(RedwoodNode::with_payload(key, A::default()))
    }

    /// Attaches a detached node and rebalances. Keys equal to existing ones are placed after
    /// them in order.
    ///
    /// Returns the handle of the new node.
    pub fn insert_node(&mut self, mut node: RedwoodNode<K, A>) -> NodeIndex {
        let mut current_node = self.root;
        let mut parent_node = Self::NIL;
        let mut side = Side::Left;

        {
            let Some(entry) = node.entry.as_ref() else {
                panic!("cannot insert a node without a key");
            };

            while current_node != Self::NIL {
                parent_node = current_node;
                let curr_node_storage = &self.storage[current_node.0];

                if entry.key < *self.key_of(current_node) {
                    side = Side::Left;
                    current_node = curr_node_storage.left;
                } else {
                    side = Side::Right;
                    current_node = curr_node_storage.right;
                }
            }
        }

        node.color = Color::Red;
        node.parent = parent_node;
        node.left = Self::NIL;
        node.right = Self::NIL;

        let new_node_pos = self.allocate(node);

        if parent_node == Self::NIL {
            self.root = new_node_pos;
        } else {
            self.set_child(parent_node, side, new_node_pos);
        }
        self.len += 1;

        self.refresh_upward(new_node_pos);
        self.fix_red_violation(new_node_pos);

        new_node_pos
    }

    /// Removes one node holding `key` and returns the key it held.
    ///
    /// A failed deletion leaves the tree untouched.
    pub fn delete_key(&mut self, key: &K) -> Result<K> {
        let node = self.search(key);

        if node == Self::NIL {
            debug!("delete: key not present in a tree of {} nodes", self.len);
            return Err(RedwoodError::NotFound);
        }

        self.delete_node(node).map(|(key, _)| key)
    }

    /// Removes the entry stored at `node` and returns it.
    ///
    /// When `node` has a left subtree, its in-order predecessor's entry is moved into `node`
    /// and the predecessor's slot is the one released, so the predecessor's handle goes stale
    /// while `node` stays live.
    pub fn delete_node(&mut self, node: NodeIndex) -> Result<(K, A)> {
        if !self.is_live(node) {
            return Err(RedwoodError::DetachedNode(node));
        }

        let left = self.storage[node.0].left;
        let leaf = if left != Self::NIL {
            let predecessor = self.maximum_in(left);
            self.swap_entries(node, predecessor);
            predecessor
        } else {
            node
        };

        let parent = self.storage[leaf.0].parent;
        let leaf_storage = &self.storage[leaf.0];
        let child = if leaf_storage.left != Self::NIL {
            leaf_storage.left
        } else {
            leaf_storage.right
        };
        let removed_black = leaf_storage.is_black();

        if child != Self::NIL {
            self.storage[child.0].parent = parent;
        }

        let side = if parent == Self::NIL {
            self.root = child;
            None
        } else {
            let side = self.side_of(leaf);
            self.set_child(parent, side, child);
            Some(side)
        };

        let entry = self.release(leaf);
        self.len -= 1;
        self.refresh_upward(parent);

        if removed_black {
            if self.is_red(child) {
                self.storage[child.0].color = Color::Black;
            } else if let Some(side) = side {
                self.fix_black_violation(parent, side);
            }
        }

        let root = self.root;
        self.storage[root.0].color = Color::Black;
        debug_assert!(self.lone_root_child_is_red());

        Ok((entry.key, entry.payload))
    }

    /// Left rotation around `center`: its right child takes its place and `center` becomes that
    /// child's left child. In-order sequence is preserved; colors are not touched, so the caller
    /// is responsible for any red-black property this breaks.
    ///
    /// # Panics
    ///
    /// Panics if `center` is not a live node or has no right child.
    pub fn rotate_left(&mut self, center: NodeIndex) {
        self.assert_live(center);

        let grandparent_idx = self.storage[center.0].parent;
        let sibling_idx = self.storage[center.0].right;
        assert!(
            sibling_idx != Self::NIL,
            "left rotation around {center} without a right child"
        );
        trace!("rotate left around {center}");

        let c_idx = self.storage[sibling_idx.0].left;

        self.storage[center.0].right = c_idx;
        if c_idx != Self::NIL {
            self.storage[c_idx.0].parent = center;
        }

        self.storage[sibling_idx.0].left = center;
        self.storage[center.0].parent = sibling_idx;
        self.storage[sibling_idx.0].parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, sibling_idx);

        self.refresh(center);
        self.refresh(sibling_idx);
    }

    /// Mirror image of [`rotate_left`](Self::rotate_left).
    ///
    /// # Panics
    ///
    /// Panics if `center` is not a live node or has no left child.
    pub fn rotate_right(&mut self, center: NodeIndex) {
        self.assert_live(center);

        let grandparent_idx = self.storage[center.0].parent;
        let sibling_idx = self.storage[center.0].left;
        assert!(
            sibling_idx != Self::NIL,
            "right rotation around {center} without a left child"
        );
        trace!("rotate right around {center}");

        let c_idx = self.storage[sibling_idx.0].right;

        self.storage[center.0].left = c_idx;
        if c_idx != Self::NIL {
            self.storage[c_idx.0].parent = center;
        }

        self.storage[sibling_idx.0].right = center;
        self.storage[center.0].parent = sibling_idx;
        self.storage[sibling_idx.0].parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, sibling_idx);

        self.refresh(center);
        self.refresh(sibling_idx);
    }

    fn rotate(&mut self, center: NodeIndex, direction: Side) {
        match direction {
            Side::Left => self.rotate_left(center),
            Side::Right => self.rotate_right(center),
        }
    }

    fn fix_red_violation(&mut self, start_node_idx: NodeIndex) {
        let mut curr_node = start_node_idx;

        while self.is_red(self.storage[curr_node.0].parent) {
            let mut parent_idx = self.storage[curr_node.0].parent;
            let grandparent_idx = self.storage[parent_idx.0].parent;

            if grandparent_idx == Self::NIL {
                self.storage[parent_idx.0].color = Color::Black;
                break;
            }

            let parent_side = self.side_of(parent_idx);
            let uncle = self.child(grandparent_idx, parent_side.opposite());

            if self.is_red(uncle) {
                trace!("insert fixup: red uncle {uncle}, recolor {grandparent_idx}");
                self.storage[parent_idx.0].color = Color::Black;
                self.storage[uncle.0].color = Color::Black;
                self.storage[grandparent_idx.0].color = Color::Red;

                curr_node = grandparent_idx;
                continue;
            }

            if self.side_of(curr_node) != parent_side {
                trace!("insert fixup: straighten bent path at {parent_idx}");
                self.rotate(parent_idx, parent_side);

                curr_node = parent_idx;
                parent_idx = self.storage[curr_node.0].parent;
            }

            trace!("insert fixup: rotate grandparent {grandparent_idx}");
            self.storage[parent_idx.0].color = Color::Black;
            self.storage[grandparent_idx.0].color = Color::Red;
            self.rotate(grandparent_idx, parent_side.opposite());
        }

        let root = self.root;
        self.storage[root.0].color = Color::Black;
    }

    /// Resolves the missing black left in the `side` slot of `parent_idx` by a black node
    /// removal.
    fn fix_black_violation(&mut self, mut parent_idx: NodeIndex, mut side: Side) {
        while parent_idx != Self::NIL {
            let mut sibling_idx = self.child(parent_idx, side.opposite());

            if self.is_red(sibling_idx) {
                trace!("delete fixup: red sibling {sibling_idx}");
                self.storage[sibling_idx.0].color = Color::Black;
                self.storage[parent_idx.0].color = Color::Red;
                self.rotate(parent_idx, side);

                sibling_idx = self.child(parent_idx, side.opposite());
            }

            let near = self.child(sibling_idx, side);
            let far = self.child(sibling_idx, side.opposite());

            if !self.is_red(near) && !self.is_red(far) {
                if sibling_idx != Self::NIL {
                    self.storage[sibling_idx.0].color = Color::Red;
                }

                if self.is_red(parent_idx) {
                    trace!("delete fixup: absorbed by red parent {parent_idx}");
                    self.storage[parent_idx.0].color = Color::Black;
                    return;
                }

                let grandparent_idx = self.storage[parent_idx.0].parent;
                if grandparent_idx == Self::NIL {
                    return;
                }

                trace!("delete fixup: push deficiency above {parent_idx}");
                side = self.side_of(parent_idx);
                parent_idx = grandparent_idx;
                continue;
            }

            if !self.is_red(far) {
                trace!("delete fixup: red near nephew {near}");
                self.storage[near.0].color = Color::Black;
                self.storage[sibling_idx.0].color = Color::Red;
                self.rotate(sibling_idx, side.opposite());

                sibling_idx = self.child(parent_idx, side.opposite());
            }

            trace!("delete fixup: rotate {parent_idx} toward the deficiency");
            let far = self.child(sibling_idx, side.opposite());
            self.storage[sibling_idx.0].color = self.storage[parent_idx.0].color;
            self.storage[parent_idx.0].color = Color::Black;
            self.storage[far.0].color = Color::Black;
            self.rotate(parent_idx, side);

            return;
        }
    }

    fn lone_root_child_is_red(&self) -> bool {
        let root = &self.storage[self.root.0];

        match (root.left == Self::NIL, root.right == Self::NIL) {
            (true, false) => self.is_red(root.right),
            (false, true) => self.is_red(root.left),
            _ => true,
        }
    }

    fn allocate(&mut self, mut node: RedwoodNode<K, A>) -> NodeIndex {
        if self.free == Self::NIL {
            node.generation = 0;
            let new_node_pos = NodeIndex(self.storage.len(), 0);
            self.storage.push(node);

            return new_node_pos;
        }

        let slot = self.free.0;
        let generation = self.storage[slot].generation.wrapping_add(1);
        self.free = self.storage[slot].parent;

        node.generation = generation;
        self.storage[slot] = node;

        NodeIndex(slot, generation)
    }

    fn release(&mut self, node: NodeIndex) -> Entry<K, A> {
        let free_head = self.free;
        let slot = &mut self.storage[node.0];

        let Some(entry) = slot.entry.take() else {
            panic!("releasing vacant slot {node}");
        };
        slot.color = Color::Black;
        slot.left = Self::NIL;
        slot.right = Self::NIL;
        slot.parent = free_head;

        self.free = node;

        entry
    }

    fn swap_entries(&mut self, a: NodeIndex, b: NodeIndex) {
        let a_entry = self.storage[a.0].entry.take();
        let b_entry = self.storage[b.0].entry.take();

        self.storage[a.0].entry = b_entry;
        self.storage[b.0].entry = a_entry;
    }

    /// Recomputes the payload summary of `node` from its children.
    fn refresh(&mut self, node: NodeIndex) {
        let Some(mut entry) = self.storage[node.0].entry.take() else {
            return;
        };

        let node_storage = &self.storage[node.0];
        entry.payload.refresh(
            &entry.key,
            self.storage[node_storage.left.0].payload(),
            self.storage[node_storage.right.0].payload(),
        );

        self.storage[node.0].entry = Some(entry);
    }

    fn refresh_upward(&mut self, start: NodeIndex) {
        let mut current_node = start;

        while current_node != Self::NIL {
            self.refresh(current_node);
            current_node = self.storage[current_node.0].parent;
        }
    }

    pub(crate) fn payload_mut(&mut self, node: NodeIndex) -> Option<&mut A> {
        self.storage[node.0].entry.as_mut().map(|e| &mut e.payload)
    }

    pub(crate) fn get_node_by_idx(&self, node: NodeIndex) -> &RedwoodNode<K, A> {
        &self.storage[node.0]
    }

    pub(crate) fn key_of(&self, node: NodeIndex) -> &K {
        match self.storage[node.0].key() {
            Some(key) => key,
            None => panic!("node {node} holds no key"),
        }
    }

    pub(crate) fn is_live(&self, node: NodeIndex) -> bool {
        node != Self::NIL
            && self
                .storage
                .get(node.0)
                .is_some_and(|slot| slot.is_occupied() && slot.generation == node.1)
    }

    fn assert_live(&self, node: NodeIndex) {
        assert!(self.is_live(node), "{node} is not a live node of this tree");
    }

    fn is_red(&self, node: NodeIndex) -> bool {
        self.storage[node.0].is_red()
    }

    fn child(&self, node: NodeIndex, side: Side) -> NodeIndex {
        match side {
            Side::Left => self.storage[node.0].left,
            Side::Right => self.storage[node.0].right,
        }
    }

    fn set_child(&mut self, node: NodeIndex, side: Side, child: NodeIndex) {
        match side {
            Side::Left => self.storage[node.0].left = child,
            Side::Right => self.storage[node.0].right = child,
        }
    }

    /// Side of its parent `node` hangs from. Only meaningful below the root.
    fn side_of(&self, node: NodeIndex) -> Side {
        let parent = self.storage[node.0].parent;

        if self.storage[parent.0].left == node {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn replace_child(&mut self, parent: NodeIndex, old: NodeIndex, new: NodeIndex) {
        if parent == Self::NIL {
            self.root = new;
        } else if self.storage[parent.0].right == old {
            self.storage[parent.0].right = new;
        } else {
            self.storage[parent.0].left = new;
        }
    }
}

impl<K: Ord, A: Augment<K>> Default for Redwood<K, A> {
    fn default() -> Self {
        Self::new()
    }
}
