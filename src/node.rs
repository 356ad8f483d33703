use core::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    #[default]
    Red,
    Black,
}

/// Handle to a slot of a [`Redwood`](crate::Redwood) arena.
///
/// Handles compare by identity: two handles are equal iff they designate the same slot in the
/// same generation. A slot's generation is bumped every time it is reused, so a handle kept
/// across the removal of its node never matches the node later stored in that slot. The
/// sentinel has its own handle, [`Redwood::NIL`](crate::Redwood::NIL), which is what lookups
/// return for "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub(crate) usize, pub(crate) u32);

impl NodeIndex {
    /// Slot of the arena this handle designates.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }

    #[must_use]
    pub fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.0, self.1)
    }
}

#[derive(Debug)]
pub(crate) struct Entry<K, A> {
    pub(crate) key: K,
    pub(crate) payload: A,
}

/// A tree cell: an optional entry, a color and three links.
///
/// The sentinel and vacant slots carry no entry. Vacant slots reuse `parent` as the next link
/// of the free list.
#[derive(Debug)]
pub struct RedwoodNode<K, A = ()> {
    pub(crate) entry: Option<Entry<K, A>>,
    pub(crate) generation: u32,
    pub(crate) color: Color,
    pub(crate) parent: NodeIndex,
    pub(crate) left: NodeIndex,
    pub(crate) right: NodeIndex,
}

impl<K> RedwoodNode<K> {
    #[must_use]
    pub fn new(key: K) -> Self {
        Self::with_payload(key, ())
    }
}

impl<K, A> RedwoodNode<K, A> {
    /// Builds a detached red node. Its links are only meaningful once it has been handed to
    /// [`Redwood::insert_node`](crate::Redwood::insert_node).
    #[must_use]
    pub fn with_payload(key: K, payload: A) -> Self {
        Self {
            entry: Some(Entry { key, payload }),
            generation: 0,
            color: Color::Red,
            parent: NodeIndex(0, 0),
            left: NodeIndex(0, 0),
            right: NodeIndex(0, 0),
        }
    }

    pub(crate) fn sentinel() -> Self {
        Self {
            entry: None,
            generation: 0,
            color: Color::Black,
            parent: NodeIndex(0, 0),
            left: NodeIndex(0, 0),
            right: NodeIndex(0, 0),
        }
    }

    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.entry.as_ref().map(|e| &e.key)
    }

    #[must_use]
    pub fn payload(&self) -> Option<&A> {
        self.entry.as_ref().map(|e| &e.payload)
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    #[must_use]
    pub fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    #[must_use]
    pub fn left(&self) -> NodeIndex {
        self.left
    }

    #[must_use]
    pub fn right(&self) -> NodeIndex {
        self.right
    }

    #[must_use]
    pub fn parent(&self) -> NodeIndex {
        self.parent
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.entry.is_some()
    }
}

/// Which child slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, NodeIndex, RedwoodNode, Side};

    #[test]
    pub fn detached_node_is_red() {
        let node = RedwoodNode::new(4);

        assert_eq!(node.key(), Some(&4));
        assert_eq!(node.payload(), Some(&()));
        assert_eq!(node.color(), Color::Red);
        assert!(node.is_red());
    }

    #[test]
    pub fn sentinel_is_black_and_keyless() {
        let nil = RedwoodNode::<u32>::sentinel();

        assert!(nil.is_black());
        assert!(nil.key().is_none());
        assert!(!nil.is_occupied());
        assert_eq!(nil.left(), NodeIndex(0, 0));
        assert_eq!(nil.right(), NodeIndex(0, 0));
    }

    #[test]
    pub fn handles_differ_across_generations() {
        let first = NodeIndex(3, 0);
        let reused = NodeIndex(3, 1);

        assert_ne!(first, reused);
        assert_eq!(first.index(), reused.index());
        assert_eq!(reused.to_string(), "#3.1");
    }

    #[test]
    pub fn sides_are_mirrored() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite().opposite(), Side::Right);
    }
}
