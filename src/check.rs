use log::debug;
use thiserror::Error;

use crate::{Augment, NodeIndex, Redwood};

/// First red-black or structural property found broken by [`Redwood::violation`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    #[error("the sentinel is red")]
    RedSentinel,
    #[error("the root {0} is red")]
    RedRoot(NodeIndex),
    #[error("the root {root} has parent {parent} instead of the sentinel")]
    RootParent { root: NodeIndex, parent: NodeIndex },
    #[error("red node {parent} has red child {child}")]
    RedRedEdge { parent: NodeIndex, child: NodeIndex },
    #[error("subtrees of {node} have black heights {left} and {right}")]
    BlackHeightMismatch {
        node: NodeIndex,
        left: usize,
        right: usize,
    },
    #[error("{child} hangs below {node} but points back to {back}")]
    BrokenParentLink {
        node: NodeIndex,
        child: NodeIndex,
        back: NodeIndex,
    },
    #[error("{node} links to {target}, which is not a live node")]
    DanglingLink { node: NodeIndex, target: NodeIndex },
    #[error("{reachable} nodes are reachable from the root but the tree holds {len}")]
    SizeMismatch { reachable: usize, len: usize },
}

impl<K: Ord, A: Augment<K>> Redwood<K, A> {
    /// `true` iff the tree satisfies every red-black property. Never mutates the tree.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        self.violation().is_none()
    }

    /// Walks the whole tree and reports the first broken property, if any.
    #[must_use]
    pub fn violation(&self) -> Option<Violation> {
        let violation = self.find_violation().err();

        if let Some(violation) = &violation {
            debug!("invariant check failed: {violation}");
        }

        violation
    }

    fn find_violation(&self) -> Result<(), Violation> {
        if self.storage[Self::NIL.0].is_red() {
            return Err(Violation::RedSentinel);
        }

        if self.root == Self::NIL {
            return match self.len {
                0 => Ok(()),
                len => Err(Violation::SizeMismatch { reachable: 0, len }),
            };
        }

        if !self.is_live(self.root) {
            return Err(Violation::DanglingLink {
                node: Self::NIL,
                target: self.root,
            });
        }

        let root = &self.storage[self.root.0];
        if root.is_red() {
            return Err(Violation::RedRoot(self.root));
        }
        if root.parent != Self::NIL {
            return Err(Violation::RootParent {
                root: self.root,
                parent: root.parent,
            });
        }

        let mut reachable = 0;
        self.black_height(self.root, &mut reachable)?;

        if reachable != self.len {
            return Err(Violation::SizeMismatch {
                reachable,
                len: self.len,
            });
        }

        Ok(())
    }

    /// Black height of the subtree at `node`, counting `node` itself.
    fn black_height(&self, node: NodeIndex, reachable: &mut usize) -> Result<usize, Violation> {
        if node == Self::NIL {
            return Ok(1);
        }

        *reachable += 1;
        if *reachable > self.len {
            // a cycle or a node the length counter lost track of
            return Err(Violation::SizeMismatch {
                reachable: *reachable,
                len: self.len,
            });
        }

        let node_storage = &self.storage[node.0];

        for child in [node_storage.left, node_storage.right] {
            if child == Self::NIL {
                continue;
            }

            if !self.is_live(child) {
                return Err(Violation::DanglingLink {
                    node,
                    target: child,
                });
            }

            let child_storage = &self.storage[child.0];
            if child_storage.parent != node {
                return Err(Violation::BrokenParentLink {
                    node,
                    child,
                    back: child_storage.parent,
                });
            }

            if node_storage.is_red() && child_storage.is_red() {
                return Err(Violation::RedRedEdge {
                    parent: node,
                    child,
                });
            }
        }

        let left = self.black_height(node_storage.left, reachable)?;
        let right = self.black_height(node_storage.right, reachable)?;

        if left != right {
            return Err(Violation::BlackHeightMismatch { node, left, right });
        }

        Ok(left + usize::from(node_storage.is_black()))
    }
}
