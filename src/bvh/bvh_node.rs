use crate::aabb::Aabb;
use std::ops::Range;

/// A node in a [`Bvh`](super::Bvh) arena.
///
/// Every node covers a contiguous range `first_prim..first_prim + len` of the reordered
/// primitive list. A leaf stores the length of that range in `prim_count`, an internal
/// node stores `0` there and refers to its children by their arena index instead. The
/// range of an internal node is the concatenation of its children's ranges.
///
/// The empty tree is the one exception: its single leaf has `prim_count == 0` and an
/// empty [`Aabb`].
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhNode {
    /// The joint bound of all primitives below this node.
    pub aabb: Aabb,

    /// Arena index of the left child. Only meaningful for internal nodes.
    pub child_l_index: u32,

    /// Arena index of the right child. Only meaningful for internal nodes.
    pub child_r_index: u32,

    /// First slot of this node's range in the reordered primitive list.
    pub first_prim: u32,

    /// Number of primitives held by a leaf, `0` for internal nodes.
    pub prim_count: u32,
}

impl BvhNode {
    /// Creates a leaf over the slots `first_prim..first_prim + prim_count`.
    pub fn leaf(aabb: Aabb, first_prim: u32, prim_count: u32) -> BvhNode {
        BvhNode {
            aabb,
            child_l_index: 0,
            child_r_index: 0,
            first_prim,
            prim_count,
        }
    }

    /// Returns true if this node holds primitives directly.
    ///
    /// The node of an empty tree counts as a leaf even though it holds nothing.
    pub fn is_leaf(&self) -> bool {
        self.prim_count > 0 || (self.child_l_index == 0 && self.child_r_index == 0)
    }

    /// The slots of the reordered primitive list held by this leaf.
    /// Empty for internal nodes.
    pub fn primitive_range(&self) -> Range<usize> {
        let first = self.first_prim as usize;
        first..first + self.prim_count as usize
    }

    /// Turns this leaf into an internal node with the given children.
    pub(crate) fn make_internal(&mut self, child_l_index: u32, child_r_index: u32) {
        self.child_l_index = child_l_index;
        self.child_r_index = child_r_index;
        self.prim_count = 0;
    }

    /// Returns the arena indices of the children, or `None` for a leaf.
    pub fn children(&self) -> Option<(usize, usize)> {
        if self.is_leaf() {
            None
        } else {
            Some((self.child_l_index as usize, self.child_r_index as usize))
        }
    }
}
