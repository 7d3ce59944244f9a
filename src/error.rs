//! Error types for structural validation of a [`Bvh`](crate::bvh::Bvh).
//!
//! Building and querying never fail. These errors only describe a tree that breaks
//! one of the structural invariants, as reported by
//! [`Bvh::validate`](crate::bvh::Bvh::validate).

use thiserror::Error;

/// The first structural violation found in a BVH.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BvhError {
    /// The node arena holds no root.
    #[error("node arena is empty")]
    EmptyArena,

    /// More nodes than a binary tree over the primitives can have.
    #[error("{nodes} nodes exceed the limit of {limit} for {primitives} primitives")]
    TooManyNodes {
        /// Number of nodes in the arena.
        nodes: usize,
        /// Largest valid node count, `2n - 1` (at least 1).
        limit: usize,
        /// Number of primitives.
        primitives: usize,
    },

    /// An internal node points outside the node arena.
    #[error("node {node} references child {child}, but only {len} nodes exist")]
    ChildOutOfBounds {
        /// The parent node.
        node: usize,
        /// The invalid child index.
        child: usize,
        /// Number of nodes in the arena.
        len: usize,
    },

    /// A node is reachable along more than one path, or is its own ancestor.
    #[error("node {0} is reached more than once")]
    NodeRevisited(usize),

    /// Nodes exist in the arena that cannot be reached from the root.
    #[error("{unreachable} nodes are not reachable from the root")]
    DetachedNodes {
        /// How many nodes were never visited.
        unreachable: usize,
    },

    /// A node covers a different primitive range than its parent assigned to it.
    #[error("node {node} covers primitives {found:?}, expected {expected:?}")]
    RangeMismatch {
        /// The offending node.
        node: usize,
        /// The range the parent (or, for the root, the whole list) assigned.
        expected: std::ops::Range<usize>,
        /// The range stored in the node.
        found: std::ops::Range<usize>,
    },

    /// A child's bound is not contained in its parent's bound.
    #[error("bound of node {child} is not contained in its parent {parent}")]
    ChildOutsideParent {
        /// The parent node.
        parent: usize,
        /// The child node.
        child: usize,
    },

    /// A primitive's bound is not contained in the bound of the leaf holding it.
    #[error("primitive at slot {primitive} is not contained in leaf {node}")]
    PrimitiveOutsideLeaf {
        /// The leaf node.
        node: usize,
        /// Slot of the primitive in the reordered list.
        primitive: usize,
    },

    /// The reordering does not list every input primitive exactly once.
    #[error("input primitive {0} is listed more than once or out of range")]
    DuplicatePrimitive(usize),
}

/// Result type for BVH validation.
pub type Result<T> = std::result::Result<T, BvhError>;
