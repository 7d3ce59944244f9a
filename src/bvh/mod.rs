//! This module defines the [`Bvh`], its nodes, the builder and the ray traversal.

mod build;
mod bvh_impl;
mod bvh_node;
mod traverse;

pub use self::build::{partition_by_pivot, sah_cost, BuildOptions, SplitStrategy, MAX_LEAF_PRIMITIVES};
pub use self::bvh_impl::*;
pub use self::bvh_node::*;
pub use self::traverse::*;
