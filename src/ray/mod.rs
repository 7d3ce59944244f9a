//! This module holds the [`Ray`] definition and the standalone ray tests for
//! triangles and axis aligned bounding boxes.
mod intersect;
mod ray_impl;

pub use self::intersect::*;
pub use self::ray_impl::*;
