#![cfg_attr(feature = "bench", feature(test))]
#![warn(missing_docs)]
//! A crate which exports rays, axis-aligned bounding boxes, and a build-once binary
//! bounding volume hierarchy with nearest-hit ray queries.
//!
//! ## About
//!
//! The [`Bvh`] is built top-down over a slice of caller-owned [`Primitive`]s. Every
//! split is chosen by an exhaustive Surface Area Heuristic search over all primitive
//! centroids of a node (or, optionally, at the midpoint of the longest axis). Nodes
//! live in a flat arena and reference their children by index. Queries walk the tree
//! iteratively, nearest child first, and thread a single "best distance so far"
//! through the leaves, so the result is the nearest hit along the ray.
//!
//! This is intended for picking and small ray tracing workloads where a tree is built
//! once and queried many times.
//!
//! ## Example
//!
//! ```
//! use sahbvh::bvh::Bvh;
//! use sahbvh::ray::Ray;
//! use sahbvh::shapes::Triangle;
//! use sahbvh::{Point3, Real, Vector3};
//!
//! let triangles = vec![
//!     Triangle::new(
//!         Point3::new(-2.5, -0.5, 0.0),
//!         Point3::new(-1.5, -0.5, 0.0),
//!         Point3::new(-2.0, 0.5, 0.0),
//!     ),
//!     Triangle::new(
//!         Point3::new(1.5, -0.5, 0.0),
//!         Point3::new(2.5, -0.5, 0.0),
//!         Point3::new(2.0, 0.5, 0.0),
//!     ),
//! ];
//!
//! let bvh = Bvh::build(&triangles);
//! let ray = Ray::new(Point3::new(-2.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
//!
//! let mut t = Real::INFINITY;
//! assert!(bvh.intersect(&ray, Some(&mut t)));
//! assert!((t - 5.0).abs() < 1e-5);
//!
//! let hit = bvh.closest_hit(&ray).unwrap();
//! assert_eq!(hit.primitive_index, 0);
//! ```
//!
//! ## Features
//!
//! - `rayon` (default **enabled**) - answers [`Bvh::intersect_batch`] with a parallel iterator
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize` implementations for
//!   boxes, nodes and build options
//! - `f64` (default **disabled**) - switches [`Real`] from `f32` to `f64`
//!
//! [`Bvh`]: bvh/struct.Bvh.html
//! [`Bvh::intersect_batch`]: bvh/struct.Bvh.html#method.intersect_batch
//! [`Primitive`]: primitive/trait.Primitive.html
//!

#[cfg(all(feature = "bench", test))]
extern crate test;

#[cfg(feature = "f64")]
/// Float type used by this crate.
pub type Real = f64;

#[cfg(not(feature = "f64"))]
/// Float type used by this crate.
pub type Real = f32;

/// Point math type used by this crate. Type alias for [`nalgebra::Point3`].
pub type Point3 = nalgebra::Point3<Real>;

/// Vector math type used by this crate. Type alias for [`nalgebra::Vector3`].
pub type Vector3 = nalgebra::Vector3<Real>;

/// Tolerance of the ray/triangle test. Guards the parallel-ray determinant, the
/// barycentric bounds and the minimal accepted hit distance.
pub const EPSILON: Real = 0.000001;

pub mod aabb;
pub mod axis;
pub mod bvh;
pub mod error;
pub mod primitive;
pub mod ray;
pub mod shapes;
mod utils;

#[cfg(test)]
mod testbase;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
