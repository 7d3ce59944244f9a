//! This module defines the [`Bvh`] itself: construction, inspection and
//! structural validation.

use crate::aabb::{Aabb, Bounded};
use crate::bvh::build::{build_nodes, BuildOptions};
use crate::bvh::BvhNode;
use crate::error::{BvhError, Result};
use crate::primitive::Primitive;
use crate::EPSILON;
use std::fmt;
use std::ops::Range;
use std::time::Instant;

/// A bounding volume hierarchy over borrowed primitives.
///
/// The tree is built once and is immutable afterwards. It stores a flat arena of
/// [`BvhNode`]s, with the root at index `0`, and a reordered list of references to
/// the caller's primitives. Every node covers a contiguous range of that list.
///
/// A `Bvh` can be shared between threads for concurrent queries whenever the
/// primitives can.
pub struct Bvh<'p, P> {
    pub(crate) nodes: Vec<BvhNode>,
    pub(crate) primitives: Vec<&'p P>,
    pub(crate) primitive_indices: Vec<usize>,
}

impl<'p, P: Primitive> Bvh<'p, P> {
    /// Builds a [`Bvh`] over `primitives` with the default [`BuildOptions`]:
    /// exhaustive SAH splits.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::bvh::Bvh;
    /// use sahbvh::shapes::Triangle;
    /// use sahbvh::{Point3, Real};
    ///
    /// let triangles: Vec<Triangle> = (0..10)
    ///     .map(|i| {
    ///         let x = i as Real * 3.0;
    ///         Triangle::new(
    ///             Point3::new(x, 0.0, 0.0),
    ///             Point3::new(x + 1.0, 0.0, 0.0),
    ///             Point3::new(x, 1.0, 0.5),
    ///         )
    ///     })
    ///     .collect();
    ///
    /// let bvh = Bvh::build(&triangles);
    /// assert!(bvh.is_consistent());
    /// assert!(bvh.nodes().len() <= 2 * triangles.len() - 1);
    /// ```
    pub fn build(primitives: &'p [P]) -> Bvh<'p, P> {
        Bvh::build_with(primitives, BuildOptions::default())
    }

    /// Builds a [`Bvh`] over `primitives` with explicit [`BuildOptions`].
    ///
    /// Building never fails. An empty slice gives a tree with a single empty leaf that
    /// is never hit. Primitives whose centroids cannot be separated end up together in
    /// one leaf.
    pub fn build_with(primitives: &'p [P], options: BuildOptions) -> Bvh<'p, P> {
        let start = Instant::now();
        let span = tracing::debug_span!(
            "bvh_build",
            primitives = primitives.len(),
            strategy = ?options.strategy
        );
        let _enter = span.enter();

        let bounds: Vec<Aabb> = primitives.iter().map(Bounded::aabb).collect();
        let (nodes, primitive_indices) = build_nodes(&bounds, &options);
        let bvh = Bvh {
            nodes,
            primitives: primitive_indices.iter().map(|i| &primitives[*i]).collect(),
            primitive_indices,
        };

        tracing::debug!(
            nodes = bvh.nodes.len(),
            leaves = bvh.leaf_count(),
            depth = bvh.depth(),
            "built in {} us",
            start.elapsed().as_micros()
        );
        bvh
    }
}

impl<'p, P> Bvh<'p, P> {
    /// The node arena. The root is at index `0`.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// The root node.
    pub fn root(&self) -> &BvhNode {
        &self.nodes[0]
    }

    /// The primitives in tree order. Leaves index into this list.
    pub fn primitives(&self) -> &[&'p P] {
        &self.primitives
    }

    /// For every slot of [`Bvh::primitives`], the index of that primitive in the slice
    /// the tree was built from.
    pub fn primitive_indices(&self) -> &[usize] {
        &self.primitive_indices
    }

    /// Returns true if the tree was built over no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// The number of edges on the longest path from the root to a leaf.
    pub fn depth(&self) -> u32 {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0u32)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some((left, right)) = self.nodes[index].children() {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }

    /// The number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Prints the [`Bvh`] in a tree-like visualization.
    pub fn pretty_print(&self) {
        print!("{}", self);
    }

    fn fmt_node(&self, f: &mut fmt::Formatter, index: usize, depth: usize) -> fmt::Result {
        let node = &self.nodes[index];
        let padding = " ".repeat(depth);
        match node.children() {
            Some((left, right)) => {
                writeln!(f, "{}node={} {}", padding, index, node.aabb)?;
                self.fmt_node(f, left, depth + 1)?;
                self.fmt_node(f, right, depth + 1)
            }
            None => {
                writeln!(f, "{}leaf={} {}", padding, index, node.aabb)?;
                let indices = &self.primitive_indices[node.primitive_range()];
                writeln!(f, "{} primitives {:?}", padding, indices)
            }
        }
    }
}

impl<'p, P> fmt::Display for Bvh<'p, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_node(f, 0, 0)
    }
}

impl<'p, P> fmt::Debug for Bvh<'p, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Bvh")
            .field("nodes", &self.nodes)
            .field("primitive_indices", &self.primitive_indices)
            .finish()
    }
}

impl<'p, P: Bounded> Bvh<'p, P> {
    /// Checks the structural invariants of the tree and reports the first violation:
    ///
    /// - the arena holds at least the root and at most `2n - 1` nodes,
    /// - every child index is valid and every node is reached exactly once from the root,
    /// - the children of a node cover adjacent ranges whose union is the parent's range,
    ///   and the root covers all primitives,
    /// - every child bound lies inside its parent bound and every primitive bound lies
    ///   inside its leaf bound,
    /// - [`Bvh::primitive_indices`] lists every input primitive exactly once.
    pub fn validate(&self) -> Result<()> {
        let n = self.primitives.len();
        if self.nodes.is_empty() {
            return Err(BvhError::EmptyArena);
        }
        let limit = (2 * n).saturating_sub(1).max(1);
        if self.nodes.len() > limit {
            return Err(BvhError::TooManyNodes {
                nodes: self.nodes.len(),
                limit,
                primitives: n,
            });
        }

        let mut listed = vec![false; n];
        for &index in &self.primitive_indices {
            match listed.get_mut(index) {
                Some(seen) if !*seen => *seen = true,
                _ => return Err(BvhError::DuplicatePrimitive(index)),
            }
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, Range<usize>)> = vec![(0, 0..n)];
        while let Some((index, expected)) = stack.pop() {
            if visited[index] {
                return Err(BvhError::NodeRevisited(index));
            }
            visited[index] = true;
            let node = &self.nodes[index];

            let Some((left, right)) = node.children() else {
                let found = node.primitive_range();
                if found != expected {
                    return Err(BvhError::RangeMismatch {
                        node: index,
                        expected,
                        found,
                    });
                }
                for slot in found {
                    let aabb = self.primitives[slot].aabb();
                    if !node.aabb.approx_contains_aabb_eps(&aabb, EPSILON) {
                        return Err(BvhError::PrimitiveOutsideLeaf {
                            node: index,
                            primitive: slot,
                        });
                    }
                }
                continue;
            };

            // Internal nodes only store where their range starts.
            let first = node.first_prim as usize;
            if first != expected.start {
                return Err(BvhError::RangeMismatch {
                    node: index,
                    found: first..first + expected.len(),
                    expected,
                });
            }

            for child in [left, right] {
                if child >= self.nodes.len() {
                    return Err(BvhError::ChildOutOfBounds {
                        node: index,
                        child,
                        len: self.nodes.len(),
                    });
                }
                if !node
                    .aabb
                    .approx_contains_aabb_eps(&self.nodes[child].aabb, EPSILON)
                {
                    return Err(BvhError::ChildOutsideParent {
                        parent: index,
                        child,
                    });
                }
            }

            // The right child starts where the left one ends, both must be non-empty.
            let split = self.nodes[right].first_prim as usize;
            if split <= expected.start || split >= expected.end {
                return Err(BvhError::RangeMismatch {
                    node: right,
                    found: split..expected.end,
                    expected: expected.clone(),
                });
            }
            stack.push((right, split..expected.end));
            stack.push((left, expected.start..split));
        }

        let unreachable = visited.iter().filter(|v| !**v).count();
        if unreachable > 0 {
            return Err(BvhError::DetachedNodes { unreachable });
        }
        Ok(())
    }

    /// Returns true if [`Bvh::validate`] finds no violation.
    pub fn is_consistent(&self) -> bool {
        self.validate().is_ok()
    }

    /// Panics with the first violation [`Bvh::validate`] finds.
    pub fn assert_consistent(&self) {
        if let Err(err) = self.validate() {
            panic!("inconsistent BVH: {}", err);
        }
    }
}


#[cfg(all(feature = "bench", test))]
mod bench {
    use crate::bvh::{BuildOptions, Bvh, SplitStrategy};
    use crate::testbase::{create_n_cubes, scene_bounds};

    fn build_n_cubes(n: usize, options: BuildOptions, b: &mut ::test::Bencher) {
        let triangles = create_n_cubes(n, &scene_bounds());
        b.iter(|| {
            Bvh::build_with(&triangles, options);
        });
    }

    #[bench]
    /// Benchmark the SAH construction of a `Bvh` with 1,200 triangles.
    fn bench_build_1200_triangles_sah(b: &mut ::test::Bencher) {
        build_n_cubes(100, BuildOptions::default(), b);
    }

    #[bench]
    /// Benchmark the midpoint construction of a `Bvh` with 1,200 triangles.
    fn bench_build_1200_triangles_midpoint(b: &mut ::test::Bencher) {
        build_n_cubes(
            100,
            BuildOptions::default().with_strategy(SplitStrategy::Midpoint),
            b,
        );
    }

    #[bench]
    /// Benchmark the midpoint construction of a `Bvh` with 12,000 triangles.
    fn bench_build_12k_triangles_midpoint(b: &mut ::test::Bencher) {
        build_n_cubes(
            1_000,
            BuildOptions::default().with_strategy(SplitStrategy::Midpoint),
            b,
        );
    }
}
