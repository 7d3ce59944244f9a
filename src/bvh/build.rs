//! Top-down construction of the node arena.
//!
//! The builder splits a node's primitive range in place. Centroids and bounds of the
//! primitives are computed once. The centroids are kept parallel to the reordered
//! index list so that both can be partitioned together, while the bounds stay indexed
//! by the caller's primitive index.

use crate::aabb::Aabb;
use crate::axis::Axis;
use crate::bvh::BvhNode;
use crate::utils::{ceil_log2, joint_aabb_of_bounds};
use crate::{Point3, Real};

/// Nodes holding at most this many primitives are never split.
pub const MAX_LEAF_PRIMITIVES: usize = 2;

/// How the builder chooses a split plane.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitStrategy {
    /// Exhaustive surface area heuristic: every primitive centroid on every axis is
    /// tried as a pivot and the cheapest partition wins.
    #[default]
    Sah,

    /// Split at the center of the node bound along its longest axis.
    Midpoint,
}

/// Options for [`Bvh::build_with`](super::Bvh::build_with).
///
/// # Examples
/// ```
/// use sahbvh::bvh::{BuildOptions, SplitStrategy};
///
/// let options = BuildOptions::default()
///     .with_strategy(SplitStrategy::Midpoint)
///     .with_max_depth(12);
/// assert_eq!(options.strategy, SplitStrategy::Midpoint);
/// assert_eq!(options.max_depth, Some(12));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildOptions {
    /// The split plane heuristic.
    pub strategy: SplitStrategy,

    /// Nodes at this depth are not split any further. `None` picks a limit from the
    /// primitive count, see [`BuildOptions::depth_limit`].
    pub max_depth: Option<u32>,
}

impl BuildOptions {
    /// Sets the split plane heuristic.
    pub fn with_strategy(mut self, strategy: SplitStrategy) -> BuildOptions {
        self.strategy = strategy;
        self
    }

    /// Sets the depth at which splitting stops.
    pub fn with_max_depth(mut self, max_depth: u32) -> BuildOptions {
        self.max_depth = Some(max_depth);
        self
    }

    /// The depth limit used for `primitive_count` primitives:
    /// `max_depth` if set, otherwise `2 * ceil(log2(n)) + 32`.
    pub fn depth_limit(&self, primitive_count: usize) -> u32 {
        self.max_depth
            .unwrap_or_else(|| 2 * ceil_log2(primitive_count) + 32)
    }
}

/// A candidate split plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Split {
    pub axis: Axis,
    pub pivot: Real,
}

/// Partitions `items` and the parallel `centroids` in place so that all entries with
/// `centroid[axis] < pivot` come first. Entries equal to the pivot, and `NaN`
/// centroids, end up on the right. Returns the number of entries on the left.
///
/// The order within each side is not preserved.
///
/// # Examples
/// ```
/// use sahbvh::axis::Axis;
/// use sahbvh::bvh::partition_by_pivot;
/// use sahbvh::Point3;
///
/// let mut items = vec!['a', 'b', 'c', 'd'];
/// let mut centroids = vec![
///     Point3::new(3.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ];
///
/// let left = partition_by_pivot(&mut items, &mut centroids, Axis::X, 2.0);
/// assert_eq!(left, 2);
/// assert!(items[..left].iter().all(|c| *c == 'b' || *c == 'd'));
/// assert!(centroids[left..].iter().all(|c| c.x >= 2.0));
/// ```
pub fn partition_by_pivot<T>(
    items: &mut [T],
    centroids: &mut [Point3],
    axis: Axis,
    pivot: Real,
) -> usize {
    assert_eq!(
        items.len(),
        centroids.len(),
        "items and centroids must be parallel"
    );
    let mut i = 0;
    let mut j = items.len();
    while i < j {
        if centroids[i][axis] < pivot {
            i += 1;
        } else {
            j -= 1;
            items.swap(i, j);
            centroids.swap(i, j);
        }
    }
    i
}

/// The surface area heuristic cost of a partition: each side's primitive count
/// weighted by its bound's surface area. There is no traversal term.
///
/// A cost that is not positive, including the `NaN` an empty side produces, is
/// reported as `+INFINITY` so the candidate never wins.
pub fn sah_cost(left_count: usize, left: &Aabb, right_count: usize, right: &Aabb) -> Real {
    let cost = left_count as Real * left.surface_area() + right_count as Real * right.surface_area();
    if cost > 0.0 {
        cost
    } else {
        Real::INFINITY
    }
}

/// Evaluates the cost of splitting the primitives in `order` at `pivot` on `axis`.
/// `centroids` is parallel to `order`, `bounds` is indexed by primitive index.
pub(crate) fn evaluate_sah(
    order: &[usize],
    centroids: &[Point3],
    bounds: &[Aabb],
    axis: Axis,
    pivot: Real,
) -> Real {
    let mut left = Aabb::empty();
    let mut right = Aabb::empty();
    let mut left_count = 0;
    let mut right_count = 0;
    for (index, centroid) in order.iter().zip(centroids) {
        if centroid[axis] < pivot {
            left_count += 1;
            left.join_mut(&bounds[*index]);
        } else {
            right_count += 1;
            right.join_mut(&bounds[*index]);
        }
    }
    sah_cost(left_count, &left, right_count, &right)
}

/// Tries every centroid on every axis as a pivot. Returns the cheapest split, the
/// first one on ties, or `None` if no candidate has a finite cost.
pub(crate) fn find_sah_split(
    order: &[usize],
    centroids: &[Point3],
    bounds: &[Aabb],
) -> Option<Split> {
    let mut best_cost = Real::INFINITY;
    let mut best = None;
    for axis in Axis::ALL {
        for candidate in centroids {
            let pivot = candidate[axis];
            let cost = evaluate_sah(order, centroids, bounds, axis, pivot);
            if cost < best_cost {
                best_cost = cost;
                best = Some(Split { axis, pivot });
            }
        }
    }
    best
}

/// Splits at the center of `aabb` along its longest axis.
pub(crate) fn midpoint_split(aabb: &Aabb) -> Split {
    let axis = aabb.largest_axis();
    Split {
        axis,
        pivot: aabb.center()[axis],
    }
}

/// Builds the node arena over primitives with the given `bounds`.
/// Returns the nodes and the reordered primitive indices.
pub(crate) fn build_nodes(bounds: &[Aabb], options: &BuildOptions) -> (Vec<BvhNode>, Vec<usize>) {
    let n = bounds.len();
    let mut order: Vec<usize> = (0..n).collect();
    let mut centroids: Vec<Point3> = bounds.iter().map(Aabb::center).collect();

    let mut nodes = Vec::with_capacity((2 * n).saturating_sub(1).max(1));
    nodes.push(BvhNode::leaf(
        joint_aabb_of_bounds(&order, bounds),
        0,
        n as u32,
    ));

    let depth_limit = options.depth_limit(n);

    // Pushing right before left visits the nodes in the same order as a recursive
    // build would, so children are appended depth first, left subtree first.
    let mut stack = vec![(0usize, 0u32)];
    while let Some((node_index, depth)) = stack.pop() {
        let node = nodes[node_index];
        let count = node.prim_count as usize;
        if count <= MAX_LEAF_PRIMITIVES {
            continue;
        }
        if depth >= depth_limit {
            tracing::debug!(
                node = node_index,
                primitives = count,
                depth,
                "depth limit reached, keeping leaf"
            );
            continue;
        }

        let range = node.primitive_range();
        let split = match options.strategy {
            SplitStrategy::Sah => {
                find_sah_split(&order[range.clone()], &centroids[range.clone()], bounds)
            }
            SplitStrategy::Midpoint => Some(midpoint_split(&node.aabb)),
        };
        let split = match split {
            Some(split) => split,
            None => {
                tracing::trace!(
                    node = node_index,
                    primitives = count,
                    "no split with finite cost, keeping leaf"
                );
                continue;
            }
        };

        let left_count = partition_by_pivot(
            &mut order[range.clone()],
            &mut centroids[range.clone()],
            split.axis,
            split.pivot,
        );
        if left_count == 0 || left_count == count {
            tracing::trace!(
                node = node_index,
                primitives = count,
                axis = %split.axis,
                "degenerate split, keeping leaf"
            );
            continue;
        }

        let mid = range.start + left_count;
        let child_l_index = nodes.len();
        let child_r_index = child_l_index + 1;
        nodes.push(BvhNode::leaf(
            joint_aabb_of_bounds(&order[range.start..mid], bounds),
            range.start as u32,
            left_count as u32,
        ));
        nodes.push(BvhNode::leaf(
            joint_aabb_of_bounds(&order[mid..range.end], bounds),
            mid as u32,
            (count - left_count) as u32,
        ));
        nodes[node_index].make_internal(child_l_index as u32, child_r_index as u32);

        stack.push((child_r_index, depth + 1));
        stack.push((child_l_index, depth + 1));
    }

    (nodes, order)
}
