//! Ray queries against a built [`Bvh`].

use crate::bvh::{Bvh, BvhNode};
use crate::primitive::Primitive;
use crate::ray::Ray;
use crate::{Point3, Real, Vector3};
use std::ops::ControlFlow;

/// The nearest hit found by [`Bvh::closest_hit`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hit {
    /// Distance along the ray, in units of its direction.
    pub distance: Real,

    /// Index of the hit primitive in the slice the [`Bvh`] was built from.
    pub primitive_index: usize,
}

impl<'p, P: Primitive> Bvh<'p, P> {
    /// Visits the leaves whose ancestors' child boxes are hit by `ray`, nearer children
    /// first. Stops early when `leaf` breaks.
    ///
    /// The root box itself is never tested. At an internal node both child boxes are
    /// tested; a missed child is skipped, the farther hit child waits on the stack.
    fn walk<F>(&self, ray: &Ray, mut leaf: F)
    where
        F: FnMut(&BvhNode) -> ControlFlow<()>,
    {
        if self.primitives.is_empty() {
            return;
        }

        let mut stack: Vec<usize> = Vec::with_capacity(64);
        let mut node = &self.nodes[0];
        loop {
            match node.children() {
                None => {
                    if leaf(node).is_break() {
                        return;
                    }
                }
                Some((left, right)) => {
                    let (mut near, mut far) = (left, right);
                    let mut near_distance = ray.aabb_entry_distance(&self.nodes[near].aabb);
                    let mut far_distance = ray.aabb_entry_distance(&self.nodes[far].aabb);
                    if near_distance > far_distance {
                        std::mem::swap(&mut near, &mut far);
                        std::mem::swap(&mut near_distance, &mut far_distance);
                    }

                    if near_distance != Real::INFINITY {
                        if far_distance != Real::INFINITY {
                            stack.push(far);
                        }
                        node = &self.nodes[near];
                        continue;
                    }
                }
            }

            match stack.pop() {
                Some(index) => node = &self.nodes[index],
                None => return,
            }
        }
    }

    /// Finds the nearest hit closer than `*best` and lowers `*best` to it.
    /// Returns the slot of the primitive that produced it.
    fn nearest(&self, ray: &Ray, best: &mut Real) -> Option<usize> {
        let mut last = None;
        self.walk(ray, |node| {
            for slot in node.primitive_range() {
                if self.primitives[slot].intersect(ray, Some(&mut *best)) {
                    last = Some(slot);
                }
            }
            ControlFlow::Continue(())
        });
        last
    }

    /// Returns true as soon as any primitive reports a hit.
    fn occluded(&self, ray: &Ray) -> bool {
        let mut hit = false;
        self.walk(ray, |node| {
            for slot in node.primitive_range() {
                if self.primitives[slot].intersect(ray, None) {
                    hit = true;
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        });
        hit
    }

    /// Casts `ray` into the tree.
    ///
    /// With `Some(t)`, the search starts from the current value of `*t`: only hits
    /// nearer than it count, and on success `*t` holds the nearest hit distance. With
    /// `None`, the query returns as soon as any primitive is hit.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::bvh::Bvh;
    /// use sahbvh::ray::Ray;
    /// use sahbvh::shapes::Triangle;
    /// use sahbvh::{Point3, Real, Vector3};
    ///
    /// let triangles: Vec<Triangle> = (0..8)
    ///     .map(|i| {
    ///         let z = -(i as Real) * 2.0;
    ///         Triangle::new(
    ///             Point3::new(-1.0, -1.0, z),
    ///             Point3::new(1.0, -1.0, z),
    ///             Point3::new(0.0, 1.0, z),
    ///         )
    ///     })
    ///     .collect();
    /// let bvh = Bvh::build(&triangles);
    /// let ray = Ray::new(Point3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
    ///
    /// let mut t = Real::INFINITY;
    /// assert!(bvh.intersect(&ray, Some(&mut t)));
    /// assert!((t - 3.0).abs() < 1e-5);
    ///
    /// // Nothing lies in front of a hit that was already found.
    /// assert!(!bvh.intersect(&ray, Some(&mut t)));
    /// assert!(bvh.intersect(&ray, None));
    /// ```
    pub fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
        match t {
            Some(t) => self.nearest(ray, t).is_some(),
            None => self.occluded(ray),
        }
    }

    /// Returns the nearest hit along `ray` and which input primitive produced it.
    pub fn closest_hit(&self, ray: &Ray) -> Option<Hit> {
        let mut distance = Real::INFINITY;
        let slot = self.nearest(ray, &mut distance)?;
        Some(Hit {
            distance,
            primitive_index: self.primitive_indices[slot],
        })
    }
}

#[cfg(feature = "rayon")]
impl<'p, P: Primitive + Sync> Bvh<'p, P> {
    /// Returns the nearest hit distance for each ray, in parallel.
    pub fn intersect_batch(&self, rays: &[Ray]) -> Vec<Option<Real>> {
        use rayon::prelude::*;

        rays.par_iter()
            .map(|ray| self.closest_hit(ray).map(|hit| hit.distance))
            .collect()
    }
}

#[cfg(not(feature = "rayon"))]
impl<'p, P: Primitive> Bvh<'p, P> {
    /// Returns the nearest hit distance for each ray.
    pub fn intersect_batch(&self, rays: &[Ray]) -> Vec<Option<Real>> {
        rays.iter()
            .map(|ray| self.closest_hit(ray).map(|hit| hit.distance))
            .collect()
    }
}

/// Casts the ray `origin + t * direction` into `bvh`.
/// Same as [`Bvh::intersect`], in the form of the other free intersection tests.
pub fn intersect_bvh<P: Primitive>(
    origin: &Point3,
    direction: &Vector3,
    bvh: &Bvh<P>,
    t: Option<&mut Real>,
) -> bool {
    bvh.intersect(&Ray::new(*origin, *direction), t)
}

#[cfg(test)]
mod tests {
    use crate::aabb::Aabb;
    use crate::bvh::{intersect_bvh, BuildOptions, Bvh, Hit, SplitStrategy};
    use crate::primitive::Primitive;
    use crate::ray::Ray;
    use crate::shapes::Triangle;
    use crate::testbase::{
        brute_force_nearest, create_n_cubes, create_ray, generate_aligned_boxes,
        random_triangles, scene_bounds, Recorder,
    };
    use crate::{Point3, Real, Vector3, EPSILON};
    use float_eq::assert_float_eq;
    use proptest::prelude::*;
    use std::cell::Cell;

    /// A unit triangle in the `z = 0` plane centered at `x`.
    fn unit_triangle_at(x: Real) -> Triangle {
        Triangle::new(
            Point3::new(x - 0.5, -0.5, 0.0),
            Point3::new(x + 0.5, -0.5, 0.0),
            Point3::new(x, 0.5, 0.0),
        )
    }

    #[test]
    /// The left of two triangles is the one that reports the hit.
    fn test_two_triangles_left_contributes() {
        let last = Cell::new(None);
        let triangles = [
            Recorder::new(0, unit_triangle_at(-2.0), &last),
            Recorder::new(1, unit_triangle_at(2.0), &last),
        ];
        let bvh = Bvh::build(&triangles);

        let mut t = Real::INFINITY;
        assert!(intersect_bvh(
            &Point3::new(-2.0, 0.0, 5.0),
            &Vector3::new(0.0, 0.0, -1.0),
            &bvh,
            Some(&mut t)
        ));
        assert_float_eq!(t, 5.0, abs <= EPSILON);
        assert_eq!(last.get(), Some(0));
    }

    #[test]
    fn test_empty_tree_is_never_hit() {
        let triangles: Vec<Triangle> = Vec::new();
        let bvh = Bvh::build(&triangles);
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        let mut t = Real::INFINITY;
        assert!(!bvh.intersect(&ray, Some(&mut t)));
        assert!(!bvh.intersect(&ray, None));
        assert_eq!(t, Real::INFINITY);
        assert_eq!(bvh.closest_hit(&ray), None);
    }

    #[test]
    /// Axis aligned rays against a row of boxes, through every leaf and between them.
    fn test_axis_aligned_rays() {
        let boxes = generate_aligned_boxes();
        let bvh = Bvh::build(&boxes);

        // Along the row from afar, the first box is hit.
        let ray = Ray::new(Point3::new(-1000.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let hit = bvh.closest_hit(&ray).expect("row is hit");
        assert_eq!(boxes[hit.primitive_index].id, -10);
        assert_float_eq!(hit.distance, 1000.0 - 10.5, abs <= 1e-3);

        // Straight down onto every box.
        for (index, unit_box) in boxes.iter().enumerate() {
            let origin = unit_box.pos + Vector3::new(0.0, 10.0, 0.0);
            let ray = Ray::new(origin, Vector3::new(0.0, -1.0, 0.0));
            assert_eq!(
                bvh.closest_hit(&ray),
                Some(Hit {
                    distance: 9.5,
                    primitive_index: index
                })
            );
        }

        // Parallel to the row, above it.
        let ray = Ray::new(Point3::new(-1000.0, 2.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(!bvh.intersect(&ray, None));
    }

    #[test]
    /// The accumulator is only lowered, hits behind it are ignored.
    fn test_existing_distance_is_respected() {
        let boxes = generate_aligned_boxes();
        let bvh = Bvh::build(&boxes);
        let ray = Ray::new(Point3::new(-1000.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));

        let mut t = 100.0;
        assert!(!bvh.intersect(&ray, Some(&mut t)));
        assert_eq!(t, 100.0);
    }

    #[test]
    /// Random rays into a scene of cubes find the same nearest distance as brute force.
    fn test_nearest_hit_matches_brute_force() {
        let bounds = scene_bounds();
        let triangles = create_n_cubes(100, &bounds);
        for strategy in [SplitStrategy::Sah, SplitStrategy::Midpoint] {
            let bvh = Bvh::build_with(&triangles, BuildOptions::default().with_strategy(strategy));
            let mut seed = 0;
            let mut hits = 0;
            for _ in 0..500 {
                let ray = create_ray(&mut seed, &bounds);
                let expected = brute_force_nearest(&triangles, &ray).map(|(distance, _)| distance);
                let found = bvh.closest_hit(&ray).map(|hit| hit.distance);
                assert_eq!(found, expected);
                assert_eq!(bvh.intersect(&ray, None), expected.is_some());
                hits += expected.is_some() as usize;
            }
            assert!(hits > 0);
        }
    }

    #[test]
    /// Repeated queries give identical answers.
    fn test_queries_are_idempotent() {
        let bounds = scene_bounds();
        let triangles = create_n_cubes(30, &bounds);
        let bvh = Bvh::build(&triangles);
        let mut seed = 17;
        for _ in 0..100 {
            let ray = create_ray(&mut seed, &bounds);
            let first = bvh.closest_hit(&ray);
            let mut t1 = Real::INFINITY;
            let mut t2 = Real::INFINITY;
            let h1 = bvh.intersect(&ray, Some(&mut t1));
            let h2 = bvh.intersect(&ray, Some(&mut t2));
            assert_eq!(h1, h2);
            assert_eq!(t1.to_bits(), t2.to_bits());
            assert_eq!(bvh.closest_hit(&ray), first);
        }
    }

    #[test]
    fn test_intersect_batch() {
        let bounds = scene_bounds();
        let triangles = create_n_cubes(50, &bounds);
        let bvh = Bvh::build(&triangles);
        let mut seed = 3;
        let rays: Vec<Ray> = (0..64).map(|_| create_ray(&mut seed, &bounds)).collect();
        let batch = bvh.intersect_batch(&rays);
        for (ray, distance) in rays.iter().zip(batch) {
            assert_eq!(distance, bvh.closest_hit(ray).map(|hit| hit.distance));
        }
    }

    #[test]
    /// A root leaf is tested directly, without a box test.
    fn test_single_leaf_tree() {
        let aabb = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let boxes = [aabb];
        let bvh = Bvh::build(&boxes);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(
            bvh.closest_hit(&ray),
            Some(Hit {
                distance: 4.0,
                primitive_index: 0
            })
        );
        assert!(aabb.intersect(&ray, None));
    }

    proptest! {
        // Disjoint triangles in a row: a ray aimed at one of them hits exactly that one,
        // at the brute force distance, and the occlusion query agrees.
        #[test]
        fn test_aimed_ray_hits_target(n in 1..60usize, target in 0..60usize, height in 1.0 as Real..50.0) {
            let target = target % n;
            let triangles: Vec<Triangle> = (0..n)
                .map(|i| {
                    let x = i as Real * 3.0;
                    Triangle::new(
                        Point3::new(x - 1.0, -1.0, 0.0),
                        Point3::new(x + 1.0, -1.0, 0.3),
                        Point3::new(x, 1.0, -0.3),
                    )
                })
                .collect();
            let bvh = Bvh::build(&triangles);

            let aim = triangles[target].centroid();
            let ray = Ray::new(aim + Vector3::new(0.0, 0.0, height), Vector3::new(0.0, 0.0, -1.0));
            let hit = bvh.closest_hit(&ray);
            let expected = brute_force_nearest(&triangles, &ray);

            prop_assert_eq!(hit.map(|h| h.primitive_index), Some(target));
            prop_assert_eq!(hit.map(|h| h.distance), expected.map(|(d, _)| d));
            prop_assert!(bvh.intersect(&ray, None));
        }

        // Random scenes and random rays: nearest distance equals brute force.
        #[test]
        fn test_random_scenes_match_brute_force(n in 0..80usize, seed: u64, ray_seed: u64) {
            let triangles = random_triangles(n, seed);
            let bvh = Bvh::build(&triangles);
            let mut ray_seed = ray_seed;
            for _ in 0..20 {
                let ray = create_ray(&mut ray_seed, &scene_bounds());
                let expected = brute_force_nearest(&triangles, &ray).map(|(d, _)| d);
                let mut t = Real::INFINITY;
                let hit = bvh.intersect(&ray, Some(&mut t));
                prop_assert_eq!(hit, expected.is_some());
                prop_assert_eq!(hit.then_some(t), expected);
                prop_assert_eq!(bvh.intersect(&ray, None), hit);
            }
        }
    }
}
