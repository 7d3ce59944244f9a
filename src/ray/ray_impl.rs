//! This module defines a Ray structure which bundles an origin and a direction
//! for the intersection tests.

use crate::aabb::Aabb;
use crate::ray::{aabb_entry_distance, intersect_aabb, intersect_triangle};
use crate::{Point3, Real, Vector3};

/// A ray with an origin and a direction.
///
/// The direction is kept as given and is not normalized, so all distances reported
/// by the intersection tests are measured in units of `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    /// The ray origin.
    pub origin: Point3,

    /// The ray direction.
    pub direction: Vector3,
}

impl Ray {
    /// Creates a new [`Ray`] from an `origin` and a `direction`.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::ray::Ray;
    /// use sahbvh::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(2.0, 0.0, 0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// assert_eq!(ray.origin, origin);
    /// assert_eq!(ray.direction, direction);
    /// assert_eq!(ray.at(1.5), Point3::new(3.0, 0.0, 0.0));
    /// ```
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        Ray { origin, direction }
    }

    /// Returns the point at parameter `t` along the ray.
    pub fn at(&self, t: Real) -> Point3 {
        self.origin + self.direction * t
    }

    /// Tests the intersection of this [`Ray`] with an [`Aabb`].
    /// See [`intersect_aabb`] for the meaning of `t`.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::ray::Ray;
    /// use sahbvh::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    /// let aabb = Aabb::with_bounds(Point3::new(99.9, -1.0, -1.0), Point3::new(100.1, 1.0, 1.0));
    ///
    /// assert!(ray.intersects_aabb(&aabb, None));
    /// ```
    pub fn intersects_aabb(&self, aabb: &Aabb, t: Option<&mut Real>) -> bool {
        intersect_aabb(&self.origin, &self.direction, aabb, t)
    }

    /// Tests the intersection of this [`Ray`] with the triangle `a`, `b`, `c`.
    /// See [`intersect_triangle`] for the meaning of `t`.
    pub fn intersects_triangle(
        &self,
        a: &Point3,
        b: &Point3,
        c: &Point3,
        t: Option<&mut Real>,
    ) -> bool {
        intersect_triangle(&self.origin, &self.direction, a, b, c, t)
    }

    /// Distance at which this [`Ray`] enters `aabb`, `+INFINITY` on a miss.
    pub fn aabb_entry_distance(&self, aabb: &Aabb) -> Real {
        aabb_entry_distance(&self.origin, &self.direction, aabb)
    }
}


#[cfg(all(feature = "bench", test))]
mod bench {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use test::{black_box, Bencher};

    use crate::aabb::Aabb;
    use crate::ray::Ray;
    use crate::testbase::{tuple_to_point, tuple_to_vector, TupleVec};

    /// Generate a random deterministic `Ray`.
    fn random_ray(rng: &mut StdRng) -> Ray {
        let a = tuple_to_point(&rng.random::<TupleVec>());
        let b = tuple_to_vector(&rng.random::<TupleVec>());
        Ray::new(a, b)
    }

    /// Generate a random deterministic `Aabb`.
    fn random_aabb(rng: &mut StdRng) -> Aabb {
        let a = tuple_to_point(&rng.random::<TupleVec>());
        let b = tuple_to_point(&rng.random::<TupleVec>());

        Aabb::empty().grow(&a).grow(&b)
    }

    /// Generate the ray and boxes used for benchmarks.
    fn random_ray_and_boxes() -> (Ray, Vec<Aabb>) {
        let seed = [0; 32];
        let mut rng = StdRng::from_seed(seed);

        let ray = random_ray(&mut rng);
        let boxes = (0..1000).map(|_| random_aabb(&mut rng)).collect::<Vec<_>>();

        black_box((ray, boxes))
    }

    /// Benchmark for the slab test.
    #[bench]
    fn bench_intersects_aabb(b: &mut Bencher) {
        let (ray, boxes) = random_ray_and_boxes();

        b.iter(|| {
            for aabb in &boxes {
                black_box(ray.intersects_aabb(aabb, None));
            }
        });
    }
}
