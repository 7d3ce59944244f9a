#![no_main]
use std::fmt::{self, Debug, Formatter};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nalgebra::SimdPartialOrd;
use ordered_float::NotNan;
use sahbvh::aabb::{Aabb, Bounded};
use sahbvh::bvh::{BuildOptions, Bvh, SplitStrategy};
use sahbvh::primitive::Primitive;
use sahbvh::ray::{intersect_aabb, Ray};
use sahbvh::{Point3, Real, Vector3};

const LIMIT: Real = 1_000_000.0;

/// Exhaustive SAH is quadratic per node, keep the scenes small.
const MAX_SHAPES: usize = 32;

fuzz_target!(|workload: Workload| {
    workload.fuzz();
});

#[derive(Arbitrary)]
struct ArbitraryPoint {
    coordinates: [NotNan<Real>; 3],
}

impl ArbitraryPoint {
    fn point(&self) -> Point3 {
        Point3::from_slice(&self.coordinates).map(|f| f.into_inner().clamp(-LIMIT, LIMIT))
    }
}

#[derive(Arbitrary)]
struct ArbitraryShape {
    a: ArbitraryPoint,
    b: ArbitraryPoint,
}

impl Debug for ArbitraryShape {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.aabb(), f)
    }
}

impl Bounded for ArbitraryShape {
    fn aabb(&self) -> Aabb {
        let mut a = self.a.point();
        let b = self.b.point();

        // Ensure some separation.
        a.iter_mut().enumerate().for_each(|(i, a)| {
            if *a == b[i] {
                *a += 1.0;
            }
        });

        Aabb::with_bounds(a.simd_min(b), a.simd_max(b))
    }
}

impl Primitive for ArbitraryShape {
    fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
        intersect_aabb(&ray.origin, &ray.direction, &self.aabb(), t)
    }
}

#[derive(Arbitrary)]
struct ArbitraryRay {
    origin: ArbitraryPoint,
    destination: ArbitraryPoint,
}

impl Debug for ArbitraryRay {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.ray(), f)
    }
}

impl ArbitraryRay {
    fn ray(&self) -> Ray {
        let mut direction = self.destination.point() - self.origin.point();
        // Ensure no degenerate direction.
        if direction.iter().all(|f| *f == 0.0) {
            direction = Vector3::new(1.0, 1.0, 1.0);
        }
        Ray::new(self.origin.point(), direction)
    }
}

#[derive(Debug, Arbitrary)]
struct Workload {
    shapes: Vec<ArbitraryShape>,
    rays: Vec<ArbitraryRay>,
    midpoint: bool,
    max_depth: Option<u8>,
}

impl Workload {
    fn fuzz(self) {
        if self.shapes.len() > MAX_SHAPES {
            return;
        }

        let strategy = if self.midpoint {
            SplitStrategy::Midpoint
        } else {
            SplitStrategy::Sah
        };
        let mut options = BuildOptions::default().with_strategy(strategy);
        if let Some(max_depth) = self.max_depth {
            options = options.with_max_depth(u32::from(max_depth));
        }

        let bvh = Bvh::build_with(&self.shapes, options);
        bvh.assert_consistent();

        for arbitrary_ray in &self.rays {
            let ray = arbitrary_ray.ray();

            let mut brute_force = Real::INFINITY;
            let mut brute_force_hit = false;
            for shape in &self.shapes {
                brute_force_hit |= shape.intersect(&ray, Some(&mut brute_force));
            }

            let hit = bvh.closest_hit(&ray);
            assert_eq!(hit.is_some(), brute_force_hit, "{:?}", ray);
            if let Some(hit) = hit {
                assert_eq!(hit.distance, brute_force, "{:?}", ray);
            }
            assert_eq!(bvh.intersect(&ray, None), brute_force_hit, "{:?}", ray);
        }
    }
}
