//! Common utilities shared by unit tests.
#![cfg(test)]

use std::cell::Cell;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aabb::{Aabb, Bounded};
use crate::primitive::Primitive;
use crate::ray::{intersect_aabb, Ray};
use crate::shapes::Triangle;
use crate::{Point3, Real, Vector3};

/// A vector represented as a tuple
pub type TupleVec = (Real, Real, Real);

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] from -1000 to 1000.
/// Small enough to keep float rounding below the tolerances of the tests.
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -1000.0 as Real..1000.0,
        -1000.0 as Real..1000.0,
        -1000.0 as Real..1000.0,
    )
}

/// Convert a `TupleVec` to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3 {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// Convert a `TupleVec` to a [`Vector3`].
pub fn tuple_to_vector(tpl: &TupleVec) -> Vector3 {
    Vector3::new(tpl.0, tpl.1, tpl.2)
}

/// A unit cube primitive, hit by the slab test.
pub struct UnitBox {
    pub id: i32,
    pub pos: Point3,
}

impl UnitBox {
    pub fn new(id: i32, pos: Point3) -> UnitBox {
        UnitBox { id, pos }
    }
}

/// `UnitBox`'s `Aabb`s are unit `Aabb`s centered on the box's position.
impl Bounded for UnitBox {
    fn aabb(&self) -> Aabb {
        let min = self.pos + Vector3::new(-0.5, -0.5, -0.5);
        let max = self.pos + Vector3::new(0.5, 0.5, 0.5);
        Aabb::with_bounds(min, max)
    }
}

impl Primitive for UnitBox {
    fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
        intersect_aabb(&ray.origin, &ray.direction, &self.aabb(), t)
    }
}

/// Generate 21 `UnitBox`s along the X axis centered on whole numbers (-10,9,..,10).
/// The index is set to the rounded x-coordinate of the box center.
pub fn generate_aligned_boxes() -> Vec<UnitBox> {
    // Create 21 boxes along the x-axis
    let mut shapes = Vec::new();
    for x in -10..11 {
        shapes.push(UnitBox::new(x, Point3::new(x as Real, 0.0, 0.0)));
    }
    shapes
}

/// Wraps a primitive and records its `id` in `last` whenever it lowers the
/// distance accumulator.
pub struct Recorder<'a, P> {
    id: usize,
    inner: P,
    last: &'a Cell<Option<usize>>,
}

impl<'a, P> Recorder<'a, P> {
    pub fn new(id: usize, inner: P, last: &'a Cell<Option<usize>>) -> Recorder<'a, P> {
        Recorder { id, inner, last }
    }
}

impl<'a, P: Bounded> Bounded for Recorder<'a, P> {
    fn aabb(&self) -> Aabb {
        self.inner.aabb()
    }
}

impl<'a, P: Primitive> Primitive for Recorder<'a, P> {
    fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
        let recording = t.is_some();
        let hit = self.inner.intersect(ray, t);
        if hit && recording {
            self.last.set(Some(self.id));
        }
        hit
    }
}

/// Tests `ray` against every primitive in order. Returns the nearest distance and the
/// index of the primitive which reported it.
pub fn brute_force_nearest<P: Primitive>(primitives: &[P], ray: &Ray) -> Option<(Real, usize)> {
    let mut best = Real::INFINITY;
    let mut found = None;
    for (index, primitive) in primitives.iter().enumerate() {
        if primitive.intersect(ray, Some(&mut best)) {
            found = Some(index);
        }
    }
    found.map(|index| (best, index))
}

/// Creates a unit size cube centered at `pos` and pushes the triangles to `shapes`.
fn push_cube(pos: Point3, shapes: &mut Vec<Triangle>) {
    let top_front_right = pos + Vector3::new(0.5, 0.5, -0.5);
    let top_back_right = pos + Vector3::new(0.5, 0.5, 0.5);
    let top_back_left = pos + Vector3::new(-0.5, 0.5, 0.5);
    let top_front_left = pos + Vector3::new(-0.5, 0.5, -0.5);
    let bottom_front_right = pos + Vector3::new(0.5, -0.5, -0.5);
    let bottom_back_right = pos + Vector3::new(0.5, -0.5, 0.5);
    let bottom_back_left = pos + Vector3::new(-0.5, -0.5, 0.5);
    let bottom_front_left = pos + Vector3::new(-0.5, -0.5, -0.5);

    let faces = [
        [top_back_right, top_front_right, top_front_left, top_back_left],
        [bottom_front_left, bottom_front_right, bottom_back_right, bottom_back_left],
        [top_back_left, top_front_left, bottom_front_left, bottom_back_left],
        [bottom_front_right, top_front_right, top_back_right, bottom_back_right],
        [top_front_left, top_front_right, bottom_front_right, bottom_front_left],
        [bottom_back_right, top_back_right, top_back_left, bottom_back_left],
    ];
    for [a, b, c, d] in faces {
        shapes.push(Triangle::new(a, b, c));
        shapes.push(Triangle::new(c, d, a));
    }
}

/// Implementation of splitmix64.
/// For reference see: http://xoroshiro.di.unimi.it/splitmix64.c
fn splitmix64(x: &mut u64) -> u64 {
    *x = x.wrapping_add(0x9E3779B97F4A7C15u64);
    let mut z = *x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EBu64);
    z ^ (z >> 31)
}

/// Generates a new `Point3`, which will lie inside the given `aabb`. Mutates the seed.
pub fn next_point3(seed: &mut u64, aabb: &Aabb) -> Point3 {
    let mut unit = || (splitmix64(seed) >> 11) as Real / (1u64 << 53) as Real;
    let float_vector = Vector3::new(unit(), unit(), unit());
    aabb.min + aabb.size().component_mul(&float_vector)
}

/// Returns the `Aabb` in which the test scenes are placed.
pub fn scene_bounds() -> Aabb {
    Aabb::with_bounds(
        Point3::new(-10.0, -10.0, -10.0),
        Point3::new(10.0, 10.0, 10.0),
    )
}

/// Creates `n` deterministic random cubes. Returns the `Vec` of surface `Triangle`s.
pub fn create_n_cubes(n: usize, bounds: &Aabb) -> Vec<Triangle> {
    let mut vec = Vec::new();
    let mut seed = 0;
    for _ in 0..n {
        push_cube(next_point3(&mut seed, bounds), &mut vec);
    }
    vec
}

/// Creates `n` random triangles with corners inside [`scene_bounds`]. Each triangle
/// spans at most a few units.
pub fn random_triangles(n: usize, seed: u64) -> Vec<Triangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let bounds = scene_bounds();
    (0..n)
        .map(|_| {
            let anchor = Point3::new(
                rng.random_range(bounds.min.x..bounds.max.x),
                rng.random_range(bounds.min.y..bounds.max.y),
                rng.random_range(bounds.min.z..bounds.max.z),
            );
            let mut corner = || {
                let offset = Vector3::new(
                    rng.random_range(-2.0..2.0),
                    rng.random_range(-2.0..2.0),
                    rng.random_range(-2.0..2.0),
                );
                anchor + offset
            };
            let (b, c) = (corner(), corner());
            Triangle::new(anchor, b, c)
        })
        .collect()
}

/// The ray origin will be inside the `bounds` and point to some other point inside
/// this `bounds`.
pub fn create_ray(seed: &mut u64, bounds: &Aabb) -> Ray {
    let origin = next_point3(seed, bounds);
    let target = next_point3(seed, bounds);
    Ray::new(origin, target - origin)
}

#[cfg(test)]
mod tests {
    use crate::aabb::Bounded;
    use crate::testbase::{create_n_cubes, next_point3, random_triangles, scene_bounds};

    #[test]
    fn test_scene_helpers_stay_in_bounds() {
        let bounds = scene_bounds();
        let mut seed = 42;
        for _ in 0..100 {
            assert!(bounds.contains(&next_point3(&mut seed, &bounds)));
        }

        let cubes = create_n_cubes(3, &bounds);
        assert_eq!(cubes.len(), 36);

        let triangles = random_triangles(10, 1);
        assert_eq!(triangles.len(), 10);
        assert_eq!(random_triangles(10, 1)[3].aabb(), triangles[3].aabb());
    }
}
