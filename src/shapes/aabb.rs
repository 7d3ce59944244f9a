//! An [`Aabb`] can itself be stored in a BVH, it is hit by the slab test.

use crate::aabb::Aabb;
use crate::primitive::Primitive;
use crate::ray::{intersect_aabb, Ray};
use crate::Real;

impl Primitive for Aabb {
    fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
        intersect_aabb(&ray.origin, &ray.direction, self, t)
    }
}
