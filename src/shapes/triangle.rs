//! This module defines a Triangle primitive.

use crate::aabb::{Aabb, Bounded};
use crate::primitive::Primitive;
use crate::ray::{intersect_triangle, Ray};
use crate::{Point3, Real};

/// A triangle with its bound cached at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    /// First point on the triangle
    pub a: Point3,
    /// Second point on the triangle
    pub b: Point3,
    /// Third point on the triangle
    pub c: Point3,
    aabb: Aabb,
}

impl Triangle {
    /// Creates a new triangle from its three corners. Both faces are hit, so the
    /// winding order does not matter.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Triangle {
        Triangle {
            a,
            b,
            c,
            aabb: Aabb::empty().grow(&a).grow(&b).grow(&c),
        }
    }

    /// The centroid of the three corners.
    pub fn centroid(&self) -> Point3 {
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }
}

impl Bounded for Triangle {
    fn aabb(&self) -> Aabb {
        self.aabb
    }
}

impl Primitive for Triangle {
    fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
        intersect_triangle(&ray.origin, &ray.direction, &self.a, &self.b, &self.c, t)
    }
}
