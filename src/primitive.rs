//! The [`Primitive`] trait, the capability every object stored in a [`Bvh`] provides.
//!
//! [`Bvh`]: crate::bvh::Bvh

use crate::aabb::Bounded;
use crate::ray::Ray;
use crate::Real;

/// An object that can be placed in a [`Bvh`].
///
/// The bound comes from [`Bounded::aabb`] and must enclose every point that
/// [`Primitive::intersect`] can report. The BVH only borrows primitives, so the
/// caller keeps ownership and the borrow keeps them in place while the tree lives.
///
/// # Examples
/// ```
/// use sahbvh::aabb::{Aabb, Bounded};
/// use sahbvh::primitive::Primitive;
/// use sahbvh::ray::{intersect_aabb, Ray};
/// use sahbvh::{Point3, Real, Vector3};
///
/// struct Marker {
///     position: Point3,
/// }
///
/// impl Bounded for Marker {
///     fn aabb(&self) -> Aabb {
///         let half = Vector3::new(0.5, 0.5, 0.5);
///         Aabb::with_bounds(self.position - half, self.position + half)
///     }
/// }
///
/// impl Primitive for Marker {
///     fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
///         intersect_aabb(&ray.origin, &ray.direction, &self.aabb(), t)
///     }
/// }
///
/// let marker = Marker { position: Point3::new(0.0, 0.0, 10.0) };
/// let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));
/// let mut t = Real::INFINITY;
/// assert!(marker.intersect(&ray, Some(&mut t)));
/// assert_eq!(t, 9.5);
/// ```
///
/// [`Bvh`]: crate::bvh::Bvh
pub trait Primitive: Bounded {
    /// Tests the ray against this primitive.
    ///
    /// With `Some(t)`, a hit is only reported if it is nearer than `*t`, in which case
    /// `*t` is lowered to the hit distance. With `None`, any hit in front of the ray
    /// origin is reported. Distances are in units of `ray.direction`.
    fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool;
}

impl<P: Primitive + ?Sized> Primitive for &P {
    fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
        P::intersect(self, ray, t)
    }
}

impl<P: Primitive + ?Sized> Primitive for Box<P> {
    fn intersect(&self, ray: &Ray, t: Option<&mut Real>) -> bool {
        P::intersect(self, ray, t)
    }
}
