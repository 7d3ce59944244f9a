//! Ray/triangle and ray/box tests.
//!
//! All tests share one contract for the optional distance argument `t`:
//! when it is `Some`, a hit is only reported if it is nearer than the current value,
//! and the new distance is written back. Repeated calls with the same accumulator
//! therefore keep the nearest hit. When it is `None`, any hit in front of the origin
//! is reported.

use crate::aabb::Aabb;
use crate::utils::{fast_max, fast_min};
use crate::{Point3, Real, Vector3, EPSILON};

/// Implementation of the
/// [Möller-Trumbore triangle/ray intersection algorithm](https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm).
///
/// Both faces of the triangle are hit. Rays parallel to the triangle plane (within
/// [`EPSILON`]) miss. The barycentric bounds accept [`EPSILON`] of slack so that rays
/// through a shared edge hit at least one of the adjacent triangles. Hits closer
/// than [`EPSILON`] to the origin, or behind it, are rejected.
///
/// # Examples
/// ```
/// use sahbvh::ray::intersect_triangle;
/// use sahbvh::{Point3, Real, Vector3};
///
/// let a = Point3::new(-1.0, -1.0, 0.0);
/// let b = Point3::new(1.0, -1.0, 0.0);
/// let c = Point3::new(0.0, 1.0, 0.0);
/// let origin = Point3::new(0.0, 0.0, 3.0);
/// let direction = Vector3::new(0.0, 0.0, -1.0);
///
/// let mut t = Real::INFINITY;
/// assert!(intersect_triangle(&origin, &direction, &a, &b, &c, Some(&mut t)));
/// assert_eq!(t, 3.0);
///
/// // A second hit at the same distance is not nearer, so it is not reported.
/// assert!(!intersect_triangle(&origin, &direction, &a, &b, &c, Some(&mut t)));
/// assert!(intersect_triangle(&origin, &direction, &a, &b, &c, None));
/// ```
#[allow(clippy::many_single_char_names)]
pub fn intersect_triangle(
    origin: &Point3,
    direction: &Vector3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
    t: Option<&mut Real>,
) -> bool {
    let a_to_b = b - a;
    let a_to_c = c - a;

    // Begin calculating determinant - also used to calculate u parameter
    // u_vec lies in view plane
    let u_vec = direction.cross(&a_to_c);

    // If determinant is near zero, ray lies in plane of triangle
    let det = a_to_b.dot(&u_vec);
    if det > -EPSILON && det < EPSILON {
        return false;
    }

    let inv_det = 1.0 / det;

    // Vector from point a to ray origin
    let a_to_origin = origin - a;

    // Calculate u parameter and test bounds
    let u = a_to_origin.dot(&u_vec) * inv_det;
    if u < -EPSILON || u > 1.0 + EPSILON {
        return false;
    }

    // Prepare to test v parameter
    let v_vec = a_to_origin.cross(&a_to_b);

    // Calculate v parameter and test bound
    let v = direction.dot(&v_vec) * inv_det;
    if v < -EPSILON || u + v > 1.0 + EPSILON {
        return false;
    }

    let dist = a_to_c.dot(&v_vec) * inv_det;
    match t {
        Some(t) => {
            if dist > EPSILON && dist < *t {
                *t = dist;
                true
            } else {
                false
            }
        }
        None => dist > EPSILON,
    }
}

/// Computes the parametric window `(tmin, tmax)` in which the ray lies inside `aabb`,
/// using the slab method.
///
/// The slab bounds are divided by the direction components, so zero components
/// produce infinite slabs. A slab that evaluates to NaN (the origin lies exactly on a
/// slab plane of a zero direction component) leaves the window unchanged: the ray runs
/// along the face of that slab.
pub fn slab_window(origin: &Point3, direction: &Vector3, aabb: &Aabb) -> (Real, Real) {
    let mut tmin = Real::NEG_INFINITY;
    let mut tmax = Real::INFINITY;
    for i in 0..3 {
        let t1 = (aabb.min[i] - origin[i]) / direction[i];
        let t2 = (aabb.max[i] - origin[i]) / direction[i];
        if t1.is_nan() || t2.is_nan() {
            continue;
        }
        tmin = fast_max(fast_min(t1, t2), tmin);
        tmax = fast_min(fast_max(t1, t2), tmax);
    }
    (tmin, tmax)
}

/// Tests the intersection of a ray with an [`Aabb`] using the slab method.
///
/// The ray hits when its window is not empty and ends in front of the origin. The
/// window is closed, so boxes without depth along one axis can still be hit. With
/// `t` supplied, the entry distance must also be nearer than `*t`; it is written back
/// on success and is negative when the origin lies inside the box.
///
/// # Examples
/// ```
/// use sahbvh::aabb::Aabb;
/// use sahbvh::ray::intersect_aabb;
/// use sahbvh::{Point3, Real, Vector3};
///
/// let aabb = Aabb::with_bounds(Point3::new(99.0, -1.0, -1.0), Point3::new(101.0, 1.0, 1.0));
/// let origin = Point3::new(0.0, 0.0, 0.0);
///
/// let mut t = Real::INFINITY;
/// assert!(intersect_aabb(&origin, &Vector3::new(1.0, 0.0, 0.0), &aabb, Some(&mut t)));
/// assert_eq!(t, 99.0);
/// assert!(!intersect_aabb(&origin, &Vector3::new(-1.0, 0.0, 0.0), &aabb, None));
/// ```
pub fn intersect_aabb(
    origin: &Point3,
    direction: &Vector3,
    aabb: &Aabb,
    t: Option<&mut Real>,
) -> bool {
    let (tmin, tmax) = slab_window(origin, direction, aabb);
    if !(tmin <= tmax && tmax > 0.0) {
        return false;
    }
    match t {
        Some(t) => {
            if tmin < *t {
                *t = tmin;
                true
            } else {
                false
            }
        }
        None => true,
    }
}

/// Returns the distance at which the ray enters `aabb`, or `+INFINITY` if it misses.
/// The distance is negative when the origin lies inside the box.
pub fn aabb_entry_distance(origin: &Point3, direction: &Vector3, aabb: &Aabb) -> Real {
    let mut t = Real::INFINITY;
    intersect_aabb(origin, direction, aabb, Some(&mut t));
    t
}
