//! Axis enum for indexing three-dimensional structures.

use crate::{Point3, Real, Vector3};
use std::fmt::{Display, Formatter, Result};
use std::ops::{Index, IndexMut};

/// An `Axis` in a three-dimensional coordinate system.
/// Used to access `Vector3`/`Point3` structs via index.
///
/// # Examples
/// ```
/// use sahbvh::axis::Axis;
///
/// let mut position = [1.0, 0.5, 42.0];
/// position[Axis::Y] *= 4.0;
///
/// assert_eq!(position[Axis::Y], 2.0);
/// ```
///
/// [`Point3`] and [`Vector3`] are also indexable using `Axis`.
///
/// ```
/// use sahbvh::axis::Axis;
/// use sahbvh::Point3;
///
/// let mut position: Point3 = Point3::new(1.0, 2.0, 3.0);
/// position[Axis::X] = 1000.0;
///
/// assert_eq!(position[Axis::X], 1000.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Index of the X axis.
    X = 0,

    /// Index of the Y axis.
    Y = 1,

    /// Index of the Z axis.
    Z = 2,
}

impl Axis {
    /// All axes in the order the split search visits them.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Display implementation for `Axis`.
impl Display for Axis {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{}",
            match *self {
                Axis::X => "x",
                Axis::Y => "y",
                Axis::Z => "z",
            }
        )
    }
}

/// Make slices indexable by `Axis`.
impl Index<Axis> for [Real] {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        &self[axis as usize]
    }
}

/// Make `Point3` indexable by `Axis`.
impl Index<Axis> for Point3 {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Make `Vector3` indexable by `Axis`.
impl Index<Axis> for Vector3 {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Make slices mutably accessible by `Axis`.
impl IndexMut<Axis> for [Real] {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        &mut self[axis as usize]
    }
}

/// Make `Point3` mutably accessible by `Axis`.
impl IndexMut<Axis> for Point3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// Make `Vector3` mutably accessible by `Axis`.
impl IndexMut<Axis> for Vector3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::axis::Axis;
    use crate::{Point3, Real, Vector3};
    use proptest::prelude::*;

    #[test]
    fn test_display_axis() {
        let names: Vec<String> = Axis::ALL.iter().map(|a| a.to_string()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    proptest! {
        // Test whether accessing points and vectors by `Axis` matches their fields.
        #[test]
        fn test_index_by_axis(tpl: (Real, Real, Real)) {
            let p = Point3::new(tpl.0, tpl.1, tpl.2);
            let v = Vector3::new(tpl.0, tpl.1, tpl.2);

            prop_assert!(p[Axis::X].to_bits() == tpl.0.to_bits());
            prop_assert!(p[Axis::Y].to_bits() == tpl.1.to_bits());
            prop_assert!(p[Axis::Z].to_bits() == tpl.2.to_bits());
            prop_assert!(v[Axis::X].to_bits() == tpl.0.to_bits());
            prop_assert!(v[Axis::Y].to_bits() == tpl.1.to_bits());
            prop_assert!(v[Axis::Z].to_bits() == tpl.2.to_bits());
        }

        // Test whether points can be mutably set, by indexing via `Axis`.
        #[test]
        fn test_set_by_axis(tpl: (Real, Real, Real)) {
            let mut p = Point3::origin();

            p[Axis::X] = tpl.0;
            p[Axis::Y] = tpl.1;
            p[Axis::Z] = tpl.2;

            prop_assert!(p.x.to_bits() == tpl.0.to_bits());
            prop_assert!(p.y.to_bits() == tpl.1.to_bits());
            prop_assert!(p.z.to_bits() == tpl.2.to_bits());
        }
    }
}
