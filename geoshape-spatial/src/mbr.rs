use std::fmt::{Display, Formatter};

use geoshape::Envelope;

use crate::rtree::rtree_constants::UNIT_SPHERE_VOLUMES;

/// A minimum bounding rectangle in `D` dimensions.
///
/// `min[i]..=max[i]` is the closed extent along axis `i`. A rectangle whose
/// first low side is above its first high side is the *null* rectangle: it
/// covers nothing and is absorbed by [`Mbr::union`].
///
/// # Examples
///
/// ```rust,ignore
/// use geoshape_spatial::Mbr;
///
/// let a = Mbr::new([0.0, 0.0], [2.0, 2.0]);
/// let b = Mbr::new([1.0, 1.0], [3.0, 3.0]);
/// assert!(a.overlaps(&b));
/// assert_eq!(a.union(&b), Mbr::new([0.0, 0.0], [3.0, 3.0]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mbr<const D: usize = 2> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> Mbr<D> {
    // Out of range dimensions fail to compile where this is used.
    const UNIT_SPHERE_VOLUME: f64 = UNIT_SPHERE_VOLUMES[D];

    pub fn new(min: [f64; D], max: [f64; D]) -> Mbr<D> {
        Mbr { min, max }
    }

    /// A degenerate rectangle around a single point.
    pub fn point(coords: [f64; D]) -> Mbr<D> {
        Mbr {
            min: coords,
            max: coords,
        }
    }

    /// The rectangle with all sides at zero.
    pub fn zero() -> Mbr<D> {
        Mbr {
            min: [0.0; D],
            max: [0.0; D],
        }
    }

    /// The undefined rectangle.
    pub fn null() -> Mbr<D> {
        let mut mbr = Mbr::zero();
        if D > 0 {
            mbr.min[0] = 1.0;
            mbr.max[0] = -1.0;
        }
        mbr
    }

    pub fn is_null(&self) -> bool {
        D > 0 && self.min[0] > self.max[0]
    }

    /// True when every side is a number and no low side is above its high
    /// side.
    pub fn is_well_formed(&self) -> bool {
        self.min
            .iter()
            .zip(self.max.iter())
            .all(|(lo, hi)| !lo.is_nan() && !hi.is_nan() && lo <= hi)
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Area of the projection on the first two axes.
    pub fn area(&self) -> f64 {
        if self.is_null() {
            return 0.0;
        }
        (0..D.min(2)).map(|axis| self.extent(axis)).product()
    }

    pub fn volume(&self) -> f64 {
        if self.is_null() {
            return 0.0;
        }
        (0..D).map(|axis| self.extent(axis)).product()
    }

    /// Volume of the n-ball whose radius is the half diagonal of the
    /// rectangle. Drives branch choice and node splitting.
    pub fn spherical_volume(&self) -> f64 {
        if self.is_null() {
            return 0.0;
        }
        let sum_of_squares: f64 = (0..D)
            .map(|axis| {
                let half_extent = self.extent(axis) / 2.0;
                half_extent * half_extent
            })
            .sum();
        sum_of_squares.sqrt().powi(D as i32) * Self::UNIT_SPHERE_VOLUME
    }

    pub fn surface_area(&self) -> f64 {
        if self.is_null() {
            return 0.0;
        }
        let faces: f64 = (0..D)
            .map(|skipped| {
                (0..D)
                    .filter(|axis| *axis != skipped)
                    .map(|axis| self.extent(axis))
                    .product::<f64>()
            })
            .sum();
        2.0 * faces
    }

    /// Smallest rectangle covering both. A null side yields the other.
    pub fn union(&self, other: &Mbr<D>) -> Mbr<D> {
        if self.is_null() {
            return *other;
        }
        if other.is_null() {
            return *self;
        }
        let mut out = *self;
        for axis in 0..D {
            out.min[axis] = self.min[axis].min(other.min[axis]);
            out.max[axis] = self.max[axis].max(other.max[axis]);
        }
        out
    }

    /// Closed-interval overlap test; touching edges overlap.
    pub fn overlaps(&self, other: &Mbr<D>) -> bool {
        (0..D).all(|axis| {
            !(self.min[axis] > other.max[axis] || other.min[axis] > self.max[axis])
        })
    }

    /// True when `self` lies inside `other`. The null rectangle is inside
    /// everything and contains nothing but itself.
    pub fn contained_in(&self, other: &Mbr<D>) -> bool {
        if self.is_null() {
            return true;
        }
        if other.is_null() {
            return false;
        }
        (0..D).all(|axis| self.min[axis] >= other.min[axis] && self.max[axis] <= other.max[axis])
    }
}

impl Mbr<2> {
    pub fn to_envelope(&self) -> Envelope {
        Envelope::new(self.min[0], self.min[1], self.max[0], self.max[1])
    }
}

impl From<Envelope> for Mbr<2> {
    fn from(envelope: Envelope) -> Self {
        Mbr::new(
            [envelope.x_min, envelope.y_min],
            [envelope.x_max, envelope.y_max],
        )
    }
}

impl<const D: usize> Display for Mbr<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mbr({:?} - {:?})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_null_rectangle() {
        let null = Mbr::<2>::null();
        assert!(null.is_null());
        assert!(!null.is_well_formed());
        assert_eq!(null.area(), 0.0);
        assert_eq!(null.volume(), 0.0);
        assert_eq!(null.spherical_volume(), 0.0);
        assert_eq!(null.surface_area(), 0.0);
        assert!(!Mbr::<2>::zero().is_null());
    }

    #[test]
    fn test_union_absorbs_null() {
        let a = Mbr::new([1.0, 2.0], [3.0, 4.0]);
        assert_eq!(a.union(&Mbr::null()), a);
        assert_eq!(Mbr::null().union(&a), a);

        let b = Mbr::new([-1.0, 3.0], [2.0, 9.0]);
        assert_eq!(a.union(&b), Mbr::new([-1.0, 2.0], [3.0, 9.0]));
    }

    #[test]
    fn test_overlap_includes_touching_edges() {
        let a = Mbr::new([0.0, 0.0], [1.0, 1.0]);
        assert!(a.overlaps(&Mbr::new([1.0, 1.0], [2.0, 2.0])));
        assert!(a.overlaps(&Mbr::point([0.5, 0.5])));
        assert!(!a.overlaps(&Mbr::new([1.5, 0.0], [2.0, 1.0])));
        assert!(!a.overlaps(&Mbr::new([0.0, -2.0], [1.0, -0.5])));
    }

    #[test]
    fn test_containment() {
        let outer = Mbr::new([0.0, 0.0], [10.0, 10.0]);
        let inner = Mbr::new([2.0, 2.0], [3.0, 10.0]);
        assert!(inner.contained_in(&outer));
        assert!(!outer.contained_in(&inner));
        assert!(Mbr::null().contained_in(&inner));
        assert!(!inner.contained_in(&Mbr::null()));
    }

    #[test]
    fn test_measures_in_two_dimensions() {
        let mbr = Mbr::new([0.0, 0.0], [4.0, 2.0]);
        assert_eq!(mbr.area(), 8.0);
        assert_eq!(mbr.volume(), 8.0);
        assert_eq!(mbr.surface_area(), 12.0);
        // radius^2 = 2^2 + 1^2
        assert!((mbr.spherical_volume() - 5.0 * 3.141593).abs() < EPSILON);
    }

    #[test]
    fn test_measures_in_three_dimensions() {
        let cube = Mbr::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
        assert_eq!(cube.volume(), 8.0);
        assert_eq!(cube.area(), 4.0);
        assert_eq!(cube.surface_area(), 24.0);
        let radius = 3.0_f64.sqrt();
        assert!((cube.spherical_volume() - radius.powi(3) * 4.188790).abs() < EPSILON);
    }

    #[test]
    fn test_well_formed() {
        assert!(Mbr::new([0.0, 0.0], [0.0, 0.0]).is_well_formed());
        assert!(!Mbr::new([0.0, 1.0], [1.0, 0.0]).is_well_formed());
        assert!(!Mbr::new([f64::NAN, 0.0], [1.0, 1.0]).is_well_formed());
    }

    #[test]
    fn test_envelope_conversion() {
        let envelope = Envelope::new(1.0, 2.0, 3.0, 4.0);
        let mbr = Mbr::from(envelope);
        assert_eq!(mbr.min, [1.0, 2.0]);
        assert_eq!(mbr.max, [3.0, 4.0]);
        assert_eq!(mbr.to_envelope(), envelope);
    }
}
