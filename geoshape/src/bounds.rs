use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Minimum and maximum over the four coordinate axes X, Y, Z and M.
///
/// `Bounds` is used for the extent of a single shape, for the running
/// file-wide extent kept in the header and for the result of a bounds-only
/// record read. A file that has never been written to has all-zero bounds.
///
/// # Examples
///
/// ```rust,ignore
/// use geoshape::Bounds;
///
/// let mut bounds = Bounds::from_vertex(0.0, 0.0, 0.0, 0.0);
/// bounds.expand(4.0, 4.0, 1.0, 0.0);
/// assert_eq!(bounds.x_max, 4.0);
/// ```
#[derive(Clone, Copy, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
    pub m_min: f64,
    pub m_max: f64,
}

impl Bounds {
    /// Degenerate bounds covering a single vertex.
    pub fn from_vertex(x: f64, y: f64, z: f64, m: f64) -> Bounds {
        Bounds {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
            z_min: z,
            z_max: z,
            m_min: m,
            m_max: m,
        }
    }

    /// Grows the bounds so they include the given vertex.
    pub fn expand(&mut self, x: f64, y: f64, z: f64, m: f64) {
        self.x_min = self.x_min.min(x);
        self.y_min = self.y_min.min(y);
        self.x_max = self.x_max.max(x);
        self.y_max = self.y_max.max(y);
        self.z_min = self.z_min.min(z);
        self.z_max = self.z_max.max(z);
        self.m_min = self.m_min.min(m);
        self.m_max = self.m_max.max(m);
    }

    /// True when the X/Y part is all zero, the "no data yet" state of a
    /// freshly created file.
    pub fn is_empty_xy(&self) -> bool {
        self.x_min == 0.0 && self.y_min == 0.0 && self.x_max == 0.0 && self.y_max == 0.0
    }

    /// The X/Y rectangle of these bounds.
    pub fn envelope(&self) -> Envelope {
        Envelope::new(self.x_min, self.y_min, self.x_max, self.y_max)
    }

    /// Minimum values in header order (X, Y, Z, M).
    pub fn min(&self) -> [f64; 4] {
        [self.x_min, self.y_min, self.z_min, self.m_min]
    }

    /// Maximum values in header order (X, Y, Z, M).
    pub fn max(&self) -> [f64; 4] {
        [self.x_max, self.y_max, self.z_max, self.m_max]
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bounds(x: {}..{}, y: {}..{}, z: {}..{}, m: {}..{})",
            self.x_min, self.x_max, self.y_min, self.y_max, self.z_min, self.z_max, self.m_min,
            self.m_max
        )
    }
}

/// An axis-aligned X/Y rectangle.
///
/// The field order matches the in-memory layout of a two-dimensional
/// R-tree rectangle (all minimums, then all maximums), so an envelope can be
/// handed to the shape index directly.
#[derive(Clone, Copy, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Envelope {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Envelope {
        Envelope {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }
}

impl Display for Envelope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Envelope({}, {}, {}, {})",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}
