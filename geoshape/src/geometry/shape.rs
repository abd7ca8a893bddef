use std::ops::Range;

use log::warn;
use serde::{Deserialize, Serialize};

use super::rings::{area_of_xys, crosses_odd, length_of_xys, winding_sum};
use crate::bounds::{Bounds, Envelope};
use crate::errors::{ErrorKind, GeoShapeError, GeoShapeResult};
use crate::shape_type::{PartType, ShapeType};

/// Id of a shape that has not been written yet; writing it appends.
pub const UNASSIGNED_ID: i32 = -1;

/// One decoded or to-be-encoded geometry record.
///
/// Vertices are kept as four parallel arrays. Z and M always have one entry
/// per vertex; for types without Z or M they are all zero. Shapes with parts
/// store the part starts followed by a sentinel equal to the vertex count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    shape_type: ShapeType,
    id: i32,
    parts: Vec<usize>,
    part_types: Vec<PartType>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    m: Vec<f64>,
    bounds: Bounds,
}

impl Shape {
    /// A Null shape, valid in a file of any type.
    pub fn null() -> Shape {
        Shape {
            shape_type: ShapeType::Null,
            id: UNASSIGNED_ID,
            parts: Vec::new(),
            part_types: Vec::new(),
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            m: Vec::new(),
            bounds: Bounds::default(),
        }
    }

    /// Single-part shape with id -1 and no measures.
    pub fn simple(
        shape_type: ShapeType,
        x: &[f64],
        y: &[f64],
        z: Option<&[f64]>,
    ) -> GeoShapeResult<Shape> {
        let mut builder = ShapeBuilder::new(shape_type).xy(x, y);
        if let Some(z) = z {
            builder = builder.z(z);
        }
        builder.build()
    }

    /// Assembles a shape from decoded record parts. The record codec has
    /// already checked array lengths and part ranges.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_decoded(
        shape_type: ShapeType,
        id: i32,
        parts: Vec<usize>,
        part_types: Vec<PartType>,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        m: Vec<f64>,
        bounds: Bounds,
    ) -> Shape {
        Shape {
            shape_type,
            id,
            parts,
            part_types,
            x,
            y,
            z,
            m,
            bounds,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    pub fn vertex_count(&self) -> usize {
        self.x.len()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len().saturating_sub(1)
    }

    /// Part starts followed by the vertex-count sentinel. Empty for shapes
    /// without parts.
    pub fn parts(&self) -> &[usize] {
        &self.parts
    }

    pub fn part_types(&self) -> &[PartType] {
        &self.part_types
    }

    /// Vertex index range of one part.
    pub fn part_range(&self, part: usize) -> Range<usize> {
        self.parts[part]..self.parts[part + 1]
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    pub fn m(&self) -> &[f64] {
        &self.m
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn envelope(&self) -> Envelope {
        self.bounds.envelope()
    }

    /// Recomputes the extent from the vertices. A shape without vertices
    /// keeps whatever extent it had.
    pub fn compute_extents(&mut self) {
        if self.x.is_empty() {
            return;
        }
        let mut bounds = Bounds::from_vertex(self.x[0], self.y[0], self.z[0], self.m[0]);
        for i in 1..self.x.len() {
            bounds.expand(self.x[i], self.y[i], self.z[i], self.m[i]);
        }
        self.bounds = bounds;
    }

    /// Total polyline length of all parts. Zero for points and Null.
    pub fn length(&self) -> f64 {
        if !self.shape_type.has_parts() {
            return 0.0;
        }
        (0..self.part_count())
            .map(|part| {
                let range = self.part_range(part);
                length_of_xys(&self.x[range.clone()], &self.y[range])
            })
            .sum()
    }

    /// Sum of the signed ring areas, positive when counter-clockwise.
    /// Zero for anything but polygons and multipatches.
    pub fn area(&self) -> f64 {
        if !self.shape_type.is_polygon() && self.shape_type != ShapeType::MultiPatch {
            return 0.0;
        }
        (0..self.part_count())
            .map(|part| {
                let range = self.part_range(part);
                area_of_xys(&self.x[range.clone()], &self.y[range])
            })
            .sum()
    }

    /// Reverses the vertex order of every part with more than three vertices.
    pub fn reverse_points(&mut self) {
        if self.x.len() < 2 {
            return;
        }
        for part in 0..self.part_count() {
            let range = self.part_range(part);
            if range.len() > 3 {
                self.reverse_range(range);
            }
        }
    }

    /// Rewinds polygon rings so that rings on the outside wind
    /// counter-clockwise when `desired_ccw` is set (clockwise otherwise) and
    /// holes wind the other way.
    ///
    /// A ring is a hole when its first vertex lies inside an odd number of
    /// the other rings. Returns the number of rings that were reversed, or -1
    /// when the shape is not a polygon.
    ///
    /// Nesting is treated as two levels only: an island inside a hole is
    /// classified by crossing parity like any other ring.
    pub fn rewind_to_orientation(&mut self, desired_ccw: bool) -> i32 {
        if !self.shape_type.is_polygon() {
            return -1;
        }
        if self.x.is_empty() || self.part_count() == 0 {
            return 0;
        }

        let mut altered = 0;
        for ring in 0..self.part_count() {
            let range = self.part_range(ring);
            if range.is_empty() {
                continue;
            }

            let test_x = self.x[range.start];
            let test_y = self.y[range.start];
            let mut inner = false;
            for other in 0..self.part_count() {
                if other == ring {
                    continue;
                }
                let other_range = self.part_range(other);
                if crosses_odd(
                    &self.x[other_range.clone()],
                    &self.y[other_range],
                    test_x,
                    test_y,
                ) {
                    inner = !inner;
                }
            }

            let sum = winding_sum(&self.x[range.clone()], &self.y[range.clone()]);
            let want_ccw = inner ^ desired_ccw;
            if (sum > 0.0 && !want_ccw) || (sum < 0.0 && want_ccw) {
                self.reverse_range(range);
                altered += 1;
            }
        }
        altered
    }

    /// Rewinds to the on-disk convention: outer rings clockwise, holes
    /// counter-clockwise.
    pub fn rewind(&mut self) -> i32 {
        self.rewind_to_orientation(false)
    }

    /// Normalizes ring winding, then flips every part if the total signed
    /// area does not match the requested orientation.
    ///
    /// Returns -1 for non-polygons, 1 when the final flip was needed and the
    /// rewind count otherwise.
    pub fn validate_polygon(&mut self, ccw: bool) -> i32 {
        if !self.shape_type.is_polygon() {
            return -1;
        }
        let rewound = self.rewind();
        let area = self.area();
        if (area > 0.0) == ccw {
            rewound
        } else {
            self.reverse_points();
            1
        }
    }

    fn reverse_range(&mut self, range: Range<usize>) {
        self.x[range.clone()].reverse();
        self.y[range.clone()].reverse();
        self.z[range.clone()].reverse();
        self.m[range].reverse();
    }
}

/// Builder that validates caller-supplied arrays into a [`Shape`].
///
/// # Examples
///
/// ```rust,ignore
/// use geoshape::{ShapeBuilder, ShapeType};
///
/// let square = ShapeBuilder::new(ShapeType::Polygon)
///     .parts(&[0])
///     .xy(&[0.0, 4.0, 4.0, 0.0, 0.0], &[0.0, 0.0, 4.0, 4.0, 0.0])
///     .build()?;
/// assert_eq!(square.area(), 16.0);
/// ```
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
    shape_type: ShapeType,
    id: i32,
    parts: Vec<usize>,
    part_types: Option<Vec<PartType>>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Option<Vec<f64>>,
    m: Option<Vec<f64>>,
}

impl ShapeBuilder {
    pub fn new(shape_type: ShapeType) -> ShapeBuilder {
        ShapeBuilder {
            shape_type,
            id: UNASSIGNED_ID,
            parts: Vec::new(),
            part_types: None,
            x: Vec::new(),
            y: Vec::new(),
            z: None,
            m: None,
        }
    }

    pub fn id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    /// Start vertex of each part, without the trailing sentinel.
    pub fn parts(mut self, starts: &[usize]) -> Self {
        self.parts = starts.to_vec();
        self
    }

    pub fn part_types(mut self, part_types: &[PartType]) -> Self {
        self.part_types = Some(part_types.to_vec());
        self
    }

    pub fn xy(mut self, x: &[f64], y: &[f64]) -> Self {
        self.x = x.to_vec();
        self.y = y.to_vec();
        self
    }

    pub fn z(mut self, z: &[f64]) -> Self {
        self.z = Some(z.to_vec());
        self
    }

    pub fn m(mut self, m: &[f64]) -> Self {
        self.m = Some(m.to_vec());
        self
    }

    pub fn build(self) -> GeoShapeResult<Shape> {
        let ShapeBuilder {
            shape_type,
            id,
            parts,
            part_types,
            x,
            y,
            z,
            m,
        } = self;
        let count = x.len();

        if y.len() != count {
            return Err(invalid(format!(
                "{} X values but {} Y values",
                count,
                y.len()
            )));
        }
        let z = fill_axis("Z", z, count, shape_type.has_z())?;
        let m = fill_axis("M", m, count, shape_type.has_m())?;

        if shape_type == ShapeType::Null {
            if count > 0 {
                return Err(invalid(format!("Null shape given {} vertices", count)));
            }
            let mut shape = Shape::null();
            shape.id = id;
            return Ok(shape);
        }
        if shape_type.is_point() && count != 1 {
            return Err(invalid(format!(
                "{} needs exactly one vertex, got {}",
                shape_type, count
            )));
        }

        let (parts, part_types) = if shape_type.has_parts() {
            build_parts(parts, part_types, count)?
        } else {
            (Vec::new(), Vec::new())
        };

        let mut shape = Shape {
            shape_type,
            id,
            parts,
            part_types,
            x,
            y,
            z,
            m,
            bounds: Bounds::default(),
        };
        shape.compute_extents();
        Ok(shape)
    }
}

fn invalid(message: String) -> GeoShapeError {
    GeoShapeError::new(&message, ErrorKind::ValidationError)
}

fn fill_axis(
    axis: &str,
    values: Option<Vec<f64>>,
    count: usize,
    carried: bool,
) -> GeoShapeResult<Vec<f64>> {
    match values {
        Some(values) if values.len() != count => Err(invalid(format!(
            "{} values for {} vertices on axis {}",
            values.len(),
            count,
            axis
        ))),
        Some(values) if carried => Ok(values),
        _ => Ok(vec![0.0; count]),
    }
}

fn build_parts(
    mut starts: Vec<usize>,
    part_types: Option<Vec<PartType>>,
    count: usize,
) -> GeoShapeResult<(Vec<usize>, Vec<PartType>)> {
    if starts.is_empty() {
        starts.push(0);
    }
    if starts[0] != 0 {
        warn!("first part starts at vertex {}, resetting it to 0", starts[0]);
        starts[0] = 0;
    }
    for pair in starts.windows(2) {
        if pair[1] < pair[0] {
            return Err(invalid(format!(
                "part starts must not decrease ({} after {})",
                pair[1], pair[0]
            )));
        }
    }
    if let Some(last) = starts.last() {
        if *last > count {
            return Err(invalid(format!(
                "part start {} beyond vertex count {}",
                last, count
            )));
        }
    }

    let part_types = match part_types {
        Some(types) if types.len() != starts.len() => {
            return Err(invalid(format!(
                "{} part types for {} parts",
                types.len(),
                starts.len()
            )))
        }
        Some(types) => types,
        None => vec![PartType::Ring; starts.len()],
    };

    starts.push(count);
    Ok((starts, part_types))
}
