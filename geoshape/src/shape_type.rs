//! Shape type and part type codes of the shapefile format.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The geometry variant stored in a file or a single record.
///
/// The discriminants are the numeric codes written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    Arc = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    ArcZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    ArcM = 23,
    PolygonM = 25,
    MultiPointM = 28,
    MultiPatch = 31,
}

/// Coarse geometry family of a shape type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeFamily {
    Nil,
    Point,
    Line,
    Polygon,
}

impl ShapeType {
    /// Maps an on-disk code to a shape type, `None` for unknown codes.
    pub fn from_code(code: i32) -> Option<ShapeType> {
        let shape_type = match code {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::Arc,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::ArcZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::ArcM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            31 => ShapeType::MultiPatch,
            _ => return None,
        };
        Some(shape_type)
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeType::Null => "NullShape",
            ShapeType::Point => "Point",
            ShapeType::Arc => "Arc",
            ShapeType::Polygon => "Polygon",
            ShapeType::MultiPoint => "MultiPoint",
            ShapeType::PointZ => "PointZ",
            ShapeType::ArcZ => "ArcZ",
            ShapeType::PolygonZ => "PolygonZ",
            ShapeType::MultiPointZ => "MultiPointZ",
            ShapeType::PointM => "PointM",
            ShapeType::ArcM => "ArcM",
            ShapeType::PolygonM => "PolygonM",
            ShapeType::MultiPointM => "MultiPointM",
            ShapeType::MultiPatch => "MultiPatch",
        }
    }

    /// True when records of this type carry a Z block.
    pub fn has_z(self) -> bool {
        matches!(
            self,
            ShapeType::ArcZ
                | ShapeType::PointZ
                | ShapeType::PolygonZ
                | ShapeType::MultiPointZ
                | ShapeType::MultiPatch
        )
    }

    /// True when records of this type may carry an M block.
    pub fn has_m(self) -> bool {
        self.has_z()
            || matches!(
                self,
                ShapeType::ArcM | ShapeType::PointM | ShapeType::PolygonM | ShapeType::MultiPointM
            )
    }

    /// Arc, Polygon and MultiPatch records are laid out as parts + vertices.
    pub fn has_parts(self) -> bool {
        matches!(
            self,
            ShapeType::Arc
                | ShapeType::ArcZ
                | ShapeType::ArcM
                | ShapeType::Polygon
                | ShapeType::PolygonZ
                | ShapeType::PolygonM
                | ShapeType::MultiPatch
        )
    }

    pub fn is_point(self) -> bool {
        matches!(self, ShapeType::Point | ShapeType::PointZ | ShapeType::PointM)
    }

    pub fn is_multipoint(self) -> bool {
        matches!(
            self,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM
        )
    }

    pub fn is_polygon(self) -> bool {
        matches!(
            self,
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM
        )
    }

    pub fn is_arc(self) -> bool {
        matches!(self, ShapeType::Arc | ShapeType::ArcZ | ShapeType::ArcM)
    }

    /// Geometry family, `None` for MultiPatch which belongs to none of them.
    pub fn family(self) -> Option<ShapeFamily> {
        if self.is_polygon() {
            Some(ShapeFamily::Polygon)
        } else if self.is_arc() {
            Some(ShapeFamily::Line)
        } else if self.is_point() || self.is_multipoint() {
            Some(ShapeFamily::Point)
        } else if self == ShapeType::Null {
            Some(ShapeFamily::Nil)
        } else {
            None
        }
    }
}

impl Display for ShapeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Name of a raw shape type code, "UnknownShapeType" for codes outside the format.
pub fn type_name(code: i32) -> &'static str {
    ShapeType::from_code(code)
        .map(ShapeType::name)
        .unwrap_or("UnknownShapeType")
}

/// Kind of a single part. Only MultiPatch stores it on disk, every other
/// type reads back as `Ring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum PartType {
    TriangleStrip = 0,
    TriangleFan = 1,
    OuterRing = 2,
    InnerRing = 3,
    FirstRing = 4,
    #[default]
    Ring = 5,
}

impl PartType {
    pub fn from_code(code: i32) -> Option<PartType> {
        let part_type = match code {
            0 => PartType::TriangleStrip,
            1 => PartType::TriangleFan,
            2 => PartType::OuterRing,
            3 => PartType::InnerRing,
            4 => PartType::FirstRing,
            5 => PartType::Ring,
            _ => return None,
        };
        Some(part_type)
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            PartType::TriangleStrip => "TriangleStrip",
            PartType::TriangleFan => "TriangleFan",
            PartType::OuterRing => "OuterRing",
            PartType::InnerRing => "InnerRing",
            PartType::FirstRing => "FirstRing",
            PartType::Ring => "Ring",
        }
    }
}

impl Display for PartType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Name of a raw part type code, "UnknownPartType" for codes outside the format.
pub fn part_type_name(code: i32) -> &'static str {
    PartType::from_code(code)
        .map(PartType::name)
        .unwrap_or("UnknownPartType")
}
