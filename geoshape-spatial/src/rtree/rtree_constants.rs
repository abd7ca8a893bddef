//! Constants for the in-memory R-Tree.

/// Page size the default node capacity is derived from
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Bytes of a page taken by the node header (count and level)
pub const NODE_HEADER_SIZE: usize = 8;

/// Bytes taken by the child reference of a branch
pub const CHILD_REF_SIZE: usize = 8;

/// Highest dimensionality the spherical volume table covers
pub const MAX_DIMENSIONS: usize = 20;

/// Volumes of the unit n-ball for dimensions 0 through 20
pub const UNIT_SPHERE_VOLUMES: [f64; MAX_DIMENSIONS + 1] = [
    0.000000, // dimension 0
    2.000000, // dimension 1
    3.141593, // dimension 2
    4.188790, // dimension 3
    4.934802, // dimension 4
    5.263789, // dimension 5
    5.167713, // dimension 6
    4.724766, // dimension 7
    4.058712, // dimension 8
    3.298509, // dimension 9
    2.550164, // dimension 10
    1.884104, // dimension 11
    1.335263, // dimension 12
    0.910629, // dimension 13
    0.599265, // dimension 14
    0.381443, // dimension 15
    0.235331, // dimension 16
    0.140981, // dimension 17
    0.082146, // dimension 18
    0.046622, // dimension 19
    0.025807, // dimension 20
];
