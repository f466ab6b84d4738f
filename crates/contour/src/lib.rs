//! Iso-density contour extraction and GeoJSON polygon output.
//!
//! [`marching`] turns a [`density::DensityGrid`] into per-cell boundary
//! segments; [`polygon`] wraps those segments as Polygon features.

pub mod marching;
pub mod polygon;

pub use marching::{
    cell_index, cell_segments, edge_pairs, extract_contour_levels, extract_contours,
    generate_threshold_levels, march_squares, threshold_at_fraction, Contour, Edge,
    LevelContours, Point, Segment, DEFAULT_THRESHOLD, MAX_THRESHOLD_LEVELS,
};
pub use polygon::{encode_polygons, PolygonFeature, PolygonFeatureCollection, PolygonGeometry};
