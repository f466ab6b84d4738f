//! Tests for BoundingBox construction and queries.

use kde_common::bbox::BoundingBox;

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(121.45, 24.96, 121.67, 25.21);
    assert_eq!(bbox.min_x, 121.45);
    assert_eq!(bbox.min_y, 24.96);
    assert_eq!(bbox.max_x, 121.67);
    assert_eq!(bbox.max_y, 25.21);
}

#[test]
fn test_bbox_from_points_single() {
    let bbox = BoundingBox::from_points([(3.0, -4.0)]).unwrap();
    assert_eq!(bbox, BoundingBox::new(3.0, -4.0, 3.0, -4.0));
    assert!(bbox.is_degenerate());
}

#[test]
fn test_bbox_from_points_order_independent() {
    let a = BoundingBox::from_points([(0.0, 0.0), (2.0, 1.0), (-1.0, 3.0)]).unwrap();
    let b = BoundingBox::from_points([(-1.0, 3.0), (0.0, 0.0), (2.0, 1.0)]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_bbox_from_points_nan_is_not_finite() {
    let bbox = BoundingBox::from_points([(f64::NAN, 0.0), (f64::NAN, 1.0)]).unwrap();
    assert!(!bbox.is_finite());
}

// ============================================================================
// Degeneracy tests
// ============================================================================

#[test]
fn test_bbox_degenerate_on_one_axis() {
    assert!(BoundingBox::new(0.0, 0.0, 0.0, 5.0).is_degenerate());
    assert!(BoundingBox::new(0.0, 5.0, 5.0, 5.0).is_degenerate());
}
