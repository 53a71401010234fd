//! Piece catalog and rotation tests

use blockfall::core::pieces::{get_shape, kick_offsets, Shape, MAX_SHAPE_SIZE};
use blockfall::types::{PieceKind, RotateDirection};

#[test]
fn test_catalog_dimensions() {
    let expected = [
        (PieceKind::I, 4),
        (PieceKind::J, 3),
        (PieceKind::L, 3),
        (PieceKind::O, 2),
        (PieceKind::S, 3),
        (PieceKind::T, 3),
        (PieceKind::Z, 3),
    ];
    for (kind, size) in expected {
        let shape = get_shape(kind);
        assert_eq!((shape.rows(), shape.cols()), (size, size), "{:?}", kind);
        assert!(size <= MAX_SHAPE_SIZE);
        assert_eq!(shape.count(), 4, "{:?}", kind);
    }
}

#[test]
fn test_catalog_patterns() {
    assert_eq!(
        get_shape(PieceKind::I),
        Shape::from_pattern(&[".#..", ".#..", ".#..", ".#.."])
    );
    assert_eq!(
        get_shape(PieceKind::J),
        Shape::from_pattern(&[".#.", ".#.", "##."])
    );
    assert_eq!(
        get_shape(PieceKind::L),
        Shape::from_pattern(&[".#.", ".#.", ".##"])
    );
    assert_eq!(get_shape(PieceKind::O), Shape::from_pattern(&["##", "##"]));
    assert_eq!(
        get_shape(PieceKind::S),
        Shape::from_pattern(&[".##", "##.", "..."])
    );
    assert_eq!(
        get_shape(PieceKind::T),
        Shape::from_pattern(&["###", ".#.", "..."])
    );
    assert_eq!(
        get_shape(PieceKind::Z),
        Shape::from_pattern(&["##.", ".##", "..."])
    );
}

#[test]
fn test_four_rotations_are_identity() {
    for kind in PieceKind::ALL {
        for direction in [RotateDirection::Clockwise, RotateDirection::CounterClockwise] {
            let start = get_shape(kind);
            let mut shape = start;
            for _ in 0..4 {
                shape = shape.rotated(direction);
            }
            assert_eq!(shape, start, "{:?} {:?}", kind, direction);
        }
    }
}

#[test]
fn test_opposite_rotations_cancel() {
    for kind in PieceKind::ALL {
        let shape = get_shape(kind);
        for direction in [RotateDirection::Clockwise, RotateDirection::CounterClockwise] {
            assert_eq!(
                shape.rotated(direction).rotated(direction.opposite()),
                shape
            );
        }
    }
}

#[test]
fn test_rotation_preserves_cell_count() {
    for kind in PieceKind::ALL {
        let shape = get_shape(kind).rotated(RotateDirection::Clockwise);
        assert_eq!(shape.count(), 4);
    }
}

#[test]
fn test_i_piece_turns_horizontal() {
    let horizontal = get_shape(PieceKind::I).rotated(RotateDirection::Clockwise);
    assert_eq!(
        horizontal,
        Shape::from_pattern(&["....", "####", "....", "...."])
    );
}

#[test]
fn test_o_piece_rotation_is_stable() {
    let o = get_shape(PieceKind::O);
    assert_eq!(o.rotated(RotateDirection::Clockwise), o);
    assert_eq!(o.rotated(RotateDirection::CounterClockwise), o);
}

#[test]
fn test_kick_offsets_bounded_by_width() {
    let offsets: Vec<i8> = kick_offsets(3).collect();
    assert_eq!(offsets, vec![1, -1, 2, -2, 3, -3]);
    assert_eq!(kick_offsets(0).count(), 0);
}
