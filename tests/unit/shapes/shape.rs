use super::*;
use crate::foundation::error::ErrorKind;

const RED: Color = Color::rgba(255, 0, 0, 255);

#[test]
fn arrow_points_along_z() {
    let arrow = Shape::arrow("arr", 0.5, -5.0, RED).unwrap();
    match arrow {
        Shape::Arrows3D {
            vector, radius, ..
        } => {
            assert_eq!(vector, Vec3::new(0.0, 0.0, -5.0));
            assert_eq!(radius, 0.5);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(Shape::arrow("arr", 0.5, 0.0, RED).is_err());
    assert!(Shape::arrow("arr", -0.5, 1.0, RED).is_err());
}

#[test]
fn square_face_is_triangulated() {
    let face = Shape::square_face(
        [
            Vec3::new(-4.0, 0.0, 1.0),
            Vec3::new(2.0, 6.0, 2.0),
            Vec3::new(3.0, 2.0, 3.0),
            Vec3::new(5.0, 4.0, 4.0),
        ],
        RED,
    )
    .unwrap();
    match face {
        Shape::Mesh3D {
            vertex_positions,
            triangle_indices,
            ..
        } => {
            assert_eq!(vertex_positions.len(), 4);
            assert_eq!(triangle_indices, SQUARE_FACE_TRIANGLES.to_vec());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn constructors_reject_bad_numbers() {
    let err = Shape::boxes("b", Vec3::new(1.0, 0.0, 1.0), RED).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(Shape::sphere("s", f32::NAN, RED).is_err());
    assert!(Shape::capsule(0.5, -1.0, RED).is_err());
    assert!(Shape::curve("c", vec![Vec3::ZERO], 0.1, RED).is_err());
    assert!(
        Shape::triangle_face([Vec3::ZERO, Vec3::X, Vec3::splat(f32::INFINITY)], RED).is_err()
    );
    assert!(Shape::mesh_from_path("").is_err());
}

#[test]
fn resize_changes_parameters_in_place() {
    let mut arrow = Shape::arrow("arr", 0.5, 5.0, RED).unwrap();
    arrow.resize_arrow(1.0, 2.0).unwrap();
    assert_eq!(arrow, Shape::arrow("arr", 1.0, 2.0, RED).unwrap());

    let mut capsule = Shape::capsule(0.5, 5.0, RED).unwrap();
    capsule.resize_capsule(0.25, 1.0).unwrap();
    assert_eq!(capsule, Shape::capsule(0.25, 1.0, RED).unwrap());

    let err = capsule.resize_arrow(1.0, 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(capsule, Shape::capsule(0.25, 1.0, RED).unwrap());
}

#[test]
fn curve_mutators_keep_colors_consistent() {
    let pts = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    let mut curve = Shape::curve("c", pts, 0.1, RED).unwrap();

    curve
        .set_curve_colors(vec![RED, Color::rgba(0, 255, 0, 255), RED])
        .unwrap();
    assert!(curve.set_curve_colors(vec![RED, RED]).is_err());

    curve.set_curve_points(vec![Vec3::ZERO, Vec3::Z]).unwrap();
    match &curve {
        Shape::LineStrips3D { points, colors, .. } => {
            assert_eq!(points.len(), 2);
            assert_eq!(colors, &vec![RED]);
        }
        other => panic!("unexpected {other:?}"),
    }

    curve.set_curve_line_width(0.5).unwrap();
    assert!(curve.set_curve_line_width(0.0).is_err());
    match curve {
        Shape::LineStrips3D { radius, .. } => assert_eq!(radius, 0.5),
        other => panic!("unexpected {other:?}"),
    }

    let mut sphere = Shape::sphere("s", 1.0, RED).unwrap();
    assert!(sphere.set_curve_line_width(1.0).is_err());
}

#[test]
fn serializes_with_archetype_tag() {
    let v = serde_json::to_value(Shape::capsule(0.5, 5.0, RED).unwrap()).unwrap();
    assert_eq!(v["archetype"], "capsules3d");
    assert_eq!(v["color"], serde_json::json!([255, 0, 0, 255]));
    assert_eq!(ShapeKind::Capsules3D.to_string(), "Capsules3D");
}
