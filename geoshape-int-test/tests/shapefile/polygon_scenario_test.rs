use geoshape::{AccessMode, ShapeBuilder, ShapeFile, ShapeType};
use geoshape_int_test::test_util::{cleanup, create_test_context, run_test, square};

fn turn(x: &[f64], y: &[f64]) -> f64 {
    (x[1] - x[0]) * (y[2] - y[1]) - (y[1] - y[0]) * (x[2] - x[1])
}

#[test]
fn test_square_polygon_survives_reopen() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Polygon)?;
            let ring = ShapeBuilder::new(ShapeType::Polygon)
                .xy(&[0.0, 4.0, 4.0, 0.0, 0.0], &[0.0, 0.0, 4.0, 4.0, 0.0])
                .build()?;
            assert_eq!(file.write_shape(-1, &ring)?, 0);
            file.close()?;

            let mut file = ShapeFile::open(ctx.shp_path(), AccessMode::ReadOnly)?;
            let (shape_type, bounds) = file.read_object_bounds(0, None)?.expect("square has vertices");
            assert_eq!(shape_type, ShapeType::Polygon);
            assert_eq!(
                (bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max),
                (0.0, 0.0, 4.0, 4.0)
            );

            let shape = file.read_shape(0)?;
            assert_eq!(shape.id(), 0);
            assert_eq!(shape.area().abs(), 16.0);
            // counter-clockwise on disk, so the signed area is positive
            assert_eq!(shape.area().signum(), turn(shape.x(), shape.y()).signum());
            assert_eq!(shape.area(), 16.0);
            assert_eq!(shape.length(), 16.0);

            let info = file.info();
            assert_eq!(info.record_count, 1);
            assert_eq!(info.shape_type, ShapeType::Polygon);
            assert_eq!(info.bounds.envelope(), bounds.envelope());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_rewound_square_is_stored_clockwise() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Polygon)?;
            file.write_shape(-1, &square(ShapeType::Polygon, 0.0, 0.0, 4.0)?)?;
            file.close()?;

            let mut file = ShapeFile::open(ctx.base_path(), AccessMode::ReadWrite)?;
            let mut shape = file.read_shape(0)?;
            assert_eq!(shape.rewind(), 1);
            assert_eq!(shape.rewind(), 0);
            assert_eq!(file.write_shape(0, &shape)?, 0);
            let size_before = file.file_size();
            file.close()?;

            let mut file = ShapeFile::open(ctx.shp_path(), AccessMode::ReadOnly)?;
            assert_eq!(file.file_size(), size_before);
            let shape = file.read_shape(0)?;
            assert_eq!(shape.area(), -16.0);
            assert!(turn(shape.x(), shape.y()) < 0.0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_polygon_with_hole() {
    run_test(
        || create_test_context(),
        |ctx| {
            // outer ring clockwise, hole counter-clockwise
            let donut = ShapeBuilder::new(ShapeType::Polygon)
                .parts(&[0, 5])
                .xy(
                    &[0.0, 0.0, 10.0, 10.0, 0.0, 2.0, 4.0, 4.0, 2.0, 2.0],
                    &[0.0, 10.0, 10.0, 0.0, 0.0, 2.0, 2.0, 4.0, 4.0, 2.0],
                )
                .build()?;

            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Polygon)?;
            file.write_shape(-1, &donut)?;
            file.close()?;

            let mut file = ShapeFile::open(ctx.shp_path(), AccessMode::ReadOnly)?;
            let mut shape = file.read_shape(0)?;
            assert_eq!(shape.part_count(), 2);
            // part starts followed by the vertex-count sentinel
            assert_eq!(shape.parts(), &[0, 5, 10]);
            assert_eq!(shape.area(), -100.0 + 4.0);
            assert_eq!(shape.rewind(), 0);
            assert_eq!(shape.validate_polygon(false), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
