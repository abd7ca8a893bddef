use geoshape::{AccessMode, ErrorKind, Shape, ShapeBuilder, ShapeFile, ShapeType};
use geoshape_int_test::test_util::{cleanup, create_test_context, run_test, square};

fn line(shape_type: ShapeType, n: usize, offset: f64) -> Shape {
    let x: Vec<f64> = (0..n).map(|i| i as f64 + offset).collect();
    let y: Vec<f64> = (0..n).map(|i| (i * i) as f64).collect();
    let m: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
    let builder = ShapeBuilder::new(shape_type).xy(&x, &y);
    let builder = if shape_type.has_m() { builder.m(&m) } else { builder };
    builder.build().expect("valid line")
}

#[test]
fn test_overwrite_in_place_and_relocate() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Arc)?;
            file.write_shape(-1, &line(ShapeType::Arc, 3, 0.0))?;
            file.write_shape(-1, &line(ShapeType::Arc, 3, 50.0))?;
            let first = file.record_entry(0).expect("first record");
            let size_after_append = file.file_size();

            // same size fits the old slot
            assert_eq!(file.write_shape(0, &line(ShapeType::Arc, 3, 10.0))?, 0);
            assert_eq!(file.record_entry(0).expect("first record").offset, first.offset);
            assert_eq!(file.file_size(), size_after_append);

            // a longer line moves to the end and leaves the old slot behind
            let longer = line(ShapeType::Arc, 10, 20.0);
            assert_eq!(file.write_shape(0, &longer)?, 0);
            let moved = file.record_entry(0).expect("first record");
            assert_eq!(moved.offset, size_after_append);
            assert_eq!(file.file_size(), size_after_append + moved.size + 8);
            file.close()?;

            let mut file = ShapeFile::open(ctx.shp_path(), AccessMode::ReadOnly)?;
            assert_eq!(file.record_count(), 2);
            assert_eq!(file.read_shape(0)?.x(), longer.x());
            assert_eq!(file.read_shape(1)?.x()[0], 50.0);
            assert_eq!(file.bounds().x_max, 52.0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_shorter_overwrite_drops_stale_measures() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::ArcM)?;
            file.write_shape(-1, &line(ShapeType::ArcM, 6, 0.0))?;
            let old = file.record_entry(0).expect("record");

            let short = line(ShapeType::ArcM, 2, 0.0);
            file.write_shape(0, &short)?;
            let new = file.record_entry(0).expect("record");
            assert_eq!(new.offset, old.offset);
            assert!(new.size < old.size);
            file.close()?;

            let mut file = ShapeFile::open(ctx.base_path(), AccessMode::ReadOnly)?;
            let shape = file.read_shape(0)?;
            assert_eq!(shape.vertex_count(), 2);
            assert_eq!(shape.m(), &[100.0, 101.0]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_id_past_end_appends() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Polygon)?;
            assert_eq!(file.write_shape(5, &square(ShapeType::Polygon, 0.0, 0.0, 1.0)?)?, 0);
            assert_eq!(file.write_shape(-1, &square(ShapeType::Polygon, 1.0, 0.0, 1.0)?)?, 1);
            assert_eq!(file.record_count(), 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_rejected_writes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Polygon)?;
            let arc = line(ShapeType::Arc, 3, 0.0);
            let err = file.write_shape(-1, &arc).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvariantViolation);

            let err = file
                .write_shape(-2, &square(ShapeType::Polygon, 0.0, 0.0, 1.0)?)
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            assert_eq!(file.record_count(), 0);
            file.close()?;

            let mut file = ShapeFile::open(ctx.base_path(), AccessMode::ReadOnly)?;
            let err = file
                .write_shape(-1, &square(ShapeType::Polygon, 0.0, 0.0, 1.0)?)
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            let err = file.read_shape(0).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_open_missing_and_corrupt_pairs() {
    run_test(
        || create_test_context(),
        |ctx| {
            let err = ShapeFile::open(ctx.base_path(), AccessMode::ReadOnly).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FileNotFound);

            std::fs::write(ctx.shp_path(), [0u8; 100])?;
            std::fs::write(ctx.shx_path(), [0u8; 100])?;
            let err = ShapeFile::open(ctx.base_path(), AccessMode::ReadOnly).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FormatError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
