use geoshape::{AccessMode, PartType, Shape, ShapeBuilder, ShapeFile, ShapeType};
use geoshape_int_test::test_util::{cleanup, create_test_context, read_be_word, run_test};

fn sample(shape_type: ShapeType) -> Shape {
    let x = [1.0, 5.0, 5.0, 1.0, 1.0, 2.0];
    let y = [1.0, 1.0, 6.0, 6.0, 1.0, 3.0];
    let z = [10.0, 11.0, 12.0, 13.0, 10.0, -4.0];
    let m = [0.5, 1.5, 2.5, 3.5, 0.5, 9.0];

    let mut builder = ShapeBuilder::new(shape_type).id(7);
    builder = if shape_type.is_point() {
        builder.xy(&x[..1], &y[..1])
    } else if shape_type.has_parts() {
        builder.parts(&[0, 3]).xy(&x, &y)
    } else {
        builder.xy(&x, &y)
    };
    if shape_type == ShapeType::MultiPatch {
        builder = builder.part_types(&[PartType::TriangleStrip, PartType::Ring]);
    }
    let n = if shape_type.is_point() { 1 } else { x.len() };
    if shape_type.has_z() {
        builder = builder.z(&z[..n]);
    }
    if shape_type.has_m() {
        builder = builder.m(&m[..n]);
    }
    builder.build().expect("valid sample")
}

#[test]
fn test_every_type_round_trips_through_disk() {
    run_test(
        || create_test_context(),
        |ctx| {
            let types = [
                ShapeType::Point,
                ShapeType::Arc,
                ShapeType::Polygon,
                ShapeType::MultiPoint,
                ShapeType::PointZ,
                ShapeType::ArcZ,
                ShapeType::PolygonZ,
                ShapeType::MultiPointZ,
                ShapeType::PointM,
                ShapeType::ArcM,
                ShapeType::PolygonM,
                ShapeType::MultiPointM,
                ShapeType::MultiPatch,
            ];

            for shape_type in types {
                let base = ctx.dir().join(format!("layer_{}", shape_type.code()));
                let original = sample(shape_type);

                let mut file = ShapeFile::create(&base, shape_type)?;
                assert_eq!(file.write_shape(-1, &original)?, 0);
                file.close()?;

                let mut file = ShapeFile::open(&base, AccessMode::ReadOnly)?;
                assert_eq!(file.shape_type(), shape_type);
                let shape = file.read_shape(0)?;
                assert_eq!(shape.shape_type(), shape_type, "{}", shape_type);
                assert_eq!(shape.id(), 0);
                assert_eq!(shape.x(), original.x(), "{}", shape_type);
                assert_eq!(shape.y(), original.y(), "{}", shape_type);
                assert_eq!(shape.parts(), original.parts(), "{}", shape_type);
                assert_eq!(shape.part_types(), original.part_types(), "{}", shape_type);
                if shape_type.has_z() {
                    assert_eq!(shape.z(), original.z(), "{}", shape_type);
                }
                if shape_type == ShapeType::MultiPatch {
                    // measures are never written for multipatches
                    assert!(shape.m().iter().all(|m| *m == 0.0));
                } else if shape_type.has_m() {
                    assert_eq!(shape.m(), original.m(), "{}", shape_type);
                }
                assert_eq!(shape.envelope(), original.envelope(), "{}", shape_type);
                assert_eq!(file.bounds().envelope(), original.envelope(), "{}", shape_type);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_header_and_index_arithmetic() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Point)?;
            let count = 25u32;
            for i in 0..count {
                let point = Shape::simple(ShapeType::Point, &[i as f64], &[-(i as f64)], None)?;
                assert_eq!(file.write_shape(-1, &point)?, i as i32);
            }
            // 8 byte record header plus type and two doubles
            let content = count * (8 + 20);
            assert_eq!(file.file_size(), 100 + content);

            let mut previous = 0;
            for id in 0..count as usize {
                let entry = file.record_entry(id).expect("entry exists");
                assert!(entry.offset >= previous);
                assert!(entry.offset + entry.size + 8 <= file.file_size());
                previous = entry.offset;
            }
            file.close()?;

            assert_eq!(read_be_word(&ctx.shp_path(), 0)?, 9994);
            assert_eq!(read_be_word(&ctx.shp_path(), 24)?, (100 + content) / 2);
            assert_eq!(read_be_word(&ctx.shx_path(), 24)?, (100 + 8 * count) / 2);
            assert_eq!(
                std::fs::metadata(ctx.shx_path())?.len(),
                (100 + 8 * count) as u64
            );
            assert_eq!(
                std::fs::metadata(ctx.shp_path())?.len(),
                (100 + content) as u64
            );

            let file = ShapeFile::open(ctx.shp_path(), AccessMode::ReadOnly)?;
            assert_eq!(file.record_count(), count as usize);
            // the origin leaves the X/Y bounds all zero, so the second point
            // re-seeds them instead of expanding
            let bounds = file.bounds();
            assert_eq!(
                (bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max),
                (1.0, -24.0, 24.0, -1.0)
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_null_records_between_shapes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::MultiPoint)?;
            let cloud = Shape::simple(ShapeType::MultiPoint, &[1.0, 2.0], &[3.0, 4.0], None)?;
            file.write_shape(-1, &cloud)?;
            file.write_shape(-1, &Shape::null())?;
            file.write_shape(-1, &cloud)?;
            file.close()?;

            let mut file = ShapeFile::open(ctx.base_path(), AccessMode::ReadOnly)?;
            assert_eq!(file.record_count(), 3);
            assert_eq!(file.read_shape(1)?.shape_type(), ShapeType::Null);
            assert!(file.read_object_bounds(1, None)?.is_none());
            assert_eq!(file.read_shape(2)?.vertex_count(), 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
