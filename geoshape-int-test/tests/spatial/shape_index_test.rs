use geoshape::{AccessMode, Envelope, ShapeFile, ShapeType};
use geoshape_int_test::test_util::{cleanup, create_test_context, run_test, square};
use geoshape_spatial::{RTreeConfig, ShapeIndex};
use std::ops::ControlFlow;

#[test]
fn test_index_parcels_from_disk() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Polygon)?;
            for row in 0..20 {
                for column in 0..20 {
                    let (x, y) = (column as f64 * 10.0, row as f64 * 10.0);
                    let parcel = square(ShapeType::Polygon, x, y, 8.0)?;
                    file.write_shape(-1, &parcel)?;
                }
            }
            file.close()?;

            let mut file = ShapeFile::open(ctx.shp_path(), AccessMode::ReadOnly)?;
            let index = ShapeIndex::build_with_config(&mut file, RTreeConfig::with_max_card(16))?;
            assert_eq!(index.len(), 400);
            assert!(index.tree().check_integrity().is_valid);

            // covers the parcels in columns 2..=3 and rows 5..=6
            let window = Envelope::new(25.0, 55.0, 35.0, 65.0);
            let ids = index.query(&window)?;
            assert_eq!(ids, vec![102, 103, 122, 123]);
            for id in ids {
                let shape = file.read_shape(id as i32)?;
                assert!(shape.envelope().intersects(&window));
                assert_eq!(shape.area(), 64.0);
            }

            // the gaps between parcels hold nothing
            assert!(index.query(&Envelope::new(8.5, 8.5, 9.5, 9.5))?.is_empty());

            let mut first = None;
            let visited = index.search(&Envelope::new(0.0, 0.0, 200.0, 200.0), |id| {
                first = Some(id);
                ControlFlow::Break(())
            })?;
            assert_eq!(visited, 1);
            assert!(first.is_some());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_index_follows_rewrites() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut file = ShapeFile::create(ctx.base_path(), ShapeType::Polygon)?;
            file.write_shape(-1, &square(ShapeType::Polygon, 0.0, 0.0, 1.0)?)?;
            file.write_shape(-1, &square(ShapeType::Polygon, 5.0, 5.0, 1.0)?)?;

            let mut index = ShapeIndex::build(&mut file)?;
            let far = Envelope::new(100.0, 100.0, 101.0, 101.0);
            assert!(index.query(&far)?.is_empty());

            let old = file.read_object_envelope(1, None)?.map(|(_, envelope)| envelope);
            file.write_shape(1, &square(ShapeType::Polygon, 100.0, 100.0, 1.0)?)?;
            if let Some(envelope) = old {
                assert!(index.remove_shape(envelope, 1)?);
            }
            if let Some((_, envelope)) = file.read_object_envelope(1, None)? {
                index.add_shape(envelope, 1)?;
            }
            assert_eq!(index.query(&far)?, vec![1]);

            index.load(&mut file)?;
            assert_eq!(index.len(), 2);
            assert_eq!(index.query(&far)?, vec![1]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
