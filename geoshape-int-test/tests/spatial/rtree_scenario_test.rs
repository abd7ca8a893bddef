use geoshape_int_test::test_util::{cleanup, create_test_context, run_test};
use geoshape_spatial::{DataId, Mbr, RTree, RTreeConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::ControlFlow;

fn grid(columns: u64, rows: u64) -> Vec<(Mbr, DataId)> {
    (0..rows)
        .flat_map(|row| {
            (0..columns).map(move |column| {
                (Mbr::point([column as f64, row as f64]), row * columns + column)
            })
        })
        .collect()
}

#[test]
fn test_thousand_point_grid_query() {
    run_test(
        || create_test_context(),
        |_ctx| {
            let query = Mbr::new([20.0, 10.0], [22.0, 12.0]);
            let mut points = grid(50, 20);
            let mut rng = StdRng::seed_from_u64(1000);

            for round in 0..3 {
                if round > 0 {
                    points.shuffle(&mut rng);
                }
                let mut tree: RTree = RTree::new(RTreeConfig::with_max_card(8))?;
                for (mbr, id) in &points {
                    tree.insert(*mbr, *id)?;
                }
                assert_eq!(tree.len(), 1000);

                let mut ids = Vec::new();
                let hits = tree.search(&query, |id| {
                    ids.push(id);
                    ControlFlow::Continue(())
                })?;
                assert_eq!(hits, 9);
                ids.sort();
                assert_eq!(ids, vec![520, 521, 522, 570, 571, 572, 620, 621, 622]);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_fill_factors_hold_under_churn() {
    run_test(
        || create_test_context(),
        |_ctx| {
            let mut rng = StdRng::seed_from_u64(42);
            let mut tree: RTree = RTree::new(RTreeConfig::with_max_card(6))?;
            let mut live: Vec<(Mbr, DataId)> = Vec::new();

            for id in 0..2000u64 {
                if !live.is_empty() && rng.random_range(0..3) == 0 {
                    let index = rng.random_range(0..live.len());
                    let (mbr, victim) = live.swap_remove(index);
                    assert!(tree.remove(&mbr, victim)?);
                } else {
                    let x = rng.random_range(-500.0..500.0);
                    let y = rng.random_range(-500.0..500.0);
                    let mbr = Mbr::new([x, y], [x + rng.random_range(0.0..20.0), y + 1.0]);
                    tree.insert(mbr, id)?;
                    live.push((mbr, id));
                }
            }

            let report = tree.check_integrity();
            assert!(report.is_valid, "{:?}", report.errors);
            assert_eq!(report.entries_found, live.len() as u64);
            assert_eq!(report.fill_violations, 0);

            let everything = Mbr::new([-1000.0, -1000.0], [1000.0, 1000.0]);
            let mut found = tree.find_intersecting(&everything)?;
            let mut expected: Vec<DataId> = live.iter().map(|(_, id)| *id).collect();
            found.sort();
            expected.sort();
            assert_eq!(found, expected);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
