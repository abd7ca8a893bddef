use std::ops::ControlFlow;

use geoshape::{Envelope, ShapeFile};
use log::{debug, warn};

use crate::mbr::Mbr;
use crate::rtree::{DataId, RTree, RTreeConfig, SpatialError, SpatialResult};

/// R-Tree of shape envelopes keyed by shape id.
///
/// Built from an open [`ShapeFile`] with one bounds-only read per record, so
/// no vertex array is decoded. Null records, records without vertices and
/// records whose stored extent is NaN or inverted are left out.
///
/// # Examples
///
/// ```rust,ignore
/// use geoshape::{AccessMode, Envelope, ShapeFile};
/// use geoshape_spatial::ShapeIndex;
///
/// let mut file = ShapeFile::open("parcels.shp", AccessMode::ReadOnly)?;
/// let index = ShapeIndex::build(&mut file)?;
/// let ids = index.query(&Envelope::new(0.0, 0.0, 10.0, 10.0))?;
/// for id in ids {
///     let shape = file.read_shape(id as i32)?;
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShapeIndex {
    tree: RTree<2>,
}

impl ShapeIndex {
    pub fn new(config: RTreeConfig) -> SpatialResult<ShapeIndex> {
        Ok(ShapeIndex {
            tree: RTree::new(config)?,
        })
    }

    /// Indexes every record of `file` with the default fill factors.
    pub fn build(file: &mut ShapeFile) -> SpatialResult<ShapeIndex> {
        let mut index = ShapeIndex::default();
        index.load(file)?;
        Ok(index)
    }

    pub fn build_with_config(
        file: &mut ShapeFile,
        config: RTreeConfig,
    ) -> SpatialResult<ShapeIndex> {
        let mut index = ShapeIndex::new(config)?;
        index.load(file)?;
        Ok(index)
    }

    /// Clears the index and refills it from `file`.
    pub fn load(&mut self, file: &mut ShapeFile) -> SpatialResult<()> {
        self.reset();
        let count = file.record_count();
        for id in 0..count {
            if let Some((_, envelope)) = file.read_object_envelope(id as i32, None)? {
                match self.add_shape(envelope, id as DataId) {
                    Ok(()) => {}
                    Err(SpatialError::InvariantViolation(msg)) => {
                        warn!("skipping record {} with malformed extent: {}", id, msg);
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        debug!(
            "indexed {} of {} records of {}",
            self.tree.len(),
            count,
            file.shp_path().display()
        );
        Ok(())
    }

    pub fn reset(&mut self) {
        self.tree.clear();
    }

    pub fn add_shape(&mut self, envelope: Envelope, id: DataId) -> SpatialResult<()> {
        self.tree.insert(Mbr::from(envelope), id)
    }

    pub fn remove_shape(&mut self, envelope: Envelope, id: DataId) -> SpatialResult<bool> {
        self.tree.remove(&Mbr::from(envelope), id)
    }

    /// Visits the id of every shape whose envelope overlaps `envelope`
    /// until `visitor` breaks. Returns the number visited.
    pub fn search<F>(&self, envelope: &Envelope, visitor: F) -> SpatialResult<usize>
    where
        F: FnMut(DataId) -> ControlFlow<()>,
    {
        self.tree.search(&Mbr::from(*envelope), visitor)
    }

    /// Ids of every shape whose envelope overlaps `envelope`, ascending.
    pub fn query(&self, envelope: &Envelope) -> SpatialResult<Vec<DataId>> {
        let mut ids = self.tree.find_intersecting(&Mbr::from(*envelope))?;
        ids.sort_unstable();
        Ok(ids)
    }

    pub fn tree(&self) -> &RTree<2> {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoshape::{AccessMode, Shape, ShapeBuilder, ShapeType};
    use std::io::{Seek, SeekFrom, Write};
    use tempfile::tempdir;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn square(x: f64, y: f64, size: f64) -> Shape {
        ShapeBuilder::new(ShapeType::Polygon)
            .xy(
                &[x, x, x + size, x + size, x],
                &[y, y + size, y + size, y, y],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_skips_null_records() {
        init();
        let dir = tempdir().unwrap();
        let mut file = ShapeFile::create(dir.path().join("parcels"), ShapeType::Polygon).unwrap();
        file.write_shape(-1, &square(0.0, 0.0, 1.0)).unwrap();
        file.write_shape(-1, &Shape::null()).unwrap();
        file.write_shape(-1, &square(10.0, 10.0, 2.0)).unwrap();
        file.write_shape(-1, &square(0.5, 0.5, 1.0)).unwrap();

        let index = ShapeIndex::build(&mut file).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.query(&Envelope::new(0.0, 0.0, 1.0, 1.0)).unwrap(), vec![0, 3]);
        assert_eq!(index.query(&Envelope::new(11.0, 11.0, 20.0, 20.0)).unwrap(), vec![2]);
        assert!(index.query(&Envelope::new(5.0, 5.0, 6.0, 6.0)).unwrap().is_empty());
        assert!(index.tree().check_integrity().is_valid);
    }

    #[test]
    fn test_build_skips_malformed_extents() {
        init();
        let dir = tempdir().unwrap();
        let base = dir.path().join("parcels");
        let mut file = ShapeFile::create(&base, ShapeType::Polygon).unwrap();
        file.write_shape(-1, &square(0.0, 0.0, 1.0)).unwrap();
        file.write_shape(-1, &square(5.0, 5.0, 1.0)).unwrap();
        file.write_shape(-1, &square(8.0, 8.0, 1.0)).unwrap();
        let first = file.record_entry(0).unwrap().offset as u64;
        let second = file.record_entry(1).unwrap().offset as u64;
        file.close().unwrap();

        // NaN x_min in record 0, x_min > x_max in record 1
        let shp = dir.path().join("parcels.shp");
        let mut out = std::fs::OpenOptions::new().write(true).open(&shp).unwrap();
        out.seek(SeekFrom::Start(first + 12)).unwrap();
        out.write_all(&f64::NAN.to_le_bytes()).unwrap();
        out.seek(SeekFrom::Start(second + 12)).unwrap();
        out.write_all(&100.0f64.to_le_bytes()).unwrap();
        drop(out);

        let mut file = ShapeFile::open(&shp, AccessMode::ReadOnly).unwrap();
        let index = ShapeIndex::build(&mut file).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.query(&Envelope::new(0.0, 0.0, 10.0, 10.0)).unwrap(), vec![2]);
    }

    #[test]
    fn test_build_with_small_nodes() {
        init();
        let dir = tempdir().unwrap();
        let mut file = ShapeFile::create(dir.path().join("points"), ShapeType::Point).unwrap();
        for i in 0..100 {
            let point = Shape::simple(ShapeType::Point, &[(i % 10) as f64], &[(i / 10) as f64], None)
                .unwrap();
            file.write_shape(-1, &point).unwrap();
        }

        let index = ShapeIndex::build_with_config(&mut file, RTreeConfig::with_max_card(4)).unwrap();
        assert_eq!(index.len(), 100);
        assert!(index.tree().height() > 1);
        assert_eq!(
            index.query(&Envelope::new(2.0, 3.0, 3.0, 3.0)).unwrap(),
            vec![32, 33]
        );
    }

    #[test]
    fn test_search_stops_early() {
        let mut index = ShapeIndex::default();
        for id in 0..10 {
            index
                .add_shape(Envelope::new(0.0, 0.0, 1.0, 1.0), id)
                .unwrap();
        }
        let mut seen = 0;
        let hits = index
            .search(&Envelope::new(0.0, 0.0, 1.0, 1.0), |_| {
                seen += 1;
                if seen == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_reset_and_remove() {
        let mut index = ShapeIndex::new(RTreeConfig::with_max_card(8)).unwrap();
        let envelope = Envelope::new(1.0, 1.0, 2.0, 2.0);
        index.add_shape(envelope, 4).unwrap();
        index.add_shape(envelope, 5).unwrap();
        assert!(index.remove_shape(envelope, 4).unwrap());
        assert!(!index.remove_shape(envelope, 4).unwrap());
        assert_eq!(index.query(&envelope).unwrap(), vec![5]);

        index.reset();
        assert!(index.is_empty());
        assert!(index.query(&envelope).unwrap().is_empty());
    }
}
