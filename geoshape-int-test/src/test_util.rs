use geoshape::errors::GeoShapeResult;
use geoshape::{Shape, ShapeBuilder, ShapeType};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Runs `test` between `before` and `after`.
///
/// `after` runs even when `test` fails or panics, so temporary files are
/// released before the failure is reported.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> GeoShapeResult<()>,
    B: Fn() -> GeoShapeResult<TestContext>,
    A: Fn(TestContext) -> GeoShapeResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| test(ctx.clone())));
    let after_result = after(ctx);

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(panic_err) => panic::resume_unwind(panic_err),
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// A scratch directory and the base name of the file pair a test works on.
#[derive(Clone)]
pub struct TestContext {
    dir: Arc<TempDir>,
    name: String,
}

impl TestContext {
    pub fn new(dir: TempDir, name: &str) -> Self {
        Self {
            dir: Arc::new(dir),
            name: name.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path without extension, as accepted by `ShapeFile::create`.
    pub fn base_path(&self) -> PathBuf {
        self.dir.path().join(&self.name)
    }

    pub fn shp_path(&self) -> PathBuf {
        self.base_path().with_extension("shp")
    }

    pub fn shx_path(&self) -> PathBuf {
        self.base_path().with_extension("shx")
    }
}

pub fn create_test_context() -> GeoShapeResult<TestContext> {
    let dir = tempfile::Builder::new().prefix("geoshape_").tempdir()?;
    Ok(TestContext::new(dir, "layer"))
}

pub fn cleanup(ctx: TestContext) -> GeoShapeResult<()> {
    for path in [ctx.shp_path(), ctx.shx_path()] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Closed counter-clockwise square with its lower left corner at `(x, y)`.
pub fn square(shape_type: ShapeType, x: f64, y: f64, size: f64) -> GeoShapeResult<Shape> {
    ShapeBuilder::new(shape_type)
        .xy(
            &[x, x + size, x + size, x, x],
            &[y, y, y + size, y + size, y],
        )
        .build()
}

/// Big-endian 32-bit word at `offset` of the file at `path`.
pub fn read_be_word(path: &Path, offset: usize) -> GeoShapeResult<u32> {
    let bytes = fs::read(path)?;
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    Ok(u32::from_be_bytes(word))
}
