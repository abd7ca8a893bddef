//! Shapefile integration test module.
//!
//! These tests write file pairs to disk, reopen them and check both the
//! decoded shapes and the raw header and index words.

mod polygon_scenario_test;
mod round_trip_test;
mod update_test;
