//! End-to-end job runs against raw arrays in a temporary directory.

use std::path::Path;

use fusion_common::NODATA;
use fusion_tool::io::{read_array, write_array};
use fusion_tool::{run_job, JobFile};
use tempfile::TempDir;
use test_utils::fixtures::{single_bin, square};
use test_utils::{assert_approx_eq, assert_coords_approx_eq, assert_slices_approx_eq};

fn write_points(dir: &Path, prefix: &str, pairs: &[(f64, f64)]) {
    let lat: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let lon: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    write_array(&dir.join(format!("{prefix}_lat.f64")), &lat).unwrap();
    write_array(&dir.join(format!("{prefix}_lon.f64")), &lon).unwrap();
}

fn write_job(dir: &Path, yaml: &str) -> JobFile {
    let path = dir.join("job.yaml");
    std::fs::write(&path, yaml).unwrap();
    JobFile::load(&path).unwrap()
}

fn read_summary(dir: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.join("out/summary.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

const SWATH_TO_SWATH: &str = r#"
name: square
source:
  instrument: misr
  resolution: L
  geolocation: { lat: src_lat.f64, lon: src_lon.f64 }
  values: src_values.f64
target:
  kind: swath
  instrument: modis
  resolution: 1KM
  geolocation: { lat: dst_lat.f64, lon: dst_lon.f64 }
resample:
  method: nearest
  max_radius_m: 50000
output:
  dir: out
  write_correspondence: true
  write_geolocation: true
"#;

#[test]
fn test_nearest_job_writes_outputs() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let source: Vec<(f64, f64)> = square::points().iter().collect();
    write_points(dir, "src", &source);
    write_array(&dir.join("src_values.f64"), &square::VALUES).unwrap();
    write_points(dir, "dst", &[square::NEAR_ORIGIN, square::FAR_AWAY]);

    let job = write_job(dir, SWATH_TO_SWATH);
    let summary = run_job(&job).unwrap();

    assert_eq!(summary.job, "square");
    assert_eq!(summary.radius_m, 50_000.0);
    assert_eq!(summary.covered_cells, 1);
    assert_eq!(summary.match_stats.matched, 1);

    let values: Vec<f64> = read_array(&dir.join("out/values.f64")).unwrap();
    assert_eq!(values, vec![10.0, NODATA]);

    let correspondence: Vec<i32> = read_array(&dir.join("out/correspondence.i32")).unwrap();
    assert_eq!(correspondence, vec![0, -1]);

    let lat: Vec<f64> = read_array(&dir.join("out/target_lat.f64")).unwrap();
    assert_eq!(lat, vec![square::NEAR_ORIGIN.0, square::FAR_AWAY.0]);

    // Nearest mode carries no counts.
    assert!(!dir.join("out/count.u32").exists());

    let json = read_summary(dir);
    assert_eq!(json["match"]["method"], "nearest");
    assert_eq!(json["fill_value"], NODATA);
    assert_eq!(json["target"]["cells"], 2);
}

#[test]
fn test_summary_job_reports_count_and_sd() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let source: Vec<(f64, f64)> = single_bin::source_points().iter().collect();
    let target: Vec<(f64, f64)> = single_bin::target_points().iter().collect();
    write_points(dir, "src", &source);
    write_array(&dir.join("src_values.f64"), &single_bin::VALUES).unwrap();
    write_points(dir, "dst", &target);

    let yaml = SWATH_TO_SWATH
        .replace("method: nearest", "method: summaryInterpolate")
        .replace("max_radius_m: 50000", "max_radius_m: 1000")
        .replace("  write_correspondence: true\n", "")
        .replace("  write_geolocation: true\n", "");
    let job = write_job(dir, &yaml);
    let summary = run_job(&job).unwrap();

    let values: Vec<f64> = read_array(&dir.join("out/values.f64")).unwrap();
    let count: Vec<u32> = read_array(&dir.join("out/count.u32")).unwrap();
    let sd: Vec<f64> = read_array(&dir.join("out/sd.f64")).unwrap();

    assert_eq!(count, vec![single_bin::EXPECTED_COUNT]);
    assert_approx_eq!(values[0], single_bin::EXPECTED_MEAN, 1e-12);
    assert_approx_eq!(sd[0], single_bin::EXPECTED_SD, 1e-9);

    assert_eq!(summary.outputs, vec!["values.f64", "count.u32", "sd.f64"]);
    assert!(!dir.join("out/correspondence.i32").exists());
}

#[test]
fn test_grid_target_with_clip_mask() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    // One source cell at every centre of a 2 x 2 half-degree grid.
    let source = [(0.25, 0.25), (0.25, 0.75), (0.75, 0.25), (0.75, 0.75)];
    write_points(dir, "src", &source);
    write_array(&dir.join("src_values.f64"), &[5.0; 4]).unwrap();
    write_array(&dir.join("mask.f64"), &[1.0, NODATA, 1.0, 1.0]).unwrap();

    let yaml = r#"
source:
  instrument: misr
  resolution: L
  geolocation: { lat: src_lat.f64, lon: src_lon.f64 }
  values: src_values.f64
target:
  kind: grid
  bbox: "0,0,1,1"
  cell_size_deg: 0.5
resample:
  method: nearest
clip_mask: mask.f64
output:
  dir: out
  write_geolocation: true
"#;
    let job = write_job(dir, yaml);
    let summary = run_job(&job).unwrap();

    assert_eq!(summary.job, "unnamed");
    assert_eq!(summary.target.cells, 4);
    assert_eq!(summary.target.shape, Some((2, 2)));
    // The grid cell diagonal exceeds the 1.1 km source default.
    assert!(summary.radius_m > 70_000.0);
    assert_eq!(summary.clipped_cells, 1);
    assert_eq!(summary.covered_cells, 3);

    let values: Vec<f64> = read_array(&dir.join("out/values.f64")).unwrap();
    assert_slices_approx_eq!(&values, &[5.0, NODATA, 5.0, 5.0], 1e-12);

    // Grid cells run north to south, west to east.
    let lat: Vec<f64> = read_array(&dir.join("out/target_lat.f64")).unwrap();
    let lon: Vec<f64> = read_array(&dir.join("out/target_lon.f64")).unwrap();
    assert_coords_approx_eq!((lat[0], lon[0]), (0.75, 0.25), 1e-12);
    assert_coords_approx_eq!((lat[3], lon[3]), (0.25, 0.75), 1e-12);
}

#[test]
fn test_clip_mask_zeroes_summary_counts() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let source: Vec<(f64, f64)> = single_bin::source_points().iter().collect();
    let target: Vec<(f64, f64)> = single_bin::target_points().iter().collect();
    write_points(dir, "src", &source);
    write_array(&dir.join("src_values.f64"), &single_bin::VALUES).unwrap();
    write_points(dir, "dst", &target);
    write_array(&dir.join("mask.f64"), &[NODATA]).unwrap();

    let yaml = SWATH_TO_SWATH
        .replace("method: nearest", "method: summary")
        .replace("max_radius_m: 50000", "max_radius_m: 1000")
        .replace("output:\n", "clip_mask: mask.f64\noutput:\n");
    let job = write_job(dir, &yaml);
    let summary = run_job(&job).unwrap();

    assert_eq!(summary.clipped_cells, 1);
    assert_eq!(summary.covered_cells, 0);

    let values: Vec<f64> = read_array(&dir.join("out/values.f64")).unwrap();
    let count: Vec<u32> = read_array(&dir.join("out/count.u32")).unwrap();
    let sd: Vec<f64> = read_array(&dir.join("out/sd.f64")).unwrap();
    assert_eq!(values, vec![NODATA]);
    assert_eq!(count, vec![0]);
    assert_eq!(sd, vec![NODATA]);
}

#[test]
fn test_values_length_must_match_geolocation() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let source: Vec<(f64, f64)> = square::points().iter().collect();
    write_points(dir, "src", &source);
    write_array(&dir.join("src_values.f64"), &[1.0, 2.0]).unwrap();
    write_points(dir, "dst", &[square::NEAR_ORIGIN]);

    let job = write_job(dir, SWATH_TO_SWATH);
    assert!(run_job(&job).is_err());
    assert!(!dir.join("out/summary.json").exists());
}

#[test]
fn test_missing_array_is_reported() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    write_points(dir, "dst", &[square::NEAR_ORIGIN]);

    let job = write_job(dir, SWATH_TO_SWATH);
    let err = run_job(&job).unwrap_err();
    assert!(format!("{err:#}").contains("src_lat.f64"));
}
