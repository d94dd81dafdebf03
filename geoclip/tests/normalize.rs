
use assert_fs::{TempDir, prelude::*};
use predicates::{prelude::*, str};
use rstest::rstest;
use test_utilities::*;

#[test]
fn e2e_normalize_bounds() {
	geoclip_cmd()
		.args(["normalize"])
		.arg(get_testdata("square.json"))
		.assert()
		.success()
		.stdout("[[10.0,10.0],[10.0,20.0],[20.0,20.0],[20.0,10.0],[10.0,10.0]]\n");
}

#[test]
fn e2e_normalize_merges_files() {
	geoclip_cmd()
		.args(["normalize"])
		.arg(get_testdata("square.json"))
		.arg(get_testdata("triangle.geojson"))
		.assert()
		.success()
		.stdout(str::starts_with("[[").and(str::contains("25.0")));
}

#[rstest]
#[case("{\"foo\": 1}", "unsupported boundary format")]
#[case("{\"type\": \"Point\", \"coordinates\": [1, 2]}", "GeoJSON type 'Point'")]
#[case("[[1, 1], [1, 1], [2, 2]]", "at least 3 distinct vertices")]
#[case("not json", "invalid JSON")]
fn e2e_normalize_rejects(#[case] content: &str, #[case] message: &str) -> Result<(), Box<dyn std::error::Error>> {
	let dir = TempDir::new()?;
	let file = dir.child("boundary.json");
	file.write_str(content)?;

	geoclip_cmd()
		.args(["normalize"])
		.arg(file.path())
		.assert()
		.failure()
		.stderr(str::contains(message));
	Ok(())
}
