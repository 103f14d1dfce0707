mod common;

use kataify_core::AnyEmptyResult;
use rstest::rstest;
use serde_json::Value;

fn setup(destination: Option<&str>) -> std::io::Result<tempfile::TempDir> {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "tests/a.js", "keep\n////kata\ndrop\n")?;
	common::write_file(
		tmp.path(),
		"kataify.toml",
		"[[files]]\nsource = \"tests/a.js\"\ndestination = \"katas/a.js\"\n",
	)?;
	if let Some(content) = destination {
		common::write_file(tmp.path(), "katas/a.js", content)?;
	}
	Ok(tmp)
}

#[test]
fn check_passes_when_up_to_date() -> AnyEmptyResult {
	let tmp = setup(Some("keep\nkata"))?;

	common::kataify_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("up to date"));

	Ok(())
}

#[rstest]
#[case::stale(Some("keep\nold kata"), "katas/a.js is out of date (from tests/a.js)")]
#[case::missing(None, "katas/a.js is missing (from tests/a.js)")]
#[case::trailing_newline_differs(Some("keep\nkata\n"), "katas/a.js is out of date")]
fn check_fails_when_destination_differs(
	#[case] destination: Option<&str>,
	#[case] expected: &str,
) -> AnyEmptyResult {
	let tmp = setup(destination)?;

	common::kataify_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains(expected));

	Ok(())
}

#[test]
fn check_diff_shows_changes() -> AnyEmptyResult {
	let tmp = setup(Some("keep\nold kata"))?;

	common::kataify_cmd()
		.arg("check")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("-old kata"))
		.stderr(predicates::str::contains("+kata"));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = setup(None)?;

	let output = common::kataify_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["ok"], false);
	assert_eq!(json["stale"][0]["source"], "tests/a.js");
	assert_eq!(json["stale"][0]["destination"], "katas/a.js");
	assert_eq!(json["stale"][0]["missing"], true);

	Ok(())
}

#[test]
fn check_passes_after_run() -> AnyEmptyResult {
	let tmp = setup(None)?;

	common::kataify_cmd()
		.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::kataify_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	Ok(())
}
