mod common;

use kataify_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

const CONFIG: &str = "[[files]]\nsource = \"a.js\"\ndestination = \"katas/a.js\"\n";

#[test]
fn list_resolves_dot_kataify_toml() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".kataify.toml"), CONFIG)?;

	common::kataify_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("a.js -> katas/a.js"));

	Ok(())
}

#[test]
fn list_resolves_dot_config_kataify_toml() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(tmp.path().join(".config/kataify.toml"), CONFIG)?;

	common::kataify_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("a.js -> katas/a.js"));

	Ok(())
}

#[test]
fn list_prefers_kataify_toml_over_other_candidates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(
		tmp.path().join("kataify.toml"),
		"[[files]]\nsource = \"preferred.js\"\ndestination = \"katas/preferred.js\"\n",
	)?;
	std::fs::write(tmp.path().join(".kataify.toml"), CONFIG)?;
	std::fs::write(tmp.path().join(".config/kataify.toml"), CONFIG)?;

	common::kataify_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("preferred.js -> katas/preferred.js"))
		.stdout(predicates::str::contains("a.js").not());

	Ok(())
}

#[test]
fn list_reports_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("kataify.toml"), "[[files]]\nsource = 1\n")?;

	common::kataify_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}
