mod common;

use kataify_core::AnyEmptyResult;
use kataify_core::KataConfig;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::kataify_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created config file"));

	let config_path = tmp.path().join("kataify.toml");
	let content = std::fs::read_to_string(&config_path)?;
	assert!(content.contains("[[files]]"));
	assert!(content.contains("[[directories]]"));

	// Everything in the sample is commented out.
	let config: KataConfig = content.parse()?;
	assert!(config.is_empty());

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config_path = tmp.path().join(".kataify.toml");
	std::fs::write(&config_path, "existing config")?;

	common::kataify_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert_eq!(std::fs::read_to_string(&config_path)?, "existing config");
	assert!(!tmp.path().join("kataify.toml").exists());

	Ok(())
}

#[test]
fn run_after_init_has_nothing_to_do() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::kataify_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::kataify_cmd()
		.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No files to kataify."));

	Ok(())
}
