use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use kataify_cli::Commands;
use kataify_cli::KataCli;
use kataify_cli::OutputFormat;
use kataify_core::BatchReport;
use kataify_core::FileAccess;
use kataify_core::FileMapping;
use kataify_core::FsFileAccess;
use kataify_core::KataConfig;
use kataify_core::KataError;
use kataify_core::KataResult;
use kataify_core::MemoryFileAccess;
use kataify_core::StaleFile;
use kataify_core::check;
use kataify_core::kataify_file;
use kataify_core::kataify_with_report;
use kataify_core::resolve_mappings;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_CONFIG: &str = "# kataify configuration\n#\n# A line starting with `////` is a \
                             kata-marker line. Its text replaces every line that\n# follows it, \
                             up to the next marker or the end of the file.\n\n# Kataify single \
                             files.\n# [[files]]\n# source = \"tests/bowling.spec.js\"\n# \
                             destination = \"katas/bowling.spec.js\"\n\n# Kataify every \
                             matching file below a directory.\n# [[directories]]\n# source = \
                             \"tests\"\n# destination = \"katas\"\n# include = \
                             [\"**/*.spec.js\"]\n# exclude = [\"fixtures/\"]\n";

fn main() {
	let args = KataCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Run {
			mappings,
			dry_run,
			format,
		}) => run_run(&args, mappings, *dry_run, *format),
		Some(Commands::Check {
			mappings,
			diff,
			format,
		}) => run_check(&args, mappings, *diff, *format),
		Some(Commands::Print { file }) => run_print(&args, file),
		Some(Commands::List) => run_list(&args),
		None => {
			eprintln!("No subcommand specified. Run `kataify --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<KataError>() {
			Ok(kata_err) => {
				let report: miette::Report = (*kata_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "error" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn resolve_root(args: &KataCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn block_on<F: Future>(future: F) -> Result<F::Output, Box<dyn std::error::Error>> {
	let rt = tokio::runtime::Runtime::new()?;
	Ok(rt.block_on(future))
}

fn run_init(args: &KataCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = KataConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("kataify.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created config file: {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Add [[files]] or [[directories]] entries to kataify.toml");
	println!("  2. Mark kata lines in your sources with `////`");
	println!("  3. Run `kataify run` to write the kata files");

	Ok(())
}

/// Mappings from the command line when given, otherwise from the config.
/// Relative paths resolve against the project root.
fn load_mappings(
	args: &KataCli,
	cli_mappings: &[FileMapping],
) -> Result<Vec<FileMapping>, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	tracing::debug!(root = %root.display(), "loading mappings");

	if !cli_mappings.is_empty() {
		return Ok(cli_mappings
			.iter()
			.map(|mapping| mapping.relative_to(&root))
			.collect());
	}

	let Some(config) = KataConfig::load(&root)? else {
		return Err(KataError::MissingConfig { root }.into());
	};

	Ok(resolve_mappings(&root, &config)?)
}

fn run_run(
	args: &KataCli,
	cli_mappings: &[FileMapping],
	dry_run: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let mappings = load_mappings(args, cli_mappings)?;

	if mappings.is_empty() {
		println!("No files to kataify.");
		return Ok(());
	}

	let report = if dry_run {
		block_on(kataify_with_report(&mappings, &DryRunFileAccess::default()))?
	} else {
		block_on(kataify_with_report(&mappings, &FsFileAccess::new()))?
	};

	match format {
		OutputFormat::Json => print_report_json(&report, &root)?,
		OutputFormat::Text => print_report_text(&report, &root, dry_run, args.verbose),
	}

	if !report.is_ok() {
		process::exit(2);
	}

	Ok(())
}

/// Reads sources from disk and keeps every write in memory, so a dry run
/// fails exactly where a real run would without touching a destination.
#[derive(Default)]
struct DryRunFileAccess {
	disk: FsFileAccess,
	memory: MemoryFileAccess,
}

impl FileAccess for DryRunFileAccess {
	async fn read(&self, path: &Path) -> KataResult<String> {
		self.disk.read(path).await
	}

	async fn write(&self, path: &Path, content: String) -> KataResult<()> {
		self.memory.write(path, content).await
	}
}

fn print_report_text(report: &BatchReport, root: &Path, dry_run: bool, verbose: bool) {
	let verb = if dry_run { "Would write" } else { "Wrote" };
	let written = report.succeeded().count();

	if verbose || dry_run {
		for summary in report.succeeded() {
			println!(
				"  {} -> {} ({} marker(s), {} line(s) removed)",
				make_relative(&summary.source, root),
				make_relative(&summary.destination, root),
				summary.markers,
				summary.removed_lines,
			);
		}
	}

	for (mapping, error) in report.failed() {
		eprintln!(
			"{} {}: {error}",
			colored!("error:", red),
			make_relative(&mapping.source, root)
		);
	}

	println!("{verb} {written} kata file(s).");
}

fn print_report_json(report: &BatchReport, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let files: Vec<serde_json::Value> = report
		.succeeded()
		.map(|summary| {
			serde_json::json!({
				"source": make_relative(&summary.source, root),
				"destination": make_relative(&summary.destination, root),
				"markers": summary.markers,
				"removed_lines": summary.removed_lines,
				"changed": summary.changed,
			})
		})
		.collect();
	let errors: Vec<serde_json::Value> = report
		.failed()
		.map(|(mapping, error)| {
			serde_json::json!({
				"source": make_relative(&mapping.source, root),
				"destination": make_relative(&mapping.destination, root),
				"message": error.to_string(),
			})
		})
		.collect();

	let output = serde_json::json!({
		"ok": report.is_ok(),
		"files": files,
		"errors": errors,
	});
	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

fn run_check(
	args: &KataCli,
	cli_mappings: &[FileMapping],
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let mappings = load_mappings(args, cli_mappings)?;
	let stale = block_on(check(&mappings, &FsFileAccess::new()))??;

	match format {
		OutputFormat::Json => print_stale_json(&stale, &root)?,
		OutputFormat::Text => print_stale_text(&stale, &root, show_diff),
	}

	if !stale.is_empty() {
		process::exit(1);
	}

	Ok(())
}

fn print_stale_text(stale: &[StaleFile], root: &Path, show_diff: bool) {
	if stale.is_empty() {
		println!("Check passed: all kata files are up to date.");
		return;
	}

	for entry in stale {
		let destination = make_relative(&entry.destination, root);
		let source = make_relative(&entry.source, root);
		if entry.is_missing() {
			eprintln!(
				"{} {destination} is missing (from {source})",
				colored!("stale:", yellow)
			);
		} else {
			eprintln!(
				"{} {destination} is out of date (from {source})",
				colored!("stale:", yellow)
			);
		}

		if show_diff {
			print_diff(entry.current.as_deref().unwrap_or_default(), &entry.expected);
		}
	}

	eprintln!();
	eprintln!(
		"{} {} kata file(s) are stale. Run `kataify run` to update them.",
		colored!("Check failed:", bold),
		stale.len()
	);
}

fn print_stale_json(stale: &[StaleFile], root: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let entries: Vec<serde_json::Value> = stale
		.iter()
		.map(|entry| {
			serde_json::json!({
				"source": make_relative(&entry.source, root),
				"destination": make_relative(&entry.destination, root),
				"missing": entry.is_missing(),
			})
		})
		.collect();

	let output = serde_json::json!({
		"ok": stale.is_empty(),
		"stale": entries,
	});
	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

fn run_print(args: &KataCli, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let path = resolve_root(args).join(file);
	let content = std::fs::read_to_string(&path).map_err(|source| KataError::Read { path, source })?;
	print!("{}", kataify_file(&content));

	Ok(())
}

fn run_list(args: &KataCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let mappings = load_mappings(args, &[])?;

	if mappings.is_empty() {
		println!("No files configured.");
		return Ok(());
	}

	println!("{}", colored!("Mappings:", bold));
	for mapping in &mappings {
		println!(
			"  {} -> {}",
			make_relative(&mapping.source, &root),
			make_relative(&mapping.destination, &root)
		);
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
	eprintln!();
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
