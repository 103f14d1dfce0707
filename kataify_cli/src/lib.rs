use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use kataify_core::FileMapping;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Turn annotated test files into kata exercises.",
	long_about = "kataify rewrites source files into kata exercises.\n\nA line starting with `////` \
	              (after any indentation) is a kata-marker line: its text replaces every line \
	              that follows it, up to the next marker or the end of the file.\n\nQuick \
	              start:\n  kataify init   Create a kataify.toml\n  kataify run    Write all kata \
	              files\n  kataify check  Verify kata files are up to date"
)]
pub struct KataCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `kataify.toml` in the project root.
	///
	/// If a config file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Kataify every configured file and write the results.
	///
	/// Mappings come from `--map` when given, otherwise from the project's
	/// `kataify.toml`. Every mapping is processed even when some fail; the
	/// command exits with a non-zero status if any did.
	Run {
		/// Kataify `SOURCE` into `DESTINATION` instead of using the config.
		/// May be repeated.
		#[arg(long = "map", value_name = "SOURCE=DESTINATION")]
		mappings: Vec<FileMapping>,

		/// Show what would be written without touching any destination.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Output format for the run summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Check that every destination matches its kataified source.
	///
	/// Exits with a non-zero status code if any destination is missing or
	/// out of date. Ideal for CI.
	Check {
		/// Kataify `SOURCE` into `DESTINATION` instead of using the config.
		/// May be repeated.
		#[arg(long = "map", value_name = "SOURCE=DESTINATION")]
		mappings: Vec<FileMapping>,

		/// Show a diff for each stale destination.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Print the kataified content of a single file to stdout.
	Print {
		/// The file to kataify.
		file: PathBuf,
	},
	/// List the source and destination of every configured mapping.
	List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
