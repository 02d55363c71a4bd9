use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use covnorm::cli::{cmd_files, cmd_functions, cmd_summary};
use covnorm::config::Config;
use covnorm::detect::Format;
use covnorm::model::FileDataSet;
use covnorm::report::{Report, DEFAULT_TITLE};
use covnorm::{ingest, postprocess};

/// covnorm: normalize coverage data from gcov, lcov, gcov JSON, LLVM and Go
/// into one model and summarize it.
#[derive(Parser)]
#[command(name = "covnorm", version, about)]
struct Cli {
    /// Coverage files or directories of coverage files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Source root; filenames under it are reported relative to it.
    #[arg(long, default_value = ".")]
    srcdir: PathBuf,

    /// Keep files outside the source root (absolute paths).
    #[arg(long)]
    external: bool,

    /// Regular expression; matching files are dropped.
    #[arg(long)]
    exclude: Option<String>,

    /// Decode named files with this format instead of using the extension
    /// (gcov, lcov, gcov-json, llvm, go).
    #[arg(long)]
    format: Option<Format>,

    /// Title for the report.
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Identifier for the test run.
    #[arg(long)]
    testid: Option<String>,

    /// Identifier for the source revision.
    #[arg(long)]
    srcid: Option<String>,

    /// Also list per-file statistics.
    #[arg(long)]
    files: bool,

    /// Also list per-function statistics.
    #[arg(long)]
    functions: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::new()
        .with_source_root(&cli.srcdir)
        .with_context(|| format!("Failed to resolve source directory {}", cli.srcdir.display()))?
        .with_include_external(cli.external);
    if let Some(pattern) = cli.exclude {
        config = config.with_exclude(pattern);
    }
    if let Some(format) = cli.format {
        config = config.with_format(format);
    }

    let mut set = FileDataSet::new();
    ingest::load_paths(&mut set, &cli.inputs, &config).context("Failed to load coverage data")?;
    postprocess::process(&mut set, &config).context("Failed to process coverage data")?;

    if set.is_empty() {
        bail!("no file data present");
    }

    let mut report = Report::new(cli.title);
    report.test_id = cli.testid;
    report.src_id = cli.srcid;
    report.collect_statistics(&set);

    print!("{}", cmd_summary(&report));
    if cli.files {
        println!();
        print!("{}", cmd_files(&report));
    }
    if cli.functions {
        println!();
        print!("{}", cmd_functions(&report));
    }
    Ok(())
}
