//! Binary entry point for the `compstat` benchmark harness.
//!
//! # Control flow
//!
//! 1. Parse [`Args`] and set the display level.
//! 2. `--list-codecs` prints the registry and exits.
//! 3. Build the [`RunConfig`], construct the [`Runner`] (validation, codec
//!    resolution, scratch dir, CSV sink) and run every job.
//! 4. Write the JSON snapshot if requested, even when the run failed on a
//!    CSV write, and print the summary.
//!
//! Any fatal error is printed on stderr and the process exits with status 1.
//! Failed jobs are not fatal.

use std::process::ExitCode;

use clap::Parser;

use compstat::bench::summary::{print_summary, summarize};
use compstat::cli::{print_codec_list, Args};
use compstat::display::set_display_level;
use compstat::{display, displaylevel, displayout, CodecRegistry, RunConfig, Runner};

fn run(args: Args) -> anyhow::Result<()> {
    let registry = CodecRegistry::builtin();
    if args.list_codecs {
        print_codec_list(&registry);
        return Ok(());
    }

    let config: RunConfig = args.into_config(&registry)?;
    displaylevel!(
        3,
        "*** compstat v{} ({} files, {} codecs requested) ***\n",
        compstat::COMPSTAT_VERSION_STRING,
        config.files.len(),
        config.codecs.len()
    );

    let runner = Runner::new(config, &registry)?;
    let outcome = runner.run();
    // Every result is still in memory after a failed CSV append.
    let snapshot = runner.write_snapshot();
    let summary = outcome?;
    snapshot?;
    let config = runner.config();

    let results = runner.results();
    if summary.failed > 0 {
        displaylevel!(1, "{} of {} jobs failed\n", summary.failed, summary.jobs);
    }
    displaylevel!(2, "\n");
    print_summary(&summarize(&results));
    displayout!(
        "\nBenchmark complete! Results: {}\n",
        config.output_csv.display()
    );
    if let Some(json) = &config.output_json {
        displayout!("JSON snapshot: {}\n", json.display());
    }
    displayout!("Total runs: {}\n", results.len());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    set_display_level(args.display_level());
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display!("compstat: {:#}\n", e);
            ExitCode::FAILURE
        }
    }
}
