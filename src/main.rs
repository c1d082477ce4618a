use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use u_packweight::cli::{Cli, OutputFormat};
use u_packweight::{export, pipeline};

/// Initialize tracing subscriber; `--debug` raises the level to TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = cli.analysis_config().context("invalid configuration")?;
    let report = pipeline::run_file(&cli.input, &config)
        .with_context(|| format!("analysis of {} failed", cli.input.display()))?;

    for err in &report.row_errors {
        eprintln!("skipped {err}");
    }
    if let Err(e) = &report.fit {
        eprintln!("distribution fit unavailable: {e}");
    }

    let text = match cli.format {
        OutputFormat::Csv => export::export(&report.summaries, report.group_by)?,
        OutputFormat::Json => export::to_json(&report)?,
    };

    match &cli.output {
        Some(path) => export::write_report(path, &text)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}
