use clap::Parser;
use miette::{Context, IntoDiagnostic};
use std::fs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use petrel_engine::pipeline::{run_pipeline, PipelineOptions};
use petrel_engine::EngineError;

mod cli;
use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("{:?}", miette::Report::new(EngineError::ValidationFailed));
            ExitCode::from(2)
        }
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(1)
        }
    }
}

/// Run the pipeline and emit the report. Returns the validation verdict;
/// the caller maps it to the exit code.
fn run(cli: &Cli) -> miette::Result<bool> {
    let source = fs::read_to_string(&cli.model)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", cli.model.display()))?;
    let filename = cli.model.display().to_string();

    let options = PipelineOptions {
        capacity_override: cli.capacity,
    };
    let report = run_pipeline(&source, &filename, &options)?;

    let rendered = match cli.format.as_str() {
        "text" => report.to_string(),
        "json" => {
            let mut json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            json.push('\n');
            json
        }
        other => miette::bail!("unknown output format `{other}` (expected `text` or `json`)"),
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot write {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(report.selector_valid)
}
