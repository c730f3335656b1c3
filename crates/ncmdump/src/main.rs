mod cli;
mod config;
mod error;
mod output;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use ncmdump_core::{FileSink, NoopObserver, Pipeline, StdoutSink};

use crate::cli::{Cli, OutputFormat};
use crate::error::CliError;
use crate::output::Progress;

// Requests are issued one at a time, so a single-threaded runtime suffices.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = config::load(&cli)?;

    let password = if cli.ask_password {
        SecretString::from(rpassword::prompt_password("Password: ")?)
    } else {
        settings.password()
    };
    let pipeline = Pipeline::new(settings.pipeline_config(password)?);
    tracing::debug!(
        url = %pipeline.config().base_url,
        mode = %pipeline.config().mode,
        export = settings.export,
        "starting"
    );

    if cli.list {
        let devices = pipeline.inventory(&mut NoopObserver).await?;
        return output::print_output(&output::render_devices(cli.output, &devices)?);
    }

    let mut progress = Progress::stderr(output::should_color(cli.color), cli.quiet);
    let report = if settings.export {
        let mut sink = FileSink::new(settings.output_dir.clone());
        pipeline.run(&mut sink, &mut progress).await?
    } else {
        let mut sink = StdoutSink::stdout();
        pipeline.run(&mut sink, &mut progress).await?
    };
    progress.summary(&report);

    // Stdout carries configuration text unless it went to files.
    if settings.export && cli.output == OutputFormat::Json {
        output::print_output(&output::render_json(&report)?)?;
    }
    Ok(())
}
