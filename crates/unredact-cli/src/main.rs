mod output;

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unredact_core::error::UnredactError;
use unredact_core::extraction::pdftotext::PdftotextExtractor;
use unredact_core::{run_batch, BatchConfig, FallbackExtractor};

const USAGE: &str = "Usage: unredact /path/to/pdf_folder";

/// How long to wait at exit for extractions that ignored their timeout.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(
    name = "unredact",
    version,
    about = "Batch-extract the text layer of every PDF in a folder, including text hidden under overlay redactions"
)]
struct Cli {
    /// Folder to scan recursively for .pdf files. Text files are written to
    /// <INPUT_DIR>/unredacted_txt
    input_dir: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            println!("{USAGE}");
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), UnredactError> {
    if !PdftotextExtractor::is_available() {
        return Err(UnredactError::PdftotextNotFound);
    }

    let config = BatchConfig::default();
    let extractor = FallbackExtractor::from_config(&config);
    let cancel = CancellationToken::new();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let cancel_on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, finishing the current PDF");
                cancel_on_signal.cancel();
            }
        });

        run_batch(
            &cli.input_dir,
            &config,
            extractor,
            output::progress::print_event,
            cancel,
        )
        .await
    });

    // A hung lopdf parse may still hold a blocking thread.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    let report = result?;
    println!("{}", output::progress::format_summary(&report));
    Ok(())
}
