use clap::Parser;
use std::process::ExitCode;
use timeseries_acquisition::{
    AcquisitionConfig, AcquisitionError, AcquisitionPipeline, SeriesRequest, DEFAULT_HORIZON_DAYS,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fetch a densified daily time series for a free-text query
#[derive(Debug, Parser)]
#[command(name = "fetch-series", version)]
struct Cli {
    /// Free-text query, e.g. "台股加權指數" or "Tokyo temperature"
    #[arg(long, short)]
    query: String,

    /// Number of days the caller wants covered
    #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_HORIZON_DAYS)]
    horizon_days: i64,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), error = %e, "Time-series fetch failed");
            eprintln!("error [{}]: {}", e.code(), e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: &Cli) -> Result<(), AcquisitionError> {
    let config = AcquisitionConfig::from_env();
    let pipeline = AcquisitionPipeline::from_config(&config)?;

    info!(query = %cli.query, horizon_days = cli.horizon_days, "Fetching time series");

    let request = SeriesRequest::new(cli.query.clone(), cli.horizon_days);
    let ctrl_c = async {
        // If the handler cannot be installed, never cancel
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let result = pipeline.fetch_time_series_until(request, ctrl_c).await?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }?;

    println!("{}", rendered);
    Ok(())
}

fn exit_code(error: &AcquisitionError) -> u8 {
    match error {
        AcquisitionError::UnrecognizedTopic { .. }
        | AcquisitionError::InvalidArgument(_)
        | AcquisitionError::InvalidInput(_) => 2,
        AcquisitionError::SourceUnavailable { .. } | AcquisitionError::Provider(_) => 3,
        AcquisitionError::Serialization(_) => 1,
        AcquisitionError::Cancelled => 130,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_separate_caller_and_internal_failures() {
        let json_err = serde_json::from_str::<serde_json::Value>("]").unwrap_err();

        assert_eq!(exit_code(&AcquisitionError::Serialization(json_err)), 1);
        assert_eq!(exit_code(&AcquisitionError::InvalidArgument("h".into())), 2);
        assert_eq!(
            exit_code(&AcquisitionError::source_unavailable("down", "finance", None)),
            3
        );
        assert_eq!(exit_code(&AcquisitionError::Cancelled), 130);
    }
}
