//! Long-running and streaming command handlers.

use super::commands::OutputFormat;
use super::output::{print_json, print_json_line};
use tally::{
    InboundEvent, IngestOutcome, IoError, RotationScheduler, TallyResult, Tracker,
    TrackerConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Counts reported when an input stream ends.
#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct IngestReport {
    /// Events applied.
    pub applied: usize,
    /// Lines that were not valid events.
    pub skipped: usize,
    /// Events that failed to store.
    pub failed: usize,
}

/// Apply JSON-lines events from stdin until end of input.
///
/// Malformed lines and storage failures are logged and counted; they do not
/// stop the stream.
pub async fn ingest_stdin(tracker: &Tracker, format: OutputFormat) -> TallyResult<IngestReport> {
    let ingestor = tracker.ingestor();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut report = IngestReport::default();
    let mut line_number = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| IoError::new(format!("Failed to read stdin: {}", e)))?
    {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: InboundEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line_number, error = %e, "Skipping malformed event");
                report.skipped += 1;
                continue;
            }
        };

        match ingestor.apply(&event).await {
            Ok(outcome) => {
                report.applied += 1;
                announce(&outcome, format)?;
            }
            Err(e) => {
                warn!(line_number, error = %e, "Failed to apply event");
                report.failed += 1;
            }
        }
    }

    info!(
        applied = report.applied,
        skipped = report.skipped,
        failed = report.failed,
        "Input stream ended"
    );
    Ok(report)
}

fn announce(outcome: &IngestOutcome, format: OutputFormat) -> TallyResult<()> {
    match (format, outcome) {
        (_, IngestOutcome::Recorded) => {}
        (OutputFormat::Json, outcome) => print_json_line(outcome)?,
        (OutputFormat::Human, IngestOutcome::LevelUp(up)) => {
            println!(
                "Member {} reached level {} in guild {}",
                up.user_id, up.level, up.guild_id
            );
        }
        (OutputFormat::Human, IngestOutcome::SessionClosed(session)) => {
            println!(
                "Member {} spent {} minutes in channel {}",
                session.user_id, session.minutes, session.channel_id
            );
        }
        (OutputFormat::Human, IngestOutcome::RolesLogged { .. }) => {}
    }
    Ok(())
}

/// Run the weekly rotation scheduler until Ctrl-C, optionally ingesting stdin.
pub async fn serve(
    tracker: &Tracker,
    config: &TrackerConfig,
    stdin: bool,
    format: OutputFormat,
) -> TallyResult<()> {
    let handle = RotationScheduler::from_config(tracker.periods().clone(), &config.rotation)?.start();
    info!(policy = %config.rotation.policy, "Rotation scheduler running; press Ctrl-C to stop");

    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    let result = if stdin {
        tokio::select! {
            result = ingest_then_wait(tracker, format) => result,
            _ = interrupted => Ok(()),
        }
    } else {
        interrupted.await;
        Ok(())
    };

    info!("Shutting down");
    handle.shutdown().await;
    result
}

async fn ingest_then_wait(tracker: &Tracker, format: OutputFormat) -> TallyResult<()> {
    let report = ingest_stdin(tracker, format).await?;
    if format == OutputFormat::Json {
        print_json(&report)?;
    }
    // Input closed; keep rotating until interrupted.
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| IoError::new(format!("Failed to listen for Ctrl-C: {}", e)))?;
    Ok(())
}
