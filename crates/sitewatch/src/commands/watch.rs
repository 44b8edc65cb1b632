//! `watch`: periodic re-checks until Ctrl-C.

use std::time::Duration;

use tabled::Tabled;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sitewatch_core::{CheckOutcome, CoreError, HttpMonitor, MonitorConfig, Watcher};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Previous")]
    previous: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl OutcomeRow {
    fn new(outcome: &CheckOutcome, color: bool) -> Self {
        Self {
            id: outcome.site_id.to_string(),
            name: outcome.site_name.clone(),
            status: output::paint_reachability(outcome.reachability, color),
            previous: output::paint_reachability(outcome.previous, color),
            note: outcome_note(outcome),
        }
    }
}

fn outcome_note(outcome: &CheckOutcome) -> String {
    match (&outcome.error, outcome.changed()) {
        (Some(e), _) => e.clone(),
        (None, true) => "changed".into(),
        (None, false) => String::new(),
    }
}

/// One line per outcome while streaming.
fn outcome_line(outcome: &CheckOutcome, format: OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(outcome),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(outcome).trim_end()),
        OutputFormat::Plain => format!(
            "{} {}",
            outcome.site_id,
            outcome
                .reachability
                .map_or_else(|| "error".into(), |r| r.to_string())
        ),
        OutputFormat::Table => {
            let mut line = format!(
                "{} ({}): {}",
                outcome.site_name,
                outcome.site_id,
                output::paint_reachability(outcome.reachability, color)
            );
            let note = outcome_note(outcome);
            if !note.is_empty() {
                line.push_str(&format!(" [{note}]"));
            }
            line
        }
    }
}

pub async fn handle(
    monitor: &HttpMonitor,
    mc: &MonitorConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let default_interval = match args.default_interval {
        Some(0) => {
            return Err(CliError::Validation {
                field: "default-interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Some(secs) => Duration::from_secs(secs),
        None => mc.default_interval,
    };
    let color = output::should_color(global.color);
    let watcher = Watcher::new(monitor.clone(), default_interval);

    if args.once {
        let outcomes = watcher.run_once().await?;
        let out = output::render_list(
            global.output,
            &outcomes,
            |o| OutcomeRow::new(o, color),
            |o| o.site_id.to_string(),
        );
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let outcomes = watcher.subscribe();
    let runner = tokio::spawn({
        let cancel = cancel.clone();
        async move { watcher.run(cancel).await }
    });

    if !global.quiet {
        eprintln!("Watching sites (Ctrl-C to stop)");
    }

    let stop = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping watcher");
        }
    };
    stream_outcomes(runner, outcomes, &cancel, stop, |outcome| {
        output::print_output(&outcome_line(&outcome, global.output, color), global.quiet);
    })
    .await
}

/// Forward outcomes to `emit` until the runner finishes. `stop` resolving
/// cancels the runner; outcomes already queued are still emitted.
async fn stream_outcomes(
    mut runner: JoinHandle<Result<(), CoreError>>,
    mut outcomes: broadcast::Receiver<CheckOutcome>,
    cancel: &CancellationToken,
    stop: impl Future<Output = ()>,
    mut emit: impl FnMut(CheckOutcome),
) -> Result<(), CliError> {
    tokio::pin!(stop);
    let mut stopping = false;

    let joined = loop {
        tokio::select! {
            biased;

            msg = outcomes.recv() => match msg {
                Ok(outcome) => emit(outcome),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "output fell behind, some outcomes were dropped");
                }
                Err(RecvError::Closed) => break (&mut runner).await,
            },
            () = &mut stop, if !stopping => {
                stopping = true;
                cancel.cancel();
            }
        }
    };

    joined.map_err(|e| CliError::Internal(format!("watcher task failed: {e}")))??;
    Ok(())
}
