use anyhow::Result;
use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use tracing::{error, info};

use crate::pipeline::Pipeline;

/// Time left until the next occurrence of `at`, today or tomorrow
pub fn until_next_run(now: NaiveDateTime, at: NaiveTime) -> std::time::Duration {
    let today = now.date().and_time(at);
    let next = if today >= now {
        today
    } else {
        today + Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

/// Run the pipeline once a day at `at` local time, forever.
///
/// Each run is awaited before the next wake-up is computed, so runs never
/// overlap. A failed run is logged and the loop carries on.
pub async fn run_daily(pipeline: &Pipeline<'_>, at: NaiveTime) -> Result<()> {
    info!(at = %at.format("%H:%M"), "⏳ Scheduler active");

    loop {
        let wait = until_next_run(Local::now().naive_local(), at);
        info!(secs = wait.as_secs(), "Sleeping until next run");
        tokio::time::sleep(wait).await;

        match pipeline.run().await {
            Ok(report) => info!(written = report.total_written(), "Scheduled run finished"),
            Err(e) => error!(error = %e, "Scheduled run failed"),
        }
    }
}
