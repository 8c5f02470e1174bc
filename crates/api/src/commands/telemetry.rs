//! Error telemetry commands

use std::time::Instant;

use leadpipe_core::FlushOutcome;
use leadpipe_domain::AppError;
use serde_json::{Map, Value};

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Queue an error for persistence. Never blocks and never fails the caller.
pub fn report_error(ctx: &AppContext, error: AppError, context: Map<String, Value>) {
    ctx.telemetry.record(error, context);
}

/// Write buffered error records now.
pub async fn flush_telemetry(ctx: &AppContext) -> Result<FlushOutcome, String> {
    let command_name = "telemetry::flush_telemetry";
    let start = Instant::now();

    let result = ctx.telemetry.flush().await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result.map_err(|e| e.to_string())
}

/// Number of error records waiting to be written.
pub async fn queued_error_count(ctx: &AppContext) -> Result<usize, String> {
    ctx.telemetry.pending().await.map_err(|e| e.to_string())
}
