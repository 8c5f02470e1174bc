//! Lead submission commands

use std::time::Instant;

use leadpipe_core::Priority;
use leadpipe_domain::{Lead, ResilientResult};
use serde_json::Value;
use tracing::info;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Store a contact-form submission.
///
/// On failure the user-facing message is returned and the failure is
/// reported to error telemetry.
pub async fn submit_lead(ctx: &AppContext, lead: &Lead) -> ResilientResult<Value> {
    let command_name = "leads::submit_lead";
    let start = Instant::now();
    info!(command = command_name, submission_type = %lead.submission_type, "Executing submit_lead");

    let result = ctx.leads.submit(lead).await;

    log_command_execution(command_name, start.elapsed(), result.is_success());
    result
}

/// Store a submission through the serialized request queue.
///
/// `Priority::High` jumps ahead of everything already waiting.
pub async fn submit_lead_queued(
    ctx: &AppContext,
    lead: &Lead,
    priority: Priority,
) -> ResilientResult<Value> {
    let command_name = "leads::submit_lead_queued";
    let start = Instant::now();
    info!(command = command_name, %priority, "Executing submit_lead_queued");

    let result = ctx.leads.submit_queued(lead, priority).await;

    log_command_execution(command_name, start.elapsed(), result.is_success());
    result
}
