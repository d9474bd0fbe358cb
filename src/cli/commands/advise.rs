//! One-shot phase decision.

use crate::advisor::PhoenixAdvisor;
use crate::cli::args::AdviseArgs;
use crate::error::PhoenixError;
use crate::phase::{PhaseInput, Reading};
use crate::runner::Response;

/// Prints `{"next_phase": ...}` for a single reading.
///
/// # Errors
///
/// Returns an error if `--config` was given and cannot be loaded.
pub fn run(args: &AdviseArgs) -> Result<(), PhoenixError> {
    let config = super::config_or_default(args.config.as_deref())?;
    let advisor = PhoenixAdvisor::new(config);

    let reading = Reading::new(args.psi, args.pe);
    let (next_phase, transition) = advisor.advise(PhaseInput::new(args.phase.clone()), reading);
    match transition {
        Some(t) => tracing::info!(
            from = %t.from,
            to = %t.to,
            rule = t.rule.name(),
            reason = %t.rule.reason(advisor.config(), reading),
            "phase transition"
        ),
        None => tracing::info!(phase = %next_phase, "phase unchanged"),
    }

    let response = Response::NextPhase { next_phase };
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
