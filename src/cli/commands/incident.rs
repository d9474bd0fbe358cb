//! One-shot mitigation lookup.

use crate::advisor::{PhoenixAdvisor, ResiliencePlugin};
use crate::cli::args::IncidentArgs;
use crate::error::PhoenixError;
use crate::incident::{DEFAULT_REALM, Incident};

/// Prints the mitigation object for a single incident.
///
/// # Errors
///
/// Returns an error if `--config` was given and cannot be loaded.
pub fn run(args: &IncidentArgs) -> Result<(), PhoenixError> {
    let config = super::config_or_default(args.config.as_deref())?;
    let advisor = PhoenixAdvisor::new(config);

    let incident = Incident {
        threat: args.threat.clone(),
        realm: args.realm.clone().unwrap_or_else(|| DEFAULT_REALM.to_string()),
    };
    let mitigation = advisor.on_incident(&incident);
    tracing::info!(
        threat = incident.threat.as_deref().unwrap_or("<none>"),
        kind = mitigation.kind(),
        "mitigation recommended"
    );

    println!("{}", serde_json::to_string(&mitigation)?);
    Ok(())
}
