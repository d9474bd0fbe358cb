mod common;

use common::PhoenixProcess;
use serde_json::json;

#[tokio::test]
async fn readings_follow_the_phase_cycle() {
    let mut runner = PhoenixProcess::spawn(&PhoenixProcess::fixture_path("default.yaml"));

    let resp = runner
        .request(&json!({"phase": "Normal", "psi": 0.5, "pe": 3.0}))
        .await;
    assert_eq!(resp, json!({"next_phase": "Nigredo"}));

    let resp = runner
        .request(&json!({"phase": "Nigredo", "psi": 0.25, "pe": 5.0}))
        .await;
    assert_eq!(resp, json!({"next_phase": "Rubedo"}));

    let resp = runner
        .request(&json!({"phase": "Rubedo", "psi": 0.9, "pe": 0.6}))
        .await;
    assert_eq!(resp, json!({"next_phase": "Rubedo"}));

    let resp = runner
        .request(&json!({"phase": "Rubedo", "psi": 0.9, "pe": 0.3}))
        .await;
    assert_eq!(resp, json!({"next_phase": "Normal"}));

    let (rest, status) = runner.finish().await;
    assert!(rest.is_empty());
    assert!(status.success());
}

#[tokio::test]
async fn incidents_map_to_mitigations() {
    let mut runner = PhoenixProcess::spawn(&PhoenixProcess::fixture_path("default.yaml"));

    let resp = runner
        .request(&json!({"type": "incident", "threatType": "injection", "realm": "r1"}))
        .await;
    assert_eq!(
        resp,
        json!({"kind": "rate_limit", "parameters": {"realm": "r1", "mode": "auto"}})
    );

    let resp = runner
        .request(&json!({"type": "incident", "threat": "integrity-violation"}))
        .await;
    assert_eq!(
        resp,
        json!({"kind": "integrity_verify", "parameters": {"realm": "default", "recompute_merkle": true}})
    );

    let resp = runner.request(&json!({"type": "incident"})).await;
    assert_eq!(resp, json!({"kind": "none", "parameters": {}}));

    runner.finish().await;
}

#[tokio::test]
async fn malformed_lines_produce_no_output() {
    let mut runner = PhoenixProcess::spawn(&PhoenixProcess::fixture_path("default.yaml"));

    runner.send_line("this is not json").await;
    runner.send_line("").await;
    runner.send_line("[1, 2, 3]").await;
    runner.send_line(r#"{"psi": "very high"}"#).await;

    // The next answer belongs to the first well-formed line.
    let resp = runner.request(&json!({"pe": 9.0})).await;
    assert_eq!(resp, json!({"next_phase": "Nigredo"}));

    let (rest, status) = runner.finish().await;
    assert!(rest.is_empty());
    assert!(status.success());
}

#[tokio::test]
async fn one_response_per_valid_line_in_order() {
    let mut runner = PhoenixProcess::spawn(&PhoenixProcess::fixture_path("default.yaml"));

    let inputs = [
        json!({"phase": "Normal", "pe": 3.0}),
        json!({"type": "incident", "threatType": "dos-attack"}),
        json!({}),
        json!({"phase": "custom", "psi": 0.0, "pe": 99.0}),
        json!({"phase": "nigredo", "psi": "0.3"}),
    ];
    for input in &inputs {
        runner.send_line(&input.to_string()).await;
    }
    runner.send_line("{broken").await;

    let (responses, status) = runner.finish().await;
    assert!(status.success());
    assert_eq!(
        responses,
        vec![
            json!({"next_phase": "Nigredo"}),
            json!({"kind": "rate_limit", "parameters": {"realm": "default", "mode": "auto"}}),
            json!({"next_phase": "Normal"}),
            json!({"next_phase": "custom"}),
            json!({"next_phase": "Rubedo"}),
        ]
    );
}

#[tokio::test]
async fn disabled_config_keeps_phase_verbatim() {
    let mut runner = PhoenixProcess::spawn(&PhoenixProcess::fixture_path("disabled.yaml"));

    let resp = runner
        .request(&json!({"phase": "normal", "psi": 0.0, "pe": 100.0}))
        .await;
    assert_eq!(resp, json!({"next_phase": "normal"}));

    // Incidents are still classified.
    let resp = runner
        .request(&json!({"type": "incident", "threatType": "capability-breach", "realm": "z"}))
        .await;
    assert_eq!(
        resp,
        json!({"kind": "capability_validation", "parameters": {"realm": "z", "revalidate": true}})
    );

    runner.finish().await;
}

#[tokio::test]
async fn yaml11_off_config_passes_phase_through() {
    let mut runner = PhoenixProcess::spawn(&PhoenixProcess::fixture_path("disabled_off.yaml"));

    let resp = runner.request(&json!({"phase": "Normal", "pe": 50.0})).await;
    assert_eq!(resp, json!({"next_phase": "Normal"}));

    let (_, status) = runner.finish().await;
    assert!(status.success());
}

#[tokio::test]
async fn partial_config_raises_pressure_threshold() {
    let mut runner = PhoenixProcess::spawn(&PhoenixProcess::fixture_path("partial.yaml"));

    let resp = runner.request(&json!({"pe": 3.0})).await;
    assert_eq!(resp, json!({"next_phase": "Normal"}));

    let resp = runner.request(&json!({"pe": 5.5})).await;
    assert_eq!(resp, json!({"next_phase": "Nigredo"}));

    runner.finish().await;
}

#[tokio::test]
async fn no_config_uses_defaults() {
    let mut runner = PhoenixProcess::spawn_run(&["--no-config"]);

    let resp = runner.request(&json!({"psi": 0.208, "pe": 2.5})).await;
    assert_eq!(resp, json!({"next_phase": "Nigredo"}));

    runner.finish().await;
}

#[tokio::test]
async fn line_limit_is_read_from_environment() {
    let mut runner =
        PhoenixProcess::spawn_run_with_env(&["--no-config"], &[("PHOENIX_MAX_LINE_SIZE", "32")]);

    runner
        .send_line(&json!({"pe": 3.0, "padding": "x".repeat(64)}).to_string())
        .await;
    runner.send_line(r#"{"pe": 3.0}"#).await;

    let (responses, status) = runner.finish().await;
    assert!(status.success());
    assert_eq!(responses, vec![json!({"next_phase": "Nigredo"})]);
}

#[tokio::test]
async fn explicit_nulls_take_protocol_defaults() {
    let mut runner = PhoenixProcess::spawn_run(&["--no-config"]);

    // A null phase is treated as absent.
    let resp = runner
        .request(&json!({"phase": null, "psi": 0.5, "pe": 3.0}))
        .await;
    assert_eq!(resp, json!({"next_phase": "Nigredo"}));

    // A null realm falls back to "default".
    let resp = runner
        .request(&json!({"type": "incident", "threatType": "dos-attack", "realm": null}))
        .await;
    assert_eq!(
        resp,
        json!({"kind": "rate_limit", "parameters": {"realm": "default", "mode": "auto"}})
    );

    // A null reading value is malformed and produces no output.
    runner.send_line(r#"{"psi": null}"#).await;
    let resp = runner.request(&json!({"phase": "Nigredo", "psi": 0.3})).await;
    assert_eq!(resp, json!({"next_phase": "Rubedo"}));

    runner.finish().await;
}

#[tokio::test]
async fn missing_config_exits_with_config_error() {
    let runner = PhoenixProcess::spawn_run(&["--config", "/nonexistent/phoenix.yaml"]);
    let (responses, status) = runner.finish().await;
    assert!(responses.is_empty());
    assert_eq!(status.code(), Some(2));
}

#[tokio::test]
async fn events_file_records_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let events_path = dir.path().join("events.jsonl");
    let config = PhoenixProcess::fixture_path("default.yaml");

    let mut runner = PhoenixProcess::spawn_run(&[
        "--config",
        config.to_str().unwrap(),
        "--events-file",
        events_path.to_str().unwrap(),
    ]);
    runner.request(&json!({"pe": 3.0})).await;
    runner
        .request(&json!({"type": "incident", "threatType": "injection"}))
        .await;
    runner.send_line("nope").await;
    let (_, status) = runner.finish().await;
    assert!(status.success());

    let content = std::fs::read_to_string(&events_path).unwrap();
    let events: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let types: Vec<&str> = events
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec![
            "RunnerStarted",
            "PhaseTransitioned",
            "MitigationRecommended",
            "EventSkipped",
            "RunnerStopped",
        ]
    );

    let sequences: Vec<u64> = events
        .iter()
        .map(|e| e["sequence"].as_u64().unwrap())
        .collect();
    assert!(sequences.windows(2).all(|w| w[0] < w[1]));

    let stopped = events.last().unwrap();
    assert_eq!(stopped["reason"], "end_of_input");
    assert_eq!(stopped["summary"]["readings"], 1);
    assert_eq!(stopped["summary"]["incidents"], 1);
    assert_eq!(stopped["summary"]["skipped"], 1);
}
