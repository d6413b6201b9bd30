//! Integration tests for the data-flow analyzer.

mod helpers;

use cadence_compiler::analysis::{UnresolvedReason, analyze_data_flow};
use cadence_compiler::error::LookupError;
use cadence_compiler::parse::parse;
use cadence_compiler::registry::{ActionMetadata, ParameterSpec};
use helpers::*;
use serde_json::json;

#[test]
fn adjacent_exact_match_has_full_strength() {
    let nodes = vec![
        action("A", "swap", &[]).then("B"),
        action("B", "stake", &[("amount", "UFix64", json!("A.amountOut"))]),
    ];
    let workflow = parse(&nodes, &[]);
    let metadata = index([producer("swap", "amountOut", "UFix64"), consumer("stake", "amount", "UFix64")]);

    let analysis = analyze_data_flow(&workflow, &metadata, &no_values());

    assert_eq!(analysis.connections.len(), 1);
    let c = &analysis.connections[0];
    assert_eq!(c.source_action_id, "A");
    assert_eq!(c.target_parameter, "amount");
    assert!(c.is_type_compatible);
    assert_eq!(c.strength, 1.0);
    assert!(analysis.type_mismatches.is_empty());
    assert!(analysis.is_data_flow_valid());
    assert_eq!(analysis.dependencies_of("B"), ["A".to_string()]);
}

#[test]
fn string_into_ufix64_is_a_non_convertible_mismatch() {
    let nodes = vec![
        action("A", "submit", &[]).then("B"),
        action("B", "stake", &[("amount", "UFix64", json!("A.transactionId"))]),
    ];
    let workflow = parse(&nodes, &[]);
    let metadata = index([producer("submit", "transactionId", "String"), consumer("stake", "amount", "UFix64")]);

    let analysis = analyze_data_flow(&workflow, &metadata, &no_values());

    assert_eq!(analysis.connections.len(), 1);
    assert!(!analysis.connections[0].is_type_compatible);
    assert!((analysis.connections[0].strength - 0.3).abs() < 1e-9);
    let mismatch = &analysis.type_mismatches[0];
    assert!(!mismatch.can_convert);
    assert!(mismatch.suggestion.contains("parse numeric string as decimal"));
    assert!(!analysis.is_data_flow_valid());
}

#[test]
fn numeric_and_string_targets_score_lower_than_exact() {
    let nodes = vec![
        action("A", "count", &[]).then("B"),
        action(
            "B",
            "sink",
            &[
                ("amount", "UFix64", json!("A.total")),
                ("memo", "String", json!("A.total")),
            ],
        ),
    ];
    let workflow = parse(&nodes, &[]);
    let metadata = index([producer("count", "total", "UInt64")]);

    let analysis = analyze_data_flow(&workflow, &metadata, &no_values());

    let amount = analysis.connection_for("B", "amount").unwrap();
    let memo = analysis.connection_for("B", "memo").unwrap();
    assert!((amount.strength - 0.8).abs() < 1e-9);
    assert!((memo.strength - 0.6).abs() < 1e-9);
    assert!(analysis.type_mismatches.is_empty());
}

#[test]
fn strength_decays_with_distance() {
    let nodes = vec![
        action("A", "swap", &[]).then("X"),
        action("X", "noop", &[]).then("Y"),
        action("Y", "noop", &[]).then("B"),
        action("B", "stake", &[("amount", "UFix64", json!("A.amountOut"))]),
    ];
    let workflow = parse(&nodes, &[]);
    let metadata = index([producer("swap", "amountOut", "UFix64"), consumer("stake", "amount", "UFix64")]);

    let analysis = analyze_data_flow(&workflow, &metadata, &no_values());

    // two intervening actions
    assert!((analysis.connections[0].strength - 0.8).abs() < 1e-9);
}

#[test]
fn mutual_references_form_a_cycle() {
    let relay = ActionMetadata::new("relay", "Relay")
        .with_parameter(ParameterSpec::required("input", "String"))
        .with_output("output", "String");
    let nodes = vec![
        action("A", "relay", &[("input", "String", json!("seed"))]).then("B"),
        action("B", "relay", &[("input", "String", json!("C.output"))]).then("C"),
        action("C", "relay", &[("input", "String", json!("B.output"))]),
    ];
    let workflow = parse(&nodes, &[]);
    let metadata = index([relay]);

    let analysis = analyze_data_flow(&workflow, &metadata, &no_values());

    assert_eq!(analysis.circular_dependencies.len(), 1);
    assert_eq!(analysis.circular_dependencies[0].actions, vec!["B", "C"]);
    assert!(analysis.circular_dependencies[0].suggestion.contains("literal value"));

    let forward = &analysis.unresolved_references[0];
    assert_eq!(forward.action_id, "B");
    assert_eq!(forward.reason, UnresolvedReason::ForwardReference);
    assert_eq!(analysis.connections.len(), 1);
    assert_eq!(analysis.connections[0].target_action_id, "C");
}

#[test]
fn self_reference_is_unresolved() {
    let relay = ActionMetadata::new("relay", "Relay").with_output("output", "String");
    let nodes = vec![action("A", "relay", &[("input", "String", json!("A.output"))])];
    let analysis = analyze_data_flow(&parse(&nodes, &[]), &index([relay]), &no_values());

    assert_eq!(analysis.unresolved_references[0].reason, UnresolvedReason::SelfReference);
    assert!(analysis.connections.is_empty());
    assert_eq!(analysis.circular_dependencies[0].actions, vec!["A"]);
}

#[test]
fn unknown_output_suggests_same_type_names_first() {
    let source = ActionMetadata::new("swap", "Swap")
        .with_output("memo", "String")
        .with_output("amountOut", "UFix64")
        .with_output("fee", "UFix64");
    let nodes = vec![
        action("A", "swap", &[]).then("B"),
        action("B", "stake", &[("amount", "UFix64", json!("A.amountOt"))]),
    ];
    let workflow = parse(&nodes, &[]);
    let metadata = index([source, consumer("stake", "amount", "UFix64")]);

    let analysis = analyze_data_flow(&workflow, &metadata, &no_values());

    let unresolved = &analysis.unresolved_references[0];
    assert_eq!(unresolved.reason, UnresolvedReason::UnknownOutput);
    assert_eq!(unresolved.suggestions[0], "amountOut");
    assert!(unresolved.suggestions.len() <= 3);
    assert!(analysis.connections.is_empty());
}

#[test]
fn failed_source_metadata_is_unresolved() {
    let nodes = vec![
        action("A", "oracle", &[]).then("B"),
        action("B", "stake", &[("amount", "UFix64", json!("A.price"))]),
    ];
    let workflow = parse(&nodes, &[]);
    let mut metadata = index([consumer("stake", "amount", "UFix64")]);
    metadata.record(
        "oracle",
        Err(LookupError::Unavailable {
            action_type: "oracle".into(),
            reason: "timeout".into(),
        }),
    );

    let analysis = analyze_data_flow(&workflow, &metadata, &no_values());

    assert_eq!(analysis.unresolved_references[0].reason, UnresolvedReason::MetadataUnavailable);
}

#[test]
fn editor_values_override_bindings() {
    let nodes = vec![
        action("A", "swap", &[]).then("B"),
        action("B", "stake", &[("amount", "UFix64", json!(""))]),
    ];
    let workflow = parse(&nodes, &[]);
    let metadata = index([producer("swap", "amountOut", "UFix64"), consumer("stake", "amount", "UFix64")]);
    let values = values(&[("B", "amount", json!("A.amountOut"))]);

    let analysis = analyze_data_flow(&workflow, &metadata, &values);

    assert_eq!(analysis.connections.len(), 1);
}

#[test]
fn decimal_literals_are_not_references() {
    let nodes = vec![action("A", "stake", &[("amount", "UFix64", json!("10.5"))])];
    let analysis = analyze_data_flow(
        &parse(&nodes, &[]),
        &index([consumer("stake", "amount", "UFix64")]),
        &no_values(),
    );
    assert!(analysis.connections.is_empty());
    assert!(analysis.unresolved_references.is_empty());
}

#[test]
fn connections_always_point_backwards() {
    let json = include_str!("fixtures/balance_swap_stake.json");
    let workflow = cadence_compiler::parse::parse_json(json).unwrap();
    let analysis = analyze_data_flow(&workflow, &catalog(), &no_values());

    assert_eq!(analysis.connections.len(), 2);
    for c in &analysis.connections {
        assert!(workflow.position(&c.source_action_id) < workflow.position(&c.target_action_id));
    }
}
