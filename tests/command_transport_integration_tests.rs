//! Integration tests for calling the plugin binary through a client.

mod common;

use common::event_file;
use rulecheck::rules::{
    FIELD_LOWER_SNAKE_CASE_RULE_ID, SYNTAX_UNSPECIFIED_RULE_ID, TIMESTAMP_SUFFIX_RULE_ID,
};
use rulecheck::{
    CallContext, CheckClient, CheckError, Client, ClientOptions, CommandTransport, ErrorCode,
    Request,
};

fn plugin_client() -> Client {
    Client::new(
        CommandTransport::new(env!("CARGO_BIN_EXE_rulecheck-plugin")),
        ClientOptions::new().with_cache(),
    )
}

#[test]
fn lists_rules_from_plugin() {
    let rules = plugin_client().list_rules(&CallContext::new()).unwrap();
    let ids: Vec<&str> = rules.iter().map(|rule| rule.id()).collect();
    assert_eq!(
        ids,
        vec![
            FIELD_LOWER_SNAKE_CASE_RULE_ID,
            SYNTAX_UNSPECIFIED_RULE_ID,
            TIMESTAMP_SUFFIX_RULE_ID
        ]
    );
}

#[test]
fn checks_files_through_plugin() {
    let client = Client::new(
        CommandTransport::new(env!("CARGO_BIN_EXE_rulecheck-plugin")).arg("--parallel"),
        ClientOptions::new(),
    );
    let request = Request::builder(vec![event_file()])
        .rule_ids([FIELD_LOWER_SNAKE_CASE_RULE_ID])
        .build()
        .unwrap();
    let response = client.check(&CallContext::new(), &request).unwrap();

    assert_eq!(response.annotations().len(), 1);
    let annotation = &response.annotations()[0];
    assert_eq!(annotation.rule_id(), FIELD_LOWER_SNAKE_CASE_RULE_ID);
    assert!(annotation.message().contains("event_name"));
}

#[test]
fn plugin_call_error_decodes_to_remote_error() {
    // The plugin rejects rules it does not provide.
    let request = Request::builder(vec![event_file()])
        .rule_ids([TIMESTAMP_SUFFIX_RULE_ID, "NOT_PROVIDED"])
        .build()
        .unwrap();
    let result = plugin_client().check(&CallContext::new(), &request);

    match result {
        Err(CheckError::Remote { code, message }) => {
            assert_eq!(code, ErrorCode::InvalidArgument);
            assert!(message.contains("NOT_PROVIDED"), "{message}");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}
