use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::descriptor::{FieldDescriptor, FileDescriptor, MessageDescriptor};
use crate::error::{CheckError, ErrorCode, IdKind};
use crate::file::File;
use crate::rule::RuleType;
use crate::server::ServiceHandler;
use crate::spec::{CategorySpec, RuleHandlerFn, RuleSpec, Spec};
use crate::transport::{LocalTransport, Transport};
use crate::wire::{self, CheckRequest, ListRulesResponse, Method, WireRule};
use crate::writer::{AnnotationBuilder, ResponseWriter};

/// Records every call before forwarding it to an in-process provider.
struct RecordingTransport {
    inner: LocalTransport,
    calls: Mutex<Vec<(Method, Vec<String>)>>,
}

impl RecordingTransport {
    fn new(spec: Spec) -> Arc<Self> {
        Arc::new(Self {
            inner: LocalTransport::for_spec(spec).unwrap(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn count(&self, method: Method) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| *m == method)
            .count()
    }

    fn check_rule_ids(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| *m == Method::Check)
            .map(|(_, ids)| ids.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn call(&self, ctx: &CallContext, method: Method, request: &[u8]) -> Result<Vec<u8>> {
        let rule_ids = if method == Method::Check {
            wire::decode::<CheckRequest>(request)?.rule_ids
        } else {
            Vec::new()
        };
        self.calls.lock().unwrap().push((method, rule_ids));
        self.inner.call(ctx, method, request)
    }
}

/// Fails every call and counts attempts.
#[derive(Default)]
struct FailingTransport {
    attempts: AtomicUsize,
}

impl Transport for FailingTransport {
    fn call(&self, _: &CallContext, _: Method, _: &[u8]) -> Result<Vec<u8>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CheckError::Remote {
            code: ErrorCode::Internal,
            message: "provider crashed".to_string(),
        })
    }
}

fn rule_id(n: usize) -> String {
    let letter = |k: usize| char::from(b'A' + u8::try_from(k % 26).unwrap());
    format!("RULE_{}{}{}", letter(n / 676), letter(n / 26), letter(n))
}

fn report_first_field(_: &CallContext, writer: &ResponseWriter, request: &Request) -> Result<()> {
    for file in request.files() {
        for message in file.descriptor().message_refs() {
            if let Some(field) = message.fields().next() {
                writer.add_annotation(
                    AnnotationBuilder::new()
                        .message(format!("{} saw {}", writer.rule_id(), field.name()))
                        .descriptor(&field),
                );
            }
        }
    }
    Ok(())
}

fn rule(id: &str, is_default: bool) -> RuleSpec {
    RuleSpec::new(
        id,
        "Reports the first field.",
        RuleType::Lint,
        RuleHandlerFn::new(report_first_field),
    )
    .with_default(is_default)
}

fn file() -> File {
    File::new(
        FileDescriptor::new("acme/v1/order.proto").with_message(
            MessageDescriptor::new("Order").with_field(FieldDescriptor::scalar("order_id", 1)),
        ),
        false,
    )
}

fn annotation_rule_ids(response: &Response) -> Vec<&str> {
    response.annotations().iter().map(|a| a.rule_id()).collect()
}

#[test]
fn check_round_trips_annotations_with_locations() {
    let client =
        Client::for_spec(Spec::new(vec![rule("FIELD_NAME", true)]), ClientOptions::new()).unwrap();
    let response = client
        .check(&CallContext::new(), &Request::new(vec![file()]).unwrap())
        .unwrap();
    assert_eq!(response.len(), 1);
    let annotation = &response.annotations()[0];
    assert_eq!(annotation.message(), "FIELD_NAME saw order_id");
    let location = annotation.location().unwrap();
    assert_eq!(location.file_name(), "acme/v1/order.proto");
    assert_eq!(location.source_path(), &[4, 0, 2, 0]);
}

#[test]
fn large_rule_filter_is_split_into_partitioning_calls() {
    let rules: Vec<RuleSpec> = (0..600).map(|n| rule(&rule_id(n), false)).collect();
    let spec = Spec::new(rules);
    let transport = RecordingTransport::new(spec.clone());
    let client = Client::new(Arc::clone(&transport), ClientOptions::new());
    let ids: Vec<String> = (0..600).map(rule_id).collect();
    let request = Request::builder(vec![file()])
        .rule_ids(ids.clone())
        .build()
        .unwrap();

    let response = client.check(&CallContext::new(), &request).unwrap();

    let calls = transport.check_rule_ids();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|chunk| chunk.len() <= 250));
    let rejoined: Vec<String> = calls.into_iter().flatten().collect();
    assert_eq!(rejoined, ids);

    let unchunked = ServiceHandler::new(spec)
        .unwrap()
        .check(
            &CallContext::new(),
            CheckRequest {
                rule_ids: ids,
                ..request.to_wire().remove(0)
            },
        )
        .unwrap();
    assert_eq!(response.to_wire(), unchunked);
    assert_eq!(response.len(), 600);
}

#[test]
fn list_rules_drains_pagination_and_resolves_categories() {
    let rules: Vec<RuleSpec> = (0..600)
        .map(|n| rule(&rule_id(n), false).with_category_ids(["STYLE"]))
        .collect();
    let spec = Spec::new(rules).with_categories(vec![CategorySpec::new("STYLE", "Style.")]);
    let transport = RecordingTransport::new(spec);
    let client = Client::new(Arc::clone(&transport), ClientOptions::new());

    let listed = client.list_rules(&CallContext::new()).unwrap();
    assert_eq!(listed.len(), 600);
    assert!(listed.windows(2).all(|pair| pair[0].id() < pair[1].id()));
    assert_eq!(listed[0].categories()[0].id(), "STYLE");
    assert_eq!(transport.count(Method::ListRules), 3);
    assert_eq!(transport.count(Method::ListCategories), 1);
}

#[test]
fn cache_serves_repeat_listings_without_calls() {
    let spec = Spec::new(vec![rule("FIELD_NAME", true).with_category_ids(["STYLE"])])
        .with_categories(vec![CategorySpec::new("STYLE", "Style.")]);
    let transport = RecordingTransport::new(spec);
    let client = Client::new(Arc::clone(&transport), ClientOptions::new().with_cache());
    let ctx = CallContext::new();

    let first = client.list_rules(&ctx).unwrap();
    let second = client.list_rules(&ctx).unwrap();
    let categories = client.list_categories(&ctx).unwrap();

    assert_eq!(first, second);
    assert_eq!(categories.len(), 1);
    assert_eq!(transport.count(Method::ListRules), 1);
    assert_eq!(transport.count(Method::ListCategories), 1);
}

#[test]
fn uncached_client_calls_every_time() {
    let transport = RecordingTransport::new(Spec::new(vec![rule("FIELD_NAME", true)]));
    let client = Client::new(Arc::clone(&transport), ClientOptions::new());
    let ctx = CallContext::new();
    client.list_categories(&ctx).unwrap();
    client.list_categories(&ctx).unwrap();
    assert_eq!(transport.count(Method::ListCategories), 2);
}

#[test]
fn cached_failure_is_sticky() {
    let transport = Arc::new(FailingTransport::default());
    let client = Client::new(Arc::clone(&transport), ClientOptions::new().with_cache());
    let ctx = CallContext::new();

    let first = client.list_categories(&ctx).unwrap_err();
    let second = client.list_categories(&ctx).unwrap_err();

    assert!(matches!(second, CheckError::Shared(_)));
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn retry_option_does_not_cache_failures() {
    let transport = Arc::new(FailingTransport::default());
    let client = Client::new(
        Arc::clone(&transport),
        ClientOptions::new().with_cache().with_retry_failed_listing(),
    );
    let ctx = CallContext::new();
    assert!(client.list_rules(&ctx).is_err());
    assert!(client.list_rules(&ctx).is_err());
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn client_rejects_rules_with_unknown_categories() {
    struct DanglingTransport;

    impl Transport for DanglingTransport {
        fn call(&self, _: &CallContext, method: Method, _: &[u8]) -> Result<Vec<u8>> {
            match method {
                Method::ListRules => wire::encode(&ListRulesResponse {
                    next_page_token: String::new(),
                    rules: vec![WireRule {
                        id: "FIELD_NAME".to_string(),
                        category_ids: vec!["STYLE".to_string()],
                        default: true,
                        purpose: "Checks fields.".to_string(),
                        rule_type: RuleType::Lint,
                        deprecated: false,
                        replacement_ids: Vec::new(),
                    }],
                }),
                _ => Ok(b"{}".to_vec()),
            }
        }
    }

    let client = Client::new(DanglingTransport, ClientOptions::new());
    let err = client.list_rules(&CallContext::new()).unwrap_err();
    assert!(matches!(err, CheckError::DanglingCategoryReference { .. }));
}

#[test]
fn provider_errors_reach_the_caller() {
    let client =
        Client::for_spec(Spec::new(vec![rule("FIELD_NAME", true)]), ClientOptions::new()).unwrap();
    let request = Request::builder(vec![file()])
        .rule_ids(["NOPE_NOPE"])
        .build()
        .unwrap();
    let err = client.check(&CallContext::new(), &request).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[test]
fn cancelled_context_skips_transport() {
    let transport = RecordingTransport::new(Spec::new(vec![rule("FIELD_NAME", true)]));
    let client = Client::new(Arc::clone(&transport), ClientOptions::new());
    let ctx = CallContext::new();
    ctx.cancel();
    let err = client
        .check(&ctx, &Request::new(vec![file()]).unwrap())
        .unwrap_err();
    assert!(matches!(err, CheckError::Cancelled));
    assert_eq!(transport.count(Method::Check), 0);
}

fn delegate(transport: &Arc<RecordingTransport>) -> Arc<dyn CheckClient> {
    Arc::new(Client::new(Arc::clone(transport), ClientOptions::new().with_cache()))
}

#[test]
fn multi_client_rejects_overlapping_rule_ids() {
    let a = RecordingTransport::new(Spec::new(vec![rule("FOO_BAR", true)]));
    let b = RecordingTransport::new(Spec::new(vec![rule("FOO_BAR", true)]));
    let multi = MultiClient::new(vec![delegate(&a), delegate(&b)]);
    let err = multi.list_rules(&CallContext::new()).unwrap_err();
    assert!(matches!(
        err,
        CheckError::DuplicateId {
            kind: IdKind::Rule,
            ..
        }
    ));
    let err = multi
        .check(&CallContext::new(), &Request::new(vec![file()]).unwrap())
        .unwrap_err();
    assert!(matches!(err, CheckError::DuplicateId { .. }));
}

#[test]
fn multi_client_merges_disjoint_listings() {
    let a = RecordingTransport::new(
        Spec::new(vec![rule("TYPE_NAME", true).with_category_ids(["STYLE"])])
            .with_categories(vec![CategorySpec::new("STYLE", "Style.")]),
    );
    let b = RecordingTransport::new(
        Spec::new(vec![rule("ENUM_NAME", true).with_category_ids(["BASIC"])])
            .with_categories(vec![CategorySpec::new("BASIC", "Basics.")]),
    );
    let multi = MultiClient::new(vec![delegate(&a), delegate(&b)]);
    let ctx = CallContext::new();
    let rule_ids: Vec<String> = multi
        .list_rules(&ctx)
        .unwrap()
        .iter()
        .map(|r| r.id().to_string())
        .collect();
    assert_eq!(rule_ids, vec!["ENUM_NAME", "TYPE_NAME"]);
    let category_ids: Vec<String> = multi
        .list_categories(&ctx)
        .unwrap()
        .iter()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(category_ids, vec!["BASIC", "STYLE"]);
}

#[test]
fn multi_client_rejects_overlapping_category_ids() {
    let style = || vec![CategorySpec::new("STYLE", "Style.")];
    let a = RecordingTransport::new(
        Spec::new(vec![rule("TYPE_NAME", true).with_category_ids(["STYLE"])])
            .with_categories(style()),
    );
    let b = RecordingTransport::new(
        Spec::new(vec![rule("ENUM_NAME", true).with_category_ids(["STYLE"])])
            .with_categories(style()),
    );
    let multi = MultiClient::new(vec![delegate(&a), delegate(&b)]);
    assert!(matches!(
        multi.list_categories(&CallContext::new()),
        Err(CheckError::DuplicateId {
            kind: IdKind::Category,
            ..
        })
    ));
}

#[test]
fn multi_client_skips_delegates_without_selected_rules() {
    let a = RecordingTransport::new(Spec::new(vec![rule("XRAY_RULE", true)]));
    let b = RecordingTransport::new(Spec::new(vec![rule("YANKEE_RULE", true)]));
    let multi = MultiClient::new(vec![delegate(&a), delegate(&b)]);
    let request = Request::builder(vec![file()])
        .rule_ids(["XRAY_RULE"])
        .build()
        .unwrap();

    let response = multi.check(&CallContext::new(), &request).unwrap();

    assert_eq!(annotation_rule_ids(&response), vec!["XRAY_RULE"]);
    assert_eq!(a.count(Method::Check), 1);
    assert_eq!(b.count(Method::Check), 0);
}

#[test]
fn multi_client_empty_filter_uses_each_delegates_defaults() {
    let a = RecordingTransport::new(Spec::new(vec![
        rule("XRAY_RULE", true),
        rule("ZULU_RULE", false),
    ]));
    let b = RecordingTransport::new(Spec::new(vec![rule("YANKEE_RULE", false)]));
    let multi = MultiClient::new(vec![delegate(&a), delegate(&b)]);

    let response = multi
        .check(&CallContext::new(), &Request::new(vec![file()]).unwrap())
        .unwrap();

    assert_eq!(annotation_rule_ids(&response), vec!["XRAY_RULE"]);
    assert_eq!(a.check_rule_ids(), vec![vec!["XRAY_RULE".to_string()]]);
    assert_eq!(b.count(Method::Check), 0);
}

#[test]
fn multi_client_merges_and_sorts_annotations() {
    let a = RecordingTransport::new(Spec::new(vec![rule("ZULU_RULE", true)]));
    let b = RecordingTransport::new(Spec::new(vec![rule("ALPHA_RULE", true)]));
    let multi = MultiClient::new(vec![delegate(&a), delegate(&b)]);
    let response = multi
        .check(&CallContext::new(), &Request::new(vec![file()]).unwrap())
        .unwrap();
    assert_eq!(annotation_rule_ids(&response), vec!["ALPHA_RULE", "ZULU_RULE"]);
}

#[test]
fn multi_client_rejects_rule_ids_no_delegate_owns() {
    let a = RecordingTransport::new(Spec::new(vec![rule("XRAY_RULE", true)]));
    let b = RecordingTransport::new(Spec::new(vec![rule("YANKEE_RULE", true)]));
    let multi = MultiClient::new(vec![delegate(&a), delegate(&b)]);
    let request = Request::builder(vec![file()])
        .rule_ids(["XRAY_RULE", "NOPE_NOPE"])
        .build()
        .unwrap();
    let err = multi.check(&CallContext::new(), &request).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(a.count(Method::Check), 0);
}

#[test]
fn multi_client_stops_at_first_delegate_failure() {
    let failing: Arc<dyn CheckClient> = Arc::new(Client::new(
        FailingTransport::default(),
        ClientOptions::new(),
    ));
    let b = RecordingTransport::new(Spec::new(vec![rule("YANKEE_RULE", true)]));
    let multi = MultiClient::new(vec![failing, delegate(&b)]);
    assert!(multi.list_rules(&CallContext::new()).is_err());
    assert_eq!(b.count(Method::ListRules), 0);
}

#[test]
fn multi_client_with_no_delegates_is_empty() {
    let multi = MultiClient::new(Vec::new());
    let ctx = CallContext::new();
    assert!(multi.list_rules(&ctx).unwrap().is_empty());
    assert!(multi.list_categories(&ctx).unwrap().is_empty());
    assert!(
        multi
            .check(&ctx, &Request::new(vec![file()]).unwrap())
            .unwrap()
            .is_empty()
    );
}
