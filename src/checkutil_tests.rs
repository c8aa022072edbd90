use parking_lot::Mutex;

use super::*;
use crate::descriptor::{FieldDescriptor, FileDescriptor, MessageDescriptor};
use crate::error::CheckError;
use crate::writer::ResponseCollector;

fn schema() -> FileDescriptor {
    FileDescriptor::new("acme/v1/user.proto")
        .with_package("acme.v1")
        .with_message(
            MessageDescriptor::new("User")
                .with_field(FieldDescriptor::scalar("name", 1))
                .with_nested_message(
                    MessageDescriptor::new("Address")
                        .with_field(FieldDescriptor::scalar("street", 1))
                        .with_nested_message(
                            MessageDescriptor::new("Geo")
                                .with_field(FieldDescriptor::scalar("lat", 1)),
                        ),
                )
                .with_nested_message(MessageDescriptor::new("Phone")),
        )
        .with_message(
            MessageDescriptor::new("Group").with_field(FieldDescriptor::scalar("title", 1)),
        )
}

fn request() -> Request {
    Request::new(vec![
        File::new(schema(), false),
        File::new(
            FileDescriptor::new("google/protobuf/timestamp.proto")
                .with_message(MessageDescriptor::new("Timestamp")),
            true,
        ),
    ])
    .unwrap()
}

fn run(handler: &impl RuleHandler, request: &Request) -> Result<()> {
    let collector = ResponseCollector::new(request).unwrap();
    handler.handle(&CallContext::new(), &collector.writer("TEST_RULE"), request)
}

#[test]
fn files_skip_imports() {
    let seen = Mutex::new(Vec::new());
    let handler = for_each_file(|_: &CallContext, _: &ResponseWriter, _: &Request, file: &File| {
        seen.lock().push(file.name().to_string());
        Ok(())
    });
    run(&handler, &request()).unwrap();
    assert_eq!(*seen.lock(), vec!["acme/v1/user.proto"]);
}

#[test]
fn messages_visit_parent_before_nested() {
    let seen = Mutex::new(Vec::new());
    let handler = for_each_message(
        |_: &CallContext, _: &ResponseWriter, _: &Request, message: &MessageRef<'_>| {
            seen.lock().push(message.full_name().to_string());
            Ok(())
        },
    );
    run(&handler, &request()).unwrap();
    assert_eq!(
        *seen.lock(),
        vec![
            "acme.v1.User",
            "acme.v1.User.Address",
            "acme.v1.User.Address.Geo",
            "acme.v1.User.Phone",
            "acme.v1.Group",
        ]
    );
}

#[test]
fn fields_follow_message_order() {
    let seen = Mutex::new(Vec::new());
    let handler = for_each_field(
        |_: &CallContext, _: &ResponseWriter, _: &Request, field: &FieldRef<'_>| {
            seen.lock().push(field.full_name().to_string());
            Ok(())
        },
    );
    run(&handler, &request()).unwrap();
    assert_eq!(
        *seen.lock(),
        vec![
            "acme.v1.User.name",
            "acme.v1.User.Address.street",
            "acme.v1.User.Address.Geo.lat",
            "acme.v1.Group.title",
        ]
    );
}

#[test]
fn first_error_stops_the_walk() {
    let seen = Mutex::new(0_usize);
    let handler = for_each_message(
        |_: &CallContext, _: &ResponseWriter, _: &Request, message: &MessageRef<'_>| {
            *seen.lock() += 1;
            if message.name() == "Address" {
                return Err(CheckError::handler("bad address"));
            }
            Ok(())
        },
    );
    let err = run(&handler, &request()).unwrap_err();
    assert!(err.to_string().contains("bad address"));
    assert_eq!(*seen.lock(), 2);
}

#[test]
fn cancelled_context_stops_before_first_file() {
    let ctx = CallContext::new();
    ctx.cancel();
    let request = request();
    let collector = ResponseCollector::new(&request).unwrap();
    let handler = for_each_file(|_: &CallContext, _: &ResponseWriter, _: &Request, _: &File| {
        panic!("should not be called")
    });
    let err = handler
        .handle(&ctx, &collector.writer("TEST_RULE"), &request)
        .unwrap_err();
    assert!(matches!(err, CheckError::Cancelled));
}
