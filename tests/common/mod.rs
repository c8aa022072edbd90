#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rulecheck::descriptor::{FieldDescriptor, FileDescriptor, MessageDescriptor};
use rulecheck::{File, Request, wire};
use tempfile::TempDir;

/// Creates an `assert_cmd` Command for the rulecheck-plugin binary.
#[macro_export]
macro_rules! rulecheck_plugin {
    () => {
        assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("rulecheck-plugin"))
    };
}

/// Temporary directory holding config files for integration tests.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a file with the given content and returns its path.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn create_config(&self, content: &str) -> PathBuf {
        self.create_file("rulecheck.toml", content)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

pub const STYLE_CONFIG: &str = r#"
version = "1"
use = ["STYLE"]

[options]
timestamp_suffix = "_at"
"#;

/// A non-import file with a camelCase field and two timestamp fields.
pub fn event_file() -> File {
    File::new(
        FileDescriptor::new("acme/v1/event.proto")
            .with_package("acme.v1")
            .with_syntax("proto3")
            .with_message(
                MessageDescriptor::new("Event")
                    .with_field(FieldDescriptor::scalar("eventName", 1))
                    .with_field(FieldDescriptor::message(
                        "create_time",
                        2,
                        "google.protobuf.Timestamp",
                    ))
                    .with_field(FieldDescriptor::message(
                        "updated_at",
                        3,
                        "google.protobuf.Timestamp",
                    )),
            ),
        false,
    )
}

/// Encoded Check request for [`event_file`] selecting `rule_ids`.
pub fn check_request_json(rule_ids: &[&str]) -> Vec<u8> {
    let request = Request::builder(vec![event_file()])
        .rule_ids(rule_ids.iter().copied())
        .build()
        .expect("valid request");
    let messages = request.to_wire();
    wire::encode(&messages[0]).expect("encodable request")
}
