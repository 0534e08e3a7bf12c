use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

pub fn run_cli(cwd: &Path, args: &[&str]) -> (i32, String, String) {
    let bin = env!("CARGO_BIN_EXE_cmsxliff");
    let output = Command::new(bin)
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to spawn cmsxliff");
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

pub fn run_cli_with_stdin(cwd: &Path, args: &[&str], input: &str) -> (i32, String, String) {
    let bin = env!("CARGO_BIN_EXE_cmsxliff");
    let mut child = Command::new(bin)
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn cmsxliff");
    child
        .stdin
        .as_mut()
        .expect("stdin not captured")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    let output = child.wait_with_output().expect("failed to wait for cmsxliff");
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

/// A small two-plugin page tree in the MemoryStore JSON format.
pub const TREE_JSON: &str = r#"{
  "default_language": "de",
  "subjects": [
    {
      "kind": "page",
      "id": "1",
      "lineage": "page-1",
      "version": 3,
      "paths": { "de": "/de/startseite", "fr": "/fr/accueil" },
      "placeholders": ["main"],
      "metadata_record": { "kind": "page_content", "id": "90" },
      "field_owners": {},
      "extensions": []
    }
  ],
  "plugins": [
    {
      "id": "10",
      "subject_kind": "page",
      "subject_id": "1",
      "placeholder": "main",
      "language": "fr",
      "parent": null,
      "position": 0,
      "plugin_type": "TextPlugin",
      "label": "Text",
      "fields": [
        { "name": "body", "label": "Body", "kind": "text", "value": "Parent body" }
      ]
    },
    {
      "id": "12",
      "subject_kind": "page",
      "subject_id": "1",
      "placeholder": "main",
      "language": "fr",
      "parent": null,
      "position": 1,
      "plugin_type": "TextPlugin",
      "label": "Text",
      "fields": [
        { "name": "body", "label": "Body", "kind": "text", "value": "Sibling body" }
      ]
    }
  ],
  "records": [
    {
      "kind": "page_content",
      "id": "90",
      "type_name": "PageContent",
      "label": "page content",
      "fields": [
        {
          "name": "title",
          "label": "Title",
          "kind": "char",
          "max_length": 255,
          "values": { "fr": "Seitentitel" }
        }
      ]
    }
  ]
}"#;
