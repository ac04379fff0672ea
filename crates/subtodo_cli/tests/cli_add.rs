use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("subtodo-{nanos}-{file_name}"))
}

#[test]
fn add_command_succeeds() {
    let exe = env!("CARGO_BIN_EXE_subtodo");
    let store_path = temp_path("cli-add.json");
    let output = Command::new(exe)
        .args(["add", "demo task"])
        .env("SUBTODO_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    let content = std::fs::read_to_string(&store_path).expect("store written");
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task:"));

    let stored: serde_json::Value = serde_json::from_str(&content).unwrap();
    let records = stored.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["text"], "demo task");
    assert_eq!(records[0]["completed"], false);
    assert!(records[0]["parentId"].is_null());
}

#[test]
fn add_command_rejects_missing_text() {
    let exe = env!("CARGO_BIN_EXE_subtodo");
    let store_path = temp_path("cli-add-missing.json");
    let output = Command::new(exe)
        .args(["add"])
        .env("SUBTODO_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn add_command_writes_subtask_parent_id() {
    let exe = env!("CARGO_BIN_EXE_subtodo");
    let store_path = temp_path("cli-add-subtask.json");
    let seeded = serde_json::json!([
        {
            "id": "task-1",
            "text": "parent",
            "completed": false,
            "parentId": null
        }
    ]);
    std::fs::write(&store_path, serde_json::to_string_pretty(&seeded).unwrap()).unwrap();

    let output = Command::new(exe)
        .args(["add", "child", "--parent", "task-1"])
        .env("SUBTODO_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    let content = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added subtask:"));

    let stored: serde_json::Value = serde_json::from_str(&content).unwrap();
    let records = stored.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["text"], "child");
    assert_eq!(records[1]["parentId"], "task-1");
}

#[test]
fn add_command_rejects_unknown_parent() {
    let exe = env!("CARGO_BIN_EXE_subtodo");
    let store_path = temp_path("cli-add-bad-parent.json");
    let output = Command::new(exe)
        .args(["add", "child", "--parent", "task-9"])
        .env("SUBTODO_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parent task not found"));
}

#[test]
fn add_command_rejects_subtask_parent() {
    let exe = env!("CARGO_BIN_EXE_subtodo");
    let store_path = temp_path("cli-add-nested.json");
    let seeded = serde_json::json!([
        {
            "id": "task-1",
            "text": "parent",
            "completed": false,
            "parentId": null
        },
        {
            "id": "task-2",
            "text": "child",
            "completed": false,
            "parentId": "task-1"
        }
    ]);
    std::fs::write(&store_path, serde_json::to_string_pretty(&seeded).unwrap()).unwrap();

    let output = Command::new(exe)
        .args(["add", "grandchild", "--parent", "task-2"])
        .env("SUBTODO_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("subtasks cannot have subtasks"));
}
