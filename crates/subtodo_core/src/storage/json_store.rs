use crate::error::AppError;
use crate::model::Task;
use crate::storage::Persistence;
use std::path::{Path, PathBuf};

const STORE_FILE_NAME: &str = "tasks.json";
const STORE_ENV_VAR: &str = "SUBTODO_STORE_PATH";

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("subtodo").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("subtodo")
            .join(STORE_FILE_NAME))
    }
}

/// File-backed persistence: a single JSON array of task records.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFile {
    fn load(&self) -> Result<Vec<Task>, AppError> {
        load_tasks(&self.path)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        save_tasks(&self.path, tasks)
    }
}

pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    // Malformed stored state counts as no data, not a fault.
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let content = serde_json::to_string_pretty(tasks)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{JsonFile, load_tasks, save_tasks};
    use crate::model::Task;
    use crate::storage::Persistence;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("subtodo-{nanos}-{file_name}"))
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                id: "task-1".to_string(),
                text: "parent".to_string(),
                completed: false,
                parent_id: None,
            },
            Task {
                id: "task-2".to_string(),
                text: "child".to_string(),
                completed: true,
                parent_id: Some("task-1".to_string()),
            },
        ]
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = temp_path("round-trip.json");
        let tasks = sample_tasks();

        save_tasks(&path, &tasks).unwrap();
        let loaded = load_tasks(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, tasks);
    }

    #[test]
    fn save_after_load_reproduces_stored_fields() {
        let path = temp_path("idempotent.json");
        save_tasks(&path, &sample_tasks()).unwrap();

        let first = fs::read_to_string(&path).unwrap();
        let loaded = load_tasks(&path).unwrap();
        save_tasks(&path, &loaded).unwrap();
        let second = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let path = temp_path("missing.json");
        let loaded = load_tasks(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn malformed_content_loads_as_empty() {
        let path = temp_path("malformed.json");
        fs::write(&path, "{ not json ").unwrap();

        let loaded = load_tasks(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(loaded.is_empty());
    }

    #[test]
    fn accepts_records_without_parent_id() {
        let path = temp_path("no-parent.json");
        let content = "[\n  {\n    \"id\": \"task-1\",\n    \"text\": \"demo\",\n    \"completed\": false\n  }\n]";
        fs::write(&path, content).unwrap();

        let loaded = load_tasks(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].parent_id, None);
    }

    #[test]
    fn stored_records_use_camel_case_parent_id() {
        let path = temp_path("camel-case.json");
        save_tasks(&path, &sample_tasks()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(content.contains("\"parentId\": \"task-1\""));
        assert!(!content.contains("parent_id"));
    }

    #[test]
    fn json_file_implements_persistence() {
        let path = temp_path("adapter.json");
        let store = JsonFile::new(&path);
        let tasks = sample_tasks();

        store.save(&tasks).unwrap();
        let loaded = store.load().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, tasks);
    }
}
