use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use mmi_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run(config_path: Option<PathBuf>) -> CommandResult {
    let options = LoadOptions {
        require_file: config_path.is_some(),
        config_path: config_path.clone(),
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("config", "config", error.to_string(), 2),
    };

    let file_path = resolve_config_path(config_path.as_deref());
    let file_doc = load_config_file_doc(file_path.as_deref());
    CommandResult { exit_code: 0, output: render(&config, file_path.as_deref(), file_doc.as_ref()) }
}

fn render(config: &AppConfig, file_path: Option<&Path>, file_doc: Option<&Value>) -> String {
    let timeout = config.store.timeout_secs.map(|secs| secs.to_string());
    let wkhtmltopdf =
        config.documents.wkhtmltopdf_path.as_ref().map(|path| path.display().to_string());
    let entries: [(&str, &[&str], String); 7] = [
        ("store.base_url", &["MMI_STORE_BASE_URL"], config.store.base_url.clone()),
        (
            "store.timeout_secs",
            &["MMI_STORE_TIMEOUT_SECS"],
            timeout.unwrap_or_else(|| "<unset>".to_string()),
        ),
        (
            "documents.output_dir",
            &["MMI_DOCUMENTS_OUTPUT_DIR"],
            config.documents.output_dir.display().to_string(),
        ),
        (
            "documents.wkhtmltopdf_path",
            &["MMI_DOCUMENTS_WKHTMLTOPDF_PATH"],
            wkhtmltopdf.unwrap_or_else(|| "<discovered on PATH>".to_string()),
        ),
        (
            "logging.level",
            &["MMI_LOGGING_LEVEL", "MMI_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        (
            "logging.format",
            &["MMI_LOGGING_FORMAT", "MMI_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
        (
            "logging.directory",
            &["MMI_LOGGING_DIRECTORY"],
            config.logging.directory.display().to_string(),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, env_keys, value) in entries {
        lines.push(render_line(key, &value, field_source(key, env_keys, file_doc, file_path)));
    }
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use mmi_core::config::AppConfig;
    use serde_json::Value as Json;
    use tempfile::TempDir;
    use toml::Value;

    use super::{contains_path, render, run};

    #[test]
    fn nested_keys_are_found_in_file_documents() {
        let doc: Value = "[store]\nbase_url = \"http://store:5000\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "store.base_url"));
        assert!(!contains_path(&doc, "store.timeout_secs"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn file_keys_are_attributed_to_the_file() {
        let doc: Value = "[documents]\noutput_dir = \"/srv/mmi\"\n".parse().expect("toml");

        let output = render(&AppConfig::default(), Some(Path::new("mmi.toml")), Some(&doc));

        assert!(output.contains("- documents.output_dir = . (source: file (mmi.toml))"));
        assert!(output.contains("- store.timeout_secs = <unset> (source: default)"));
        assert!(output.contains("- logging.directory = logs (source: default)"));
    }

    #[test]
    fn missing_config_file_fails_with_usage_exit_code() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("absent.toml");

        let result = run(Some(path.clone()));

        assert_eq!(result.exit_code, 2);
        let payload: Json = serde_json::from_str(&result.output).expect("json output");
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config");
        assert!(payload["message"]
            .as_str()
            .is_some_and(|message| message.contains(&path.display().to_string())));
    }
}
