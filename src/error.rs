use thiserror::Error;

use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse settings {path}: {source}")]
    SettingsParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize settings {path}: {source}")]
    SettingsSerialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("failed to serialize settings {path}: {source}")]
    SettingsSerializeJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse app catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse app catalog {path}: {source}")]
    CatalogParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render output: {0}")]
    Output(#[source] serde_json::Error),

    #[error("background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    #[error("invalid default mode {value} (expected 0, 1 or 2)")]
    InvalidDefaultMode { value: i64 },

    #[error("policy controller is no longer running")]
    ControllerClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[tokio::test]
    async fn failed_task_keeps_join_error_as_source() {
        let task = tokio::spawn(std::future::pending::<()>());
        task.abort();
        let join_err = task.await.unwrap_err();

        let err = RouteError::from(join_err);

        assert!(matches!(err, RouteError::TaskFailed(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn output_error_keeps_serde_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

        let err = RouteError::Output(source);

        assert!(err.to_string().starts_with("failed to render output"));
        assert!(err.source().is_some());
    }
}
