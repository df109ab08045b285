//! Append-only request-log sink
//!
//! Writes one JSON line per request. Independent of the durable store: a
//! failure here is the pipeline's to swallow, never the caller's.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::domain::audit::{AuditLogSink, AuditRecord};
use crate::domain::DomainError;

/// JSON-lines file sink
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    /// Creates the sink, ensuring the parent directory exists
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    DomainError::internal(format!(
                        "Failed to create log directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(Self { path })
    }
}

#[async_trait]
impl AuditLogSink for FileAuditSink {
    async fn append(
        &self,
        record: &AuditRecord,
        request_body: Option<&serde_json::Value>,
    ) -> Result<(), DomainError> {
        let entry = json!({
            "timestamp": record.timestamp.to_rfc3339(),
            "ip": record.ip_address,
            "user": record.user_name.as_deref().unwrap_or("anonymous"),
            "method": record.method,
            "endpoint": record.endpoint,
            "status": record.status_code,
            "response_time": format!("{:.3}s", record.response_time),
            "query_params": record.query_params,
            "request_data": request_body,
        });

        let mut line = entry.to_string();
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                DomainError::internal(format!(
                    "Failed to open request log {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::internal(format!("Failed to append request log: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> AuditRecord {
        AuditRecord::new(
            Utc::now(),
            "10.0.0.1".to_string(),
            Some("demo_key_123"),
            Some("Demo User".to_string()),
            "POST".to_string(),
            "/records".to_string(),
            Some(json!({"page": "1"})),
            201,
            0.0421,
            Some("curl/8.0"),
            None,
        )
    }

    #[tokio::test]
    async fn test_append_writes_json_lines() {
        let dir = std::env::temp_dir().join(format!("credgate-sink-{}", uuid::Uuid::new_v4()));
        let path = dir.join("requests.log");

        let sink = FileAuditSink::new(&path).await.unwrap();
        sink.append(&record(), Some(&json!({"domain": "example.com"})))
            .await
            .unwrap();
        sink.append(&record(), None).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["user"], "Demo User");
        assert_eq!(first["status"], 201);
        assert_eq!(first["response_time"], "0.042s");
        assert_eq!(first["request_data"]["domain"], "example.com");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_anonymous_user_when_unresolved() {
        let dir = std::env::temp_dir().join(format!("credgate-sink-{}", uuid::Uuid::new_v4()));
        let path = dir.join("requests.log");

        let sink = FileAuditSink::new(&path).await.unwrap();
        let mut rec = record();
        rec.user_name = None;
        sink.append(&rec, None).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let entry: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(entry["user"], "anonymous");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
