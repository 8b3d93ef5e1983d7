//! Embedded SurrealDB client.
//!
//! Thin wrapper around `surrealdb::Surreal<Db>` supporting two engines: the
//! in-memory store for tests and fast demos, and RocksDB for persistence.
//! Arc-wrapped internally so cloning is cheap and never opens a second
//! connection (RocksDB holds a file lock per process).

use graphloom_core::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

/// Connection settings. An empty or `:memory:` path selects the in-memory
/// engine; anything else is a RocksDB directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurrealConfig {
    pub namespace: String,
    pub database: String,
    pub path: String,
}

impl Default for SurrealConfig {
    fn default() -> Self {
        Self {
            namespace: "graphloom".to_string(),
            database: "main".to_string(),
            path: ":memory:".to_string(),
        }
    }
}

impl SurrealConfig {
    pub fn is_memory(&self) -> bool {
        self.path.is_empty() || self.path == ":memory:"
    }
}

#[derive(Clone)]
pub struct SurrealClient {
    inner: Arc<SurrealClientInner>,
}

struct SurrealClientInner {
    db: Surreal<Db>,
    config: SurrealConfig,
}

impl std::fmt::Debug for SurrealClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealClient")
            .field("config", &self.inner.config)
            .finish()
    }
}

impl SurrealClient {
    pub async fn connect(config: SurrealConfig) -> StoreResult<Self> {
        let db = if config.is_memory() {
            Surreal::new::<Mem>(()).await.map_err(|e| {
                StoreError::connection(format!("failed to create in-memory database: {}", e))
            })?
        } else {
            Surreal::new::<RocksDb>(&config.path).await.map_err(|e| {
                StoreError::connection(format!(
                    "failed to open database at {}: {}",
                    config.path, e
                ))
            })?
        };

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StoreError::connection(format!(
                    "failed to use namespace '{}' database '{}': {}",
                    config.namespace, config.database, e
                ))
            })?;

        Ok(Self {
            inner: Arc::new(SurrealClientInner { db, config }),
        })
    }

    /// In-memory client, the default for tests.
    pub async fn memory() -> StoreResult<Self> {
        Self::connect(SurrealConfig::default()).await
    }

    /// RocksDB-backed client persisting under `path`.
    pub async fn file(path: &str) -> StoreResult<Self> {
        Self::connect(SurrealConfig {
            path: path.to_string(),
            ..SurrealConfig::default()
        })
        .await
    }

    pub fn config(&self) -> &SurrealConfig {
        &self.inner.config
    }

    /// Execute a SurrealQL query and return the first result set as plain
    /// JSON objects.
    ///
    /// Parameters are passed as JSON objects; each key/value pair becomes a
    /// query binding.
    pub async fn query(&self, sql: &str, params: &[Value]) -> StoreResult<Vec<Value>> {
        let mut query = self.inner.db.query(sql);
        for param in params {
            if let Value::Object(map) = param {
                for (key, value) in map {
                    query = query.bind((key.clone(), value.clone()));
                }
            }
        }

        let response = query
            .await
            .map_err(|e| StoreError::query(format!("query execution failed: {}", e)))?;

        let mut response = response
            .check()
            .map_err(|e| StoreError::query(format!("query returned error: {}", e)))?;

        let surreal_value: surrealdb::Value = response
            .take(0)
            .map_err(|e| StoreError::query(format!("failed to extract query results: {}", e)))?;

        // Round-trip through JSON text; this resolves every SDK enum variant
        // without depending on surrealdb's internal value types.
        let json_text = serde_json::to_string(&surreal_value)
            .map_err(|e| StoreError::query(format!("failed to serialize result: {}", e)))?;
        let json_value: Value = serde_json::from_str(&json_text)
            .map_err(|e| StoreError::query(format!("failed to parse result: {}", e)))?;

        let rows = match unwrap_surreal_value(json_value) {
            Value::Array(rows) => rows,
            Value::Null => vec![],
            other => vec![other],
        };
        Ok(rows)
    }
}

/// Unwrap the SDK's typed JSON representation into plain JSON:
/// `{"Number": {"Int": 30}}` becomes `30`, `{"Strand": "x"}` becomes `"x"`,
/// `{"Thing": {"tb": "record", "id": ...}}` becomes `"record:id"`.
pub(crate) fn unwrap_surreal_value(value: Value) -> Value {
    let Value::Object(mut obj) = value else {
        return value;
    };

    if let Some(inner) = obj.remove("Number") {
        return match inner {
            Value::Object(mut num) => num
                .remove("Int")
                .or_else(|| num.remove("Float"))
                .unwrap_or(Value::Object(num)),
            other => other,
        };
    }
    if let Some(Value::String(s)) = obj.remove("Strand") {
        return Value::String(s);
    }
    if let Some(Value::String(s)) = obj.remove("String") {
        return Value::String(s);
    }
    if let Some(Value::Bool(b)) = obj.remove("Bool") {
        return Value::Bool(b);
    }
    if let Some(Value::String(dt)) = obj.remove("Datetime") {
        return Value::String(dt);
    }
    if let Some(thing) = obj.remove("Thing") {
        if let Value::Object(mut thing_obj) = thing {
            let table = thing_obj
                .remove("tb")
                .and_then(|v| v.as_str().map(String::from));
            let id = thing_obj.remove("id").map(unwrap_surreal_value);
            if let (Some(table), Some(id)) = (table, id) {
                let id_text = match id {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    other => other.to_string(),
                };
                return Value::String(format!("{}:{}", table, id_text));
            }
        }
        return Value::Null;
    }
    if let Some(arr) = obj.remove("Array") {
        if let Value::Array(items) = arr {
            return Value::Array(items.into_iter().map(unwrap_surreal_value).collect());
        }
        return arr;
    }
    if let Some(inner) = obj.remove("Object") {
        return unwrap_surreal_value(inner);
    }
    if obj.contains_key("None") || obj.contains_key("Null") {
        return Value::Null;
    }

    Value::Object(
        obj.into_iter()
            .map(|(k, v)| (k, unwrap_surreal_value(v)))
            .collect(),
    )
}

/// Escape a record id for use inside angle-bracket syntax (`table:⟨id⟩`).
/// Angle brackets tolerate colons and slashes; only quotes need escaping.
pub(crate) fn escape_record_id(value: &str) -> String {
    value.replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_client_round_trips_a_record() {
        let client = SurrealClient::memory().await.unwrap();
        client
            .query("CREATE person:⟨row_0⟩ SET name = 'Ada', age = 36", &[])
            .await
            .unwrap();

        let rows = client.query("SELECT * FROM person", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Ada"));
        assert_eq!(rows[0]["age"], json!(36));
        assert_eq!(rows[0]["id"], json!("person:row_0"));
    }

    #[tokio::test]
    async fn relate_and_traverse() {
        let client = SurrealClient::memory().await.unwrap();
        client.query("CREATE a:⟨1⟩, a:⟨2⟩", &[]).await.unwrap();
        client
            .query("RELATE a:⟨1⟩->knows->a:⟨2⟩", &[])
            .await
            .unwrap();

        let rows = client
            .query("SELECT in, out FROM knows", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["in"], json!("a:1"));
        assert_eq!(rows[0]["out"], json!("a:2"));
    }

    #[test]
    fn unwrap_handles_nested_wrappers() {
        let wrapped = json!({
            "Object": {
                "n": {"Number": {"Int": 7}},
                "s": {"Strand": "hello"},
                "xs": {"Array": [{"Number": {"Float": 1.5}}]}
            }
        });
        assert_eq!(
            unwrap_surreal_value(wrapped),
            json!({"n": 7, "s": "hello", "xs": [1.5]})
        );
    }

    #[test]
    fn escape_only_touches_quotes() {
        assert_eq!(escape_record_id("row_3"), "row_3");
        assert_eq!(escape_record_id("it's"), "it\\'s");
    }
}
