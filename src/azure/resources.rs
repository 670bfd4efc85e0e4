//! Resource enumeration
//!
//! Queries the Resource Graph for every resource of a given type in a
//! subscription, following the `$skipToken` cursor until all pages have been
//! collected.

use super::client::ArgClient;
use crate::config::ArgApi;
use anyhow::{Context, Result};
use serde_json::{json, Value};

/// Minimal identity of a discovered resource
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub id: String,
}

/// List all resources of `resource_type` in `subscription`, de-paginated.
///
/// Each page's tabular rows are appended as they arrive; the loop ends when a
/// response carries no continuation cursor.
pub async fn list_resources(
    client: &ArgClient,
    api: &ArgApi,
    token: &str,
    resource_type: &str,
    subscription: &str,
) -> Result<Vec<ResourceRecord>> {
    let query = format!("where type =~ '{}' | project id", resource_type);
    let params = [("api-version", api.resources_api_version.as_str())];

    let mut records = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let mut body = json!({
            "subscriptions": [subscription],
            "query": query,
        });
        if let Some(token_value) = &cursor {
            body["options"] = json!({ "$skipToken": token_value });
        }

        let response = client.post(&api.resources, &params, token, &body).await?;

        let data = response
            .get("data")
            .context("Resource query response is missing 'data'")?;
        let page = parse_rows(data)?;
        tracing::info!("Retrieved {} resource records", page.len());
        records.extend(page);

        cursor = skip_token(&response);
        if cursor.is_none() {
            break;
        }
        tracing::info!("Following resource query continuation cursor...");
    }

    Ok(records)
}

/// Extract the continuation cursor from a query response.
/// The service has used both spellings of the key.
fn skip_token(response: &Value) -> Option<String> {
    response
        .get("$skipToken")
        .or_else(|| response.get("skipToken"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Convert one page of the tabular (columns/rows) response into records,
/// keyed by column name.
pub fn parse_rows(data: &Value) -> Result<Vec<ResourceRecord>> {
    let columns = data
        .get("columns")
        .and_then(|v| v.as_array())
        .context("Resource query data is missing 'columns'")?;
    let rows = data
        .get("rows")
        .and_then(|v| v.as_array())
        .context("Resource query data is missing 'rows'")?;

    let id_index = columns
        .iter()
        .position(|c| c.get("name").and_then(|n| n.as_str()) == Some("id"))
        .context("Resource query data has no 'id' column")?;

    rows.iter()
        .map(|row| {
            let id = row
                .get(id_index)
                .and_then(|v| v.as_str())
                .context("Resource row is missing its id cell")?;
            Ok(ResourceRecord { id: id.to_string() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_by_column_name() {
        let data = json!({
            "columns": [
                {"name": "name", "type": "string"},
                {"name": "id", "type": "string"}
            ],
            "rows": [
                ["vm-1", "/subscriptions/s1/vm-1"],
                ["vm-2", "/subscriptions/s1/vm-2"]
            ]
        });

        let records = parse_rows(&data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "/subscriptions/s1/vm-1");
        assert_eq!(records[1].id, "/subscriptions/s1/vm-2");
    }

    #[test]
    fn test_parse_rows_requires_id_column() {
        let data = json!({
            "columns": [{"name": "name", "type": "string"}],
            "rows": [["vm-1"]]
        });
        assert!(parse_rows(&data).is_err());
    }

    #[test]
    fn test_parse_rows_rejects_malformed_data() {
        assert!(parse_rows(&json!({"rows": []})).is_err());
        assert!(parse_rows(&json!({"columns": []})).is_err());
    }

    #[test]
    fn test_skip_token_both_spellings() {
        assert_eq!(
            skip_token(&json!({"$skipToken": "a"})),
            Some("a".to_string())
        );
        assert_eq!(skip_token(&json!({"skipToken": "b"})), Some("b".to_string()));
        assert_eq!(skip_token(&json!({"data": {}})), None);
    }
}
