//! Change history and change details
//!
//! Lists the change events recorded for a resource over a time interval and
//! resolves each event to its full detail payload. The detail service echoes
//! the change id double-encoded, so the resolver overwrites it with the
//! single-decoded form of the id it was queried with.

use super::client::ArgClient;
use crate::config::{ArgApi, TimeWindow};
use anyhow::{Context, Result};
use serde_json::{json, Value};

/// One change event as reported by the change-list endpoint.
/// The id is an opaque JSON-encoded string, kept verbatim.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub change_id: String,
}

/// List the change events for `resource_id` within `window`
pub async fn list_changes(
    client: &ArgClient,
    api: &ArgApi,
    token: &str,
    resource_id: &str,
    window: &TimeWindow,
) -> Result<Vec<ChangeEvent>> {
    let body = json!({
        "resourceId": resource_id,
        "interval": {
            "start": window.start,
            "end": window.end,
        }
    });
    let params = [("api-version", api.changes_api_version.as_str())];

    let response = client.post(&api.changes, &params, token, &body).await?;

    response
        .get("changes")
        .and_then(|v| v.as_array())
        .context("Change list response is missing 'changes'")?
        .iter()
        .map(|change| {
            let change_id = change
                .get("changeId")
                .and_then(|v| v.as_str())
                .context("Change entry is missing 'changeId'")?;
            Ok(ChangeEvent {
                change_id: change_id.to_string(),
            })
        })
        .collect()
}

/// Fetch the full detail payload for one change.
///
/// The returned record's `changeId` field holds the decoded form of
/// `change_id`, not the double-encoded value echoed by the service.
pub async fn get_change_details(
    client: &ArgClient,
    api: &ArgApi,
    token: &str,
    resource_id: &str,
    change_id: &str,
) -> Result<Value> {
    let body = json!({
        "resourceId": resource_id,
        "changeId": change_id,
    });
    let params = [("api-version", api.changes_api_version.as_str())];

    let mut details = client
        .post(&api.change_details, &params, token, &body)
        .await?;

    details
        .as_object_mut()
        .context("Change detail response is not a JSON object")?
        .insert("changeId".to_string(), decode_change_id(change_id)?);

    Ok(details)
}

/// Decode an opaque change id exactly once.
///
/// The list endpoint hands out ids as JSON-encoded strings and the detail
/// endpoint re-encodes them on output; one decode of the originating id
/// yields the well-formed identifier downstream consumers expect.
pub fn decode_change_id(change_id: &str) -> Result<Value> {
    serde_json::from_str(change_id)
        .with_context(|| format!("Failed to decode change id '{}'", change_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_change_id_unwraps_one_layer() {
        // The list endpoint sends the id as a JSON-encoded string
        let wire = "\"/subscriptions/s1/vm-1_1577836800000\"";
        let decoded = decode_change_id(wire).unwrap();
        assert_eq!(decoded, json!("/subscriptions/s1/vm-1_1577836800000"));
    }

    #[test]
    fn test_decode_change_id_structured_payload() {
        let wire = r#"{"resourceId": "/subscriptions/s1/vm-1", "timestamp": "2024-01-01T00:00:00"}"#;
        let decoded = decode_change_id(wire).unwrap();
        assert_eq!(decoded["resourceId"], "/subscriptions/s1/vm-1");
    }

    #[test]
    fn test_decode_change_id_rejects_garbage() {
        assert!(decode_change_id("not json at all").is_err());
    }
}
