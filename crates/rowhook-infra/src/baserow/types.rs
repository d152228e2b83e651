//! Baserow API request/response types.
//!
//! Maps the domain `NewSubscription` to Baserow's webhook create body and
//! reads the listing endpoints used for option lookups.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rowhook_types::subscription::{DeliveryMethod, NewSubscription, ResourceOption};

/// Body of `POST /api/database/webhooks/table/{table_id}/`.
#[derive(Debug, Serialize)]
pub struct CreateWebhookRequest<'a> {
    pub url: &'a str,
    pub include_all_events: bool,
    pub events: Vec<&'static str>,
    pub request_method: DeliveryMethod,
    pub name: &'a str,
    pub use_user_field_names: bool,
}

impl<'a> From<&'a NewSubscription> for CreateWebhookRequest<'a> {
    fn from(request: &'a NewSubscription) -> Self {
        Self {
            url: &request.callback_url,
            include_all_events: false,
            events: request.events.iter().map(|e| e.as_str()).collect(),
            request_method: request.method,
            name: &request.name,
            use_user_field_names: request.use_field_names,
        }
    }
}

/// Body of `POST /api/user/token-auth/`.
#[derive(Serialize)]
pub struct TokenAuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /api/user/token-auth/`.
///
/// Older Baserow versions answer with `token`, newer ones with `access_token`.
#[derive(Debug, Deserialize)]
pub struct TokenAuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl TokenAuthResponse {
    pub fn into_token(self) -> Option<String> {
        self.access_token.or(self.token)
    }
}

/// An application (database, workspace app, ...) or table listing entry.
#[derive(Debug, Deserialize)]
pub struct LoadedResource {
    pub id: Value,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Turn listing entries into options sorted by name.
pub fn to_options(resources: Vec<LoadedResource>) -> Vec<ResourceOption> {
    let mut options: Vec<ResourceOption> = resources
        .into_iter()
        .map(|r| ResourceOption {
            value: match r.id {
                Value::String(s) => s,
                other => other.to_string(),
            },
            name: r.name,
        })
        .collect();
    options.sort_by(|a, b| a.name.cmp(&b.name));
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowhook_types::event::EventKind;

    #[test]
    fn test_create_request_shape() {
        let request = NewSubscription {
            table_id: "345".to_string(),
            callback_url: "https://hooks.example.com/webhooks/orders".to_string(),
            events: [EventKind::RowsUpdated, EventKind::RowsCreated].into(),
            method: DeliveryMethod::Post,
            name: "Orders workflow".to_string(),
            use_field_names: true,
        };

        let body = serde_json::to_value(CreateWebhookRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "url": "https://hooks.example.com/webhooks/orders",
                "include_all_events": false,
                "events": ["rows.created", "rows.updated"],
                "request_method": "POST",
                "name": "Orders workflow",
                "use_user_field_names": true,
            })
        );
    }

    #[test]
    fn test_token_response_prefers_access_token() {
        let resp: TokenAuthResponse =
            serde_json::from_str(r#"{"token": "old", "access_token": "new"}"#).unwrap();
        assert_eq!(resp.into_token().as_deref(), Some("new"));

        let resp: TokenAuthResponse = serde_json::from_str(r#"{"token": "old"}"#).unwrap();
        assert_eq!(resp.into_token().as_deref(), Some("old"));
    }

    #[test]
    fn test_to_options_sorts_and_stringifies_ids() {
        let resources: Vec<LoadedResource> = serde_json::from_value(serde_json::json!([
            {"id": 2, "name": "Sales", "type": "database"},
            {"id": "1", "name": "CRM", "type": "database"},
        ]))
        .unwrap();

        let options = to_options(resources);
        assert_eq!(
            options,
            vec![
                ResourceOption { name: "CRM".to_string(), value: "1".to_string() },
                ResourceOption { name: "Sales".to_string(), value: "2".to_string() },
            ]
        );
    }
}
