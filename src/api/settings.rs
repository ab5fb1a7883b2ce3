/// Shop settings (`/settings`)
use crate::{
    api::{RestClient, SettingsApi},
    error::AdminResult,
};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The backend returns either a map or a list of rows
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SettingsBody {
    Map(BTreeMap<String, Value>),
    Rows(Vec<SettingRow>),
}

#[derive(Debug, Deserialize)]
struct SettingRow {
    key: String,
    value: Value,
}

impl SettingsBody {
    fn into_map(self) -> BTreeMap<String, String> {
        match self {
            SettingsBody::Map(map) => map
                .into_iter()
                .map(|(key, value)| (key, value_to_string(value)))
                .collect(),
            SettingsBody::Rows(rows) => rows
                .into_iter()
                .map(|row| (row.key, value_to_string(row.value)))
                .collect(),
        }
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub struct SettingsStore {
    client: RestClient,
}

impl SettingsStore {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SettingsApi for SettingsStore {
    async fn get_all(&self) -> AdminResult<BTreeMap<String, String>> {
        let body: SettingsBody = self.client.get("/settings").await?;
        Ok(body.into_map())
    }

    async fn update_many(&self, values: &BTreeMap<String, String>) -> AdminResult<()> {
        self.client.send_unit(Method::PUT, "/settings", Some(values)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_body_with_numbers() {
        let body: SettingsBody =
            serde_json::from_str(r#"{"delivery_price": 5.5, "site_name": "ChezFlora", "note": null}"#).unwrap();
        let map = body.into_map();
        assert_eq!(map["delivery_price"], "5.5");
        assert_eq!(map["site_name"], "ChezFlora");
        assert_eq!(map["note"], "");
    }

    #[test]
    fn test_row_body() {
        let body: SettingsBody = serde_json::from_str(
            r#"[{"key":"currency","value":"EUR"},{"key":"free_shipping_threshold","value":50}]"#,
        )
        .unwrap();
        let map = body.into_map();
        assert_eq!(map["currency"], "EUR");
        assert_eq!(map["free_shipping_threshold"], "50");
    }
}
