/// Shop and shipping settings
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DELIVERY_PRICE: &str = "delivery_price";
pub const FREE_SHIPPING_THRESHOLD: &str = "free_shipping_threshold";
pub const EXPRESS_DELIVERY_FEE: &str = "express_delivery_fee";
pub const SITE_NAME: &str = "site_name";
pub const ADMIN_EMAIL: &str = "admin_email";
pub const CURRENCY: &str = "currency";

const DEFAULTS: [(&str, &str); 6] = [
    (DELIVERY_PRICE, "5"),
    (FREE_SHIPPING_THRESHOLD, "50"),
    (EXPRESS_DELIVERY_FEE, "10"),
    (SITE_NAME, "ChezFlora"),
    (ADMIN_EMAIL, "admin@chezflora.com"),
    (CURRENCY, "EUR"),
];

/// Key/value settings, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, String>);

impl Settings {
    /// The values a fresh shop starts with
    pub fn defaults() -> Self {
        Self(
            DEFAULTS
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }

    /// Replace values with the server's and keep keys only the server knows
    pub fn overlay(&mut self, server: BTreeMap<String, String>) {
        self.0.extend(server);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a value, returning whether it changed
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let value = value.into();
        match self.0.insert(key.into(), value.clone()) {
            Some(previous) => previous != value,
            None => true,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for Settings {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_seeded() {
        let settings = Settings::defaults();
        assert_eq!(settings.len(), 6);
        assert_eq!(settings.get(SITE_NAME), Some("ChezFlora"));
        assert_eq!(settings.get(CURRENCY), Some("EUR"));
    }

    #[test]
    fn test_overlay_prefers_server_values() {
        let mut settings = Settings::defaults();
        let mut server = BTreeMap::new();
        server.insert(DELIVERY_PRICE.to_string(), "7.5".to_string());
        server.insert("maintenance_mode".to_string(), "off".to_string());
        settings.overlay(server);

        assert_eq!(settings.get(DELIVERY_PRICE), Some("7.5"));
        assert_eq!(settings.get(FREE_SHIPPING_THRESHOLD), Some("50"));
        assert_eq!(settings.get("maintenance_mode"), Some("off"));
        assert_eq!(settings.len(), 7);
    }

    #[test]
    fn test_set_reports_change() {
        let mut settings = Settings::defaults();
        assert!(!settings.set(CURRENCY, "EUR"));
        assert!(settings.set(CURRENCY, "XOF"));
        assert!(settings.set("new_key", "1"));
    }
}
