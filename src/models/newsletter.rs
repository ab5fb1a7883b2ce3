/// Newsletter subscribers
use super::{Entity, HasStatus};
use crate::error::AdminError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Unsubscribed => "unsubscribed",
        }
    }

    /// The status the dashboard's toggle switches to
    pub fn toggled(&self) -> Self {
        match self {
            SubscriptionStatus::Active => SubscriptionStatus::Unsubscribed,
            SubscriptionStatus::Unsubscribed => SubscriptionStatus::Active,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "unsubscribed" => Ok(SubscriptionStatus::Unsubscribed),
            _ => Err(AdminError::Validation(format!("Invalid subscription status: {}", s))),
        }
    }
}

/// Newsletter subscriber record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Subscriber {
    type Id = i64;

    fn id(&self) -> &i64 {
        &self.id
    }
}

impl HasStatus<SubscriptionStatus> for Subscriber {
    fn status(&self) -> SubscriptionStatus {
        self.status
    }

    fn set_status(&mut self, status: SubscriptionStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_toggle() {
        assert_eq!("active".parse::<SubscriptionStatus>().unwrap(), SubscriptionStatus::Active);
        assert_eq!(
            "Unsubscribed".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Unsubscribed
        );
        assert!("blocked".parse::<SubscriptionStatus>().is_err());

        assert_eq!(SubscriptionStatus::Active.toggled(), SubscriptionStatus::Unsubscribed);
        assert_eq!(SubscriptionStatus::Unsubscribed.toggled(), SubscriptionStatus::Active);
    }
}
