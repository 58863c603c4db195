use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Billing cadence of a paid subscription.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    #[default]
    Monthly,
    Yearly,
}

impl Display for BillingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let interval = match self {
            BillingInterval::Monthly => "monthly",
            BillingInterval::Yearly => "yearly",
        };
        write!(f, "{}", interval)
    }
}

impl BillingInterval {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(BillingInterval::Monthly),
            "yearly" => Some(BillingInterval::Yearly),
            _ => None,
        }
    }
}
