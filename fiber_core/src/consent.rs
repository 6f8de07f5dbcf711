//! Cookie consent record.
//!
//! Stored under the `consent` key. The prompt is shown until a decision is
//! recorded; a decision is never silently changed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::FiberError;
use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentChoice {
    Granted,
    Denied,
}

impl ConsentChoice {
    pub fn is_granted(&self) -> bool {
        matches!(self, ConsentChoice::Granted)
    }
}

impl fmt::Display for ConsentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsentChoice::Granted => write!(f, "granted"),
            ConsentChoice::Denied => write!(f, "denied"),
        }
    }
}

impl FromStr for ConsentChoice {
    type Err = FiberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" | "grant" | "yes" | "on" => Ok(ConsentChoice::Granted),
            "denied" | "deny" | "no" | "off" => Ok(ConsentChoice::Denied),
            other => Err(FiberError::invalid_input(
                "consent",
                other,
                "Expected 'granted' or 'denied'",
            )),
        }
    }
}

/// A recorded consent decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub analytics: ConsentChoice,
    pub ads: ConsentChoice,
    pub timestamp: DateTime<Utc>,
}

impl ConsentRecord {
    pub fn custom(analytics: ConsentChoice, ads: ConsentChoice) -> Self {
        ConsentRecord {
            analytics,
            ads,
            timestamp: Utc::now(),
        }
    }

    pub fn accept_all() -> Self {
        Self::custom(ConsentChoice::Granted, ConsentChoice::Granted)
    }

    pub fn reject_all() -> Self {
        Self::custom(ConsentChoice::Denied, ConsentChoice::Denied)
    }
}

/// Persisted consent state; `None` until the user decides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentState {
    pub record: Option<ConsentRecord>,
}

impl Record for ConsentState {
    const KEY: &'static str = "consent";
    const SCHEMA_VERSION: &'static str = "1.0.0";
}

impl ConsentState {
    pub fn needs_prompt(&self) -> bool {
        needs_prompt(self.record.as_ref())
    }

    pub fn decide(&mut self, record: ConsentRecord) {
        self.record = Some(record);
    }
}

/// The banner is needed only while no decision exists
pub fn needs_prompt(record: Option<&ConsentRecord>) -> bool {
    record.is_none()
}
