use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

// ============================================================================
// Health Check Abstractions
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy(_) => "unhealthy",
        }
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        let details = match &status {
            HealthStatus::Unhealthy(reason) => Some(reason.clone()),
            HealthStatus::Healthy => None,
        };

        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details,
        }
    }
}
