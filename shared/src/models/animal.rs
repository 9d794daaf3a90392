//! Animal models

use serde::{Deserialize, Serialize};

/// Species of a dairy animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Cow,
    Buffalo,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Cow => "cow",
            Species::Buffalo => "buffalo",
        }
    }
}

/// Health status of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Sick,
    Recovering,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Sick => "sick",
            HealthStatus::Recovering => "recovering",
        }
    }
}

/// Lifecycle status of an animal within the herd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimalStatus {
    #[default]
    Active,
    Sold,
    Dead,
}

impl AnimalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Active => "active",
            AnimalStatus::Sold => "sold",
            AnimalStatus::Dead => "dead",
        }
    }

    /// Only active animals can have milk recorded against them
    pub fn can_produce(&self) -> bool {
        matches!(self, AnimalStatus::Active)
    }
}

impl std::str::FromStr for AnimalStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AnimalStatus::Active),
            "sold" => Ok(AnimalStatus::Sold),
            "dead" => Ok(AnimalStatus::Dead),
            _ => Err(()),
        }
    }
}
