//! API Routes

pub mod classify;
pub mod queue;
pub mod sessions;

use serde::Serialize;
use severity_classifier::{Idiom, SeverityTier};

/// Idiom badge as sent to the UI
#[derive(Debug, Serialize)]
pub struct IdiomBadge {
    pub id: Idiom,
    pub label: &'static str,
}

impl From<Idiom> for IdiomBadge {
    fn from(idiom: Idiom) -> Self {
        Self {
            id: idiom,
            label: idiom.label(),
        }
    }
}

pub fn badges(idioms: &[Idiom]) -> Vec<IdiomBadge> {
    idioms.iter().copied().map(IdiomBadge::from).collect()
}

/// Severity with its meter rendering data
#[derive(Debug, Serialize)]
pub struct SeverityView {
    pub tier: SeverityTier,
    pub label: &'static str,
    pub meter_percent: u8,
}

impl From<SeverityTier> for SeverityView {
    fn from(tier: SeverityTier) -> Self {
        Self {
            tier,
            label: tier.label(),
            meter_percent: tier.meter_percent(),
        }
    }
}
