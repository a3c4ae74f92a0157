//! Classification tiers shared by the matrix, the classifier and the report.
//!
//! Wire keys (`as_str`) are stored in the database and returned by the API,
//! so they must never change. Display names and colours are presentation only.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    OfficiallySupported,
    UnofficiallySupported,
    SupportedVdi,
    NeedsReview,
    NeedsInfo,
    NotSupported,
}

impl Tier {
    /// Every tier, in report order.
    pub const ALL: [Tier; 6] = [
        Tier::OfficiallySupported,
        Tier::UnofficiallySupported,
        Tier::SupportedVdi,
        Tier::NeedsReview,
        Tier::NeedsInfo,
        Tier::NotSupported,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OfficiallySupported => "officially_supported",
            Self::UnofficiallySupported => "unofficially_supported",
            Self::SupportedVdi => "supported_vdi",
            Self::NeedsReview => "needs_review",
            Self::NeedsInfo => "needs_info",
            Self::NotSupported => "not_supported",
        }
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == raw)
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OfficiallySupported => "Officially Supported",
            Self::UnofficiallySupported => "Unofficially Supported",
            Self::SupportedVdi => "Supported VDI",
            Self::NeedsReview => "Needs Review",
            Self::NeedsInfo => "Needs Info",
            Self::NotSupported => "Not Supported",
        }
    }

    /// Badge colour as `#RRGGBB`.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::OfficiallySupported => "#10B981",
            Self::UnofficiallySupported => "#8B5CF6",
            Self::SupportedVdi => "#14B8A6",
            Self::NeedsReview => "#F59E0B",
            Self::NeedsInfo => "#0028FA",
            Self::NotSupported => "#F43F5E",
        }
    }

    /// Dark row tint used behind light text in the report, as `0xRRGGBB`.
    #[must_use]
    pub fn row_background(self) -> u32 {
        match self {
            Self::OfficiallySupported => 0x0B3B2E,
            Self::UnofficiallySupported => 0x2E1F5B,
            Self::SupportedVdi => 0x0D3B37,
            Self::NeedsReview => 0x4A3208,
            Self::NeedsInfo => 0x0A1652,
            Self::NotSupported => 0x4C1420,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "tier_test.rs"]
mod tests;
