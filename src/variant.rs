//! Product variants
//!
//! Both coaching products share one engine. Everything that differs between
//! them is captured in [`EngineConfig`], built once per [`Variant`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backend::WireRole;
use crate::pins::PinCategory;
use crate::{Error, Result};

/// Which coaching product the engine is running as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Content-strategy coaching: no profile, toggle pins, pins stay local
    #[default]
    Strategy,
    /// Nutrition coaching: profile required, additive categorised pins
    Nutrition,
}

impl Variant {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Strategy => "strategy",
            Self::Nutrition => "nutrition",
        }
    }

    /// Engine parameters for this variant
    #[must_use]
    pub fn engine_config(self) -> EngineConfig {
        match self {
            Self::Strategy => EngineConfig::strategy(),
            Self::Nutrition => EngineConfig::nutrition(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strategy" | "spark" => Ok(Self::Strategy),
            "nutrition" | "nutribot" => Ok(Self::Nutrition),
            other => Err(Error::Config(format!("unknown variant: {other}"))),
        }
    }
}

/// How pin requests for an already-pinned turn are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// The turn id doubles as the pin id; pinning again unpins
    Toggle,
    /// Every pin call inserts a fresh item, even for the same turn
    Additive,
}

/// Optional fields forwarded to the backend on every turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PayloadFields {
    /// Forward the current profile record
    pub profile: bool,
    /// Forward the full pin store
    pub pinned_context: bool,
}

/// Header style for each block in an exported pin board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportLabel {
    /// `STRATEGY BLOCK 1`, `STRATEGY BLOCK 2`, ...
    Indexed(&'static str),
    /// `[PREFERENCE] 2026-10-19 14:02`
    CategoryTimestamp,
}

/// A canned prompt offered while the conversation is still fresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickStart {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub prompt: &'static str,
}

/// Per-variant engine parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Product this configuration was built for
    pub variant: Variant,

    /// Toggle or additive pinning
    pub pin_mode: PinMode,

    /// A profile must exist before any message may be sent
    pub profile_required: bool,

    /// Optional payload fields
    pub payload: PayloadFields,

    /// Wire label for assistant turns in `history`
    pub assistant_role: WireRole,

    /// Category applied when a pin request carries none
    pub default_pin_category: Option<PinCategory>,

    /// Seed turn for a brand new transcript (`None` = start empty)
    pub greeting: Option<&'static str>,

    /// Seed turn written by a confirmed reset
    pub reset_greeting: &'static str,

    /// Assistant turn appended when the backend call fails
    pub error_message: &'static str,

    /// Notice shown when export is requested with an empty pin store
    pub empty_export_notice: &'static str,

    /// Block header style for export
    pub export_label: ExportLabel,

    /// Suggested filename for the exported artifact
    pub export_filename: &'static str,

    /// Quick-start prompts
    pub quick_starts: Vec<QuickStart>,
}

impl EngineConfig {
    /// Content-strategy coaching
    #[must_use]
    pub fn strategy() -> Self {
        Self {
            variant: Variant::Strategy,
            pin_mode: PinMode::Toggle,
            profile_required: false,
            payload: PayloadFields::default(),
            assistant_role: WireRole::Model,
            default_pin_category: None,
            greeting: Some(
                "I'm ready. Select a template below or describe your goal to start strategizing.",
            ),
            reset_greeting: "Fresh slate. Pick a new direction.",
            error_message: "⚠️ Connection Error.",
            empty_export_notice: "Pin some ideas to the board first!",
            export_label: ExportLabel::Indexed("STRATEGY BLOCK"),
            export_filename: "My_Viral_Strategy.txt",
            quick_starts: vec![
                QuickStart {
                    title: "Viral Hooks",
                    subtitle: "Generate 5 grabby headlines",
                    prompt: "Generate 5 Viral Hooks for my niche",
                },
                QuickStart {
                    title: "Content Plan",
                    subtitle: "One week of ideas",
                    prompt: "Create a 7-day content calendar for beginners",
                },
                QuickStart {
                    title: "Strategy Audit",
                    subtitle: "Find missed opportunities",
                    prompt: "Roast my current content strategy and find gaps",
                },
            ],
        }
    }

    /// Nutrition coaching
    #[must_use]
    pub fn nutrition() -> Self {
        Self {
            variant: Variant::Nutrition,
            pin_mode: PinMode::Additive,
            profile_required: true,
            payload: PayloadFields {
                profile: true,
                pinned_context: true,
            },
            assistant_role: WireRole::Ai,
            default_pin_category: Some(PinCategory::Preference),
            greeting: None,
            reset_greeting: "Chat cleared. Your profile and pinned memory are still active.",
            error_message: "⚠️ Connection Error. The nutrition service could not be reached, please try again.",
            empty_export_notice: "Pin some answers to your memory first!",
            export_label: ExportLabel::CategoryTimestamp,
            export_filename: "Nutrition_Memory.txt",
            quick_starts: Vec::new(),
        }
    }
}
