use serde::Deserialize;
use serde_json::json;

use crate::logging::LogLevel;

pub const DEFAULT_STICKY_THRESHOLD: f64 = 100.0;
pub const DEFAULT_TRIGGER_MARGIN: f64 = 150.0;
pub const DEFAULT_FRAME_COALESCING: bool = true;
pub const DEFAULT_BACK_TO_TOP_THRESHOLD: f64 = 300.0;
pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 768.0;
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u32 = 250;
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;
pub const DEFAULT_TYPING_DELAY_MS: u32 = 100;
pub const DEFAULT_DELETING_DELAY_MS: u32 = 50;
pub const DEFAULT_TYPING_HOLD_MS: u32 = 1_800;
pub const DEFAULT_TYPING_PHRASES: [&str; 3] = ["Frontend Developer", "Web Designer", "Rust Developer"];

const STICKY_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 2_000.0);
const TRIGGER_MARGIN_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const BACK_TO_TOP_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 10_000.0);
const MOBILE_BREAKPOINT_BOUNDS: (f64, f64) = (320.0, 4_096.0);
const RESIZE_DEBOUNCE_MS_BOUNDS: (u32, u32) = (0, 2_000);
const TYPING_DELAY_MS_BOUNDS: (u32, u32) = (10, 1_000);
const DELETING_DELAY_MS_BOUNDS: (u32, u32) = (10, 1_000);
const TYPING_HOLD_MS_BOUNDS: (u32, u32) = (100, 10_000);

/// Element id of the optional JSON block that overrides the defaults.
pub const CONFIG_ELEMENT_ID: &str = "page-config";

#[derive(Clone, Debug, PartialEq)]
pub struct PageConfig {
    pub sticky_threshold: f64,
    pub trigger_margin: f64,
    pub frame_coalescing: bool,
    pub back_to_top_threshold: f64,
    pub mobile_breakpoint: f64,
    pub resize_debounce_ms: u32,
    pub log_level: LogLevel,
    pub typing_phrases: Vec<String>,
    pub typing_delay_ms: u32,
    pub deleting_delay_ms: u32,
    pub typing_hold_ms: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            sticky_threshold: DEFAULT_STICKY_THRESHOLD,
            trigger_margin: DEFAULT_TRIGGER_MARGIN,
            frame_coalescing: DEFAULT_FRAME_COALESCING,
            back_to_top_threshold: DEFAULT_BACK_TO_TOP_THRESHOLD,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            log_level: DEFAULT_LOG_LEVEL,
            typing_phrases: DEFAULT_TYPING_PHRASES.iter().map(|value| value.to_string()).collect(),
            typing_delay_ms: DEFAULT_TYPING_DELAY_MS,
            deleting_delay_ms: DEFAULT_DELETING_DELAY_MS,
            typing_hold_ms: DEFAULT_TYPING_HOLD_MS,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageConfig {
    sticky_threshold: Option<f64>,
    trigger_margin: Option<f64>,
    frame_coalescing: Option<bool>,
    back_to_top_threshold: Option<f64>,
    mobile_breakpoint: Option<f64>,
    resize_debounce_ms: Option<u32>,
    log_level: Option<String>,
    typing_phrases: Option<Vec<String>>,
    typing_delay_ms: Option<u32>,
    deleting_delay_ms: Option<u32>,
    typing_hold_ms: Option<u32>,
}

impl PageConfig {
    /// Reads overrides from the page's JSON config block. A missing block,
    /// malformed JSON or an out-of-range value keeps the default.
    pub fn from_json(raw: Option<&str>) -> Self {
        let raw = raw
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| serde_json::from_str::<RawPageConfig>(value).ok())
            .unwrap_or_default();

        let typing_phrases = raw
            .typing_phrases
            .map(|phrases| {
                phrases
                    .into_iter()
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|phrases| !phrases.is_empty())
            .unwrap_or_else(|| DEFAULT_TYPING_PHRASES.iter().map(|value| value.to_string()).collect());

        Self {
            sticky_threshold: parse_f64_with_bounds(
                raw.sticky_threshold,
                DEFAULT_STICKY_THRESHOLD,
                STICKY_THRESHOLD_BOUNDS,
            ),
            trigger_margin: parse_f64_with_bounds(
                raw.trigger_margin,
                DEFAULT_TRIGGER_MARGIN,
                TRIGGER_MARGIN_BOUNDS,
            ),
            frame_coalescing: raw.frame_coalescing.unwrap_or(DEFAULT_FRAME_COALESCING),
            back_to_top_threshold: parse_f64_with_bounds(
                raw.back_to_top_threshold,
                DEFAULT_BACK_TO_TOP_THRESHOLD,
                BACK_TO_TOP_THRESHOLD_BOUNDS,
            ),
            mobile_breakpoint: parse_f64_with_bounds(
                raw.mobile_breakpoint,
                DEFAULT_MOBILE_BREAKPOINT,
                MOBILE_BREAKPOINT_BOUNDS,
            ),
            resize_debounce_ms: parse_u32_with_bounds(
                raw.resize_debounce_ms,
                DEFAULT_RESIZE_DEBOUNCE_MS,
                RESIZE_DEBOUNCE_MS_BOUNDS,
            ),
            log_level: raw
                .log_level
                .as_deref()
                .and_then(LogLevel::parse)
                .unwrap_or(DEFAULT_LOG_LEVEL),
            typing_phrases,
            typing_delay_ms: parse_u32_with_bounds(
                raw.typing_delay_ms,
                DEFAULT_TYPING_DELAY_MS,
                TYPING_DELAY_MS_BOUNDS,
            ),
            deleting_delay_ms: parse_u32_with_bounds(
                raw.deleting_delay_ms,
                DEFAULT_DELETING_DELAY_MS,
                DELETING_DELAY_MS_BOUNDS,
            ),
            typing_hold_ms: parse_u32_with_bounds(
                raw.typing_hold_ms,
                DEFAULT_TYPING_HOLD_MS,
                TYPING_HOLD_MS_BOUNDS,
            ),
        }
    }

    /// Resolved settings in the same camelCase shape the config block uses.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "stickyThreshold": self.sticky_threshold,
            "triggerMargin": self.trigger_margin,
            "frameCoalescing": self.frame_coalescing,
            "backToTopThreshold": self.back_to_top_threshold,
            "mobileBreakpoint": self.mobile_breakpoint,
            "resizeDebounceMs": self.resize_debounce_ms,
            "logLevel": self.log_level.as_str(),
            "typingPhrases": self.typing_phrases,
            "typingDelayMs": self.typing_delay_ms,
            "deletingDelayMs": self.deleting_delay_ms,
            "typingHoldMs": self.typing_hold_ms,
        })
    }
}

fn parse_f64_with_bounds(value: Option<f64>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .filter(|value| value.is_finite())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_u32_with_bounds(value: Option<u32>, default: u32, bounds: (u32, u32)) -> u32 {
    value
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}
