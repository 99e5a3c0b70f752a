pub const DARK_MODE_KEY: &str = "darkMode";
pub const DARK_MODE_CLASS: &str = "dark-mode";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Value persisted under [`DARK_MODE_KEY`].
    pub fn as_stored(self) -> &'static str {
        match self {
            Self::Light => "false",
            Self::Dark => "true",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        match value.trim() {
            "true" => Some(Self::Dark),
            "false" => Some(Self::Light),
            _ => None,
        }
    }

    /// Stored preference wins; otherwise follow the system scheme.
    pub fn resolve(stored: Option<&str>, system_prefers_dark: bool) -> Self {
        stored.and_then(Self::from_stored).unwrap_or(if system_prefers_dark {
            Self::Dark
        } else {
            Self::Light
        })
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn toggle_label(self) -> String {
        let next = match self.toggled() {
            Self::Light => "light",
            Self::Dark => "dark",
        };
        format!("Switch to {next} mode")
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "bx bx-moon",
            Self::Dark => "bx bx-sun",
        }
    }
}
