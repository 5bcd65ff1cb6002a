//! Widget kinds known to the dashboard.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The type of a widget instance. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Clock,
    Weather,
    Notes,
    Shortcuts,
    Countdown,
    Password,
    Calendar,
    /// A persisted type this build does not know about.
    Unknown(String),
}

impl WidgetKind {
    /// Every kind offered in the widget picker.
    pub const ALL: [WidgetKind; 7] = [
        WidgetKind::Clock,
        WidgetKind::Weather,
        WidgetKind::Notes,
        WidgetKind::Shortcuts,
        WidgetKind::Countdown,
        WidgetKind::Password,
        WidgetKind::Calendar,
    ];

    /// The persisted type tag.
    pub fn as_str(&self) -> &str {
        match self {
            WidgetKind::Clock => "clock",
            WidgetKind::Weather => "weather",
            WidgetKind::Notes => "notes",
            WidgetKind::Shortcuts => "shortcuts",
            WidgetKind::Countdown => "countdown",
            WidgetKind::Password => "password",
            WidgetKind::Calendar => "calendar",
            WidgetKind::Unknown(tag) => tag,
        }
    }

    /// Human readable name for menus and headers.
    pub fn display_name(&self) -> &str {
        match self {
            WidgetKind::Clock => "Clock",
            WidgetKind::Weather => "Weather",
            WidgetKind::Notes => "Notes",
            WidgetKind::Shortcuts => "Shortcuts",
            WidgetKind::Countdown => "Countdown",
            WidgetKind::Password => "Password Generator",
            WidgetKind::Calendar => "Calendar",
            WidgetKind::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, WidgetKind::Unknown(_))
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "clock" => WidgetKind::Clock,
            "weather" => WidgetKind::Weather,
            "notes" => WidgetKind::Notes,
            "shortcuts" => WidgetKind::Shortcuts,
            "countdown" => WidgetKind::Countdown,
            "password" => WidgetKind::Password,
            "calendar" => WidgetKind::Calendar,
            other => WidgetKind::Unknown(other.to_string()),
        })
    }
}

impl Serialize for WidgetKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WidgetKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        let Ok(kind) = tag.parse::<WidgetKind>();
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for kind in WidgetKind::ALL {
            let parsed: WidgetKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let kind: WidgetKind = serde_json::from_str("\"stocks\"").unwrap();
        assert_eq!(kind, WidgetKind::Unknown("stocks".to_string()));
        assert!(!kind.is_known());
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"stocks\"");
    }
}
