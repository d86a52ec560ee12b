use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed component category enumeration. Stored as text in the database;
/// parsed here at the API edge so unknown values are rejected with a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Buttons,
    Cards,
    Forms,
    Inputs,
    Navigation,
    Modals,
    Tables,
    Charts,
    Layout,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Buttons,
        Category::Cards,
        Category::Forms,
        Category::Inputs,
        Category::Navigation,
        Category::Modals,
        Category::Tables,
        Category::Charts,
        Category::Layout,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Buttons => "Buttons",
            Category::Cards => "Cards",
            Category::Forms => "Forms",
            Category::Inputs => "Inputs",
            Category::Navigation => "Navigation",
            Category::Modals => "Modals",
            Category::Tables => "Tables",
            Category::Charts => "Charts",
            Category::Layout => "Layout",
            Category::Other => "Other",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Preview color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewTheme {
    Dark,
    Light,
}

impl PreviewTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewTheme::Dark => "dark",
            PreviewTheme::Light => "light",
        }
    }
}

impl Default for PreviewTheme {
    fn default() -> Self {
        PreviewTheme::Dark
    }
}

impl FromStr for PreviewTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(PreviewTheme::Dark),
            "light" => Ok(PreviewTheme::Light),
            other => Err(format!("Invalid theme value: {}", other)),
        }
    }
}

/// Rendering settings for the client preview sandbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSettings {
    #[serde(default)]
    pub theme: PreviewTheme,
    #[serde(default = "default_use_house_theme")]
    pub use_house_theme: bool,
}

fn default_use_house_theme() -> bool {
    true
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            theme: PreviewTheme::Dark,
            use_house_theme: true,
        }
    }
}

/// Sort order for the public component listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSort {
    /// Newest first
    Recent,
    /// Most viewed first
    Popular,
    /// Most liked first (raw like cardinality)
    Liked,
}

impl Default for ComponentSort {
    fn default() -> Self {
        ComponentSort::Recent
    }
}

impl FromStr for ComponentSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(ComponentSort::Recent),
            "popular" => Ok(ComponentSort::Popular),
            "liked" => Ok(ComponentSort::Liked),
            other => Err(format!("Unknown sort: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("buttons".parse::<Category>().unwrap(), Category::Buttons);
        assert_eq!("LAYOUT".parse::<Category>().unwrap(), Category::Layout);
    }

    #[test]
    fn test_category_parse_unknown() {
        assert!("Widgets".parse::<Category>().is_err());
    }

    #[test]
    fn test_preview_theme_parse() {
        assert_eq!("dark".parse::<PreviewTheme>().unwrap(), PreviewTheme::Dark);
        assert_eq!(
            "light".parse::<PreviewTheme>().unwrap(),
            PreviewTheme::Light
        );
        assert!("blue".parse::<PreviewTheme>().is_err());
    }

    #[test]
    fn test_preview_settings_defaults() {
        let settings: PreviewSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.theme, PreviewTheme::Dark);
        assert!(settings.use_house_theme);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(
            "popular".parse::<ComponentSort>().unwrap(),
            ComponentSort::Popular
        );
        assert!("trending".parse::<ComponentSort>().is_err());
    }
}
