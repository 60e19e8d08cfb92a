//! Site palette and fonts.
//!
//! The palette is published as CSS custom properties at `/theme.css`,
//! followed by the component rules that pick from it. `main.css` only refers
//! to the variable names.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::components::{CollectionStyle, HoverReveal};

/// A CSS custom property, name without the leading `--`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeVar {
    pub name: &'static str,
    pub value: &'static str,
}

const fn var(name: &'static str, value: &'static str) -> ThemeVar {
    ThemeVar { name, value }
}

/// Palette and typography shared by every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub colors: Vec<ThemeVar>,
    pub heading_font: &'static str,
    pub body_font: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self::studio()
    }
}

impl Theme {
    /// The studio's palette.
    #[must_use]
    pub fn studio() -> Self {
        Self {
            colors: vec![
                var("white", "#ffffff"),
                var("black", "#161616"),
                var("gray-mid", "#6b6b6b"),
                var("gray-light", "#e9e9e9"),
                var("orange-lightest", "#fff4ea"),
                var("orange-light", "#ffd9b8"),
                var("orange-mid", "#f59a4a"),
                var("pink-light", "#fde7ef"),
                var("pink-mid", "#ef86ab"),
                var("blue-light", "#e8f1fb"),
                var("blue-mid", "#4a7fc1"),
                var("blue-light-border", "1px solid #c8dbf2"),
                var("exclusive-border", "3px solid #f59a4a"),
                var("collection-border", "3px solid #ef86ab"),
                var("success", "#2f855a"),
                var("error", "#c53030"),
            ],
            heading_font: "\"Work Sans\", system-ui, sans-serif",
            body_font: "\"Inter\", system-ui, sans-serif",
        }
    }

    /// Look up a color variable by name.
    #[must_use]
    pub fn color(&self, name: &str) -> Option<&'static str> {
        self.colors.iter().find(|v| v.name == name).map(|v| v.value)
    }

    /// Render the theme as a `:root` rule.
    #[must_use]
    pub fn css_variables(&self) -> String {
        let mut css = String::from(":root {\n");
        for ThemeVar { name, value } in &self.colors {
            let _ = writeln!(css, "  --{name}: {value};");
        }
        let _ = writeln!(css, "  --font-heading: {};", self.heading_font);
        let _ = writeln!(css, "  --font-body: {};", self.body_font);
        css.push_str("}\n");
        css
    }
}

/// Hands the same [`Theme`] to every page.
#[derive(Debug, Clone)]
pub struct ThemeProvider {
    theme: Arc<Theme>,
    stylesheet: Arc<str>,
}

impl Default for ThemeProvider {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl ThemeProvider {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        let mut stylesheet = theme.css_variables();
        stylesheet.push_str(&CollectionStyle::stylesheet());
        stylesheet.push_str(&HoverReveal::stylesheet());

        Self {
            theme: Arc::new(theme),
            stylesheet: stylesheet.into(),
        }
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Stylesheet served at `/theme.css`.
    #[must_use]
    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_variables_cover_collection_styles() {
        let css = Theme::studio().css_variables();
        assert!(css.starts_with(":root {"));
        for name in [
            "orange-lightest",
            "orange-mid",
            "pink-light",
            "blue-light-border",
            "exclusive-border",
            "collection-border",
        ] {
            assert!(css.contains(&format!("--{name}: ")), "missing --{name}");
        }
        assert!(css.contains("--font-body: "));
    }

    #[test]
    fn test_provider_clones_share_theme() {
        let provider = ThemeProvider::default();
        let clone = provider.clone();
        assert!(std::ptr::eq(provider.theme(), clone.theme()));
        assert_eq!(provider.stylesheet(), clone.stylesheet());
    }

    #[test]
    fn test_stylesheet_includes_component_rules() {
        let provider = ThemeProvider::default();
        let css = provider.stylesheet();
        assert!(css.starts_with(":root {"));
        assert!(css.contains(".product-card--exclusive .product-card__primary"));
        assert!(css.contains(".product-card__secondary.is-revealed { opacity: 1; }"));
    }

    #[test]
    fn test_color_lookup() {
        let theme = Theme::studio();
        assert_eq!(theme.color("orange-mid"), Some("#f59a4a"));
        assert_eq!(theme.color("nope"), None);
    }
}
