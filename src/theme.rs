use std::str::FromStr;

use ratatui::style::{Color, Style};
use tracing::warn;

use crate::config::ThemeConfig;

/// Colors used by the highlight viewer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the current file name in the status bar
    pub filename_color: Color,

    /// Foreground color for a drag that has not been committed yet
    pub selection_fg: Color,

    /// Background color for a drag that has not been committed yet
    pub selection_bg: Color,

    /// Foreground color for stored highlights
    pub highlight_fg: Color,

    /// Background color for stored highlights
    pub highlight_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            filename_color: Color::LightYellow,
            selection_fg: Color::White,
            selection_bg: Color::LightBlue,
            highlight_fg: Color::Black,
            highlight_bg: Color::LightYellow,
        }
    }
}

impl Theme {
    /// Applies the color overrides of a `[theme]` config section. Names that do not
    /// parse keep the default color.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let defaults = Self::default();
        Self {
            status_bar_fg: pick("status_bar_fg", &config.status_bar_fg, defaults.status_bar_fg),
            status_bar_bg: pick("status_bar_bg", &config.status_bar_bg, defaults.status_bar_bg),
            filename_color: pick("filename", &config.filename, defaults.filename_color),
            selection_fg: pick("selection_fg", &config.selection_fg, defaults.selection_fg),
            selection_bg: pick("selection_bg", &config.selection_bg, defaults.selection_bg),
            highlight_fg: pick("highlight_fg", &config.highlight_fg, defaults.highlight_fg),
            highlight_bg: pick("highlight_bg", &config.highlight_bg, defaults.highlight_bg),
        }
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Get the style for the filename in the status bar
    pub fn filename_style(&self) -> Style {
        Style::default().fg(self.filename_color)
    }

    /// Get the style for the drag in progress
    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    /// Get the style for highlighted runs
    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight_fg).bg(self.highlight_bg)
    }
}

fn pick(key: &str, value: &Option<String>, fallback: Color) -> Color {
    let Some(name) = value.as_deref() else {
        return fallback;
    };
    match Color::from_str(name.trim()) {
        Ok(color) => color,
        Err(_) => {
            warn!(key, value = name, "unknown theme color, keeping default");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() {
        assert_eq!(Theme::from_config(&ThemeConfig::default()), Theme::default());
    }

    #[test]
    fn named_and_hex_colors_override_defaults() {
        let config = ThemeConfig {
            highlight_bg: Some("green".to_string()),
            selection_fg: Some("#102030".to_string()),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&config);
        assert_eq!(theme.highlight_bg, Color::Green);
        assert_eq!(theme.selection_fg, Color::Rgb(0x10, 0x20, 0x30));
        assert_eq!(theme.highlight_fg, Color::Black);
    }

    #[test]
    fn unknown_color_falls_back() {
        let config = ThemeConfig {
            status_bar_bg: Some("not a color".to_string()),
            ..ThemeConfig::default()
        };
        assert_eq!(Theme::from_config(&config).status_bar_bg, Color::Blue);
    }
}
