//! Color themes for the terminal UI.

use ratatui::style::Color;
use std::fmt;

/// Available color themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Shelby pink on black (default)
    #[default]
    Shelby,
    /// Nord-inspired muted colors
    Nord,
    /// Green Phosphor - green text on black (classic terminal)
    GreenPhosphor,
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "shelby" | "pink" => Ok(Theme::Shelby),
            "nord" => Ok(Theme::Nord),
            "green" | "greenphosphor" | "green-phosphor" => Ok(Theme::GreenPhosphor),
            _ => Err(anyhow::anyhow!(
                "Unknown theme '{s}'. Available: shelby, nord, green-phosphor"
            )),
        }
    }
}

impl Theme {
    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Shelby => ColorScheme::shelby(),
            Theme::Nord => ColorScheme::nord(),
            Theme::GreenPhosphor => ColorScheme::green_phosphor(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Shelby => write!(f, "shelby"),
            Theme::Nord => write!(f, "nord"),
            Theme::GreenPhosphor => write!(f, "green-phosphor"),
        }
    }
}

/// Color scheme for a theme
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub background: Color,
    pub text: Color,
    /// Secondary info (dates, sizes, hints)
    pub text_dim: Color,
    /// Brand accent: active tab, links, selected preset
    pub accent: Color,
    pub focus_border: Color,
    pub unfocused_border: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    /// File kind badge
    pub badge: Color,
    pub toast_success: Color,
    pub toast_error: Color,
    pub toast_info: Color,
}

impl ColorScheme {
    pub fn shelby() -> Self {
        let pink = Color::Rgb(255, 105, 180);
        let pink_dim = Color::Rgb(160, 70, 120);
        Self {
            background: Color::Black,
            text: Color::White,
            text_dim: Color::Gray,
            accent: pink,
            focus_border: pink,
            unfocused_border: Color::DarkGray,
            selection_bg: pink,
            selection_fg: Color::Black,
            badge: pink_dim,
            toast_success: Color::Green,
            toast_error: Color::Red,
            toast_info: Color::Cyan,
        }
    }

    pub fn nord() -> Self {
        Self {
            background: Color::Black,
            text: Color::White,
            text_dim: Color::Gray,
            accent: Color::Cyan,
            focus_border: Color::Yellow,
            unfocused_border: Color::Gray,
            selection_bg: Color::Yellow,
            selection_fg: Color::Black,
            badge: Color::Cyan,
            toast_success: Color::Green,
            toast_error: Color::Red,
            toast_info: Color::LightBlue,
        }
    }

    pub fn green_phosphor() -> Self {
        let green = Color::Rgb(0, 255, 0);
        let green_dim = Color::Rgb(0, 180, 0);
        let green_bright = Color::Rgb(100, 255, 100);

        Self {
            background: Color::Black,
            text: green,
            text_dim: green_dim,
            accent: green_bright,
            focus_border: green_bright,
            unfocused_border: green_dim,
            selection_bg: green,
            selection_fg: Color::Black,
            badge: green_bright,
            toast_success: green_bright,
            toast_error: Color::Red, // Red stands out against green
            toast_info: Color::Cyan,
        }
    }
}

/// CSS form of a terminal color. Named colors use the xterm palette.
fn css_color(c: Color) -> String {
    let (r, g, b) = match c {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::Red => (205, 0, 0),
        Color::Green => (0, 205, 0),
        Color::Yellow => (205, 205, 0),
        Color::Blue => (0, 0, 238),
        Color::Magenta => (205, 0, 205),
        Color::Cyan => (0, 205, 205),
        Color::Gray => (229, 229, 229),
        Color::DarkGray => (127, 127, 127),
        Color::LightRed => (255, 0, 0),
        Color::LightGreen => (0, 255, 0),
        Color::LightYellow => (255, 255, 0),
        Color::LightBlue => (92, 92, 255),
        Color::LightMagenta => (255, 0, 255),
        Color::LightCyan => (0, 255, 255),
        Color::White => (255, 255, 255),
        _ => return "inherit".to_string(),
    };
    format!("#{r:02x}{g:02x}{b:02x}")
}

impl ColorScheme {
    /// `--shelbyx-*` custom properties for the DOM front end.
    pub fn css_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--shelbyx-bg", css_color(self.background)),
            ("--shelbyx-text", css_color(self.text)),
            ("--shelbyx-text-dim", css_color(self.text_dim)),
            ("--shelbyx-accent", css_color(self.accent)),
            ("--shelbyx-border-focus", css_color(self.focus_border)),
            ("--shelbyx-border", css_color(self.unfocused_border)),
            ("--shelbyx-selection-bg", css_color(self.selection_bg)),
            ("--shelbyx-selection-fg", css_color(self.selection_fg)),
            ("--shelbyx-badge", css_color(self.badge)),
            ("--shelbyx-toast-success", css_color(self.toast_success)),
            ("--shelbyx-toast-error", css_color(self.toast_error)),
            ("--shelbyx-toast-info", css_color(self.toast_info)),
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::shelby()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parsing() {
        assert_eq!("shelby".parse::<Theme>().unwrap(), Theme::Shelby);
        assert_eq!("NORD".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("green".parse::<Theme>().unwrap(), Theme::GreenPhosphor);
        assert!("invalid".parse::<Theme>().is_err());
        assert_eq!(Theme::default().to_string(), "shelby");
    }

    #[test]
    fn selection_is_readable_in_every_theme() {
        for theme in [Theme::Shelby, Theme::Nord, Theme::GreenPhosphor] {
            let c = theme.colors();
            assert_ne!(c.selection_bg, c.selection_fg, "{theme}");
            assert_ne!(c.text, c.background, "{theme}");
        }
    }

    #[test]
    fn css_vars_are_hex() {
        let vars = ColorScheme::green_phosphor().css_vars();
        let (_, bg) = vars.iter().find(|(k, _)| *k == "--shelbyx-bg").unwrap();
        assert_eq!(bg, "#000000");
        let (_, text) = vars.iter().find(|(k, _)| *k == "--shelbyx-text").unwrap();
        assert_eq!(text, "#00ff00");
    }
}
