//! Terminal styling: color configuration, SGR decoding, palettes.
//!
//! The detail-line builder emits semantic [`SegmentStyle`]s and raw ANSI
//! text; this module maps both onto concrete ratatui styles, honoring
//! `--no-color` and the `NO_COLOR` convention.

use crate::view_state::SegmentStyle;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Priority (first match wins):
/// 1. `--no-color` flag (disables colors)
/// 2. `NO_COLOR` env var (any value disables colors)
/// 3. Default: colors enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    /// Force a value, bypassing the environment. Used by tests and by the
    /// resolved config (which has already folded `NO_COLOR` in).
    pub fn with_colors(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== Styles =====

/// Palette lookups for the two panes.
pub struct Styles {
    config: ColorConfig,
}

impl Styles {
    pub fn new(config: ColorConfig) -> Self {
        Self { config }
    }

    fn colored(&self, style: Style) -> Style {
        if self.config.colors_enabled() {
            style
        } else {
            // Keep modifiers (bold still reads on a mono terminal), drop color.
            Style::default().add_modifier(style.add_modifier)
        }
    }

    /// HTTP method color, by verb.
    pub fn method(&self, method: &str) -> Style {
        let style = match method {
            "GET" => Style::default().fg(Color::Green),
            "POST" => Style::default().fg(Color::Yellow),
            "PUT" | "PATCH" => Style::default().fg(Color::Blue),
            "DELETE" => Style::default().fg(Color::Red),
            _ => Style::default(),
        };
        self.colored(style.add_modifier(Modifier::BOLD))
    }

    /// Status code color, by class.
    pub fn status(&self, status: u16) -> Style {
        let style = match status {
            200..=299 => Style::default().fg(Color::Green),
            300..=399 => Style::default().fg(Color::Yellow),
            400..=599 => Style::default().fg(Color::Red),
            _ => Style::default(),
        };
        self.colored(style)
    }

    /// Style for a pre-styled header segment.
    pub fn segment(&self, segment: SegmentStyle) -> Style {
        match segment {
            SegmentStyle::Label => self.colored(Style::default().fg(Color::Cyan)),
            SegmentStyle::Title => {
                self.colored(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            }
            SegmentStyle::Value | SegmentStyle::Summary => Style::default(),
            // Method text without the verb resolves to the fallback style;
            // callers go through `segment_for` to get the verb palette.
            SegmentStyle::Method => self.colored(Style::default().add_modifier(Modifier::BOLD)),
            SegmentStyle::Status(code) => self.status(code),
            SegmentStyle::Dim => Style::default().add_modifier(Modifier::DIM),
        }
    }

    /// Resolve one segment, routing method text through the verb palette.
    pub fn segment_for(&self, segment: SegmentStyle, text: &str) -> Style {
        match segment {
            SegmentStyle::Method => self.method(text),
            other => self.segment(other),
        }
    }

    /// Decode one SGR escape sequence (`ESC [ codes m`) into a style.
    ///
    /// Recognized codes: 0 (reset), 1 (bold), 30-37 (foreground). Everything
    /// else is ignored, matching what the log producers actually emit.
    pub fn sgr(&self, escape: &str) -> Style {
        let inner = escape
            .strip_prefix("\u{1b}[")
            .and_then(|s| s.strip_suffix('m'))
            .unwrap_or("");

        let mut style = Style::default();
        for code in inner.split(';') {
            let Ok(code) = code.parse::<u8>() else {
                continue;
            };
            style = match code {
                0 => Style::default(),
                1 => style.add_modifier(Modifier::BOLD),
                30 => style.fg(Color::Black),
                31 => style.fg(Color::Red),
                32 => style.fg(Color::Green),
                33 => style.fg(Color::Yellow),
                34 => style.fg(Color::Blue),
                35 => style.fg(Color::Magenta),
                36 => style.fg(Color::Cyan),
                37 => style.fg(Color::White),
                _ => style,
            };
        }
        self.colored(style)
    }

    /// Highlight for the selected row/entry.
    pub fn selection(&self) -> Style {
        if self.config.colors_enabled() {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        }
    }

    /// Pane title when the pane has focus.
    pub fn focused_title(&self) -> Style {
        self.colored(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    }

    /// Pane title when the pane does not have focus.
    pub fn unfocused_title(&self) -> Style {
        Style::default().add_modifier(Modifier::DIM)
    }

    /// Filter text shown in a pane title.
    pub fn filter(&self) -> Style {
        self.colored(Style::default().fg(Color::Yellow))
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn styles() -> Styles {
        Styles::new(ColorConfig::with_colors(true))
    }

    #[test]
    #[serial(reqtail_env)]
    fn color_config_respects_no_color_flag() {
        std::env::remove_var("NO_COLOR");
        assert!(!ColorConfig::from_env_and_args(true).colors_enabled());
        assert!(ColorConfig::from_env_and_args(false).colors_enabled());
    }

    #[test]
    #[serial(reqtail_env)]
    fn color_config_respects_no_color_env_var() {
        std::env::set_var("NO_COLOR", "1");
        let config = ColorConfig::from_env_and_args(false);
        std::env::remove_var("NO_COLOR");
        assert!(!config.colors_enabled());
    }

    #[test]
    fn method_palette_distinguishes_verbs() {
        let s = styles();
        assert_eq!(s.method("GET").fg, Some(Color::Green));
        assert_eq!(s.method("POST").fg, Some(Color::Yellow));
        assert_eq!(s.method("DELETE").fg, Some(Color::Red));
        assert_eq!(s.method("OPTIONS").fg, None);
    }

    #[test]
    fn status_palette_follows_class() {
        let s = styles();
        assert_eq!(s.status(200).fg, Some(Color::Green));
        assert_eq!(s.status(302).fg, Some(Color::Yellow));
        assert_eq!(s.status(404).fg, Some(Color::Red));
        assert_eq!(s.status(500).fg, Some(Color::Red));
    }

    #[test]
    fn sgr_decodes_bold_and_color() {
        let s = styles();
        let style = s.sgr("\u{1b}[1;34m");
        assert_eq!(style.fg, Some(Color::Blue));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn sgr_reset_clears_everything() {
        let s = styles();
        assert_eq!(s.sgr("\u{1b}[0m"), Style::default());
        assert_eq!(s.sgr("\u{1b}[m"), Style::default());
    }

    #[test]
    fn sgr_unknown_codes_are_ignored() {
        let s = styles();
        let style = s.sgr("\u{1b}[99;32m");
        assert_eq!(style.fg, Some(Color::Green));
    }

    #[test]
    fn disabled_colors_strip_foreground_but_keep_bold() {
        let s = Styles::new(ColorConfig::with_colors(false));
        let style = s.method("GET");
        assert_eq!(style.fg, None);
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(s.sgr("\u{1b}[31m").fg, None);
    }

    #[test]
    fn selection_falls_back_to_reverse_video() {
        let colored = styles().selection();
        assert_eq!(colored.bg, Some(Color::DarkGray));
        let mono = Styles::new(ColorConfig::with_colors(false)).selection();
        assert!(mono.add_modifier.contains(Modifier::REVERSED));
    }
}
