//! Colour palette for levels, tags and the metadata tree.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Whether colours are drawn at all.
///
/// Resolved once at startup from `--no-color` and `NO_COLOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Colours on or off.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self::new(true)
    }
}

// ===== LevelClass =====

/// Colour class of a level string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelClass {
    /// `info`
    Info,
    /// `warn`, `warning`
    Warn,
    /// `error`, `erro`
    Error,
    /// `fatal`
    Fatal,
    /// `debug`, `trace` and anything unrecognised.
    Plain,
}

impl LevelClass {
    /// Classify by the first four characters, so `error` and `erro` match alike.
    pub fn of(level: &str) -> Self {
        let prefix: String = level.chars().take(4).collect::<String>().to_lowercase();
        match prefix.as_str() {
            "info" => LevelClass::Info,
            "warn" => LevelClass::Warn,
            "erro" => LevelClass::Error,
            "fata" => LevelClass::Fatal,
            _ => LevelClass::Plain,
        }
    }
}

// ===== Palette =====

/// Every style the views draw with.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    info: Color,
    warn: Color,
    error: Color,
    fatal: Color,
    /// Titles and messages.
    pub text: Style,
    /// Secondary text: group descriptions, key hints.
    pub dim: Style,
    /// Name of a key/value tag.
    pub tag_name: Style,
    /// Name-only tag.
    pub tag_solo: Style,
    /// Value of a key/value tag.
    pub tag_value: Style,
    /// Keys in the detail view.
    pub metadata_key: Style,
    /// Values in the detail view.
    pub metadata_value: Style,
    /// Highlighted list row.
    pub selected: Style,
    /// Border of the focused pane.
    pub active_border: Style,
    /// Border of the other pane.
    pub inactive_border: Style,
    /// `[LIVE]` indicator.
    pub live: Style,
    /// `[DISCONNECTED]` indicator.
    pub disconnected: Style,
    colors: bool,
}

impl Palette {
    /// Palette for the given colour configuration. With colours disabled every
    /// style is plain except selection, which stays visible through reversal.
    pub fn with_color_config(config: ColorConfig) -> Self {
        if config.colors_enabled() {
            Self {
                info: Color::Rgb(0x29, 0x83, 0xa3),
                warn: Color::Rgb(0x80, 0x61, 0x0a),
                error: Color::Rgb(0x90, 0x09, 0x34),
                fatal: Color::Rgb(0x90, 0x09, 0x09),
                text: Style::default().fg(Color::Gray),
                dim: Style::default().fg(Color::DarkGray),
                tag_name: Style::default().fg(Color::Rgb(0x48, 0x4c, 0xb0)),
                tag_solo: Style::default().fg(Color::Rgb(0x5d, 0xb6, 0xd7)),
                tag_value: Style::default().fg(Color::Rgb(0x99, 0x99, 0x99)),
                metadata_key: Style::default().fg(Color::Rgb(0x73, 0xf5, 0x9f)),
                metadata_value: Style::default().fg(Color::Gray),
                selected: Style::default().bg(Color::Rgb(0x89, 0x07, 0x92)),
                active_border: Style::default().fg(Color::Rgb(0xee, 0x6f, 0xf8)),
                inactive_border: Style::default().fg(Color::DarkGray),
                live: Style::default().fg(Color::Green),
                disconnected: Style::default().fg(Color::Red),
                colors: true,
            }
        } else {
            Self {
                info: Color::Reset,
                warn: Color::Reset,
                error: Color::Reset,
                fatal: Color::Reset,
                text: Style::default(),
                dim: Style::default(),
                tag_name: Style::default(),
                tag_solo: Style::default(),
                tag_value: Style::default(),
                metadata_key: Style::default(),
                metadata_value: Style::default(),
                selected: Style::default().add_modifier(Modifier::REVERSED),
                active_border: Style::default().add_modifier(Modifier::BOLD),
                inactive_border: Style::default(),
                live: Style::default(),
                disconnected: Style::default(),
                colors: false,
            }
        }
    }

    /// Whether this palette uses colours at all.
    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    /// Style for the level label: the level colour as background.
    pub fn level_label(&self, level: &str) -> Style {
        if !self.colors {
            return Style::default();
        }
        match LevelClass::of(level) {
            LevelClass::Info => self.text.bg(self.info),
            LevelClass::Warn => self.text.bg(self.warn),
            LevelClass::Error => self.text.bg(self.error),
            LevelClass::Fatal => self.text.bg(self.fatal),
            LevelClass::Plain => self.dim,
        }
    }

    /// Style for the message text; unrecognised levels are dimmed.
    pub fn message(&self, level: &str) -> Style {
        match LevelClass::of(level) {
            LevelClass::Plain => self.dim,
            _ => self.text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::default())
    }
}

// ===== Tests =====
