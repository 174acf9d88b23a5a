use std::fmt;
use std::str::FromStr;

use eframe::egui::{self, Color32};
use tracing::{debug, info};

use crate::anim::{Ease, Prop, Target, Timeline, TweenSpec};
use crate::prefs::{PreferenceStore, PrefsError};

/// Key the theme is persisted under.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("Invalid theme: {s}. Must be 'light' or 'dark'.")),
        }
    }
}

impl From<egui::Theme> for ThemePreference {
    fn from(theme: egui::Theme) -> Self {
        match theme {
            egui::Theme::Dark => Self::Dark,
            egui::Theme::Light => Self::Light,
        }
    }
}

/// Holds the active theme preference and keeps the store in sync.
#[derive(Debug)]
pub struct ThemeToggle {
    preference: ThemePreference,
}

impl ThemeToggle {
    /// Resolve the startup theme: stored value, then the configured default,
    /// then the system preference, then light.
    pub fn init(
        store: &dyn PreferenceStore,
        configured: Option<ThemePreference>,
        system: Option<ThemePreference>,
    ) -> Self {
        let stored = store
            .get(THEME_KEY)
            .and_then(|v| v.parse::<ThemePreference>().ok());
        let preference = stored.or(configured).or(system).unwrap_or_default();
        debug!(
            ?stored,
            ?configured,
            ?system,
            %preference,
            "theme resolved"
        );
        Self { preference }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    /// Flip the theme, persist it and pulse the toggle button.
    ///
    /// The in-memory value flips even when persisting fails.
    pub fn toggle(
        &mut self,
        store: &mut dyn PreferenceStore,
        timeline: &mut Timeline,
    ) -> Result<ThemePreference, PrefsError> {
        self.preference = self.preference.toggled();
        timeline.from_to(
            Target::ThemeButton,
            &[(Prop::Scale, 0.8)],
            &[(Prop::Scale, 1.0)],
            TweenSpec::new(0.3).ease(Ease::BackOut(2.0)),
        );
        info!(theme = %self.preference, "theme toggled");
        store.set(THEME_KEY, self.preference.as_str())?;
        Ok(self.preference)
    }
}

/// Colours for one theme.
#[derive(Debug, Clone)]
pub struct Palette {
    pub preference: ThemePreference,
    pub background: Color32,
    pub foreground: Color32,
    pub heading: Color32,
    pub muted: Color32,
    pub accent: Color32,
    pub accent_alt: Color32,
    pub card_background: Color32,
    pub card_border: Color32,
    pub code_background: Color32,
    pub code_foreground: Color32,
    pub grid_line: Color32,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            preference: ThemePreference::Dark,
            background: Color32::from_rgb(0x0B, 0x0F, 0x1A),
            foreground: Color32::from_rgb(0xC8, 0xD0, 0xE0),
            heading: Color32::WHITE,
            muted: Color32::from_rgb(0x7A, 0x85, 0x9A),
            accent: Color32::from_rgb(0x38, 0xBD, 0xF8),
            accent_alt: Color32::from_rgb(0xA7, 0x8B, 0xFA),
            card_background: Color32::from_rgb(0x14, 0x1B, 0x2D),
            card_border: Color32::from_rgb(0x26, 0x31, 0x4A),
            code_background: Color32::from_rgb(0x10, 0x15, 0x24),
            code_foreground: Color32::from_rgb(0xD4, 0xD4, 0xD4),
            grid_line: Color32::from_rgba_unmultiplied(0x38, 0xBD, 0xF8, 18),
        }
    }

    pub fn light() -> Self {
        Self {
            preference: ThemePreference::Light,
            background: Color32::from_rgb(0xF7, 0xF8, 0xFC),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading: Color32::from_rgb(0x16, 0x21, 0x3E),
            muted: Color32::from_rgb(0x5B, 0x64, 0x78),
            accent: Color32::from_rgb(0x02, 0x84, 0xC7),
            accent_alt: Color32::from_rgb(0x7C, 0x3A, 0xED),
            card_background: Color32::WHITE,
            card_border: Color32::from_rgb(0xE2, 0xE6, 0xEF),
            code_background: Color32::from_rgb(0xF1, 0xF3, 0xF8),
            code_foreground: Color32::from_rgb(0x33, 0x33, 0x33),
            grid_line: Color32::from_rgba_unmultiplied(0x02, 0x84, 0xC7, 14),
        }
    }

    pub fn for_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let alpha = (f32::from(a) * opacity.clamp(0.0, 1.0)) as u8;
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    }

    /// egui visuals matching this palette, for widgets we don't paint ourselves.
    pub fn visuals(&self) -> egui::Visuals {
        let mut visuals = match self.preference {
            ThemePreference::Dark => egui::Visuals::dark(),
            ThemePreference::Light => egui::Visuals::light(),
        };
        visuals.panel_fill = self.background;
        visuals.window_fill = self.card_background;
        visuals.selection.bg_fill = self.accent;
        visuals
    }

    /// Return the syntect theme name that matches this palette.
    pub fn syntect_theme_name(&self) -> &'static str {
        match self.preference {
            ThemePreference::Dark => "base16-ocean.dark",
            ThemePreference::Light => "InspiredGitHub",
        }
    }
}
