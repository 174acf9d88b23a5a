pub mod slide;
pub mod syntax;

use std::time::Instant;

use eframe::egui::{self, CursorIcon, FontId, Rect, Sense, Stroke, pos2, vec2};

use crate::anim::{Target, Timeline};
use crate::icons::IconRenderer;
use crate::theme::Palette;

pub use slide::{SlideContext, SlideResponse, draw_slide};
pub use syntax::Highlighter;

const GRID_SPACING: f32 = 80.0;
const ORB_RADIUS: f32 = 320.0;
const TOP_NAV_HEIGHT: f32 = 72.0;
const PROGRESS_HEIGHT: f32 = 4.0;

/// Scale relative to a 1920x1080 reference canvas.
pub fn compute_scale(rect: Rect) -> f32 {
    let ref_w = 1920.0;
    let ref_h = 1080.0;
    (rect.width() / ref_w).min(rect.height() / ref_h)
}

/// Background fill, the parallax grid and the two glow orbs.
pub fn draw_background(
    painter: &egui::Painter,
    rect: Rect,
    palette: &Palette,
    timeline: &Timeline,
    scale: f32,
) {
    painter.rect_filled(rect, 0.0, palette.background);

    let grid = timeline.pose(Target::Grid);
    let spacing = GRID_SPACING * scale;
    if spacing > 1.0 {
        let stroke = Stroke::new(1.0, palette.grid_line);
        let mut x = rect.left() + (grid.x * scale).rem_euclid(spacing);
        while x < rect.right() {
            painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
            x += spacing;
        }
        let mut y = rect.top() + (grid.y * scale).rem_euclid(spacing);
        while y < rect.bottom() {
            painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
            y += spacing;
        }
    }

    let anchors = [
        (1, vec2(0.2, 0.25), palette.accent),
        (2, vec2(0.8, 0.75), palette.accent_alt),
    ];
    for (id, anchor, color) in anchors {
        let pose = timeline.pose(Target::Orb(id));
        let center = rect.min + rect.size() * anchor + vec2(pose.x, pose.y) * scale;
        // Soft glow: stacked translucent discs.
        for ring in 0..8 {
            let t = ring as f32 / 8.0;
            painter.circle_filled(
                center,
                ORB_RADIUS * scale * (1.0 - t * 0.8),
                Palette::with_opacity(color, 0.025),
            );
        }
    }
}

/// What the user clicked in the chrome this frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeResponse {
    pub theme_clicked: bool,
    pub dot_clicked: Option<usize>,
}

/// Everything the chrome reads for one frame.
pub struct Chrome<'a> {
    pub palette: &'a Palette,
    pub timeline: &'a Timeline,
    pub title: Option<&'a str>,
    pub footer: Option<&'a str>,
    pub index_label: &'a str,
    pub current: usize,
    pub total: usize,
    pub interactive: bool,
    pub theme_icon: &'a str,
}

/// Top navigation, theme button, progress bar and footer.
pub fn draw_chrome(
    ui: &egui::Ui,
    rect: Rect,
    scale: f32,
    chrome: &Chrome<'_>,
    icons: &mut IconRenderer,
) -> ChromeResponse {
    let palette = chrome.palette;
    let painter = ui.painter();
    let mut response = ChromeResponse::default();

    // Progress bar along the top edge.
    let fill = chrome.timeline.pose(Target::ProgressFill);
    let track = Rect::from_min_size(rect.min, vec2(rect.width(), PROGRESS_HEIGHT * scale));
    painter.rect_filled(track, 0.0, Palette::with_opacity(palette.muted, 0.15));
    let filled = Rect::from_min_size(
        rect.min,
        vec2(rect.width() * fill.width.clamp(0.0, 1.0), PROGRESS_HEIGHT * scale),
    );
    painter.rect_filled(filled, 0.0, palette.accent);

    // Top navigation: slides in from above, hidden on the first slide.
    let nav = chrome.timeline.pose(Target::TopNav);
    if nav.opacity > 0.01 {
        let bar = Rect::from_min_size(
            pos2(rect.left(), rect.top() + PROGRESS_HEIGHT * scale + nav.y * scale),
            vec2(rect.width(), TOP_NAV_HEIGHT * scale),
        );
        let text_y = bar.center().y;

        if let Some(title) = chrome.title {
            let color = Palette::with_opacity(palette.heading, nav.opacity);
            let galley =
                painter.layout_no_wrap(title.to_string(), FontId::proportional(22.0 * scale), color);
            let pos = pos2(bar.left() + 40.0 * scale, text_y - galley.size().y / 2.0);
            painter.galley(pos, galley, color);
        }

        let counter = format!("{} / {:02}", chrome.index_label, chrome.total);
        let color = Palette::with_opacity(palette.muted, nav.opacity);
        let galley = painter.layout_no_wrap(counter, FontId::monospace(18.0 * scale), color);
        let counter_pos = pos2(
            bar.right() - 120.0 * scale - galley.size().x,
            text_y - galley.size().y / 2.0,
        );
        painter.galley(counter_pos, galley, color);

        let dot_gap = 22.0 * scale;
        let dots_width = dot_gap * (chrome.total.saturating_sub(1)) as f32;
        let first = pos2(bar.center().x - dots_width / 2.0, text_y);
        for i in 0..chrome.total {
            let center = first + vec2(dot_gap * i as f32, 0.0);
            let active = i == chrome.current;
            let radius = if active { 6.0 } else { 4.0 } * scale;
            let color = if active { palette.accent } else { palette.muted };
            painter.circle_filled(center, radius, Palette::with_opacity(color, nav.opacity));

            if chrome.interactive {
                let hit = Rect::from_center_size(center, vec2(dot_gap, dot_gap));
                let dot = ui.interact(hit, ui.id().with(("dot", i)), Sense::click());
                if dot.clicked() {
                    response.dot_clicked = Some(i);
                }
                dot.on_hover_cursor(CursorIcon::PointingHand);
            }
        }
    }

    // Theme button, always reachable.
    let button = chrome.timeline.pose(Target::ThemeButton);
    let center = pos2(rect.right() - 48.0 * scale, rect.top() + 44.0 * scale);
    let radius = 22.0 * scale * button.scale;
    let hit = Rect::from_center_size(center, vec2(radius * 2.0, radius * 2.0));
    let theme = ui.interact(hit, ui.id().with("theme"), Sense::click());
    let fill = if theme.hovered() {
        Palette::with_opacity(palette.accent, 0.25)
    } else {
        palette.card_background
    };
    painter.circle_filled(center, radius, fill);
    painter.circle_stroke(center, radius, Stroke::new(1.0 * scale, palette.card_border));
    let glyph = icons.text(chrome.theme_icon).to_string();
    let galley = painter.layout_no_wrap(
        glyph,
        FontId::proportional(20.0 * scale * button.scale),
        palette.foreground,
    );
    painter.galley(center - galley.size() / 2.0, galley, palette.foreground);
    if theme.clicked() {
        response.theme_clicked = true;
    }
    theme.on_hover_cursor(CursorIcon::PointingHand);

    if let Some(footer) = chrome.footer {
        let color = Palette::with_opacity(palette.foreground, 0.4);
        let galley =
            painter.layout_no_wrap(footer.to_string(), FontId::proportional(14.0 * scale), color);
        let pos = pos2(
            rect.center().x - galley.size().x / 2.0,
            rect.bottom() - 30.0 * scale,
        );
        painter.galley(pos, galley, color);
    }

    response
}

/// Short-lived message at the bottom of the screen.
pub struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    const DURATION: f32 = 1.5;
    const FADE_START: f32 = 1.0;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        if elapsed < Self::FADE_START {
            1.0
        } else if elapsed < Self::DURATION {
            1.0 - (elapsed - Self::FADE_START) / (Self::DURATION - Self::FADE_START)
        } else {
            0.0
        }
    }

    pub fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= Self::DURATION
    }

    pub fn draw(&self, painter: &egui::Painter, rect: Rect, palette: &Palette, scale: f32) {
        let opacity = self.opacity();
        if opacity <= 0.0 {
            return;
        }
        let color = Palette::with_opacity(palette.foreground, opacity * 0.9);
        let background = Palette::with_opacity(palette.code_background, opacity * 0.9);
        let galley =
            painter.layout_no_wrap(self.message.clone(), FontId::proportional(20.0 * scale), color);
        let padding = 16.0 * scale;
        let toast_rect = Rect::from_min_size(
            pos2(
                rect.center().x - galley.size().x / 2.0 - padding,
                rect.bottom() - 100.0 * scale,
            ),
            galley.size() + vec2(padding, padding) * 2.0,
        );
        painter.rect_filled(toast_rect, 8.0 * scale, background);
        painter.galley(toast_rect.min + vec2(padding, padding), galley, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_scale() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(960.0, 540.0));
        assert_eq!(compute_scale(rect), 0.5);
        let wide = Rect::from_min_size(pos2(0.0, 0.0), vec2(3840.0, 1080.0));
        assert_eq!(compute_scale(wide), 1.0);
    }

    #[test]
    fn test_toast_starts_opaque() {
        let toast = Toast::new("hello");
        assert_eq!(toast.message(), "hello");
        assert_eq!(toast.opacity(), 1.0);
        assert!(!toast.is_expired());
    }
}
