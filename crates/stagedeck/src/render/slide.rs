use eframe::egui::{
    self, Color32, CursorIcon, FontFamily, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Vec2,
    pos2, text::LayoutJob, vec2,
};

use crate::anim::{Pose, SplashPart, Target, Timeline};
use crate::copy::CopyButtons;
use crate::deck::{Card, CodeBlock, ElementKind, SlideSpec};
use crate::icons::IconRenderer;
use crate::theme::Palette;

use super::syntax::{Highlighter, sized};

const PADDING: f32 = 120.0;
const TITLE_SIZE: f32 = 72.0;
const SPLASH_TITLE_SIZE: f32 = 110.0;
const SUBTITLE_SIZE: f32 = 32.0;
const BADGE_SIZE: f32 = 20.0;
const TAGLINE_SIZE: f32 = 26.0;
const CARD_TITLE_SIZE: f32 = 28.0;
const CARD_BODY_SIZE: f32 = 20.0;
const CODE_SIZE: f32 = 20.0;
const BUTTON_SIZE: f32 = 24.0;
const GAP: f32 = 28.0;
/// Fraction a slide shrinks at 90 degrees of rotation, faking perspective.
const DEPTH: f32 = 0.3;

/// Everything a slide needs to draw itself.
pub struct SlideContext<'a> {
    pub palette: &'a Palette,
    pub timeline: &'a Timeline,
    pub icons: &'a mut IconRenderer,
    pub highlighter: &'a mut Highlighter,
    pub copy: &'a CopyButtons,
    pub scale: f32,
    /// Only the settled current slide accepts clicks.
    pub interactive: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SlideResponse {
    pub copy_clicked: bool,
    pub cta_clicked: bool,
}

/// Draw slide `index` in `rect` using its animated pose.
pub fn draw_slide(
    ui: &egui::Ui,
    rect: Rect,
    index: usize,
    spec: &SlideSpec,
    cx: &mut SlideContext<'_>,
) -> SlideResponse {
    let slide_pose = cx.timeline.pose(Target::Slide(index));
    if slide_pose.opacity < 0.01 {
        return SlideResponse::default();
    }

    let depth = 1.0 - slide_pose.rotate_y.to_radians().sin().abs() * DEPTH;
    let content_rect = Rect::from_center_size(
        rect.center() + vec2(slide_pose.x * cx.scale, slide_pose.y * cx.scale),
        rect.size() * depth,
    );
    let mut view = SlideView {
        ui,
        cx,
        slide: index,
        slide_pose,
        s: depth,
        elements: spec.elements(),
        response: SlideResponse::default(),
    };
    view.s *= view.cx.scale;

    if spec.splash {
        view.splash(content_rect, spec);
    } else {
        view.standard(content_rect, spec);
    }
    view.response
}

struct SlideView<'u, 'c, 'a> {
    ui: &'u egui::Ui,
    cx: &'c mut SlideContext<'a>,
    slide: usize,
    slide_pose: Pose,
    /// Effective scale: viewport scale times perspective depth.
    s: f32,
    elements: Vec<ElementKind>,
    response: SlideResponse,
}

impl SlideView<'_, '_, '_> {
    fn pose_of(&self, kind: ElementKind) -> Pose {
        match self.elements.iter().position(|&k| k == kind) {
            Some(index) => self
                .cx
                .timeline
                .pose(Target::Element {
                    slide: self.slide,
                    index,
                })
                .within(self.slide_pose),
            None => self.slide_pose,
        }
    }

    fn color(&self, color: Color32, pose: Pose) -> Color32 {
        Palette::with_opacity(color, pose.opacity)
    }

    /// Lay out `raw` (icons expanded) at the pose's scale.
    fn job(
        &mut self,
        raw: &str,
        size: f32,
        family: FontFamily,
        color: Color32,
        wrap: f32,
        pose: Pose,
    ) -> LayoutJob {
        let text = self.cx.icons.text(raw).to_string();
        let mut job = LayoutJob::simple(
            text,
            FontId::new(size * self.s * pose.scale, family),
            self.color(color, pose),
            wrap,
        );
        for section in &mut job.sections {
            section.format.extra_letter_spacing = pose.spacing * self.s;
        }
        job
    }

    /// Draw text whose resting top-left is `at`. Returns the resting rect.
    fn text(
        &mut self,
        raw: &str,
        size: f32,
        family: FontFamily,
        color: Color32,
        at: Pos2,
        wrap: f32,
        pose: Pose,
    ) -> Rect {
        let rest = Pose {
            scale: 1.0,
            spacing: 0.0,
            ..pose
        };
        let rest_job = self.job(raw, size, family.clone(), color, wrap, rest);
        let rest_size = self.ui.painter().layout_job(rest_job).size();
        let rest_rect = Rect::from_min_size(at, rest_size);

        let job = self.job(raw, size, family, color, wrap, pose);
        let galley = self.ui.painter().layout_job(job);
        let center = rest_rect.center() + vec2(pose.x, pose.y) * self.s;
        let pos = center - galley.size() / 2.0;
        self.ui.painter().galley(pos, galley, color);
        rest_rect
    }

    /// Rect `rest` moved and scaled by an element pose.
    fn posed(&self, rest: Rect, pose: Pose) -> Rect {
        Rect::from_center_size(
            rest.center() + vec2(pose.x, pose.y) * self.s,
            rest.size() * pose.scale,
        )
    }

    fn splash(&mut self, rect: Rect, spec: &SlideSpec) {
        let palette = self.cx.palette.clone();
        let s = self.s;
        let mut y = rect.top() + rect.height() * 0.2;

        if let Some(logo) = spec.logo.as_deref() {
            let logo_pose = self
                .cx
                .timeline
                .pose(Target::Splash(SplashPart::Logo))
                .within(self.slide_pose);
            let spin = self.cx.timeline.pose(Target::Splash(SplashPart::LogoIcon));
            let radius = 70.0 * s * logo_pose.scale;
            let center = pos2(rect.center().x, y + 70.0 * s);
            self.ui.painter().circle_filled(
                center,
                radius,
                Palette::with_opacity(palette.accent, 0.15 * logo_pose.opacity),
            );
            self.ui.painter().circle_stroke(
                center,
                radius,
                Stroke::new(2.0 * s, self.color(palette.accent, logo_pose)),
            );
            // Spinning glyph: fake the Y rotation by squashing its size.
            let squash = spin.rotate_y.to_radians().cos().abs().max(0.05);
            let glyph = format!(":{logo}:");
            let job = self.job(
                &glyph,
                64.0 * squash,
                FontFamily::Proportional,
                palette.accent,
                f32::INFINITY,
                logo_pose,
            );
            let galley = self.ui.painter().layout_job(job);
            self.ui
                .painter()
                .galley(center - galley.size() / 2.0, galley, palette.accent);
            y += 170.0 * s;
        }

        if let Some(title) = spec.title.as_deref() {
            let pose = self.pose_of(ElementKind::Title);
            y = self.centered(title, SPLASH_TITLE_SIZE, palette.heading, rect, y, pose) + 8.0 * s;
        }
        if let Some(subtitle) = spec.subtitle.as_deref() {
            let pose = self.pose_of(ElementKind::Subtitle);
            y = self.centered(subtitle, SUBTITLE_SIZE, palette.accent, rect, y, pose) + GAP * s;
        }
        for (i, badge) in spec.badges.iter().enumerate() {
            let pose = self.pose_of(ElementKind::Badge(i));
            y = self.centered(badge, TAGLINE_SIZE, palette.muted, rect, y, pose) + 8.0 * s;
        }

        let line = self
            .cx
            .timeline
            .pose(Target::Splash(SplashPart::LoadingLine))
            .within(self.slide_pose);
        let full = 320.0 * s;
        let line_rect = Rect::from_center_size(
            pos2(rect.center().x, y + 16.0 * s),
            vec2(full * line.width, 3.0 * s),
        );
        self.ui
            .painter()
            .rect_filled(line_rect, 2.0 * s, self.color(palette.accent, line));
        y += 48.0 * s;

        if let Some(cta) = spec.cta.as_deref() {
            let pose = self.pose_of(ElementKind::Cta);
            let width = 280.0 * s;
            let at = pos2(rect.center().x - width / 2.0, y);
            self.button(cta, at, width, pose);
        }
    }

    fn centered(
        &mut self,
        raw: &str,
        size: f32,
        color: Color32,
        rect: Rect,
        y: f32,
        pose: Pose,
    ) -> f32 {
        let rest = Pose {
            scale: 1.0,
            spacing: 0.0,
            ..pose
        };
        let job = self.job(raw, size, FontFamily::Proportional, color, rect.width(), rest);
        let width = self.ui.painter().layout_job(job).size().x;
        let at = pos2(rect.center().x - width / 2.0, y);
        self.text(raw, size, FontFamily::Proportional, color, at, rect.width(), pose)
            .bottom()
    }

    fn standard(&mut self, rect: Rect, spec: &SlideSpec) {
        let palette = self.cx.palette.clone();
        let s = self.s;
        let inner = rect.shrink(PADDING * s);
        let mut y = inner.top() + 20.0 * s;

        if let Some(title) = spec.title.as_deref() {
            let pose = self.pose_of(ElementKind::Title);
            let at = pos2(inner.left(), y);
            y = self
                .text(title, TITLE_SIZE, FontFamily::Proportional, palette.heading, at, inner.width(), pose)
                .bottom()
                + 8.0 * s;
        }
        if let Some(subtitle) = spec.subtitle.as_deref() {
            let pose = self.pose_of(ElementKind::Subtitle);
            let at = pos2(inner.left(), y);
            y = self
                .text(subtitle, SUBTITLE_SIZE, FontFamily::Proportional, palette.muted, at, inner.width(), pose)
                .bottom()
                + GAP * s;
        }

        if !spec.badges.is_empty() {
            let mut x = inner.left();
            let mut row_bottom = y;
            for (i, badge) in spec.badges.iter().enumerate() {
                let pose = self.pose_of(ElementKind::Badge(i));
                let rest = self.badge(badge, pos2(x, y), pose);
                x = rest.right() + 12.0 * s;
                row_bottom = row_bottom.max(rest.bottom());
            }
            y = row_bottom + GAP * s;
        }

        let content = Rect::from_min_max(pos2(inner.left(), y), pos2(inner.right(), inner.bottom()));
        let cta_height = if spec.cta.is_some() { 80.0 * s } else { 0.0 };
        let content = Rect::from_min_max(content.min, pos2(content.right(), content.bottom() - cta_height));

        match (&spec.code, spec.cards.is_empty()) {
            (Some(code), false) => {
                let split = content.left() + content.width() * 0.45;
                let left = Rect::from_min_max(content.min, pos2(split - GAP * s / 2.0, content.bottom()));
                let right = Rect::from_min_max(pos2(split + GAP * s / 2.0, content.top()), content.max);
                self.card_column(&spec.cards, left);
                self.code_window(code, right.min, right.width());
            }
            (Some(code), true) => {
                let width = content.width() * 0.75;
                self.code_window(code, content.min, width);
            }
            (None, false) => self.card_row(&spec.cards, content),
            (None, true) => {}
        }

        if let Some(cta) = spec.cta.as_deref() {
            let pose = self.pose_of(ElementKind::Cta);
            let at = pos2(inner.left(), inner.bottom() - 64.0 * s);
            self.button(cta, at, 300.0 * s, pose);
        }
    }

    fn badge(&mut self, raw: &str, at: Pos2, pose: Pose) -> Rect {
        let palette = self.cx.palette.clone();
        let s = self.s;
        let pad = vec2(14.0, 6.0) * s;
        let rest_job = self.job(
            raw,
            BADGE_SIZE,
            FontFamily::Proportional,
            palette.accent,
            f32::INFINITY,
            Pose { scale: 1.0, ..pose },
        );
        let text_size = self.ui.painter().layout_job(rest_job).size();
        let rest = Rect::from_min_size(at, text_size + pad * 2.0);
        let drawn = self.posed(rest, pose);
        self.ui.painter().rect_filled(
            drawn,
            drawn.height() / 2.0,
            Palette::with_opacity(palette.accent, 0.12 * pose.opacity),
        );
        self.ui.painter().rect_stroke(
            drawn,
            drawn.height() / 2.0,
            Stroke::new(1.0 * s, Palette::with_opacity(palette.accent, 0.4 * pose.opacity)),
            StrokeKind::Inside,
        );
        let job = self.job(raw, BADGE_SIZE, FontFamily::Proportional, palette.accent, f32::INFINITY, pose);
        let galley = self.ui.painter().layout_job(job);
        self.ui
            .painter()
            .galley(drawn.center() - galley.size() / 2.0, galley, palette.accent);
        rest
    }

    fn button(&mut self, raw: &str, at: Pos2, width: f32, pose: Pose) -> Rect {
        let palette = self.cx.palette.clone();
        let s = self.s;
        let rest = Rect::from_min_size(at, vec2(width, 60.0 * s));
        let drawn = self.posed(rest, pose);

        let response = self
            .ui
            .interact(drawn, self.ui.id().with(("cta", self.slide)), Sense::click());
        let hovered = self.cx.interactive && response.hovered();
        let fill = if hovered { palette.accent_alt } else { palette.accent };
        self.ui
            .painter()
            .rect_filled(drawn, 12.0 * s, self.color(fill, pose));
        let job = self.job(raw, BUTTON_SIZE, FontFamily::Proportional, Color32::WHITE, f32::INFINITY, pose);
        let galley = self.ui.painter().layout_job(job);
        self.ui
            .painter()
            .galley(drawn.center() - galley.size() / 2.0, galley, Color32::WHITE);

        if self.cx.interactive {
            if response.clicked() {
                self.response.cta_clicked = true;
            }
            response.on_hover_cursor(CursorIcon::PointingHand);
        }
        rest
    }

    fn card_row(&mut self, cards: &[Card], area: Rect) {
        let s = self.s;
        let per_row = cards.len().clamp(1, 3);
        let width = (area.width() - GAP * s * (per_row as f32 - 1.0)) / per_row as f32;
        let mut y = area.top();
        for row in cards.chunks(per_row).enumerate() {
            let (row_index, row_cards) = row;
            let mut bottom = y;
            for (col, card) in row_cards.iter().enumerate() {
                let index = row_index * per_row + col;
                let at = pos2(area.left() + col as f32 * (width + GAP * s), y);
                bottom = bottom.max(self.card(index, card, at, width).bottom());
            }
            y = bottom + GAP * s;
        }
    }

    fn card_column(&mut self, cards: &[Card], area: Rect) {
        let mut y = area.top();
        for (index, card) in cards.iter().enumerate() {
            y = self.card(index, card, pos2(area.left(), y), area.width()).bottom() + GAP * self.s * 0.6;
        }
    }

    /// Shadow offset and extra scale for a tilted card.
    fn tilt(&self, pose: Pose) -> (Vec2, f32) {
        let shadow = vec2(-pose.rotate_y, pose.rotate_x) * 1.2 * self.s;
        let lift = 1.0 + (pose.rotate_x.abs() + pose.rotate_y.abs()) * 0.002;
        (shadow, lift)
    }

    fn card(&mut self, index: usize, card: &Card, at: Pos2, width: f32) -> Rect {
        let palette = self.cx.palette.clone();
        let s = self.s;
        let pose = self.pose_of(ElementKind::Card(index));
        let pad = 28.0 * s;
        let inner_width = width - pad * 2.0;

        let rest_pose = Pose { scale: 1.0, ..pose };
        let body_job = self.job(&card.body, CARD_BODY_SIZE, FontFamily::Proportional, palette.foreground, inner_width, rest_pose);
        let body_height = self.ui.painter().layout_job(body_job).size().y;
        let icon_height = if card.icon.is_some() { 52.0 * s } else { 0.0 };
        let height = pad * 2.0 + icon_height + CARD_TITLE_SIZE * 1.3 * s + 10.0 * s + body_height;
        let rest = Rect::from_min_size(at, vec2(width, height));

        let (shadow, lift) = self.tilt(pose);
        let drawn = self.posed(rest, Pose { scale: pose.scale * lift, ..pose });
        self.ui.painter().rect_filled(
            drawn.translate(shadow + vec2(0.0, 8.0 * s)),
            18.0 * s,
            Color32::from_black_alpha((40.0 * pose.opacity) as u8),
        );
        self.ui
            .painter()
            .rect_filled(drawn, 18.0 * s, self.color(palette.card_background, pose));
        self.ui.painter().rect_stroke(
            drawn,
            18.0 * s,
            Stroke::new(1.0 * s, self.color(palette.card_border, pose)),
            StrokeKind::Inside,
        );

        let k = drawn.width() / rest.width();
        let mut y = drawn.top() + pad * k;
        let left = drawn.left() + pad * k;
        let content_pose = Pose { x: 0.0, y: 0.0, ..pose };
        if let Some(icon) = card.icon.as_deref() {
            let glyph = format!(":{icon}:");
            let job = self.job(&glyph, 32.0, FontFamily::Proportional, palette.accent, f32::INFINITY, content_pose);
            let galley = self.ui.painter().layout_job(job);
            self.ui.painter().galley(pos2(left, y), galley, palette.accent);
            y += icon_height * k;
        }
        let title_job = self.job(&card.title, CARD_TITLE_SIZE, FontFamily::Proportional, palette.heading, inner_width * k, content_pose);
        let title = self.ui.painter().layout_job(title_job);
        let title_height = title.size().y;
        self.ui.painter().galley(pos2(left, y), title, palette.heading);
        y += title_height + 10.0 * s * k;
        let body_job = self.job(&card.body, CARD_BODY_SIZE, FontFamily::Proportional, palette.foreground, inner_width * k, content_pose);
        let body = self.ui.painter().layout_job(body_job);
        self.ui.painter().galley(pos2(left, y), body, palette.foreground);
        rest
    }

    fn code_window(&mut self, code: &CodeBlock, at: Pos2, width: f32) -> Rect {
        let palette = self.cx.palette.clone();
        let s = self.s;
        let pose = self.pose_of(ElementKind::Code);
        let pad = 24.0 * s;
        let header = 52.0 * s;

        let base = self.cx.highlighter.job(
            &code.code,
            code.language.as_deref(),
            palette.syntect_theme_name(),
            palette.code_foreground,
        );
        let rest_code = self
            .ui
            .painter()
            .layout_job(sized(base.clone(), CODE_SIZE * s, width - pad * 2.0));
        let rest = Rect::from_min_size(at, vec2(width, header + pad * 2.0 + rest_code.size().y));

        let (shadow, lift) = self.tilt(pose);
        let drawn = self.posed(rest, Pose { scale: pose.scale * lift, ..pose });
        let k = drawn.width() / rest.width();
        self.ui.painter().rect_filled(
            drawn.translate(shadow + vec2(0.0, 10.0 * s)),
            16.0 * s,
            Color32::from_black_alpha((50.0 * pose.opacity) as u8),
        );
        self.ui
            .painter()
            .rect_filled(drawn, 16.0 * s, self.color(palette.code_background, pose));
        self.ui.painter().rect_stroke(
            drawn,
            16.0 * s,
            Stroke::new(1.0 * s, self.color(palette.card_border, pose)),
            StrokeKind::Inside,
        );

        // Window dots and filename.
        let header_y = drawn.top() + header * k / 2.0;
        for (i, color) in [
            Color32::from_rgb(0xFF, 0x5F, 0x57),
            Color32::from_rgb(0xFE, 0xBC, 0x2E),
            Color32::from_rgb(0x28, 0xC8, 0x40),
        ]
        .into_iter()
        .enumerate()
        {
            let center = pos2(drawn.left() + (22.0 + i as f32 * 20.0) * s * k, header_y);
            self.ui
                .painter()
                .circle_filled(center, 6.0 * s * k, self.color(color, pose));
        }
        let content_pose = Pose { x: 0.0, y: 0.0, ..pose };
        if let Some(name) = code.filename.as_deref() {
            let job = self.job(name, 16.0, FontFamily::Monospace, palette.muted, f32::INFINITY, content_pose);
            let galley = self.ui.painter().layout_job(job);
            let pos = pos2(drawn.center().x - galley.size().x / 2.0, header_y - galley.size().y / 2.0);
            self.ui.painter().galley(pos, galley, palette.muted);
        }
        self.copy_button(drawn, header_y, k, content_pose);

        let mut job = sized(base, CODE_SIZE * s * k, (width - pad * 2.0) * k);
        for section in &mut job.sections {
            section.format.color = Palette::with_opacity(section.format.color, pose.opacity);
        }
        let galley = self.ui.painter().layout_job(job);
        self.ui.painter().galley(
            pos2(drawn.left() + pad * k, drawn.top() + (header + pad) * k),
            galley,
            palette.code_foreground,
        );
        rest
    }

    fn copy_button(&mut self, window: Rect, center_y: f32, k: f32, pose: Pose) {
        let palette = self.cx.palette.clone();
        let s = self.s;
        let button_pose = self
            .cx
            .timeline
            .pose(Target::CopyButton(self.slide));
        let label = self.cx.copy.label(self.slide);
        let pose = Pose {
            scale: pose.scale * button_pose.scale,
            ..pose
        };
        let job = self.job(label, 15.0, FontFamily::Proportional, palette.foreground, f32::INFINITY, pose);
        let galley = self.ui.painter().layout_job(job);
        let size = galley.size() + vec2(24.0, 10.0) * s * k;
        let rect = Rect::from_center_size(
            pos2(window.right() - 16.0 * s * k - size.x / 2.0, center_y),
            size,
        );
        let response = self
            .ui
            .interact(rect, self.ui.id().with(("copy", self.slide)), Sense::click());
        let hovered = self.cx.interactive && response.hovered();
        let fill = if self.cx.copy.is_confirming(self.slide) {
            Palette::with_opacity(palette.accent, 0.35 * pose.opacity)
        } else if hovered {
            Palette::with_opacity(palette.accent, 0.25 * pose.opacity)
        } else {
            Palette::with_opacity(palette.card_border, pose.opacity)
        };
        self.ui.painter().rect_filled(rect, 8.0 * s, fill);
        self.ui
            .painter()
            .galley(rect.center() - galley.size() / 2.0, galley, palette.foreground);

        if self.cx.interactive {
            if response.clicked() {
                self.response.copy_clicked = true;
            }
            response.on_hover_cursor(CursorIcon::PointingHand);
        }
    }
}
