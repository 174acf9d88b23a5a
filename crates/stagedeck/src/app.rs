use eframe::egui;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::anim::{Signal, Target, Timeline};
use crate::config::Config;
use crate::controller::{NavError, NavOutcome, PresentationController};
use crate::copy::{CopyButtons, SystemClipboard};
use crate::deck::Deck;
use crate::icons::IconRenderer;
use crate::parallax::Parallax;
use crate::prefs::{FileStore, MemoryStore, PreferenceStore};
use crate::render::{self, Chrome, Highlighter, SlideContext, Toast};
use crate::splash;
use crate::theme::{Palette, ThemePreference, ThemeToggle};

/// Seconds within which a second Esc quits.
const ESC_DOUBLE_TAP: f32 = 1.0;

/// User intents gathered during input handling, applied afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Advance,
    Retreat,
    Jump(usize),
    ToggleTheme,
    Copy(usize),
}

/// Navigation and theme bindings. Window keys (Q, F, Esc) are handled
/// directly in the update loop.
fn key_action(key: egui::Key, total: usize) -> Option<Action> {
    match key {
        egui::Key::ArrowRight | egui::Key::ArrowDown | egui::Key::Space => Some(Action::Advance),
        egui::Key::ArrowLeft | egui::Key::ArrowUp => Some(Action::Retreat),
        egui::Key::Home => Some(Action::Jump(0)),
        egui::Key::End => Some(Action::Jump(total.saturating_sub(1))),
        egui::Key::D => Some(Action::ToggleTheme),
        _ => None,
    }
}

pub struct StagedeckApp {
    deck: Deck,
    controller: PresentationController,
    timeline: Timeline,
    icons: IconRenderer,
    theme: ThemeToggle,
    palette: Palette,
    prefs: Box<dyn PreferenceStore>,
    parallax: Parallax,
    copy: CopyButtons,
    clipboard: SystemClipboard,
    highlighter: Highlighter,
    toast: Option<Toast>,
    last_esc: Option<Instant>,
    last_rect: egui::Rect,
}

impl StagedeckApp {
    fn new(
        deck: Deck,
        config: &Config,
        start: usize,
        system: Option<ThemePreference>,
    ) -> Result<Self, NavError> {
        let prefs: Box<dyn PreferenceStore> = match FileStore::open_default() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("Preferences unavailable, theme changes won't persist: {e}");
                Box::new(MemoryStore::default())
            }
        };
        let theme = ThemeToggle::init(prefs.as_ref(), config.theme(), system);
        let palette = Palette::for_preference(theme.preference());

        let mut timeline = Timeline::new();
        let controller =
            PresentationController::new(&deck, &config.animation(), start, &mut timeline)?;

        let current = controller.current();
        if deck.slides[current].splash {
            splash::play(current, &controller.slides()[current].elements, &mut timeline);
        }
        info!(slides = deck.slide_count(), start = current + 1, "presentation ready");

        Ok(Self {
            deck,
            controller,
            timeline,
            icons: IconRenderer::new(),
            theme,
            palette,
            prefs,
            parallax: Parallax::new(),
            copy: CopyButtons::new(),
            clipboard: SystemClipboard::new(),
            highlighter: Highlighter::new(),
            toast: None,
            last_esc: None,
            last_rect: egui::Rect::NOTHING,
        })
    }

    fn apply(&mut self, action: Action) {
        let outcome = match action {
            Action::Advance => self.controller.advance(&mut self.timeline, &mut self.icons),
            Action::Retreat => self.controller.retreat(&mut self.timeline, &mut self.icons),
            Action::Jump(index) => {
                match self
                    .controller
                    .jump_to(index, &mut self.timeline, &mut self.icons)
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("{e}");
                        return;
                    }
                }
            }
            Action::ToggleTheme => {
                self.toggle_theme();
                return;
            }
            Action::Copy(slide) => {
                self.copy_code(slide);
                return;
            }
        };
        if outcome.started() {
            debug!(?action, "navigation started");
        } else if let NavOutcome::Ignored(reason) = outcome {
            debug!(?action, ?reason, "navigation ignored");
        }
    }

    fn toggle_theme(&mut self) {
        let result = self.theme.toggle(self.prefs.as_mut(), &mut self.timeline);
        self.palette = Palette::for_preference(self.theme.preference());
        match result {
            Ok(theme) => self.toast = Some(Toast::new(format!("Theme: {theme}"))),
            Err(e) => {
                warn!("Failed to save theme: {e}");
                self.toast = Some(Toast::new("Theme changed but could not be saved"));
            }
        }
    }

    fn copy_code(&mut self, slide: usize) {
        let Some(code) = self.deck.slides.get(slide).and_then(|s| s.code.as_ref()) else {
            return;
        };
        if let Err(e) = self.copy.copy(
            slide,
            &code.code,
            &mut self.clipboard,
            &mut self.timeline,
            &mut self.icons,
        ) {
            warn!("Copy failed: {e}");
            self.toast = Some(Toast::new("Copy failed"));
        }
    }

    fn route(&mut self, signal: Signal) {
        if self.controller.handle(signal) || self.copy.handle(signal, &mut self.icons) {
            return;
        }
        if signal == Signal::SplashFinished {
            debug!("splash finished");
        }
    }

    /// Tilting elements of the slide on screen.
    fn tilt_targets(&self) -> Vec<Target> {
        let slide = self.controller.current();
        self.controller.slides()[slide]
            .elements
            .iter()
            .enumerate()
            .filter(|(_, kind)| kind.tilts())
            .map(|(index, _)| Target::Element { slide, index })
            .collect()
    }

    fn theme_icon(&self) -> &'static str {
        match self.theme.preference() {
            ThemePreference::Dark => ":sun:",
            ThemePreference::Light => ":moon:",
        }
    }
}

impl eframe::App for StagedeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        for signal in self.timeline.tick(now) {
            self.route(signal);
        }

        let total = self.controller.total();
        let mut actions: Vec<Action> = Vec::new();
        let mut pointer: Option<egui::Pos2> = None;

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();

        ctx.input(|i| {
            for event in &i.events {
                if let egui::Event::PointerMoved(pos) = event {
                    pointer = Some(*pos);
                }
            }

            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            if i.key_pressed(egui::Key::Escape) {
                if let Some(last) = self.last_esc {
                    if last.elapsed().as_secs_f32() < ESC_DOUBLE_TAP {
                        viewport_cmds.push(egui::ViewportCommand::Close);
                        return;
                    }
                }
                self.last_esc = Some(Instant::now());
                self.toast = Some(Toast::new("Press Esc again to exit"));
                return;
            }

            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
                return;
            }

            for event in &i.events {
                if let egui::Event::Key {
                    key, pressed: true, ..
                } = event
                {
                    actions.extend(key_action(*key, total));
                }
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        if let Some(pos) = pointer {
            if self.last_rect.is_positive() {
                let cards = self.tilt_targets();
                self.parallax
                    .pointer_moved(pos, self.last_rect, &cards, &mut self.timeline);
            }
        }

        for action in actions.drain(..) {
            self.apply(action);
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        ctx.set_visuals(self.palette.visuals());
        let bg = self.palette.background;
        let theme_icon = self.theme_icon();

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.last_rect = rect;
                let scale = render::compute_scale(rect);

                render::draw_background(ui.painter(), rect, &self.palette, &self.timeline, scale);

                let current = self.controller.current();
                let settled = !self.controller.is_animating();
                for handle in self.controller.slides() {
                    if !handle.visible {
                        continue;
                    }
                    let index = handle.index;
                    let mut cx = SlideContext {
                        palette: &self.palette,
                        timeline: &self.timeline,
                        icons: &mut self.icons,
                        highlighter: &mut self.highlighter,
                        copy: &self.copy,
                        scale,
                        interactive: settled && index == current,
                    };
                    let response =
                        render::draw_slide(ui, rect, index, &self.deck.slides[index], &mut cx);
                    if response.copy_clicked {
                        actions.push(Action::Copy(index));
                    }
                    if response.cta_clicked {
                        actions.push(Action::Advance);
                    }
                }

                let chrome = Chrome {
                    palette: &self.palette,
                    timeline: &self.timeline,
                    title: self.deck.title.as_deref(),
                    footer: self.deck.footer.as_deref(),
                    index_label: self.controller.index_label(),
                    current,
                    total,
                    interactive: self.controller.chrome_interactive(),
                    theme_icon,
                };
                let response = render::draw_chrome(ui, rect, scale, &chrome, &mut self.icons);
                if response.theme_clicked {
                    actions.push(Action::ToggleTheme);
                }
                if let Some(index) = response.dot_clicked {
                    actions.push(Action::Jump(index));
                }

                if let Some(ref toast) = self.toast {
                    toast.draw(ui.painter(), rect, &self.palette, scale);
                }
            });

        for action in actions {
            self.apply(action);
        }

        if !self.timeline.is_idle() || self.toast.is_some() {
            ctx.request_repaint();
        }
    }
}

pub fn run(deck: Deck, windowed: bool, start_slide: Option<usize>) -> anyhow::Result<()> {
    let title = deck
        .title
        .clone()
        .map(|t| format!("stagedeck - {t}"))
        .unwrap_or_else(|| "stagedeck".to_string());

    // CLI flags override config
    let config = Config::load_or_default();
    let defaults = config.defaults.clone().unwrap_or_default();
    let windowed = windowed || defaults.windowed.unwrap_or(false);
    let start = start_slide
        .or(defaults.start_slide)
        .map(|s| s.saturating_sub(1))
        .unwrap_or(0);

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            let system = cc.egui_ctx.system_theme().map(ThemePreference::from);
            let app = StagedeckApp::new(deck, &config, start, system)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
