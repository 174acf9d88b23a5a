use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::anim::{Ease, Prop, Signal, Target, Timeline, TweenSpec};
use crate::icons::IconRenderer;

/// Idle label of a copy button.
pub const COPY_LABEL: &str = ":copy: Copy";
/// Label shown after a successful copy.
pub const COPIED_LABEL: &str = ":check: Copied!";
/// Seconds before the confirmation reverts.
pub const REVERT_DELAY: f32 = 3.0;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Destination for copied text.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CopyError>;
}

/// The system clipboard.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                warn!("Failed to access clipboard: {e}");
                None
            }
        };
        Self { inner }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CopyError> {
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| CopyError::Clipboard("no clipboard available".to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| CopyError::Clipboard(e.to_string()))
    }
}

/// Labels of the copy buttons, keyed by the slide holding the code block.
#[derive(Debug, Default)]
pub struct CopyButtons {
    confirmed: HashMap<usize, u32>,
}

impl CopyButtons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw label (with icon placeholders) for the button on `slide`.
    pub fn label(&self, slide: usize) -> &'static str {
        if self.confirmed.contains_key(&slide) {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }

    pub fn is_confirming(&self, slide: usize) -> bool {
        self.confirmed.contains_key(&slide)
    }

    /// Copy `code` and show the confirmation until the revert signal arrives.
    ///
    /// On failure nothing changes and the error is returned for reporting.
    pub fn copy(
        &mut self,
        slide: usize,
        code: &str,
        clipboard: &mut dyn Clipboard,
        timeline: &mut Timeline,
        icons: &mut IconRenderer,
    ) -> Result<(), CopyError> {
        clipboard.write_text(code)?;
        debug!(slide, chars = code.chars().count(), "code copied");

        // Repeated copies extend the confirmation: only the latest revert counts.
        *self.confirmed.entry(slide).or_insert(0) += 1;
        timeline.from_to(
            Target::CopyButton(slide),
            &[(Prop::Scale, 1.2)],
            &[(Prop::Scale, 1.0)],
            TweenSpec::new(0.3).ease(Ease::back_out()),
        );
        timeline.delayed_call(REVERT_DELAY, Signal::CopyReverted(slide));
        icons.refresh();
        Ok(())
    }

    /// Apply a revert signal. Returns false for signals meant elsewhere.
    pub fn handle(&mut self, signal: Signal, icons: &mut IconRenderer) -> bool {
        let Signal::CopyReverted(slide) = signal else {
            return false;
        };
        if let Some(pending) = self.confirmed.get_mut(&slide) {
            *pending -= 1;
            if *pending == 0 {
                self.confirmed.remove(&slide);
                icons.refresh();
            }
        }
        true
    }
}
