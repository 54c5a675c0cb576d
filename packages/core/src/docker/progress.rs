//! Pull progress display
//!
//! Spinners and per-layer byte bars drawn on stderr while an image is
//! pulled, so they never mix with the container output on stdout.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Progress reporter for image pulls
///
/// Tracks one spinner for the overall pull and one bar per layer, keyed by
/// the layer ID the daemon reports.
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: HashMap<String, ProgressBar>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    /// Draw to stderr (indicatif hides output when stderr is not a terminal)
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Never draw anything
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: HashMap::new(),
        }
    }

    /// Add a spinner for a step without a known size
    pub fn add_spinner(&mut self, id: &str, message: &str) -> &ProgressBar {
        let spinner = self.multi.add(ProgressBar::new_spinner());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("valid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(TICK);
        self.insert(id, spinner)
    }

    /// Add a byte bar for a layer download of `total` bytes
    pub fn add_bar(&mut self, id: &str, total: u64) -> &ProgressBar {
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .expect("valid template")
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(TICK);
        self.insert(id, bar)
    }

    fn insert(&mut self, id: &str, bar: ProgressBar) -> &ProgressBar {
        self.bars.insert(id.to_string(), bar);
        &self.bars[id]
    }

    /// Update a layer's byte progress, creating its bar on first sight
    pub fn update_layer(&mut self, layer_id: &str, current: u64, total: u64, status: &str) {
        if !self.bars.contains_key(layer_id) {
            self.add_bar(layer_id, total);
        }
        let bar = &self.bars[layer_id];
        if bar.length() != Some(total) {
            bar.set_length(total);
        }
        bar.set_position(current);
        bar.set_message(status.to_string());
    }

    /// Update a spinner message, creating the spinner on first sight
    pub fn update_spinner(&mut self, id: &str, message: &str) {
        match self.bars.get(id) {
            Some(spinner) => spinner.set_message(message.to_string()),
            None => {
                self.add_spinner(id, message);
            }
        }
    }

    /// Mark one layer or step as complete
    pub fn finish(&mut self, id: &str, message: &str) {
        if let Some(bar) = self.bars.get(id) {
            bar.finish_with_message(message.to_string());
        }
    }

    /// Mark everything as failed
    pub fn abandon_all(&self, message: &str) {
        for bar in self.bars.values() {
            bar.abandon_with_message(message.to_string());
        }
    }
}
