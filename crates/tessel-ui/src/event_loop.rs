// SPDX-License-Identifier: MIT
//
// The four-stage event loop.
//
//   Init ──▶ Input ──▶ Draw ──▶ Render ──┐
//              ▲                          │
//              └──────────────────────────┘
//
// Init acquires the terminal once. Input hands a real event to the app;
// Draw clears the grid and hands over the synthetic Draw event; Render
// diffs the grid to the terminal, swaps generations, then blocks for the
// next event. Timeouts and resizes come back as Draw events, which skip
// the Input hand-off, so every real input yields exactly two app calls
// and everything else yields one.
//
// The terminal is left when `run` returns and again, idempotently, when
// the loop is dropped.

use std::io;
use std::time::{Duration, Instant};

use tessel_term::input::{MAX_KEY_TEXT, decode};
use tessel_term::{DiffRenderer, Driver, Event, RenderStats, Result, Size, Wake};

use crate::ui::Ui;

// ─── App ────────────────────────────────────────────────────────────────────

/// What the app wants after a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Per-frame application logic.
pub trait App {
    /// Called once per hand-off with the context holding the current
    /// event.
    fn frame(&mut self, ui: &mut Ui) -> Action;
}

impl<F: FnMut(&mut Ui) -> Action> App for F {
    fn frame(&mut self, ui: &mut Ui) -> Action {
        self(ui)
    }
}

// ─── Config ─────────────────────────────────────────────────────────────────

/// Event loop configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    /// Redraws per second without input; `0.0` waits for input.
    pub fps: f32,
}

impl LoopConfig {
    /// How long to wait for input before redrawing anyway. `None` blocks
    /// until input arrives.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn timeout(&self) -> Option<Duration> {
        if self.fps.is_nan() || self.fps <= 0.0 {
            return None;
        }
        let ms = (1000.0 / self.fps) as u64;
        (ms > 0).then(|| Duration::from_millis(ms))
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { fps: 0.0 }
    }
}

// ─── Event Loop ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    Input,
    Draw,
    Render,
    Closed,
}

/// Drives a [`Ui`] against a terminal [`Driver`].
pub struct EventLoop<D: Driver> {
    driver: D,
    ui: Ui,
    renderer: DiffRenderer,
    config: LoopConfig,
    stage: Stage,
    pending: Event,
    entered: bool,
    input: [u8; MAX_KEY_TEXT],
    frame_started: Instant,
    render_time: Duration,
    frame_count: u64,
    last_stats: RenderStats,
}

impl<D: Driver> EventLoop<D> {
    /// A loop over `driver`. The terminal is not touched until the first
    /// [`advance`](Self::advance).
    pub fn new(driver: D, config: LoopConfig) -> Self {
        Self::with_ui(driver, config, Ui::new())
    }

    /// A loop using a caller-built `ui`, e.g. one with a smaller cell
    /// capacity.
    pub fn with_ui(driver: D, config: LoopConfig, ui: Ui) -> Self {
        Self {
            driver,
            ui,
            renderer: DiffRenderer::new(),
            config,
            stage: Stage::Init,
            pending: Event::Draw,
            entered: false,
            input: [0; MAX_KEY_TEXT],
            frame_started: Instant::now(),
            render_time: Duration::ZERO,
            frame_count: 0,
            last_stats: RenderStats::default(),
        }
    }

    /// The UI context.
    #[inline]
    pub const fn ui(&mut self) -> &mut Ui {
        &mut self.ui
    }

    /// The driver.
    #[inline]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Frames rendered so far.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Time from the start of the last input stage to the end of its
    /// frame write.
    #[inline]
    #[must_use]
    pub const fn render_time(&self) -> Duration {
        self.render_time
    }

    /// Statistics of the last rendered frame.
    #[inline]
    #[must_use]
    pub const fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Run the stages up to the next app hand-off.
    ///
    /// Returns `true` when the app should be called with [`ui`](Self::ui),
    /// `false` once input has closed.
    ///
    /// # Errors
    ///
    /// Fails if the terminal cannot be entered or input cannot be read.
    pub fn advance(&mut self) -> Result<bool> {
        loop {
            match self.stage {
                Stage::Init => {
                    self.driver.enter()?;
                    self.entered = true;
                    self.sync_size();
                    self.stage = Stage::Input;
                }
                Stage::Input => {
                    self.frame_started = Instant::now();
                    self.stage = Stage::Draw;
                    if self.pending != Event::Draw {
                        self.ui.begin_input(self.pending);
                        return Ok(true);
                    }
                }
                Stage::Draw => {
                    self.ui.begin_draw();
                    self.stage = Stage::Render;
                    return Ok(true);
                }
                Stage::Render => {
                    self.render();
                    match self.next_event()? {
                        Some(event) => {
                            self.pending = event;
                            self.stage = Stage::Input;
                        }
                        None => {
                            self.stage = Stage::Closed;
                            return Ok(false);
                        }
                    }
                }
                Stage::Closed => return Ok(false),
            }
        }
    }

    /// Call `app` at every hand-off until it quits or input closes, then
    /// restore the terminal.
    ///
    /// # Errors
    ///
    /// Fails if the terminal cannot be entered, read or restored.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        while self.advance()? {
            if app.frame(&mut self.ui) == Action::Quit {
                break;
            }
        }
        self.leave()?;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Fails if the restore sequence cannot be written.
    pub fn leave(&mut self) -> io::Result<()> {
        if self.entered {
            self.entered = false;
            self.driver.leave()?;
        }
        Ok(())
    }

    /// Follow the terminal size. A failed query keeps the current size,
    /// or the fallback if there is none yet.
    fn sync_size(&mut self) {
        let size = match self.driver.size() {
            Some(size) => size,
            None if self.ui.size() == (0, 0) => Size::FALLBACK,
            None => return,
        };
        self.ui.resize(size.cols, size.rows);
    }

    fn render(&mut self) {
        self.last_stats = self.renderer.render(self.ui.cells());
        if let Err(err) = self.driver.write(self.renderer.output_bytes()) {
            tracing::warn!(%err, "frame write failed");
        }
        self.ui.cells_mut().swap();
        self.render_time = self.frame_started.elapsed();
        self.frame_count += 1;
    }

    /// Block until something worth a hand-off happens. `None` when input
    /// has closed.
    fn next_event(&mut self) -> Result<Option<Event>> {
        let timeout = self.config.timeout();
        loop {
            match self.driver.wait(timeout, &mut self.input) {
                Ok(Wake::Timeout) => return Ok(Some(Event::Draw)),
                Ok(Wake::Resize) => {
                    self.sync_size();
                    return Ok(Some(Event::Draw));
                }
                Ok(Wake::Input(n)) => {
                    let read = &self.input[..n.min(MAX_KEY_TEXT)];
                    if let Some(event) = decode(read) {
                        return Ok(Some(event));
                    }
                }
                Ok(Wake::Closed) => {
                    tracing::debug!("input closed");
                    return Ok(None);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl<D: Driver> Drop for EventLoop<D> {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
