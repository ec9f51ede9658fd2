// SPDX-License-Identifier: MIT
//
// tessel: a small dialog that exercises the engine.
//
// A centered frame asks for a name, offers a check box and a greeting
// style, and greets on Enter or the Greet button. Escape (when the name
// field does not have focus), Ctrl-C, or the Quit button exits.
//
//   ┌──────────────────────────────────────┐
//   │ What is your name?                   │
//   │ ┌──────────────────────────────────┐ │
//   │ │ Ada                              │ │
//   │ └──────────────────────────────────┘ │
//   │ [x] Shout                            │
//   │ (o) Hello  ( ) Good evening          │
//   │           Hello, Ada.                │
//   │                    ┌───────┐┌──────┐ │
//   │                    │ Greet ││ Quit │ │
//   │                    └───────┘└──────┘ │
//   └──────────────────────────────────────┘
//
// Set TESSEL_LOG (an env-filter directive such as `debug`) to log to
// TESSEL_LOG_FILE, `tessel.log` by default. Logs never go to the screen.

use std::env;
use std::fs::File;
use std::process;
use std::sync::Mutex;

use tessel_ui::{A, Action, App, CheckState, EditState, KeyCode, Ui, colors, far};

// ─── Palette ────────────────────────────────────────────────────────────────

const PANEL: u64 = colors(245, 236, 0);
const TEXT: u64 = colors(252, 236, 0);
const FIELD: u64 = colors(231, 238, 245);
const TOGGLE: u64 = colors(252, 236, 214);
const BUTTON: u64 = colors(231, 24, 39);

const CTRL_C: char = '\u{3}';

// ─── Dialog ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Greeting {
    Hello,
    Evening,
}

impl Greeting {
    const fn word(self) -> &'static str {
        match self {
            Self::Hello => "Hello",
            Self::Evening => "Good evening",
        }
    }
}

struct Dialog {
    name: EditState,
    shout: CheckState,
    greeting: Greeting,
    message: String,
}

impl Dialog {
    fn new() -> Self {
        Self {
            name: EditState::new(""),
            shout: CheckState::Unchecked,
            greeting: Greeting::Hello,
            message: String::new(),
        }
    }

    fn greet(&mut self) {
        let name = self.name.text().trim();
        let who = if name.is_empty() { "stranger" } else { name };
        let message = format!("{}, {who}.", self.greeting.word());
        self.message = if self.shout.is_checked() {
            message.to_uppercase()
        } else {
            message
        };
        tracing::debug!(message = %self.message, "greeted");
    }
}

impl App for Dialog {
    fn frame(&mut self, ui: &mut Ui) -> Action {
        let mut action = Action::Continue;
        ui.scope(A, A, 40, 12, |ui| {
            ui.frame(0, 0, A, A, PANEL);
            ui.label("What is your name?", 2, 1, A, A, TEXT);

            let mut greet = ui.edit(&mut self.name, 2, 2, far(2), FIELD);
            ui.check("Shout", &mut self.shout, 2, 5, A, TOGGLE);
            ui.radio("Hello", &mut self.greeting, Greeting::Hello, 2, 6, A, TOGGLE);
            ui.radio("Good evening", &mut self.greeting, Greeting::Evening, 13, 6, A, TOGGLE);
            ui.label(&self.message, A, 7, A, A, TEXT);

            greet |= ui.button("Greet", -9, -2, A, A, BUTTON);
            if greet {
                self.greet();
            }
            if ui.button("Quit", -2, -2, A, A, BUTTON) {
                action = Action::Quit;
            }
        });

        if ui.is_key_press(KeyCode::Escape) || ui.is_key_press(KeyCode::Char(CTRL_C)) {
            action = Action::Quit;
        }
        action
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send tracing output to a file when `TESSEL_LOG` is set.
fn init_logging() {
    let Ok(filter) = env::var("TESSEL_LOG") else {
        return;
    };
    let path = env::var("TESSEL_LOG_FILE").unwrap_or_else(|_| "tessel.log".to_owned());
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("tessel: cannot open log file {path}: {e}");
            return;
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

// ─── Main ───────────────────────────────────────────────────────────────────

#[cfg(unix)]
fn main() {
    use tessel_term::terminal::UnixTerminal;
    use tessel_ui::{EventLoop, LoopConfig};

    init_logging();

    let mut dialog = Dialog::new();
    let mut event_loop = EventLoop::new(UnixTerminal::new(), LoopConfig::default());
    if let Err(e) = event_loop.run(&mut dialog) {
        drop(event_loop);
        eprintln!("tessel: {e}");
        process::exit(1);
    }
}

#[cfg(not(unix))]
fn main() {
    init_logging();
    eprintln!("tessel: no terminal driver for this platform");
    process::exit(1);
}

// ─── Tests ──────────────────────────────────────────────────────────────────
