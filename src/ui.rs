use crate::countdown::TimeLeft;
use crate::render::{Rgb, Screen};
use crossterm::event::KeyCode;

const GOLD: Rgb = (255, 215, 0);
const WHITE: Rgb = (255, 255, 255);
const SILVER: Rgb = (170, 170, 190);
const DIM: Rgb = (110, 110, 130);

const PUNCH_FRAMES: u8 = 30;
const GREETING_DELAY_FRAMES: u32 = 60;
const FLIGHT_FRAMES: u32 = 180;
const WISH_MAX_LEN: usize = 60;

const LABELS: [&str; 4] = ["DAYS", "HOURS", "MINUTES", "SECONDS"];
const LABEL_GAP: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Countdown,
    Celebrating,
    WishPrompt,
    WishFlying,
    WishSent,
}

// The wish glyph's scripted exit: rise from screen center past the top
// edge with a little horizontal drift, fading out on the way.
struct WishFlight {
    frame: u32,
    start_col: f32,
    start_row: f32,
    drift: f32,
}

impl WishFlight {
    fn new(cols: usize, rows: usize, rng: &mut fastrand::Rng) -> Self {
        Self {
            frame: 0,
            start_col: cols as f32 / 2.0,
            start_row: rows as f32 / 2.0,
            drift: (rng.f32() - 0.5) * cols as f32 / 4.0,
        }
    }

    fn advance(&mut self) -> bool {
        self.frame += 1;
        self.frame >= FLIGHT_FRAMES || self.row() < -1.0
    }

    fn progress(&self) -> f32 {
        self.frame as f32 / FLIGHT_FRAMES as f32
    }

    fn row(&self) -> f32 {
        // Quadratic ease-in: slow lift-off, then away.
        let t = self.progress();
        self.start_row - t * t * (self.start_row + 2.0)
    }

    fn col(&self) -> f32 {
        self.start_col + self.progress() * self.drift
    }

    fn alpha(&self) -> f32 {
        1.0 - self.progress()
    }
}

/// Text layered over the sky: the countdown, then the greeting and the
/// send-a-wish exchange once midnight hits. Fireworks keep running
/// underneath whatever phase this is in.
pub struct Overlay {
    phase: Phase,
    year: i32,
    cols: usize,
    rows: usize,
    frames_since_zero: u32,
    last_digits: Option<[i64; 4]>,
    punch: [u8; 4],
    wish_input: String,
    flight: Option<WishFlight>,
    rng: fastrand::Rng,
}

impl Overlay {
    pub fn new(year: i32, cols: usize, rows: usize, rng: fastrand::Rng) -> Self {
        Self {
            phase: Phase::Countdown,
            year,
            cols,
            rows,
            frames_since_zero: 0,
            last_digits: None,
            punch: [0; 4],
            wish_input: String::new(),
            flight: None,
            rng,
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
    }

    // The countdown reached zero. Idempotent past the first call.
    pub fn trigger(&mut self) {
        if self.phase == Phase::Countdown {
            self.phase = Phase::Celebrating;
            self.frames_since_zero = 0;
        }
    }

    pub fn advance(&mut self) {
        if self.phase != Phase::Countdown {
            self.frames_since_zero = self.frames_since_zero.saturating_add(1);
        }
        for p in &mut self.punch {
            *p = p.saturating_sub(1);
        }
        if self.phase == Phase::WishFlying {
            let done = match &mut self.flight {
                Some(flight) => flight.advance(),
                None => true,
            };
            if done {
                self.flight = None;
                self.phase = Phase::WishSent;
            }
        }
    }

    /// Feed a key press. Returns true when the overlay consumed it, in
    /// which case the caller must not treat it as a global shortcut.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.phase {
            Phase::Celebrating | Phase::WishSent => {
                if code == KeyCode::Char('w') {
                    self.wish_input.clear();
                    self.phase = Phase::WishPrompt;
                    return true;
                }
                false
            }
            Phase::WishPrompt => {
                match code {
                    KeyCode::Esc => self.phase = Phase::Celebrating,
                    KeyCode::Enter => {
                        // An empty wish goes nowhere.
                        if !self.wish_input.trim().is_empty() {
                            self.flight =
                                Some(WishFlight::new(self.cols, self.rows, &mut self.rng));
                            self.phase = Phase::WishFlying;
                        }
                    }
                    KeyCode::Backspace => {
                        self.wish_input.pop();
                    }
                    KeyCode::Char(c) => {
                        if self.wish_input.chars().count() < WISH_MAX_LEN {
                            self.wish_input.push(c);
                        }
                    }
                    _ => {}
                }
                true
            }
            Phase::Countdown | Phase::WishFlying => false,
        }
    }

    pub fn render(&mut self, screen: &mut Screen, time_left: Option<&TimeLeft>) {
        match self.phase {
            Phase::Countdown => {
                if let Some(left) = time_left {
                    self.render_countdown(screen, left);
                }
            }
            Phase::Celebrating => {
                self.render_greeting(screen);
                self.centered(
                    screen,
                    self.mid_row() + 1,
                    "press w to send a wish to the stars",
                    DIM,
                );
            }
            Phase::WishPrompt => {
                self.render_greeting(screen);
                let prompt = format!("make a wish: {}_", self.wish_input);
                self.centered(screen, self.mid_row() + 1, &prompt, WHITE);
                self.centered(
                    screen,
                    self.mid_row() + 3,
                    "enter sends it skyward, esc keeps it",
                    DIM,
                );
            }
            Phase::WishFlying => {
                self.render_greeting(screen);
                if let Some(flight) = &self.flight {
                    let a = flight.alpha();
                    let color = (
                        (GOLD.0 as f32 * a) as u8,
                        (GOLD.1 as f32 * a) as u8,
                        (GOLD.2 as f32 * a) as u8,
                    );
                    screen.draw_text(
                        flight.col().round() as isize,
                        flight.row().round() as isize,
                        "✉",
                        color,
                    );
                }
            }
            Phase::WishSent => {
                self.render_greeting(screen);
                self.centered(
                    screen,
                    self.mid_row() + 1,
                    "your wish is on its way to the stars ✦",
                    SILVER,
                );
                self.centered(screen, self.mid_row() + 3, "press w to send another", DIM);
            }
        }
    }

    fn mid_row(&self) -> isize {
        self.rows as isize / 2
    }

    fn centered(&self, screen: &mut Screen, row: isize, text: &str, color: Rgb) {
        let width = text.chars().count() as isize;
        screen.draw_text((self.cols as isize - width) / 2, row, text, color);
    }

    fn render_countdown(&mut self, screen: &mut Screen, left: &TimeLeft) {
        let values = [left.days, left.hours, left.minutes, left.seconds];
        if let Some(last) = self.last_digits {
            for i in 0..4 {
                if values[i] != last[i] {
                    self.punch[i] = PUNCH_FRAMES;
                }
            }
        }
        self.last_digits = Some(values);

        let title = format!("COUNTDOWN TO {}", self.year);
        self.centered(screen, self.mid_row() - 3, &title, SILVER);

        let total: usize = LABELS.iter().map(|l| l.len()).sum::<usize>() + LABEL_GAP * 3;
        let mut col = (self.cols as isize - total as isize) / 2;
        for i in 0..4 {
            let value = format!("{:02}", values[i]);
            // A field that just ticked flashes white, then settles gold.
            let color = if self.punch[i] > 0 { WHITE } else { GOLD };
            let pad = (LABELS[i].len() as isize - value.chars().count() as isize) / 2;
            screen.draw_text(col + pad.max(0), self.mid_row() - 1, &value, color);
            screen.draw_text(col, self.mid_row(), LABELS[i], DIM);
            col += (LABELS[i].len() + LABEL_GAP) as isize;
        }
    }

    fn render_greeting(&self, screen: &mut Screen) {
        if self.frames_since_zero >= GREETING_DELAY_FRAMES {
            let greeting = format!("HAPPY NEW YEAR {}!", self.year);
            self.centered(screen, self.mid_row() - 2, &greeting, GOLD);
        }
    }
}
