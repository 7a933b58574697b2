use chrono::{Datelike, Local, NaiveDateTime};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::io::{BufWriter, stdout};
use std::time::{Duration, Instant};

mod countdown;
mod effects;
mod render;
mod ui;

use countdown::Countdown;
use effects::Simulation;
use effects::fireworks::FireworksSimulation;
use effects::starfield::StarfieldSimulation;
use render::{Rgb, Screen, Surface};
use ui::Overlay;

const FIXED_DT: f32 = 1.0 / 60.0;

enum CountdownMode {
    NewYear,
    After(u32),
    At(NaiveDateTime),
}

struct Config {
    bg_color: Rgb,
    seed: Option<u64>,
    countdown: CountdownMode,
}

fn print_usage() {
    eprintln!("midnight - New Year countdown with a starfield and fireworks");
    eprintln!();
    eprintln!("Usage: midnight [OPTIONS]");
    eprintln!();
    eprintln!("Counts down to the next January 1st, 00:00:00 local time, then");
    eprintln!("lights the sky. Afterwards, press 'w' to send a wish.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bg-color RRGGBB       Background color as hex (e.g. --bg-color 0b0b22)");
    eprintln!("  --target \"Y-M-D H:M:S\"  Count down to an explicit local moment");
    eprintln!("  --in SECS               Count down SECS seconds from launch (demo mode)");
    eprintln!("  --seed N                Seed the random source for a reproducible sky");
    eprintln!();
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

fn run(config: &Config) -> std::io::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let mut master = match config.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let (cols, rows) = terminal::size()?;
    let (cols, rows) = (cols as usize, rows as usize);

    let mut screen = Screen::new(cols, rows, config.bg_color);
    let mut star_layer = Surface::new(cols, rows * 2);
    let mut fireworks_layer = Surface::new(cols, rows * 2);
    let mut starfield = StarfieldSimulation::new(cols, rows * 2, master.fork());
    let mut fireworks = FireworksSimulation::new(cols, rows * 2, master.fork());

    let now = Local::now().naive_local();
    let countdown = match config.countdown {
        CountdownMode::NewYear => Countdown::until_new_year(now),
        CountdownMode::After(secs) => Countdown::after_seconds(now, secs),
        CountdownMode::At(target) => Countdown::at(target),
    };
    let mut overlay = Overlay::new(countdown.target().year(), cols, rows, master.fork());

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;

    loop {
        if event::poll(Duration::from_millis(1))? {
            match event::read()? {
                Event::Key(key_event) => {
                    let code = key_event.code;
                    if code == KeyCode::Char('c')
                        && key_event.modifiers.contains(event::KeyModifiers::CONTROL)
                    {
                        break;
                    }
                    // The overlay gets first refusal so wish text can
                    // contain the quit letters.
                    if !overlay.handle_key(code)
                        && (code == KeyCode::Char('q') || code == KeyCode::Esc)
                    {
                        break;
                    }
                }
                Event::Resize(new_cols, new_rows) => {
                    let (cols, rows) = (new_cols as usize, new_rows as usize);
                    screen = Screen::new(cols, rows, config.bg_color);
                    star_layer = Surface::new(cols, rows * 2);
                    fireworks_layer = Surface::new(cols, rows * 2);
                    starfield.resize(cols, rows * 2);
                    fireworks.resize(cols, rows * 2);
                    overlay.resize(cols, rows);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        while accumulator >= FIXED_DT {
            let wall = Local::now().naive_local();
            if !fireworks.is_active() && countdown.remaining(wall).is_none() {
                fireworks.activate();
                overlay.trigger();
            }

            starfield.advance(&mut star_layer);
            fireworks.advance(&mut fireworks_layer);
            overlay.advance();
            accumulator -= FIXED_DT;
        }

        let wall = Local::now().naive_local();
        screen.begin_frame();
        overlay.render(&mut screen, countdown.remaining(wall).as_ref());
        screen.flush(&mut stdout, &[&star_layer, &fireworks_layer])?;
    }

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    Ok(())
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut config = Config {
        bg_color: (0, 0, 0),
        seed: None,
        countdown: CountdownMode::NewYear,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bg-color" => {
                if i + 1 < args.len() {
                    if let Some(color) = parse_hex_color(&args[i + 1]) {
                        config.bg_color = color;
                        i += 2;
                    } else {
                        eprintln!("Invalid hex color: {}", args[i + 1]);
                        eprintln!("Expected format: RRGGBB (e.g., 0b0b22)");
                        std::process::exit(1);
                    }
                } else {
                    eprintln!("--bg-color requires a hex color value");
                    std::process::exit(1);
                }
            }
            "--seed" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<u64>() {
                        Ok(seed) => {
                            config.seed = Some(seed);
                            i += 2;
                        }
                        Err(_) => {
                            eprintln!("Invalid seed: {}", args[i + 1]);
                            std::process::exit(1);
                        }
                    }
                } else {
                    eprintln!("--seed requires a number");
                    std::process::exit(1);
                }
            }
            "--in" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<u32>() {
                        Ok(secs) => {
                            config.countdown = CountdownMode::After(secs);
                            i += 2;
                        }
                        Err(_) => {
                            eprintln!("Invalid second count: {}", args[i + 1]);
                            std::process::exit(1);
                        }
                    }
                } else {
                    eprintln!("--in requires a number of seconds");
                    std::process::exit(1);
                }
            }
            "--target" => {
                if i + 1 < args.len() {
                    match NaiveDateTime::parse_from_str(&args[i + 1], "%Y-%m-%d %H:%M:%S") {
                        Ok(target) => {
                            config.countdown = CountdownMode::At(target);
                            i += 2;
                        }
                        Err(_) => {
                            eprintln!("Invalid target moment: {}", args[i + 1]);
                            eprintln!("Expected format: \"2027-01-01 00:00:00\" (local time)");
                            std::process::exit(1);
                        }
                    }
                } else {
                    eprintln!("--target requires a date-time value");
                    std::process::exit(1);
                }
            }
            "help" | "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    run(&config)
}
