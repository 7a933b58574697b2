use super::Simulation;
use crate::render::{Rgb, Surface};

const STAR_COUNT: usize = 200;
const STAR_COLOR: Rgb = (255, 255, 255);
const MAX_RADIUS: f32 = 1.5;
const MAX_TWINKLE_SPEED: f32 = 0.05;

struct Star {
    x: f32,
    y: f32,
    radius: f32,
    alpha: f32,
    twinkle_speed: f32,
}

/// Twinkling night-sky backdrop. A fixed set of stars whose opacity
/// does a clamped random walk; the set only changes wholesale when the
/// surface is resized.
pub struct StarfieldSimulation {
    width: usize,
    height: usize,
    stars: Vec<Star>,
    rng: fastrand::Rng,
}

impl StarfieldSimulation {
    pub fn new(width: usize, height: usize, rng: fastrand::Rng) -> Self {
        let mut sim = Self {
            width,
            height,
            stars: Vec::with_capacity(STAR_COUNT),
            rng,
        };
        sim.scatter();
        sim
    }

    fn scatter(&mut self) {
        self.stars.clear();
        for _ in 0..STAR_COUNT {
            self.stars.push(Star {
                x: self.rng.f32() * self.width as f32,
                y: self.rng.f32() * self.height as f32,
                radius: self.rng.f32() * MAX_RADIUS,
                alpha: self.rng.f32(),
                twinkle_speed: self.rng.f32() * MAX_TWINKLE_SPEED,
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn star_count(&self) -> usize {
        self.stars.len()
    }
}

impl Simulation for StarfieldSimulation {
    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.scatter();
    }

    fn advance(&mut self, surface: &mut Surface) {
        surface.clear();

        for star in &mut self.stars {
            // Twinkle: drift direction is re-rolled every frame per star
            // so neighbors never flicker in sync.
            let dir = if self.rng.bool() { 1.0 } else { -1.0 };
            star.alpha = (star.alpha + star.twinkle_speed * dir).clamp(0.0, 1.0);

            surface.fill_circle(star.x, star.y, star.radius, STAR_COLOR, star.alpha);
        }
    }
}
