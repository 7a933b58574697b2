use super::Simulation;
use crate::render::{Surface, hsl_to_rgb};
use std::f32::consts::PI;

const SPAWN_CHANCE: f32 = 0.05;
const BURST_PARTICLES: usize = 50;
const GRAVITY: f32 = 0.05;
const TRAIL_KEEP: f32 = 0.8;
const ROCKET_RADIUS: f32 = 3.0;
const PARTICLE_RADIUS: f32 = 2.0;

struct Rocket {
    x: f32,
    y: f32,
    target_y: f32,
    speed: f32,
    hue: f32,
}

struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    alpha: f32,
    hue: f32,
    decay: f32,
}

/// Rockets climb from the bottom edge and detonate into a burst of
/// fading particles. Starts dormant and does nothing until `activate`
/// is called; once active it runs until the program exits.
pub struct FireworksSimulation {
    width: usize,
    height: usize,
    rockets: Vec<Rocket>,
    particles: Vec<Particle>,
    active: bool,
    rng: fastrand::Rng,
}

impl FireworksSimulation {
    pub fn new(width: usize, height: usize, rng: fastrand::Rng) -> Self {
        Self {
            width,
            height,
            rockets: Vec::new(),
            particles: Vec::new(),
            active: false,
            rng,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn launch(&mut self) {
        self.rockets.push(Rocket {
            x: self.rng.f32() * self.width as f32,
            y: self.height as f32,
            target_y: self.rng.f32() * self.height as f32 / 2.0,
            speed: 10.0 + self.rng.f32() * 5.0,
            hue: self.rng.f32() * 360.0,
        });
    }

    fn burst(&mut self, x: f32, y: f32, hue: f32) {
        for _ in 0..BURST_PARTICLES {
            let angle = self.rng.f32() * PI * 2.0;
            let speed = self.rng.f32() * 5.0;
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                alpha: 1.0,
                hue,
                decay: 0.01 + self.rng.f32() * 0.02,
            });
        }
    }
}

impl Simulation for FireworksSimulation {
    // New bounds only affect future launches; entities in flight keep
    // their assigned targets.
    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    fn advance(&mut self, surface: &mut Surface) {
        if !self.active {
            return;
        }

        // Trail fade, then everything below draws additively.
        surface.fade(TRAIL_KEEP);

        // Climbing rockets. A rocket is still drawn on the frame it
        // reaches its target altitude, then replaced by its burst.
        let mut detonations = Vec::new();
        self.rockets.retain_mut(|rocket| {
            rocket.y -= rocket.speed;
            surface.fill_circle(
                rocket.x,
                rocket.y,
                ROCKET_RADIUS,
                hsl_to_rgb(rocket.hue, 1.0, 0.5),
                1.0,
            );
            if rocket.y <= rocket.target_y {
                detonations.push((rocket.x, rocket.y, rocket.hue));
                false
            } else {
                true
            }
        });
        for (x, y, hue) in detonations {
            self.burst(x, y, hue);
        }

        // Explosion particles, newest included.
        self.particles.retain_mut(|particle| {
            particle.x += particle.vx;
            particle.y += particle.vy;
            particle.vy += GRAVITY;
            particle.alpha -= particle.decay;

            if particle.alpha <= 0.0 {
                return false;
            }

            surface.fill_circle(
                particle.x,
                particle.y,
                PARTICLE_RADIUS,
                hsl_to_rgb(particle.hue, 1.0, 0.5),
                particle.alpha,
            );
            true
        });

        if self.rng.f32() < SPAWN_CHANCE {
            self.launch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(width: usize, height: usize, seed: u64) -> FireworksSimulation {
        FireworksSimulation::new(width, height, fastrand::Rng::with_seed(seed))
    }

    #[test]
    fn dormant_advance_is_a_no_op() {
        let mut fw = sim(800, 600, 1);
        let mut surface = Surface::new(800, 600);
        for _ in 0..100 {
            fw.advance(&mut surface);
        }
        assert!(!fw.is_active());
        assert_eq!(fw.rockets.len(), 0);
        assert_eq!(fw.particles.len(), 0);
        assert_eq!(surface.energy(), 0.0);
    }

    #[test]
    fn activate_is_idempotent_and_starts_empty() {
        let mut fw = sim(800, 600, 1);
        fw.activate();
        fw.activate();
        assert!(fw.is_active());
        assert_eq!(fw.rockets.len(), 0);
        assert_eq!(fw.particles.len(), 0);
    }

    #[test]
    fn rocket_detonates_exactly_at_target_altitude() {
        let mut fw = sim(800, 600, 2);
        fw.activate();
        fw.rockets.push(Rocket {
            x: 400.0,
            y: 600.0,
            target_y: 100.0,
            speed: 10.0,
            hue: 30.0,
        });

        let mut surface = Surface::new(800, 600);
        for frame in 1..=49 {
            fw.advance(&mut surface);
            assert_eq!(
                fw.rockets.iter().filter(|r| r.hue == 30.0).count(),
                1,
                "rocket vanished early at frame {frame}"
            );
        }

        fw.advance(&mut surface);
        assert_eq!(fw.rockets.iter().filter(|r| r.hue == 30.0).count(), 0);
        assert_eq!(
            fw.particles.iter().filter(|p| p.hue == 30.0).count(),
            BURST_PARTICLES
        );
    }

    #[test]
    fn rocket_altitude_is_monotonically_decreasing() {
        let mut fw = sim(800, 600, 5);
        fw.activate();
        fw.rockets.push(Rocket {
            x: 100.0,
            y: 600.0,
            target_y: 0.0,
            speed: 12.5,
            hue: 200.0,
        });
        let mut surface = Surface::new(800, 600);
        let mut last_y = 600.0;
        loop {
            fw.advance(&mut surface);
            match fw.rockets.iter().find(|r| r.hue == 200.0) {
                Some(rocket) => {
                    assert!(rocket.y < last_y);
                    last_y = rocket.y;
                }
                None => break,
            }
        }
    }

    #[test]
    fn burst_produces_fifty_fresh_particles() {
        let mut fw = sim(800, 600, 3);
        fw.burst(200.0, 150.0, 120.0);
        assert_eq!(fw.particles.len(), BURST_PARTICLES);
        for p in &fw.particles {
            assert_eq!(p.alpha, 1.0);
            assert_eq!(p.hue, 120.0);
            assert_eq!(p.x, 200.0);
            assert_eq!(p.y, 150.0);
            assert!(p.decay >= 0.01 && p.decay < 0.03);
            assert!((p.vx * p.vx + p.vy * p.vy).sqrt() < 5.0);
        }
    }

    #[test]
    fn particle_gravity_adds_exactly_per_frame() {
        let mut fw = sim(800, 600, 4);
        fw.activate();
        fw.particles.push(Particle {
            x: 100.0,
            y: 100.0,
            vx: 0.0,
            vy: -2.0,
            alpha: 1.0,
            hue: 0.0,
            decay: 0.015625,
        });
        let mut surface = Surface::new(800, 600);
        let mut expected_vy = -2.0;
        for _ in 0..10 {
            fw.advance(&mut surface);
            expected_vy += GRAVITY;
            let p = fw.particles.iter().find(|p| p.hue == 0.0).unwrap();
            assert!((p.vy - expected_vy).abs() < 1e-5);
        }
    }

    #[test]
    fn particle_alpha_strictly_decreases_until_removal() {
        let mut fw = sim(800, 600, 6);
        fw.activate();
        // decay = 1/32 is exact in binary, so the removal frame is too.
        fw.particles.push(Particle {
            x: 50.0,
            y: 50.0,
            vx: 0.0,
            vy: 0.0,
            alpha: 1.0,
            hue: 90.0,
            decay: 0.03125,
        });
        let mut surface = Surface::new(800, 600);

        let mut last_alpha = 1.0;
        for _ in 0..31 {
            fw.advance(&mut surface);
            let p = fw.particles.iter().find(|p| p.hue == 90.0).unwrap();
            assert!(p.alpha < last_alpha);
            last_alpha = p.alpha;
        }

        // Frame 32: alpha reaches exactly zero and the particle goes.
        fw.advance(&mut surface);
        assert!(fw.particles.iter().all(|p| p.hue != 90.0));
    }

    #[test]
    fn expired_particle_is_not_drawn_on_its_removal_frame() {
        let mut fw = sim(800, 600, 8);
        fw.activate();
        fw.particles.push(Particle {
            x: 50.0,
            y: 50.0,
            vx: 0.0,
            vy: 0.0,
            alpha: 0.5,
            hue: 45.0,
            decay: 1.0,
        });
        let mut surface = Surface::new(800, 600);
        fw.advance(&mut surface);
        assert_eq!(fw.particles.len(), 0);
        assert_eq!(surface.energy(), 0.0);
    }

    #[test]
    fn launches_stay_within_spawn_bounds() {
        let mut fw = sim(800, 600, 12);
        fw.activate();
        let mut surface = Surface::new(800, 600);
        let mut seen = 0;
        for _ in 0..400 {
            fw.advance(&mut surface);
            for rocket in &fw.rockets {
                assert!(rocket.x >= 0.0 && rocket.x < 800.0);
                assert!(rocket.target_y >= 0.0 && rocket.target_y < 300.0);
                assert!(rocket.speed >= 10.0 && rocket.speed < 15.0);
                assert!(rocket.hue >= 0.0 && rocket.hue < 360.0);
            }
            seen = seen.max(fw.rockets.len());
        }
        assert!(seen > 0, "no rocket ever launched in 400 frames");
    }

    #[test]
    fn resize_keeps_entities_in_flight() {
        let mut fw = sim(800, 600, 13);
        fw.activate();
        fw.rockets.push(Rocket {
            x: 700.0,
            y: 500.0,
            target_y: 250.0,
            speed: 11.0,
            hue: 300.0,
        });
        fw.burst(300.0, 200.0, 60.0);
        fw.resize(100, 80);
        assert_eq!(fw.rockets.len(), 1);
        assert_eq!(fw.particles.len(), BURST_PARTICLES);
        assert_eq!(fw.rockets[0].target_y, 250.0);
    }
}
