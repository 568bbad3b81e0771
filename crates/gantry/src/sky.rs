//! # Sky Layer
//!
//! Birds crossing the backdrop and a slowly drifting haze plane. Unlike the
//! crane, the sky is a pure function of elapsed time: there is no state to
//! integrate, so it is sampled directly at the host's clock.
//!
//! The clock is kept in `f64`. An `f32` clock loses whole frames of
//! precision once the page has been open for a day.

use std::f64::consts::TAU;

use gantry_shared::{lerp, Vec3};
use serde::Deserialize;

/// Left edge of a bird's flight path.
pub const FLIGHT_START_X: f32 = -10.5;
/// Right edge of a bird's flight path.
pub const FLIGHT_END_X: f32 = 11.2;
/// Vertical bob amplitude over one crossing.
pub const BOB_AMPLITUDE: f32 = 0.35;
/// Fixed heading, turned slightly toward the camera.
pub const BIRD_YAW: f32 = -0.25;
/// Bank amplitude over one crossing.
pub const ROLL_AMPLITUDE: f32 = 0.08;
/// Wing beat angular frequency (rad/s).
pub const FLAP_RATE: f32 = 6.2;
/// Rest angle of the wings.
pub const WING_REST: f32 = 0.22;

/// One bird's flight parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Bird {
    /// Crossings per second.
    pub speed: f32,
    /// Cruising height.
    pub height: f32,
    /// Distance behind the grid (negative Z).
    pub depth: f32,
    /// Phase offset along the path, in `[0, 1)`.
    pub offset: f32,
    /// Wing beat amplitude (radians).
    pub flap_amplitude: f32,
    /// Model scale.
    pub scale: f32,
}

impl Default for Bird {
    fn default() -> Self {
        Self {
            speed: 0.04,
            height: 3.2,
            depth: -4.0,
            offset: 0.0,
            flap_amplitude: 0.5,
            scale: 1.0,
        }
    }
}

/// Where a bird is and how its wings sit at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdPose {
    /// Body position.
    pub position: Vec3,
    /// Rotation about Y.
    pub yaw: f32,
    /// Rotation about Z.
    pub roll: f32,
    /// Left wing pivot rotation about Z.
    pub left_wing: f32,
    /// Right wing pivot rotation about Z.
    pub right_wing: f32,
    /// Model scale.
    pub scale: f32,
}

impl Bird {
    /// Samples the bird at `t` seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn pose(&self, t: f64) -> BirdPose {
        let offset = f64::from(self.offset);
        let along = (t * f64::from(self.speed) + offset).rem_euclid(1.0);
        let beat = (t * f64::from(FLAP_RATE) + offset * 10.0).sin();

        // Phases are reduced in f64; the pose itself is f32
        let along = along as f32;
        let wave = (f64::from(along) * TAU).sin() as f32;
        let flap = beat as f32 * self.flap_amplitude;

        BirdPose {
            position: Vec3::new(
                lerp(FLIGHT_START_X, FLIGHT_END_X, along),
                self.height + wave * BOB_AMPLITUDE,
                self.depth,
            ),
            yaw: BIRD_YAW,
            roll: wave * ROLL_AMPLITUDE,
            left_wing: -WING_REST + flap,
            right_wing: WING_REST - flap,
            scale: self.scale,
        }
    }
}

/// Horizontal drift of the haze plane at `t` seconds.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn haze_offset(t: f64) -> f32 {
    ((t * 0.07).sin() * 0.55) as f32
}

/// Sky section of the diorama config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    /// Birds, nearest first.
    pub birds: Vec<Bird>,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            birds: vec![
                Bird {
                    speed: 0.042,
                    height: 3.55,
                    depth: -3.2,
                    offset: 0.1,
                    flap_amplitude: 0.55,
                    scale: 1.15,
                },
                Bird {
                    speed: 0.033,
                    height: 2.95,
                    depth: -4.7,
                    offset: 0.44,
                    flap_amplitude: 0.48,
                    scale: 0.9,
                },
                Bird {
                    speed: 0.026,
                    height: 3.2,
                    depth: -6.4,
                    offset: 0.78,
                    flap_amplitude: 0.42,
                    scale: 0.72,
                },
            ],
        }
    }
}

/// The sky's clock and flock.
#[derive(Debug, Clone)]
pub struct Sky {
    birds: Vec<Bird>,
    elapsed: f64,
}

impl Sky {
    /// Creates a sky at `t = 0`.
    #[must_use]
    pub fn new(config: &SkyConfig) -> Self {
        Self {
            birds: config.birds.clone(),
            elapsed: 0.0,
        }
    }

    /// Moves the clock forward. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, delta_secs: f32) {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.elapsed += f64::from(delta_secs);
        }
    }

    /// Seconds of sky time elapsed.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Every bird at the current time.
    #[must_use]
    pub fn poses(&self) -> Vec<BirdPose> {
        self.birds.iter().map(|bird| bird.pose(self.elapsed)).collect()
    }

    /// Haze drift at the current time.
    #[must_use]
    pub fn haze_offset(&self) -> f32 {
        haze_offset(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_bird_pose_at_start() {
        let bird = Bird {
            offset: 0.0,
            flap_amplitude: 0.5,
            ..Bird::default()
        };
        let pose = bird.pose(0.0);

        assert_eq!(pose.position.x, FLIGHT_START_X);
        assert_eq!(pose.position.y, bird.height);
        assert_eq!(pose.position.z, bird.depth);
        assert_eq!(pose.yaw, BIRD_YAW);
        assert_eq!(pose.roll, 0.0);
        assert_eq!(pose.left_wing, -WING_REST);
        assert_eq!(pose.right_wing, WING_REST);
    }

    #[test]
    fn test_bird_path_wraps() {
        let bird = Bird {
            speed: 0.25,
            ..Bird::default()
        };

        // A quarter of the way: top of the bob
        let quarter = bird.pose(1.0);
        assert!(close(quarter.position.x, lerp(FLIGHT_START_X, FLIGHT_END_X, 0.25)));
        assert!(close(quarter.position.y, bird.height + BOB_AMPLITUDE));
        assert!(close(quarter.roll, ROLL_AMPLITUDE));

        // One full crossing later it is back where it started
        let wrapped = bird.pose(5.0);
        assert!(close(wrapped.position.x, quarter.position.x));
        assert!(close(wrapped.position.y, quarter.position.y));
    }

    #[test]
    fn test_wings_mirror_each_other() {
        let bird = SkyConfig::default().birds[0];
        for step in 0..100 {
            let pose = bird.pose(f64::from(step) * 0.1);
            assert!(close(pose.left_wing + pose.right_wing, 0.0));
            assert!(pose.left_wing.abs() <= WING_REST + bird.flap_amplitude + 1e-5);
        }
    }

    #[test]
    fn test_haze_drift_is_bounded() {
        assert_eq!(haze_offset(0.0), 0.0);
        for step in 0..1_000 {
            assert!(haze_offset(f64::from(step)).abs() <= 0.55);
        }
    }

    #[test]
    fn test_sky_clock_ignores_bad_deltas() {
        let mut sky = Sky::new(&SkyConfig::default());
        sky.advance(0.5);
        sky.advance(-1.0);
        sky.advance(f32::NAN);

        assert_eq!(sky.elapsed(), 0.5);
        assert_eq!(sky.poses().len(), 3);
        assert_eq!(sky.haze_offset(), haze_offset(0.5));
    }

    #[test]
    fn test_sky_clock_keeps_pace_after_hours() {
        let config = SkyConfig::default();
        let bird = config.birds[0];

        for start in [65_536.0f32, 262_144.0] {
            let mut sky = Sky::new(&config);
            sky.advance(start);
            let before = sky.poses()[0];

            for _ in 0..60 {
                sky.advance(1.0 / 60.0);
            }

            let advanced = sky.elapsed() - f64::from(start);
            assert!((advanced - 1.0).abs() < 1e-5, "one second became {advanced}");

            // One second of flight along the path, unless it just wrapped
            let travelled = sky.poses()[0].position.x - before.position.x;
            let expected = (FLIGHT_END_X - FLIGHT_START_X) * bird.speed;
            if travelled > 0.0 {
                assert!((travelled - expected).abs() < 1e-3, "moved {travelled}");
            }
        }
    }
}
