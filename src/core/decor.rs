/// Decorative descriptors — plain data for the presentation layer to turn
/// into visuals.

use serde::{Deserialize, Serialize};

use crate::core::content::pick_from_pool;
use crate::core::seed::Mulberry32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Cube,
    Line,
    Circle,
    Triangle,
    Hexagon,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Self::Cube,
        Self::Line,
        Self::Circle,
        Self::Triangle,
        Self::Hexagon,
    ];

    /// Style class name used by the presentation layer.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Cube => "chaos-cube",
            Self::Line => "chaos-line",
            Self::Circle => "chaos-circle",
            Self::Triangle => "chaos-triangle",
            Self::Hexagon => "chaos-hexagon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    Spin,
    Pulse,
    Glitch,
    Drift,
    Flicker,
    Corrupt,
}

impl Animation {
    pub const ALL: [Animation; 6] = [
        Self::Spin,
        Self::Pulse,
        Self::Glitch,
        Self::Drift,
        Self::Flicker,
        Self::Corrupt,
    ];

    pub fn class(&self) -> &'static str {
        match self {
            Self::Spin => "chaos-spin",
            Self::Pulse => "chaos-pulse",
            Self::Glitch => "chaos-glitch",
            Self::Drift => "chaos-drift",
            Self::Flicker => "chaos-flicker",
            Self::Corrupt => "chaos-corrupt",
        }
    }
}

/// One decorative element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub shape: Shape,
    pub animation: Animation,
    /// Edge length in pixels, 10..50.
    pub size: f64,
    /// 0..360.
    pub hue: u32,
    /// 0.3..1.0.
    pub opacity: f64,
    /// Percent of the container width, 0..80.
    pub left: f64,
    /// Percent of the container height, 0..80.
    pub top: f64,
    /// Animation delay in seconds, 0..2.
    pub delay: f64,
}

impl Decoration {
    /// Draws, in order: shape, animation, size, hue, opacity, left, top, delay.
    pub fn generate(stream: &mut Mulberry32) -> Self {
        let shape = pick_from_pool(&Shape::ALL, stream)
            .copied()
            .unwrap_or(Shape::Cube);
        let animation = pick_from_pool(&Animation::ALL, stream)
            .copied()
            .unwrap_or(Animation::Spin);
        let size = 10.0 + stream.next_f64() * 40.0;
        let hue = (stream.next_f64() * 360.0) as u32;
        let opacity = 0.3 + stream.next_f64() * 0.7;
        let left = stream.next_f64() * 80.0;
        let top = stream.next_f64() * 80.0;
        let delay = stream.next_f64() * 2.0;

        Self {
            shape,
            animation,
            size,
            hue,
            opacity,
            left,
            top,
            delay,
        }
    }

    /// CSS-style color string, `hsla(h, 70%, 50%, a)`.
    pub fn color(&self) -> String {
        format!("hsla({}, 70%, 50%, {:.3})", self.hue, self.opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_hold() {
        for seed in 0..500 {
            let d = Decoration::generate(&mut Mulberry32::new(seed));
            assert!((10.0..50.0).contains(&d.size));
            assert!(d.hue < 360);
            assert!((0.3..1.0).contains(&d.opacity));
            assert!((0.0..80.0).contains(&d.left));
            assert!((0.0..80.0).contains(&d.top));
            assert!((0.0..2.0).contains(&d.delay));
        }
    }

    #[test]
    fn reproducible_per_seed() {
        for seed in [0u64, 1, 2, 47_664] {
            assert_eq!(
                Decoration::generate(&mut Mulberry32::new(seed)),
                Decoration::generate(&mut Mulberry32::new(seed))
            );
        }
    }

    #[test]
    fn draw_order() {
        // Seed 0 draws 0.2664, 0.00033, 0.2233, ...
        let d = Decoration::generate(&mut Mulberry32::new(0));
        assert_eq!(d.shape, Shape::Line);
        assert_eq!(d.animation, Animation::Spin);
        assert!((d.size - (10.0 + 0.2232720274478197 * 40.0)).abs() < 1e-12);
    }

    #[test]
    fn uses_eight_draws() {
        let mut stream = Mulberry32::new(77);
        Decoration::generate(&mut stream);
        let mut replay = Mulberry32::new(77);
        for _ in 0..8 {
            replay.next_f64();
        }
        assert_eq!(stream, replay);
    }

    #[test]
    fn color_string() {
        let d = Decoration {
            shape: Shape::Circle,
            animation: Animation::Pulse,
            size: 20.0,
            hue: 120,
            opacity: 0.5,
            left: 0.0,
            top: 0.0,
            delay: 0.0,
        };
        assert_eq!(d.color(), "hsla(120, 70%, 50%, 0.500)");
        assert_eq!(d.shape.class(), "chaos-circle");
    }
}
