// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Vector and time-scaling helpers
//!
//! Rates in the engine (velocities, gravity) are expressed per second while
//! ticks measure elapsed time in milliseconds. [`scale`] converts one into the
//! other.

/// Two-dimensional double-precision vector used for positions, velocities
/// and box sizes
pub use glam::DVec2 as Vec2;

/// Scale a per-second rate by the elapsed fraction of a second
///
/// # Examples
///
/// ```
/// use sprite_engine::math::scale;
///
/// assert_eq!(scale(10.0, 500.0), 5.0);
/// ```
pub fn scale(value: f64, delta_ms: f64) -> f64 {
    value * delta_ms / 1000.0
}

/// Component-wise [`scale`] for a vector rate
pub fn scale_vec(value: Vec2, delta_ms: f64) -> Vec2 {
    Vec2::new(scale(value.x, delta_ms), scale(value.y, delta_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_half_second() {
        assert_eq!(scale(10.0, 500.0), 5.0);
        assert_eq!(scale(-4.0, 500.0), -2.0);
    }

    #[test]
    fn test_scale_zero_delta() {
        assert_eq!(scale(123.0, 0.0), 0.0);
    }

    #[test]
    fn test_scale_vec() {
        let scaled = scale_vec(Vec2::new(10.0, -4.0), 500.0);
        assert_eq!(scaled, Vec2::new(5.0, -2.0));
    }
}
