//! 2-D vector helpers shared by the gathering and repulsion phases.

use glam::DVec2;

#[inline]
pub fn distance_squared(a: DVec2, b: DVec2) -> f64 {
    a.distance_squared(b)
}

#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Sign that maps zero to zero, unlike [`f64::signum`].
#[inline]
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Rescales `d` to magnitude `|length|`, keeping it on the same line.
///
/// Each component of the result carries `sign(length) * sign(component)`,
/// so a negative `length` flips the direction. The magnitude is solved from
/// the `dx / dy` ratio; the degenerate inputs are handled explicitly:
///
/// - `dy == 0`, `dx != 0`: `(sign(dx) * length, 0)`.
/// - `dx == 0`, `dy == 0`: `(0, 0)`.
///
/// When rounding makes `new_x²` exceed `length²`, the `y` component clamps
/// to zero instead of taking the root of a negative number.
pub fn scale_to_length(d: DVec2, length: f64) -> DVec2 {
    if d.y == 0.0 {
        return if d.x == 0.0 {
            DVec2::ZERO
        } else {
            DVec2::new(sign(d.x) * length, 0.0)
        };
    }

    let ratio = d.x / d.y;
    let length_square = length * length;
    let ratio_square = ratio * ratio;
    // Same as `length² * ratio² / (1 + ratio²)` but stays finite when the
    // ratio overflows.
    let new_x_square = length_square / (1.0 + 1.0 / ratio_square);
    let new_y_square = length_square - new_x_square;

    let new_x = new_x_square.sqrt();
    let new_y = if new_y_square < 0.0 {
        0.0
    } else {
        new_y_square.sqrt()
    };

    let s = sign(length);
    DVec2::new(sign(d.x) * s * new_x, sign(d.y) * s * new_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    #[test]
    fn distances_are_euclidean() {
        let a = DVec2::new(1.0, 2.0);
        let b = DVec2::new(4.0, 6.0);
        assert_eq!(distance_squared(a, b), 25.0);
        assert_eq!(distance(a, b), 5.0);
        assert_eq!(distance(b, a), 5.0);
    }

    #[rstest]
    #[case(3.0, 4.0, 10.0)]
    #[case(-3.0, 4.0, 2.5)]
    #[case(-0.001, -7.0, 1.0)]
    #[case(1e3, -1.0, 42.0)]
    #[case(0.0, 5.0, 3.0)]
    #[case(0.0, -5.0, 3.0)]
    #[case(123.456, 0.5, 1e-3)]
    fn magnitude_matches_length_and_quadrant_is_kept(
        #[case] dx: f64,
        #[case] dy: f64,
        #[case] length: f64,
    ) {
        let v = scale_to_length(DVec2::new(dx, dy), length);

        assert!(
            (v.length() - length).abs() < EPS,
            "magnitude {} != {length} for ({dx}, {dy})",
            v.length()
        );
        assert_eq!(sign(v.x), sign(dx), "x sign for ({dx}, {dy})");
        assert_eq!(sign(v.y), sign(dy), "y sign for ({dx}, {dy})");
    }

    #[test]
    fn random_inputs_keep_magnitude_quadrant_and_line() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..5_000 {
            let mut dx = rng.random_range(-1e3..1e3);
            let mut dy = rng.random_range(-1e3..1e3);
            // Steep and shallow directions.
            if rng.random_bool(0.25) {
                dx *= 1e-6;
            }
            if rng.random_bool(0.25) {
                dy *= 1e-6;
            }
            let length = rng.random_range(1e-3..1e3);
            let d = DVec2::new(dx, dy);

            let v = scale_to_length(d, length);

            assert!(
                (v.length() - length).abs() <= 1e-12 * length,
                "magnitude {} != {length} for {d}",
                v.length()
            );
            assert_eq!(sign(v.x), sign(dx), "x sign for {d}");
            // A vanishing y component may round to zero.
            assert!(v.y == 0.0 || sign(v.y) == sign(dy), "y sign for {d}");
            assert!(
                d.normalize().perp_dot(v).abs() <= 1e-6 * length,
                "{v} is off the line through {d}"
            );
        }
    }

    #[test]
    fn result_is_colinear_with_input() {
        let d = DVec2::new(-2.0, 7.0);
        let v = scale_to_length(d, 11.0);
        assert!(d.perp_dot(v).abs() < 1e-9);
        assert!(d.dot(v) > 0.0);
    }

    #[test]
    fn negative_length_flips_direction() {
        let v = scale_to_length(DVec2::new(3.0, 4.0), -5.0);
        assert!((v - DVec2::new(-3.0, -4.0)).length() < EPS);
    }

    #[test]
    fn horizontal_input_uses_degenerate_branch() {
        assert_eq!(scale_to_length(DVec2::new(4.0, 0.0), 2.0), DVec2::new(2.0, 0.0));
        assert_eq!(scale_to_length(DVec2::new(-4.0, 0.0), 2.0), DVec2::new(-2.0, 0.0));
    }

    #[test]
    fn zero_input_gives_zero_vector() {
        assert_eq!(scale_to_length(DVec2::ZERO, 10.0), DVec2::ZERO);
        assert_eq!(scale_to_length(DVec2::ZERO, f64::INFINITY), DVec2::ZERO);
    }

    #[test]
    fn nearly_horizontal_input_never_produces_nan() {
        let v = scale_to_length(DVec2::new(1e300, 1e-300), 10.0);
        assert!(v.is_finite());
        assert!((v.x - 10.0).abs() < EPS);
        assert!(v.y >= 0.0);
    }
}
