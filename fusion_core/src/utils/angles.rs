// fusion_core/src/utils/angles.rs

use num_traits::{Euclid, Float, FloatConst};

/// Wraps an angle in radians into the half-open interval (-π, π].
///
/// Uses a single Euclidean remainder, so the cost does not grow with the
/// magnitude of the input. Non-finite input is returned unchanged.
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float + FloatConst + Euclid,
{
    if !angle.is_finite() {
        return angle;
    }

    let pi = T::PI();
    let two_pi = pi + pi;
    let wrapped = Euclid::rem_euclid(&(angle + pi), &two_pi) - pi;

    // rem_euclid lands in [0, 2π), which maps onto [-π, π); fold -π onto π.
    if wrapped <= -pi {
        pi
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-12;

    fn assert_in_range(a: f64) {
        assert!(a > -PI && a <= PI, "{a} is outside (-pi, pi]");
    }

    #[test]
    fn leaves_in_range_angles_alone() {
        for a in [0.0, 0.3, -0.3, 3.0, -3.0, PI] {
            assert_abs_diff_eq!(wrap_to_pi(a), a, epsilon = EPS);
        }
    }

    #[test]
    fn maps_minus_pi_to_pi() {
        assert_abs_diff_eq!(wrap_to_pi(-PI), PI, epsilon = EPS);
    }

    #[test]
    fn wraps_angles_just_outside_the_interval() {
        assert_abs_diff_eq!(wrap_to_pi(1.5 * PI), -0.5 * PI, epsilon = EPS);
        assert_abs_diff_eq!(wrap_to_pi(-1.5 * PI), 0.5 * PI, epsilon = EPS);
        assert_abs_diff_eq!(wrap_to_pi(7.0), 7.0 - 2.0 * PI, epsilon = EPS);
    }

    #[test]
    fn large_residuals_stay_congruent() {
        let mut a = -1.0e4;
        while a < 1.0e4 {
            let w = wrap_to_pi(a);
            assert_in_range(w);
            // Same direction on the unit circle.
            assert_abs_diff_eq!(w.sin(), a.sin(), epsilon = 1e-8);
            assert_abs_diff_eq!(w.cos(), a.cos(), epsilon = 1e-8);
            a += 0.731;
        }
    }

    #[test]
    fn works_for_f32() {
        let w = wrap_to_pi(4.0_f32);
        assert!(w > -std::f32::consts::PI && w <= std::f32::consts::PI);
        assert_abs_diff_eq!(w, 4.0 - 2.0 * std::f32::consts::PI, epsilon = 1e-5);
    }

    #[test]
    fn passes_nan_through() {
        assert!(wrap_to_pi(f64::NAN).is_nan());
    }
}
