//! Scalar helpers shared by the vector, color and matrix kernels
use rand::Rng;

pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Clamp `x` into `[a, b]`.
pub fn clamp(x: f64, a: f64, b: f64) -> f64 {
    if x < a {
        a
    } else if x > b {
        b
    } else {
        x
    }
}

/// Clamp `x` to be at least `a`.
pub fn clamp_bottom(x: f64, a: f64) -> f64 {
    if x < a {
        a
    } else {
        x
    }
}

/// Linear mapping of `x` from range `[a1, a2]` to range `[b1, b2]`.
pub fn map_linear(x: f64, a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}

/// Hermite interpolation between `min` and `max`, returning `[0, 1]`.
pub fn smoothstep(x: f64, min: f64, max: f64) -> f64 {
    if x <= min {
        return 0.0;
    }
    if x >= max {
        return 1.0;
    }
    let x = (x - min) / (max - min);
    x * x * (3.0 - 2.0 * x)
}

/// Ken Perlin's improved smoothstep.
pub fn smootherstep(x: f64, min: f64, max: f64) -> f64 {
    if x <= min {
        return 0.0;
    }
    if x >= max {
        return 1.0;
    }
    let x = (x - min) / (max - min);
    x * x * x * (x * (x * 6.0 - 15.0) + 10.0)
}

/// Random integer in the inclusive range `[low, high]`.
pub fn rand_int<R: Rng + ?Sized>(rng: &mut R, low: i64, high: i64) -> i64 {
    rng.random_range(low..=high)
}

/// Random float in `[low, high)`.
pub fn rand_float<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + rng.random::<f64>() * (high - low)
}

/// Random float in `[-range / 2, range / 2)`.
pub fn rand_float_spread<R: Rng + ?Sized>(rng: &mut R, range: f64) -> f64 {
    range * (0.5 - rng.random::<f64>())
}

/// -1, 0 or 1 following the sign of `x`.
pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * DEG2RAD
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians * RAD2DEG
}

pub fn is_power_of_two(value: u64) -> bool {
    value != 0 && (value & (value - 1)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
        assert_eq!(clamp(-0.1, 0.0, 1.0), 0.0);
        assert_eq!(clamp(1.1, 0.0, 1.0), 1.0);
        assert_eq!(clamp_bottom(-0.1, 0.0), 0.0);
        assert_eq!(clamp_bottom(5.0, 0.0), 5.0);
    }

    #[test]
    fn test_map_linear() {
        assert_eq!(map_linear(0.5, 0.0, 1.0, 0.0, 10.0), 5.0);
        assert_eq!(map_linear(0.0, -1.0, 1.0, 0.0, 100.0), 50.0);
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(-1.0, 0.0, 2.0), 0.0);
        assert_eq!(smoothstep(0.0, 0.0, 2.0), 0.0);
        assert_eq!(smoothstep(0.5, 0.0, 2.0), 0.15625);
        assert_eq!(smoothstep(1.0, 0.0, 2.0), 0.5);
        assert_eq!(smoothstep(2.0, 0.0, 2.0), 1.0);
        assert_eq!(smootherstep(1.0, 0.0, 2.0), 0.5);
        assert_eq!(smootherstep(0.5, 0.0, 2.0), 0.103515625);
    }

    #[test]
    fn test_random_ranges() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let i = rand_int(&mut rng, -3, 3);
            assert!((-3..=3).contains(&i));
            let f = rand_float(&mut rng, 1.0, 2.0);
            assert!((1.0..2.0).contains(&f));
            let s = rand_float_spread(&mut rng, 4.0);
            assert!(s > -2.0 && s <= 2.0);
        }
    }

    #[test]
    fn test_sign_and_angles() {
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(2.0), 1.0);
        assert!((deg_to_rad(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((rad_to_deg(std::f64::consts::FRAC_PI_2) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_is_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(1024));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(96));
    }
}
