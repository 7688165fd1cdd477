pub mod vec2;

/// Normalize an angle in degrees to (-180, 180]
#[inline]
pub fn normalize_angle(deg: f64) -> f64 {
    let mut a = deg % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Sum of the geometric series `1 + r + r^2 + ... + r^(n-1)`
#[inline]
pub fn geometric_sum(r: f64, n: u32) -> f64 {
    if n == 0 {
        return 0.0;
    }
    if (1.0 - r).abs() < 1e-12 {
        return n as f64;
    }
    (1.0 - r.powi(n as i32)) / (1.0 - r)
}
