//! 2D affine transform helpers over row-major 3×3 matrices.
//! Element at (row, col) = data[row * 3 + col].

pub type M3 = [f64; 9];

pub fn m3_identity() -> M3 {
    [1., 0., 0.,
     0., 1., 0.,
     0., 0., 1.]
}

pub fn m3_mul(a: &M3, b: &M3) -> M3 {
    let mut c = [0.0f64; 9];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                c[i * 3 + j] += a[i * 3 + k] * b[k * 3 + j];
            }
        }
    }
    c
}

pub fn m3_mul_vec(m: &M3, (vx, vy, vz): (f64, f64, f64)) -> (f64, f64, f64) {
    (
        m[0] * vx + m[1] * vy + m[2] * vz,
        m[3] * vx + m[4] * vy + m[5] * vz,
        m[6] * vx + m[7] * vy + m[8] * vz,
    )
}

/// Transforms a point (w = 1).
pub fn m3_apply(m: &M3, (x, y): (f64, f64)) -> (f64, f64) {
    let (tx, ty, _) = m3_mul_vec(m, (x, y, 1.0));
    (tx, ty)
}

pub fn m3_det(m: &M3) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7])
  - m[1] * (m[3] * m[8] - m[5] * m[6])
  + m[2] * (m[3] * m[7] - m[4] * m[6])
}

/// Average linear scale factor of the transform, used for stroke widths and
/// text sizes.
pub fn m3_linear_scale(m: &M3) -> f64 {
    m3_det(m).abs().sqrt()
}

pub fn m3_translate2d(tx: f64, ty: f64) -> M3 {
    [1., 0., tx,
     0., 1., ty,
     0., 0.,  1.]
}

/// Rotation by `angle_rad`, clockwise on a y-down canvas.
pub fn m3_rotate2d(angle_rad: f64) -> M3 {
    let (s, c) = angle_rad.sin_cos();
    [ c, -s, 0.,
      s,  c, 0.,
      0., 0., 1.]
}

pub fn m3_scale2d(sx: f64, sy: f64) -> M3 {
    [sx,  0., 0.,
      0., sy, 0.,
      0., 0., 1.]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn identity_is_neutral() {
        let t = m3_translate2d(3.0, 4.0);
        assert_eq!(m3_mul(&m3_identity(), &t), t);
        assert_eq!(m3_mul(&t, &m3_identity()), t);
    }

    #[test]
    fn translate_then_rotate_composes_right_to_left() {
        // Processing order: translate(10, 0); rotate(PI/2); point at (1, 0)
        let m = m3_mul(&m3_translate2d(10.0, 0.0), &m3_rotate2d(std::f64::consts::FRAC_PI_2));
        assert!(close(m3_apply(&m, (1.0, 0.0)), (10.0, 1.0)));
    }

    #[test]
    fn linear_scale_of_uniform_scale() {
        let m = m3_mul(&m3_scale2d(2.0, 2.0), &m3_rotate2d(0.7));
        assert!((m3_linear_scale(&m) - 2.0).abs() < 1e-9);
    }
}
