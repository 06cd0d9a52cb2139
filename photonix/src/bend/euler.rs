//! Euler (clothoid-blend) bend synthesis.
//!
//! The unit curve has curvature rising linearly with arc length,
//! `k(s) = s`, until it reaches `1 / Rp` after turning `p * angle / 2`.
//! A circular arc of radius `Rp` covers the middle `(1 - p) * angle`,
//! and a mirrored clothoid brings the curvature back to zero.

use std::f64::consts::SQRT_2;

use geometry::prelude::*;

use crate::bend::BendPath;
use crate::error::{Error, Result};

/// Number of terms in the Fresnel series.
const FRESNEL_TERMS: i32 = 8;

/// Samples the clothoid `x(s) = ∫cos(u²/2)`, `y(s) = ∫sin(u²/2)` at `n`
/// evenly spaced arc lengths in `[0, s]`.
fn fresnel(s: f64, n: usize) -> Vec<DPoint> {
    linspace(0., s / SQRT_2, n)
        .map(|t| {
            let (mut x, mut y) = (0., 0.);
            let mut fact_2n = 1.;
            for k in 0..FRESNEL_TERMS {
                if k > 0 {
                    fact_2n *= ((2 * k - 1) * (2 * k)) as f64;
                }
                let fact_2n1 = fact_2n * (2 * k + 1) as f64;
                let sign = if k % 2 == 0 { 1. } else { -1. };
                x += sign * t.powi(4 * k + 1) / (fact_2n * (4 * k + 1) as f64);
                y += sign * t.powi(4 * k + 3) / (fact_2n1 * (4 * k + 3) as f64);
            }
            DPoint::new(SQRT_2 * x, SQRT_2 * y)
        })
        .collect()
}

fn linspace(start: f64, stop: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (stop - start) / (n - 1) as f64
    } else {
        0.
    };
    (0..n).map(move |i| {
        if i + 1 == n {
            stop
        } else {
            start + step * i as f64
        }
    })
}

/// Synthesizes an Euler bend starting at the origin heading East.
///
/// * `radius`: the nominal radius, in micrometers.
/// * `angle`: the signed turn in degrees; positive turns counterclockwise.
/// * `p`: the fraction of the turn made by the clothoid sections. `0` gives a
///   circular arc.
/// * `effective_radius`: if `true`, the curve is scaled so its endpoints
///   match a circular arc of `radius`; otherwise it is scaled so its minimum
///   radius of curvature equals `radius`.
/// * `npoints`: the number of points per full turn.
///
/// ```
/// # use approx::assert_abs_diff_eq;
/// # use photonix::bend::synthesize_bend;
/// let bend = synthesize_bend(10., 90., 0.5, true, 720)?;
/// assert_abs_diff_eq!(bend.dx, 10., epsilon = 1e-9);
/// assert_abs_diff_eq!(bend.dy, 10., epsilon = 1e-9);
/// assert!(bend.radius_min < 10.);
/// # Ok::<(), photonix::error::Error>(())
/// ```
pub fn synthesize_bend(
    radius: f64,
    angle: f64,
    p: f64,
    effective_radius: bool,
    npoints: usize,
) -> Result<BendPath> {
    if !(radius.is_finite() && radius > 0.) {
        return Err(Error::config(format!(
            "bend radius must be positive, got {radius}"
        )));
    }
    let turn = angle.abs();
    if !(turn > 0. && turn < 360.) {
        return Err(Error::config(format!(
            "bend angle must be nonzero and within (-360, 360) degrees, got {angle}"
        )));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::config(format!(
            "euler fraction must be within [0, 1], got {p}"
        )));
    }
    if npoints < 4 {
        return Err(Error::config(format!(
            "bends need at least 4 points per turn, got {npoints}"
        )));
    }

    let alpha = turn.to_radians();
    // Clothoid length and end radius of the unit curve.
    let (sp, rp) = if p > 0. {
        let sp = (p * alpha).sqrt();
        (sp, 1. / sp)
    } else {
        (0., 1.)
    };
    let half_length = sp + rp * alpha * (1. - p) / 2.;

    let n_half = ((npoints as f64 * turn / 720.).round() as usize).max(3);
    let n_clothoid = if p > 0. {
        ((sp / half_length * n_half as f64).round() as usize).max(2)
    } else {
        0
    };
    let n_arc = n_half.saturating_sub(n_clothoid).max(2);

    let (mut half, offset) = if n_clothoid > 0 {
        let clothoid = fresnel(sp, n_clothoid);
        let end = clothoid[clothoid.len() - 1];
        let offset = DPoint::new(
            end.x - rp * (p * alpha / 2.).sin(),
            end.y - rp * (1. - (p * alpha / 2.).cos()),
        );
        (clothoid, offset)
    } else {
        (vec![DPoint::zero()], DPoint::zero())
    };
    if half_length > sp {
        half.extend(linspace(sp, half_length, n_arc).skip(1).map(|s| {
            let phi = (s - sp) / rp + p * alpha / 2.;
            DPoint::new(rp * phi.sin(), rp * (1. - phi.cos())) + offset
        }));
    }

    // The second half is the first, reversed, mirrored, and turned to continue
    // from the midpoint.
    let mid = half[half.len() - 1];
    let mirrored_mid = DPoint::new(mid.x, -mid.y).rotate(turn - 180.);
    let mut points: Vec<DPoint> = half[..half.len() - 1].to_vec();
    points.extend(
        half.iter()
            .rev()
            .map(|q| DPoint::new(q.x, -q.y).rotate(turn - 180.) - mirrored_mid + mid),
    );
    points.dedup();

    let end = points[points.len() - 1];
    let chord = end.norm();
    let r_eff = chord / (2. * (alpha / 2.).sin());
    let scale = if effective_radius {
        radius / r_eff
    } else {
        radius / rp
    };
    let sign = angle.signum();
    let points: Vec<DPoint> = points
        .into_iter()
        .map(|q| DPoint::new(q.x * scale, sign * q.y * scale))
        .collect();
    let length = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    let end = points[points.len() - 1];

    tracing::trace!(
        radius,
        angle,
        p,
        effective_radius,
        npoints = points.len(),
        "synthesized euler bend"
    );

    Ok(BendPath {
        points,
        length,
        radius_min: rp * scale,
        radius_eff: r_eff * scale,
        dx: end.x,
        dy: end.y,
        angle,
    })
}
