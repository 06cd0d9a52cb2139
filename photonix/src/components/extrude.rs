//! Sweeping a strip along a sampled centerline.

use geometry::prelude::*;

/// The outline of a strip of `width`, offset by `offset` to the left of the
/// centerline `points`.
///
/// Normals at the two ends follow `start_angle` and `end_angle` (degrees) so
/// the strip meets abutting geometry squarely; interior normals use central
/// differences. Returns the left edge followed by the reversed right edge.
pub(crate) fn extrude(
    points: &[DPoint],
    start_angle: f64,
    end_angle: f64,
    width: f64,
    offset: f64,
) -> Vec<DPoint> {
    let n = points.len();
    let normals: Vec<DPoint> = (0..n)
        .map(|i| {
            let tangent = if i == 0 {
                DPoint::new(1., 0.).rotate(start_angle)
            } else if i + 1 == n {
                DPoint::new(1., 0.).rotate(end_angle)
            } else {
                let d = points[i + 1] - points[i - 1];
                d.scale(1. / d.norm())
            };
            DPoint::new(-tangent.y, tangent.x)
        })
        .collect();

    let left = offset + width / 2.;
    let right = offset - width / 2.;
    let mut outline: Vec<DPoint> = points
        .iter()
        .zip(&normals)
        .map(|(&p, n)| p + n.scale(left))
        .collect();
    outline.extend(
        points
            .iter()
            .zip(&normals)
            .rev()
            .map(|(&p, n)| p + n.scale(right)),
    );
    outline
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn straight_line_gives_rectangle() {
        let points = [DPoint::new(0., 0.), DPoint::new(5., 0.), DPoint::new(10., 0.)];
        let outline = extrude(&points, 0., 0., 2., 0.);
        let expected = [
            (0., 1.),
            (5., 1.),
            (10., 1.),
            (10., -1.),
            (5., -1.),
            (0., -1.),
        ];
        assert_eq!(outline.len(), expected.len());
        for (p, (x, y)) in outline.iter().zip(expected) {
            assert_abs_diff_eq!(p.x, x, epsilon = 1e-12);
            assert_abs_diff_eq!(p.y, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn end_normals_follow_headings() {
        let points = [DPoint::new(0., 0.), DPoint::new(1., 1.), DPoint::new(1., 2.)];
        let outline = extrude(&points, 0., 90., 1., 0.5);
        // Offset strip spans 0..1 to the left of the path.
        assert_abs_diff_eq!(outline[0].y, 1., epsilon = 1e-12);
        assert_abs_diff_eq!(outline[2].x, 0., epsilon = 1e-12);
        assert_abs_diff_eq!(outline[3].x, 1., epsilon = 1e-12);
        assert_abs_diff_eq!(outline[5].y, 0., epsilon = 1e-12);
    }
}
