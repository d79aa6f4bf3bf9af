use crate::types::Point;

/// Compress a closed border chain to the endpoints of its straight runs.
///
/// Consecutive border pixels are 8-neighbours, so a point is interior to a
/// run exactly when the step into it equals the step out of it.
pub fn compress_runs(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |from: Point, to: Point| (to.x - from.x, to.y - from.y);
    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    // A chain with no turns cannot close; keep it untouched.
    if kept.is_empty() { points.to_vec() } else { kept }
}
