use log::debug;
use vector3::*;

/// Tolerance used for point and direction comparisons unless overridden.
pub const DEFAULT_EPSILON: f64 = 1.0E-8;

/// A maximal straight run of the path, `kpts[start..=end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KSegment {
    pub start: usize,
    pub end: usize,
}

impl KSegment {
    pub fn new(start: usize, end: usize) -> KSegment {
        KSegment { start, end }
    }

    pub fn n_points(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, ik: usize) -> bool {
        ik >= self.start && ik <= self.end
    }

    pub fn as_tuple(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

pub fn same_point(a: &Vector3f64, b: &Vector3f64, eps: f64) -> bool {
    a.distance(b) <= eps
}

// dot product of two consecutive unit steps
pub fn is_direction_change(dot: f64, eps: f64) -> bool {
    (dot - 1.0).abs() > eps
}

/// Split a k-point path into its straight line segments.
///
/// A segment ends where the direction of the path changes. The next one
/// starts at that turning point, or one point later when the step leaving
/// the turning point is zero (a duplicated point) or turns again (an
/// isolated point between two lines). A trailing single point is dropped.
pub fn find_k_segments(kpts: &[Vector3f64], eps: f64) -> Vec<KSegment> {
    let nkpts = kpts.len();

    let mut ksegs = Vec::new();

    if nkpts < 2 {
        return ksegs;
    }

    // zero_step[i]: kpts[i + 1] duplicates kpts[i]
    let zero_step: Vec<bool> = kpts
        .windows(2)
        .map(|w| same_point(&w[0], &w[1], eps))
        .collect();

    let unit_steps: Vec<Vector3f64> = kpts
        .windows(2)
        .zip(zero_step.iter())
        .map(|(w, &zero)| {
            if zero {
                Vector3f64::zeros()
            } else {
                (w[1] - w[0]).normalized_or_zero(0.0)
            }
        })
        .collect();

    // turn[i]: direction changes at kpts[i + 1]
    let turn: Vec<bool> = unit_steps
        .windows(2)
        .map(|w| is_direction_change(w[0].dot_product(&w[1]), eps))
        .collect();

    let mut st = 0;
    let mut ed = 2;

    while ed < nkpts {
        if turn[ed - 2] {
            push_segment(&mut ksegs, st, ed - 1);

            st = ed - 1;

            if zero_step[ed - 1] || (ed < nkpts - 1 && turn[ed - 1]) {
                st += 1;
                ed += 1;
            }
        }

        ed += 1;
    }

    push_segment(&mut ksegs, st, nkpts - 1);

    debug!(
        "found k segments: {:?}",
        ksegs.iter().map(|s| s.as_tuple()).collect::<Vec<_>>()
    );

    ksegs
}

fn push_segment(ksegs: &mut Vec<KSegment>, st: usize, ed: usize) {
    if ed > st {
        ksegs.push(KSegment::new(st, ed));
    }
}
