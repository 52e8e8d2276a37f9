use lattice::Lattice;
use log::debug;
use vector3::*;

use std::cell::OnceCell;

use crate::segment::*;
use crate::{KptsError, KptsResult};

/// One-dimensional coordinates for a path in reciprocal space.
///
/// Segments are laid end to end on a single axis: each segment starts at the
/// accumulated length of the segments before it, whatever the real-space gap
/// between them. Special points are the segment endpoints.
///
/// A point that belongs to no segment takes the abscissa of a neighbour it
/// duplicates (a repeated last point, for instance); any other uncovered
/// point gets `f64::NAN` in [`x`](Self::x).
#[derive(Debug, Clone)]
pub struct KPathLinearizer {
    kpts: Vec<Vector3f64>,
    recp_latt: Option<Lattice>,
    unify_x: bool,
    eps: f64,
    ksegs: Vec<KSegment>,
    abscissa: OnceCell<Abscissa>,
}

#[derive(Debug, Clone)]
struct Abscissa {
    x: Vec<f64>,
    special_x: Vec<f64>,
    index_special_x: Vec<usize>,
    path_length: f64, // before unification
}

impl KPathLinearizer {
    /// `recp_latt` rows are b1, b2, b3; when given, `kpts` are fractional and
    /// are converted to Cartesian before any analysis.
    pub fn new(
        kpts: &[Vector3f64],
        recp_latt: Option<&Lattice>,
        unify_x: bool,
    ) -> KptsResult<KPathLinearizer> {
        if kpts.len() < 2 {
            return Err(KptsError::InsufficientInput(format!(
                "a k path needs at least 2 points, got {}",
                kpts.len()
            )));
        }

        let kpts = match recp_latt {
            Some(blatt) => {
                debug!("k path in the basis of\n{}", blatt);
                blatt.frac_to_cart_all(kpts)
            }
            None => kpts.to_vec(),
        };

        let ksegs = find_k_segments(&kpts, DEFAULT_EPSILON);

        Ok(KPathLinearizer {
            kpts,
            recp_latt: recp_latt.cloned(),
            unify_x,
            eps: DEFAULT_EPSILON,
            ksegs,
            abscissa: OnceCell::new(),
        })
    }

    /// Same as [`new`](Self::new) for rows that still have to be checked
    /// for three components.
    pub fn from_rows(
        rows: &[Vec<f64>],
        recp_latt: Option<&Lattice>,
        unify_x: bool,
    ) -> KptsResult<KPathLinearizer> {
        let kpts = from_rows(rows).map_err(|irow| {
            KptsError::Shape(format!(
                "k point {} has {} components, expected 3",
                irow,
                rows[irow].len()
            ))
        })?;

        KPathLinearizer::new(&kpts, recp_latt, unify_x)
    }

    /// Use `eps` for both segmentation and [`locate`](Self::locate).
    pub fn with_epsilon(mut self, eps: f64) -> KptsResult<KPathLinearizer> {
        if !(eps > 0.0) {
            return Err(KptsError::InvalidParameter(format!(
                "epsilon must be positive, got {}",
                eps
            )));
        }

        self.eps = eps;
        self.ksegs = find_k_segments(&self.kpts, eps);
        self.abscissa = OnceCell::new();

        Ok(self)
    }

    pub fn get_epsilon(&self) -> f64 {
        self.eps
    }

    pub fn is_unified(&self) -> bool {
        self.unify_x
    }

    /// Points in the basis used for the analysis.
    pub fn kpts(&self) -> &[Vector3f64] {
        &self.kpts
    }

    pub fn segments(&self) -> &[KSegment] {
        &self.ksegs
    }

    /// Abscissa of every point.
    pub fn x(&self) -> &[f64] {
        &self.abscissa().x
    }

    /// Abscissa of the special points, in path order.
    pub fn special_x(&self) -> &[f64] {
        &self.abscissa().special_x
    }

    pub fn special_indices(&self) -> &[usize] {
        &self.abscissa().index_special_x
    }

    /// Total length of the path, unaffected by `unify_x`.
    pub fn path_length(&self) -> f64 {
        self.abscissa().path_length
    }

    /// Abscissa values at which each query point lies on the path.
    ///
    /// A query matches a segment when it sits on the line between the two
    /// endpoints within the tolerance. A path that passes the same point
    /// several times yields several values; a point that is on no segment
    /// yields an empty list.
    pub fn locate(&self, kpts: &[Vector3f64]) -> Vec<Vec<f64>> {
        let abscissa = self.abscissa();

        kpts.iter()
            .map(|k| {
                let k = match &self.recp_latt {
                    Some(blatt) => blatt.frac_to_cart(k),
                    None => *k,
                };

                let mut xs: Vec<f64> = Vec::new();

                for seg in self.ksegs.iter() {
                    let k_st = self.kpts[seg.start];
                    let k_ed = self.kpts[seg.end];

                    if !on_line_segment(&k, &k_st, &k_ed, self.eps) {
                        continue;
                    }

                    let mut x = k.distance(&k_st);

                    if self.unify_x && abscissa.path_length > self.eps {
                        x /= abscissa.path_length;
                    }

                    x += abscissa.x[seg.start];

                    // a shared endpoint is seen from both of its segments
                    if !xs.iter().any(|v| (v - x).abs() <= self.eps) {
                        xs.push(x);
                    }
                }

                xs
            })
            .collect()
    }

    fn abscissa(&self) -> &Abscissa {
        self.abscissa.get_or_init(|| self.compute_x())
    }

    fn compute_x(&self) -> Abscissa {
        let mut x = vec![f64::NAN; self.kpts.len()];
        let mut index_special_x: Vec<usize> = Vec::new();

        let mut accumu_l = 0.0;

        for seg in self.ksegs.iter() {
            let k_st = self.kpts[seg.start];

            // a segment that resumes right after a break shares the special point
            match index_special_x.last() {
                Some(&last) if seg.start == last || seg.start == last + 1 => {}
                _ => index_special_x.push(seg.start),
            }
            index_special_x.push(seg.end);

            for ik in seg.start..=seg.end {
                x[ik] = accumu_l + self.kpts[ik].distance(&k_st);
            }

            accumu_l += self.kpts[seg.end].distance(&k_st);
        }

        // a repeat of a covered neighbour shares its abscissa
        for ik in 1..x.len() {
            if x[ik].is_nan() && self.repeats_covered(&x, ik, ik - 1) {
                x[ik] = x[ik - 1];
            }
        }

        for ik in (1..x.len()).rev() {
            if x[ik - 1].is_nan() && self.repeats_covered(&x, ik - 1, ik) {
                x[ik - 1] = x[ik];
            }
        }

        let path_length = accumu_l;

        if self.unify_x && path_length > self.eps {
            x.iter_mut().for_each(|v| *v /= path_length);
        }

        let special_x: Vec<f64> = index_special_x.iter().map(|&i| x[i]).collect();

        debug!("special coordinates in 1D: {:?}", special_x);

        Abscissa {
            x,
            special_x,
            index_special_x,
            path_length,
        }
    }

    fn repeats_covered(&self, x: &[f64], ik: usize, neighbour: usize) -> bool {
        !x[neighbour].is_nan() && same_point(&self.kpts[ik], &self.kpts[neighbour], self.eps)
    }
}

// x0 lies on the segment [x_st, x_ed]
fn on_line_segment(x0: &Vector3f64, x_st: &Vector3f64, x_ed: &Vector3f64, eps: f64) -> bool {
    let l = x_ed.distance(x_st);

    if l <= eps {
        return same_point(x0, x_st, eps);
    }

    let x0st = *x0 - *x_st;
    let x0ed = *x0 - *x_ed;

    let distance = x0st.cross_product(&x0ed).norm2() / l;

    // the dot product is about l times the overshoot past an endpoint
    distance <= eps && x0st.dot_product(&x0ed) <= eps * l
}
