use control::Control;
use lattice::Lattice;
use vector3::*;

use crate::{KPathLinearizer, KptsError, KptsResult, KPTS};

/// One straight piece of a band path, e.g. `L 0.5 0.5 0.5 G 0.0 0.0 0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct KLine {
    pub start_label: String,
    pub start: Vector3f64,
    pub end_label: String,
    pub end: Vector3f64,
}

pub struct KptsLine {
    k_frac: Vec<Vector3f64>,
    k_degeneracy: Vec<usize>,
    k_weight: Vec<f64>,
    klines: Vec<KLine>,
}

impl KptsLine {
    /// Sample every line with `npts` evenly spaced points, both ends included.
    ///
    /// Consecutive lines repeat their common endpoint.
    pub fn new(klines: Vec<KLine>, npts: usize) -> KptsResult<KptsLine> {
        if klines.is_empty() {
            return Err(KptsError::InsufficientInput("no k lines given".to_string()));
        }

        if npts < 2 {
            return Err(KptsError::InvalidParameter(format!(
                "need at least 2 points per k line, got {}",
                npts
            )));
        }

        let mut k_frac = Vec::with_capacity(klines.len() * npts);

        for kline in klines.iter() {
            let space = (kline.end - kline.start) / ((npts - 1) as f64);

            for i in 0..npts {
                k_frac.push(kline.start + space * i as f64);
            }
        }

        let nk = k_frac.len();

        Ok(KptsLine {
            k_frac,
            k_degeneracy: vec![1; nk],
            k_weight: vec![1.0 / nk as f64; nk],
            klines,
        })
    }

    pub fn parse(text: &str, npts: usize) -> KptsResult<KptsLine> {
        KptsLine::new(parse_k_line(text)?, npts)
    }

    pub fn get_klines(&self) -> &[KLine] {
        &self.klines
    }

    pub fn get_k_frac_all(&self) -> &[Vector3f64] {
        &self.k_frac
    }

    /// Labels of the special points; a jump between two lines is shown as
    /// `end|start`.
    pub fn get_special_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::with_capacity(self.klines.len() + 1);

        for kline in self.klines.iter() {
            match labels.last_mut() {
                None => labels.push(kline.start_label.clone()),
                Some(last) => {
                    if *last != kline.start_label {
                        *last = format!("{}|{}", last, kline.start_label);
                    }
                }
            }

            labels.push(kline.end_label.clone());
        }

        labels
    }

    pub fn linearizer(
        &self,
        recp_latt: Option<&Lattice>,
        unify_x: bool,
        eps: f64,
    ) -> KptsResult<KPathLinearizer> {
        KPathLinearizer::new(&self.k_frac, recp_latt, unify_x)?.with_epsilon(eps)
    }

    /// Linearizer with `kpath_epsilon` and `kpath_unify_x` from the control
    /// parameters.
    pub fn linearizer_from_control(
        &self,
        recp_latt: Option<&Lattice>,
        control: &Control,
    ) -> KptsResult<KPathLinearizer> {
        self.linearizer(
            recp_latt,
            control.get_kpath_unify_x(),
            control.get_kpath_epsilon(),
        )
    }
}

impl KPTS for KptsLine {
    fn get_k_mesh(&self) -> Option<[i32; 3]> {
        None
    }

    fn get_k_frac(&self, k_index: usize) -> Vector3f64 {
        self.k_frac[k_index]
    }

    fn get_k_weight(&self, k_index: usize) -> f64 {
        self.k_weight[k_index]
    }

    fn get_k_degeneracy(&self, k_index: usize) -> usize {
        self.k_degeneracy[k_index]
    }

    fn get_n_kpts(&self) -> usize {
        self.k_frac.len()
    }
}

/// Parse `label k1 k2 k3 label k1 k2 k3` lines; blank lines and `#`
/// comments are skipped.
pub fn parse_k_line(text: &str) -> KptsResult<Vec<KLine>> {
    let mut klines = Vec::new();

    for (iline, line) in text.lines().enumerate() {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };

        let s: Vec<&str> = line.split_whitespace().collect();

        if s.is_empty() {
            continue;
        }

        if s.len() != 8 {
            return Err(KptsError::Parse {
                line: iline + 1,
                reason: format!("expected 8 fields, got {}", s.len()),
            });
        }

        let start = parse_vector(&s[1..4], iline + 1)?;
        let end = parse_vector(&s[5..8], iline + 1)?;

        klines.push(KLine {
            start_label: s[0].to_string(),
            start,
            end_label: s[4].to_string(),
            end,
        });
    }

    Ok(klines)
}

fn parse_vector(s: &[&str], line: usize) -> KptsResult<Vector3f64> {
    let mut v = [0.0; 3];

    for (x, field) in v.iter_mut().zip(s.iter()) {
        *x = field.parse().map_err(|_| KptsError::Parse {
            line,
            reason: format!("'{}' is not a number", field),
        })?;
    }

    Ok(Vector3f64::from_array(v))
}
