use log::debug;
use thiserror::Error;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
    str::FromStr,
};

/// Errors raised while reading k-point control parameters.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for '{key}': '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("unknown parameter : {0}")]
    UnknownKey(String),
}

pub type ControlResult<T> = std::result::Result<T, ControlError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    kpts_scheme: String, // kmesh, kline

    kmesh: [i32; 3],
    kmesh_shift: [i32; 3],
    kmesh_sort: bool,

    symmetry: bool,
    symprec: f64,

    kpath_epsilon: f64,
    kpath_unify_x: bool,

    kline_npts: usize,
}

impl Default for Control {
    fn default() -> Self {
        Control {
            kpts_scheme: "kmesh".to_string(),
            kmesh: [1, 1, 1],
            kmesh_shift: [0, 0, 0],
            kmesh_sort: false,
            symmetry: false,
            symprec: 1.0E-5,
            kpath_epsilon: 1.0E-8,
            kpath_unify_x: false,
            kline_npts: 11,
        }
    }
}

impl Control {
    pub fn new() -> Control {
        Control::default()
    }

    pub fn get_kpts_scheme(&self) -> &str {
        &self.kpts_scheme
    }

    pub fn get_kmesh(&self) -> [i32; 3] {
        self.kmesh
    }

    pub fn get_kmesh_shift(&self) -> [i32; 3] {
        self.kmesh_shift
    }

    pub fn get_kmesh_sort(&self) -> bool {
        self.kmesh_sort
    }

    pub fn get_symmetry(&self) -> bool {
        self.symmetry
    }

    pub fn get_symprec(&self) -> f64 {
        self.symprec
    }

    pub fn get_kpath_epsilon(&self) -> f64 {
        self.kpath_epsilon
    }

    pub fn get_kpath_unify_x(&self) -> bool {
        self.kpath_unify_x
    }

    pub fn get_kline_npts(&self) -> usize {
        self.kline_npts
    }

    pub fn read_file(&mut self, inpfile: &str) -> ControlResult<()> {
        let file = File::open(inpfile).map_err(|source| ControlError::Io {
            path: PathBuf::from(inpfile),
            source,
        })?;

        let lines: Vec<String> = BufReader::new(file)
            .lines()
            .collect::<Result<_, _>>()
            .map_err(|source| ControlError::Io {
                path: PathBuf::from(inpfile),
                source,
            })?;

        for line in lines.iter() {
            self.read_line(line)?;
        }

        Ok(())
    }

    /// Parse `key = value` lines on top of the defaults.
    pub fn parse(text: &str) -> ControlResult<Control> {
        let mut control = Control::new();

        for line in text.lines() {
            control.read_line(line)?;
        }

        Ok(control)
    }

    fn read_line(&mut self, line: &str) -> ControlResult<()> {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };

        let s: Vec<&str> = line.splitn(2, '=').map(|x| x.trim()).collect();

        let key = s[0];
        let value = s.get(1).copied().unwrap_or("");

        match key {
            "kpts_scheme" => {
                let scheme = value.to_lowercase();
                if scheme != "kmesh" && scheme != "kline" {
                    return Err(invalid(key, value));
                }
                self.kpts_scheme = scheme;
            }

            "kmesh" => {
                let kmesh = parse_triple::<i32>(key, value)?;
                if kmesh.iter().any(|&n| n < 1) {
                    return Err(invalid(key, value));
                }
                self.kmesh = kmesh;
            }

            "kmesh_shift" => {
                let shift = parse_triple::<i32>(key, value)?;
                if shift.iter().any(|&s| s != 0 && s != 1) {
                    return Err(invalid(key, value));
                }
                self.kmesh_shift = shift;
            }

            "kmesh_sort" => {
                self.kmesh_sort = parse_value(key, value)?;
            }

            "symmetry" => {
                self.symmetry = parse_value(key, value)?;
            }

            "symprec" => {
                self.symprec = parse_positive(key, value)?;
            }

            "kpath_epsilon" => {
                self.kpath_epsilon = parse_positive(key, value)?;
            }

            "kpath_unify_x" => {
                self.kpath_unify_x = parse_value(key, value)?;
            }

            "kline_npts" => {
                let npts: usize = parse_value(key, value)?;
                if npts < 2 {
                    return Err(invalid(key, value));
                }
                self.kline_npts = npts;
            }

            "" => {}

            _ => {
                return Err(ControlError::UnknownKey(line.trim().to_string()));
            }
        }

        if !key.is_empty() {
            debug!("control: {} = {}", key, value);
        }

        Ok(())
    }

    pub fn display(&self) {
        const OUT_WIDTH1: usize = 28;
        const OUT_WIDTH2: usize = 18;

        println!("   {:-^80}", " control parameters ");
        println!();

        println!(
            "   {:<width1$} = {:>width2$}",
            "kpts_scheme",
            self.get_kpts_scheme(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        let kmesh = self.get_kmesh();
        println!(
            "   {:<width1$} = {:>width2$}",
            "kmesh",
            format!("{} {} {}", kmesh[0], kmesh[1], kmesh[2]),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        let shift = self.get_kmesh_shift();
        println!(
            "   {:<width1$} = {:>width2$}",
            "kmesh_shift",
            format!("{} {} {}", shift[0], shift[1], shift[2]),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "kmesh_sort",
            self.get_kmesh_sort(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "symmetry",
            self.get_symmetry(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$e}",
            "symprec",
            self.get_symprec(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$e}",
            "kpath_epsilon",
            self.get_kpath_epsilon(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "kpath_unify_x",
            self.get_kpath_unify_x(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "kline_npts",
            self.get_kline_npts(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!();
    }
}

fn invalid(key: &str, value: &str) -> ControlError {
    ControlError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> ControlResult<T> {
    value.parse().map_err(|_| invalid(key, value))
}

fn parse_positive(key: &str, value: &str) -> ControlResult<f64> {
    let v: f64 = parse_value(key, value)?;

    if v > 0.0 {
        Ok(v)
    } else {
        Err(invalid(key, value))
    }
}

fn parse_triple<T: FromStr + Copy>(key: &str, value: &str) -> ControlResult<[T; 3]> {
    let s: Vec<T> = value
        .split_whitespace()
        .map(|x| x.parse::<T>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid(key, value))?;

    match s.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(invalid(key, value)),
    }
}
