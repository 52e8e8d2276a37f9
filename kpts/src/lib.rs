mod error;
pub use error::*;

mod segment;
pub use segment::*;

mod kpath;
pub use kpath::*;

mod line;
pub use line::*;

mod mesh;
pub use mesh::*;

use control::Control;
use lattice::Lattice;
use symmetry::{IrMeshDriver, SpgCell};
use vector3::Vector3f64;

// K-point provider interface.
//
// Implementations expose a unified view of:
// - fractional coordinates
// - integration weights
// - degeneracy bookkeeping
// - the mesh divisions, for mesh-based providers
pub trait KPTS {
    fn get_k_frac(&self, k_index: usize) -> Vector3f64;
    fn get_k_degeneracy(&self, k_index: usize) -> usize;
    fn get_k_weight(&self, k_index: usize) -> f64;
    fn get_n_kpts(&self) -> usize;
    fn get_k_mesh(&self) -> Option<[i32; 3]>;

    // k_cart = k1*b1 + k2*b2 + k3*b3
    fn frac_to_cart(&self, k_frac: &Vector3f64, blatt: &Lattice) -> Vector3f64 {
        blatt.frac_to_cart(k_frac)
    }

    fn display(&self) {
        println!();
        println!("   {:-^88}", " k-points (fractional) ");
        println!();

        println!("{:12} {:^6} {}", "", "nkpt =", self.get_n_kpts());
        println!();

        println!(
            "{:12} {:^6} {:^16} {:^16} {:^16} {:^12}",
            "", "index", "k1", "k2", "k3", "degeneracy"
        );

        for ik in 0..self.get_n_kpts() {
            let xk_frac = self.get_k_frac(ik);
            let xk_degeneracy = self.get_k_degeneracy(ik);

            println!(
                "{:12} {:^6} {:16.12} {:16.12} {:16.12} {:^12}",
                "",
                ik + 1,
                xk_frac.x,
                xk_frac.y,
                xk_frac.z,
                xk_degeneracy
            );
        }
    }
}

// Factory for k-point generation modes.
//
// "kmesh" builds an MPGrid from the control mesh settings; with symmetry on,
// `cell` is required and so is `driver`, unless the spglib feature supplies
// a default one built with `symprec`. "kline" samples the lines in `kline`.
pub fn new(
    control: &Control,
    cell: Option<SpgCell>,
    driver: Option<Box<dyn IrMeshDriver>>,
    kline: Option<&str>,
) -> KptsResult<Box<dyn KPTS>> {
    match control.get_kpts_scheme() {
        "kmesh" => {
            let kmesh = control.get_kmesh();

            let mut grid = MPGrid::new(kmesh[0], kmesh[1], kmesh[2])?
                .with_shift(&control.get_kmesh_shift())?
                .with_sort(control.get_kmesh_sort());

            if let Some(cell) = cell {
                grid = grid.with_cell(cell);
            }

            if let Some(driver) = driver.or_else(|| default_driver(control)) {
                grid = grid.with_driver(driver);
            }

            Ok(Box::new(KptsMesh::new(&grid, control.get_symmetry())?))
        }

        "kline" => {
            let text = kline.ok_or_else(|| {
                KptsError::InsufficientInput("kline scheme needs k line input".to_string())
            })?;

            Ok(Box::new(KptsLine::parse(text, control.get_kline_npts())?))
        }

        other => Err(KptsError::InvalidParameter(format!(
            "unsupported k-point scheme '{}'",
            other
        ))),
    }
}

#[cfg(feature = "spglib")]
fn default_driver(control: &Control) -> Option<Box<dyn IrMeshDriver>> {
    Some(Box::new(symmetry::SymmetryDriverSPGLIB::new(
        control.get_symprec(),
        true,
    )))
}

#[cfg(not(feature = "spglib"))]
fn default_driver(_control: &Control) -> Option<Box<dyn IrMeshDriver>> {
    None
}
