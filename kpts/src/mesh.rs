use itertools::iproduct;
use log::info;
use symmetry::*;
use vector3::*;

use crate::{KptsError, KptsResult, KPTS};

/// Monkhorst-Pack k mesh.
///
/// Without a shift the mesh always contains Gamma. The irreducible part is
/// computed by an injected [`IrMeshDriver`] and needs the unit cell.
pub struct MPGrid {
    kdivs: [i32; 3],
    shift: [i32; 3],
    sort: bool,
    cell: Option<SpgCell>,
    driver: Option<Box<dyn IrMeshDriver>>,
}

impl MPGrid {
    pub fn new(nk1: i32, nk2: i32, nk3: i32) -> KptsResult<MPGrid> {
        let kdivs = [nk1, nk2, nk3];

        if kdivs.iter().any(|&n| n < 1) {
            return Err(KptsError::Shape(format!(
                "mesh divisions must be positive, got {:?}",
                kdivs
            )));
        }

        Ok(MPGrid {
            kdivs,
            shift: [0, 0, 0],
            sort: false,
            cell: None,
            driver: None,
        })
    }

    /// Half-step shift per axis, each component 0 or 1.
    pub fn with_shift(mut self, shift: &[i32]) -> KptsResult<MPGrid> {
        let shift: [i32; 3] = match shift {
            [s1, s2, s3] => [*s1, *s2, *s3],
            _ => {
                return Err(KptsError::Shape(format!(
                    "expected 3 shift components, got {}",
                    shift.len()
                )))
            }
        };

        if shift.iter().any(|&s| s != 0 && s != 1) {
            return Err(KptsError::Shape(format!(
                "shift components must be 0 or 1, got {:?}",
                shift
            )));
        }

        self.shift = shift;

        Ok(self)
    }

    /// Order the mesh by distance from Gamma.
    pub fn with_sort(mut self, sort: bool) -> MPGrid {
        self.sort = sort;
        self
    }

    pub fn with_cell(mut self, cell: SpgCell) -> MPGrid {
        self.cell = Some(cell);
        self
    }

    pub fn with_driver(mut self, driver: Box<dyn IrMeshDriver>) -> MPGrid {
        self.driver = Some(driver);
        self
    }

    pub fn get_kdivs(&self) -> [i32; 3] {
        self.kdivs
    }

    pub fn get_shift(&self) -> [i32; 3] {
        self.shift
    }

    /// Integer mesh, centered on the origin.
    pub fn grids(&self) -> Vec<Vector3i32> {
        uniform_int_kmesh(self.kdivs, self.sort)
    }

    /// Fractional coordinates, (grid + shift / 2) / kdivs.
    pub fn kpts(&self) -> Vec<Vector3f64> {
        self.grids()
            .iter()
            .map(|g| Vector3f64::from_array(grid_to_frac(g, self.kdivs, self.shift)))
            .collect()
    }

    pub fn nkpts(&self) -> usize {
        self.kdivs.iter().product::<i32>() as usize
    }

    /// Irreducible mesh as returned by the driver; the mapping is indexed
    /// like [`grids`](Self::grids).
    pub fn get_ir_grids(&self) -> KptsResult<IrMesh> {
        let cell = self.cell.as_ref().ok_or_else(|| {
            KptsError::InsufficientInput("need cell to compute irreducible kpoints".to_string())
        })?;

        let driver = self.driver.as_ref().ok_or_else(|| {
            KptsError::InsufficientInput(
                "no symmetry driver to compute irreducible kpoints".to_string(),
            )
        })?;

        let (mapping, kpts) =
            driver.get_ir_reciprocal_mesh(&self.grids(), self.kdivs, self.shift, cell)?;

        Ok(IrMesh::new(mapping, kpts)?)
    }
}

/// Integer grid of `kdivs[0] x kdivs[1] x kdivs[2]` points, the last axis
/// running fastest, shifted by `(n - 1) / 2` per axis.
///
/// With `sort` the points are stably ordered by their length.
pub fn uniform_int_kmesh(kdivs: [i32; 3], sort: bool) -> Vec<Vector3i32> {
    let centering = Vector3i32::new(
        (kdivs[0] - 1) / 2,
        (kdivs[1] - 1) / 2,
        (kdivs[2] - 1) / 2,
    );

    let mut ikmesh: Vec<Vector3i32> = iproduct!(0..kdivs[0], 0..kdivs[1], 0..kdivs[2])
        .map(|(ik1, ik2, ik3)| Vector3i32::new(ik1, ik2, ik3) - centering)
        .collect();

    if sort {
        ikmesh.sort_by_key(|g| g.norm_squared());
    }

    ikmesh
}

pub struct KptsMesh {
    k_frac: Vec<Vector3f64>,
    k_degeneracy: Vec<usize>,
    k_weight: Vec<f64>,
    k_mesh: [i32; 3],
}

impl KptsMesh {
    /// With `symmetry` only the irreducible points are kept, weighted by
    /// their degeneracy.
    pub fn new(grid: &MPGrid, symmetry: bool) -> KptsResult<KptsMesh> {
        let k_mesh = grid.get_kdivs();

        if !symmetry {
            let k_frac = grid.kpts();
            let nk = k_frac.len();

            return Ok(KptsMesh {
                k_frac,
                k_degeneracy: vec![1; nk],
                k_weight: vec![1.0 / nk as f64; nk],
                k_mesh,
            });
        }

        let ir_mesh = grid.get_ir_grids()?;

        info!(
            "k mesh {:?}: {} irreducible of {} points",
            k_mesh,
            ir_mesh.get_n_ir_kpts(),
            ir_mesh.get_n_kpts()
        );

        let k_frac = ir_mesh
            .get_kpts()
            .iter()
            .map(|k| Vector3f64::from_array(*k))
            .collect();

        Ok(KptsMesh {
            k_frac,
            k_degeneracy: ir_mesh.get_degeneracy().to_vec(),
            k_weight: ir_mesh.get_weights(),
            k_mesh,
        })
    }
}

impl KPTS for KptsMesh {
    fn get_k_mesh(&self) -> Option<[i32; 3]> {
        Some(self.k_mesh)
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
