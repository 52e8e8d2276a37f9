use itertools::Itertools;
use thiserror::Error;
use vector3::*;

use std::collections::HashMap;

mod rotation;
pub use rotation::*;

#[cfg(feature = "spglib")]
mod spglib_sys;

#[cfg(feature = "spglib")]
mod spglib;
#[cfg(feature = "spglib")]
pub use crate::spglib::*;

/// Errors raised by the symmetry collaborators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SymmetryError {
    #[error("bad cell: {0}")]
    BadCell(String),

    #[error("grid does not match mesh {mesh:?}: {reason}")]
    MeshMismatch { mesh: [i32; 3], reason: String },

    #[error("symmetry reduction failed: {0}")]
    Failed(String),
}

pub type SymmetryResult<T> = std::result::Result<T, SymmetryError>;

/// Cell description handed to the symmetry collaborators.
///
/// Lattice vectors are stored one per row, atomic positions are fractional
/// and every atom carries an integer species id.
#[derive(Debug, Clone, PartialEq)]
pub struct SpgCell {
    lattice: [[f64; 3]; 3],
    positions: Vec<[f64; 3]>,
    types: Vec<i32>,
}

impl SpgCell {
    pub fn new(
        lattice: [[f64; 3]; 3],
        positions: Vec<[f64; 3]>,
        types: Vec<i32>,
    ) -> SymmetryResult<SpgCell> {
        if positions.is_empty() {
            return Err(SymmetryError::BadCell("cell has no atoms".to_string()));
        }

        if positions.len() != types.len() {
            return Err(SymmetryError::BadCell(format!(
                "{} positions but {} species ids",
                positions.len(),
                types.len()
            )));
        }

        let a = Vector3f64::from_array(lattice[0]);
        let b = Vector3f64::from_array(lattice[1]);
        let c = Vector3f64::from_array(lattice[2]);

        if a.cross_product(&b).dot_product(&c).abs() < 1.0E-12 {
            return Err(SymmetryError::BadCell(
                "lattice vectors are linearly dependent".to_string(),
            ));
        }

        Ok(SpgCell {
            lattice,
            positions,
            types,
        })
    }

    /// Species labels are numbered by first appearance.
    pub fn from_species(
        lattice: [[f64; 3]; 3],
        positions: Vec<[f64; 3]>,
        species: &[String],
    ) -> SymmetryResult<SpgCell> {
        let unique: Vec<&String> = species.iter().unique().collect();

        let types = species
            .iter()
            .map(|sp| unique.iter().position(|u| *u == sp).unwrap_or(0) as i32)
            .collect();

        SpgCell::new(lattice, positions, types)
    }

    pub fn get_lattice(&self) -> &[[f64; 3]; 3] {
        &self.lattice
    }

    pub fn get_positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn get_types(&self) -> &[i32] {
        &self.types
    }

    pub fn get_n_atoms(&self) -> usize {
        self.positions.len()
    }
}

/// Symmetry-analysis capability used to reduce a uniform k mesh.
///
/// `grid_address` is the full integer mesh in the caller's enumeration
/// order. The driver returns the mapping, indexed the same way, from every
/// grid point to the grid index labelling its class, and the fractional
/// coordinates of the reduced points, one per class in order of first
/// appearance in the mapping.
pub trait IrMeshDriver {
    fn get_ir_reciprocal_mesh(
        &self,
        grid_address: &[Vector3i32],
        mesh: [i32; 3],
        is_shift: [i32; 3],
        cell: &SpgCell,
    ) -> SymmetryResult<(Vec<usize>, Vec<[f64; 3]>)>;
}

/// Irreducible part of a uniform mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct IrMesh {
    mapping: Vec<usize>,    // full-grid index -> class label (a full-grid index)
    ir_indices: Vec<usize>, // class labels, in order of first appearance
    degeneracy: Vec<usize>, // members per class
    kpts: Vec<[f64; 3]>,    // reduced fractional points, one per class
}

impl IrMesh {
    /// Keep a driver result as given and count the members of each class.
    pub fn new(mapping: Vec<usize>, kpts: Vec<[f64; 3]>) -> SymmetryResult<IrMesh> {
        let nkpt = mapping.len();

        if let Some(bad) = mapping.iter().find(|&&m| m >= nkpt) {
            return Err(SymmetryError::Failed(format!(
                "mapping entry {} out of range for {} points",
                bad, nkpt
            )));
        }

        let ir_indices: Vec<usize> = mapping.iter().copied().unique().collect();

        if ir_indices.len() != kpts.len() {
            return Err(SymmetryError::Failed(format!(
                "{} reduced points for {} classes",
                kpts.len(),
                ir_indices.len()
            )));
        }

        let degeneracy: Vec<usize> = ir_indices
            .iter()
            .map(|&ir| mapping.iter().filter(|&&m| m == ir).count())
            .collect();

        Ok(IrMesh {
            mapping,
            ir_indices,
            degeneracy,
            kpts,
        })
    }

    /// The same classes labelled by their smallest grid index, listed in
    /// ascending order; the reduced points are kept as given. Useful to
    /// compare drivers that pick different representatives.
    pub fn canonicalized(&self) -> IrMesh {
        let mut first_of_class: HashMap<usize, usize> = HashMap::new();
        for (ik, &class) in self.mapping.iter().enumerate() {
            first_of_class.entry(class).or_insert(ik);
        }

        let mapping: Vec<usize> = self
            .mapping
            .iter()
            .map(|class| first_of_class[class])
            .collect();

        let mut order: Vec<usize> = (0..self.ir_indices.len()).collect();
        order.sort_by_key(|&i| first_of_class[&self.ir_indices[i]]);

        IrMesh {
            mapping,
            ir_indices: order
                .iter()
                .map(|&i| first_of_class[&self.ir_indices[i]])
                .collect(),
            degeneracy: order.iter().map(|&i| self.degeneracy[i]).collect(),
            kpts: order.iter().map(|&i| self.kpts[i]).collect(),
        }
    }

    pub fn get_mapping(&self) -> &[usize] {
        &self.mapping
    }

    pub fn get_ir_indices(&self) -> &[usize] {
        &self.ir_indices
    }

    pub fn get_degeneracy(&self) -> &[usize] {
        &self.degeneracy
    }

    pub fn get_kpts(&self) -> &[[f64; 3]] {
        &self.kpts
    }

    pub fn get_n_ir_kpts(&self) -> usize {
        self.ir_indices.len()
    }

    pub fn get_n_kpts(&self) -> usize {
        self.mapping.len()
    }

    // degeneracy / total
    pub fn get_weights(&self) -> Vec<f64> {
        let total = self.mapping.len() as f64;

        self.degeneracy.iter().map(|&d| d as f64 / total).collect()
    }
}

/// (2 g + s) / (2 n) per axis.
pub fn grid_to_frac(g: &Vector3i32, mesh: [i32; 3], is_shift: [i32; 3]) -> [f64; 3] {
    [
        (2 * g.x + is_shift[0]) as f64 / (2 * mesh[0]) as f64,
        (2 * g.y + is_shift[1]) as f64 / (2 * mesh[1]) as f64,
        (2 * g.z + is_shift[2]) as f64 / (2 * mesh[2]) as f64,
    ]
}

// grid address folded into [0, n) per axis
pub(crate) fn address_key(g: [i64; 3], mesh: [i32; 3]) -> [i64; 3] {
    [
        g[0].rem_euclid(mesh[0] as i64),
        g[1].rem_euclid(mesh[1] as i64),
        g[2].rem_euclid(mesh[2] as i64),
    ]
}

pub(crate) fn address_index_map(
    grid_address: &[Vector3i32],
    mesh: [i32; 3],
) -> SymmetryResult<HashMap<[i64; 3], usize>> {
    if mesh.iter().any(|&n| n < 1) {
        return Err(SymmetryError::MeshMismatch {
            mesh,
            reason: "divisions must be positive".to_string(),
        });
    }

    let nkpt = (mesh[0] * mesh[1] * mesh[2]) as usize;

    if grid_address.len() != nkpt {
        return Err(SymmetryError::MeshMismatch {
            mesh,
            reason: format!("{} grid points, expected {}", grid_address.len(), nkpt),
        });
    }

    let mut index = HashMap::with_capacity(nkpt);

    for (ik, g) in grid_address.iter().enumerate() {
        let key = address_key([g.x as i64, g.y as i64, g.z as i64], mesh);

        if index.insert(key, ik).is_some() {
            return Err(SymmetryError::MeshMismatch {
                mesh,
                reason: format!("grid point {} appears twice", g),
            });
        }
    }

    Ok(index)
}
