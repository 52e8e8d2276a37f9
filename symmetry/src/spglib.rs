use log::info;
use vector3::*;

use crate::spglib_sys as ffi;
use crate::{
    address_index_map, address_key, grid_to_frac, IrMeshDriver, SpgCell, SymmetryError,
    SymmetryResult,
};

/// Mesh reduction through libsymspg.
pub struct SymmetryDriverSPGLIB {
    symprec: f64,
    time_reversal: bool,
}

impl SymmetryDriverSPGLIB {
    pub fn new(symprec: f64, time_reversal: bool) -> SymmetryDriverSPGLIB {
        SymmetryDriverSPGLIB {
            symprec,
            time_reversal,
        }
    }
}

impl IrMeshDriver for SymmetryDriverSPGLIB {
    fn get_ir_reciprocal_mesh(
        &self,
        grid_address: &[Vector3i32],
        mesh: [i32; 3],
        is_shift: [i32; 3],
        cell: &SpgCell,
    ) -> SymmetryResult<(Vec<usize>, Vec<[f64; 3]>)> {
        let index = address_index_map(grid_address, mesh)?;

        let nkpt = grid_address.len();

        // spglib wants the basis vectors as columns
        let rows = cell.get_lattice();
        let mut lattice = [[0.0f64; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                lattice[i][j] = rows[j][i];
            }
        }

        let mut spg_address = vec![[0i32; 3]; nkpt];
        let mut spg_mapping = vec![0i32; nkpt];

        let n_ir = unsafe {
            ffi::spg_get_ir_reciprocal_mesh(
                spg_address.as_mut_ptr(),
                spg_mapping.as_mut_ptr(),
                mesh.as_ptr(),
                is_shift.as_ptr(),
                self.time_reversal as i32,
                lattice.as_ptr(),
                cell.get_positions().as_ptr(),
                cell.get_types().as_ptr(),
                cell.get_n_atoms() as i32,
                self.symprec,
            )
        };

        if n_ir <= 0 {
            return Err(SymmetryError::Failed(
                "spg_get_ir_reciprocal_mesh found no symmetry".to_string(),
            ));
        }

        // spglib enumerates its own grid; translate to the caller's order
        let mut to_caller = vec![0usize; nkpt];
        let mut to_spglib = vec![0usize; nkpt];
        for (i, a) in spg_address.iter().enumerate() {
            let key = address_key([a[0] as i64, a[1] as i64, a[2] as i64], mesh);

            to_caller[i] = *index.get(&key).ok_or_else(|| SymmetryError::MeshMismatch {
                mesh,
                reason: format!("spglib grid point {:?} not in mesh", a),
            })?;
            to_spglib[to_caller[i]] = i;
        }

        let mut mapping = vec![0usize; nkpt];
        for (i, &m) in spg_mapping.iter().enumerate() {
            mapping[to_caller[i]] = to_caller[m as usize];
        }

        // reduced points in spglib's own coordinates, ordered by first
        // appearance of their class in the caller's grid
        let mut kpts = Vec::with_capacity(n_ir as usize);
        let mut seen = vec![false; nkpt];
        for &label in mapping.iter() {
            if seen[label] {
                continue;
            }
            seen[label] = true;

            let a = Vector3i32::from_array(spg_address[to_spglib[label]]);
            kpts.push(grid_to_frac(&a, mesh, is_shift));
        }

        info!(
            "spglib reduced k mesh {:?} from {} to {} points",
            mesh,
            nkpt,
            kpts.len()
        );

        Ok((mapping, kpts))
    }
}
