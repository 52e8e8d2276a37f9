use itertools::Itertools;
use log::{debug, info};
use vector3::*;

use crate::{address_index_map, address_key, grid_to_frac, IrMeshDriver, SpgCell, SymmetryResult};

const IDENTITY: [[i32; 3]; 3] = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

/// Mesh reduction from a known point group.
///
/// Rotations are integer matrices acting on fractional real-space
/// coordinates, as returned by a space-group search. The cell passed to
/// `get_ir_reciprocal_mesh` is not analysed.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationMeshDriver {
    rotations: Vec<[[i32; 3]; 3]>,
    time_reversal: bool,
}

impl RotationMeshDriver {
    pub fn new(rotations: Vec<[[i32; 3]; 3]>, time_reversal: bool) -> RotationMeshDriver {
        let mut rotations = rotations;

        if !rotations.contains(&IDENTITY) {
            rotations.insert(0, IDENTITY);
        }

        RotationMeshDriver {
            rotations,
            time_reversal,
        }
    }

    pub fn get_n_sym_ops(&self) -> usize {
        self.rotations.len()
    }

    pub fn get_rotation(&self, isym: usize) -> &[[i32; 3]; 3] {
        &self.rotations[isym]
    }

    pub fn has_time_reversal(&self) -> bool {
        self.time_reversal
    }

    // k transforms with the transposed rotation; time reversal adds -R^T
    fn reciprocal_operations(&self) -> Vec<[[i64; 3]; 3]> {
        let mut ops = Vec::with_capacity(2 * self.rotations.len());

        for r in self.rotations.iter() {
            let mut rt = [[0i64; 3]; 3];
            for i in 0..3 {
                for j in 0..3 {
                    rt[i][j] = r[j][i] as i64;
                }
            }
            ops.push(rt);

            if self.time_reversal {
                let mut neg = rt;
                neg.iter_mut().flatten().for_each(|v| *v = -*v);
                ops.push(neg);
            }
        }

        ops
    }
}

impl IrMeshDriver for RotationMeshDriver {
    fn get_ir_reciprocal_mesh(
        &self,
        grid_address: &[Vector3i32],
        mesh: [i32; 3],
        is_shift: [i32; 3],
        _cell: &SpgCell,
    ) -> SymmetryResult<(Vec<usize>, Vec<[f64; 3]>)> {
        let index = address_index_map(grid_address, mesh)?;

        let ops = self.reciprocal_operations();

        let nkpt = grid_address.len();

        let mut ir_mapping_table: Vec<Option<usize>> = vec![None; nkpt];

        for idx in 0..nkpt {
            if ir_mapping_table[idx].is_some() {
                continue;
            }

            ir_mapping_table[idx] = Some(idx);

            let g = grid_address[idx];

            for op in ops.iter() {
                let key = match rotate_on_grid(op, &g, mesh, is_shift) {
                    Some(key) => key,
                    None => continue,
                };

                if let Some(&midx) = index.get(&key) {
                    if ir_mapping_table[midx].is_none() {
                        ir_mapping_table[midx] = Some(idx);
                    }
                }
            }
        }

        let mapping: Vec<usize> = ir_mapping_table
            .iter()
            .enumerate()
            .map(|(ik, m)| m.unwrap_or(ik))
            .collect();

        // classes are labelled by their first visited, hence smallest, index
        let ir_indices: Vec<usize> = mapping.iter().copied().unique().collect();

        let kpts: Vec<[f64; 3]> = ir_indices
            .iter()
            .map(|&ir| grid_to_frac(&grid_address[ir], mesh, is_shift))
            .collect();

        debug!("ir mesh representatives: {:?}", ir_indices);

        info!(
            "k mesh {:?} reduced from {} to {} points with {} operations",
            mesh,
            nkpt,
            ir_indices.len(),
            ops.len()
        );

        Ok((mapping, kpts))
    }
}

// Apply a reciprocal-space operation on the doubled grid 2 g + s.
//
// k_j = a_j / (2 n_j); the image on axis i lands on the grid when
// sum_j R_ij a_j n_i / n_j is an integer with the parity of s_i.
fn rotate_on_grid(
    op: &[[i64; 3]; 3],
    g: &Vector3i32,
    mesh: [i32; 3],
    is_shift: [i32; 3],
) -> Option<[i64; 3]> {
    let n = [mesh[0] as i64, mesh[1] as i64, mesh[2] as i64];
    let s = [is_shift[0] as i64, is_shift[1] as i64, is_shift[2] as i64];

    let a = [
        2 * g.x as i64 + s[0],
        2 * g.y as i64 + s[1],
        2 * g.z as i64 + s[2],
    ];

    let ntot = n[0] * n[1] * n[2];

    let mut image = [0i64; 3];

    for i in 0..3 {
        let num: i64 = (0..3).map(|j| op[i][j] * a[j] * n[i] * (ntot / n[j])).sum();

        if num % ntot != 0 {
            return None;
        }

        let b = num / ntot;

        if (b - s[i]).rem_euclid(2) != 0 {
            return None;
        }

        image[i] = (b - s[i]) / 2;
    }

    Some(address_key(image, mesh))
}
