use std::os::raw::*;

extern "C" {
    pub fn spg_get_ir_reciprocal_mesh(
        grid_address: *mut [c_int; 3],
        ir_mapping_table: *mut c_int,
        mesh: *const c_int,
        is_shift: *const c_int,
        is_time_reversal: c_int,
        lattice: *const [f64; 3],
        position: *const [f64; 3],
        types: *const c_int,
        num_atom: c_int,
        symprec: f64,
    ) -> c_int;
}
