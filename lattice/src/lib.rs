use vector3::*;

use std::{f64::consts, fmt};

/// Three basis vectors, stored as the columns a, b, c.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lattice {
    a: Vector3f64,
    b: Vector3f64,
    c: Vector3f64,
}

impl Lattice {
    pub fn new(a: Vector3f64, b: Vector3f64, c: Vector3f64) -> Lattice {
        Lattice { a, b, c }
    }

    // one basis vector per row, e.g. [b1, b2, b3]
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Lattice {
        Lattice {
            a: Vector3f64::from_array(rows[0]),
            b: Vector3f64::from_array(rows[1]),
            c: Vector3f64::from_array(rows[2]),
        }
    }

    pub fn as_2d_array_row_major(&self) -> [[f64; 3]; 3] {
        [self.a.to_array(), self.b.to_array(), self.c.to_array()]
    }

    // ( a x b ) . c
    pub fn volume(&self) -> f64 {
        self.a.cross_product(&self.b).dot_product(&self.c)
    }

    // ra = 2 x PI x (b x c) / volume
    // rb = 2 x PI x (c x a) / volume
    // rc = 2 x PI x (a x b) / volume
    pub fn reciprocal(&self) -> Lattice {
        let factor = 2.0 * consts::PI / self.volume();

        let blatt_a = self.b.cross_product(&self.c) * factor;
        let blatt_b = self.c.cross_product(&self.a) * factor;
        let blatt_c = self.a.cross_product(&self.b) * factor;

        Lattice::new(blatt_a, blatt_b, blatt_c)
    }

    pub fn get_vector_a(&self) -> Vector3f64 {
        self.a
    }

    pub fn get_vector_b(&self) -> Vector3f64 {
        self.b
    }

    pub fn get_vector_c(&self) -> Vector3f64 {
        self.c
    }

    // pos_c = f1 * a + f2 * b + f3 * c
    pub fn frac_to_cart(&self, pos_f: &Vector3f64) -> Vector3f64 {
        self.a * pos_f.x + self.b * pos_f.y + self.c * pos_f.z
    }

    pub fn frac_to_cart_all(&self, pos_f: &[Vector3f64]) -> Vec<Vector3f64> {
        pos_f.iter().map(|p| self.frac_to_cart(p)).collect()
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let a = self.get_vector_a();
        let b = self.get_vector_b();
        let c = self.get_vector_c();

        writeln!(f, "Lattice")?;
        writeln!(f, "{:25.16}\t{:25.16}\t{:25.16}", a.x, a.y, a.z)?;
        writeln!(f, "{:25.16}\t{:25.16}\t{:25.16}", b.x, b.y, b.z)?;
        write!(f, "{:25.16}\t{:25.16}\t{:25.16}", c.x, c.y, c.z)
    }
}
