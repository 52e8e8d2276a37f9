use crate::Vector3;
use crate::Vector3f64;

pub type Vector3i32 = Vector3<i32>;

use std::fmt;
use std::ops::Add;
use std::ops::Sub;

impl Vector3i32 {
    pub fn norm_squared(&self) -> i32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn to_f64(&self) -> Vector3f64 {
        Vector3f64::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl Add<Vector3i32> for Vector3i32 {
    type Output = Vector3i32;

    fn add(self, rhs: Vector3i32) -> Vector3i32 {
        Vector3i32 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub<Vector3i32> for Vector3i32 {
    type Output = Vector3i32;

    fn sub(self, rhs: Vector3i32) -> Vector3i32 {
        Vector3i32 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl fmt::Display for Vector3i32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}
