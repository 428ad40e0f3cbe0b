//! 3D Math Utilities for the Software Pipeline
//!
//! Provides vector types, 4x4 matrices, projection helpers, and simple
//! mesh builders. Kept self-contained so the pipeline has no external
//! linear-algebra dependency.

use std::ops::{Add, Mul, Neg, Sub};

/// 2D Vector (UV coordinates and screen positions)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            *self
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }

    /// Rotate around X axis
    #[inline]
    pub fn rotate_x(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x,
            y: self.y * cos - self.z * sin,
            z: self.y * sin + self.z * cos,
        }
    }

    /// Rotate around Y axis
    #[inline]
    pub fn rotate_y(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos + self.z * sin,
            y: self.y,
            z: -self.x * sin + self.z * cos,
        }
    }

    /// Rotate around Z axis
    #[inline]
    pub fn rotate_z(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
            z: self.z,
        }
    }

    /// Extend to a homogeneous vector with the given w
    #[inline]
    pub const fn extend(&self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// 4D Vector (homogeneous/clip-space positions and generic attribute slots)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 0.0,
        }
    }

    /// Drop the w component
    #[inline]
    pub const fn truncate(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Perspective divide: (x/w, y/w, z/w). Caller guarantees w != 0.
    #[inline]
    pub fn perspective_divide(&self) -> Vec3 {
        let inv = 1.0 / self.w;
        Vec3::new(self.x * inv, self.y * inv, self.z * inv)
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
            && (self.w - other.w).abs() < epsilon
    }
}

impl Add for Vec4 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w + other.w,
        }
    }
}

impl Sub for Vec4 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w - other.w,
        }
    }
}

impl Mul<f32> for Vec4 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
            w: self.w * scalar,
        }
    }
}

// ============================================================================
// Mat4
// ============================================================================

/// Row-major 4x4 matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub rows: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self { rows }
    }

    /// Translation matrix
    pub const fn translation(t: Vec3) -> Self {
        Self {
            rows: [
                [1.0, 0.0, 0.0, t.x],
                [0.0, 1.0, 0.0, t.y],
                [0.0, 0.0, 1.0, t.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Uniform scale matrix
    pub const fn scale(s: f32) -> Self {
        Self {
            rows: [
                [s, 0.0, 0.0, 0.0],
                [0.0, s, 0.0, 0.0],
                [0.0, 0.0, s, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation around the X axis
    pub fn rotation_x(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, cos, -sin, 0.0],
                [0.0, sin, cos, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation around the Y axis
    pub fn rotation_y(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            rows: [
                [cos, 0.0, sin, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-sin, 0.0, cos, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Perspective projection (right-handed, camera looking down -Z).
    /// `fov_y` in radians; depth mapped to [-1, 1].
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let range = near - far;
        Self {
            rows: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, (near + far) / range, 2.0 * near * far / range],
                [0.0, 0.0, -1.0, 0.0],
            ],
        }
    }

    /// Orthographic projection onto [-1, 1]^3
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let rw = 1.0 / (right - left);
        let rh = 1.0 / (top - bottom);
        let rd = 1.0 / (far - near);
        Self {
            rows: [
                [2.0 * rw, 0.0, 0.0, -(right + left) * rw],
                [0.0, 2.0 * rh, 0.0, -(top + bottom) * rh],
                [0.0, 0.0, -2.0 * rd, -(far + near) * rd],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Transform a homogeneous vector
    #[inline]
    pub fn transform(&self, v: Vec4) -> Vec4 {
        let r = &self.rows;
        Vec4::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z + r[0][3] * v.w,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z + r[1][3] * v.w,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z + r[2][3] * v.w,
            r[3][0] * v.x + r[3][1] * v.y + r[3][2] * v.z + r[3][3] * v.w,
        )
    }

    /// Transform a point (w = 1)
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec4 {
        self.transform(p.extend(1.0))
    }

    /// Transform a direction (w = 0, ignores translation)
    #[inline]
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.transform(d.extend(0.0)).truncate()
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        let mut rows = [[0.0f32; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
            }
        }
        Self { rows }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Linear interpolation between two Vec3 points
///
/// Note: `t` is not clamped to [0, 1], allowing extrapolation.
#[inline]
pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    Vec3 {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
        z: a.z + (b.z - a.z) * t,
    }
}

// ============================================================================
// Mesh
// ============================================================================

/// A 3D mesh with per-vertex UVs and normals, indexed by triangle faces.
/// `uvs` and `normals` are parallel to `vertices` when non-empty.
#[derive(Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[usize; 3]>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned quad in the XY plane, centered at origin, facing +Z.
    /// Two triangles, UVs spanning [0,1]^2 with v growing downward.
    pub fn quad(width: f32, height: f32) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        let vertices = vec![
            Vec3::new(-hw, hh, 0.0),  // 0: top-left
            Vec3::new(hw, hh, 0.0),   // 1: top-right
            Vec3::new(hw, -hh, 0.0),  // 2: bottom-right
            Vec3::new(-hw, -hh, 0.0), // 3: bottom-left
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let normals = vec![Vec3::new(0.0, 0.0, 1.0); 4];
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        Self {
            vertices,
            faces,
            uvs,
            normals,
        }
    }

    /// Cube centered at origin. Vertices are duplicated per face so each face
    /// carries its own UVs and a flat normal (24 vertices, 12 triangles).
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        // (face normal, four corners)
        let sides: [(Vec3, [Vec3; 4]); 6] = [
            (
                Vec3::new(0.0, 0.0, 1.0),
                [
                    Vec3::new(-h, h, h),
                    Vec3::new(h, h, h),
                    Vec3::new(h, -h, h),
                    Vec3::new(-h, -h, h),
                ],
            ),
            (
                Vec3::new(0.0, 0.0, -1.0),
                [
                    Vec3::new(h, h, -h),
                    Vec3::new(-h, h, -h),
                    Vec3::new(-h, -h, -h),
                    Vec3::new(h, -h, -h),
                ],
            ),
            (
                Vec3::new(-1.0, 0.0, 0.0),
                [
                    Vec3::new(-h, h, -h),
                    Vec3::new(-h, h, h),
                    Vec3::new(-h, -h, h),
                    Vec3::new(-h, -h, -h),
                ],
            ),
            (
                Vec3::new(1.0, 0.0, 0.0),
                [
                    Vec3::new(h, h, h),
                    Vec3::new(h, h, -h),
                    Vec3::new(h, -h, -h),
                    Vec3::new(h, -h, h),
                ],
            ),
            (
                Vec3::new(0.0, 1.0, 0.0),
                [
                    Vec3::new(-h, h, -h),
                    Vec3::new(h, h, -h),
                    Vec3::new(h, h, h),
                    Vec3::new(-h, h, h),
                ],
            ),
            (
                Vec3::new(0.0, -1.0, 0.0),
                [
                    Vec3::new(-h, -h, h),
                    Vec3::new(h, -h, h),
                    Vec3::new(h, -h, -h),
                    Vec3::new(-h, -h, -h),
                ],
            ),
        ];

        let corner_uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let mut mesh = Self::new();
        for (normal, corners) in &sides {
            let base = mesh.vertices.len();
            for (corner, uv) in corners.iter().zip(corner_uvs.iter()) {
                mesh.vertices.push(*corner);
                mesh.uvs.push(*uv);
                mesh.normals.push(*normal);
            }
            mesh.faces.push([base, base + 1, base + 2]);
            mesh.faces.push([base, base + 2, base + 3]);
        }
        mesh
    }

    /// Rotate all vertices and normals
    pub fn rotate(&mut self, rx: f32, ry: f32, rz: f32) {
        for v in &mut self.vertices {
            *v = v.rotate_x(rx).rotate_y(ry).rotate_z(rz);
        }
        for n in &mut self.normals {
            *n = n.rotate_x(rx).rotate_y(ry).rotate_z(rz);
        }
    }

    /// Translate all vertices
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            *v = *v + offset;
        }
    }

    /// Face normal computed from winding (for meshes without stored normals)
    pub fn face_normal(&self, face_idx: usize) -> Vec3 {
        let face = &self.faces[face_idx];
        let v0 = self.vertices[face[0]];
        let v1 = self.vertices[face[1]];
        let v2 = self.vertices[face[2]];
        (v1 - v0).cross(&(v2 - v0)).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mat4_identity_transform() {
        let v = Vec4::new(1.0, -2.0, 3.0, 1.0);
        assert_eq!(Mat4::IDENTITY.transform(v), v);
    }

    #[test]
    fn test_mat4_translation() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        let p = m.transform_point(Vec3::zero());
        assert!(p.truncate().approx_eq(&Vec3::new(1.0, 2.0, 3.0), 1e-6));
        // Directions ignore translation
        let d = m.transform_direction(Vec3::new(0.0, 0.0, 1.0));
        assert!(d.approx_eq(&Vec3::new(0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn test_mat4_mul_matches_composed_transform() {
        let a = Mat4::translation(Vec3::new(5.0, 0.0, 0.0));
        let b = Mat4::scale(2.0);
        let p = Vec3::new(1.0, 1.0, 1.0);
        let composed = (a * b).transform_point(p);
        let stepwise = a.transform(b.transform_point(p));
        assert!(composed.approx_eq(&stepwise, 1e-6));
    }

    #[test]
    fn test_perspective_divide() {
        let clip = Vec4::new(2.0, 4.0, 6.0, 2.0);
        let ndc = clip.perspective_divide();
        assert!(ndc.approx_eq(&Vec3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_perspective_centers_forward_axis() {
        let proj = Mat4::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let clip = proj.transform_point(Vec3::new(0.0, 0.0, -1.0));
        let ndc = clip.perspective_divide();
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
    }

    #[test]
    fn test_cube_has_per_face_attributes() {
        let mesh = Mesh::cube(1.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.faces.len(), 12);
        assert_eq!(mesh.uvs.len(), mesh.vertices.len());
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
    }

    #[test]
    fn test_quad_attribute_lengths_match() {
        let mesh = Mesh::quad(2.0, 2.0);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.uvs.len(), 4);
        assert_eq!(mesh.normals.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
    }
}
