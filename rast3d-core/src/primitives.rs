/// Ready-made meshes: cube, pyramid and octahedron
use nalgebra::{Point3, Vector3};

use crate::color::Color;
use crate::error::RenderError;
use crate::geometry::{Mesh, VertexData};

const MIN: f32 = -0.5;
const MAX: f32 = 0.5;
/// Half height of the pyramid; the apex points down -y
const PYR_Y: f32 = 0.25;

const CUBE_TRIANGLES: [[f32; 3]; 36] = [
    // front
    [MIN, MIN, MIN],
    [MIN, MAX, MIN],
    [MAX, MIN, MIN],
    [MAX, MIN, MIN],
    [MAX, MAX, MIN],
    [MIN, MAX, MIN],
    // back
    [MIN, MIN, MAX],
    [MIN, MAX, MAX],
    [MAX, MIN, MAX],
    [MAX, MIN, MAX],
    [MAX, MAX, MAX],
    [MIN, MAX, MAX],
    // right
    [MAX, MIN, MAX],
    [MAX, MAX, MAX],
    [MAX, MIN, MIN],
    [MAX, MAX, MAX],
    [MAX, MAX, MIN],
    [MAX, MIN, MIN],
    // left
    [MIN, MIN, MAX],
    [MIN, MAX, MAX],
    [MIN, MIN, MIN],
    [MIN, MAX, MAX],
    [MIN, MAX, MIN],
    [MIN, MIN, MIN],
    // top
    [MIN, MAX, MAX],
    [MIN, MAX, MIN],
    [MAX, MAX, MAX],
    [MAX, MAX, MAX],
    [MAX, MAX, MIN],
    [MIN, MAX, MIN],
    // bottom
    [MIN, MIN, MAX],
    [MIN, MIN, MIN],
    [MAX, MIN, MAX],
    [MAX, MIN, MAX],
    [MAX, MIN, MIN],
    [MIN, MIN, MIN],
];

const CUBE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

const PYRAMID_TRIANGLES: [[f32; 3]; 18] = [
    // base
    [MIN, PYR_Y, MIN],
    [MAX, PYR_Y, MIN],
    [MAX, PYR_Y, MAX],
    [MIN, PYR_Y, MIN],
    [MIN, PYR_Y, MAX],
    [MAX, PYR_Y, MAX],
    // front
    [MIN, PYR_Y, MAX],
    [MAX, PYR_Y, MAX],
    [0.0, -PYR_Y, 0.0],
    // back
    [MIN, PYR_Y, MIN],
    [MAX, PYR_Y, MIN],
    [0.0, -PYR_Y, 0.0],
    // left
    [MIN, PYR_Y, MIN],
    [MIN, PYR_Y, MAX],
    [0.0, -PYR_Y, 0.0],
    // right
    [MAX, PYR_Y, MIN],
    [MAX, PYR_Y, MAX],
    [0.0, -PYR_Y, 0.0],
];

/// One normal per pyramid triangle, in the order of `PYRAMID_TRIANGLES`
fn pyramid_normals() -> [Vector3<f32>; 6] {
    let d = std::f32::consts::FRAC_1_SQRT_2;
    [
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, -d, d),
        Vector3::new(0.0, -d, -d),
        Vector3::new(-d, -d, 0.0),
        Vector3::new(d, -d, 0.0),
    ]
}

fn points(coords: &[[f32; 3]]) -> Vec<Point3<f32>> {
    coords.iter().map(|[x, y, z]| Point3::new(*x, *y, *z)).collect()
}

/// One position-aware record per vertex, each normal repeated `per_normal` times
fn records(normals: &[Vector3<f32>], per_normal: usize, color: Color) -> Vec<VertexData> {
    normals
        .iter()
        .flat_map(|n| std::iter::repeat(*n).take(per_normal))
        .map(|n| VertexData::positioned(n, color, Point3::origin()))
        .collect()
}

fn placed(
    vertices: Vec<Point3<f32>>,
    data: Vec<VertexData>,
    position: Vector3<f32>,
    scale: Vector3<f32>,
) -> Result<Mesh, RenderError> {
    let mut mesh = Mesh::new(vertices, data)?;
    mesh.set_position(position);
    mesh.set_scale(scale);
    Ok(mesh)
}

/// Unit cube centered on its origin, one normal per face
pub fn cube(position: Vector3<f32>, scale: Vector3<f32>, color: Color) -> Result<Mesh, RenderError> {
    let normals: Vec<_> = CUBE_NORMALS
        .iter()
        .map(|[x, y, z]| Vector3::new(*x, *y, *z))
        .collect();

    placed(
        points(&CUBE_TRIANGLES),
        records(&normals, 6, color),
        position,
        scale,
    )
}

/// Square based pyramid with its apex pointing down the y axis
pub fn pyramid(
    position: Vector3<f32>,
    scale: Vector3<f32>,
    color: Color,
) -> Result<Mesh, RenderError> {
    placed(
        points(&PYRAMID_TRIANGLES),
        records(&pyramid_normals(), 3, color),
        position,
        scale,
    )
}

/// Two pyramids joined at the base, without the base faces
pub fn octahedron(
    position: Vector3<f32>,
    scale: Vector3<f32>,
    color: Color,
) -> Result<Mesh, RenderError> {
    let sides = &PYRAMID_TRIANGLES[6..];

    let lower = sides.iter().map(|[x, y, z]| Point3::new(*x, y - PYR_Y, *z));
    let upper = sides.iter().map(|[x, y, z]| Point3::new(*x, -(y - PYR_Y), *z));
    let vertices = lower.chain(upper).collect();

    let side_normals = &pyramid_normals()[2..];
    let flipped: Vec<_> = side_normals
        .iter()
        .map(|n| Vector3::new(n.x, -n.y, n.z))
        .collect();
    let mut data = records(side_normals, 3, color);
    data.extend(records(&flipped, 3, color));

    placed(vertices, data, position, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> (Vector3<f32>, Vector3<f32>) {
        (Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_cube_layout() {
        let (position, scale) = unit();
        let mesh = cube(position, scale, Color::WHITE).unwrap();
        assert_eq!(mesh.vertices().len(), 36);
        assert_eq!(mesh.vertex_data().len(), 36);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.vertex_data().iter().all(|d| d.position.is_some()));

        // every vertex lies on the face its normal points out of
        for (vertex, data) in mesh.vertices().iter().zip(mesh.vertex_data()) {
            assert!((vertex.coords.dot(&data.normal) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pyramid_layout() {
        let position = Vector3::new(1.0, 2.0, 3.0);
        let scale = Vector3::new(2.0, 2.0, 2.0);
        let mesh = pyramid(position, scale, Color::BLACK).unwrap();
        assert_eq!(mesh.vertices().len(), 18);
        assert_eq!(mesh.vertex_data().len(), 18);
        assert_eq!(mesh.position(), position);
        assert_eq!(mesh.scale(), scale);

        let apexes = mesh
            .vertices()
            .iter()
            .filter(|v| (v.y + PYR_Y).abs() < 1e-6)
            .count();
        assert_eq!(apexes, 4);
        assert!(mesh.vertex_data().iter().all(|d| (d.normal.norm() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_octahedron_is_mirrored() {
        let (position, scale) = unit();
        let mesh = octahedron(position, scale, Color::WHITE).unwrap();
        assert_eq!(mesh.vertices().len(), 24);
        assert_eq!(mesh.vertex_data().len(), 24);

        let (lower, upper) = mesh.vertices().split_at(12);
        for (a, b) in lower.iter().zip(upper) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, -b.y);
            assert_eq!(a.z, b.z);
        }

        let (lower, upper) = mesh.vertex_data().split_at(12);
        for (a, b) in lower.iter().zip(upper) {
            assert_eq!(a.normal.y, -b.normal.y);
        }
    }
}
