/// STL file parser for binary and ASCII formats
use log::debug;
use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::color::Color;
use crate::error::StlError;
use crate::geometry::{Mesh, VertexData};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// One triangle as stored in the file
#[derive(Debug, Clone, Copy, PartialEq)]
struct Facet {
    normal: Vector3<f32>,
    vertices: [Point3<f32>; 3],
}

impl Facet {
    /// Stored normal, or the winding normal when the file leaves it zeroed
    fn normal(&self) -> Vector3<f32> {
        if let Some(normal) = self.normal.try_normalize(f32::EPSILON) {
            return normal;
        }

        let [a, b, c] = self.vertices;
        (b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8], color: Color) -> Result<Mesh, StlError> {
    build_mesh(binary_facets(data)?, color)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str, color: Color) -> Result<Mesh, StlError> {
    build_mesh(ascii_facets(input)?, color)
}

/// Detect and parse STL file (binary or ASCII).
///
/// Every vertex gets a position-aware record carrying its facet normal and `color`.
pub fn parse_stl(data: &[u8], color: Color) -> Result<Mesh, StlError> {
    // Binary files may also start with "solid", so fall back when ASCII parsing fails
    if data.starts_with(b"solid") {
        let ascii = std::str::from_utf8(data)
            .map_err(|e| StlError::Ascii(e.to_string()))
            .and_then(ascii_facets);

        match ascii {
            Ok(facets) => return build_mesh(facets, color),
            Err(err) => debug!("not an ASCII STL ({err}), trying binary"),
        }
    }

    parse_binary_stl(data, color)
}

fn build_mesh(facets: Vec<Facet>, color: Color) -> Result<Mesh, StlError> {
    let mut vertices = Vec::with_capacity(facets.len() * 3);
    let mut data = Vec::with_capacity(facets.len() * 3);

    for facet in &facets {
        let normal = facet.normal();
        for vertex in facet.vertices {
            vertices.push(vertex);
            data.push(VertexData::positioned(normal, color, vertex));
        }
    }

    debug!("loaded STL mesh with {} facets", facets.len());
    Ok(Mesh::new(vertices, data)?)
}

fn binary_facets(data: &[u8]) -> Result<Vec<Facet>, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    let header: IResult<&[u8], u32> = preceded(take(HEADER_LEN), le_u32)(data);
    let Ok((mut input, count)) = header else {
        return Err(StlError::TooSmall(data.len()));
    };

    // The count comes from the file, don't trust it for the allocation
    let mut facets = Vec::with_capacity((count as usize).min(input.len() / FACET_LEN));
    for index in 0..count as usize {
        let (rest, facet) = binary_facet(input).map_err(|_| StlError::Truncated(index))?;
        facets.push(facet);
        input = rest;
    }

    Ok(facets)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Facet> {
    let (input, normal) = le_vector3(input)?;
    let (input, a) = le_vector3(input)?;
    let (input, b) = le_vector3(input)?;
    let (input, c) = le_vector3(input)?;
    // Attribute byte count, unused
    let (input, _) = le_u16(input)?;

    Ok((
        input,
        Facet {
            normal,
            vertices: [a.into(), b.into(), c.into()],
        },
    ))
}

fn le_vector3(input: &[u8]) -> IResult<&[u8], Vector3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

fn ascii_facets(input: &str) -> Result<Vec<Facet>, StlError> {
    match parse_solid(input) {
        Ok((_, facets)) => Ok(facets),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let near: String = e.input.chars().take(24).collect();
            Err(StlError::Ascii(format!("{:?} near {near:?}", e.code)))
        }
        Err(nom::Err::Incomplete(_)) => Err(StlError::Ascii("incomplete input".to_string())),
    }
}

fn parse_solid(input: &str) -> IResult<&str, Vec<Facet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // Optional name
    let (input, _) = not_line_ending(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;

    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = parse_vertex(input)?;
    let (input, b) = parse_vertex(input)?;
    let (input, c) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((
        input,
        Facet {
            normal,
            vertices: [a, b, c],
        },
    ))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, position) = parse_vector3(input)?;
    Ok((input, position.into()))
}

fn parse_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}
