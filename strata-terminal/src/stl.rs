/// STL mesh loading for binary and ASCII files
///
/// Facet normals stored in the file are read and dropped: the renderer
/// derives normals from vertex winding.
use std::path::Path;

use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use log::info;
use strata_core::{Mesh, Result, StrataError, Triangle, Vertex};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StrataError::MeshParse("file too small to be a binary STL".into()));
    }
    let declared = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let available = (data.len() - HEADER_LEN - 4) / FACET_LEN;
    if declared > available {
        return Err(StrataError::MeshParse(format!(
            "header declares {} facets but only {} are present",
            declared, available
        )));
    }

    let (_, triangles) = binary_stl(data)
        .map_err(|e| StrataError::MeshParse(format!("binary STL: {:?}", e.map(|e| e.code))))?;
    into_mesh(triangles)
}

fn binary_stl(input: &[u8]) -> IResult<&[u8], Vec<Triangle>> {
    let (input, _header) = take(HEADER_LEN)(input)?;
    let (input, n) = le_u32(input)?;
    count(binary_facet, n as usize)(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, _normal) = binary_vector(input)?;
    let (input, a) = binary_vector(input)?;
    let (input, b) = binary_vector(input)?;
    let (input, c) = binary_vector(input)?;
    let (input, _attributes) = le_u16(input)?;
    Ok((input, Triangle::new(a, b, c)))
}

fn binary_vector(input: &[u8]) -> IResult<&[u8], Vertex> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vertex::point(x, y, z)))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh> {
    match ascii_stl(input) {
        Ok((rest, triangles)) if rest.is_empty() => into_mesh(triangles),
        Ok((rest, _)) => Err(StrataError::MeshParse(format!(
            "unexpected trailing input: {:?}",
            rest.chars().take(32).collect::<String>()
        ))),
        Err(e) => Err(StrataError::MeshParse(format!("ASCII STL: {:?}", e.map(|e| e.code)))),
    }
}

fn ascii_stl(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, triangles))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = ascii_vector(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = ascii_vertex(input)?;
    let (input, b) = ascii_vertex(input)?;
    let (input, c) = ascii_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(a, b, c)))
}

fn ascii_vertex(input: &str) -> IResult<&str, Vertex> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    ascii_vector(input)
}

fn ascii_vector(input: &str) -> IResult<&str, Vertex> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vertex::point(x, y, z)))
}

fn into_mesh(triangles: Vec<Triangle>) -> Result<Mesh> {
    let mut mesh = Mesh::new();
    for triangle in triangles {
        mesh.add_triangle(triangle)?;
    }
    Ok(mesh)
}

/// Detect and parse STL data (ASCII first when it looks like text, else binary).
pub fn parse_stl(data: &[u8]) -> Result<Mesh> {
    // Binary headers may also start with "solid", so fall through on failure.
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }
    parse_binary_stl(data)
}

pub fn load_stl(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let mesh = parse_stl(&data)?;
    info!("loaded {} triangles from {}", mesh.len(), path.display());
    Ok(mesh)
}
