// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reader for the legacy ASCII `.msh` v2 format.
//!
//! A small state machine walks the `$MeshFormat`, `$Nodes` and
//! `$Elements` sections; unknown sections between them are skipped.
//! External node identifiers are remapped to dense indices before any
//! element is parsed. Errors carry the offending line number and a
//! partial mesh is never returned.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use meshprep_mesh::{Element, ElementKind, ElementNodes, Mesh, Node};

use crate::error::ReadError;

const TYPE_LINE: u32 = 1;
const TYPE_TRIANGLE: u32 = 2;
const TYPE_QUAD: u32 = 3;
const TYPE_TETRAHEDRON: u32 = 4;
const TYPE_HEXAHEDRON: u32 = 5;
const TYPE_PRISM: u32 = 6;
const TYPE_PYRAMID: u32 = 7;
/// Point elements carry no solver information and are skipped.
const TYPE_POINT: u32 = 15;

/// Cheap pre-check: does the file start like a GMSH mesh? Inspects only
/// the first line and never errors.
pub fn is_gmsh_mesh_file<P: AsRef<Path>>(path: P) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut reader = BufReader::new(file);
    let mut first_line = String::new();
    if reader.read_line(&mut first_line).is_err() {
        return false;
    }
    first_line.trim() == "$MeshFormat"
}

/// Reads a legacy `.msh` file from disk.
pub fn read_msh_file<P: AsRef<Path>>(path: P) -> Result<Mesh, ReadError> {
    let file = File::open(path)?;
    read_msh(BufReader::new(file))
}

#[derive(PartialEq)]
enum State {
    ExpectHeader,
    ExpectNodes,
    ExpectElements,
    Done,
}

struct Lines<R> {
    input: R,
    number: usize,
}

impl<R: BufRead> Lines<R> {
    fn next(&mut self) -> Result<Option<String>, ReadError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.number += 1;
        Ok(Some(line))
    }

    fn next_content(&mut self) -> Result<Option<String>, ReadError> {
        while let Some(line) = self.next()? {
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    fn number(&self) -> usize {
        self.number
    }
}

/// Reads a legacy `.msh` stream into a mesh.
pub fn read_msh<R: BufRead>(input: R) -> Result<Mesh, ReadError> {
    let mut lines = Lines { input, number: 0 };
    let mut state = State::ExpectHeader;
    let mut nodes: Vec<Node> = Vec::new();
    let mut elements: Vec<Element> = Vec::new();
    let mut id_map: FxHashMap<u64, u32> = FxHashMap::default();

    while let Some(line) = lines.next()? {
        let keyword = line.trim();
        if keyword.is_empty() {
            continue;
        }
        match keyword {
            "$MeshFormat" => {
                if state != State::ExpectHeader {
                    return Err(ReadError::UnexpectedContent {
                        line: lines.number(),
                    });
                }
                read_format(&mut lines)?;
                state = State::ExpectNodes;
            }
            "$Nodes" => {
                match state {
                    State::ExpectNodes => {}
                    State::ExpectHeader => {
                        return Err(ReadError::MissingHeader {
                            line: lines.number(),
                        })
                    }
                    _ => {
                        return Err(ReadError::UnexpectedContent {
                            line: lines.number(),
                        })
                    }
                }
                read_nodes(&mut lines, &mut nodes, &mut id_map)?;
                state = State::ExpectElements;
            }
            "$Elements" => {
                match state {
                    State::ExpectElements => {}
                    State::ExpectHeader => {
                        return Err(ReadError::MissingHeader {
                            line: lines.number(),
                        })
                    }
                    _ => {
                        return Err(ReadError::UnexpectedContent {
                            line: lines.number(),
                        })
                    }
                }
                read_elements(&mut lines, &id_map, &mut elements)?;
                state = State::Done;
                break;
            }
            other if other.starts_with('$') => {
                if state == State::ExpectHeader {
                    return Err(ReadError::MissingHeader {
                        line: lines.number(),
                    });
                }
                skip_section(&mut lines, other)?;
            }
            _ => {
                return Err(ReadError::UnexpectedContent {
                    line: lines.number(),
                })
            }
        }
    }

    match state {
        State::Done => {}
        State::ExpectHeader => return Err(ReadError::UnexpectedEof { what: "header" }),
        State::ExpectNodes => return Err(ReadError::UnexpectedEof { what: "$Nodes" }),
        State::ExpectElements => return Err(ReadError::UnexpectedEof { what: "$Elements" }),
    }

    tracing::debug!(
        nodes = nodes.len(),
        elements = elements.len(),
        "Read GMSH mesh"
    );
    Ok(Mesh::new(nodes, elements)?)
}

fn read_format<R: BufRead>(lines: &mut Lines<R>) -> Result<(), ReadError> {
    let line = lines
        .next_content()?
        .ok_or(ReadError::UnexpectedEof { what: "$MeshFormat" })?;
    let mut tokens = line.split_whitespace();
    let version = tokens.next().ok_or(ReadError::Malformed {
        what: "format",
        line: lines.number(),
    })?;
    let parsed: f64 = version.parse().map_err(|_| ReadError::Malformed {
        what: "format",
        line: lines.number(),
    })?;
    if parsed.trunc() != 2.0 {
        return Err(ReadError::UnsupportedVersion {
            version: version.to_string(),
            line: lines.number(),
        });
    }
    let file_type = tokens.next().ok_or(ReadError::Malformed {
        what: "format",
        line: lines.number(),
    })?;
    if file_type != "0" {
        return Err(ReadError::BinaryFormat {
            line: lines.number(),
        });
    }
    expect_end(lines, "$EndMeshFormat")
}

fn read_nodes<R: BufRead>(
    lines: &mut Lines<R>,
    nodes: &mut Vec<Node>,
    id_map: &mut FxHashMap<u64, u32>,
) -> Result<(), ReadError> {
    let line = lines
        .next_content()?
        .ok_or(ReadError::UnexpectedEof { what: "$Nodes" })?;
    let count: usize = line.trim().parse().map_err(|_| ReadError::Malformed {
        what: "node count",
        line: lines.number(),
    })?;
    nodes.reserve(count);
    for _ in 0..count {
        let record = lines
            .next_content()?
            .ok_or(ReadError::UnexpectedEof { what: "$Nodes" })?;
        let line_number = lines.number();
        let mut tokens = record.split_whitespace();
        let id: u64 = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(ReadError::Malformed {
                what: "node",
                line: line_number,
            })?;
        let x = parse_float(tokens.next(), "node", line_number)?;
        let y = parse_float(tokens.next(), "node", line_number)?;
        let z = parse_float(tokens.next(), "node", line_number)?;
        let index = nodes.len() as u32;
        if id_map.insert(id, index).is_some() {
            return Err(ReadError::DuplicateNodeId {
                id,
                line: line_number,
            });
        }
        nodes.push(Node::new(index, Point3::new(x, y, z)));
    }
    expect_end(lines, "$EndNodes")
}

fn read_elements<R: BufRead>(
    lines: &mut Lines<R>,
    id_map: &FxHashMap<u64, u32>,
    elements: &mut Vec<Element>,
) -> Result<(), ReadError> {
    let line = lines
        .next_content()?
        .ok_or(ReadError::UnexpectedEof { what: "$Elements" })?;
    let count: usize = line.trim().parse().map_err(|_| ReadError::Malformed {
        what: "element count",
        line: lines.number(),
    })?;
    elements.reserve(count);
    for _ in 0..count {
        let record = lines
            .next_content()?
            .ok_or(ReadError::UnexpectedEof { what: "$Elements" })?;
        let line_number = lines.number();
        let mut tokens = record.split_whitespace();
        let malformed = || ReadError::Malformed {
            what: "element",
            line: line_number,
        };
        let _id: u64 = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        let element_type: u32 = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        let n_tags: usize = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        let mut material = 0i32;
        for i in 0..n_tags {
            let tag: i64 = tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(malformed)?;
            if i == 0 {
                material = tag as i32;
            }
        }
        let kind = match element_type {
            TYPE_LINE => ElementKind::Line,
            TYPE_TRIANGLE => ElementKind::Triangle,
            TYPE_QUAD => ElementKind::Quad,
            TYPE_TETRAHEDRON => ElementKind::Tetrahedron,
            TYPE_HEXAHEDRON => ElementKind::Hexahedron,
            TYPE_PRISM => ElementKind::Prism,
            TYPE_PYRAMID => ElementKind::Pyramid,
            TYPE_POINT => continue,
            other => {
                return Err(ReadError::UnsupportedElementType {
                    element_type: other,
                    line: line_number,
                })
            }
        };
        let mut element_nodes = ElementNodes::new();
        for _ in 0..kind.node_count() {
            let id: u64 = tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(malformed)?;
            let &index = id_map.get(&id).ok_or(ReadError::UndeclaredNodeId {
                id,
                line: line_number,
            })?;
            element_nodes.push(index);
        }
        // The generator and the solver disagree on triangle winding
        if kind == ElementKind::Triangle {
            element_nodes.reverse();
        }
        elements.push(Element::new(kind, element_nodes, material)?);
    }
    expect_end(lines, "$EndElements")
}

fn parse_float(token: Option<&str>, what: &'static str, line: usize) -> Result<f64, ReadError> {
    let token = token.ok_or(ReadError::Malformed { what, line })?;
    fast_float::parse(token).map_err(|_| ReadError::Malformed { what, line })
}

fn skip_section<R: BufRead>(lines: &mut Lines<R>, keyword: &str) -> Result<(), ReadError> {
    let end = format!("$End{}", &keyword[1..]);
    while let Some(line) = lines.next()? {
        if line.trim() == end {
            return Ok(());
        }
    }
    Err(ReadError::UnexpectedEof { what: "section" })
}

fn expect_end<R: BufRead>(lines: &mut Lines<R>, end: &'static str) -> Result<(), ReadError> {
    let line = lines
        .next_content()?
        .ok_or(ReadError::UnexpectedEof { what: end })?;
    if line.trim() != end {
        return Err(ReadError::Malformed {
            what: "section end",
            line: lines.number(),
        });
    }
    Ok(())
}
