// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: GMSH input generation and mesh inspection
//!
//! Subcommands:
//!   write - load JSON geometry files, emit GMSH .geo input
//!   read  - read a legacy .msh mesh and print a summary
//!   check - report whether files carry the GMSH mesh header
//!
//! Usage:
//!   meshprep write <geometry.json>... [options]
//!   meshprep read <mesh.msh>
//!   meshprep check <file>...

mod geometry_file;

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process;

use anyhow::{bail, Context, Result};
use meshprep_geometry::GeometryStore;
use meshprep_gmsh::{is_gmsh_mesh_file, read_msh_file, DensityAlgorithm, GeoWriter, WriterConfig};
use meshprep_mesh::ElementKind;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "write" => run_write(&args[2..]),
        "read" => run_read(&args[2..]),
        "check" => run_check(&args[2..]),
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(1);
        }
    };
    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_write(args: &[String]) -> Result<()> {
    let mut inputs: Vec<String> = Vec::new();
    let mut output = String::from("mesh_input.geo");
    let mut density = DensityAlgorithm::Fixed { edge_length: 0.5 };
    let mut rotate = false;
    let mut stations = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                output = args[i].clone();
            }
            "--edge-length" => {
                i += 1;
                density = DensityAlgorithm::Fixed {
                    edge_length: args[i].parse().expect("Invalid edge length value"),
                };
            }
            "--adaptive" => {
                density = DensityAlgorithm::Adaptive {
                    min_edge_length: args[i + 1]
                        .parse()
                        .expect("Invalid minimum edge length value"),
                    max_edge_length: args[i + 2]
                        .parse()
                        .expect("Invalid maximum edge length value"),
                    leaf_capacity: args[i + 3].parse().expect("Invalid leaf capacity value"),
                };
                i += 3;
            }
            "--rotate" => {
                rotate = true;
            }
            "--stations" => {
                stations = true;
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                process::exit(1);
            }
            path => inputs.push(path.to_string()),
        }
        i += 1;
    }
    if inputs.is_empty() {
        bail!("no geometry files given");
    }

    println!("=== MeshPrep GMSH input generation ===");
    println!();

    println!("[1/3] Loading {} geometry file(s)...", inputs.len());
    let mut store = GeometryStore::new();
    let mut names = Vec::new();
    for path in &inputs {
        let (name, geometry) = geometry_file::load(path)?;
        println!(
            "  {}: {} points, {} stations, {} polylines, {} polygons",
            name,
            geometry.points.len(),
            geometry.stations.len(),
            geometry.polylines.len(),
            geometry.polygons.len()
        );
        names.push(name.clone());
        store.insert(name, geometry);
    }

    println!("[2/3] Preparing writer...");
    match &density {
        DensityAlgorithm::Fixed { edge_length } => {
            println!("  Density: fixed edge length {}", edge_length);
        }
        DensityAlgorithm::Adaptive {
            min_edge_length,
            max_edge_length,
            leaf_capacity,
        } => {
            println!(
                "  Density: adaptive, edge lengths {}..{}, leaf capacity {}",
                min_edge_length, max_edge_length, leaf_capacity
            );
        }
    }
    println!(
        "  Plane: {}",
        if rotate { "best-fit rotation" } else { "projection" }
    );

    let mut config = WriterConfig::new(names, density).context("invalid writer configuration")?;
    config.rotate = rotate;
    config.include_station_constraints = stations;
    let mut writer = GeoWriter::new(config);

    println!("[3/3] Writing {}...", output);
    let file = File::create(&output).with_context(|| format!("cannot create '{}'", output))?;
    let mut out = BufWriter::new(file);
    writer
        .write(&mut store, &mut out)
        .with_context(|| format!("cannot write '{}'", output))?;
    out.flush().with_context(|| format!("cannot write '{}'", output))?;

    println!();
    println!(
        "Done: {} line records, {} plane surfaces",
        writer.lines_written(),
        writer.surfaces_written()
    );
    Ok(())
}

fn run_read(args: &[String]) -> Result<()> {
    if args.len() != 1 {
        bail!("read expects exactly one mesh file");
    }
    let path = &args[0];
    if !is_gmsh_mesh_file(path) {
        bail!("'{}' does not look like a GMSH mesh file", path);
    }
    let mesh = read_msh_file(path).with_context(|| format!("cannot read '{}'", path))?;

    println!(
        "{}: {} nodes, {} elements",
        path,
        mesh.node_count(),
        mesh.element_count()
    );
    for kind in [
        ElementKind::Line,
        ElementKind::Triangle,
        ElementKind::Quad,
        ElementKind::Tetrahedron,
        ElementKind::Hexahedron,
        ElementKind::Prism,
        ElementKind::Pyramid,
    ] {
        let count = mesh.elements().iter().filter(|e| e.kind == kind).count();
        if count > 0 {
            println!("  {:?}: {}", kind, count);
        }
    }
    Ok(())
}

fn run_check(args: &[String]) -> Result<()> {
    if args.is_empty() {
        bail!("check expects at least one file");
    }
    for path in args {
        let verdict = if is_gmsh_mesh_file(path) {
            "gmsh mesh"
        } else {
            "not a gmsh mesh"
        };
        println!("{}: {}", path, verdict);
    }
    Ok(())
}

fn print_usage() {
    println!(
        r#"MeshPrep
========

Generates GMSH geometry input from JSON geometry files and reads the
generator's mesh output back into a typed mesh summary.

USAGE:
  meshprep write <geometry.json>... [OPTIONS]
  meshprep read <mesh.msh>
  meshprep check <file>...

WRITE OPTIONS:
  --output <path>             Output .geo file path (default: mesh_input.geo)
  --edge-length <len>         Fixed target edge length (default: 0.5)
  --adaptive <min> <max> <n>  Adaptive density: edge length bounds and
                              quad-tree leaf capacity
  --rotate                    Rotate onto the best-fit plane instead of
                              projecting onto z = 0
  --stations                  Embed station points as mesh constraints
  -h, --help                  Show this help message

Multiple geometry files are merged into one meshing domain, in the
order given. RUST_LOG controls library log output (default: info).
"#
    );
}
