// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GMSH `.geo` script writer.
//!
//! Turns named geometries from a store into the textual geometry input
//! of the GMSH generator: `Point`, `Line`, `Line Loop` and
//! `Plane Surface` records, plus embedding constraints for polylines and
//! stations that fall inside a surface. Everything the writer builds is
//! scoped to one write; writing the same store twice produces
//! byte-identical output.

use std::io::Write;

use meshprep_geometry::{
    Geometry, GeometryStore, PlaneReduction, PlaneRotation, Point2, Point3, Polyline,
};

use crate::density::{DensityAlgorithm, MeshDensity};
use crate::error::WriteError;
use crate::forest::{HierarchyNode, PolygonForest};

/// Store entry name for the reduced working geometry. Selecting it as an
/// input is rejected, writes replace it.
pub const COMPOSITE_NAME: &str = "gmsh-composite";

/// One point as the generator will see it. The index in the writer's
/// point vector is the emitted sequential identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct GmshPoint {
    pub position: Point2<f64>,
    pub density: f64,
    pub is_station: bool,
}

/// Validated write configuration.
///
/// [`WriterConfig::new`] checks the geometry selection and the density
/// parameters up front, so a constructed configuration cannot fail for
/// configuration reasons later. The flags default to off.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    geometry_names: Vec<String>,
    density: DensityAlgorithm,
    /// Emit `Point In Surface` constraints for stations. When off,
    /// stations are left out of the output entirely.
    pub include_station_constraints: bool,
    /// Rotate onto the best-fit plane instead of projecting onto z = 0.
    pub rotate: bool,
    /// Keep the reduced composite in the store under [`COMPOSITE_NAME`]
    /// after the write.
    pub keep_preprocessed_geometry: bool,
}

impl WriterConfig {
    pub fn new(
        geometry_names: Vec<String>,
        density: DensityAlgorithm,
    ) -> Result<Self, WriteError> {
        if geometry_names.is_empty() {
            return Err(WriteError::NoGeometries);
        }
        if let Some(name) = geometry_names.iter().find(|&n| n == COMPOSITE_NAME) {
            return Err(WriteError::ReservedName(name.clone()));
        }
        density.validate()?;
        Ok(Self {
            geometry_names,
            density,
            include_station_constraints: false,
            rotate: false,
            keep_preprocessed_geometry: false,
        })
    }

    pub fn geometry_names(&self) -> &[String] {
        &self.geometry_names
    }

    pub fn density(&self) -> &DensityAlgorithm {
        &self.density
    }
}

/// Writes GMSH geometry input from a store.
pub struct GeoWriter {
    config: WriterConfig,
    lines_written: usize,
    surfaces_written: usize,
}

impl GeoWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self {
            config,
            lines_written: 0,
            surfaces_written: 0,
        }
    }

    /// Line records emitted by the last write. Lines and line loops
    /// share one identifier counter, so loops count too.
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Plane surface records emitted by the last write.
    pub fn surfaces_written(&self) -> usize {
        self.surfaces_written
    }

    /// Writes the configured selection as GMSH geometry input.
    ///
    /// Multiple selected geometries are merged into a working composite
    /// first. After the write the store holds the reduced composite
    /// under [`COMPOSITE_NAME`] when `keep_preprocessed_geometry` is
    /// set; otherwise any stale composite entry is dropped.
    pub fn write<W: Write>(
        &mut self,
        store: &mut GeometryStore,
        out: &mut W,
    ) -> Result<(), WriteError> {
        let composite = if self.config.geometry_names.len() == 1 {
            let name = &self.config.geometry_names[0];
            store
                .get(name)
                .cloned()
                .ok_or_else(|| meshprep_geometry::Error::UnknownGeometry(name.clone()))?
        } else {
            store.merged(&self.config.geometry_names)?
        };
        if composite.points.is_empty() {
            return Err(WriteError::NoPoints);
        }
        let with_stations =
            self.config.include_station_constraints && !composite.stations.is_empty();

        let reduction = if self.config.rotate {
            // The plane fit sees everything that will be written.
            let mut fit_points = composite.points.clone();
            if with_stations {
                fit_points.extend_from_slice(&composite.stations);
            }
            PlaneReduction::Rotation(PlaneRotation::fit(&fit_points)?)
        } else {
            PlaneReduction::Projection
        };
        let reduced: Vec<Point2<f64>> = composite
            .points
            .iter()
            .map(|p| reduction.reduce(p))
            .collect();
        let reduced_stations: Vec<Point2<f64>> = if with_stations {
            composite
                .stations
                .iter()
                .map(|p| reduction.reduce(p))
                .collect()
        } else {
            Vec::new()
        };

        let mut density_input = reduced.clone();
        density_input.extend_from_slice(&reduced_stations);
        let density = MeshDensity::build(&self.config.density, &density_input)?;

        let forest = PolygonForest::build(&composite, &reduced, &reduced_stations)?;
        let station_base = reduced.len();
        let points = density_points(&reduced, &reduced_stations, &density);

        tracing::info!(
            geometries = self.config.geometry_names.len(),
            points = points.len(),
            polygons = composite.polygons.len(),
            polylines = composite.polylines.len(),
            "Writing GMSH geometry input"
        );

        self.lines_written = 0;
        self.surfaces_written = 0;
        self.emit(&composite, &forest, &points, station_base, &reduction, out)?;

        tracing::debug!(
            lines = self.lines_written,
            surfaces = self.surfaces_written,
            "Emitted GMSH records"
        );

        if self.config.keep_preprocessed_geometry {
            store.insert(
                COMPOSITE_NAME,
                reduced_composite(&composite, &reduced, &reduced_stations),
            );
        } else {
            store.remove(COMPOSITE_NAME);
        }
        Ok(())
    }

    /// Like [`GeoWriter::write`], collecting the output into a string.
    pub fn write_to_string(&mut self, store: &mut GeometryStore) -> Result<String, WriteError> {
        let mut buf = Vec::new();
        self.write(store, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn emit<W: Write>(
        &mut self,
        composite: &Geometry,
        forest: &PolygonForest,
        points: &[GmshPoint],
        station_base: usize,
        reduction: &PlaneReduction,
        out: &mut W,
    ) -> Result<(), WriteError> {
        // The reduced frame never leaks into the output; coordinates go
        // out restored.
        for (id, point) in points.iter().enumerate() {
            let p = reduction.restore(&point.position);
            writeln!(
                out,
                "Point({}) = {{{}, {}, {}, {}}};",
                id, p.x, p.y, p.z, point.density
            )?;
        }

        let mut loop_ids = vec![0usize; forest.len()];
        for &root in forest.roots() {
            for idx in forest.preorder(root) {
                loop_ids[idx] = self.write_ring(forest.node(idx), out)?;
            }
        }

        let mut surface_ids = vec![None; forest.len()];
        for &root in forest.roots() {
            for idx in forest.preorder(root) {
                let sfc = self.surfaces_written;
                self.surfaces_written += 1;
                surface_ids[idx] = Some(sfc);
                let node = forest.node(idx);
                write!(out, "Plane Surface({}) = {{{}", sfc, loop_ids[idx])?;
                for &child in &node.children {
                    write!(out, ", {}", loop_ids[child])?;
                }
                writeln!(out, "}};")?;
            }
        }

        for &root in forest.roots() {
            for idx in forest.preorder(root) {
                for &polyline in &forest.node(idx).polylines {
                    self.write_polyline(&composite.polylines[polyline], surface_ids[idx], out)?;
                }
            }
        }
        for &polyline in &forest.free_polylines {
            self.write_polyline(&composite.polylines[polyline], None, out)?;
        }

        if station_base < points.len() {
            for &root in forest.roots() {
                for idx in forest.preorder(root) {
                    if let Some(sfc) = surface_ids[idx] {
                        for &station in &forest.node(idx).stations {
                            writeln!(
                                out,
                                "Point{{{}}} In Surface{{{}}};",
                                station_base + station,
                                sfc
                            )?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Emits the ring's line records followed by the closing line loop.
    /// Returns the loop identifier.
    fn write_ring<W: Write>(
        &mut self,
        node: &HierarchyNode,
        out: &mut W,
    ) -> Result<usize, WriteError> {
        let ring = &node.ring_indices;
        let first_line = self.lines_written;
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            writeln!(out, "Line({}) = {{{}, {}}};", self.lines_written, a, b)?;
            self.lines_written += 1;
        }
        let loop_id = self.lines_written;
        self.lines_written += 1;
        write!(out, "Line Loop({}) = {{", loop_id)?;
        for (i, line) in (first_line..first_line + ring.len()).enumerate() {
            if i > 0 {
                write!(out, ", ")?;
            }
            write!(out, "{}", line)?;
        }
        writeln!(out, "}};")?;
        Ok(loop_id)
    }

    fn write_polyline<W: Write>(
        &mut self,
        polyline: &Polyline,
        surface: Option<usize>,
        out: &mut W,
    ) -> Result<(), WriteError> {
        for pair in polyline.points.windows(2) {
            let line_id = self.lines_written;
            self.lines_written += 1;
            writeln!(out, "Line({}) = {{{}, {}}};", line_id, pair[0], pair[1])?;
            if let Some(sfc) = surface {
                writeln!(out, "Line{{{}}} In Surface{{{}}};", line_id, sfc)?;
            }
        }
        Ok(())
    }
}

/// Builds the density points the generator will see: geometry points
/// first, stations after, identifiers implied by position.
fn density_points(
    reduced: &[Point2<f64>],
    reduced_stations: &[Point2<f64>],
    density: &MeshDensity,
) -> Vec<GmshPoint> {
    let mut points = Vec::with_capacity(reduced.len() + reduced_stations.len());
    for position in reduced {
        points.push(GmshPoint {
            position: *position,
            density: density.density_at(position),
            is_station: false,
        });
    }
    for position in reduced_stations {
        points.push(GmshPoint {
            position: *position,
            density: density.density_at(position),
            is_station: true,
        });
    }
    points
}

/// The working geometry as it was written, flattened into the reduced
/// plane.
fn reduced_composite(
    composite: &Geometry,
    reduced: &[Point2<f64>],
    reduced_stations: &[Point2<f64>],
) -> Geometry {
    let mut geometry = Geometry::new();
    geometry.points = reduced
        .iter()
        .map(|p| Point3::new(p.x, p.y, 0.0))
        .collect();
    geometry.stations = reduced_stations
        .iter()
        .map(|p| Point3::new(p.x, p.y, 0.0))
        .collect();
    geometry.polylines = composite.polylines.clone();
    geometry.polygons = composite.polygons.clone();
    geometry
}
