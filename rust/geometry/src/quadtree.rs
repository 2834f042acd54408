// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Square quad-tree over a 2D point set.
//!
//! The tree covers the points with one square root cell (side = largest
//! coordinate extent) and subdivides a cell into four equal quadrants
//! whenever it holds more than `leaf_capacity` points. Child cells are
//! created after their parent, so a child's arena index is always greater
//! than its parent's; iterating the arena in reverse visits children
//! before parents.

use nalgebra::Point2;

use crate::error::{Error, Result};

/// Hard depth cap. Guards against coincident points, which no amount of
/// subdivision can separate.
const MAX_DEPTH: usize = 32;

/// How a point query resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    /// The leaf cell containing the query point.
    Leaf(usize),
    /// The deepest cell on whose subdivision boundary the query point
    /// lies exactly.
    Boundary(usize),
}

impl Located {
    /// The cell index, regardless of how the query resolved.
    pub fn index(&self) -> usize {
        match *self {
            Located::Leaf(idx) | Located::Boundary(idx) => idx,
        }
    }
}

#[derive(Debug)]
struct Cell {
    /// Lower-left corner.
    origin: Point2<f64>,
    size: f64,
    depth: usize,
    points: Vec<Point2<f64>>,
    /// Child indices in SW, SE, NW, NE order.
    children: Option<[usize; 4]>,
}

/// Arena-backed quad-tree.
#[derive(Debug)]
pub struct QuadTree {
    cells: Vec<Cell>,
    leaf_capacity: usize,
}

impl QuadTree {
    /// Builds a quad-tree over the given points.
    ///
    /// Fails on an empty point set and on a zero-extent (all points
    /// coincident) set.
    pub fn build(points: &[Point2<f64>], leaf_capacity: usize) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyPointSet("cannot build quad-tree".into()));
        }
        let (min, max) = bounds(points);
        let size = (max.x - min.x).max(max.y - min.y);
        if size <= 0.0 {
            return Err(Error::DegeneratePointSet(
                "zero extent, quad-tree needs spatial spread".into(),
            ));
        }

        let root = Cell {
            origin: min,
            size,
            depth: 0,
            points: Vec::new(),
            children: None,
        };
        let mut tree = Self {
            cells: vec![root],
            leaf_capacity: leaf_capacity.max(1),
        };
        for p in points {
            tree.insert(0, *p);
        }
        Ok(tree)
    }

    /// Number of cells in the arena.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Child indices of a cell, if it is subdivided.
    pub fn children(&self, cell: usize) -> Option<[usize; 4]> {
        self.cells[cell].children
    }

    pub fn is_leaf(&self, cell: usize) -> bool {
        self.cells[cell].children.is_none()
    }

    /// Points stored in a cell. Subdivided cells hold none; their points
    /// moved into the leaves below.
    pub fn cell_points(&self, cell: usize) -> &[Point2<f64>] {
        &self.cells[cell].points
    }

    /// Locates the cell for a query point.
    ///
    /// Queries outside the root square are clamped onto it. A query
    /// exactly on an interior subdivision boundary resolves to the
    /// subdivided cell itself rather than to an arbitrary side of the
    /// boundary.
    pub fn locate(&self, p: &Point2<f64>) -> Located {
        let root = &self.cells[0];
        let x = p.x.clamp(root.origin.x, root.origin.x + root.size);
        let y = p.y.clamp(root.origin.y, root.origin.y + root.size);

        let mut idx = 0;
        loop {
            let cell = &self.cells[idx];
            let Some(children) = cell.children else {
                return Located::Leaf(idx);
            };
            let cx = cell.origin.x + cell.size * 0.5;
            let cy = cell.origin.y + cell.size * 0.5;
            if x == cx || y == cy {
                return Located::Boundary(idx);
            }
            idx = children[quadrant(x, y, cx, cy)];
        }
    }

    fn insert(&mut self, start: usize, p: Point2<f64>) {
        let mut idx = start;
        loop {
            if let Some(children) = self.cells[idx].children {
                let cx = self.cells[idx].origin.x + self.cells[idx].size * 0.5;
                let cy = self.cells[idx].origin.y + self.cells[idx].size * 0.5;
                idx = children[quadrant(p.x, p.y, cx, cy)];
                continue;
            }
            self.cells[idx].points.push(p);
            if self.cells[idx].points.len() > self.leaf_capacity && self.cells[idx].depth < MAX_DEPTH
            {
                self.subdivide(idx);
            }
            return;
        }
    }

    fn subdivide(&mut self, idx: usize) {
        let origin = self.cells[idx].origin;
        let half = self.cells[idx].size * 0.5;
        let depth = self.cells[idx].depth + 1;
        let points = std::mem::take(&mut self.cells[idx].points);

        let base = self.cells.len();
        for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            self.cells.push(Cell {
                origin: Point2::new(origin.x + dx * half, origin.y + dy * half),
                size: half,
                depth,
                points: Vec::new(),
                children: None,
            });
        }
        self.cells[idx].children = Some([base, base + 1, base + 2, base + 3]);

        let cx = origin.x + half;
        let cy = origin.y + half;
        for p in points {
            self.insert(base + quadrant(p.x, p.y, cx, cy), p);
        }
    }
}

/// Quadrant index for the SW, SE, NW, NE child order. Points exactly on
/// a center line go east/north.
fn quadrant(x: f64, y: f64, cx: f64, cy: f64) -> usize {
    (x >= cx) as usize + 2 * (y >= cy) as usize
}

fn bounds(points: &[Point2<f64>]) -> (Point2<f64>, Point2<f64>) {
    let mut min = points[0];
    let mut max = points[0];
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}
