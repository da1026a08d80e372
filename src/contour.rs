//! Iso-contour extraction over a [`ScoreField`] (marching squares).
//!
//! Every lattice cell is classified by which of its four corners lie above
//! the level (`value > level`). Crossings are linearly interpolated along the
//! cell edges whose endpoints disagree, and joined into one segment per cell
//! or two for a saddle. Crossing points are identified by the lattice edge
//! they lie on, so neighbouring cells share endpoints exactly and chaining
//! needs no tolerance.
//!
//! Saddle cells (diagonal corners on the same side) are resolved with the
//! cell-centre value, taken as the mean of the four corners: when the centre
//! is on the same side as a diagonal pair, that pair is joined through the
//! cell and the other two corners are cut off.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{BoundaryError, Result};
use crate::grid::ScoreField;

/// Default decision threshold for the outlier models.
pub const DECISION_LEVEL: f64 = 0.0;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A chain of contour points. Closed polylines do not repeat the first point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub points: Vec<[f64; 2]>,
    pub closed: bool,
}

impl Polyline {
    /// Even-odd containment test. Always false for open polylines.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        self.closed && crossings(&self.points, p) % 2 == 1
    }
}

/// Number of polygon edges crossed by a ray cast from `p` towards +x.
fn crossings(ring: &[[f64; 2]], p: [f64; 2]) -> usize {
    let n = ring.len();
    if n < 3 {
        return 0;
    }
    let mut count = 0;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a[1] > p[1]) != (b[1] > p[1]) {
            let x = a[0] + (p[1] - a[1]) * (b[0] - a[0]) / (b[1] - a[1]);
            if p[0] < x {
                count += 1;
            }
        }
        j = i;
    }
    count
}

/// All polylines where a score field crosses `level`, in cell-scan order:
/// open chains (ending on the grid border) first, then closed loops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundarySet {
    pub level: f64,
    pub polylines: Vec<Polyline>,
}

impl BoundarySet {
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    /// Whether `p` lies inside the region enclosed by the closed polylines,
    /// using the even-odd rule across all of them so holes are excluded.
    pub fn encloses(&self, p: [f64; 2]) -> bool {
        let total: usize = self
            .polylines
            .iter()
            .filter(|pl| pl.closed)
            .map(|pl| crossings(&pl.points, p))
            .sum();
        total % 2 == 1
    }

    /// Fraction of `points` enclosed by the boundary.
    pub fn enclosed_fraction(&self, points: &[[f64; 2]]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let inside = points.iter().filter(|&&p| self.encloses(p)).count();
        inside as f64 / points.len() as f64
    }
}

// ---------------------------------------------------------------------------
// Lattice edges
// ---------------------------------------------------------------------------

/// A lattice edge, named by its lower/left endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Edge {
    /// (row, col) – (row, col + 1)
    Horizontal(usize, usize),
    /// (row, col) – (row + 1, col)
    Vertical(usize, usize),
}

impl Edge {
    fn endpoints(self) -> ((usize, usize), (usize, usize)) {
        match self {
            Edge::Horizontal(r, c) => ((r, c), (r, c + 1)),
            Edge::Vertical(r, c) => ((r, c), (r + 1, c)),
        }
    }

    /// Linear interpolation of the level crossing along this edge.
    fn crossing(self, field: &ScoreField, level: f64) -> [f64; 2] {
        let ((r0, c0), (r1, c1)) = self.endpoints();
        let (v0, v1) = (field.at(r0, c0), field.at(r1, c1));
        let t = (level - v0) / (v1 - v0);
        let (x0, y0) = (field.xs()[c0], field.ys()[r0]);
        let (x1, y1) = (field.xs()[c1], field.ys()[r1]);
        [x0 + t * (x1 - x0), y0 + t * (y1 - y0)]
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract the decision boundary at [`DECISION_LEVEL`].
pub fn extract_decision_boundary(field: &ScoreField) -> Result<BoundarySet> {
    extract(field, DECISION_LEVEL)
}

/// Extract every polyline along which the field's linear interpolation equals
/// `level`. A field entirely on one side yields an empty set.
pub fn extract(field: &ScoreField, level: f64) -> Result<BoundarySet> {
    if !level.is_finite() {
        return Err(BoundaryError::InvalidConfig(format!("contour level {level} is not finite")));
    }
    if field.nx() < 2 || field.ny() < 2 {
        return Err(BoundaryError::InvalidGridSpec(format!(
            "score field is {}x{}, need at least 2x2",
            field.nx(),
            field.ny()
        )));
    }
    if let Some(i) = field.values().iter().position(|v| !v.is_finite()) {
        return Err(BoundaryError::InvalidConfig(format!(
            "score at lattice index {i} is not finite"
        )));
    }

    let segments = cell_segments(field, level);
    let polylines = chain(&segments)
        .into_iter()
        .map(|(edges, closed)| Polyline {
            points: edges.iter().map(|e| e.crossing(field, level)).collect(),
            closed,
        })
        .collect();

    Ok(BoundarySet { level, polylines })
}

/// Per-cell segments, each joining two crossed edges.
fn cell_segments(field: &ScoreField, level: f64) -> Vec<(Edge, Edge)> {
    let above = |r: usize, c: usize| field.at(r, c) > level;
    let mut segments = Vec::new();

    for r in 0..field.ny() - 1 {
        for c in 0..field.nx() - 1 {
            let bl = above(r, c);
            let br = above(r, c + 1);
            let tr = above(r + 1, c + 1);
            let tl = above(r + 1, c);

            let bottom = Edge::Horizontal(r, c);
            let right = Edge::Vertical(r, c + 1);
            let top = Edge::Horizontal(r + 1, c);
            let left = Edge::Vertical(r, c);

            let crossed: Vec<Edge> = [(bottom, bl != br), (right, br != tr), (top, tl != tr), (left, bl != tl)]
                .into_iter()
                .filter_map(|(e, hit)| hit.then_some(e))
                .collect();

            match crossed.len() {
                2 => segments.push((crossed[0], crossed[1])),
                4 => {
                    let center = (field.at(r, c)
                        + field.at(r, c + 1)
                        + field.at(r + 1, c + 1)
                        + field.at(r + 1, c))
                        / 4.0;
                    if (center > level) == bl {
                        // bl and tr joined: cut off br and tl
                        segments.push((bottom, right));
                        segments.push((top, left));
                    } else {
                        // br and tl joined: cut off bl and tr
                        segments.push((left, bottom));
                        segments.push((right, top));
                    }
                }
                _ => {}
            }
        }
    }
    segments
}

/// Join segments sharing an edge into chains of edges.
fn chain(segments: &[(Edge, Edge)]) -> Vec<(Vec<Edge>, bool)> {
    let mut incident: BTreeMap<Edge, Vec<usize>> = BTreeMap::new();
    for (i, &(a, b)) in segments.iter().enumerate() {
        incident.entry(a).or_default().push(i);
        incident.entry(b).or_default().push(i);
    }
    let degree = |e: &Edge| incident.get(e).map_or(0, Vec::len);

    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    // Open chains start from a border edge (degree one).
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        let (a, b) = segments[i];
        let start = if degree(&a) == 1 {
            a
        } else if degree(&b) == 1 {
            b
        } else {
            continue;
        };
        chains.push((walk(segments, &incident, &mut used, i, start), false));
    }

    // Whatever remains forms closed loops.
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        let start = segments[i].0;
        let mut edges = walk(segments, &incident, &mut used, i, start);
        if edges.len() > 1 && edges.first() == edges.last() {
            edges.pop();
        }
        chains.push((edges, true));
    }
    chains
}

/// Follow unused segments from `start` along segment `first`.
fn walk(
    segments: &[(Edge, Edge)],
    incident: &BTreeMap<Edge, Vec<usize>>,
    used: &mut [bool],
    first: usize,
    start: Edge,
) -> Vec<Edge> {
    let mut edges = vec![start];
    let mut seg = first;
    let mut at = start;
    loop {
        used[seg] = true;
        let (a, b) = segments[seg];
        at = if a == at { b } else { a };
        edges.push(at);
        let next = incident
            .get(&at)
            .and_then(|segs| segs.iter().copied().find(|&s| !used[s]));
        match next {
            Some(s) => seg = s,
            None => break,
        }
    }
    edges
}
