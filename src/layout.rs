// ABOUTME: Layout planning for the pptreport application
// ABOUTME: Turns a content count and layout directive into a grid of cell assignments

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::errors::{ReportError, Result};
use crate::geometry::{AlignmentSpec, Margins};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutMode {
    Named(NamedLayout),
    Custom(Vec<Vec<i64>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedLayout {
    Grid,
    Vertical,
    Horizontal,
}

impl Default for LayoutMode {
    fn default() -> Self {
        LayoutMode::Named(NamedLayout::Grid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillOrder {
    #[default]
    Row,
    Column,
}

/// The resolved layout directive of one slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSpec {
    pub mode: LayoutMode,
    pub n_columns: usize,
    pub width_ratios: Option<Vec<f64>>,
    pub height_ratios: Option<Vec<f64>>,
    pub margins: Margins,
    pub fill_by: FillOrder,
    pub content_alignment: AlignmentSpec,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            mode: LayoutMode::default(),
            n_columns: 2,
            width_ratios: None,
            height_ratios: None,
            margins: Margins::default(),
            fill_by: FillOrder::Row,
            content_alignment: AlignmentSpec::default(),
        }
    }
}

/// The block of cells one content index covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellAssignment {
    pub index: usize,
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

/// A planned grid. Cells are stored row-major; `None` marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<usize>>,
}

impl CellGrid {
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<usize> {
        self.cells[row * self.cols + col]
    }

    /// One assignment per content index, ordered by index.
    ///
    /// Construction guarantees every index covers a full rectangle, so the
    /// bounding box of its cells is exactly its block.
    pub fn assignments(&self) -> Vec<CellAssignment> {
        let mut blocks: BTreeMap<usize, (Range<usize>, Range<usize>)> = BTreeMap::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if let Some(index) = self.cell(row, col) {
                    let block = blocks
                        .entry(index)
                        .or_insert((row..row + 1, col..col + 1));
                    block.0.end = block.0.end.max(row + 1);
                    block.1.start = block.1.start.min(col);
                    block.1.end = block.1.end.max(col + 1);
                }
            }
        }

        blocks
            .into_iter()
            .map(|(index, (rows, cols))| CellAssignment { index, rows, cols })
            .collect()
    }
}

/// Plan the grid for `n_items` pieces of content.
///
/// With no content the grid is 0×0 and the caller decides what to do with
/// the slide. Ratio lists must match the planned grid exactly.
pub fn plan(n_items: usize, spec: &LayoutSpec, diagnostics: &mut Diagnostics) -> Result<CellGrid> {
    if n_items == 0 {
        return Ok(CellGrid::empty());
    }

    let grid = match &spec.mode {
        LayoutMode::Named(NamedLayout::Grid) => grid_layout(n_items, spec.n_columns, spec.fill_by)?,
        LayoutMode::Named(NamedLayout::Vertical) => CellGrid {
            rows: n_items,
            cols: 1,
            cells: (0..n_items).map(Some).collect(),
        },
        LayoutMode::Named(NamedLayout::Horizontal) => CellGrid {
            rows: 1,
            cols: n_items,
            cells: (0..n_items).map(Some).collect(),
        },
        LayoutMode::Custom(matrix) => custom_layout(n_items, matrix, diagnostics)?,
    };

    check_ratios("width_ratios", spec.width_ratios.as_deref(), grid.cols, "columns")?;
    check_ratios("height_ratios", spec.height_ratios.as_deref(), grid.rows, "rows")?;

    Ok(grid)
}

fn grid_layout(n_items: usize, n_columns: usize, fill_by: FillOrder) -> Result<CellGrid> {
    if n_columns == 0 {
        return Err(ReportError::config("'n_columns' must be at least 1"));
    }

    // There cannot be more columns than items.
    let cols = n_columns.min(n_items);
    let rows = (n_items + cols - 1) / cols;

    let mut cells = vec![None; rows * cols];
    for index in 0..n_items {
        let (row, col) = match fill_by {
            FillOrder::Row => (index / cols, index % cols),
            FillOrder::Column => (index % rows, index / rows),
        };
        cells[row * cols + col] = Some(index);
    }

    Ok(CellGrid { rows, cols, cells })
}

fn custom_layout(n_items: usize, matrix: &[Vec<i64>], diagnostics: &mut Diagnostics) -> Result<CellGrid> {
    let rows = matrix.len();
    let cols = matrix.first().map(Vec::len).unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Err(ReportError::config("Custom layout matrix must not be empty"));
    }
    if let Some(bad) = matrix.iter().position(|row| row.len() != cols) {
        return Err(ReportError::config(format!(
            "Custom layout matrix is not rectangular: row {} has {} entries, expected {}",
            bad,
            matrix[bad].len(),
            cols
        )));
    }

    let mut cells = Vec::with_capacity(rows * cols);
    let mut unused = Vec::new();
    for &value in matrix.iter().flatten() {
        let cell = match value {
            -1 => None,
            v if v < -1 => {
                return Err(ReportError::config(format!(
                    "Invalid value {} in custom layout matrix; use a content index or -1",
                    v
                )))
            }
            v if v as usize >= n_items => {
                if !unused.contains(&v) {
                    unused.push(v);
                }
                None
            }
            v => Some(v as usize),
        };
        cells.push(cell);
    }

    if !unused.is_empty() {
        diagnostics.warn(
            WarningKind::UnusedCell,
            None,
            format!(
                "Custom layout references boxes {:?} but there are only {} items; leaving them empty",
                unused, n_items
            ),
        );
    }

    let grid = CellGrid { rows, cols, cells };
    check_blocks(&grid, n_items)?;
    Ok(grid)
}

/// Every index must appear, and its cells must fill their bounding box.
fn check_blocks(grid: &CellGrid, n_items: usize) -> Result<()> {
    let assignments = grid.assignments();

    let present: Vec<usize> = assignments.iter().map(|a| a.index).collect();
    let missing: Vec<usize> = (0..n_items).filter(|i| !present.contains(i)).collect();
    if !missing.is_empty() {
        return Err(ReportError::config(format!(
            "Custom layout matrix has no cell for content indices {:?}",
            missing
        )));
    }

    for block in &assignments {
        for row in block.rows.clone() {
            for col in block.cols.clone() {
                if grid.cell(row, col) != Some(block.index) {
                    return Err(ReportError::config(format!(
                        "Cells with index {} in custom layout do not form a rectangle",
                        block.index
                    )));
                }
            }
        }
    }

    Ok(())
}

pub(crate) fn check_ratios(name: &str, ratios: Option<&[f64]>, expected: usize, what: &str) -> Result<()> {
    let Some(ratios) = ratios else {
        return Ok(());
    };

    if ratios.len() != expected {
        return Err(ReportError::config(format!(
            "'{}' has {} entries but the layout has {} {}",
            name,
            ratios.len(),
            expected,
            what
        )));
    }
    if ratios.iter().any(|r| !r.is_finite() || *r <= 0.0) {
        return Err(ReportError::config(format!(
            "'{}' must only contain positive numbers, got {:?}",
            name, ratios
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(mode: LayoutMode) -> LayoutSpec {
        LayoutSpec {
            mode,
            ..LayoutSpec::default()
        }
    }

    fn rows_of(grid: &CellGrid) -> Vec<Vec<i64>> {
        (0..grid.rows())
            .map(|r| {
                (0..grid.cols())
                    .map(|c| grid.cell(r, c).map(|i| i as i64).unwrap_or(-1))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn grid_fills_by_row() {
        let mut diags = Diagnostics::new();
        let mut s = spec(LayoutMode::default());
        s.n_columns = 3;
        let grid = plan(5, &s, &mut diags).unwrap();
        assert_eq!(rows_of(&grid), vec![vec![0, 1, 2], vec![3, 4, -1]]);
    }

    #[test]
    fn grid_fills_by_column() {
        let mut diags = Diagnostics::new();
        let mut s = spec(LayoutMode::default());
        s.n_columns = 2;
        s.fill_by = FillOrder::Column;
        let grid = plan(5, &s, &mut diags).unwrap();
        assert_eq!(rows_of(&grid), vec![vec![0, 3], vec![1, 4], vec![2, -1]]);
    }

    #[test]
    fn grid_clamps_columns_to_items() {
        let mut diags = Diagnostics::new();
        let mut s = spec(LayoutMode::default());
        s.n_columns = 4;
        let grid = plan(3, &s, &mut diags).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (1, 3));
    }

    #[test]
    fn vertical_and_horizontal() {
        let mut diags = Diagnostics::new();
        let grid = plan(3, &spec(LayoutMode::Named(NamedLayout::Vertical)), &mut diags).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (3, 1));
        let grid = plan(3, &spec(LayoutMode::Named(NamedLayout::Horizontal)), &mut diags).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (1, 3));
    }

    #[test]
    fn no_items_no_grid() {
        let mut diags = Diagnostics::new();
        let grid = plan(0, &LayoutSpec::default(), &mut diags).unwrap();
        assert!(grid.is_empty());
        assert_eq!((grid.rows(), grid.cols()), (0, 0));
        assert!(grid.assignments().is_empty());
    }

    #[test]
    fn zero_columns_is_an_error() {
        let mut diags = Diagnostics::new();
        let mut s = LayoutSpec::default();
        s.n_columns = 0;
        assert!(plan(2, &s, &mut diags).is_err());
    }

    #[test]
    fn custom_matrix_with_spans_and_holes() {
        let mut diags = Diagnostics::new();
        let matrix = vec![vec![0, 0, 1], vec![0, 0, -1], vec![2, 2, 2]];
        let grid = plan(3, &spec(LayoutMode::Custom(matrix)), &mut diags).unwrap();
        let assignments = grid.assignments();
        assert_eq!(
            assignments,
            vec![
                CellAssignment { index: 0, rows: 0..2, cols: 0..2 },
                CellAssignment { index: 1, rows: 0..1, cols: 2..3 },
                CellAssignment { index: 2, rows: 2..3, cols: 0..3 },
            ]
        );
    }

    #[test]
    fn custom_matrix_rejects_non_rectangular_block() {
        let mut diags = Diagnostics::new();
        let matrix = vec![vec![0, 0], vec![0, 1]];
        assert!(matches!(
            plan(2, &spec(LayoutMode::Custom(matrix)), &mut diags),
            Err(ReportError::Configuration(_))
        ));

        let split = vec![vec![0, 1, 0]];
        assert!(plan(2, &spec(LayoutMode::Custom(split)), &mut diags).is_err());
    }

    #[test]
    fn custom_matrix_requires_every_index() {
        let mut diags = Diagnostics::new();
        let matrix = vec![vec![0, -1], vec![2, 2]];
        assert!(plan(3, &spec(LayoutMode::Custom(matrix)), &mut diags).is_err());
    }

    #[test]
    fn custom_matrix_shape_checks() {
        let mut diags = Diagnostics::new();
        assert!(plan(1, &spec(LayoutMode::Custom(vec![])), &mut diags).is_err());
        assert!(plan(2, &spec(LayoutMode::Custom(vec![vec![0, 1], vec![1]])), &mut diags).is_err());
        assert!(plan(1, &spec(LayoutMode::Custom(vec![vec![0, -2]])), &mut diags).is_err());
    }

    #[test]
    fn custom_matrix_extra_indices_stay_empty() {
        let mut diags = Diagnostics::new();
        let matrix = vec![vec![0, 1, 2]];
        let grid = plan(2, &spec(LayoutMode::Custom(matrix)), &mut diags).unwrap();
        assert_eq!(grid.cell(0, 2), None);
        assert_eq!(grid.assignments().len(), 2);
        assert_eq!(diags.count(WarningKind::UnusedCell), 1);
    }

    #[test]
    fn ratio_lengths_must_match() {
        let mut diags = Diagnostics::new();
        let mut s = LayoutSpec::default();
        s.width_ratios = Some(vec![1.0, 2.0, 3.0]);
        assert!(plan(4, &s, &mut diags).is_err());

        s.width_ratios = Some(vec![1.0, 2.0]);
        s.height_ratios = Some(vec![1.0, 1.0]);
        assert!(plan(4, &s, &mut diags).is_ok());

        s.height_ratios = Some(vec![1.0, 0.0]);
        assert!(plan(4, &s, &mut diags).is_err());
    }
}
