//! Property-based tests for layout planning and box geometry
//!
//! Custom matrices are generated by recursively cutting a rectangle, so every
//! generated index covers a rectangular block by construction.

use pptreport::geometry::{compute, content_area, track_sizes, Margins, SlideSize};
use pptreport::layout::{plan, LayoutMode, LayoutSpec};
use pptreport::Diagnostics;
use proptest::prelude::*;

const EPS: f64 = 1e-9;

/// Cut `rows x cols` into blocks driven by `choices`; `-1` marks empty blocks.
fn guillotine(rows: usize, cols: usize, choices: &[u8]) -> (Vec<Vec<i64>>, usize) {
    let mut matrix = vec![vec![-1; cols]; rows];
    let mut next = 0i64;
    let mut cursor = 0usize;
    cut(&mut matrix, (0, 0, rows, cols), choices, &mut cursor, &mut next);
    (matrix, next as usize)
}

fn cut(
    matrix: &mut Vec<Vec<i64>>,
    (top, left, height, width): (usize, usize, usize, usize),
    choices: &[u8],
    cursor: &mut usize,
    next: &mut i64,
) {
    let choice = choices.get(*cursor).copied().unwrap_or(0);
    *cursor += 1;

    let split = choice % 3;
    if split == 1 && height > 1 {
        let at = 1 + (choice as usize / 3) % (height - 1);
        cut(matrix, (top, left, at, width), choices, cursor, next);
        cut(matrix, (top + at, left, height - at, width), choices, cursor, next);
    } else if split == 2 && width > 1 {
        let at = 1 + (choice as usize / 3) % (width - 1);
        cut(matrix, (top, left, height, at), choices, cursor, next);
        cut(matrix, (top, left + at, height, width - at), choices, cursor, next);
    } else {
        let value = if choice % 7 == 6 { -1 } else { *next };
        if value >= 0 {
            *next += 1;
        }
        for row in matrix.iter_mut().skip(top).take(height) {
            for cell in row.iter_mut().skip(left).take(width) {
                *cell = value;
            }
        }
    }
}

fn custom(matrix: Vec<Vec<i64>>) -> LayoutSpec {
    LayoutSpec {
        mode: LayoutMode::Custom(matrix),
        ..LayoutSpec::default()
    }
}

proptest! {
    #[test]
    fn grid_with_few_items_is_one_row(n_columns in 1usize..10, n in 1usize..10) {
        prop_assume!(n <= n_columns);
        let spec = LayoutSpec { n_columns, ..LayoutSpec::default() };
        let grid = plan(n, &spec, &mut Diagnostics::new()).unwrap();
        prop_assert_eq!(grid.rows(), 1);
        prop_assert_eq!(grid.cols(), n);
    }

    #[test]
    fn grid_holds_every_item_once(n_columns in 1usize..6, n in 1usize..30) {
        let spec = LayoutSpec { n_columns, ..LayoutSpec::default() };
        let grid = plan(n, &spec, &mut Diagnostics::new()).unwrap();
        let indices: Vec<usize> = grid.assignments().iter().map(|a| a.index).collect();
        prop_assert_eq!(indices, (0..n).collect::<Vec<_>>());
        prop_assert!(grid.rows() * grid.cols() >= n);
        prop_assert!(grid.rows() * grid.cols() < n + grid.cols());
    }

    #[test]
    fn generated_matrices_are_accepted(
        rows in 1usize..5,
        cols in 1usize..5,
        choices in prop::collection::vec(any::<u8>(), 32),
    ) {
        let (matrix, n) = guillotine(rows, cols, &choices);
        prop_assume!(n > 0);

        let spec = custom(matrix.clone());
        let grid = plan(n, &spec, &mut Diagnostics::new()).unwrap();
        prop_assert_eq!(grid.rows(), rows);
        prop_assert_eq!(grid.cols(), cols);

        for assignment in grid.assignments() {
            for row in assignment.rows.clone() {
                for col in assignment.cols.clone() {
                    prop_assert_eq!(matrix[row][col], assignment.index as i64);
                }
            }
        }
    }

    #[test]
    fn non_rectangular_block_is_rejected(rows in 2usize..5, cols in 2usize..5) {
        // index 0 forms an L in the top-left corner
        let mut next = 1i64;
        let matrix: Vec<Vec<i64>> = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| {
                        if (r, c) == (0, 0) || (r, c) == (0, 1) || (r, c) == (1, 0) {
                            0
                        } else {
                            next += 1;
                            next - 1
                        }
                    })
                    .collect()
            })
            .collect();
        let n = (next) as usize;

        prop_assert!(plan(n, &custom(matrix), &mut Diagnostics::new()).is_err());
    }

    #[test]
    fn track_sizes_fill_the_available_length(
        ratios in prop::collection::vec(0.1f64..10.0, 1..6),
        total in 10.0f64..100.0,
        inner in 0.0f64..1.5,
    ) {
        let sizes = track_sizes(total, ratios.len(), inner, Some(&ratios), "width").unwrap();
        let gaps = (ratios.len() - 1) as f64 * inner;
        let sum: f64 = sizes.iter().sum();
        prop_assert!((sum + gaps - total).abs() < EPS * total.max(1.0) * 10.0);
        prop_assert!(sizes.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn boxes_stay_inside_the_content_area(n_columns in 1usize..5, n in 1usize..13) {
        let spec = LayoutSpec { n_columns, ..LayoutSpec::default() };
        let area = content_area(SlideSize::WIDESCREEN, &Margins::default(), 0.0).unwrap();
        let grid = plan(n, &spec, &mut Diagnostics::new()).unwrap();
        let boxes = compute(&grid, &spec, area).unwrap();

        prop_assert_eq!(boxes.len(), n);
        for placement in &boxes {
            let r = placement.rect;
            prop_assert!(r.x >= area.x - 1e-6 && r.y >= area.y - 1e-6);
            prop_assert!(r.right() <= area.right() + 1e-6);
            prop_assert!(r.bottom() <= area.bottom() + 1e-6);
        }
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                let overlap_x = a.rect.x < b.rect.right() - 1e-6 && b.rect.x < a.rect.right() - 1e-6;
                let overlap_y = a.rect.y < b.rect.bottom() - 1e-6 && b.rect.y < a.rect.bottom() - 1e-6;
                prop_assert!(!(overlap_x && overlap_y));
            }
        }
    }
}
