//! Declarative grid layout placement
//!
//! A widget grid is declared as a rectangular table of cells. Each cell is
//! either a widget reference, a merge marker ("extend the previous cell's
//! span"), or a spacer width that materializes as a blank filler element.
//! [`place`] turns the table into placement commands (row, column,
//! column-span, padding); [`GridMetrics`] resolves those commands into
//! client-area pixel rectangles for the widget layer.
//!
//! Validation is strict and happens up front: a malformed table never
//! produces a partial placement list.

use crate::domain::core::Rect;
use thiserror::Error;

/// One cell of the declared widget table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<W> {
    /// A widget to place at this cell
    Widget(W),
    /// Extends the span of the nearest non-merge cell to the left
    Merge,
    /// Blank filler element of the given width (in base units)
    Spacer(u16),
}

/// External and internal padding applied to every placement
///
/// `padx`/`pady` surround each grid cell; `ipadx`/`ipady` grow the placed
/// element itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub padx: u16,
    pub pady: u16,
    pub ipadx: u16,
    pub ipady: u16,
}

impl Padding {
    pub fn new(padx: u16, pady: u16, ipadx: u16, ipady: u16) -> Self {
        Self { padx, pady, ipadx, ipady }
    }

    /// Uniform padding on all four values
    pub fn uniform(pad: u16) -> Self {
        Self::new(pad, pad, pad, pad)
    }
}

impl From<u16> for Padding {
    fn from(pad: u16) -> Self {
        Padding::uniform(pad)
    }
}

/// Where the grid block sits inside a larger client area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
}

/// Whether a placed element stretches across its spanned cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    /// Stretch to the full spanned width (sticky news)
    #[default]
    Stretch,
    /// Keep a single cell width, centered in the span
    None,
}

/// What ended up in a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content<W> {
    Widget(W),
    /// Spacer cell materialized as a blank element of the given width
    Filler(u16),
}

/// A single placement command for the widget layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<W> {
    pub row: usize,
    pub column: usize,
    pub column_span: usize,
    pub padding: Padding,
    pub content: Content<W>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("widget table has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Converts a widget table into placement commands.
///
/// Every non-merge cell yields exactly one placement whose column-span is
/// 1 plus the run of merge markers immediately to its right. Merge markers
/// themselves yield nothing, so a marker at the start of a row simply
/// leaves that cell empty.
///
/// Fails before emitting anything if the table is empty or any row length
/// differs from row 0.
pub fn place<W: Copy>(
    table: &[Vec<Cell<W>>],
    padding: Padding,
) -> Result<Vec<Placement<W>>, LayoutError> {
    let expected = table.first().ok_or(LayoutError::Empty)?.len();
    for (row, cells) in table.iter().enumerate() {
        if cells.len() != expected {
            return Err(LayoutError::RaggedRows {
                row,
                expected,
                found: cells.len(),
            });
        }
    }

    let mut placements = Vec::new();
    for (row, cells) in table.iter().enumerate() {
        for (column, cell) in cells.iter().enumerate() {
            let content = match cell {
                Cell::Merge => continue,
                Cell::Widget(widget) => Content::Widget(*widget),
                Cell::Spacer(width) => Content::Filler(*width),
            };

            let span_extent = cells[column + 1..]
                .iter()
                .take_while(|next| matches!(next, Cell::Merge))
                .count();

            placements.push(Placement {
                row,
                column,
                column_span: 1 + span_extent,
                padding,
                content,
            });
        }
    }

    Ok(placements)
}

/// Pixel geometry for resolving placements into client rectangles
///
/// Columns are uniform; rows carry individual heights. All values are in
/// pixels, already scaled by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMetrics {
    pub column_width: i32,
    pub row_heights: Vec<i32>,
    pub columns: usize,
    pub fill: Fill,
    pub anchor: Anchor,
}

impl GridMetrics {
    /// Total pixel size of the grid block including external padding.
    pub fn content_size(&self, padding: Padding) -> (i32, i32) {
        let padx = padding.padx as i32;
        let pady = padding.pady as i32;
        let w = self.columns as i32 * (self.column_width + 2 * padx);
        let h: i32 = self.row_heights.iter().sum::<i32>()
            + self.row_heights.len() as i32 * 2 * pady;
        (w, h)
    }

    /// Origin of the grid block inside a client area of the given size.
    pub fn origin_in(&self, client_w: i32, client_h: i32, padding: Padding) -> (i32, i32) {
        match self.anchor {
            Anchor::TopLeft => (0, 0),
            Anchor::Center => {
                let (w, h) = self.content_size(padding);
                (((client_w - w) / 2).max(0), ((client_h - h) / 2).max(0))
            }
        }
    }

    /// Resolves one placement into a client-area rectangle.
    ///
    /// A stretched element covers its spanned cells plus the padding gaps
    /// between them; a non-stretched element keeps one cell width centered
    /// within the span. `ipadx`/`ipady` grow the element on each side.
    pub fn resolve<W>(&self, placement: &Placement<W>, origin: (i32, i32)) -> Rect {
        let pad = placement.padding;
        let padx = pad.padx as i32;
        let pady = pad.pady as i32;
        let ipadx = pad.ipadx as i32;
        let ipady = pad.ipady as i32;

        let cell_stride = self.column_width + 2 * padx;
        let span = placement.column_span as i32;
        let spanned_w = span * self.column_width + (span - 1) * 2 * padx;

        let cell_x = origin.0 + placement.column as i32 * cell_stride + padx;
        let (x, w) = match self.fill {
            Fill::Stretch => (cell_x - ipadx, spanned_w + 2 * ipadx),
            Fill::None => (
                cell_x + (spanned_w - self.column_width) / 2 - ipadx,
                self.column_width + 2 * ipadx,
            ),
        };

        let above: i32 = self.row_heights[..placement.row].iter().sum();
        let y = origin.1 + above + placement.row as i32 * 2 * pady + pady - ipady;
        let h = self.row_heights[placement.row] + 2 * ipady;

        Rect::new(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Id {
        A,
        B,
        C,
    }

    fn spans<W: Copy>(placements: &[Placement<W>]) -> Vec<(usize, usize, usize)> {
        placements
            .iter()
            .map(|p| (p.row, p.column, p.column_span))
            .collect()
    }

    #[test]
    fn plain_grid_yields_span_one_everywhere() {
        let table = vec![
            vec![Cell::Widget(Id::A), Cell::Widget(Id::B)],
            vec![Cell::Widget(Id::C), Cell::Widget(Id::A)],
        ];
        let placements = place(&table, Padding::default()).unwrap();
        assert_eq!(placements.len(), 4);
        assert!(placements.iter().all(|p| p.column_span == 1));
    }

    #[test]
    fn merge_run_collapses_into_one_placement() {
        let table = vec![vec![
            Cell::Widget(Id::A),
            Cell::Merge,
            Cell::Merge,
            Cell::Widget(Id::B),
        ]];
        let placements = place(&table, Padding::default()).unwrap();
        assert_eq!(spans(&placements), vec![(0, 0, 3), (0, 3, 1)]);
    }

    #[test]
    fn ragged_rows_error_before_any_placement() {
        let table = vec![
            vec![Cell::Widget(Id::A), Cell::Widget(Id::B)],
            vec![Cell::Widget(Id::C)],
        ];
        assert_eq!(
            place(&table, Padding::default()),
            Err(LayoutError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn empty_table_is_an_error() {
        let table: Vec<Vec<Cell<Id>>> = Vec::new();
        assert_eq!(place(&table, Padding::default()), Err(LayoutError::Empty));
    }

    #[test]
    fn leading_merge_marker_leaves_cell_empty() {
        let table = vec![vec![Cell::Merge, Cell::Widget(Id::A)]];
        let placements = place(&table, Padding::default()).unwrap();
        assert_eq!(spans(&placements), vec![(0, 1, 1)]);
    }

    #[test]
    fn spacer_materializes_as_filler() {
        let table = vec![vec![Cell::Widget(Id::A), Cell::Spacer(4), Cell::Merge]];
        let placements = place(&table, Padding::uniform(2)).unwrap();
        assert_eq!(placements[1].content, Content::<Id>::Filler(4));
        assert_eq!(placements[1].column_span, 2);
    }

    #[test]
    fn triangular_table_places_lower_half_only() {
        // Mirrors a 9x9 multiplication table where cells above the diagonal
        // are spacers.
        let table: Vec<Vec<Cell<(usize, usize)>>> = (0..9)
            .map(|i| {
                (0..9)
                    .map(|j| {
                        if i >= j {
                            Cell::Widget((i, j))
                        } else {
                            Cell::Spacer(1)
                        }
                    })
                    .collect()
            })
            .collect();
        let placements = place(&table, Padding::uniform(1)).unwrap();
        assert_eq!(placements.len(), 81);
        let widgets = placements
            .iter()
            .filter(|p| matches!(p.content, Content::Widget(_)))
            .count();
        assert_eq!(widgets, 45);
    }

    #[test]
    fn metrics_resolve_stretched_span() {
        let metrics = GridMetrics {
            column_width: 90,
            row_heights: vec![40, 30],
            columns: 2,
            fill: Fill::Stretch,
            anchor: Anchor::TopLeft,
        };
        let pad = Padding::new(10, 10, 0, 0);
        let table = vec![
            vec![Cell::Widget(Id::A), Cell::Merge],
            vec![Cell::Widget(Id::B), Cell::Widget(Id::C)],
        ];
        let placements = place(&table, pad).unwrap();

        let spanning = metrics.resolve(&placements[0], (0, 0));
        assert_eq!(spanning, Rect::new(10, 10, 200, 40));

        let second_row_right = metrics.resolve(&placements[2], (0, 0));
        assert_eq!(second_row_right, Rect::new(120, 70, 90, 30));
    }

    #[test]
    fn metrics_center_anchor_offsets_block() {
        let metrics = GridMetrics {
            column_width: 50,
            row_heights: vec![20],
            columns: 1,
            fill: Fill::Stretch,
            anchor: Anchor::Center,
        };
        let pad = Padding::default();
        assert_eq!(metrics.content_size(pad), (50, 20));
        assert_eq!(metrics.origin_in(100, 60, pad), (25, 20));
    }

    #[test]
    fn unstretched_fill_centers_in_span() {
        let metrics = GridMetrics {
            column_width: 60,
            row_heights: vec![20],
            columns: 3,
            fill: Fill::None,
            anchor: Anchor::TopLeft,
        };
        let table = vec![vec![Cell::Widget(Id::A), Cell::Merge, Cell::Merge]];
        let placements = place(&table, Padding::default()).unwrap();
        let rect = metrics.resolve(&placements[0], (0, 0));
        assert_eq!(rect.w, 60);
        assert_eq!(rect.x, 60); // centered in the 180px span
    }
}
