//! Hand-off of an evaluated field to the outside world.
//!
//! `json` emits the grid axes and field for an external renderer (e.g. a 3-D
//! surface plot); `summary` prints a short human-readable report.

use colored::Colorize;
use serde::Serialize;
use valmap_core::{SpatialGrid, ValueField};

/// Renderer payload: `field[i][j]` is the value at `(xs[i], ys[j])`.
#[derive(Debug, Serialize)]
pub struct RenderPayload<'a> {
    pub xs: &'a [f64],
    pub ys: &'a [f64],
    pub field: Vec<Vec<f64>>,
}

impl<'a> RenderPayload<'a> {
    pub fn new(grid: &'a SpatialGrid, field: &ValueField) -> Self {
        Self {
            xs: grid.xs(),
            ys: grid.ys(),
            field: field.to_rows(),
        }
    }
}

pub fn to_json(grid: &SpatialGrid, field: &ValueField) -> serde_json::Result<String> {
    serde_json::to_string(&RenderPayload::new(grid, field))
}

pub fn print_summary(grid: &SpatialGrid, field: &ValueField, object_count: usize) {
    let (nx, ny) = field.shape();
    println!();
    println!("  {}", "Value field".bold().cyan());
    println!("    grid      {} × {}", nx, ny);
    println!("    objects   {}", object_count);

    match field.argmax() {
        Some((i, j, value)) => {
            let p = grid.sample(i, j);
            println!(
                "    peak      {} at ({:.3}, {:.3}) [cell {}, {}]",
                format!("{value:.6}").green().bold(),
                p.x,
                p.y,
                i,
                j
            );
        }
        None => println!("    peak      {}", "undefined (no finite cells)".yellow()),
    }

    let nan_cells = field.as_slice().iter().filter(|v| v.is_nan()).count();
    if nan_cells > 0 {
        println!(
            "    {}",
            format!("{nan_cells} cell(s) are NaN (non-finite inputs)").yellow()
        );
    }
    println!();
}
