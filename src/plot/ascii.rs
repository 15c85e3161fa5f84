//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed power: `o`
//! - predicted power: `-` line

use crate::io::ForecastGrid;

/// Render the holdout forecast: observed points over the prediction line.
///
/// The x axis is the observation index (the holdout is evenly sampled), the
/// y axis spans both series with a small pad.
pub fn render_forecast_plot(grid: &ForecastGrid, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let n = grid.observed.len().min(grid.predicted.len());
    if n == 0 {
        return "Plot: empty holdout window\n".to_string();
    }

    let (y_min, y_max) = y_range(&grid.observed[..n], &grid.predicted[..n]).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut cells = vec![vec![' '; width]; height];

    // Draw the prediction line first (so observed points can overlay).
    let mut prev: Option<(usize, usize)> = None;
    for (i, &p) in grid.predicted[..n].iter().enumerate() {
        let x = map_x(i, n, width);
        let y = map_y(p, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut cells, x0, y0, x, y, '-');
        } else {
            cells[y][x] = '-';
        }
        prev = Some((x, y));
    }

    for (i, &o) in grid.observed[..n].iter().enumerate() {
        let x = map_x(i, n, width);
        let y = map_y(o, y_min, y_max, height);
        cells[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: holdout n={n} | power=[{y_min:.1}, {y_max:.1}] kW\n"
    ));
    for row in cells {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(observed: &[f64], predicted: &[f64]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &v in observed.iter().chain(predicted.iter()) {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series still plots, centered.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(cells: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < cells.len()
            && x0 >= 0
            && (x0 as usize) < cells[0].len()
            && cells[y0 as usize][x0 as usize] == ' '
        {
            cells[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
