//! SVG scatter chart with the fitted line, rendered with Plotters.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::FitResult;
use crate::error::AppError;
use crate::plot::ascii::{pad_range, sample_line, x_range, y_range};
use crate::report::{FittedRow, format_equation};

/// Write a scatter of observed points plus the fitted line to `path`.
pub fn write_svg_chart(path: &Path, rows: &[FittedRow], fit: &FitResult, size: (u32, u32)) -> Result<(), AppError> {
    let (x_min, x_max) = x_range(rows).unwrap_or((0.0, 1.0));
    let line = sample_line(fit, x_min, x_max, 200);

    let (y_min, y_max) = y_range(rows, &line).unwrap_or((0.0, 1.0));
    let (x0, x1) = pad_range(x_min, x_max, 0.03);
    let (y0, y1) = pad_range(y_min, y_max, 0.05);

    let root = SVGBackend::new(path, size).into_drawing_area();
    draw(&root, rows, &line, fit, [x0, x1], [y0, y1]).map_err(|e| AppError::Plot(e.to_string()))?;
    root.present()
        .map_err(|e| AppError::Plot(format!("failed to write '{}': {e}", path.display())))?;
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    rows: &[FittedRow],
    line: &[(f64, f64)],
    fit: &FitResult,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(format!("{} vs. {}", fit.response, fit.predictor), ("sans-serif", 22))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_bounds[0]..x_bounds[1], y_bounds[0]..y_bounds[1])?;

    chart
        .configure_mesh()
        .x_desc(fit.predictor.as_str())
        .y_desc(fit.response.as_str())
        .light_line_style(RGBColor(235, 235, 235).stroke_width(1))
        .draw()?;

    let observed = RGBColor(70, 130, 180); // steel blue
    let fitted = RGBColor(255, 140, 0); // dark orange

    chart
        .draw_series(rows.iter().map(|r| Circle::new((r.x, r.y), 3, observed.mix(0.7).filled())))?
        .label("Observed")
        .legend(move |(x, y)| Circle::new((x + 10, y), 3, observed.filled()));

    chart
        .draw_series(LineSeries::new(line.iter().copied(), fitted.stroke_width(2)))?
        .label(format!("Fit: {}", format_equation(fit)))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fitted.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn writes_svg_document() {
        let rows: Vec<FittedRow> = (0..5)
            .map(|i| {
                let x = i as f64;
                FittedRow {
                    date: NaiveDate::from_ymd_opt(2024, 1 + i as u32, 1).unwrap(),
                    x,
                    y: 2.0 + 3.0 * x,
                    y_fit: 2.0 + 3.0 * x,
                    residual: 0.0,
                }
            })
            .collect();
        let fit = FitResult {
            predictor: "CPIAUCSL".into(),
            response: "UNRATE".into(),
            intercept: 2.0,
            slope: 3.0,
            n: 5,
            r_squared: 1.0,
        };

        let path = std::env::temp_dir().join(format!("fred_phillips_chart_{}.svg", std::process::id()));
        write_svg_chart(&path, &rows, &fit, (640, 480)).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("UNRATE vs. CPIAUCSL"));
        let _ = std::fs::remove_file(&path);
    }
}
