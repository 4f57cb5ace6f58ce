//! Chart output: a fixed-grid ASCII plot for the terminal and an SVG export.

pub mod ascii;
pub mod svg;

pub use ascii::render_ascii_plot;
pub use svg::write_svg_chart;
