// Export layout: static font metrics for the standard PDF fonts, greedy line
// wrapping and a paginated column flow. Pure CPU work; the export handler runs it
// inside tokio::task::spawn_blocking.

pub mod flow;
pub mod font_metrics;

pub use flow::{Canvas, Column, DrawOp, Rgb, TextStyle};
pub use font_metrics::{get_metrics, FontPair, PageGeometry, PdfFont, SANS, SERIF};
