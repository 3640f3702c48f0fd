//! Daily performance report
//!
//! Consumes the hourly aggregate rows and renders them as an SVG chart: a
//! line for average plan-latency per hour and translucent bars for the
//! maximum rows examined (scaled down by 100). Data movement only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::metrics::HourlyBucket;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 480;
const MARGIN: u32 = 48;
const HOURS: u32 = 24;

/// Writes one report artifact per calendar day
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render and write the report for `date`, returning the artifact path
    pub fn write(&self, date: NaiveDate, buckets: &[HourlyBucket]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(format!("query-performance-{date}.svg"));
        fs::write(&path, render_svg(buckets))?;
        Ok(path)
    }
}

/// Render hourly aggregates as a standalone SVG document
pub fn render_svg(buckets: &[HourlyBucket]) -> String {
    let plot_w = WIDTH - 2 * MARGIN;
    let plot_h = HEIGHT - 2 * MARGIN;

    let max_time = buckets
        .iter()
        .map(|b| b.avg_exec_time)
        .fold(0.0_f64, f64::max)
        .max(1e-9);
    let max_rows = buckets
        .iter()
        .map(|b| b.max_rows_examined as f64 / 100.0)
        .fold(0.0_f64, f64::max)
        .max(1e-9);

    let x_for = |hour: u32| MARGIN as f64 + plot_w as f64 * (hour as f64 + 0.5) / HOURS as f64;
    let baseline = (MARGIN + plot_h) as f64;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    ));
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
    svg.push_str(&format!(
        r#"<text x="{}" y="24" text-anchor="middle" font-size="16">Query performance report</text>"#,
        WIDTH / 2
    ));

    // Bars: max rows examined per hour, scaled down by 100
    for bucket in buckets {
        let value = bucket.max_rows_examined as f64 / 100.0;
        let bar_h = plot_h as f64 * value / max_rows;
        let bar_w = plot_w as f64 / HOURS as f64 * 0.6;
        svg.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="steelblue" fill-opacity="0.3"/>"#,
            x_for(bucket.hour) - bar_w / 2.0,
            baseline - bar_h,
            bar_w,
            bar_h,
        ));
    }

    // Line: average plan-latency per hour
    if !buckets.is_empty() {
        let points: Vec<String> = buckets
            .iter()
            .map(|b| {
                let y = baseline - plot_h as f64 * b.avg_exec_time / max_time;
                format!("{:.1},{:.1}", x_for(b.hour), y)
            })
            .collect();
        svg.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="crimson" stroke-width="2"/>"#,
            points.join(" ")
        ));
    }

    // Hour axis
    let axis_end = MARGIN + plot_w;
    svg.push_str(&format!(
        r#"<line x1="{MARGIN}" y1="{baseline}" x2="{axis_end}" y2="{baseline}" stroke="black"/>"#
    ));
    for hour in 0..HOURS {
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{}" text-anchor="middle" font-size="10">{}</text>"#,
            x_for(hour),
            baseline as u32 + 16,
            hour,
        ));
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(hour: u32, avg_exec_time: f64, max_rows_examined: u64) -> HourlyBucket {
        HourlyBucket {
            hour,
            avg_exec_time,
            max_rows_examined,
        }
    }

    #[test]
    fn test_render_contains_line_and_bars() {
        let svg = render_svg(&[bucket(1, 0.2, 100), bucket(3, 0.2, 70)]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<polyline"));
        assert_eq!(svg.matches("fill-opacity").count(), 2);
    }

    #[test]
    fn test_render_empty_buckets_is_still_a_document() {
        let svg = render_svg(&[]);
        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_write_creates_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ReportGenerator::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        let path = reporter.write(date, &[bucket(0, 0.1, 10)]).unwrap();

        assert!(path.ends_with("query-performance-2026-08-06.svg"));
        assert!(fs::read_to_string(&path).unwrap().contains("</svg>"));
    }
}
