use std::io::Write;

use crate::query::{BatchReport, QueryAnswer};
use crate::stats::SkylineReport;

/// 文本格式：首行处理时间，随后每行 `id x y`
pub fn write_skyline<W: Write>(mut w: W, report: &SkylineReport) -> std::io::Result<()> {
    writeln!(
        w,
        "Query processing time: {:.6} seconds",
        report.elapsed.as_secs_f64()
    )?;
    for p in &report.points {
        writeln!(w, "{} {} {}", p.id, p.x, p.y)?;
    }
    w.flush()
}

/// 文本格式：每条查询一行，最后是总时间与平均时间
pub fn write_batch<W: Write>(mut w: W, report: &BatchReport) -> std::io::Result<()> {
    for r in &report.results {
        match &r.outcome {
            Ok(QueryAnswer::Nearest(n)) => writeln!(
                w,
                "Query ID {}: Nearest Point ID {} at ({:.2}, {:.2}) Distance: {:.2}",
                r.query_id, n.point.id, n.point.x, n.point.y, n.distance
            )?,
            Ok(QueryAnswer::Count { count }) => {
                writeln!(w, "Query ID {}: {} points found", r.query_id, count)?
            }
            Err(e) => writeln!(w, "Query ID {}: error: {}", r.query_id, e)?,
        }
    }
    writeln!(w)?;
    writeln!(
        w,
        "Total processing time: {:.4} seconds",
        report.timing.total.as_secs_f64()
    )?;
    writeln!(
        w,
        "Average time per query: {:.4} seconds",
        report.timing.average_per_query.as_secs_f64()
    )?;
    w.flush()
}

pub fn write_json<W: Write, T: serde::Serialize>(mut w: W, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut w, value)?;
    writeln!(w)?;
    w.flush()
}
