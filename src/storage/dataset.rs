use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::core::{Point, QueryPoint};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    pub points: Vec<Point>,
    /// 坐标非有限值被丢弃的行（行号从 1 开始）
    pub rejected: Vec<usize>,
}

/// 读取 `id x y` 格式的文本数据集（空白分隔，一行一个点）。
///
/// - 空行跳过；多余的列忽略
/// - 格式错误直接报错（带行号）
/// - 坐标为 NaN / inf 的行只丢弃该点，不中断加载
/// - `max_rows` 限制读取的数据行数
pub fn load_points<R: BufRead>(reader: R, max_rows: Option<usize>) -> Result<LoadReport, DatasetError> {
    let mut report = LoadReport::default();
    let limit = max_rows.unwrap_or(usize::MAX);
    let mut rows = 0usize;

    for (i, line) in reader.lines().enumerate() {
        if rows >= limit {
            break;
        }
        let line = line?;
        let lineno = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        rows += 1;

        let point = parse_row(trimmed, lineno)?;
        if let Err(e) = point.validate() {
            tracing::warn!("Skipping line {}: {}", lineno, e);
            report.rejected.push(lineno);
            continue;
        }
        report.points.push(point);
    }

    tracing::debug!(
        "Loaded {} points ({} rejected)",
        report.points.len(),
        report.rejected.len()
    );
    Ok(report)
}

pub fn load_points_file(path: &Path, max_rows: Option<usize>) -> Result<LoadReport, DatasetError> {
    let file = File::open(path)?;
    load_points(BufReader::new(file), max_rows)
}

/// 查询点文件与数据集同格式
pub fn load_queries_file(path: &Path, max_rows: Option<usize>) -> Result<Vec<QueryPoint>, DatasetError> {
    let report = load_points_file(path, max_rows)?;
    Ok(report.points.into_iter().map(QueryPoint::from).collect())
}

fn parse_row(line: &str, lineno: usize) -> Result<Point, DatasetError> {
    let mut parts = line.split_whitespace();
    let mut field = |name: &str| {
        parts.next().ok_or_else(|| DatasetError::Parse {
            line: lineno,
            reason: format!("missing {}", name),
        })
    };
    let id_s = field("id")?;
    let x_s = field("x")?;
    let y_s = field("y")?;

    let id = id_s.parse::<u64>().map_err(|e| DatasetError::Parse {
        line: lineno,
        reason: format!("bad id {:?}: {}", id_s, e),
    })?;
    let coord = |s: &str, name: &str| {
        s.parse::<f64>().map_err(|e| DatasetError::Parse {
            line: lineno,
            reason: format!("bad {} {:?}: {}", name, s, e),
        })
    };
    Ok(Point::new(id, coord(x_s, "x")?, coord(y_s, "y")?))
}
