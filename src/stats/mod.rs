use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::query::bbs::BbsStats;

/// 批量查询的时间汇总（交给结果输出方展示，core 不负责格式化落盘）
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BatchTiming {
    pub queries: usize,
    #[serde(with = "duration_secs")]
    pub total: Duration,
    #[serde(with = "duration_secs")]
    pub average_per_query: Duration,
}

impl BatchTiming {
    /// 空批次平均值为 0
    pub fn new(total: Duration, queries: usize) -> Self {
        let average_per_query = if queries == 0 {
            Duration::ZERO
        } else {
            total / u32::try_from(queries).unwrap_or(u32::MAX)
        };
        Self {
            queries,
            total,
            average_per_query,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkylineMethod {
    Bbs,
    DivideConquer,
    SequentialScan,
}

impl fmt::Display for SkylineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkylineMethod::Bbs => "BBS",
            SkylineMethod::DivideConquer => "BBS divide-and-conquer",
            SkylineMethod::SequentialScan => "sequential scan",
        };
        f.write_str(s)
    }
}

/// 一次 skyline 运行的汇总
#[derive(Clone, Debug, Serialize)]
pub struct SkylineReport {
    pub method: SkylineMethod,
    pub input_len: usize,
    pub points: Vec<crate::core::Point>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    pub passes: Vec<BbsStats>,
}

fn human_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 1.0 {
        format!("{:.3} s", secs)
    } else if secs >= 1e-3 {
        format!("{:.3} ms", secs * 1e3)
    } else {
        format!("{:.1} µs", secs * 1e6)
    }
}

impl fmt::Display for BatchTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queries in {} (avg {}/query)",
            self.queries,
            human_duration(self.total),
            human_duration(self.average_per_query)
        )
    }
}

impl fmt::Display for SkylineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║ Skyline ({:<40}) ║", self.method.to_string())?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        writeln!(f, "║   input points: {:>10}                       ║", self.input_len)?;
        writeln!(f, "║   skyline:      {:>10}                       ║", self.points.len())?;
        writeln!(
            f,
            "║   elapsed:      {:>10}                       ║",
            human_duration(self.elapsed)
        )?;
        for (i, pass) in self.passes.iter().enumerate() {
            writeln!(f, "╠──────────────────────────────────────────────────╣")?;
            writeln!(f, "║ BBS pass {}:                                      ║", i)?;
            writeln!(f, "║   popped:       {:>10}                       ║", pass.popped)?;
            writeln!(f, "║   expanded:     {:>10}                       ║", pass.expanded)?;
            writeln!(f, "║   pruned:       {:>10}                       ║", pass.pruned)?;
        }
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}

/// Duration 以浮点秒序列化
mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
