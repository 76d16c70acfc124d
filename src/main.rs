use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use skyquery::config::EngineConfig;
use skyquery::core::{AdaptiveScheduler, Axis, Point};
use skyquery::index::RTree;
use skyquery::query::{
    count_within_scan, nn_oracle, partitioned_indexes, skyline_oracle_with, BatchReport, BbsEngine,
    PartitionedSkyline, QueryAnswer, QueryDispatcher, SkylineSet,
};
use skyquery::stats::{SkylineMethod, SkylineReport};
use skyquery::storage::{self, LoadReport};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skyquery", version, about = "Skyline and nearest-neighbor queries over an R-tree")]
struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 批量查询线程数（默认按系统负载自适应）
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// 只读取前 N 行数据
    #[arg(long, global = true)]
    max_rows: Option<usize>,

    /// 结果输出文件（默认 stdout）
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// 以 JSON 输出
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 计算 skyline（最小化 x、最大化 y，可在配置中修改）
    Skyline {
        #[arg(long)]
        data: PathBuf,
        #[arg(long, value_enum, default_value = "bbs")]
        method: SkylineAlgo,
        /// 分治切分轴（覆盖配置）
        #[arg(long)]
        axis: Option<Axis>,
    },
    /// 批量最近邻
    Nearest {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        queries: PathBuf,
        #[arg(long, value_enum, default_value = "bf")]
        method: NearestAlgo,
        #[arg(long)]
        axis: Option<Axis>,
    },
    /// 批量半径计数
    Count {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        queries: PathBuf,
        #[arg(long)]
        radius: Option<f64>,
        #[arg(long, value_enum, default_value = "rtree")]
        method: CountAlgo,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SkylineAlgo {
    Bbs,
    Dc,
    Scan,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NearestAlgo {
    Bf,
    Dc,
    Scan,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CountAlgo {
    Rtree,
    Scan,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = EngineConfig::load_or_default(cli.config.as_deref()).context("loading config")?;
    if cli.workers.is_some() {
        cfg.workers = cli.workers;
    }
    if cli.max_rows.is_some() {
        cfg.max_rows = cli.max_rows;
    }

    let out: Box<dyn Write> = match &cli.output {
        Some(p) => Box::new(BufWriter::new(
            std::fs::File::create(p).with_context(|| format!("creating {}", p.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };

    match cli.command {
        Command::Skyline { data, method, axis } => {
            if let Some(a) = axis {
                cfg.partition_axis = a;
            }
            let points = load_dataset(&data, &cfg)?;
            let report = run_skyline(points, method, &cfg)?;
            info!("\n{}", report);
            if cli.json {
                storage::write_json(out, &report)?;
            } else {
                storage::write_skyline(out, &report)?;
            }
        }
        Command::Nearest {
            data,
            queries,
            method,
            axis,
        } => {
            if let Some(a) = axis {
                cfg.partition_axis = a;
            }
            let points = load_dataset(&data, &cfg)?;
            let queries = storage::load_queries_file(&queries, cfg.max_rows)
                .with_context(|| format!("loading queries {}", queries.display()))?;
            let dispatcher = QueryDispatcher::with_workers(cfg.workers);

            let report = match method {
                NearestAlgo::Bf => {
                    let tree = RTree::with_capacity(points, cfg.node_capacity)?;
                    dispatcher.nearest(&tree, &queries)
                }
                NearestAlgo::Dc => {
                    let cap = cfg.node_capacity;
                    let indexes =
                        partitioned_indexes(points, cfg.partition_axis, |p| RTree::with_capacity(p, cap))?;
                    dispatcher.nearest_multi(&indexes, &queries)
                }
                NearestAlgo::Scan => dispatcher.dispatch(&queries, |q| {
                    nn_oracle(&points, q.x, q.y).map(QueryAnswer::Nearest)
                }),
            };
            emit_batch(out, &report, cli.json)?;
        }
        Command::Count {
            data,
            queries,
            radius,
            method,
        } => {
            let radius = radius.unwrap_or(cfg.radius);
            let points = load_dataset(&data, &cfg)?;
            let queries = storage::load_queries_file(&queries, cfg.max_rows)
                .with_context(|| format!("loading queries {}", queries.display()))?;
            let dispatcher = QueryDispatcher::with_workers(cfg.workers);

            let report = match method {
                CountAlgo::Rtree => {
                    let tree = RTree::with_capacity(points, cfg.node_capacity)?;
                    dispatcher.count_within(&tree, &queries, radius)
                }
                CountAlgo::Scan => dispatcher.dispatch(&queries, |q| {
                    count_within_scan(&points, q.x, q.y, radius).map(|count| QueryAnswer::Count { count })
                }),
            };
            emit_batch(out, &report, cli.json)?;
        }
    }

    Ok(())
}

fn load_dataset(path: &Path, cfg: &EngineConfig) -> anyhow::Result<Vec<Point>> {
    let LoadReport { points, rejected } = storage::load_points_file(path, cfg.max_rows)
        .with_context(|| format!("loading dataset {}", path.display()))?;
    if !rejected.is_empty() {
        tracing::warn!(
            "{}: {} row(s) rejected for invalid geometry",
            path.display(),
            rejected.len()
        );
    }
    info!("Loaded {} points from {}", points.len(), path.display());
    Ok(points)
}

fn run_skyline(
    points: Vec<Point>,
    method: SkylineAlgo,
    cfg: &EngineConfig,
) -> anyhow::Result<SkylineReport> {
    let input_len = points.len();
    let started = Instant::now();

    let (set, method, passes): (SkylineSet, _, _) = match method {
        SkylineAlgo::Bbs => {
            let tree = RTree::with_capacity(points, cfg.node_capacity)?;
            let mut set = SkylineSet::new();
            let stats = BbsEngine::new(cfg.rule).run(&tree, &mut set);
            (set, SkylineMethod::Bbs, vec![stats])
        }
        SkylineAlgo::Dc => {
            let scheduler = match cfg.workers {
                Some(n) => AdaptiveScheduler::fixed(n),
                None => AdaptiveScheduler::new(),
            };
            let cap = cfg.node_capacity;
            let (set, stats) = PartitionedSkyline::new(cfg.partition_axis, cfg.rule, &scheduler)
                .run_with(points, |p| RTree::with_capacity(p, cap))?;
            (set, SkylineMethod::DivideConquer, vec![stats.left, stats.right])
        }
        SkylineAlgo::Scan => (
            skyline_oracle_with(&cfg.rule, &points),
            SkylineMethod::SequentialScan,
            Vec::new(),
        ),
    };

    Ok(SkylineReport {
        method,
        input_len,
        points: set.into_vec(),
        elapsed: started.elapsed(),
        passes,
    })
}

fn emit_batch(out: Box<dyn Write>, report: &BatchReport, json: bool) -> anyhow::Result<()> {
    info!("{}", report.timing);
    if json {
        storage::write_json(out, report)?;
    } else {
        storage::write_batch(out, report)?;
    }
    Ok(())
}
