#![allow(dead_code)]

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skyquery::core::{Point, QueryPoint};

/// 均匀分布在 `[0, extent)²` 内的随机点，id 从 1 开始连续编号
pub fn uniform_points(n: usize, extent: f64, seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let x = rng.gen_range(0.0..extent);
            let y = rng.gen_range(0.0..extent);
            Point::new(i as u64 + 1, x, y)
        })
        .collect()
}

/// 整数网格上的随机点：小网格上会大量出现同坐标与重复点
pub fn grid_points(n: usize, side: u32, seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let x = rng.gen_range(0..side) as f64;
            let y = rng.gen_range(0..side) as f64;
            Point::new(i as u64 + 1, x, y)
        })
        .collect()
}

/// 反相关分布（x 大的 y 也大），skyline 很大
pub fn anti_correlated_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let t: f64 = rng.gen_range(0.0..100.0);
            let jitter: f64 = rng.gen_range(-2.0..2.0);
            Point::new(i as u64 + 1, t, t + jitter)
        })
        .collect()
}

pub fn random_queries(n: usize, lo: f64, hi: f64, seed: u64) -> Vec<QueryPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| QueryPoint::new(i as u64 + 1, rng.gen_range(lo..hi), rng.gen_range(lo..hi)))
        .collect()
}

/// 网格坐标上的查询点：与数据点重合或等距的情况很多
pub fn grid_queries(n: usize, side: u32, seed: u64) -> Vec<QueryPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let x = rng.gen_range(0..side) as f64 + 0.5 * rng.gen_range(0..2) as f64;
            let y = rng.gen_range(0..side) as f64 + 0.5 * rng.gen_range(0..2) as f64;
            QueryPoint::new(i as u64 + 1, x, y)
        })
        .collect()
}
