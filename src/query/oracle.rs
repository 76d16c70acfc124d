//! 顺序扫描基准：O(n²) skyline、O(n) 最近邻 / 半径计数。
//!
//! 只用作正确性对照，不追求性能。

use crate::core::{cmp_f64, DominanceRule, Point, QueryError};
use crate::index::Neighbor;
use crate::query::nn::check_query;
use crate::query::range::check_count_args;
use crate::query::set::SkylineSet;

pub fn skyline_oracle(points: &[Point]) -> SkylineSet {
    skyline_oracle_with(&DominanceRule::default(), points)
}

/// 每个点与其余所有点比较；按下标区分"其余"，重复点互不支配
pub fn skyline_oracle_with(rule: &DominanceRule, points: &[Point]) -> SkylineSet {
    let mut set = SkylineSet::new();
    for (i, p) in points.iter().enumerate() {
        let dominated = points
            .iter()
            .enumerate()
            .any(|(j, q)| i != j && rule.dominates(q, p));
        if !dominated {
            // 未被任何点支配，也不会被集合成员支配
            set.admit(rule, *p);
        }
    }
    set
}

/// 全量扫描最近点；同距离取 id 最小
pub fn nn_oracle(points: &[Point], qx: f64, qy: f64) -> Result<Neighbor, QueryError> {
    check_query(qx, qy)?;
    points
        .iter()
        .min_by(|a, b| {
            cmp_f64(a.distance_sq(qx, qy), b.distance_sq(qx, qy)).then(a.id.cmp(&b.id))
        })
        .map(|p| Neighbor::new(*p, qx, qy))
        .ok_or(QueryError::EmptyIndex)
}

pub fn count_within_oracle(points: &[Point], qx: f64, qy: f64, radius: f64) -> usize {
    let r2 = radius * radius;
    points.iter().filter(|p| p.distance_sq(qx, qy) <= r2).count()
}

/// 带参数校验的扫描计数（与 `count_within` 报同样的错误），供批量分发使用
pub fn count_within_scan(
    points: &[Point],
    qx: f64,
    qy: f64,
    radius: f64,
) -> Result<usize, QueryError> {
    check_count_args(qx, qy, radius)?;
    Ok(count_within_oracle(points, qx, qy, radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_keeps_duplicates_and_drops_dominated() {
        let pts = vec![
            Point::new(1, 1.0, 5.0),
            Point::new(2, 1.0, 5.0),
            Point::new(3, 2.0, 4.0),
            Point::new(4, 0.5, 1.0),
        ];
        assert_eq!(skyline_oracle(&pts).sorted_ids(), vec![1, 2, 4]);
    }

    #[test]
    fn nn_oracle_scenario() {
        let pts = vec![
            Point::new(1, 0.0, 0.0),
            Point::new(2, 10.0, 10.0),
            Point::new(3, 1.0, 1.0),
        ];
        let n = nn_oracle(&pts, 9.0, 9.0).unwrap();
        assert_eq!(n.point.id, 2);
        assert_eq!(n.distance, 2f64.sqrt());
        assert_eq!(nn_oracle(&[], 0.0, 0.0), Err(QueryError::EmptyIndex));
    }

    #[test]
    fn count_oracle_includes_boundary() {
        let pts = vec![Point::new(1, 3.0, 4.0), Point::new(2, 3.0, 4.1)];
        assert_eq!(count_within_oracle(&pts, 0.0, 0.0, 5.0), 1);
    }

    #[test]
    fn scan_count_validates_like_the_indexed_count() {
        let pts = vec![Point::new(1, 3.0, 4.0), Point::new(2, 3.0, 4.1)];
        assert_eq!(count_within_scan(&pts, 0.0, 0.0, 5.0), Ok(1));
        assert_eq!(
            count_within_scan(&pts, 0.0, 0.0, -2.0),
            Err(QueryError::InvalidRadius(-2.0))
        );
        assert_eq!(
            count_within_scan(&pts, f64::NAN, 0.0, 5.0),
            Err(QueryError::NonFiniteQuery)
        );
        assert_eq!(nn_oracle(&pts, 0.0, f64::NAN), Err(QueryError::NonFiniteQuery));
    }
}
