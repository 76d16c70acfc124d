//! 支配关系（skyline 的基础谓词）
//!
//! 默认约定：x 是"成本"（越小越好），y 是"面积"（越大越好）。
//! `a` 支配 `b` 当且仅当 `a.x <= b.x && a.y >= b.y`，并且至少一维严格更优；
//! 严格性保证完全重复的两个点互不支配，都进入 skyline。

use serde::{Deserialize, Serialize};

use crate::core::point::{BoundingBox, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// 把坐标映射成"越小越好"的分数。
    ///
    /// 结果加 0.0 把 -0.0 归一成 0.0：堆排序用 total_cmp，两者必须相等。
    #[inline]
    pub fn score(self, v: f64) -> f64 {
        match self {
            Direction::Minimize => v + 0.0,
            Direction::Maximize => -v + 0.0,
        }
    }

    /// 区间 [lo, hi] 内最乐观的取值
    #[inline]
    pub fn best_of(self, lo: f64, hi: f64) -> f64 {
        match self {
            Direction::Minimize => lo,
            Direction::Maximize => hi,
        }
    }
}

/// 每个轴的优化方向
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DominanceRule {
    pub x: Direction,
    pub y: Direction,
}

impl Default for DominanceRule {
    /// 最小化 x（成本），最大化 y（面积）
    fn default() -> Self {
        Self {
            x: Direction::Minimize,
            y: Direction::Maximize,
        }
    }
}

impl DominanceRule {
    pub fn new(x: Direction, y: Direction) -> Self {
        Self { x, y }
    }

    /// 坐标在本规则下的分数（两维都是越小越好）
    #[inline]
    pub fn scores(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.score(x), self.y.score(y))
    }

    /// (ax, ay) 是否支配 (bx, by)：每一维都不差，且至少一维严格更好
    #[inline]
    pub fn dominates_coords(&self, ax: f64, ay: f64, bx: f64, by: f64) -> bool {
        let (sax, say) = self.scores(ax, ay);
        let (sbx, sby) = self.scores(bx, by);
        sax <= sbx && say <= sby && (sax < sbx || say < sby)
    }

    pub fn dominates(&self, a: &Point, b: &Point) -> bool {
        self.dominates_coords(a.x, a.y, b.x, b.y)
    }

    /// 包围盒的"最优角"：盒内任何点都被它弱支配
    pub fn best_corner(&self, bbox: &BoundingBox) -> (f64, f64) {
        (
            self.x.best_of(bbox.xlo, bbox.xhi),
            self.y.best_of(bbox.ylo, bbox.yhi),
        )
    }

    /// 盒子能否整体剪掉：某个已接受成员支配其最优角
    pub fn box_dominated_by(&self, bbox: &BoundingBox, skyline: &[Point]) -> bool {
        let (cx, cy) = self.best_corner(bbox);
        skyline.iter().any(|s| self.dominates_coords(s.x, s.y, cx, cy))
    }

    pub fn is_skyline_member(&self, candidate: &Point, current: &[Point]) -> bool {
        !current.iter().any(|s| self.dominates(s, candidate))
    }
}

/// 默认规则下 `a` 是否支配 `b`（`a.x <= b.x && a.y >= b.y`，至少一维严格）
pub fn dominates(a: &Point, b: &Point) -> bool {
    DominanceRule::default().dominates(a, b)
}

/// 只要 `current` 中有任一成员支配 `candidate` 即返回 false（短路）
pub fn is_skyline_member(candidate: &Point, current: &[Point]) -> bool {
    DominanceRule::default().is_skyline_member(candidate, current)
}
