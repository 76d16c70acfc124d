use serde::Serialize;

use crate::core::{DominanceRule, Point};

/// Skyline 结果集：任意两个成员互不支配（反链）。
///
/// 由调用方持有并逐步增长；每次接纳判断都针对当前完整集合。
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SkylineSet {
    points: Vec<Point>,
}

impl SkylineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn into_vec(self) -> Vec<Point> {
        self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// 未被任何成员支配才加入；返回是否加入
    pub fn admit(&mut self, rule: &DominanceRule, p: Point) -> bool {
        if rule.is_skyline_member(&p, &self.points) {
            self.points.push(p);
            true
        } else {
            false
        }
    }

    /// 同 `admit`，但加入后剔除被新点支配的旧成员；返回被剔除的数量（未加入返回 None）
    pub fn admit_evicting(&mut self, rule: &DominanceRule, p: Point) -> Option<usize> {
        if !rule.is_skyline_member(&p, &self.points) {
            return None;
        }
        let before = self.points.len();
        self.points.retain(|s| !rule.dominates(&p, s));
        let evicted = before - self.points.len();
        self.points.push(p);
        Some(evicted)
    }

    /// 成员 id 升序（测试与输出用，集合本身无序）
    pub fn sorted_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.points.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }
}

impl From<SkylineSet> for Vec<Point> {
    fn from(set: SkylineSet) -> Self {
        set.points
    }
}

impl<'a> IntoIterator for &'a SkylineSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
