mod support;

use skyquery::core::{Axis, Direction, DominanceRule, Point};
use skyquery::index::{FlatIndex, RTree, SpatialIndex};
use skyquery::query::{
    bbs_skyline, merge, partition, skyline_oracle, skyline_oracle_with, BbsEngine,
    PartitionedSkyline,
};
use support::points::{anti_correlated_points, grid_points, uniform_points};

const SEEDS: std::ops::Range<u64> = 0..24;

fn all_rules() -> Vec<DominanceRule> {
    let dirs = [Direction::Minimize, Direction::Maximize];
    dirs.iter()
        .flat_map(|&x| dirs.iter().map(move |&y| DominanceRule::new(x, y)))
        .collect()
}

fn datasets(seed: u64) -> Vec<Vec<Point>> {
    vec![
        uniform_points(300, 100.0, seed),
        grid_points(200, 6, seed),
        anti_correlated_points(150, seed),
    ]
}

fn assert_is_skyline(rule: &DominanceRule, input: &[Point], result: &[Point]) {
    for a in result {
        for b in result {
            assert!(!rule.dominates(a, b), "{:?} dominates {:?} inside result", a, b);
        }
    }
    for p in input {
        let member = result.iter().any(|r| r.id == p.id);
        let dominated = result.iter().any(|r| rule.dominates(r, p));
        assert!(member ^ dominated, "{:?}: member={} dominated={}", p, member, dominated);
    }
}

#[test]
fn bbs_on_rtree_matches_scan() {
    for seed in SEEDS {
        for pts in datasets(seed) {
            for cap in [2, 3, 16] {
                let tree = RTree::with_capacity(pts.clone(), cap).unwrap();
                let sky = bbs_skyline(&tree);
                assert_eq!(sky.sorted_ids(), skyline_oracle(&pts).sorted_ids(), "seed {} cap {}", seed, cap);
                assert_is_skyline(&DominanceRule::default(), &pts, sky.as_slice());
            }
        }
    }
}

#[test]
fn bbs_on_flat_index_matches_scan() {
    for seed in SEEDS {
        for pts in datasets(seed) {
            let flat = FlatIndex::build(pts.clone()).unwrap();
            assert_eq!(bbs_skyline(&flat).sorted_ids(), skyline_oracle(&pts).sorted_ids());
        }
    }
}

#[test]
fn every_direction_combination_is_exact() {
    for seed in 0..8 {
        for pts in datasets(seed) {
            let tree = RTree::with_capacity(pts.clone(), 4).unwrap();
            for rule in all_rules() {
                let sky = BbsEngine::new(rule).skyline(&tree);
                assert_eq!(
                    sky.sorted_ids(),
                    skyline_oracle_with(&rule, &pts).sorted_ids(),
                    "seed {} rule {:?}",
                    seed,
                    rule
                );
                assert_is_skyline(&rule, &pts, sky.as_slice());
            }
        }
    }
}

#[test]
fn divide_and_conquer_matches_scan_on_both_axes() {
    for seed in SEEDS {
        for pts in datasets(seed) {
            for axis in [Axis::X, Axis::Y] {
                let (sky, stats) = PartitionedSkyline::serial(axis, DominanceRule::default())
                    .run_with(pts.clone(), |p| RTree::with_capacity(p, 4))
                    .unwrap();
                assert_eq!(stats.left_len + stats.right_len, pts.len());
                assert_eq!(
                    sky.sorted_ids(),
                    skyline_oracle(&pts).sorted_ids(),
                    "seed {} axis {:?}",
                    seed,
                    axis
                );
            }
        }
    }
}

#[test]
fn manual_merge_of_partition_halves_is_exact() {
    let rule = DominanceRule::default();
    for seed in SEEDS {
        let pts = grid_points(120, 5, seed);
        for axis in [Axis::X, Axis::Y] {
            let (left, right) = partition(pts.clone(), axis).unwrap();
            let merged = merge(skyline_oracle(&left), skyline_oracle(&right), &rule);
            assert_eq!(merged.sorted_ids(), skyline_oracle(&pts).sorted_ids());
        }
    }
}

#[test]
fn skyline_of_a_skyline_is_unchanged() {
    for seed in SEEDS {
        let pts = uniform_points(400, 50.0, seed);
        let once = bbs_skyline(&RTree::build(pts).unwrap());
        let twice = bbs_skyline(&RTree::build(once.as_slice().to_vec()).unwrap());
        assert_eq!(once.sorted_ids(), twice.sorted_ids());
    }
}

#[test]
fn duplicates_survive_together() {
    let mut pts = uniform_points(50, 10.0, 7);
    // 插入一个支配所有点的点及其重复
    pts.push(Point::new(1000, -1.0, 20.0));
    pts.push(Point::new(1001, -1.0, 20.0));
    let tree = RTree::with_capacity(pts.clone(), 2).unwrap();
    assert_eq!(bbs_skyline(&tree).sorted_ids(), vec![1000, 1001]);
    assert_eq!(skyline_oracle(&pts).sorted_ids(), vec![1000, 1001]);
}

#[test]
fn four_point_scenario() {
    let pts = vec![
        Point::new(1, 1.0, 5.0),
        Point::new(2, 2.0, 4.0),
        Point::new(3, 3.0, 3.0),
        Point::new(4, 0.5, 0.5),
    ];
    let tree = RTree::with_capacity(pts.clone(), 2).unwrap();
    // 4 的 x 比 1 小，y 却更差，两者互不支配
    assert_eq!(bbs_skyline(&tree).sorted_ids(), vec![1, 4]);
    assert_eq!(skyline_oracle(&pts).sorted_ids(), vec![1, 4]);
}

#[test]
fn empty_and_single_inputs() {
    let empty = RTree::build(Vec::new()).unwrap();
    assert!(bbs_skyline(&empty).is_empty());

    let one = RTree::build(vec![Point::new(9, 3.0, 3.0)]).unwrap();
    assert_eq!(bbs_skyline(&one).sorted_ids(), vec![9]);
    assert!(partition(vec![Point::new(9, 3.0, 3.0)], Axis::X).is_err());
}
