use std::sync::atomic::{AtomicUsize, Ordering};
use sysinfo::System;

/// 小批量查询直接串行，避免线程池调度开销
const SERIAL_BATCH_THRESHOLD: usize = 8;

/// 自适应调度器：根据系统负载决定批量查询线程池的大小
pub struct AdaptiveScheduler {
    target_parallelism: AtomicUsize,
    system: System,
}

impl Default for AdaptiveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveScheduler {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        Self {
            target_parallelism: AtomicUsize::new(num_cpus::get().max(1)),
            system: sys,
        }
    }

    /// 固定并行度（配置或命令行显式给出 workers 时）
    pub fn fixed(workers: usize) -> Self {
        Self {
            target_parallelism: AtomicUsize::new(workers.max(1)),
            system: System::new(),
        }
    }

    pub fn parallelism(&self) -> usize {
        self.target_parallelism.load(Ordering::Relaxed)
    }

    /// 动态调整并行度
    pub fn adjust_parallelism(&mut self) -> usize {
        self.system.refresh_memory();

        let load = System::load_average().one;
        let cpu_count = num_cpus::get().max(1) as f64;
        let mem_free = self.system.available_memory();
        let total_mem = self.system.total_memory();
        let mem_pressure = if total_mem == 0 {
            0.0
        } else {
            1.0 - (mem_free as f64 / total_mem as f64)
        };

        // 查询是纯 CPU 计算，空闲时也不超过核心数
        let new_parallelism = if load > cpu_count * 0.8 || mem_pressure > 0.8 {
            (cpu_count * 0.5) as usize
        } else {
            cpu_count as usize
        }
        .max(1);

        let old = self.target_parallelism.swap(new_parallelism, Ordering::Relaxed);

        if old != new_parallelism {
            tracing::info!(
                "Adaptive parallelism: {} -> {} (load: {:.2}, mem_pressure: {:.2})",
                old,
                new_parallelism,
                load,
                mem_pressure
            );
        }

        new_parallelism
    }

    /// 根据任务特性选择执行策略
    pub fn select_strategy(&self, task: &Task) -> ExecutionStrategy {
        let workers = self.parallelism();
        match task {
            Task::QueryBatch { queries } if *queries < SERIAL_BATCH_THRESHOLD || workers == 1 => {
                ExecutionStrategy::Serial
            }
            Task::QueryBatch { queries } => ExecutionStrategy::Parallel {
                workers: workers.min(*queries),
            },
            // 两个分区互不相交，最多两个并行任务
            Task::PartitionedSkyline { partitions } if *partitions < 2 || workers == 1 => {
                ExecutionStrategy::Serial
            }
            Task::PartitionedSkyline { partitions } => ExecutionStrategy::Parallel {
                workers: workers.min(*partitions),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    QueryBatch { queries: usize },
    PartitionedSkyline { partitions: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Serial,
    Parallel { workers: usize },
}
