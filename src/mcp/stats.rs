//! 工具调用性能统计

use log::info;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 单个工具的统计信息
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolStats {
    pub calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub total_execution_time_ms: u64,
    pub min_execution_time_ms: u64,
    pub max_execution_time_ms: u64,
    pub average_execution_time_ms: f64,
}

impl Default for ToolStats {
    fn default() -> Self {
        Self {
            calls: 0,
            successful_calls: 0,
            failed_calls: 0,
            total_execution_time_ms: 0,
            min_execution_time_ms: u64::MAX,
            max_execution_time_ms: 0,
            average_execution_time_ms: 0.0,
        }
    }
}

impl ToolStats {
    fn record(&mut self, elapsed_ms: u64, success: bool) {
        self.calls += 1;
        if success {
            self.successful_calls += 1;
        } else {
            self.failed_calls += 1;
        }
        self.total_execution_time_ms += elapsed_ms;
        self.min_execution_time_ms = self.min_execution_time_ms.min(elapsed_ms);
        self.max_execution_time_ms = self.max_execution_time_ms.max(elapsed_ms);
        self.average_execution_time_ms = self.total_execution_time_ms as f64 / self.calls as f64;
    }
}

/// 性能统计快照
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    pub tool_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub total_execution_time_ms: u64,
    pub average_execution_time_ms: f64,
    pub tool_stats: BTreeMap<String, ToolStats>,
}

/// 性能统计收集器
#[derive(Debug, Default)]
pub struct PerformanceCollector {
    total_calls: AtomicU64,
    successful_calls: AtomicU64,
    failed_calls: AtomicU64,
    total_execution_time_ms: AtomicU64,
    tool_stats: RwLock<BTreeMap<String, ToolStats>>,
}

impl PerformanceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次工具调用
    pub fn record(&self, tool_name: &str, elapsed: Duration, success: bool) {
        let elapsed_ms = elapsed.as_millis() as u64;
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_calls.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_calls.fetch_add(1, Ordering::Relaxed);
        }
        self.total_execution_time_ms.fetch_add(elapsed_ms, Ordering::Relaxed);

        self.tool_stats
            .write()
            .entry(tool_name.to_string())
            .or_default()
            .record(elapsed_ms, success);
    }

    pub fn get_stats(&self) -> PerformanceStats {
        let tool_calls = self.total_calls.load(Ordering::Relaxed);
        let total_execution_time_ms = self.total_execution_time_ms.load(Ordering::Relaxed);
        let average_execution_time_ms = if tool_calls > 0 {
            total_execution_time_ms as f64 / tool_calls as f64
        } else {
            0.0
        };

        PerformanceStats {
            tool_calls,
            successful_calls: self.successful_calls.load(Ordering::Relaxed),
            failed_calls: self.failed_calls.load(Ordering::Relaxed),
            total_execution_time_ms,
            average_execution_time_ms,
            tool_stats: self.tool_stats.read().clone(),
        }
    }

    /// 输出统计摘要到日志
    pub fn log_summary(&self) {
        let stats = self.get_stats();
        if stats.tool_calls == 0 {
            return;
        }
        info!(
            "📊 工具调用统计: 共 {} 次 (成功 {}, 失败 {}), 平均耗时 {:.1}ms",
            stats.tool_calls, stats.successful_calls, stats.failed_calls, stats.average_execution_time_ms
        );
        for (name, tool) in &stats.tool_stats {
            info!(
                "   {}: {} 次, 平均 {:.1}ms, 最长 {}ms",
                name, tool.calls, tool.average_execution_time_ms, tool.max_execution_time_ms
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_success_and_failure() {
        let collector = PerformanceCollector::new();
        collector.record("pagerank", Duration::from_millis(10), true);
        collector.record("pagerank", Duration::from_millis(30), false);
        collector.record("louvain", Duration::from_millis(5), true);

        let stats = collector.get_stats();
        assert_eq!(stats.tool_calls, 3);
        assert_eq!(stats.successful_calls, 2);
        assert_eq!(stats.failed_calls, 1);
        assert_eq!(stats.total_execution_time_ms, 45);

        let pagerank = &stats.tool_stats["pagerank"];
        assert_eq!(pagerank.calls, 2);
        assert_eq!(pagerank.min_execution_time_ms, 10);
        assert_eq!(pagerank.max_execution_time_ms, 30);
        assert_eq!(pagerank.average_execution_time_ms, 20.0);
    }
}
