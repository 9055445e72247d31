// ==========================================
// 酒庄酒窖管理系统 - 分桶规划引擎
// ==========================================
// 职责: 把请求体积按序贪心分配到候选容器
// 输入: 请求体积 + 已按酒窖自然顺序排列的候选容器
// 输出: AllocationPlan (计划项 + 无法落位的余量)
// 红线: 纯函数,无副作用;预览与提交共用同一计划
// 红线: 余量 > 0 时调用方不得提交
// ==========================================

use crate::domain::allocation::{AllocationPlan, PlannedFill, VOLUME_EPSILON_GAL};
use crate::domain::container::Container;
use tracing::instrument;

// ==========================================
// AllocationPlanner - 分桶规划引擎
// ==========================================
pub struct AllocationPlanner {
    // 无状态引擎,不需要注入依赖
}

impl AllocationPlanner {
    pub fn new() -> Self {
        Self {}
    }

    /// 规划分桶
    ///
    /// 规则:
    /// 1) 按给定顺序逐个容器取 fill = min(剩余体积, 容量)
    /// 2) fill > 0 则记入计划并扣减剩余体积
    /// 3) 剩余体积 ≤ 0 时提前结束
    /// 4) 候选耗尽仍有剩余 → 作为 remainder 返回 (容量不足信号)
    ///
    /// 边界:
    /// - 请求体积 ≤ 0 → 空计划,不报错
    /// - 候选为空 → remainder = 请求体积
    /// - 容量 ≤ 0 的容器跳过,永不分配
    #[instrument(skip(self, containers), fields(candidates = containers.len()))]
    pub fn plan(&self, requested_gal: f64, containers: &[Container]) -> AllocationPlan {
        if !requested_gal.is_finite() || requested_gal <= VOLUME_EPSILON_GAL {
            return AllocationPlan::empty();
        }

        let mut fills = Vec::new();
        let mut remaining = requested_gal;

        for container in containers {
            if remaining <= VOLUME_EPSILON_GAL {
                break;
            }
            // 脏数据容量不参与分配
            if !container.has_usable_capacity() {
                continue;
            }

            let fill = remaining.min(container.capacity_gal);
            if fill > 0.0 {
                fills.push(PlannedFill {
                    container_id: container.container_id.clone(),
                    container_name: container.name.clone(),
                    volume_gal: fill,
                });
                remaining -= fill;
            }
        }

        AllocationPlan {
            fills,
            remainder_gal: remaining.max(0.0),
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for AllocationPlanner {
    fn default() -> Self {
        Self::new()
    }
}
