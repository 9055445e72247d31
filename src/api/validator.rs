// ==========================================
// 酒庄酒窖管理系统 - 提交前校验器
// ==========================================
// 职责: 分桶提交前的失败关闭 (fail-closed) 校验
// 红线: 余量 > 0 的计划整批拒绝,不发生任何写入
// 红线: 执行器不重跑规划,所有前置在此拦截
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::allocation::{AllocationPlan, VOLUME_EPSILON_GAL};
use crate::domain::lot::Lot;
use crate::domain::types::LotStatus;

// ==========================================
// CommitValidator - 提交校验器
// ==========================================
pub struct CommitValidator {
    // 无状态校验器
}

impl CommitValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验分桶提交前置条件
    ///
    /// 规则 (顺序执行,命中即拒绝):
    /// 1) 计划非空且每项体积为正
    /// 2) 余量为 0 (容量不足 → 整批拒绝)
    /// 3) 母批次状态 ∈ {PRESSED, AGING} (多轮分装允许 AGING)
    /// 4) 计划总量不超过母批次剩余可分装体积
    pub fn validate_commit(
        &self,
        parent: &Lot,
        plan: &AllocationPlan,
        remaining_gal: f64,
    ) -> ApiResult<()> {
        if plan.fills.is_empty() {
            return Err(ApiError::InvalidInput("分桶计划为空".to_string()));
        }
        for fill in &plan.fills {
            if !fill.volume_gal.is_finite() || fill.volume_gal <= 0.0 {
                return Err(ApiError::InvalidInput(format!(
                    "计划项体积非法: container={}, volume={} 加仑",
                    fill.container_name, fill.volume_gal
                )));
            }
        }

        if plan.remainder_gal > VOLUME_EPSILON_GAL {
            return Err(ApiError::InsufficientCapacity {
                shortfall_gal: plan.remainder_gal,
            });
        }

        if !matches!(parent.status, LotStatus::Pressed | LotStatus::Aging) {
            return Err(ApiError::BusinessRuleViolation(format!(
                "批次 {} 状态为 {},不可分装 (仅 PRESSED / AGING 可分装)",
                parent.name, parent.status
            )));
        }

        if plan.total_volume_gal() > remaining_gal + VOLUME_EPSILON_GAL {
            return Err(ApiError::BusinessRuleViolation(format!(
                "计划体积 {} 加仑超出母批次剩余 {} 加仑",
                plan.total_volume_gal(),
                remaining_gal
            )));
        }

        Ok(())
    }
}

impl Default for CommitValidator {
    fn default() -> Self {
        Self::new()
    }
}
