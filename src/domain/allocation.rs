// ==========================================
// 酒庄酒窖管理系统 - 分桶领域模型
// ==========================================
// AllocationPlan: 未提交的临时计划,不落库,可随时丢弃
// AllocationRecord: 落库的装桶审计记录,只追加不修改
// 红线: 所有装桶写入必须记录审计行
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 体积比较用的容差 (加仑)
///
/// f64 累减在百桶量级下的误差远小于该值;
/// 低于容差的余量视为 0。
pub const VOLUME_EPSILON_GAL: f64 = 1e-6;

// ==========================================
// PlannedFill - 单容器装桶计划项
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFill {
    pub container_id: String,   // 目标容器
    pub container_name: String, // 容器名称 (操作员预览用)
    pub volume_gal: f64,        // 计划装入体积
}

// ==========================================
// AllocationPlan - 分桶计划
// ==========================================
// 用途: 规划器输出;预览与提交共用同一份计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub fills: Vec<PlannedFill>, // 计划项 (按酒窖自然顺序)
    pub remainder_gal: f64,      // 无法落位的余量 (>0 表示容量不足)
}

impl AllocationPlan {
    /// 空计划
    pub fn empty() -> Self {
        Self {
            fills: Vec::new(),
            remainder_gal: 0.0,
        }
    }

    /// 计划落位总体积
    pub fn total_volume_gal(&self) -> f64 {
        self.fills.iter().map(|f| f.volume_gal).sum()
    }

    /// 是否全部落位 (余量为 0)
    pub fn is_fully_placed(&self) -> bool {
        self.remainder_gal <= VOLUME_EPSILON_GAL
    }
}

// ==========================================
// AllocationRecord - 装桶审计记录
// ==========================================
// 红线: 只追加;用于重建容器履历
// 对齐: schema lot_assignment 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub assignment_id: String,        // 记录 ID (UUID)
    pub container_id: String,         // 容器
    pub lot_id: String,               // 批次 (分装场景下为子批次)
    pub volume_gal: f64,              // 装入体积
    pub assigned_at: DateTime<Utc>,   // 装桶时间
    pub actor: String,                // 操作人
    pub detail_json: Option<String>,  // 机器可读明细 (JSON)
}
