// ==========================================
// 酒庄酒窖管理系统 - 批次领域模型
// ==========================================
// 红线: 批次不做物理删除,只做状态推进或归档
// 红线: 入口数据必须经 LotDraft 校验,算法内部不再兜底
// ==========================================

use crate::domain::types::LotStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ChemistrySnapshot - 理化指标快照
// ==========================================
// 用途: 实验室录入;分装时整体复制到子批次
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemistrySnapshot {
    pub ph: Option<f64>,           // pH 值
    pub ta_g_l: Option<f64>,       // 总酸 (g/L)
    pub va_g_l: Option<f64>,       // 挥发酸 (g/L)
    pub free_so2_ppm: Option<f64>, // 游离二氧化硫 (ppm)
    pub alcohol_pct: Option<f64>,  // 酒精度 (% v/v)
}

// ==========================================
// Lot - 酒批次
// ==========================================
// 用途: 某一生产阶段的一个可追溯酒液量
// 对齐: schema lot 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    // ===== 主键与租户 =====
    pub lot_id: String,    // 批次唯一标识 (UUID)
    pub winery_id: String, // 所属酒庄 (租户隔离)

    // ===== 基础信息 =====
    pub name: String,          // 批次名称
    pub status: LotStatus,     // 生产状态
    pub volume_gal: f64,       // 体积 (加仑,非负)
    pub vintage_year: i32,     // 年份
    pub varietal: String,      // 葡萄品种
    pub appellation: Option<String>, // 产区
    pub block_id: Option<String>,    // 葡萄园地块

    // ===== 工艺时间 =====
    pub harvest_date: Option<NaiveDate>, // 采收日期
    pub press_date: Option<NaiveDate>,   // 压榨日期
    pub yeast_strain: Option<String>,    // 酵母菌株

    // ===== 理化指标 =====
    pub chemistry: ChemistrySnapshot, // 实验室快照

    // ===== 谱系与落位 =====
    pub parent_lot_id: Option<String>, // 母批次 (分装产生的子批次才有)
    pub container_id: Option<String>,  // 当前容器 (未分配为 None)

    // ===== 备注 =====
    pub notes: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lot {
    /// 是否为分装产生的子批次
    pub fn is_child(&self) -> bool {
        self.parent_lot_id.is_some()
    }
}

// ==========================================
// LotDraft - 批次创建草稿
// ==========================================
// 用途: 写入边界的校验构造器;非法输入在此拒绝
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotDraft {
    pub winery_id: String,
    pub name: String,
    pub status: LotStatus,
    pub volume_gal: f64,
    pub vintage_year: i32,
    pub varietal: String,
    pub appellation: Option<String>,
    pub block_id: Option<String>,
    pub harvest_date: Option<NaiveDate>,
    pub press_date: Option<NaiveDate>,
    pub yeast_strain: Option<String>,
    pub chemistry: ChemistrySnapshot,
    pub parent_lot_id: Option<String>,
    pub container_id: Option<String>,
    pub notes: Option<String>,
}

impl LotDraft {
    /// 基本字段的最小草稿
    pub fn new(winery_id: &str, name: &str, vintage_year: i32, varietal: &str) -> Self {
        Self {
            winery_id: winery_id.to_string(),
            name: name.to_string(),
            status: LotStatus::Planning,
            volume_gal: 0.0,
            vintage_year,
            varietal: varietal.to_string(),
            appellation: None,
            block_id: None,
            harvest_date: None,
            press_date: None,
            yeast_strain: None,
            chemistry: ChemistrySnapshot::default(),
            parent_lot_id: None,
            container_id: None,
            notes: None,
        }
    }

    /// 校验草稿字段
    ///
    /// 规则:
    /// - winery_id / name / varietal 非空
    /// - volume_gal 非负且有限
    /// - vintage_year 在合理区间 [1900, 2100]
    ///
    /// # 返回
    /// - Ok(()): 草稿合法
    /// - Err(String): 首个违规原因
    pub fn validate(&self) -> Result<(), String> {
        if self.winery_id.trim().is_empty() {
            return Err("winery_id 不能为空".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("批次名称不能为空".to_string());
        }
        if self.varietal.trim().is_empty() {
            return Err("葡萄品种不能为空".to_string());
        }
        if !self.volume_gal.is_finite() || self.volume_gal < 0.0 {
            return Err(format!("体积非法: {} 加仑", self.volume_gal));
        }
        if !(1900..=2100).contains(&self.vintage_year) {
            return Err(format!("年份非法: {}", self.vintage_year));
        }
        Ok(())
    }
}

// ==========================================
// LotPatch - 批次更新补丁
// ==========================================
// 语义: Some(..) 为写入, None 为保持不变
// 红线: 更新面最小化,不允许补丁改谱系字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotPatch {
    pub name: Option<String>,
    pub status: Option<LotStatus>,
    pub volume_gal: Option<f64>,
    pub container_id: Option<String>,
    pub chemistry: Option<ChemistrySnapshot>,
    pub notes: Option<String>,
}

impl LotPatch {
    /// 仅推进状态的补丁
    pub fn status_only(status: LotStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// 补丁是否为空 (无任何字段要写)
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.volume_gal.is_none()
            && self.container_id.is_none()
            && self.chemistry.is_none()
            && self.notes.is_none()
    }
}

// ==========================================
// LotFilter - 批次查询过滤器
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotFilter {
    pub winery_id: String,
    pub status: Option<LotStatus>,
    pub vintage_year: Option<i32>,
    pub varietal: Option<String>,
    pub parent_lot_id: Option<String>,
}

impl LotFilter {
    /// 租户内全量查询
    pub fn all(winery_id: &str) -> Self {
        Self {
            winery_id: winery_id.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation_rejects_bad_input() {
        // 空名称
        let mut draft = LotDraft::new("w1", "", 2025, "Syrah");
        assert!(draft.validate().is_err());

        // 负体积
        draft.name = "Syrah 压榨批".to_string();
        draft.volume_gal = -1.0;
        assert!(draft.validate().is_err());

        // 年份出界
        draft.volume_gal = 150.0;
        draft.vintage_year = 1850;
        assert!(draft.validate().is_err());

        // 合法草稿
        draft.vintage_year = 2025;
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(LotPatch::default().is_empty());
        assert!(!LotPatch::status_only(LotStatus::Aging).is_empty());
    }
}
