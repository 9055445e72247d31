// ==========================================
// 酒庄酒窖管理系统 - 容器领域模型
// ==========================================
// 用途: 物理储酒单元 (橡木桶/储酒罐/周转桶)
// 红线: status 与 total_fills 只由分装执行器和维护操作修改
// 对齐: schema container 表
// ==========================================

use crate::domain::types::{ContainerStatus, ContainerType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Container - 容器
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    // ===== 主键与租户 =====
    pub container_id: String, // 容器唯一标识 (UUID)
    pub winery_id: String,    // 所属酒庄

    // ===== 基础信息 =====
    pub name: String,                  // 容器名称 (如 "Barrel 12")
    pub container_type: ContainerType, // 容器类型
    pub capacity_gal: f64,             // 容量 (加仑,正数)
    pub status: ContainerStatus,       // 当前状态

    // ===== 使用履历 =====
    pub total_fills: i32,                     // 累计装桶次数
    pub last_topping_date: Option<NaiveDate>, // 最近添桶日期
    pub purchase_date: Option<NaiveDate>,     // 购入日期

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Container {
    /// 是否为橡木桶 (添桶/换桶规则只看桶)
    pub fn is_barrel(&self) -> bool {
        self.container_type == ContainerType::Barrel
    }

    /// 标称容量是否可用 (非正容量的脏数据不参与分配)
    pub fn has_usable_capacity(&self) -> bool {
        self.capacity_gal.is_finite() && self.capacity_gal > 0.0
    }
}

// ==========================================
// ContainerDraft - 容器创建草稿
// ==========================================
// 用途: 写入边界的校验构造器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerDraft {
    pub winery_id: String,
    pub name: String,
    pub container_type: ContainerType,
    pub capacity_gal: f64,
    pub status: ContainerStatus,
    pub purchase_date: Option<NaiveDate>,
}

impl ContainerDraft {
    pub fn new(winery_id: &str, name: &str, container_type: ContainerType, capacity_gal: f64) -> Self {
        Self {
            winery_id: winery_id.to_string(),
            name: name.to_string(),
            container_type,
            capacity_gal,
            status: ContainerStatus::Empty,
            purchase_date: None,
        }
    }

    /// 校验草稿字段
    ///
    /// 规则:
    /// - winery_id / name 非空
    /// - capacity_gal 为有限正数
    pub fn validate(&self) -> Result<(), String> {
        if self.winery_id.trim().is_empty() {
            return Err("winery_id 不能为空".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("容器名称不能为空".to_string());
        }
        if !self.capacity_gal.is_finite() || self.capacity_gal <= 0.0 {
            return Err(format!("容量非法: {} 加仑", self.capacity_gal));
        }
        Ok(())
    }
}

// ==========================================
// ContainerPatch - 容器更新补丁
// ==========================================
// 语义: Some(..) 为写入, None 为保持不变
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerPatch {
    pub name: Option<String>,
    pub status: Option<ContainerStatus>,
    pub total_fills: Option<i32>,
    pub last_topping_date: Option<NaiveDate>,
    pub capacity_gal: Option<f64>,
}

impl ContainerPatch {
    /// 仅变更状态的补丁
    pub fn status_only(status: ContainerStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// 仅重命名的补丁
    pub fn rename(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.total_fills.is_none()
            && self.last_topping_date.is_none()
            && self.capacity_gal.is_none()
    }
}
