// ==========================================
// 酒庄酒窖管理系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// 红线: 状态是枚举制,不是自由字符串
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 批次状态 (Lot Status)
// ==========================================
// 生产链: PLANNING → HARVESTED → CRUSHING → FERMENTING → PRESSED
//         → AGING → BLENDING → READY_TO_BOTTLE → BOTTLED
// ARCHIVED 为终态,任意状态可达
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotStatus {
    Planning,      // 计划中
    Harvested,     // 已采收
    Crushing,      // 破碎中
    Fermenting,    // 发酵中
    Pressed,       // 已压榨(待分桶)
    Aging,         // 陈酿中
    Blending,      // 调配中
    ReadyToBottle, // 待装瓶
    Bottled,       // 已装瓶
    Archived,      // 已归档(终态)
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl LotStatus {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LotStatus::Planning => "PLANNING",
            LotStatus::Harvested => "HARVESTED",
            LotStatus::Crushing => "CRUSHING",
            LotStatus::Fermenting => "FERMENTING",
            LotStatus::Pressed => "PRESSED",
            LotStatus::Aging => "AGING",
            LotStatus::Blending => "BLENDING",
            LotStatus::ReadyToBottle => "READY_TO_BOTTLE",
            LotStatus::Bottled => "BOTTLED",
            LotStatus::Archived => "ARCHIVED",
        }
    }

    /// 从数据库字符串解析状态
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLANNING" => Some(LotStatus::Planning),
            "HARVESTED" => Some(LotStatus::Harvested),
            "CRUSHING" => Some(LotStatus::Crushing),
            "FERMENTING" => Some(LotStatus::Fermenting),
            "PRESSED" => Some(LotStatus::Pressed),
            "AGING" => Some(LotStatus::Aging),
            "BLENDING" => Some(LotStatus::Blending),
            "READY_TO_BOTTLE" => Some(LotStatus::ReadyToBottle),
            "BOTTLED" => Some(LotStatus::Bottled),
            "ARCHIVED" => Some(LotStatus::Archived),
            _ => None,
        }
    }
}

// ==========================================
// 容器状态 (Container Status)
// ==========================================
// 循环: EMPTY → IN_USE → NEEDS_CIP → CLEANING → EMPTY
// SANITIZED 为"已消毒待用",与 EMPTY 同为可分配状态
// RETIRED 为终态,任意状态可达
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerStatus {
    Empty,       // 空置
    InUse,       // 使用中
    Cleaning,    // CIP 清洗中
    NeedsCip,    // 待 CIP
    Sanitized,   // 已消毒
    NeedsRepair, // 待维修
    Retired,     // 已退役(终态)
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ContainerStatus {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContainerStatus::Empty => "EMPTY",
            ContainerStatus::InUse => "IN_USE",
            ContainerStatus::Cleaning => "CLEANING",
            ContainerStatus::NeedsCip => "NEEDS_CIP",
            ContainerStatus::Sanitized => "SANITIZED",
            ContainerStatus::NeedsRepair => "NEEDS_REPAIR",
            ContainerStatus::Retired => "RETIRED",
        }
    }

    /// 从数据库字符串解析状态
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EMPTY" => Some(ContainerStatus::Empty),
            "IN_USE" => Some(ContainerStatus::InUse),
            "CLEANING" => Some(ContainerStatus::Cleaning),
            "NEEDS_CIP" => Some(ContainerStatus::NeedsCip),
            "SANITIZED" => Some(ContainerStatus::Sanitized),
            "NEEDS_REPAIR" => Some(ContainerStatus::NeedsRepair),
            "RETIRED" => Some(ContainerStatus::Retired),
            _ => None,
        }
    }
}

// ==========================================
// 容器类型 (Container Type)
// ==========================================
// 添桶/换桶规则仅对 BARREL 生效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerType {
    Barrel, // 橡木桶
    Tank,   // 储酒罐
    Tote,   // 周转桶
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ContainerType {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContainerType::Barrel => "BARREL",
            ContainerType::Tank => "TANK",
            ContainerType::Tote => "TOTE",
        }
    }

    /// 从数据库字符串解析类型
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BARREL" => Some(ContainerType::Barrel),
            "TANK" => Some(ContainerType::Tank),
            "TOTE" => Some(ContainerType::Tote),
            _ => None,
        }
    }
}

// ==========================================
// 添桶紧急度 (Topping Severity)
// ==========================================
// 顺序: Due < Urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToppingSeverity {
    Due,    // 到期
    Urgent, // 紧急
}

impl fmt::Display for ToppingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToppingSeverity::Due => write!(f, "DUE"),
            ToppingSeverity::Urgent => write!(f, "URGENT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lot_status_db_roundtrip() {
        // 全量枚举值的数据库字符串往返
        let all = [
            LotStatus::Planning,
            LotStatus::Harvested,
            LotStatus::Crushing,
            LotStatus::Fermenting,
            LotStatus::Pressed,
            LotStatus::Aging,
            LotStatus::Blending,
            LotStatus::ReadyToBottle,
            LotStatus::Bottled,
            LotStatus::Archived,
        ];
        for status in all {
            assert_eq!(LotStatus::from_db_str(status.to_db_str()), Some(status));
        }
        assert_eq!(LotStatus::from_db_str("NO_SUCH_STATE"), None);
    }

    #[test]
    fn test_container_status_db_roundtrip() {
        let all = [
            ContainerStatus::Empty,
            ContainerStatus::InUse,
            ContainerStatus::Cleaning,
            ContainerStatus::NeedsCip,
            ContainerStatus::Sanitized,
            ContainerStatus::NeedsRepair,
            ContainerStatus::Retired,
        ];
        for status in all {
            assert_eq!(
                ContainerStatus::from_db_str(status.to_db_str()),
                Some(status)
            );
        }
        // 解析大小写不敏感
        assert_eq!(
            ContainerStatus::from_db_str("in_use"),
            Some(ContainerStatus::InUse)
        );
    }

    #[test]
    fn test_topping_severity_ordering() {
        assert!(ToppingSeverity::Due < ToppingSeverity::Urgent);
    }
}
