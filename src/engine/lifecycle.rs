// ==========================================
// 酒庄酒窖管理系统 - 生命周期状态机
// ==========================================
// 职责: 批次与容器的合法状态转换表 + 分配资格判定
// 红线: 批次生产链不允许跳级,不允许回退
// 红线: 资格判定同时看容器状态与批次引用,取逻辑与
//       (两个事实源可能短暂不一致,必须都查)
// ==========================================

use crate::domain::container::Container;
use crate::domain::lot::Lot;
use crate::domain::types::{ContainerStatus, LotStatus};

// ==========================================
// 批次状态机
// ==========================================

/// 生产链中的下一个状态 (终态返回 None)
pub fn next_lot_status(status: LotStatus) -> Option<LotStatus> {
    match status {
        LotStatus::Planning => Some(LotStatus::Harvested),
        LotStatus::Harvested => Some(LotStatus::Crushing),
        LotStatus::Crushing => Some(LotStatus::Fermenting),
        LotStatus::Fermenting => Some(LotStatus::Pressed),
        LotStatus::Pressed => Some(LotStatus::Aging),
        LotStatus::Aging => Some(LotStatus::Blending),
        LotStatus::Blending => Some(LotStatus::ReadyToBottle),
        LotStatus::ReadyToBottle => Some(LotStatus::Bottled),
        LotStatus::Bottled => None,
        LotStatus::Archived => None,
    }
}

/// 批次状态转换是否合法
///
/// 规则:
/// - 生产链单步前进
/// - AGING → AGING 合法 (同一母批次多轮分装)
/// - ARCHIVED 任意状态可达,且不再转出
pub fn lot_transition_allowed(from: LotStatus, to: LotStatus) -> bool {
    if from == LotStatus::Archived {
        return false;
    }
    if to == LotStatus::Archived {
        return true;
    }
    if from == LotStatus::Aging && to == LotStatus::Aging {
        return true;
    }
    next_lot_status(from) == Some(to)
}

// ==========================================
// 容器状态机
// ==========================================

/// 容器状态转换是否合法
///
/// 循环: EMPTY → IN_USE → NEEDS_CIP → CLEANING → EMPTY → ...
/// SANITIZED 为清洗后可直接复用的旁路; RETIRED 任意状态可达且为终态
pub fn container_transition_allowed(from: ContainerStatus, to: ContainerStatus) -> bool {
    use ContainerStatus::*;

    if from == Retired {
        return false;
    }
    if to == Retired {
        return true;
    }

    matches!(
        (from, to),
        (Empty, InUse)
            | (Empty, Sanitized)
            | (Empty, NeedsRepair)
            | (InUse, NeedsCip)
            | (InUse, Sanitized)
            | (InUse, NeedsRepair)
            | (NeedsCip, Cleaning)
            | (Cleaning, Empty)
            | (Cleaning, Sanitized)
            | (Sanitized, InUse)
            | (Sanitized, NeedsCip)
            | (NeedsRepair, NeedsCip)
    )
}

// ==========================================
// 分配资格判定
// ==========================================

/// 容器状态本身是否允许作为分配目标
pub fn is_allocation_candidate(container: &Container) -> bool {
    matches!(
        container.status,
        ContainerStatus::Empty | ContainerStatus::Sanitized
    )
}

/// 容器当前是否被陈酿中的批次占用
///
/// 容器状态与批次落位可能短暂不同步 (状态尚未回写),
/// 以批次记录作为第二事实源
pub fn is_occupied_by_aging_lot(container: &Container, lots: &[Lot]) -> bool {
    lots.iter().any(|lot| {
        lot.status == LotStatus::Aging
            && lot.container_id.as_deref() == Some(container.container_id.as_str())
    })
}

/// 过滤出可作为分配目标的容器
///
/// 资格 = 状态 ∈ {EMPTY, SANITIZED} AND 无陈酿批次引用 (逻辑与)
pub fn eligible_containers(containers: &[Container], lots: &[Lot]) -> Vec<Container> {
    containers
        .iter()
        .filter(|c| is_allocation_candidate(c))
        .filter(|c| !is_occupied_by_aging_lot(c, lots))
        .cloned()
        .collect()
}
