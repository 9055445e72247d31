// ==========================================
// 酒庄酒窖管理系统 - 体积对账
// ==========================================
// 职责: 计算母批次尚未分装的体积
// 口径: 母批次体积 − 活跃子批次体积之和
//       活跃 = AGING / BLENDING / READY_TO_BOTTLE
//       (调配中与待装瓶的子批次仍占有酒液,只看 AGING 会重复分配)
// 红线: 每次读取现算,不落缓存列,保证与子批次记录永不漂移
// ==========================================

use crate::domain::allocation::VOLUME_EPSILON_GAL;
use crate::domain::lot::Lot;
use crate::domain::types::LotStatus;

/// 子批次是否仍占有酒液
pub fn is_active_child_status(status: LotStatus) -> bool {
    matches!(
        status,
        LotStatus::Aging | LotStatus::Blending | LotStatus::ReadyToBottle
    )
}

/// 母批次剩余未分装体积
///
/// O(n) 全量扫描;批次量级在千以内,现算成本可接受
pub fn remaining_volume(lot: &Lot, all_lots: &[Lot]) -> f64 {
    let allocated: f64 = all_lots
        .iter()
        .filter(|child| child.parent_lot_id.as_deref() == Some(lot.lot_id.as_str()))
        .filter(|child| is_active_child_status(child.status))
        .map(|child| child.volume_gal)
        .sum();

    (lot.volume_gal - allocated).max(0.0)
}

/// 母批次是否已全部分装
pub fn is_fully_allocated(lot: &Lot, all_lots: &[Lot]) -> bool {
    remaining_volume(lot, all_lots) <= VOLUME_EPSILON_GAL
}
