// ==========================================
// 酒庄酒窖管理系统 - 批次 API
// ==========================================
// 职责: 批次查询、谱系明细、状态推进、归档
// 红线: 状态推进必须经生命周期状态机校验
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::lot::{Lot, LotDraft, LotFilter, LotPatch};
use crate::domain::session::OperatorSession;
use crate::domain::types::LotStatus;
use crate::engine::lifecycle;
use crate::engine::reconciliation;
use crate::repository::store::ProductionStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ==========================================
// LotDetail - 批次明细 (含谱系与剩余体积)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotDetail {
    pub lot: Lot,
    pub children: Vec<Lot>,     // 分装产生的子批次
    pub remaining_gal: f64,     // 尚未分装的体积 (每次现算)
    pub fully_allocated: bool,
}

// ==========================================
// LotApi - 批次 API
// ==========================================
pub struct LotApi {
    store: Arc<dyn ProductionStore>,
}

impl LotApi {
    pub fn new(store: Arc<dyn ProductionStore>) -> Self {
        Self { store }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询批次列表
    pub async fn list_lots(
        &self,
        session: &OperatorSession,
        status: Option<LotStatus>,
        vintage_year: Option<i32>,
        varietal: Option<String>,
    ) -> ApiResult<Vec<Lot>> {
        if let Some(ref v) = varietal {
            if v.trim().is_empty() {
                return Err(ApiError::InvalidInput("葡萄品种过滤值不能为空".to_string()));
            }
        }

        let filter = LotFilter {
            winery_id: session.winery_id.clone(),
            status,
            vintage_year,
            varietal,
            parent_lot_id: None,
        };
        Ok(self.store.list_lots(&filter).await?)
    }

    /// 查询批次明细 (批次 + 子批次 + 剩余体积)
    pub async fn get_lot_detail(
        &self,
        session: &OperatorSession,
        lot_id: &str,
    ) -> ApiResult<LotDetail> {
        let lot = self.require_lot(session, lot_id).await?;

        // 剩余体积基于全量批次现算,不落缓存
        let all_lots = self
            .store
            .list_lots(&LotFilter::all(&session.winery_id))
            .await?;
        let remaining_gal = reconciliation::remaining_volume(&lot, &all_lots);
        let fully_allocated = reconciliation::is_fully_allocated(&lot, &all_lots);

        let children = all_lots
            .into_iter()
            .filter(|candidate| candidate.parent_lot_id.as_deref() == Some(lot_id))
            .collect();

        Ok(LotDetail {
            lot,
            children,
            remaining_gal,
            fully_allocated,
        })
    }

    /// 查询批次剩余未分装体积
    pub async fn remaining_volume(
        &self,
        session: &OperatorSession,
        lot_id: &str,
    ) -> ApiResult<f64> {
        let lot = self.require_lot(session, lot_id).await?;
        let all_lots = self
            .store
            .list_lots(&LotFilter::all(&session.winery_id))
            .await?;
        Ok(reconciliation::remaining_volume(&lot, &all_lots))
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 创建批次 (草稿在存储边界校验)
    pub async fn create_lot(
        &self,
        session: &OperatorSession,
        mut draft: LotDraft,
    ) -> ApiResult<Lot> {
        // 租户以会话为准,防止跨租户写入
        draft.winery_id = session.winery_id.clone();
        let lot = self.store.create_lot(draft).await?;
        info!(lot_id = %lot.lot_id, name = %lot.name, operator = %session.operator, "批次已创建");
        Ok(lot)
    }

    /// 推进批次状态 (单步,经状态机校验)
    pub async fn advance_status(
        &self,
        session: &OperatorSession,
        lot_id: &str,
        to: LotStatus,
    ) -> ApiResult<Lot> {
        let lot = self.require_lot(session, lot_id).await?;

        if !lifecycle::lot_transition_allowed(lot.status, to) {
            return Err(ApiError::InvalidStateTransition {
                from: lot.status.to_string(),
                to: to.to_string(),
            });
        }

        self.store
            .update_lot(lot_id, LotPatch::status_only(to))
            .await?;
        info!(
            lot_id = %lot_id,
            from = %lot.status,
            to = %to,
            operator = %session.operator,
            "批次状态已推进"
        );

        self.require_lot(session, lot_id).await
    }

    /// 归档批次 (任意状态可达的终态)
    pub async fn archive_lot(&self, session: &OperatorSession, lot_id: &str) -> ApiResult<()> {
        self.advance_status(session, lot_id, LotStatus::Archived)
            .await?;
        Ok(())
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 取批次并做租户校验
    async fn require_lot(&self, session: &OperatorSession, lot_id: &str) -> ApiResult<Lot> {
        if lot_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("批次ID不能为空".to_string()));
        }

        let lot = self
            .store
            .get_lot(lot_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("批次(id={})不存在", lot_id)))?;

        if lot.winery_id != session.winery_id {
            // 跨租户访问按不存在处理,不泄露他户数据
            return Err(ApiError::NotFound(format!("批次(id={})不存在", lot_id)));
        }
        Ok(lot)
    }
}
