// ==========================================
// 酒庄酒窖管理系统 - 分桶 API
// ==========================================
// 职责: 分桶预览 (纯计算) 与提交 (执行器) 的编排
// 传播策略: 规划失败 (余量>0) 在写入前整批拒绝 (fail closed);
//           执行失败逐容器容错并聚合上报 (fail open)
// 红线: 预览与提交共用同一规划函数,预览绝不写库
// ==========================================

use crate::api::error::ApiResult;
use crate::api::validator::CommitValidator;
use crate::domain::allocation::AllocationPlan;
use crate::domain::lot::{Lot, LotFilter};
use crate::domain::session::OperatorSession;
use crate::engine::lifecycle;
use crate::engine::ordering;
use crate::engine::planner::AllocationPlanner;
use crate::engine::reconciliation;
use crate::engine::splitter::LotSplitExecutor;
use crate::repository::store::ProductionStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// AllocationPreview - 分桶预览
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPreview {
    pub parent_lot_id: String,
    pub requested_gal: f64,           // 本轮待分装体积 (= 母批次剩余现算值)
    pub eligible_container_count: usize,
    pub plan: AllocationPlan,
}

// ==========================================
// SplitReport - 分装结果报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitReport {
    pub parent_lot_id: String,
    pub containers_attempted: usize,
    pub succeeded: usize,
    pub child_lot_ids: Vec<String>,
    pub errors: Vec<String>, // 逐容器失败消息
    pub message: String,     // 聚合文案: "k/n 个容器装桶成功"
}

// ==========================================
// AllocationApi - 分桶 API
// ==========================================
pub struct AllocationApi {
    store: Arc<dyn ProductionStore>,
    planner: AllocationPlanner,
    executor: LotSplitExecutor,
    validator: CommitValidator,
}

impl AllocationApi {
    pub fn new(store: Arc<dyn ProductionStore>) -> Self {
        Self {
            planner: AllocationPlanner::new(),
            executor: LotSplitExecutor::new(store.clone()),
            validator: CommitValidator::new(),
            store,
        }
    }

    // ==========================================
    // 预览 (只读)
    // ==========================================

    /// 生成分桶预览
    ///
    /// 步骤: 取母批次 → 现算剩余体积 → 资格过滤 (状态 AND 批次引用)
    ///       → 酒窖自然排序 → 贪心规划
    /// 纯读操作,可反复调用;提交前应以同一计划走 commit
    #[instrument(skip(self, session), fields(winery_id = %session.winery_id))]
    pub async fn preview(
        &self,
        session: &OperatorSession,
        parent_lot_id: &str,
    ) -> ApiResult<AllocationPreview> {
        self.preview_inner(session, parent_lot_id, None).await
    }

    /// 生成指定体积的分桶预览 (部分轮次)
    ///
    /// 操作员可只分装剩余体积中的一部分;提交时仍校验
    /// 计划总量不超过母批次剩余体积
    pub async fn preview_volume(
        &self,
        session: &OperatorSession,
        parent_lot_id: &str,
        requested_gal: f64,
    ) -> ApiResult<AllocationPreview> {
        self.preview_inner(session, parent_lot_id, Some(requested_gal))
            .await
    }

    async fn preview_inner(
        &self,
        session: &OperatorSession,
        parent_lot_id: &str,
        requested_override: Option<f64>,
    ) -> ApiResult<AllocationPreview> {
        let (parent, all_lots) = self.load_parent(session, parent_lot_id).await?;
        let requested_gal = requested_override
            .unwrap_or_else(|| reconciliation::remaining_volume(&parent, &all_lots));

        let containers = self.store.list_containers(&session.winery_id).await?;
        let mut eligible = lifecycle::eligible_containers(&containers, &all_lots);
        ordering::sort_cellar_order(&mut eligible);

        let plan = self.planner.plan(requested_gal, &eligible);

        Ok(AllocationPreview {
            parent_lot_id: parent.lot_id,
            requested_gal,
            eligible_container_count: eligible.len(),
            plan,
        })
    }

    // ==========================================
    // 提交
    // ==========================================

    /// 提交分桶计划
    ///
    /// 前置校验失败 → 整批拒绝,无任何写入;
    /// 通过后交执行器逐容器提交,单项失败聚合进报告
    #[instrument(skip(self, session, plan), fields(
        winery_id = %session.winery_id,
        fills = plan.fills.len()
    ))]
    pub async fn commit(
        &self,
        session: &OperatorSession,
        parent_lot_id: &str,
        plan: &AllocationPlan,
    ) -> ApiResult<SplitReport> {
        let (parent, all_lots) = self.load_parent(session, parent_lot_id).await?;
        let remaining_gal = reconciliation::remaining_volume(&parent, &all_lots);

        // fail closed: 任何前置不满足都在写入前拒绝
        self.validator
            .validate_commit(&parent, plan, remaining_gal)?;

        let outcome = self
            .executor
            .commit(&parent, plan, session, Utc::now())
            .await;

        let message = if outcome.errors.is_empty() {
            format!(
                "分装完成: {}/{} 个容器装桶成功",
                outcome.succeeded(),
                outcome.containers_attempted
            )
        } else {
            format!(
                "分装完成: {}/{} 个容器装桶成功; 失败明细: {}",
                outcome.succeeded(),
                outcome.containers_attempted,
                outcome
                    .errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            )
        };

        info!(
            parent_lot_id = %parent_lot_id,
            succeeded = outcome.succeeded(),
            attempted = outcome.containers_attempted,
            errors = outcome.errors.len(),
            "分桶提交完成"
        );

        Ok(SplitReport {
            parent_lot_id: parent.lot_id,
            containers_attempted: outcome.containers_attempted,
            succeeded: outcome.succeeded(),
            child_lot_ids: outcome
                .child_lots
                .iter()
                .map(|lot| lot.lot_id.clone())
                .collect(),
            errors: outcome.errors.iter().map(|e| e.to_string()).collect(),
            message,
        })
    }

    /// 一键分桶 ("Auto-Fill Barrels"): 预览 + 提交
    ///
    /// 容量不足时失败关闭,不发生任何写入
    pub async fn auto_fill(
        &self,
        session: &OperatorSession,
        parent_lot_id: &str,
    ) -> ApiResult<SplitReport> {
        let preview = self.preview(session, parent_lot_id).await?;
        self.commit(session, parent_lot_id, &preview.plan).await
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 取母批次与租户内全量批次 (剩余体积与资格判定共用)
    async fn load_parent(
        &self,
        session: &OperatorSession,
        parent_lot_id: &str,
    ) -> ApiResult<(Lot, Vec<Lot>)> {
        use crate::api::error::ApiError;

        if parent_lot_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("批次ID不能为空".to_string()));
        }

        let all_lots = self
            .store
            .list_lots(&LotFilter::all(&session.winery_id))
            .await?;
        let parent = all_lots
            .iter()
            .find(|lot| lot.lot_id == parent_lot_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("批次(id={})不存在", parent_lot_id)))?;

        Ok((parent, all_lots))
    }
}
