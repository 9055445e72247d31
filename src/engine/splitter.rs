// ==========================================
// 酒庄酒窖管理系统 - 分装执行器
// ==========================================
// 职责: 消费分桶计划,逐容器创建子批次 + 回写容器 + 追加审计
// 前置: 调用方已校验 remainder == 0 (执行器不重跑规划)
// 红线: 单容器失败只记错继续,不中断整批,不回滚已提交项
//       (底层存储在此调用上下文无多行事务原语,尽最大前进)
// 红线: 每一次装桶必须追加审计记录
// ==========================================

use crate::domain::allocation::{AllocationPlan, AllocationRecord};
use crate::domain::container::ContainerPatch;
use crate::domain::lot::{Lot, LotDraft, LotPatch};
use crate::domain::session::OperatorSession;
use crate::domain::types::{ContainerStatus, LotStatus};
use crate::repository::store::ProductionStore;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

// ==========================================
// 失败记录
// ==========================================

/// 失败发生的执行步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStage {
    FetchContainer,  // 重取容器
    CreateChildLot,  // 创建子批次
    UpdateContainer, // 回写容器状态
    LogAssignment,   // 追加审计记录
    UpdateParent,    // 回写母批次
}

impl fmt::Display for SplitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SplitStage::FetchContainer => "FETCH_CONTAINER",
            SplitStage::CreateChildLot => "CREATE_CHILD_LOT",
            SplitStage::UpdateContainer => "UPDATE_CONTAINER",
            SplitStage::LogAssignment => "LOG_ASSIGNMENT",
            SplitStage::UpdateParent => "UPDATE_PARENT",
        };
        write!(f, "{}", s)
    }
}

/// 单容器失败明细
#[derive(Debug, Clone)]
pub struct SplitFailure {
    pub stage: SplitStage,
    pub container_id: Option<String>,
    pub container_name: Option<String>,
    pub message: String,
}

impl fmt::Display for SplitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.container_name {
            Some(name) => write!(f, "[{}] {}: {}", name, self.stage, self.message),
            None => write!(f, "{}: {}", self.stage, self.message),
        }
    }
}

// ==========================================
// 执行结果
// ==========================================
#[derive(Debug)]
pub struct SplitOutcome {
    pub child_lots: Vec<Lot>,         // 成功创建的子批次
    pub errors: Vec<SplitFailure>,    // 按发生顺序的失败明细
    pub containers_attempted: usize,  // 计划内容器总数
}

impl SplitOutcome {
    /// 成功装桶的容器数
    pub fn succeeded(&self) -> usize {
        self.child_lots.len()
    }
}

// ==========================================
// LotSplitExecutor - 分装执行器
// ==========================================
pub struct LotSplitExecutor {
    store: Arc<dyn ProductionStore>,
}

impl LotSplitExecutor {
    pub fn new(store: Arc<dyn ProductionStore>) -> Self {
        Self { store }
    }

    /// 提交分桶计划
    ///
    /// 每个计划项按序执行四步,任一步失败记错并继续下一容器:
    /// 1) 重取容器 (并发删除/改名在此降级为单项失败)
    /// 2) 创建子批次 (复制母批次谱系与理化快照, status=AGING)
    /// 3) 回写容器 (status=IN_USE, total_fills+1)
    /// 4) 追加装桶审计记录
    /// 收尾: 母批次 status=AGING,备注追加本轮容器数
    #[instrument(skip(self, parent, plan, session), fields(
        parent_lot_id = %parent.lot_id,
        fills = plan.fills.len()
    ))]
    pub async fn commit(
        &self,
        parent: &Lot,
        plan: &AllocationPlan,
        session: &OperatorSession,
        now: DateTime<Utc>,
    ) -> SplitOutcome {
        let mut child_lots: Vec<Lot> = Vec::new();
        let mut errors: Vec<SplitFailure> = Vec::new();

        for fill in &plan.fills {
            // 1) 重取容器
            let container = match self.store.get_container(&fill.container_id).await {
                Ok(Some(container)) => container,
                Ok(None) => {
                    warn!(container_id = %fill.container_id, "容器在提交时已不存在,跳过");
                    errors.push(SplitFailure {
                        stage: SplitStage::FetchContainer,
                        container_id: Some(fill.container_id.clone()),
                        container_name: Some(fill.container_name.clone()),
                        message: "容器不存在".to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    errors.push(SplitFailure {
                        stage: SplitStage::FetchContainer,
                        container_id: Some(fill.container_id.clone()),
                        container_name: Some(fill.container_name.clone()),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            // 2) 创建子批次 (谱系/理化快照从母批次整体复制)
            let draft = LotDraft {
                winery_id: parent.winery_id.clone(),
                name: format!("{} - {}", parent.name, container.name),
                status: LotStatus::Aging,
                volume_gal: fill.volume_gal,
                vintage_year: parent.vintage_year,
                varietal: parent.varietal.clone(),
                appellation: parent.appellation.clone(),
                block_id: parent.block_id.clone(),
                harvest_date: parent.harvest_date,
                press_date: parent.press_date,
                yeast_strain: parent.yeast_strain.clone(),
                chemistry: parent.chemistry,
                parent_lot_id: Some(parent.lot_id.clone()),
                container_id: Some(container.container_id.clone()),
                notes: None,
            };

            let child = match self.store.create_lot(draft).await {
                Ok(child) => child,
                Err(e) => {
                    errors.push(SplitFailure {
                        stage: SplitStage::CreateChildLot,
                        container_id: Some(container.container_id.clone()),
                        container_name: Some(container.name.clone()),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            // 3) 回写容器
            let patch = ContainerPatch {
                status: Some(ContainerStatus::InUse),
                total_fills: Some(container.total_fills + 1),
                ..Default::default()
            };
            if let Err(e) = self
                .store
                .update_container(&container.container_id, patch)
                .await
            {
                errors.push(SplitFailure {
                    stage: SplitStage::UpdateContainer,
                    container_id: Some(container.container_id.clone()),
                    container_name: Some(container.name.clone()),
                    message: e.to_string(),
                });
                continue;
            }

            // 4) 追加审计记录
            let record = AllocationRecord {
                assignment_id: Uuid::new_v4().to_string(),
                container_id: container.container_id.clone(),
                lot_id: child.lot_id.clone(),
                volume_gal: fill.volume_gal,
                assigned_at: now,
                actor: session.operator.clone(),
                detail_json: Some(
                    json!({
                        "reason": "SPLIT_COMMIT",
                        "parent_lot_id": parent.lot_id,
                        "volume_gal": fill.volume_gal,
                    })
                    .to_string(),
                ),
            };
            if let Err(e) = self.store.log_lot_assignment(&record).await {
                // 子批次与容器已提交;审计失败单独记错,不回滚
                errors.push(SplitFailure {
                    stage: SplitStage::LogAssignment,
                    container_id: Some(container.container_id.clone()),
                    container_name: Some(container.name.clone()),
                    message: e.to_string(),
                });
                child_lots.push(child);
                continue;
            }

            child_lots.push(child);
        }

        // 收尾: 母批次推进到 AGING 并记录本轮容器数
        // 不归档: 剩余体积 > 0 时同一母批次可继续分装
        let annotation = format!("分装至 {} 个容器", child_lots.len());
        let notes = match &parent.notes {
            Some(existing) => format!("{}; {}", existing, annotation),
            None => annotation,
        };
        let parent_patch = LotPatch {
            status: Some(LotStatus::Aging),
            notes: Some(notes),
            ..Default::default()
        };
        if let Err(e) = self.store.update_lot(&parent.lot_id, parent_patch).await {
            errors.push(SplitFailure {
                stage: SplitStage::UpdateParent,
                container_id: None,
                container_name: None,
                message: e.to_string(),
            });
        }

        SplitOutcome {
            child_lots,
            errors,
            containers_attempted: plan.fills.len(),
        }
    }
}
