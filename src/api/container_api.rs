// ==========================================
// 酒庄酒窖管理系统 - 容器 API
// ==========================================
// 职责: 容器建档/查询、CIP 与添桶维护操作、维护报表、重名修复
// 红线: 状态变更必须经容器状态机校验
// 红线: 重名修复为一次性批量操作,逐项容错
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::allocation::AllocationRecord;
use crate::domain::container::{Container, ContainerDraft, ContainerPatch};
use crate::domain::session::OperatorSession;
use crate::domain::types::ContainerStatus;
use crate::engine::lifecycle;
use crate::engine::maintenance::{
    self, RenamePlan, ReplacementAdvice, ToppingAlert,
};
use crate::engine::ordering;
use crate::repository::store::ProductionStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// ContainerApi - 容器 API
// ==========================================
pub struct ContainerApi {
    store: Arc<dyn ProductionStore>,
    config: Arc<ConfigManager>,
}

impl ContainerApi {
    pub fn new(store: Arc<dyn ProductionStore>, config: Arc<ConfigManager>) -> Self {
        Self { store, config }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询容器列表 (按酒窖自然顺序)
    pub async fn list_containers(&self, session: &OperatorSession) -> ApiResult<Vec<Container>> {
        let mut containers = self.store.list_containers(&session.winery_id).await?;
        ordering::sort_cellar_order(&mut containers);
        Ok(containers)
    }

    /// 查询单容器装桶履历 (审计重建)
    pub async fn vessel_history(
        &self,
        session: &OperatorSession,
        container_id: &str,
    ) -> ApiResult<Vec<AllocationRecord>> {
        let _ = self.require_container(session, container_id).await?;
        Ok(self
            .store
            .list_assignments_for_container(container_id)
            .await?)
    }

    // ==========================================
    // 建档与维护操作
    // ==========================================

    /// 建档容器
    pub async fn create_container(
        &self,
        session: &OperatorSession,
        mut draft: ContainerDraft,
    ) -> ApiResult<Container> {
        draft.winery_id = session.winery_id.clone();
        let container = self.store.create_container(draft).await?;
        info!(
            container_id = %container.container_id,
            name = %container.name,
            operator = %session.operator,
            "容器已建档"
        );
        Ok(container)
    }

    /// 标记待 CIP (倒罐/出酒后)
    pub async fn mark_needs_cip(
        &self,
        session: &OperatorSession,
        container_id: &str,
    ) -> ApiResult<Container> {
        self.transition(session, container_id, ContainerStatus::NeedsCip)
            .await
    }

    /// 开始 CIP 清洗
    pub async fn begin_cip(
        &self,
        session: &OperatorSession,
        container_id: &str,
    ) -> ApiResult<Container> {
        self.transition(session, container_id, ContainerStatus::Cleaning)
            .await
    }

    /// 完成 CIP 清洗
    ///
    /// # 参数
    /// - sanitized: true → 进入已消毒待用; false → 回到空置
    pub async fn complete_cip(
        &self,
        session: &OperatorSession,
        container_id: &str,
        sanitized: bool,
    ) -> ApiResult<Container> {
        let target = if sanitized {
            ContainerStatus::Sanitized
        } else {
            ContainerStatus::Empty
        };
        self.transition(session, container_id, target).await
    }

    /// 退役容器 (终态)
    pub async fn retire(
        &self,
        session: &OperatorSession,
        container_id: &str,
    ) -> ApiResult<Container> {
        self.transition(session, container_id, ContainerStatus::Retired)
            .await
    }

    /// 记录添桶
    ///
    /// 规则: 仅使用中的橡木桶可添桶
    pub async fn record_topping(
        &self,
        session: &OperatorSession,
        container_id: &str,
        date: NaiveDate,
    ) -> ApiResult<Container> {
        let container = self.require_container(session, container_id).await?;

        if !container.is_barrel() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "容器 {} 不是橡木桶,无添桶操作",
                container.name
            )));
        }
        if container.status != ContainerStatus::InUse {
            return Err(ApiError::BusinessRuleViolation(format!(
                "容器 {} 状态为 {},仅使用中的桶可添桶",
                container.name, container.status
            )));
        }

        self.store
            .update_container(
                container_id,
                ContainerPatch {
                    last_topping_date: Some(date),
                    ..Default::default()
                },
            )
            .await?;
        info!(
            container_id = %container_id,
            date = %date,
            operator = %session.operator,
            "添桶已记录"
        );

        self.require_container(session, container_id).await
    }

    // ==========================================
    // 维护报表 (纯谓词,每次现算)
    // ==========================================

    /// 添桶到期报表
    pub async fn topping_report(
        &self,
        session: &OperatorSession,
        today: NaiveDate,
    ) -> ApiResult<Vec<ToppingAlert>> {
        let containers = self.store.list_containers(&session.winery_id).await?;
        let thresholds = self
            .config
            .maintenance_thresholds()
            .map_err(|e| ApiError::InternalError(format!("读取维护阈值失败: {}", e)))?;
        Ok(maintenance::topping_report(&containers, today, &thresholds))
    }

    /// 换桶评估报表 (仅建议,不阻断分配)
    pub async fn replacement_report(
        &self,
        session: &OperatorSession,
        today: NaiveDate,
    ) -> ApiResult<Vec<ReplacementAdvice>> {
        let containers = self.store.list_containers(&session.winery_id).await?;
        let thresholds = self
            .config
            .maintenance_thresholds()
            .map_err(|e| ApiError::InternalError(format!("读取维护阈值失败: {}", e)))?;
        Ok(maintenance::replacement_report(
            &containers,
            today,
            &thresholds,
        ))
    }

    // ==========================================
    // 重名检测/修复
    // ==========================================

    /// 检测重名容器组
    pub async fn find_duplicate_names(
        &self,
        session: &OperatorSession,
    ) -> ApiResult<Vec<(String, Vec<Container>)>> {
        let containers = self.store.list_containers(&session.winery_id).await?;
        Ok(maintenance::find_duplicate_names(&containers))
    }

    /// 批量修复重名容器
    ///
    /// 逐项改名,单项失败只记错继续 (与分装执行器同一容错口径)
    ///
    /// # 返回
    /// (已成功应用的改名, 失败消息列表)
    pub async fn resolve_duplicate_names(
        &self,
        session: &OperatorSession,
    ) -> ApiResult<(Vec<RenamePlan>, Vec<String>)> {
        let containers = self.store.list_containers(&session.winery_id).await?;
        let plans = maintenance::resolve_duplicate_names(&containers);

        let mut applied = Vec::new();
        let mut errors = Vec::new();
        for plan in plans {
            match self
                .store
                .update_container(&plan.container_id, ContainerPatch::rename(&plan.new_name))
                .await
            {
                Ok(()) => {
                    info!(
                        container_id = %plan.container_id,
                        old_name = %plan.old_name,
                        new_name = %plan.new_name,
                        operator = %session.operator,
                        "重名容器已改名"
                    );
                    applied.push(plan);
                }
                Err(e) => {
                    warn!(container_id = %plan.container_id, error = %e, "重名修复单项失败");
                    errors.push(format!(
                        "[{} → {}] {}",
                        plan.old_name, plan.new_name, e
                    ));
                }
            }
        }
        Ok((applied, errors))
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 取容器并做租户校验
    async fn require_container(
        &self,
        session: &OperatorSession,
        container_id: &str,
    ) -> ApiResult<Container> {
        if container_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("容器ID不能为空".to_string()));
        }

        let container = self
            .store
            .get_container(container_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("容器(id={})不存在", container_id)))?;

        if container.winery_id != session.winery_id {
            return Err(ApiError::NotFound(format!(
                "容器(id={})不存在",
                container_id
            )));
        }
        Ok(container)
    }

    /// 经状态机校验的状态变更
    async fn transition(
        &self,
        session: &OperatorSession,
        container_id: &str,
        to: ContainerStatus,
    ) -> ApiResult<Container> {
        let container = self.require_container(session, container_id).await?;

        if !lifecycle::container_transition_allowed(container.status, to) {
            return Err(ApiError::InvalidStateTransition {
                from: container.status.to_string(),
                to: to.to_string(),
            });
        }

        self.store
            .update_container(container_id, ContainerPatch::status_only(to))
            .await?;
        info!(
            container_id = %container_id,
            from = %container.status,
            to = %to,
            operator = %session.operator,
            "容器状态已变更"
        );

        self.require_container(session, container_id).await
    }
}
