// ==========================================
// 酒庄酒窖管理系统 - 酒窖总览 API
// ==========================================
// 职责: 只读聚合查询,供总览界面与命令行摘要
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::lot::LotFilter;
use crate::domain::session::OperatorSession;
use crate::domain::types::{LotStatus, ToppingSeverity};
use crate::engine::maintenance;
use crate::engine::reconciliation;
use crate::repository::store::ProductionStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ==========================================
// CellarSummary - 酒窖摘要
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellarSummary {
    pub lots_by_status: BTreeMap<String, usize>,
    pub containers_by_status: BTreeMap<String, usize>,
    pub unallocated_pressed_gal: f64, // 压榨批次中尚未分装的体积
    pub topping_due_count: usize,
    pub topping_urgent_count: usize,
    pub replacement_candidates: usize,
}

// ==========================================
// DashboardApi - 总览 API
// ==========================================
pub struct DashboardApi {
    store: Arc<dyn ProductionStore>,
    config: Arc<ConfigManager>,
}

impl DashboardApi {
    pub fn new(store: Arc<dyn ProductionStore>, config: Arc<ConfigManager>) -> Self {
        Self { store, config }
    }

    /// 酒窖摘要 (全部现算,不落缓存)
    pub async fn cellar_summary(
        &self,
        session: &OperatorSession,
        today: NaiveDate,
    ) -> ApiResult<CellarSummary> {
        let lots = self
            .store
            .list_lots(&LotFilter::all(&session.winery_id))
            .await?;
        let containers = self.store.list_containers(&session.winery_id).await?;
        let thresholds = self
            .config
            .maintenance_thresholds()
            .map_err(|e| ApiError::InternalError(format!("读取维护阈值失败: {}", e)))?;

        let mut lots_by_status: BTreeMap<String, usize> = BTreeMap::new();
        for lot in &lots {
            *lots_by_status.entry(lot.status.to_string()).or_insert(0) += 1;
        }

        let mut containers_by_status: BTreeMap<String, usize> = BTreeMap::new();
        for container in &containers {
            *containers_by_status
                .entry(container.status.to_string())
                .or_insert(0) += 1;
        }

        let unallocated_pressed_gal = lots
            .iter()
            .filter(|lot| lot.status == LotStatus::Pressed)
            .map(|lot| reconciliation::remaining_volume(lot, &lots))
            .sum();

        let topping = maintenance::topping_report(&containers, today, &thresholds);
        let topping_urgent_count = topping
            .iter()
            .filter(|a| a.severity == ToppingSeverity::Urgent)
            .count();
        let replacement = maintenance::replacement_report(&containers, today, &thresholds);

        Ok(CellarSummary {
            lots_by_status,
            containers_by_status,
            unallocated_pressed_gal,
            topping_due_count: topping.len(),
            topping_urgent_count,
            replacement_candidates: replacement.len(),
        })
    }
}
