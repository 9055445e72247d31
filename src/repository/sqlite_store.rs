// ==========================================
// 酒庄酒窖管理系统 - SQLite 存储实现
// ==========================================
// 职责: 以三个仓储聚合实现 ProductionStore
// 说明: 仓储为同步 rusqlite;每个 trait 方法内完成加锁与释放,
//       不跨 await 持锁
// ==========================================

use crate::domain::allocation::AllocationRecord;
use crate::domain::container::{Container, ContainerDraft, ContainerPatch};
use crate::domain::lot::{Lot, LotDraft, LotFilter, LotPatch};
use crate::repository::assignment_log_repo::AssignmentLogRepository;
use crate::repository::container_repo::ContainerRepository;
use crate::repository::error::{StoreError, StoreResult};
use crate::repository::lot_repo::LotRepository;
use crate::repository::store::ProductionStore;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// SqliteProductionStore
// ==========================================
pub struct SqliteProductionStore {
    lot_repo: LotRepository,
    container_repo: ContainerRepository,
    assignment_repo: AssignmentLogRepository,
}

impl SqliteProductionStore {
    /// 从共享连接构造
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            lot_repo: LotRepository::new(conn.clone()),
            container_repo: ContainerRepository::new(conn.clone()),
            assignment_repo: AssignmentLogRepository::new(conn),
        }
    }
}

#[async_trait]
impl ProductionStore for SqliteProductionStore {
    async fn list_lots(&self, filter: &LotFilter) -> StoreResult<Vec<Lot>> {
        self.lot_repo.list(filter)
    }

    async fn get_lot(&self, lot_id: &str) -> StoreResult<Option<Lot>> {
        self.lot_repo.find_by_id(lot_id)
    }

    async fn create_lot(&self, draft: LotDraft) -> StoreResult<Lot> {
        draft
            .validate()
            .map_err(StoreError::ValidationError)?;

        let now = Utc::now();
        let lot = Lot {
            lot_id: Uuid::new_v4().to_string(),
            winery_id: draft.winery_id,
            name: draft.name,
            status: draft.status,
            volume_gal: draft.volume_gal,
            vintage_year: draft.vintage_year,
            varietal: draft.varietal,
            appellation: draft.appellation,
            block_id: draft.block_id,
            harvest_date: draft.harvest_date,
            press_date: draft.press_date,
            yeast_strain: draft.yeast_strain,
            chemistry: draft.chemistry,
            parent_lot_id: draft.parent_lot_id,
            container_id: draft.container_id,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        self.lot_repo.insert(&lot)?;
        Ok(lot)
    }

    async fn update_lot(&self, lot_id: &str, patch: LotPatch) -> StoreResult<()> {
        self.lot_repo.update(lot_id, &patch)
    }

    async fn list_containers(&self, winery_id: &str) -> StoreResult<Vec<Container>> {
        self.container_repo.list_by_winery(winery_id)
    }

    async fn get_container(&self, container_id: &str) -> StoreResult<Option<Container>> {
        self.container_repo.find_by_id(container_id)
    }

    async fn create_container(&self, draft: ContainerDraft) -> StoreResult<Container> {
        draft
            .validate()
            .map_err(StoreError::ValidationError)?;

        let now = Utc::now();
        let container = Container {
            container_id: Uuid::new_v4().to_string(),
            winery_id: draft.winery_id,
            name: draft.name,
            container_type: draft.container_type,
            capacity_gal: draft.capacity_gal,
            status: draft.status,
            total_fills: 0,
            last_topping_date: None,
            purchase_date: draft.purchase_date,
            created_at: now,
            updated_at: now,
        };
        self.container_repo.insert(&container)?;
        Ok(container)
    }

    async fn update_container(&self, container_id: &str, patch: ContainerPatch) -> StoreResult<()> {
        self.container_repo.update(container_id, &patch)
    }

    async fn log_lot_assignment(&self, record: &AllocationRecord) -> StoreResult<()> {
        self.assignment_repo.insert(record)
    }

    async fn list_assignments_for_container(
        &self,
        container_id: &str,
    ) -> StoreResult<Vec<AllocationRecord>> {
        self.assignment_repo.list_by_container(container_id)
    }

    async fn list_assignments_for_lot(&self, lot_id: &str) -> StoreResult<Vec<AllocationRecord>> {
        self.assignment_repo.list_by_lot(lot_id)
    }
}
