// ==========================================
// 酒庄酒窖管理系统 - 持久化边界
// ==========================================
// 职责: 定义核心所消费的远端存储操作面
// 语义: 每个调用都是独立的异步操作,可独立失败;
//       调用方(分装执行器)按序 await,不做跨调用事务
// 红线: 核心层只依赖本 trait,不依赖具体存储实现
// ==========================================

use crate::domain::allocation::AllocationRecord;
use crate::domain::container::{Container, ContainerDraft, ContainerPatch};
use crate::domain::lot::{Lot, LotDraft, LotFilter, LotPatch};
use crate::repository::error::StoreResult;
use async_trait::async_trait;

// ==========================================
// ProductionStore - 生产数据存储
// ==========================================
#[async_trait]
pub trait ProductionStore: Send + Sync {
    // ===== 批次 =====
    async fn list_lots(&self, filter: &LotFilter) -> StoreResult<Vec<Lot>>;
    async fn get_lot(&self, lot_id: &str) -> StoreResult<Option<Lot>>;
    async fn create_lot(&self, draft: LotDraft) -> StoreResult<Lot>;
    async fn update_lot(&self, lot_id: &str, patch: LotPatch) -> StoreResult<()>;

    // ===== 容器 =====
    async fn list_containers(&self, winery_id: &str) -> StoreResult<Vec<Container>>;
    async fn get_container(&self, container_id: &str) -> StoreResult<Option<Container>>;
    async fn create_container(&self, draft: ContainerDraft) -> StoreResult<Container>;
    async fn update_container(&self, container_id: &str, patch: ContainerPatch) -> StoreResult<()>;

    // ===== 装桶审计 =====
    async fn log_lot_assignment(&self, record: &AllocationRecord) -> StoreResult<()>;
    async fn list_assignments_for_container(
        &self,
        container_id: &str,
    ) -> StoreResult<Vec<AllocationRecord>>;
    async fn list_assignments_for_lot(&self, lot_id: &str) -> StoreResult<Vec<AllocationRecord>>;
}
