// ==========================================
// 酒庄酒窖管理系统 - 装桶审计仓储
// ==========================================
// 红线: 只追加,不更新不删除
// 对齐: schema lot_assignment 表
// ==========================================

use crate::domain::allocation::AllocationRecord;
use crate::repository::db_utils::{fmt_timestamp, parse_timestamp};
use crate::repository::error::{StoreError, StoreResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

const ASSIGNMENT_COLUMNS: &str =
    "assignment_id, container_id, lot_id, volume_gal, assigned_at, actor, detail_json";

struct AssignmentRow {
    assignment_id: String,
    container_id: String,
    lot_id: String,
    volume_gal: f64,
    assigned_at: String,
    actor: String,
    detail_json: Option<String>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssignmentRow> {
    Ok(AssignmentRow {
        assignment_id: row.get(0)?,
        container_id: row.get(1)?,
        lot_id: row.get(2)?,
        volume_gal: row.get(3)?,
        assigned_at: row.get(4)?,
        actor: row.get(5)?,
        detail_json: row.get(6)?,
    })
}

fn hydrate(raw: AssignmentRow) -> StoreResult<AllocationRecord> {
    Ok(AllocationRecord {
        assignment_id: raw.assignment_id,
        container_id: raw.container_id,
        lot_id: raw.lot_id,
        volume_gal: raw.volume_gal,
        assigned_at: parse_timestamp(&raw.assigned_at, "assigned_at")?,
        actor: raw.actor,
        detail_json: raw.detail_json,
    })
}

// ==========================================
// AssignmentLogRepository - 装桶审计仓储
// ==========================================
pub struct AssignmentLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    /// 追加一条装桶审计记录
    pub fn insert(&self, record: &AllocationRecord) -> StoreResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO lot_assignment (
                assignment_id, container_id, lot_id, volume_gal,
                assigned_at, actor, detail_json
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.assignment_id,
                record.container_id,
                record.lot_id,
                record.volume_gal,
                fmt_timestamp(&record.assigned_at),
                record.actor,
                record.detail_json,
            ],
        )?;

        Ok(())
    }

    /// 查询某容器的全部装桶履历 (按时间升序)
    pub fn list_by_container(&self, container_id: &str) -> StoreResult<Vec<AllocationRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM lot_assignment WHERE container_id = ?1 ORDER BY assigned_at, assignment_id",
            ASSIGNMENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![container_id], read_row)?;

        let mut result = Vec::new();
        for raw in rows {
            result.push(hydrate(raw?)?);
        }
        Ok(result)
    }

    /// 查询某批次的全部装桶记录
    pub fn list_by_lot(&self, lot_id: &str) -> StoreResult<Vec<AllocationRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM lot_assignment WHERE lot_id = ?1 ORDER BY assigned_at, assignment_id",
            ASSIGNMENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![lot_id], read_row)?;

        let mut result = Vec::new();
        for raw in rows {
            result.push(hydrate(raw?)?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, initialize_schema};
    use crate::domain::container::{Container, ContainerDraft};
    use crate::domain::lot::{Lot, LotDraft};
    use crate::domain::types::{ContainerType, LotStatus};
    use crate::repository::container_repo::ContainerRepository;
    use crate::repository::lot_repo::LotRepository;
    use chrono::Utc;

    fn test_conn() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn seed_container(conn: &Arc<Mutex<Connection>>) -> Container {
        let now = Utc::now();
        let draft = ContainerDraft::new("w1", "Barrel 1", ContainerType::Barrel, 60.0);
        let container = Container {
            container_id: uuid::Uuid::new_v4().to_string(),
            winery_id: draft.winery_id,
            name: draft.name,
            container_type: draft.container_type,
            capacity_gal: draft.capacity_gal,
            status: draft.status,
            total_fills: 0,
            last_topping_date: None,
            purchase_date: None,
            created_at: now,
            updated_at: now,
        };
        ContainerRepository::new(conn.clone())
            .insert(&container)
            .unwrap();
        container
    }

    fn seed_lot(conn: &Arc<Mutex<Connection>>) -> Lot {
        let now = Utc::now();
        let mut draft = LotDraft::new("w1", "子批", 2025, "Syrah");
        draft.status = LotStatus::Aging;
        draft.volume_gal = 60.0;
        let lot = Lot {
            lot_id: uuid::Uuid::new_v4().to_string(),
            winery_id: draft.winery_id,
            name: draft.name,
            status: draft.status,
            volume_gal: draft.volume_gal,
            vintage_year: draft.vintage_year,
            varietal: draft.varietal,
            appellation: None,
            block_id: None,
            harvest_date: None,
            press_date: None,
            yeast_strain: None,
            chemistry: Default::default(),
            parent_lot_id: None,
            container_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        LotRepository::new(conn.clone()).insert(&lot).unwrap();
        lot
    }

    #[test]
    fn test_insert_and_query_history() {
        let conn = test_conn();
        let container = seed_container(&conn);
        let lot = seed_lot(&conn);
        let repo = AssignmentLogRepository::new(conn);

        let record = AllocationRecord {
            assignment_id: uuid::Uuid::new_v4().to_string(),
            container_id: container.container_id.clone(),
            lot_id: lot.lot_id.clone(),
            volume_gal: 60.0,
            assigned_at: Utc::now(),
            actor: "cellar-hand".to_string(),
            detail_json: Some(r#"{"reason":"SPLIT_COMMIT"}"#.to_string()),
        };
        repo.insert(&record).unwrap();

        let by_container = repo.list_by_container(&container.container_id).unwrap();
        assert_eq!(by_container.len(), 1);
        assert_eq!(by_container[0].volume_gal, 60.0);
        assert_eq!(by_container[0].actor, "cellar-hand");

        let by_lot = repo.list_by_lot(&lot.lot_id).unwrap();
        assert_eq!(by_lot.len(), 1);
        assert_eq!(by_lot[0].assignment_id, record.assignment_id);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let conn = test_conn();
        let repo = AssignmentLogRepository::new(conn);

        // 容器/批次不存在时外键拒绝写入
        let record = AllocationRecord {
            assignment_id: uuid::Uuid::new_v4().to_string(),
            container_id: "ghost-container".to_string(),
            lot_id: "ghost-lot".to_string(),
            volume_gal: 10.0,
            assigned_at: Utc::now(),
            actor: "tester".to_string(),
            detail_json: None,
        };
        assert!(repo.insert(&record).is_err());
    }
}
