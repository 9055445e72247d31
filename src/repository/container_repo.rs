// ==========================================
// 酒庄酒窖管理系统 - 容器数据仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 对齐: schema container 表
// ==========================================

use crate::domain::container::{Container, ContainerPatch};
use crate::domain::types::{ContainerStatus, ContainerType};
use crate::repository::db_utils::{fmt_date, fmt_timestamp, parse_date, parse_timestamp};
use crate::repository::error::{StoreError, StoreResult};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, ToSql};
use std::sync::{Arc, Mutex};

const CONTAINER_COLUMNS: &str = "container_id, winery_id, name, container_type, capacity_gal, \
     status, total_fills, last_topping_date, purchase_date, created_at, updated_at";

struct ContainerRow {
    container_id: String,
    winery_id: String,
    name: String,
    container_type: String,
    capacity_gal: f64,
    status: String,
    total_fills: i32,
    last_topping_date: Option<String>,
    purchase_date: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContainerRow> {
    Ok(ContainerRow {
        container_id: row.get(0)?,
        winery_id: row.get(1)?,
        name: row.get(2)?,
        container_type: row.get(3)?,
        capacity_gal: row.get(4)?,
        status: row.get(5)?,
        total_fills: row.get(6)?,
        last_topping_date: row.get(7)?,
        purchase_date: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn hydrate(raw: ContainerRow) -> StoreResult<Container> {
    let status =
        ContainerStatus::from_db_str(&raw.status).ok_or_else(|| StoreError::FieldValueError {
            field: "status".to_string(),
            message: format!("未知容器状态: {}", raw.status),
        })?;
    let container_type = ContainerType::from_db_str(&raw.container_type).ok_or_else(|| {
        StoreError::FieldValueError {
            field: "container_type".to_string(),
            message: format!("未知容器类型: {}", raw.container_type),
        }
    })?;

    Ok(Container {
        container_id: raw.container_id,
        winery_id: raw.winery_id,
        name: raw.name,
        container_type,
        capacity_gal: raw.capacity_gal,
        status,
        total_fills: raw.total_fills,
        last_topping_date: parse_date(raw.last_topping_date, "last_topping_date")?,
        purchase_date: parse_date(raw.purchase_date, "purchase_date")?,
        created_at: parse_timestamp(&raw.created_at, "created_at")?,
        updated_at: parse_timestamp(&raw.updated_at, "updated_at")?,
    })
}

// ==========================================
// ContainerRepository - 容器仓储
// ==========================================
pub struct ContainerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ContainerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入容器
    pub fn insert(&self, container: &Container) -> StoreResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO container (
                container_id, winery_id, name, container_type, capacity_gal,
                status, total_fills, last_topping_date, purchase_date,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                container.container_id,
                container.winery_id,
                container.name,
                container.container_type.to_db_str(),
                container.capacity_gal,
                container.status.to_db_str(),
                container.total_fills,
                fmt_date(&container.last_topping_date),
                fmt_date(&container.purchase_date),
                fmt_timestamp(&container.created_at),
                fmt_timestamp(&container.updated_at),
            ],
        )?;

        Ok(())
    }

    /// 按补丁更新容器 (只更新补丁中 Some 的字段)
    pub fn update(&self, container_id: &str, patch: &ContainerPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref name) = patch.name {
            sets.push("name = ?");
            values.push(Box::new(name.clone()));
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            values.push(Box::new(status.to_db_str().to_string()));
        }
        if let Some(total_fills) = patch.total_fills {
            sets.push("total_fills = ?");
            values.push(Box::new(total_fills));
        }
        if let Some(date) = patch.last_topping_date {
            sets.push("last_topping_date = ?");
            values.push(Box::new(date.format("%Y-%m-%d").to_string()));
        }
        if let Some(capacity) = patch.capacity_gal {
            sets.push("capacity_gal = ?");
            values.push(Box::new(capacity));
        }

        sets.push("updated_at = ?");
        values.push(Box::new(fmt_timestamp(&Utc::now())));
        values.push(Box::new(container_id.to_string()));

        let sql = format!(
            "UPDATE container SET {} WHERE container_id = ?",
            sets.join(", ")
        );

        let conn = self.get_conn()?;
        let rows = conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;

        if rows == 0 {
            return Err(StoreError::NotFound {
                entity: "Container".to_string(),
                id: container_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 ID 查询容器
    pub fn find_by_id(&self, container_id: &str) -> StoreResult<Option<Container>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM container WHERE container_id = ?1",
            CONTAINER_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![container_id], read_row)?;

        match rows.next() {
            Some(raw) => Ok(Some(hydrate(raw?)?)),
            None => Ok(None),
        }
    }

    /// 按租户查询容器列表
    ///
    /// 注: 返回顺序为建档顺序;酒窖自然顺序由引擎层排序
    pub fn list_by_winery(&self, winery_id: &str) -> StoreResult<Vec<Container>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM container WHERE winery_id = ?1 ORDER BY created_at, container_id",
            CONTAINER_COLUMNS
        ))?;
        let rows = stmt.query_map(params![winery_id], read_row)?;

        let mut result = Vec::new();
        for raw in rows {
            result.push(hydrate(raw?)?);
        }
        Ok(result)
    }
}
