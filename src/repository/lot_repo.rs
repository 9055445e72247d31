// ==========================================
// 酒庄酒窖管理系统 - 批次数据仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 对齐: schema lot 表
// ==========================================

use crate::domain::lot::{ChemistrySnapshot, Lot, LotFilter, LotPatch};
use crate::domain::types::LotStatus;
use crate::repository::db_utils::{fmt_date, fmt_timestamp, parse_date, parse_timestamp};
use crate::repository::error::{StoreError, StoreResult};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, ToSql};
use std::sync::{Arc, Mutex};

const LOT_COLUMNS: &str = "lot_id, winery_id, name, status, volume_gal, vintage_year, varietal, \
     appellation, block_id, harvest_date, press_date, yeast_strain, \
     ph, ta_g_l, va_g_l, free_so2_ppm, alcohol_pct, \
     parent_lot_id, container_id, notes, created_at, updated_at";

// 行中间结构: 闭包内只取原始列,枚举/日期在外层解析
struct LotRow {
    lot_id: String,
    winery_id: String,
    name: String,
    status: String,
    volume_gal: f64,
    vintage_year: i32,
    varietal: String,
    appellation: Option<String>,
    block_id: Option<String>,
    harvest_date: Option<String>,
    press_date: Option<String>,
    yeast_strain: Option<String>,
    ph: Option<f64>,
    ta_g_l: Option<f64>,
    va_g_l: Option<f64>,
    free_so2_ppm: Option<f64>,
    alcohol_pct: Option<f64>,
    parent_lot_id: Option<String>,
    container_id: Option<String>,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LotRow> {
    Ok(LotRow {
        lot_id: row.get(0)?,
        winery_id: row.get(1)?,
        name: row.get(2)?,
        status: row.get(3)?,
        volume_gal: row.get(4)?,
        vintage_year: row.get(5)?,
        varietal: row.get(6)?,
        appellation: row.get(7)?,
        block_id: row.get(8)?,
        harvest_date: row.get(9)?,
        press_date: row.get(10)?,
        yeast_strain: row.get(11)?,
        ph: row.get(12)?,
        ta_g_l: row.get(13)?,
        va_g_l: row.get(14)?,
        free_so2_ppm: row.get(15)?,
        alcohol_pct: row.get(16)?,
        parent_lot_id: row.get(17)?,
        container_id: row.get(18)?,
        notes: row.get(19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

fn hydrate(raw: LotRow) -> StoreResult<Lot> {
    let status = LotStatus::from_db_str(&raw.status).ok_or_else(|| StoreError::FieldValueError {
        field: "status".to_string(),
        message: format!("未知批次状态: {}", raw.status),
    })?;

    Ok(Lot {
        lot_id: raw.lot_id,
        winery_id: raw.winery_id,
        name: raw.name,
        status,
        volume_gal: raw.volume_gal,
        vintage_year: raw.vintage_year,
        varietal: raw.varietal,
        appellation: raw.appellation,
        block_id: raw.block_id,
        harvest_date: parse_date(raw.harvest_date, "harvest_date")?,
        press_date: parse_date(raw.press_date, "press_date")?,
        yeast_strain: raw.yeast_strain,
        chemistry: ChemistrySnapshot {
            ph: raw.ph,
            ta_g_l: raw.ta_g_l,
            va_g_l: raw.va_g_l,
            free_so2_ppm: raw.free_so2_ppm,
            alcohol_pct: raw.alcohol_pct,
        },
        parent_lot_id: raw.parent_lot_id,
        container_id: raw.container_id,
        notes: raw.notes,
        created_at: parse_timestamp(&raw.created_at, "created_at")?,
        updated_at: parse_timestamp(&raw.updated_at, "updated_at")?,
    })
}

// ==========================================
// LotRepository - 批次仓储
// ==========================================
pub struct LotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LotRepository {
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

    /// 插入批次
    pub fn insert(&self, lot: &Lot) -> StoreResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO lot (
                lot_id, winery_id, name, status, volume_gal, vintage_year, varietal,
                appellation, block_id, harvest_date, press_date, yeast_strain,
                ph, ta_g_l, va_g_l, free_so2_ppm, alcohol_pct,
                parent_lot_id, container_id, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                lot.lot_id,
                lot.winery_id,
                lot.name,
                lot.status.to_db_str(),
                lot.volume_gal,
                lot.vintage_year,
                lot.varietal,
                lot.appellation,
                lot.block_id,
                fmt_date(&lot.harvest_date),
                fmt_date(&lot.press_date),
                lot.yeast_strain,
                lot.chemistry.ph,
                lot.chemistry.ta_g_l,
                lot.chemistry.va_g_l,
                lot.chemistry.free_so2_ppm,
                lot.chemistry.alcohol_pct,
                lot.parent_lot_id,
                lot.container_id,
                lot.notes,
                fmt_timestamp(&lot.created_at),
                fmt_timestamp(&lot.updated_at),
            ],
        )?;

        Ok(())
    }

    /// 按补丁更新批次 (只更新补丁中 Some 的字段)
    ///
    /// # 返回
    /// - Ok(()): 更新成功
    /// - Err(NotFound): 批次不存在
    pub fn update(&self, lot_id: &str, patch: &LotPatch) -> StoreResult<()> {
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
        if let Some(volume) = patch.volume_gal {
            sets.push("volume_gal = ?");
            values.push(Box::new(volume));
        }
        if let Some(ref container_id) = patch.container_id {
            sets.push("container_id = ?");
            values.push(Box::new(container_id.clone()));
        }
        if let Some(chemistry) = patch.chemistry {
            sets.push("ph = ?");
            values.push(Box::new(chemistry.ph));
            sets.push("ta_g_l = ?");
            values.push(Box::new(chemistry.ta_g_l));
            sets.push("va_g_l = ?");
            values.push(Box::new(chemistry.va_g_l));
            sets.push("free_so2_ppm = ?");
            values.push(Box::new(chemistry.free_so2_ppm));
            sets.push("alcohol_pct = ?");
            values.push(Box::new(chemistry.alcohol_pct));
        }
        if let Some(ref notes) = patch.notes {
            sets.push("notes = ?");
            values.push(Box::new(notes.clone()));
        }

        sets.push("updated_at = ?");
        values.push(Box::new(fmt_timestamp(&Utc::now())));
        values.push(Box::new(lot_id.to_string()));

        let sql = format!("UPDATE lot SET {} WHERE lot_id = ?", sets.join(", "));

        let conn = self.get_conn()?;
        let rows = conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;

        if rows == 0 {
            return Err(StoreError::NotFound {
                entity: "Lot".to_string(),
                id: lot_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 ID 查询批次
    pub fn find_by_id(&self, lot_id: &str) -> StoreResult<Option<Lot>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!("SELECT {} FROM lot WHERE lot_id = ?1", LOT_COLUMNS))?;
        let mut rows = stmt.query_map(params![lot_id], read_row)?;

        match rows.next() {
            Some(raw) => Ok(Some(hydrate(raw?)?)),
            None => Ok(None),
        }
    }

    /// 按过滤器查询批次列表
    pub fn list(&self, filter: &LotFilter) -> StoreResult<Vec<Lot>> {
        let mut sql = format!(
            "SELECT {} FROM lot WHERE winery_id = ?",
            LOT_COLUMNS
        );
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(filter.winery_id.clone())];

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            values.push(Box::new(status.to_db_str().to_string()));
        }
        if let Some(vintage) = filter.vintage_year {
            sql.push_str(" AND vintage_year = ?");
            values.push(Box::new(vintage));
        }
        if let Some(ref varietal) = filter.varietal {
            sql.push_str(" AND varietal = ?");
            values.push(Box::new(varietal.clone()));
        }
        if let Some(ref parent) = filter.parent_lot_id {
            sql.push_str(" AND parent_lot_id = ?");
            values.push(Box::new(parent.clone()));
        }
        sql.push_str(" ORDER BY created_at, lot_id");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter().map(|v| v.as_ref())), read_row)?;

        let mut result = Vec::new();
        for raw in rows {
            result.push(hydrate(raw?)?);
        }
        Ok(result)
    }
}
