// ==========================================
// 酒庄酒窖管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// MaintenanceThresholds - 维护阈值
// ==========================================
// 默认值对齐酒窖惯例: 添桶 30/45 天,换桶 4 次装桶或 5 年桶龄
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceThresholds {
    pub topping_due_days: i64,          // 添桶到期天数
    pub topping_urgent_days: i64,       // 添桶紧急天数
    pub replacement_fill_threshold: i32, // 换桶评估: 累计装桶次数
    pub replacement_age_years: i64,     // 换桶评估: 桶龄 (年)
}

impl Default for MaintenanceThresholds {
    fn default() -> Self {
        Self {
            topping_due_days: 30,
            topping_urgent_days: 45,
            replacement_fill_threshold: 4,
            replacement_age_years: 5,
        }
    }
}

// 配置键
const KEY_TOPPING_DUE_DAYS: &str = "maintenance/topping_due_days";
const KEY_TOPPING_URGENT_DAYS: &str = "maintenance/topping_urgent_days";
const KEY_REPLACEMENT_FILL_THRESHOLD: &str = "maintenance/replacement_fill_threshold";
const KEY_REPLACEMENT_AGE_YEARS: &str = "maintenance/replacement_age_years";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置值 (UPSERT)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT (scope_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取数值配置,缺失或不可解析时用默认值
    fn get_i64_or(&self, key: &str, default: i64) -> Result<i64, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(default))
    }

    /// 读取维护阈值 (带默认值)
    pub fn maintenance_thresholds(&self) -> Result<MaintenanceThresholds, Box<dyn Error>> {
        let defaults = MaintenanceThresholds::default();
        Ok(MaintenanceThresholds {
            topping_due_days: self.get_i64_or(KEY_TOPPING_DUE_DAYS, defaults.topping_due_days)?,
            topping_urgent_days: self
                .get_i64_or(KEY_TOPPING_URGENT_DAYS, defaults.topping_urgent_days)?,
            replacement_fill_threshold: self.get_i64_or(
                KEY_REPLACEMENT_FILL_THRESHOLD,
                defaults.replacement_fill_threshold as i64,
            )? as i32,
            replacement_age_years: self
                .get_i64_or(KEY_REPLACEMENT_AGE_YEARS, defaults.replacement_age_years)?,
        })
    }
}
