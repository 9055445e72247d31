// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use winery_cellar_ops::domain::types::{ContainerStatus, ContainerType, LotStatus};
use winery_cellar_ops::domain::{ContainerDraft, LotDraft};

// ==========================================
// LotDraft 构建器
// ==========================================

pub struct LotBuilder {
    name: String,
    status: LotStatus,
    volume_gal: f64,
    vintage_year: i32,
    varietal: String,
    press_date: Option<NaiveDate>,
    yeast_strain: Option<String>,
    ph: Option<f64>,
}

impl LotBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: LotStatus::Pressed,
            volume_gal: 0.0,
            vintage_year: 2025,
            varietal: "Syrah".to_string(),
            press_date: None,
            yeast_strain: None,
            ph: None,
        }
    }

    pub fn status(mut self, status: LotStatus) -> Self {
        self.status = status;
        self
    }

    pub fn volume(mut self, volume_gal: f64) -> Self {
        self.volume_gal = volume_gal;
        self
    }

    pub fn varietal(mut self, varietal: &str) -> Self {
        self.varietal = varietal.to_string();
        self
    }

    pub fn vintage(mut self, year: i32) -> Self {
        self.vintage_year = year;
        self
    }

    pub fn press_date(mut self, date: NaiveDate) -> Self {
        self.press_date = Some(date);
        self
    }

    pub fn yeast(mut self, strain: &str) -> Self {
        self.yeast_strain = Some(strain.to_string());
        self
    }

    pub fn ph(mut self, ph: f64) -> Self {
        self.ph = Some(ph);
        self
    }

    pub fn build(self, winery_id: &str) -> LotDraft {
        let mut draft = LotDraft::new(winery_id, &self.name, self.vintage_year, &self.varietal);
        draft.status = self.status;
        draft.volume_gal = self.volume_gal;
        draft.press_date = self.press_date;
        draft.yeast_strain = self.yeast_strain;
        draft.chemistry.ph = self.ph;
        draft
    }
}

// ==========================================
// ContainerDraft 构建器
// ==========================================

pub struct ContainerBuilder {
    name: String,
    container_type: ContainerType,
    capacity_gal: f64,
    status: ContainerStatus,
    purchase_date: Option<NaiveDate>,
}

impl ContainerBuilder {
    pub fn barrel(name: &str) -> Self {
        Self {
            name: name.to_string(),
            container_type: ContainerType::Barrel,
            capacity_gal: 60.0,
            status: ContainerStatus::Empty,
            purchase_date: None,
        }
    }

    pub fn tank(name: &str, capacity_gal: f64) -> Self {
        Self {
            name: name.to_string(),
            container_type: ContainerType::Tank,
            capacity_gal,
            status: ContainerStatus::Empty,
            purchase_date: None,
        }
    }

    pub fn capacity(mut self, capacity_gal: f64) -> Self {
        self.capacity_gal = capacity_gal;
        self
    }

    pub fn status(mut self, status: ContainerStatus) -> Self {
        self.status = status;
        self
    }

    pub fn purchased(mut self, date: NaiveDate) -> Self {
        self.purchase_date = Some(date);
        self
    }

    pub fn build(self, winery_id: &str) -> ContainerDraft {
        let mut draft =
            ContainerDraft::new(winery_id, &self.name, self.container_type, self.capacity_gal);
        draft.status = self.status;
        draft.purchase_date = self.purchase_date;
        draft
    }
}
