use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub date: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub code: u32,
    pub name: String,
    #[serde(skip)]
    pub link: String,
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub code: u32,
    pub name: String,
    #[serde(skip)]
    pub link: String,
    pub counties: Vec<County>,
}

// Third-level node: a county, or a town where the owning city skips the
// county level entirely (see policy::leaf_level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct County {
    pub code: u32,
    pub name: String,
    #[serde(skip)]
    pub link: String,
}

// One denormalized row per path through the hierarchy. city_code == 0
// (with an empty name) marks a province-only row, region_code == 0 a
// province+city row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRow {
    pub province_code: u32,
    pub province_name: String,
    pub city_code: u32,
    pub city_name: String,
    pub region_code: u32,
    pub region_name: String,
}

// Run receipt for a completed export: when we ran, which release we
// captured, where the bundle ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRecord {
    pub update_time: String,
    pub update_at: String,
    pub down_url: String,
}

impl FetchRecord {
    pub fn new(update_at: impl Into<String>, down_url: impl Into<String>) -> Self {
        Self {
            update_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            update_at: update_at.into(),
            down_url: down_url.into(),
        }
    }
}
