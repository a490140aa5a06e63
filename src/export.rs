use crate::types::{Province, RegionRow};

use deunicode::deunicode;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("city {city_code} has no county rows")]
    DataIncomplete { city_code: u32 },
}

// Persistence seam. The crawl core never touches a database; a caller
// that wants relational storage implements this and receives plain data.
pub trait RegionStore {
    fn save(&mut self, rows: &[RegionRow]) -> Result<(), ExportError>;
}

pub fn write_json_tree(path: &Path, provinces: &[Province]) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(provinces)?;
    std::fs::write(path, json)?;
    Ok(())
}

// Every city row must have at least one leaf row. Provinces without
// cities (the supplemental regions) are allowed.
pub fn verify_integrity(rows: &[RegionRow]) -> Result<(), ExportError> {
    for row in rows {
        if row.city_code != 0 && row.region_code == 0 {
            let has_leaf = rows
                .iter()
                .any(|r| r.city_code == row.city_code && r.region_code != 0);
            if !has_leaf {
                return Err(ExportError::DataIncomplete {
                    city_code: row.city_code,
                });
            }
        }
    }
    Ok(())
}

// province.csv, city.csv and county.csv zipped together. Verifies
// integrity first; an incomplete hierarchy produces no bundle at all.
pub fn csv_bundle(rows: &[RegionRow]) -> Result<Vec<u8>, ExportError> {
    verify_integrity(rows)?;

    let mut province_rows = vec![vec![
        "province_id".to_string(),
        "province_name".to_string(),
        "first_letter".to_string(),
    ]];
    let mut city_rows = vec![vec![
        "city_id".to_string(),
        "city_name".to_string(),
        "parent_id".to_string(),
    ]];
    let mut county_rows = vec![vec![
        "county_id".to_string(),
        "county_name".to_string(),
        "parent_id".to_string(),
    ]];

    for row in rows {
        if row.city_code == 0 {
            province_rows.push(vec![
                row.province_code.to_string(),
                row.province_name.clone(),
                first_letter(&row.province_name),
            ]);
        } else if row.region_code == 0 {
            city_rows.push(vec![
                row.city_code.to_string(),
                row.city_name.clone(),
                row.province_code.to_string(),
            ]);
        } else {
            county_rows.push(vec![
                row.region_code.to_string(),
                row.region_name.clone(),
                row.city_code.to_string(),
            ]);
        }
    }

    let files = [
        ("province.csv", csv_bytes(&province_rows)?),
        ("city.csv", csv_bytes(&city_rows)?),
        ("county.csv", csv_bytes(&county_rows)?),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in files {
        writer.start_file(name, options)?;
        writer.write_all(&data)?;
    }
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

fn csv_bytes(rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::other(e.to_string())))
}

// First ASCII letter of the transliterated name, uppercase: 北京市
// transliterates as "Bei Jing Shi", so its letter is B.
fn first_letter(name: &str) -> String {
    deunicode(name)
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::types::{City, County};
    use std::io::Read;

    fn sample_rows() -> Vec<RegionRow> {
        flatten(&[Province {
            code: 11,
            name: "北京市".to_string(),
            link: String::new(),
            cities: vec![City {
                code: 1101,
                name: "市辖区".to_string(),
                link: String::new(),
                counties: vec![County {
                    code: 110101,
                    name: "东城区".to_string(),
                    link: String::new(),
                }],
            }],
        }])
    }

    #[test]
    fn test_integrity_accepts_full_hierarchy_and_childless_provinces() {
        let mut rows = sample_rows();
        rows.push(RegionRow {
            province_code: 81,
            province_name: "香港特别行政区".to_string(),
            city_code: 0,
            city_name: String::new(),
            region_code: 0,
            region_name: String::new(),
        });

        assert!(verify_integrity(&rows).is_ok());
    }

    #[test]
    fn test_integrity_rejects_city_without_leaves() {
        let mut rows = sample_rows();
        rows.push(RegionRow {
            province_code: 11,
            province_name: "北京市".to_string(),
            city_code: 1102,
            city_name: "空城".to_string(),
            region_code: 0,
            region_name: String::new(),
        });

        let err = verify_integrity(&rows).unwrap_err();
        assert!(matches!(err, ExportError::DataIncomplete { city_code: 1102 }));
    }

    #[test]
    fn test_bundle_refuses_incomplete_data() {
        let rows = vec![
            RegionRow {
                province_code: 44,
                province_name: "广东省".to_string(),
                city_code: 0,
                city_name: String::new(),
                region_code: 0,
                region_name: String::new(),
            },
            RegionRow {
                province_code: 44,
                province_name: "广东省".to_string(),
                city_code: 4419,
                city_name: "东莞市".to_string(),
                region_code: 0,
                region_name: String::new(),
            },
        ];

        assert!(csv_bundle(&rows).is_err());
    }

    #[test]
    fn test_bundle_contains_three_csv_tables() {
        let data = csv_bundle(&sample_rows()).expect("build bundle");

        let mut archive = zip::ZipArchive::new(Cursor::new(data)).expect("open zip");
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["city.csv", "county.csv", "province.csv"]);

        let mut province_csv = String::new();
        archive
            .by_name("province.csv")
            .unwrap()
            .read_to_string(&mut province_csv)
            .unwrap();
        assert!(province_csv.starts_with("province_id,province_name,first_letter"));
        assert!(province_csv.contains("11,北京市,B"));

        let mut county_csv = String::new();
        archive
            .by_name("county.csv")
            .unwrap()
            .read_to_string(&mut county_csv)
            .unwrap();
        assert!(county_csv.starts_with("county_id,county_name,parent_id"));
        assert!(county_csv.contains("110101,东城区,1101"));
    }

    #[test]
    fn test_first_letter_transliterates_cjk_names() {
        assert_eq!(first_letter("北京市"), "B");
        assert_eq!(first_letter("上海市"), "S");
        assert_eq!(first_letter(""), "");
    }

    #[test]
    fn test_json_tree_round_trips_without_links() {
        let path = std::env::temp_dir().join("qhdm_tree_test.json");
        let provinces = vec![Province {
            code: 11,
            name: "北京市".to_string(),
            link: "http://example/11.html".to_string(),
            cities: Vec::new(),
        }];

        write_json_tree(&path, &provinces).expect("write tree");
        let json = std::fs::read_to_string(&path).expect("read back");
        std::fs::remove_file(&path).ok();

        assert!(json.contains("北京市"));
        assert!(!json.contains("link"));
        let parsed: Vec<Province> = serde_json::from_str(&json).expect("parse back");
        assert_eq!(parsed[0].code, 11);
        assert!(parsed[0].link.is_empty());
    }

    #[test]
    fn test_region_store_receives_flattened_rows() {
        struct MemoryStore(Vec<RegionRow>);
        impl RegionStore for MemoryStore {
            fn save(&mut self, rows: &[RegionRow]) -> Result<(), ExportError> {
                self.0.extend_from_slice(rows);
                Ok(())
            }
        }

        let mut store = MemoryStore(Vec::new());
        store.save(&sample_rows()).expect("save rows");
        assert_eq!(store.0.len(), 3);
        assert_eq!(store.0[2].region_code, 110101);
    }
}
