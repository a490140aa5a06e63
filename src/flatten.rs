use crate::types::{Province, RegionRow};

// One province-only row per province, one city row per city, one full row
// per leaf, in exact depth-first document order. Pure; a well-formed tree
// cannot fail.
pub fn flatten(provinces: &[Province]) -> Vec<RegionRow> {
    let mut rows = Vec::new();

    for province in provinces {
        rows.push(RegionRow {
            province_code: province.code,
            province_name: province.name.clone(),
            city_code: 0,
            city_name: String::new(),
            region_code: 0,
            region_name: String::new(),
        });

        for city in &province.cities {
            rows.push(RegionRow {
                province_code: province.code,
                province_name: province.name.clone(),
                city_code: city.code,
                city_name: city.name.clone(),
                region_code: 0,
                region_name: String::new(),
            });

            for leaf in &city.counties {
                rows.push(RegionRow {
                    province_code: province.code,
                    province_name: province.name.clone(),
                    city_code: city.code,
                    city_name: city.name.clone(),
                    region_code: leaf.code,
                    region_name: leaf.name.clone(),
                });
            }
        }
    }

    rows
}
