use crate::types::Province;

// Cities whose pages skip the county level and list town rows directly.
// A closed enumeration observed on the source site, not inferred from
// page structure.
pub const TOWN_LEVEL_CITIES: [&str; 3] = ["东莞市", "中山市", "儋州市"];

// Shape of the third crawl level for one city.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafLevel {
    County,
    Town,
}

impl LeafLevel {
    pub fn row_selector(self) -> &'static str {
        match self {
            LeafLevel::County => "table.countytable tr.countytr",
            LeafLevel::Town => "table.towntable tr.towntr",
        }
    }

    // Code field width in characters; doubles as the path width of the
    // derived leaf link (11/01/110101.html vs 44/19/441900003.html).
    pub fn code_width(self) -> usize {
        match self {
            LeafLevel::County => 6,
            LeafLevel::Town => 9,
        }
    }
}

pub fn leaf_level(city_name: &str) -> LeafLevel {
    if TOWN_LEVEL_CITIES.contains(&city_name) {
        LeafLevel::Town
    } else {
        LeafLevel::County
    }
}

// Regions the source site never lists: Taiwan and the two special
// administrative regions. Appended after the crawl with hard-coded codes
// and empty links. Kept separate from TOWN_LEVEL_CITIES.
pub fn supplemental_provinces() -> Vec<Province> {
    [(71, "台湾省"), (81, "香港特别行政区"), (82, "澳门特别行政区")]
        .into_iter()
        .map(|(code, name)| Province {
            code,
            name: name.to_string(),
            link: String::new(),
            cities: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomalous_cities_use_the_town_parser() {
        assert_eq!(leaf_level("东莞市"), LeafLevel::Town);
        assert_eq!(leaf_level("中山市"), LeafLevel::Town);
        assert_eq!(leaf_level("儋州市"), LeafLevel::Town);
    }

    #[test]
    fn test_other_cities_use_the_county_parser() {
        assert_eq!(leaf_level("广州市"), LeafLevel::County);
        assert_eq!(leaf_level("北京市市辖区"), LeafLevel::County);
        assert_eq!(leaf_level(""), LeafLevel::County);
    }

    #[test]
    fn test_leaf_levels_describe_their_row_shape() {
        assert_eq!(LeafLevel::County.code_width(), 6);
        assert_eq!(LeafLevel::Town.code_width(), 9);
        assert!(LeafLevel::County.row_selector().contains("countytr"));
        assert!(LeafLevel::Town.row_selector().contains("towntr"));
    }

    #[test]
    fn test_supplemental_provinces_have_fixed_codes_and_empty_links() {
        let extra = supplemental_provinces();

        let codes: Vec<u32> = extra.iter().map(|p| p.code).collect();
        assert_eq!(codes, vec![71, 81, 82]);
        assert!(extra.iter().all(|p| p.link.is_empty()));
        assert!(extra.iter().all(|p| p.cities.is_empty()));
    }

    // The supplemental list and the anomaly set come from different
    // observed variants of the source data; they stay independent until
    // the upstream ambiguity is resolved.
    #[test]
    fn test_supplemental_list_is_independent_of_anomaly_set() {
        for province in supplemental_provinces() {
            assert_eq!(leaf_level(&province.name), LeafLevel::County);
            assert!(!TOWN_LEVEL_CITIES.contains(&province.name.as_str()));
        }
    }
}
