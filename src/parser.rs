use crate::policy::LeafLevel;
use crate::types::{City, County, Province, PublishRecord};

use scraper::{ElementRef, Html, Selector};

// Character offset of the name column in a flattened row text. The code
// column is always padded to 12 digits on the source pages. Counted in
// characters, not bytes: names are CJK.
pub const NAME_OFFSET: usize = 12;

// Minimum row-text length in characters for city and leaf rows.
pub const MIN_ROW_CHARS: usize = 13;

pub const CITY_CODE_WIDTH: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("row text too short: {len} chars, need at least {min}")]
    MalformedRow { len: usize, min: usize },
    #[error("non-numeric code field: {0}")]
    InvalidCode(String),
    #[error("invalid province href: {0}")]
    InvalidHref(String),
    #[error("anchor has no href attribute")]
    MissingLink,
    #[error("publish record has no date label")]
    MissingDate,
    #[error("no matches for selector: {0}")]
    SelectorMiss(&'static str),
}

// Slices one row's flattened text into a numeric code and a name. Both
// widths are character counts; no partial result on failure.
pub fn parse_region_row(
    row_text: &str,
    code_width: usize,
    min_len: usize,
) -> Result<(u32, String), ParseError> {
    let len = row_text.chars().count();
    if len < min_len {
        return Err(ParseError::MalformedRow { len, min: min_len });
    }

    let code_field: String = row_text.chars().take(code_width).collect();
    let code = code_field
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidCode(code_field))?;

    let name: String = row_text.chars().skip(NAME_OFFSET).collect();
    Ok((code, name))
}

// Leaf page link from the leaf's code digits: first two, next two, then
// the full code, as path segments. Width 6 for county pages, 9 for towns.
pub fn derive_leaf_link(prefix_url: &str, code: u32, width: usize) -> String {
    let digits = format!("{code:0width$}");
    format!("{prefix_url}{}/{}/{}.html", &digits[..2], &digits[2..4], digits)
}

// Strips the trailing file segment from a release link, leaving the path
// prefix every downstream href is appended to.
pub fn prefix_of(link: &str) -> String {
    match link.rfind('/') {
        Some(i) => link[..=i].to_string(),
        None => format!("{link}/"),
    }
}

fn join_url(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{base}{href}")
    }
}

// Whitespace-collapsed text of one table row. Cell boundaries carry no
// meaning; code and name are recovered by character offset.
fn row_text(row: ElementRef) -> String {
    row.text().flat_map(str::split_whitespace).collect()
}

pub fn parse_publish_records(html: &str, base_url: &str) -> Result<Vec<PublishRecord>, ParseError> {
    let document = Html::parse_document(html);
    let anchor_selector =
        Selector::parse("div.center div.center_list ul.center_list_contlist li a").unwrap();
    let date_selector = Selector::parse("span font.cont_tit02").unwrap();

    let mut records = Vec::new();

    for anchor in document.select(&anchor_selector) {
        let href = anchor.value().attr("href").ok_or(ParseError::MissingLink)?;
        if href.is_empty() {
            return Err(ParseError::MissingLink);
        }

        let date: String = anchor
            .select(&date_selector)
            .next()
            .map(|elem| elem.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        if date.is_empty() {
            return Err(ParseError::MissingDate);
        }

        records.push(PublishRecord {
            date,
            link: join_url(base_url, href),
        });
    }

    if records.is_empty() {
        return Err(ParseError::SelectorMiss("ul.center_list_contlist li a"));
    }

    Ok(records)
}

// The province code comes from the anchor's href ("11.html" → 11), not
// from the row text. Cells without an anchor are the end-of-table marker.
pub fn parse_province_rows(html: &str, prefix_url: &str) -> Result<Vec<Province>, ParseError> {
    let document = Html::parse_document(html);
    let cell_selector = Selector::parse("tr.provincetr td").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();

    let mut provinces = Vec::new();

    for cell in document.select(&cell_selector) {
        let Some(anchor) = cell.select(&anchor_selector).next() else {
            continue;
        };
        let href = anchor.value().attr("href").ok_or(ParseError::MissingLink)?;

        let code_field: String = href.chars().take(2).collect();
        if code_field.chars().count() < 2 {
            return Err(ParseError::InvalidHref(href.to_string()));
        }
        let code = code_field
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidHref(href.to_string()))?;

        provinces.push(Province {
            code,
            name: anchor.text().collect::<String>().trim().to_string(),
            link: join_url(prefix_url, href),
            cities: Vec::new(),
        });
    }

    // The entry page always lists provinces; none at all means an error
    // page or a layout change, and must not flow through as an empty crawl.
    if provinces.is_empty() {
        return Err(ParseError::SelectorMiss("tr.provincetr"));
    }

    Ok(provinces)
}

// A row without an anchor, or with a non-numeric code field, is the table
// terminator; a too-short row is corrupt input and fails the whole parse.
pub fn parse_city_rows(html: &str, prefix_url: &str) -> Result<Vec<City>, ParseError> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table.citytable tr.citytr").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();

    let mut cities = Vec::new();

    for row in document.select(&row_selector) {
        let Some(anchor) = row.select(&anchor_selector).next() else {
            log::debug!("city row without anchor, ending scan");
            break;
        };
        let href = anchor.value().attr("href").ok_or(ParseError::MissingLink)?;

        let text = row_text(row);
        match parse_region_row(&text, CITY_CODE_WIDTH, MIN_ROW_CHARS) {
            Ok((code, name)) => cities.push(City {
                code,
                name,
                link: join_url(prefix_url, href),
                counties: Vec::new(),
            }),
            Err(ParseError::InvalidCode(field)) => {
                log::debug!("non-numeric city code field {field:?}, ending scan");
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(cities)
}

// Leaf links are derived from the code digits, not read from the page.
pub fn parse_leaf_rows(
    html: &str,
    prefix_url: &str,
    level: LeafLevel,
) -> Result<Vec<County>, ParseError> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse(level.row_selector()).unwrap();

    let mut leaves = Vec::new();

    for row in document.select(&row_selector) {
        let text = row_text(row);
        let (code, name) = parse_region_row(&text, level.code_width(), MIN_ROW_CHARS)?;
        leaves.push(County {
            code,
            name,
            link: derive_leaf_link(prefix_url, code, level.code_width()),
        });
    }

    Ok(leaves)
}
