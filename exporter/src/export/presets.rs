//! Built-in export presets.
//!
//! Both presets target milk and dairy products; they differ in the domain
//! queried and in the display flags their reports were built with.

use crate::error::{ExportError, ExportResult};

/// Production of crops and livestock products.
pub const PRODUCTION_DOMAIN: &str = "QCL";

/// Producer prices.
pub const PRICES_DOMAIN: &str = "PP";

pub const PRODUCTION_ITEMS: &[&str] = &[
    "Raw milk of cattle",
    "Butter of cow milk",
    "Ghee from cow milk",
    "Skim milk of cows",
    "Whole milk, condensed",
    "Whole milk, evaporated",
    "Skim milk, evaporated",
    "Skim milk, condensed",
    "Whole milk powder",
    "Skim milk and whey powder",
    "Buttermilk, dry",
    "Cheese from whole cow milk",
    "Cheese from skimmed cow milk",
    "Raw milk of buffalo",
    "Butter of buffalo milk",
    "Ghee from buffalo milk",
    "Cheese from milk of buffalo, fresh or processed",
    "Raw milk of sheep",
    "Butter and ghee of sheep milk",
    "Cheese from milk of sheep, fresh or processed",
    "Raw milk of goats",
    "Cheese from milk of goats, fresh or processed",
    "Butter of goat milk",
    "Raw milk of camel",
];

pub const PRICE_ITEMS: &[&str] = &[
    "Raw milk of cattle",
    "Raw milk of buffalo",
    "Raw milk of camel",
    "Raw milk of goats",
    "Raw milk of sheep",
];

/// Inclusive year range
pub const PRODUCTION_YEARS: (i32, i32) = (2014, 2023);
pub const PRICE_YEARS: (i32, i32) = (2015, 2024);

pub const PRODUCTION_TEMPLATE: &str = "faostat_data_{dataset}_{describe}_at_{timestamp}.csv";
pub const PRICES_TEMPLATE: &str = "faostat_prices_{n_items}items_{n_years}years_{timestamp}.csv";

/// Widest range `parse_years` accepts; FAOSTAT series start in 1961.
pub const MAX_YEAR_SPAN: i64 = 200;

/// Expand an inclusive `(first, last)` range.
pub fn year_range((first, last): (i32, i32)) -> Vec<i32> {
    (first..=last).collect()
}

/// Parse a year selection: `2014-2023`, `2015,2017,2019`, or `2020`.
///
/// Ranges are inclusive; list entries may themselves be ranges.
pub fn parse_years(input: &str) -> ExportResult<Vec<i32>> {
    let invalid = |message: String| ExportError::InvalidRequest(message);
    let parse_year = |raw: &str| {
        raw.trim()
            .parse::<i32>()
            .map_err(|_| invalid(format!("invalid year '{}'", raw.trim())))
    };

    let mut years = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((first, last)) => {
                let (first, last) = (parse_year(first)?, parse_year(last)?);
                if first > last {
                    return Err(invalid(format!("year range '{}' is reversed", part)));
                }
                if i64::from(last) - i64::from(first) >= MAX_YEAR_SPAN {
                    return Err(invalid(format!(
                        "year range '{}' spans more than {} years",
                        part, MAX_YEAR_SPAN
                    )));
                }
                years.extend(year_range((first, last)));
            }
            None => years.push(parse_year(part)?),
        }
    }

    if years.is_empty() {
        return Err(invalid("no years given".to_string()));
    }
    Ok(years)
}
