//! Header names of the raw delivery extract.

use crate::schema::HeaderReport;

pub const ORDER_ID: &str = "Order_ID";
pub const ORDER_DATE: &str = "Order_Date";
pub const DELIVERY_TIME: &str = "Delivery_Time";
pub const AGENT_RATING: &str = "Agent_Rating";
pub const AREA: &str = "Area";
pub const WEATHER: &str = "Weather";
pub const CATEGORY: &str = "Category";

/// Columns the cleaner and the analysis queries depend on
pub const REQUIRED_COLUMNS: [&str; 7] = [
    ORDER_ID,
    ORDER_DATE,
    DELIVERY_TIME,
    AGENT_RATING,
    AREA,
    WEATHER,
    CATEGORY,
];

/// Columns carried through to the store when present
pub const OPTIONAL_COLUMNS: [&str; 9] = [
    "Agent_Age",
    "Store_Latitude",
    "Store_Longitude",
    "Drop_Latitude",
    "Drop_Longitude",
    "Order_Time",
    "Pickup_Time",
    "Traffic",
    "Vehicle",
];

/// Normalise a header cell so `order_id`, `Order_ID` and ` ORDER_ID ` compare equal
fn normalise(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

/// Compare a header row against the known columns
///
/// Matching is case-insensitive and ignores surrounding whitespace and a
/// leading byte-order mark.
#[must_use]
pub fn check_header<'a, I>(header: I) -> HeaderReport
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<String> = header.into_iter().map(normalise).collect();
    let has = |column: &str| present.iter().any(|h| *h == normalise(column));

    let missing_required = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !has(c))
        .map(|c| (*c).to_string())
        .collect();
    let missing_optional = OPTIONAL_COLUMNS
        .iter()
        .filter(|c| !has(c))
        .map(|c| (*c).to_string())
        .collect();
    let ignored = present
        .iter()
        .filter(|h| {
            !REQUIRED_COLUMNS
                .iter()
                .chain(OPTIONAL_COLUMNS.iter())
                .any(|c| normalise(c) == **h)
        })
        .cloned()
        .collect();

    HeaderReport {
        missing_required,
        missing_optional,
        ignored,
    }
}
