//! Product naming

use chrono::{DateTime, Utc};

/// Prefix shared by every burned area product
pub const PRODUCT_PREFIX: &str = "S2_BURNED_AREA";

/// Product identifier built from both acquisition dates, pre-event first:
/// `S2_BURNED_AREA_<YYYYMMDD>_<YYYYMMDD>`.
pub fn output_name(pre: &DateTime<Utc>, post: &DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        PRODUCT_PREFIX,
        pre.format("%Y%m%d"),
        post.format("%Y%m%d")
    )
}
