//! The device search form
//!
//! PhoneDB's search is a single POST form carrying every filter it offers.
//! Only brand, release window, and result offset vary between requests; the
//! remaining fields are sent with the values the site's own form submits.

use crate::config::SiteConfig;
use chrono::{Duration, NaiveDate};

/// Filters sent with fixed values
const FIXED_FIELDS: &[(&str, &str)] = &[
    ("cat", "131"),
    ("os_family", "1"),
    ("ram_type", "1"),
    ("d_type", "0"),
    ("p_dual", "0"),
    ("ts", "0"),
    ("tp", "0"),
    ("kb", "0"),
    ("usb_c", "0"),
    ("bt", "0"),
    ("radio_rx", "0"),
    ("c_flash", "0"),
    ("cd_sensor", "0"),
    ("c2_flash", "0"),
    ("b_build", "0"),
];

/// Range and multi-select filters left open; `[]` fields are sent as "0"
const OPEN_FIELDS: &[&str] = &[
    "width_min",
    "width_max",
    "height_min",
    "height_max",
    "depth_min",
    "depth_max",
    "depth_i_min",
    "depth_i_max",
    "mass_min",
    "mass_max",
    "mass_oz_min",
    "mass_oz_max",
    "sw_e[]",
    "cpu_clk_min",
    "cpu_clk_max",
    "ram_cap_min",
    "ram_cap_max",
    "ram_cap_b",
    "rom_cap_min",
    "rom_cap_max",
    "rom_cap_b",
    "d_diag_i_min",
    "d_diag_i_max",
    "d_res",
    "d_px_min",
    "d_px_max",
    "d_py_min",
    "d_py_max",
    "gpu_clk_min",
    "gpu_clk_max",
    "p_r[]",
    "exp[]",
    "wlan[]",
    "nfc[]",
    "gps[]",
    "gps_e[]",
    "c_px_min",
    "c_px_max",
    "c_py_min",
    "c_py_max",
    "c_focus[]",
    "c_vres",
    "c_e[]",
    "c2_pn",
    "c2_focus[]",
    "b_cap_res_min",
    "b_cap_res_max",
    "country[]",
];

/// Builds the form body requesting page `page` of `brand`'s results
///
/// The release window ends on `today` and spans `released-window-days`.
pub fn search_form(
    brand: &str,
    page: usize,
    site: &SiteConfig,
    today: NaiveDate,
) -> Vec<(&'static str, String)> {
    // Out-of-range windows reach back as far as dates go
    let released_min = Duration::try_days(site.released_window_days)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN);
    let offset = page * site.results_per_page;

    let mut form = vec![
        ("brand", brand.to_string()),
        ("model", String::new()),
        ("released_min", released_min.format("%Y-%m-%d").to_string()),
        ("released_max", today.format("%Y-%m-%d").to_string()),
    ];

    form.extend(FIXED_FIELDS.iter().map(|(k, v)| (*k, v.to_string())));

    for field in OPEN_FIELDS {
        let value = if field.ends_with("[]") { "0" } else { "" };
        form.push((*field, value.to_string()));
    }

    form.push(("result_lower_limit", offset.to_string()));
    form
}
