// src/color_map.rs

use std::collections::HashMap;

use plotters::style::RGBColor;

/// Named colors accepted in chart definitions and config files (matplotlib/CSS values).
const NAMED_COLORS: [(&str, RGBColor); 16] = [
    ("blue", RGBColor(0, 0, 255)),
    ("green", RGBColor(0, 128, 0)),
    ("red", RGBColor(255, 0, 0)),
    ("cyan", RGBColor(0, 255, 255)),
    ("lime", RGBColor(0, 255, 0)),
    ("lightcoral", RGBColor(240, 128, 128)),
    ("purple", RGBColor(128, 0, 128)),
    ("orange", RGBColor(255, 165, 0)),
    ("brown", RGBColor(165, 42, 42)),
    ("black", RGBColor(0, 0, 0)),
    ("gray", RGBColor(128, 128, 128)),
    ("magenta", RGBColor(255, 0, 255)),
    ("olive", RGBColor(128, 128, 0)),
    ("navy", RGBColor(0, 0, 128)),
    ("teal", RGBColor(0, 128, 128)),
    ("gold", RGBColor(255, 215, 0)),
];

/// Default color cycle for series without an assigned color (matplotlib "tab10").
pub const SERIES_CYCLE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Column colors shared by every chart so a quantity keeps its color across figures.
const DEFAULT_ASSIGNMENTS: [(&str, &str); 34] = [
    // P and Q by phase
    ("P1", "blue"),
    ("Q1", "cyan"),
    ("P2", "green"),
    ("Q2", "lime"),
    ("P3", "red"),
    ("Q3", "lightcoral"),
    // current by phase
    ("I1", "blue"),
    ("I2", "green"),
    ("I3", "red"),
    // voltage angle by sequence
    ("Ang_Vb", "green"),
    ("Ang_Vc", "red"),
    // current angle by sequence
    ("Ang_Ia", "cyan"),
    ("Ang_Ib", "lime"),
    ("Ang_Ic", "lightcoral"),
    // THD
    ("THD_Ia", "blue"),
    ("THD_Ib", "green"),
    ("THD_Ic", "red"),
    ("THD_Va", "cyan"),
    ("THD_Vb", "lime"),
    ("THD_Vc", "lightcoral"),
    // derived apparent power
    ("diff_pqs", "purple"),
    ("Ssum_kVA", "orange"),
    ("Ssum_cal", "brown"),
    // energy registers and consumption
    ("EP_TOTAL_kWh", "blue"),
    ("EQ_TOTAL_kvarh", "green"),
    ("Daily_EP_TOTAL_kWh_Consumption", "blue"),
    ("Daily_EQ_TOTAL_kvarh_Consumption", "green"),
    ("Weekly_EP_TOTAL_kWh_Consumption", "blue"),
    ("Weekly_EQ_TOTAL_kvarh_Consumption", "green"),
    // CMS comparison
    ("site_power", "green"),
    ("Psum_kW", "blue"),
    ("diff", "red"),
    ("diff_site_power_percentage", "purple"),
    ("PF", "black"),
];

/// Parses a color name or `#rrggbb` hex string.
pub fn parse_color(value: &str) -> Option<RGBColor> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(RGBColor(channel(0)?, channel(2)?, channel(4)?));
    }
    let lower = value.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, color)| *color)
}

#[derive(Debug, Clone)]
pub struct ColorMap {
    assignments: HashMap<String, RGBColor>,
}

impl Default for ColorMap {
    fn default() -> Self {
        let assignments = DEFAULT_ASSIGNMENTS
            .iter()
            .filter_map(|(column, name)| parse_color(name).map(|c| (column.to_string(), c)))
            .collect();
        Self { assignments }
    }
}

impl ColorMap {
    /// Default assignments with per-column overrides applied on top.
    pub fn with_overrides(overrides: &HashMap<String, RGBColor>) -> Self {
        let mut map = Self::default();
        for (column, color) in overrides {
            map.assignments.insert(column.clone(), *color);
        }
        map
    }

    pub fn assigned(&self, column: &str) -> Option<RGBColor> {
        self.assignments.get(column).copied()
    }

    /// Assigned color for `column`, or the next entry of the default cycle. Only unassigned
    /// columns advance `cycle_slot`, so assigned colors never shift the cycle.
    pub fn color_for(&self, column: &str, cycle_slot: &mut usize) -> RGBColor {
        match self.assigned(column) {
            Some(color) => color,
            None => {
                let color = SERIES_CYCLE[*cycle_slot % SERIES_CYCLE.len()];
                *cycle_slot += 1;
                color
            }
        }
    }
}
