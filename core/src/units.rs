use std::sync::LazyLock;

use regex::Regex;

/// Unit assumed for a weight string that carries no unit of its own.
pub const DEFAULT_WEIGHT_UNIT: &str = "克";
pub const GRAM_ALIAS: &str = "g";
pub const KILOGRAM_UNIT: &str = "千克";
pub const JIN_IN_GRAMS: f64 = 500.0;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid number pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    Weight,
    Quantity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub magnitude: f64,
    pub unit: String,
}

/// Split a free-form amount like `"300克"` or `"2.5斤"` into magnitude and unit.
///
/// The magnitude is the first run of ASCII digits (with an optional decimal
/// part) found anywhere in the string; the unit is whatever is left once that
/// run is cut out, trimmed. Returns `None` when there is no digit run.
/// A weight with nothing left over is read as grams.
#[must_use]
pub fn parse_measure(text: &str, kind: MeasureKind) -> Option<Measure> {
    let m = NUMBER.find(text)?;
    let magnitude: f64 = m.as_str().parse().ok()?;

    let rest = format!("{}{}", &text[..m.start()], &text[m.end()..]);
    let mut unit = rest.trim().to_string();
    if unit.is_empty() && kind == MeasureKind::Weight {
        unit = DEFAULT_WEIGHT_UNIT.to_string();
    }

    Some(Measure { magnitude, unit })
}

#[must_use]
pub fn is_gram_unit(unit: &str) -> bool {
    unit == DEFAULT_WEIGHT_UNIT || unit == GRAM_ALIAS
}

/// Units that fold together when merging weights.
#[must_use]
pub fn units_compatible(a: &str, b: &str) -> bool {
    a == b || (is_gram_unit(a) && is_gram_unit(b))
}

/// `grams / 1000` to two decimals, e.g. `1100.0` -> `"1.10千克"`.
#[must_use]
pub fn format_kilograms(grams: f64) -> String {
    format!("{}{KILOGRAM_UNIT}", to_fixed_2(grams / 1000.0))
}

/// Two-decimal formatting of the exact binary value, with exact halfway
/// cases rounded up rather than to even.
pub(crate) fn to_fixed_2(value: f64) -> String {
    let scaled = value * 100.0;
    // Only multiples of 1/8 can sit exactly halfway at two decimals.
    if (value * 8.0).fract() == 0.0 && scaled.fract() == 0.5 {
        return format!("{:.2}", (scaled + 0.5) / 100.0);
    }
    format!("{value:.2}")
}

/// Grams as a display weight: whole grams below a kilogram, kilograms above.
#[must_use]
pub fn format_grams(grams: f64) -> String {
    if grams >= 1000.0 {
        format_kilograms(grams)
    } else {
        format!("{:.0}{DEFAULT_WEIGHT_UNIT}", grams.round())
    }
}
