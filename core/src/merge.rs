use crate::units::{
    DEFAULT_WEIGHT_UNIT, GRAM_ALIAS, MeasureKind, format_kilograms, parse_measure,
    units_compatible,
};

/// Merged quantity when the two sides cannot be added up.
pub const NOT_COMPARABLE: &str = "/";

/// Combine two weight strings.
///
/// Gram amounts (`克` or `g`, or any pair of identical units) are summed,
/// rounded to whole numbers and promoted to kilograms from 1000 up. Other
/// unit pairs are kept side by side, and strings without a number are
/// concatenated as-is.
#[must_use]
pub fn merge_weight(existing: &str, new: &str) -> String {
    if existing.is_empty() {
        return new.to_string();
    }
    if new.is_empty() {
        return existing.to_string();
    }

    let (Some(old), Some(add)) = (
        parse_measure(existing, MeasureKind::Weight),
        parse_measure(new, MeasureKind::Weight),
    ) else {
        return format!("{existing}+{new}");
    };

    if !units_compatible(&old.unit, &add.unit) {
        return format!(
            "{:.0}{}+{:.0}{}",
            old.magnitude.round(),
            old.unit,
            add.magnitude.round(),
            add.unit
        );
    }

    // Summed amounts are always re-expressed in grams.
    let unit = if old.unit == GRAM_ALIAS {
        GRAM_ALIAS
    } else {
        DEFAULT_WEIGHT_UNIT
    };
    let total = (old.magnitude + add.magnitude).round();
    if total >= 1000.0 {
        format_kilograms(total)
    } else {
        format!("{total:.0}{unit}")
    }
}

/// Combine two quantity strings; only identical units add up.
#[must_use]
pub fn merge_quantity(existing: &str, new: &str) -> String {
    if existing.is_empty() {
        return new.to_string();
    }
    if new.is_empty() {
        return existing.to_string();
    }

    match (
        parse_measure(existing, MeasureKind::Quantity),
        parse_measure(new, MeasureKind::Quantity),
    ) {
        (Some(old), Some(add)) if old.unit == add.unit => {
            format!("{:.0}{}", (old.magnitude + add.magnitude).round(), old.unit)
        }
        _ => NOT_COMPARABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_empty_side_passes_other_through() {
        for w in ["300克", "1.2千克", "适量", " "] {
            assert_eq!(merge_weight("", w), w);
            assert_eq!(merge_weight(w, ""), w);
        }
        assert_eq!(merge_weight("", ""), "");
    }

    #[test]
    fn test_weight_same_unit_sums() {
        assert_eq!(merge_weight("300克", "150克"), "450克");
    }

    #[test]
    fn test_weight_promotes_to_kilograms() {
        assert_eq!(merge_weight("800克", "300克"), "1.10千克");
        assert_eq!(merge_weight("500克", "500克"), "1.00千克");
        assert_eq!(merge_weight("999克", "0.4克"), "999克");
    }

    #[test]
    fn test_weight_gram_synonyms() {
        assert_eq!(merge_weight("100g", "50克"), "150g");
        assert_eq!(merge_weight("100克", "50g"), "150克");
        assert_eq!(merge_weight("700g", "300g"), "1.00千克");
    }

    #[test]
    fn test_weight_bare_numbers_are_grams() {
        assert_eq!(merge_weight("200", "100克"), "300克");
        assert_eq!(merge_weight("200", "100g"), "300克");
    }

    #[test]
    fn test_weight_rounds_sum() {
        assert_eq!(merge_weight("100.4克", "100.4克"), "201克");
        assert_eq!(merge_weight("0.3克", "0.3克"), "1克");
    }

    #[test]
    fn test_weight_identical_non_gram_units_collapse_to_grams() {
        assert_eq!(merge_weight("2斤", "1斤"), "3克");
        assert_eq!(merge_weight("1.5千克", "1千克"), "3克");
    }

    #[test]
    fn test_weight_mismatched_units_kept_side_by_side() {
        assert_eq!(merge_weight("300克", "1斤"), "300克+1斤");
        assert_eq!(merge_weight("1.6千克", "200.4克"), "2千克+200克");
    }

    #[test]
    fn test_weight_unparseable_concatenates() {
        assert_eq!(merge_weight("适量", "300克"), "适量+300克");
        assert_eq!(merge_weight("300克", "少许"), "300克+少许");
    }

    #[test]
    fn test_quantity_empty_side_passes_other_through() {
        assert_eq!(merge_quantity("", "2个"), "2个");
        assert_eq!(merge_quantity("2个", ""), "2个");
    }

    #[test]
    fn test_quantity_same_unit_sums() {
        assert_eq!(merge_quantity("2个", "3个"), "5个");
        assert_eq!(merge_quantity("1.5斤", "1斤"), "3斤");
        assert_eq!(merge_quantity("2", "3"), "5");
    }

    #[test]
    fn test_quantity_unit_mismatch_is_sentinel() {
        assert_eq!(merge_quantity("2个", "3块"), NOT_COMPARABLE);
        // No gram folding for quantities.
        assert_eq!(merge_quantity("100g", "100克"), NOT_COMPARABLE);
        assert_eq!(merge_quantity("2", "3个"), NOT_COMPARABLE);
    }

    #[test]
    fn test_quantity_unparseable_is_sentinel() {
        assert_eq!(merge_quantity("一些", "2个"), NOT_COMPARABLE);
        assert_eq!(merge_quantity("/", "2个"), NOT_COMPARABLE);
    }
}
