//! Number formatting for axes and tooltips, and the tooltip model.

use crate::chart::ChartInstance;
use crate::palette::Color;

/// Y-axis tick: values of 1000 and above become `Nk`, rounded.
pub fn format_tick(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{}k", (value / 1000.0).round())
    } else {
        format!("{}", value)
    }
}

/// `1234567.5` as `1,234,567.5`. At most three decimals are kept.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let whole = rounded.trunc();
    let digits = format!("{}", whole as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if value < 0.0 && rounded > 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = rounded - whole;
    if frac > 0.0 {
        let frac = format!("{:.3}", frac);
        let frac = frac.trim_end_matches('0');
        if let Some(decimals) = frac.strip_prefix('0') {
            grouped.push_str(decimals);
        }
    }
    grouped
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub label: String,
    pub color: Color,
    pub value: String,
}

/// Everything shown when hovering an x index.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub title: String,
    pub rows: Vec<TooltipRow>,
}

/// Tooltip for x index `index`: the label plus one row per visible dataset.
///
/// `None` when the index is past the last label.
pub fn tooltip_at(chart: &dyn ChartInstance, index: usize) -> Option<Tooltip> {
    let data = chart.data();
    let title = data.labels.get(index)?.clone();
    let rows = chart
        .elements_at(index)
        .into_iter()
        .filter_map(|element| {
            let dataset = data.datasets.get(element.dataset_index)?;
            Some(TooltipRow {
                label: dataset.label.clone(),
                color: dataset.element_color(element.index),
                value: format_thousands(element.value),
            })
        })
        .collect();
    Some(Tooltip { title, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartData, ChartKind, ChartModel, ChartOptions, Dataset};
    use crate::palette::SERIES_PALETTE;

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(950.0), "950");
        assert_eq!(format_tick(1000.0), "1k");
        assert_eq!(format_tick(1499.0), "1k");
        assert_eq!(format_tick(1500.0), "2k");
        assert_eq!(format_tick(72627.0), "73k");
        assert_eq!(format_tick(12.5), "12.5");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(1234.5), "1,234.5");
        assert_eq!(format_thousands(-42000.0), "-42,000");
        assert_eq!(format_thousands(0.12345), "0.123");
    }

    #[test]
    fn test_tooltip_lists_visible_datasets() {
        let data = ChartData {
            labels: vec!["Jan 2025".into(), "Feb 2025".into()],
            datasets: vec![
                Dataset::new("a".into(), "A", SERIES_PALETTE[0], vec![1.0, 1200.0]),
                Dataset::new("b".into(), "B", SERIES_PALETTE[1], vec![2.0, 3.0]),
            ],
        };
        let mut chart = ChartModel::new(ChartKind::Line, data, ChartOptions::default());
        chart.set_dataset_visibility(1, false);

        let tooltip = tooltip_at(&chart, 1).unwrap();
        assert_eq!(tooltip.title, "Feb 2025");
        assert_eq!(tooltip.rows.len(), 1);
        assert_eq!(tooltip.rows[0].value, "1,200");
        assert_eq!(tooltip.rows[0].color, SERIES_PALETTE[0]);

        assert!(tooltip_at(&chart, 2).is_none());
    }
}
