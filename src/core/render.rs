use crate::core::advisor::{BuildCard, BuildResultsView, PartsStatus, PartsView};
use crate::domain::model::{CatalogStats, Part};
use std::fmt::Write;

/// en-US dollars: `$1,234.56`, `-$5.00`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

pub fn render_build_card(card: &BuildCard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Build {}  {}",
        card.number,
        format_currency(card.build.total_price)
    );
    let _ = writeln!(
        out,
        "  Bang-for-Buck Score: {}",
        card.build.bang_for_buck_score
    );
    if let Some(status) = &card.build.compatibility_status {
        let _ = writeln!(out, "  Compatibility: {}", status);
    }
    for part in &card.build.parts {
        let _ = writeln!(
            out,
            "  {:<12} {:<48} {:>12}",
            part.category,
            part.name,
            format_currency(part.price)
        );
    }
    out
}

/// Cards in the order the service ranked them. Hidden results render as nothing.
pub fn render_build_results(view: &BuildResultsView) -> String {
    if !view.visible {
        return String::new();
    }
    view.cards
        .iter()
        .map(render_build_card)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_part_card(part: &Part) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", part.name, format_currency(part.price));
    if let Some(brand) = &part.brand {
        let _ = writeln!(out, "  {}", brand);
    }
    if let Some(score) = part.performance_score {
        let _ = writeln!(out, "  Performance: {}", score);
    }
    out
}

pub fn render_parts_view(view: &PartsView) -> String {
    match view.status {
        PartsStatus::Idle => String::new(),
        PartsStatus::Loading => "Loading parts...\n".to_string(),
        PartsStatus::Empty => "No parts found in this category\n".to_string(),
        PartsStatus::Failed => "Failed to load parts\n".to_string(),
        PartsStatus::Ready => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "Sorted by {} ({})  |  Showing {} parts",
                view.sort.by.as_str(),
                view.sort.order.as_str(),
                view.parts.len()
            );
            for part in &view.parts {
                out.push_str(&render_part_card(part));
            }
            if view.load_more {
                out.push_str("[Load More Parts]\n");
            }
            out
        }
    }
}

pub fn render_catalog_stats(stats: &CatalogStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total parts: {}", stats.total_parts);
    let _ = writeln!(
        out,
        "Price range: {} - {}",
        format_currency(stats.price_range.min),
        format_currency(stats.price_range.max)
    );
    let _ = writeln!(out, "Categories:");
    for (category, count) in &stats.categories {
        let _ = writeln!(out, "  {:<12} {}", category, count);
    }
    let _ = writeln!(out, "Brands:");
    for (brand, count) in &stats.brands {
        let _ = writeln!(out, "  {:<20} {}", brand, count);
    }
    out
}
