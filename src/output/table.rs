use unicode_width::UnicodeWidthStr;

use crate::db::models::*;
use crate::search::SearchPage;

/// Truncate a string to fit within max_width (respecting unicode width).
pub fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

/// Left-align `s` in a column `width` cells wide. `format!("{:<w$}")` pads by
/// char count, which misaligns Hangul titles.
fn pad(s: &str, width: usize) -> String {
    let s = truncate(s, width);
    let fill = width.saturating_sub(UnicodeWidthStr::width(s.as_str()));
    format!("{s}{}", " ".repeat(fill))
}

fn rating_str(rating: Option<f64>) -> String {
    match rating {
        Some(r) if r > 0.0 => format!("{r:.1}"),
        _ => "-".to_string(),
    }
}

fn opt(s: &Option<String>) -> &str {
    s.as_deref().unwrap_or("")
}

/// Format a page of search results as a table.
pub fn print_search_results(page: &SearchPage) {
    if page.dramas.is_empty() {
        println!("No dramas found ({} total matches)", page.total);
        return;
    }

    let first = page.page_info.offset + 1;
    let last = page.page_info.offset + page.dramas.len() as u64;
    println!("Showing {first}-{last} of {} dramas:\n", page.total);

    println!(
        "  {} {} {} {}",
        pad("TITLE", 36),
        pad("RATING", 6),
        pad("STATUS", 18),
        "GENRES"
    );
    println!("  {}", "-".repeat(86));

    for d in &page.dramas {
        println!(
            "  {} {} {} {}",
            pad(opt(&d.title), 36),
            pad(&rating_str(d.rating), 6),
            pad(opt(&d.status), 18),
            truncate(opt(&d.genres), 24),
        );
        println!("  id: {}\n", d.tmdb_id);
    }

    if page.page_info.has_more {
        println!(
            "  More results: --offset {}",
            page.page_info.offset + u64::from(page.page_info.limit)
        );
    }
}

/// Format a single drama's details for `dramadb show`.
pub fn print_drama_detail(d: &Drama) {
    println!("{}", opt(&d.title));
    if let Some(ref original) = d.original_title {
        println!("  Original:   {original}");
    }
    println!("  TMDB ID:    {}", d.tmdb_id);
    println!("  Status:     {}", opt(&d.status));
    println!(
        "  Aired:      {} - {}",
        opt(&d.first_air_date),
        opt(&d.last_air_date)
    );
    if let Some(seasons) = d.seasons {
        println!("  Seasons:    {seasons}");
    }
    if let Some(episodes) = d.episodes {
        println!("  Episodes:   {episodes}");
    }
    if let Some(runtime) = d.average_runtime {
        println!("  Runtime:    {runtime:.0} min");
    }
    println!(
        "  Rating:     {} ({} votes)",
        rating_str(d.rating),
        d.vote_count.unwrap_or(0)
    );
    println!("  Genres:     {}", opt(&d.genres));
    println!("  Network:    {}", opt(&d.network));
    if d.production.is_some() {
        println!("  Production: {}", truncate(opt(&d.production), 64));
    }
    if d.main_cast.is_some() {
        println!("  Cast:       {}", truncate(opt(&d.main_cast), 64));
    }
    if d.keywords.is_some() {
        println!("  Keywords:   {}", truncate(opt(&d.keywords), 64));
    }

    if let Some(ref overview) = d.overview {
        println!("\nOverview:");
        for line in overview.lines() {
            println!("  {line}");
        }
    }
}

/// Print catalog stats.
pub fn print_stats(stats: &DbStats) {
    println!("Catalog Statistics:");
    println!("  Dramas:         {}", stats.total_dramas);

    let r = &stats.rating_stats;
    let fmt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "N/A".to_string());
    println!("  Average rating: {}", fmt(r.average));
    println!("  Highest rating: {}", fmt(r.highest));
    println!("  Lowest rating:  {}", fmt(r.lowest));

    if !stats.top_genres.is_empty() {
        println!("\n  Top genres:");
        for g in &stats.top_genres {
            println!("    {} {}", pad(&g.genre, 40), g.count);
        }
    }

    if !stats.available_statuses.is_empty() {
        println!("\n  Statuses: {}", stats.available_statuses.join(", "));
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
