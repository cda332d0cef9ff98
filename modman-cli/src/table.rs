//! Token-driven table rendering for search results.
//!
//! A format string is a space-separated list of column specs; each spec may
//! mix literal text with `{token}` placeholders. Unknown tokens are left
//! verbatim so typos show up in the output instead of vanishing.

use modman_core::api::Mod;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Default format used for displaying search results.
pub const DEFAULT_FORMAT: &str = "{id} {slug} {name} {downloads} {updated}";

const DATE_FORMAT: &str = "%b %-d %H:%M %Y";

fn header_for(token: &str) -> Option<&'static str> {
    match token {
        "id" => Some("ID"),
        "slug" => Some("Slug"),
        "name" => Some("Name"),
        "language" => Some("Language"),
        "url" => Some("URL"),
        "rank" => Some("Rank"),
        "popularity" => Some("Popularity"),
        "downloads" => Some("Downloads"),
        "updated" => Some("Updated"),
        "released" => Some("Released"),
        "created" => Some("Created"),
        _ => None,
    }
}

fn value_for(token: &str, m: &Mod) -> Option<String> {
    match token {
        "id" => Some(m.id.to_string()),
        "slug" => Some(m.slug.clone()),
        "name" => Some(m.name.clone()),
        "language" => Some(m.primary_language.clone()),
        "url" => Some(m.website_url.clone()),
        "rank" => Some(m.game_popularity_rank.to_string()),
        "popularity" => Some(format_count(m.popularity_score)),
        "downloads" => Some(format_count(m.download_count)),
        "updated" => Some(m.date_modified.format(DATE_FORMAT).to_string()),
        "released" => Some(m.date_released.format(DATE_FORMAT).to_string()),
        "created" => Some(m.date_created.format(DATE_FORMAT).to_string()),
        _ => None,
    }
}

/// Expand `{token}`s within one column spec.
fn expand(spec: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::new();
    let mut rest = spec;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find('}') {
            Some(end) => {
                match lookup(&after[1..end]) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&after[..=end]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn headers(format: &str) -> Vec<String> {
    format
        .split_whitespace()
        .map(|spec| expand(spec, &|token| header_for(token).map(str::to_string)))
        .collect()
}

fn values(format: &str, m: &Mod) -> Vec<String> {
    format
        .split_whitespace()
        .map(|spec| expand(spec, &|token| value_for(token, m)))
        .collect()
}

/// Render mods as a minimally decorated table.
pub fn render(format: &str, mods: &[Mod]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers(format));
    for m in mods {
        builder.push_record(values(format, m));
    }

    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}

/// Format a large count with a K/M/B suffix.
fn format_count(value: f64) -> String {
    match value {
        v if v >= 1_000_000_000.0 => format!("{:.1} B", v / 1_000_000_000.0),
        v if v >= 1_000_000.0 => format!("{:.1} M", v / 1_000_000.0),
        v if v >= 1_000.0 => format!("{:.1} K", v / 1_000.0),
        v => format!("{v}"),
    }
}
