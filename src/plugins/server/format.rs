use once_cell::sync::Lazy;
use regex::Regex;

/// `§x§r§r§g§g§b§b` hex colours first, then single-character codes.
static COLOR_CODES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)§x(?:§[0-9a-f]){6}|§[0-9a-fk-orx]").expect("colour code pattern is valid")
});

/// Removes Minecraft colour and formatting codes.
pub fn strip_colors(text: &str) -> String {
    COLOR_CODES.replace_all(text, "").into_owned()
}

/// Pulls the comma-separated list out of a `Plugins (N): a, b` reply.
pub fn plugin_list(response: &str) -> String {
    let cleaned = strip_colors(response);
    let cleaned = cleaned.trim();
    if cleaned.contains("Plugins (") {
        if let Some((_, list)) = cleaned.split_once("):") {
            return list.trim().to_string();
        }
    }
    cleaned.to_string()
}

/// Drops `====` banners and blank lines from a world listing.
pub fn world_list(response: &str) -> String {
    strip_colors(response)
        .lines()
        .filter(|line| !line.starts_with("====") && !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
