// src/matcher.rs

/// Scan extracted text and the resolved filename for the configured
/// keywords. Matching is case-insensitive and substring-based; every keyword
/// that hits either haystack is returned, in keyword order, without
/// duplicates.
pub fn match_keywords(text: &str, filename: &str, keywords: &[String]) -> Vec<String> {
    let text = text.to_lowercase();
    let filename = filename.to_lowercase();

    let mut found: Vec<String> = Vec::new();
    for keyword in keywords {
        let needle = keyword.to_lowercase();
        if needle.is_empty() || found.contains(keyword) {
            continue;
        }
        if text.contains(&needle) || filename.contains(&needle) {
            found.push(keyword.clone());
        }
    }
    found
}
