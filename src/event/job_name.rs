//! Job name derivation from an application display name

/// Name used when the host reports no application name
pub const UNKNOWN_JOB: &str = "unknown";

/// Lower snake_case of the app name, split at whitespace, `-`, `_` and
/// camelCase boundaries. An acronym followed by a word splits before the
/// word's capital: `"MyETLJob"` becomes `my_etl_job`.
pub fn derive_job_name(app_name: Option<&str>) -> String {
    let Some(app_name) = app_name else {
        return UNKNOWN_JOB.to_string();
    };

    let chars: Vec<char> = app_name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() || c == '-' || c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    if words.is_empty() {
        UNKNOWN_JOB.to_string()
    } else {
        words.join("_")
    }
}
