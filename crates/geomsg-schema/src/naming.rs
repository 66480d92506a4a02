//! Internal to external field-name mapping.
//!
//! Internal names are underscore-separated lowercase words (`web_search_provider`).
//! External names are the camelCase keys seen on the wire (`webSearchProvider`).
//! Systems already depend on the exact external keys, so this mapping must not
//! change.

/// Map an internal field name to its external camelCase key.
///
/// Splits on `_`, lower-cases the first segment, upper-cases the first letter
/// of every later segment and joins the pieces with no separator. Empty
/// segments (from doubled underscores) vanish.
pub fn to_camel(internal: &str) -> String {
    let mut external = String::with_capacity(internal.len());

    for (index, segment) in internal.split('_').enumerate() {
        if index == 0 {
            external.push_str(&segment.to_lowercase());
            continue;
        }

        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            external.extend(first.to_uppercase());
            external.push_str(chars.as_str());
        }
    }

    external
}
