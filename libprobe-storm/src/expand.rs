use crate::wordlist::WordlistStore;

/// Recursively substitutes every marker occurrence in `template`, producing
/// the full Cartesian product across all distinct markers. A template that
/// uses the same marker twice expands both occurrences in lockstep.
///
/// Marker selection is deterministic: the marker whose first occurrence sits
/// leftmost in the template is expanded first, ties broken toward the longest
/// marker name so `WL10` is never shadowed by its prefix `WL1`.
pub fn expand(template: &str, store: &WordlistStore) -> Vec<String> {
    let Some((marker, words)) = next_marker(template, store) else {
        return vec![template.to_string()];
    };

    let mut targets = Vec::new();
    for word in words {
        let substituted = template.replace(marker, word);
        targets.extend(expand(&substituted, store));
    }
    targets
}

fn next_marker<'a>(template: &str, store: &'a WordlistStore) -> Option<(&'a str, &'a [String])> {
    store
        .markers()
        .filter_map(|marker| template.find(marker).map(|at| (at, marker)))
        .min_by_key(|&(at, marker)| (at, std::cmp::Reverse(marker.len())))
        .map(|(_, marker)| (marker, store.words(marker).unwrap_or(&[])))
}

/// Fallback for a markerless target in subdomain mode: each word becomes a
/// label in front of the bare host.
pub fn subdomain_candidates(target: &str, words: &[String]) -> Vec<String> {
    let host = target.strip_prefix("http://").unwrap_or(target);
    let host = host.strip_prefix("https://").unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host);

    words
        .iter()
        .map(|word| format!("{}.{}", word, host))
        .collect()
}

/// Fallback for a markerless target in directory mode: each word becomes a
/// path segment under the normalized base URL.
pub fn directory_candidates(base_url: &str, words: &[String]) -> Vec<String> {
    let mut base = if base_url.starts_with("http") {
        base_url.to_string()
    } else {
        format!("http://{}", base_url)
    };
    if base.ends_with('/') {
        base.pop();
    }

    words
        .iter()
        .map(|word| format!("{}/{}", base, word))
        .collect()
}

/// Expands each target into one candidate per extension, stripping a leading
/// dot from the extension so `php` and `.php` read the same. An empty
/// extension list passes targets through untouched.
pub fn apply_extensions(targets: Vec<String>, extensions: &[String]) -> Vec<String> {
    if extensions.is_empty() {
        return targets;
    }

    let mut expanded = Vec::with_capacity(targets.len() * extensions.len());
    for target in &targets {
        for ext in extensions {
            let ext = ext.strip_prefix('.').unwrap_or(ext);
            expanded.push(format!("{}.{}", target, ext));
        }
    }
    expanded
}
