use smallvec::SmallVec;

/// Lookup names for a declared parameter name, highest priority first.
///
/// 1. the name itself (`user_id`)
/// 2. one-word form: underscores removed, lower-cased (`userid`)
/// 3. camelCase form: words split on `_`, capitalized, joined, first
///    character lower-cased (`userId`)
///
/// Duplicates are dropped, keeping the first occurrence.
#[must_use]
pub fn candidate_names(name: &str) -> SmallVec<[String; 3]> {
    let mut names: SmallVec<[String; 3]> = SmallVec::new();
    for candidate in [name.to_string(), one_word(name), camel_case(name)] {
        if !names.contains(&candidate) {
            names.push(candidate);
        }
    }
    names
}

fn one_word(name: &str) -> String {
    name.chars()
        .filter(|&c| c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut word_start = true;
    for c in name.chars() {
        if c == '_' {
            word_start = true;
        } else if word_start {
            out.push(c.to_ascii_uppercase());
            word_start = false;
        } else {
            out.push(c);
        }
    }
    if let Some(first) = out.get_mut(..1) {
        first.make_ascii_lowercase();
    }
    out
}
