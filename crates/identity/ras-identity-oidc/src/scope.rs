//! Scope string normalisation.

use std::collections::HashSet;

/// Merges whitespace-delimited scope groups into one space-joined string.
///
/// Each group may itself hold several scopes separated by any whitespace. Tokens
/// keep the order of their first occurrence and empty groups are ignored, so
/// `unique_scopes(["email", "profile", "openid", "email"])` is
/// `"email profile openid"`.
pub fn unique_scopes<I, S>(groups: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut scopes: Vec<String> = Vec::new();

    for group in groups {
        for scope in group.as_ref().split_whitespace() {
            if seen.insert(scope.to_string()) {
                scopes.push(scope.to_string());
            }
        }
    }

    scopes.join(" ")
}
