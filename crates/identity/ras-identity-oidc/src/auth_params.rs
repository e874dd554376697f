//! Detection of authorization responses in the current location.

use crate::platform::Platform;
use regex::Regex;
use std::sync::LazyLock;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]code=[^&]+").expect("valid code pattern"));

static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]state=[^&]+").expect("valid state pattern"));

/// Returns true when `search` carries both a `code` and a `state` parameter.
///
/// A key only counts when it directly follows `?` or `&` and is followed by `=`
/// and at least one character other than `&`, so `mycode=` never matches.
pub fn has_auth_params(search: &str) -> bool {
    CODE_RE.is_match(search) && STATE_RE.is_match(search)
}

/// Checks the platform's location as it is at call time.
pub fn location_has_auth_params(platform: &dyn Platform) -> bool {
    has_auth_params(&platform.location_search())
}
