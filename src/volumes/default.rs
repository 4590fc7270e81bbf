use super::Volume;
use regex::Regex;

/// Pick the volume to use when nobody has chosen one yet.
///
/// An explicitly configured volume wins when it is listed. Otherwise the last
/// volume matching `pattern` is chosen, falling back to the first listed.
pub(crate) fn default_volume<'a>(
    volumes: &'a [Volume],
    preferred: Option<&Volume>,
    pattern: Option<&Regex>,
) -> Option<&'a Volume> {
    if let Some(found) = preferred.and_then(|p| volumes.iter().find(|v| *v == p)) {
        return Some(found);
    }

    pattern
        .and_then(|re| volumes.iter().rev().find(|v| re.is_match(v.as_str())))
        .or_else(|| volumes.first())
}
