/// Maximum number of remembered client names.
pub const CLIENT_HISTORY_CAP: usize = 25;

/// Put `name` at the front of `history`.
///
/// Blank names are ignored. An existing entry that matches ignoring case is
/// moved rather than duplicated, taking the new spelling.
pub fn push_client_name(history: &[String], name: &str) -> Vec<String> {
    let name = name.trim();
    if name.is_empty() {
        return history.to_vec();
    }
    let key = name.to_lowercase();
    let mut out = Vec::with_capacity(CLIENT_HISTORY_CAP);
    out.push(name.to_string());
    out.extend(
        history
            .iter()
            .filter(|h| h.trim().to_lowercase() != key)
            .cloned(),
    );
    out.truncate(CLIENT_HISTORY_CAP);
    out
}
