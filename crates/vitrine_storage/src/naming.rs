//! Unique object names.

/// Random lowercase alphanumeric token, 12 characters long.
pub fn random_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn clean_extension(extension: &str) -> String {
    let ext: String = extension
        .trim_start_matches('.')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    if ext.is_empty() { "bin".to_string() } else { ext }
}

/// Build a collision-resistant key: `{prefix}-{millis}-{token}.{ext}`.
///
/// # Examples
///
/// ```
/// use vitrine_storage::unique_object_name;
///
/// let key = unique_object_name("project-banner", "JPG");
/// assert!(key.starts_with("project-banner-"));
/// assert!(key.ends_with(".jpg"));
/// assert_ne!(key, unique_object_name("project-banner", "jpg"));
/// ```
pub fn unique_object_name(prefix: &str, extension: &str) -> String {
    format!(
        "{}-{}-{}.{}",
        prefix.trim_matches('-'),
        chrono::Utc::now().timestamp_millis(),
        random_token(),
        clean_extension(extension)
    )
}

/// A unique key inside the temp namespace.
///
/// `temp_prefix` must end with `/`.
pub fn temp_object_name(temp_prefix: &str, prefix: &str, extension: &str) -> String {
    format!("{}{}", temp_prefix, unique_object_name(prefix, extension))
}
