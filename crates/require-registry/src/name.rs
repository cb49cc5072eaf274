//! Module name rules.

/// Longest accepted module name.
pub const MAX_NAME_LEN: usize = 99;

/// Check that `name` is a usable module name: 1 to [`MAX_NAME_LEN`] ASCII
/// letters, digits or underscores.
///
/// Returns a description of the problem on failure.
pub fn check(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("module name is empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!(
            "module name '{}...' is longer than {MAX_NAME_LEN} characters",
            name.chars().take(16).collect::<String>()
        ));
    }
    if let Some(bad) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(format!("module name '{name}' contains '{bad}'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_identifiers() {
        for name in ["asyn", "StreamDevice", "ADCore_2", "_x", "7"] {
            assert!(check(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_bad_characters() {
        for name in ["", "my-mod", "a b", "a/b", "a.b"] {
            assert!(check(name).is_err(), "{name}");
        }
    }

    #[test]
    fn length_bound() {
        assert!(check(&"m".repeat(MAX_NAME_LEN)).is_ok());
        let err = check(&"m".repeat(MAX_NAME_LEN + 1)).unwrap_err();
        assert!(err.contains("longer than 99"));
    }
}
