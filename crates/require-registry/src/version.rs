//! Version values and version constraints.
//!
//! A constraint is up to three dot-separated numbers with an optional
//! trailing `+`:
//! - `2.3.1`: exactly 2.3.1
//! - `2.3`: any 2.3.x
//! - `2.3+`: 2.3.0 or anything newer, including newer majors
//! - empty or non-numeric: no preference
//!
//! Installed versions are directory names with exactly three numbers and are
//! represented as [`semver::Version`] values.

use serde::{Deserialize, Serialize};

/// A fully specified, installed version.
pub type Version = semver::Version;

/// Longest accepted version text.
pub const MAX_VERSION_LEN: usize = 19;

/// Errors from parsing version text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// A component was written with a minus sign.
    #[error("negative version component in '{text}'")]
    Negative { text: String },

    /// A component does not fit in 64 bits.
    #[error("version component out of range in '{text}'")]
    OutOfRange { text: String },

    /// The text exceeds [`MAX_VERSION_LEN`].
    #[error("version '{text}' is longer than {max} characters")]
    TooLong { text: String, max: usize },

    /// Named versions are directory names and cannot contain a path.
    #[error("version '{text}' is not a plain directory name")]
    NotADirectoryName { text: String },
}

/// Whether newer versions also satisfy a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exactness {
    /// Every specified component must match.
    Exact,
    /// The requested version or anything newer.
    AtLeast,
}

/// A parsed version constraint.
///
/// Components are filled left to right; once one is unspecified, all the
/// ones after it are as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionSpec {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    exactness: Exactness,
}

impl VersionSpec {
    /// The constraint that matches every version.
    pub const UNSPECIFIED: Self = Self {
        major: None,
        minor: None,
        patch: None,
        exactness: Exactness::Exact,
    };

    /// Parse constraint text.
    ///
    /// Each component is the leading run of digits; parsing stops at the first
    /// character that cannot continue the dotted form, so `1.2.3-rc1` reads as
    /// `1.2.3` and `test` reads as no preference.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let text = text.trim();
        if text.len() > MAX_VERSION_LEN {
            return Err(VersionError::TooLong {
                text: text.to_string(),
                max: MAX_VERSION_LEN,
            });
        }
        if !text.is_empty() && !is_directory_name(text) {
            return Err(VersionError::NotADirectoryName {
                text: text.to_string(),
            });
        }

        let (body, exactness) = match text.strip_suffix('+') {
            Some(body) => (body, Exactness::AtLeast),
            None => (text, Exactness::Exact),
        };

        let mut fields = [None; 3];
        let mut rest = body;
        for (i, field) in fields.iter_mut().enumerate() {
            if i > 0 {
                match rest.strip_prefix('.') {
                    Some(after_dot) => rest = after_dot,
                    None => break,
                }
            }
            if let Some(after_minus) = rest.strip_prefix('-') {
                if after_minus.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(VersionError::Negative {
                        text: text.to_string(),
                    });
                }
            }
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 {
                break;
            }
            let value = rest[..digits]
                .parse::<u64>()
                .map_err(|_| VersionError::OutOfRange {
                    text: text.to_string(),
                })?;
            *field = Some(value);
            rest = &rest[digits..];
        }

        let [major, minor, patch] = fields;
        Ok(Self {
            major,
            minor,
            patch,
            exactness,
        })
    }

    pub fn major(&self) -> Option<u64> {
        self.major
    }

    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    pub fn patch(&self) -> Option<u64> {
        self.patch
    }

    pub fn exactness(&self) -> Exactness {
        self.exactness
    }

    /// True when no component is specified. Exactness is irrelevant then.
    pub fn is_unspecified(&self) -> bool {
        self.major.is_none()
    }

    /// True when all three components are specified.
    pub fn is_fully_specified(&self) -> bool {
        self.patch.is_some()
    }

    /// The lowest version this constraint names, unspecified components as zero.
    pub fn floor(&self) -> Version {
        Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        )
    }

    /// Check whether `candidate` satisfies this constraint.
    pub fn matches(&self, candidate: &Version) -> bool {
        if self.is_unspecified() {
            return true;
        }
        match self.exactness {
            Exactness::Exact => {
                self.major.is_none_or(|m| m == candidate.major)
                    && self.minor.is_none_or(|m| m == candidate.minor)
                    && self.patch.is_none_or(|p| p == candidate.patch)
            }
            Exactness::AtLeast => {
                let floor = self.floor();
                (candidate.major, candidate.minor, candidate.patch)
                    >= (floor.major, floor.minor, floor.patch)
            }
        }
    }
}

impl Default for VersionSpec {
    fn default() -> Self {
        Self::UNSPECIFIED
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(major) = self.major else {
            return Ok(());
        };
        write!(f, "{major}")?;
        for part in [self.minor, self.patch].into_iter().flatten() {
            write!(f, ".{part}")?;
        }
        if self.exactness == Exactness::AtLeast {
            write!(f, "+")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// True when `text` is purely a numeric constraint: `M`, `M.N` or `M.N.P`,
/// optionally followed by `+`. Any other non-empty text names a version.
pub fn is_numeric_expression(text: &str) -> bool {
    let body = text.strip_suffix('+').unwrap_or(text);
    let parts: Vec<&str> = body.split('.').collect();
    (1..=3).contains(&parts.len()) && parts.iter().all(|p| is_digits(p))
}

/// True when an already-loaded version string is a numbered release rather
/// than a `local`, `system` or test build tag.
pub fn is_release(loaded: &str) -> bool {
    loaded.starts_with(|c: char| c.is_ascii_digit())
}

/// Parse an installation directory name. Only exactly three numeric
/// components qualify.
pub fn parse_installed(dir_name: &str) -> Option<Version> {
    let mut parts = dir_name.split('.');
    let (Some(major), Some(minor), Some(patch), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    if !(is_digits(major) && is_digits(minor) && is_digits(patch)) {
        return None;
    }
    Some(Version::new(
        major.parse().ok()?,
        minor.parse().ok()?,
        patch.parse().ok()?,
    ))
}

/// Whether `text` names a single directory entry: no separators, not `.`
/// or `..`.
pub fn is_directory_name(text: &str) -> bool {
    !text.is_empty() && text != "." && text != ".." && !text.contains(['/', '\\'])
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
