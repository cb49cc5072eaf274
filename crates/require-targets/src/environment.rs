//! Operating system families.
//!
//! The OS family decides how a module name maps onto a native shared library
//! file and how search-path lists are delimited. Everything platform-specific
//! the resolver needs goes through this type.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};

/// The operating system family a target architecture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    /// macOS.
    Darwin,
    Windows,
    /// Cygwin on Windows: Unix tooling, Windows library names.
    Cygwin,
    /// VxWorks real-time targets loading munched object modules.
    VxWorks,
}

impl OsFamily {
    /// Derive the OS family from an architecture tag such as `linux-x86_64`
    /// or `vxWorks-ppc604`. The part before the first `-` names the OS.
    pub fn from_arch(arch: &str) -> Result<Self> {
        let os = arch.split('-').next().unwrap_or_default().to_ascii_lowercase();
        match os.as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" => Ok(Self::Darwin),
            "windows" | "win32" => Ok(Self::Windows),
            "cygwin" => Ok(Self::Cygwin),
            "vxworks" => Ok(Self::VxWorks),
            _ => Err(TargetError::UnknownArch {
                arch: arch.to_string(),
            }),
        }
    }

    /// Separator between entries of a search-path list.
    pub fn path_separator(&self) -> char {
        match self {
            Self::Windows => ';',
            _ => ':',
        }
    }

    /// Native library file names for a module, in lookup order.
    ///
    /// VxWorks builds are tried with and without the `.munch` suffix.
    pub fn library_file_names(&self, module: &str) -> Vec<String> {
        match self {
            Self::Linux => vec![format!("lib{module}.so")],
            Self::Darwin => vec![format!("lib{module}.dylib")],
            Self::Windows | Self::Cygwin => vec![format!("{module}.dll")],
            Self::VxWorks => vec![format!("{module}Lib.munch"), format!("{module}Lib")],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Cygwin => "cygwin",
            Self::VxWorks => "vxworks",
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
