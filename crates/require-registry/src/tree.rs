//! Resolution tree display.
//!
//! Formats what one `require` call resolved:
//! ```text
//! motor 7.0.1 (/opt/modules/motor/7.0.1)
//! ├── asyn 4.42.0 (/opt/modules/asyn/4.42.0)
//! │   └── calc 3.7.4 (/opt/modules/calc/3.7.4)
//! └── calc 3.7.4 (already loaded)
//! ```

use crate::loaded::LoadedModule;
use crate::resolution::ResolvedModule;

/// Format a resolution tree as a human-readable string.
pub fn format_tree(root: &ResolvedModule) -> String {
    let mut out = format!("{}\n", describe(root));

    let count = root.dependencies.len();
    for (i, dep) in root.dependencies.iter().enumerate() {
        format_dep(&mut out, dep, "", i == count - 1);
    }
    out
}

fn describe(module: &ResolvedModule) -> String {
    let location = if module.already_loaded {
        "already loaded".to_string()
    } else {
        module
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };
    if location.is_empty() {
        format!("{} {}", module.name, module.version)
    } else {
        format!("{} {} ({location})", module.name, module.version)
    }
}

fn format_dep(out: &mut String, dep: &ResolvedModule, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };
    out.push_str(&format!("{prefix}{connector}{}\n", describe(dep)));

    let child_prefix = if is_last {
        format!("{prefix}    ")
    } else {
        format!("{prefix}│   ")
    };

    let child_count = dep.dependencies.len();
    for (i, child) in dep.dependencies.iter().enumerate() {
        format_dep(out, child, &child_prefix, i == child_count - 1);
    }
}

/// Format loaded modules as an aligned two-column table.
pub fn format_loaded<'a>(modules: impl IntoIterator<Item = &'a LoadedModule>) -> String {
    let modules: Vec<_> = modules.into_iter().collect();
    let width = modules.iter().map(|m| m.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for module in modules {
        out.push_str(&format!("{:<width$} {}\n", module.name, module.version));
    }
    out
}
