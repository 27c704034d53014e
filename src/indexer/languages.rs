/// Source-language table used by file discovery and `didOpen`.
pub struct LanguageConfig {
    pub name: &'static str,
    /// LSP `languageId` sent with `textDocument/didOpen`.
    pub language_id: &'static str,
    pub extensions: &'static [&'static str],
}

impl LanguageConfig {
    pub fn get_all() -> Vec<LanguageConfig> {
        vec![cpp_config(), c_config()]
    }

    pub fn get_by_extension(ext: &str) -> Option<LanguageConfig> {
        let ext = ext.to_lowercase();
        Self::get_all()
            .into_iter()
            .find(|c| c.extensions.contains(&ext.as_str()))
    }

    pub fn get_by_name(name: &str) -> Option<LanguageConfig> {
        Self::get_all().into_iter().find(|c| c.name == name)
    }
}

fn cpp_config() -> LanguageConfig {
    LanguageConfig {
        name: "cpp",
        language_id: "cpp",
        extensions: &["cpp", "cc", "cxx", "c++", "hpp", "h", "hxx", "h++"],
    }
}

fn c_config() -> LanguageConfig {
    LanguageConfig {
        name: "c",
        language_id: "c",
        extensions: &["c"],
    }
}

/// Extensions picked up by default (headers are treated as C++).
pub fn default_extensions() -> Vec<String> {
    cpp_config()
        .extensions
        .iter()
        .map(|e| e.to_string())
        .collect()
}

/// Directory names never descended into by default.
pub fn default_skip_dirs() -> Vec<String> {
    ["build", ".git", "node_modules", "CMakeFiles", ".cache", "vendor"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}
