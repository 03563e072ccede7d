//! Workspace configuration.

use smol_str::SmolStr;

use crate::hir::FilePattern;

/// Which files belong to the workspace and how logical names map onto them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Source file extensions, without the dot.
    pub extensions: Vec<SmolStr>,
    /// Match extensions and logical names ignoring ASCII case.
    pub case_insensitive: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            extensions: vec![SmolStr::new_static("rtm")],
            case_insensitive: true,
        }
    }
}

impl WorkspaceConfig {
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| SmolStr::new(ext.as_ref().trim_start_matches('.')))
            .collect();
        self
    }

    pub fn with_case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// Every source file in the workspace.
    pub fn source_pattern(&self) -> FilePattern {
        self.pattern_for_stem("*")
    }

    /// The file(s) a logical block-owner name such as `STOCK` may refer to.
    ///
    /// Returns `None` for names that cannot be file stems.
    pub fn logical_name_pattern(&self, name: &str) -> Option<FilePattern> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'));
        valid.then(|| self.pattern_for_stem(name))
    }

    fn pattern_for_stem(&self, stem: &str) -> FilePattern {
        let glob = match self.extensions.as_slice() {
            [single] => format!("**/{stem}.{single}"),
            many => format!("**/{stem}.{{{}}}", many.join(",")),
        };
        FilePattern::new(glob).case_insensitive(self.case_insensitive)
    }
}
