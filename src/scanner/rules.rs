use std::path::Path;

/// File extensions yielded as records on their own, compared lowercase.
pub const MATCHED_EXTENSIONS: [&str; 3] = ["raw", "mgf", "mzml"];

/// Directory name suffix marking a vendor acquisition directory.
pub const ACQUISITION_DIR_SUFFIX: &str = ".d";

/// Any directory whose path contains one of these is not traversed.
pub const SKIP_PATH_SUBSTRINGS: [&str; 2] = ["xi_data", "new_storage"];

/// What the scanner does with a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// Acquisition directory: yield once with its recursive size
    Acquisition,
    /// Plain directory: push for later traversal
    Descend,
    /// File with a matched extension: yield with its own size
    Spectra,
    /// Anything else
    Ignore,
}

/// Matching and exclusion rules applied during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRules {
    extensions: Vec<String>,
    dir_suffix: String,
    skip_substrings: Vec<String>,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self::new(
            MATCHED_EXTENSIONS,
            ACQUISITION_DIR_SUFFIX,
            SKIP_PATH_SUBSTRINGS,
        )
    }
}

impl MatchRules {
    /// Extensions may be given with or without the leading dot.
    pub fn new<E, S>(extensions: E, dir_suffix: &str, skip_substrings: S) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            dir_suffix: dir_suffix.to_lowercase(),
            skip_substrings: skip_substrings
                .into_iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
        }
    }

    /// Classify an entry by name. `is_dir` must come from a test that does
    /// not follow symlinks.
    pub fn classify(&self, name: &str, is_dir: bool) -> EntryClass {
        if is_dir {
            if self.is_acquisition_dir(name) {
                EntryClass::Acquisition
            } else {
                EntryClass::Descend
            }
        } else if self.matches_extension(name) {
            EntryClass::Spectra
        } else {
            EntryClass::Ignore
        }
    }

    pub fn is_acquisition_dir(&self, name: &str) -> bool {
        name.to_lowercase().ends_with(&self.dir_suffix)
    }

    /// Dotfiles such as `.raw` have no extension and never match.
    pub fn matches_extension(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }

    /// Case-sensitive substring test over the whole path.
    pub fn is_excluded_path(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.skip_substrings.iter().any(|s| path.contains(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extensions_match_case_insensitively() {
        let rules = MatchRules::default();
        assert!(rules.matches_extension("run01.raw"));
        assert!(rules.matches_extension("run01.RAW"));
        assert!(rules.matches_extension("peaks.Mgf"));
        assert!(rules.matches_extension("converted.mzML"));
        assert!(!rules.matches_extension("notes.txt"));
        assert!(!rules.matches_extension("archive.raw.gz"));
    }

    #[test]
    fn dotfile_without_stem_is_not_spectra() {
        let rules = MatchRules::default();
        assert!(!rules.matches_extension(".raw"));
        assert_eq!(rules.classify(".mgf", false), EntryClass::Ignore);
    }

    #[test]
    fn acquisition_suffix_is_case_insensitive() {
        let rules = MatchRules::default();
        assert_eq!(rules.classify("acq1.d", true), EntryClass::Acquisition);
        assert_eq!(rules.classify("ACQ1.D", true), EntryClass::Acquisition);
        assert_eq!(rules.classify("build", true), EntryClass::Descend);
        // a file named like an acquisition directory is just an unmatched file
        assert_eq!(rules.classify("acq1.d", false), EntryClass::Ignore);
    }

    #[test]
    fn excluded_substrings_match_anywhere_in_path() {
        let rules = MatchRules::default();
        assert!(rules.is_excluded_path(&PathBuf::from("/data/xi_data")));
        assert!(rules.is_excluded_path(&PathBuf::from("/data/lab_new_storage_2/x")));
        assert!(!rules.is_excluded_path(&PathBuf::from("/data/XI_DATA")));
        assert!(!rules.is_excluded_path(&PathBuf::from("/data/storage")));
    }

    #[test]
    fn custom_rules_accept_dotted_extensions() {
        let rules = MatchRules::new([".wiff"], ".raw", Vec::<String>::new());
        assert!(rules.matches_extension("a.WIFF"));
        assert!(!rules.matches_extension("a.mgf"));
        assert_eq!(rules.classify("run.RAW", true), EntryClass::Acquisition);
        assert!(!rules.is_excluded_path(&PathBuf::from("/xi_data")));
    }
}
