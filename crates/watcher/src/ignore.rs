//! Ignore rule matching
//!
//! Rules come from two sources:
//! 1. Built-in patterns from `SyncConfig::builtin_ignores` (always active)
//! 2. The project ignore-file at the watched root (optional)
//!
//! Every rule is an independent predicate and any match excludes a path.
//! A rule matches when:
//! - it glob-matches the path's final component (`*`, `?`, `[...]`), or
//! - it starts with `/` and the root-relative path starts with it, or
//! - the root-relative path contains it as an interior segment (`/<rule>/`).
//!
//! Negation (`!`), `**` and nested ignore-files are not interpreted.

use crate::error::{Result, WatchError};
use driftsync_core::SyncConfig;
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};
use tracing::{debug, warn};

/// Ignore rule set for one watch session
///
/// Immutable once loaded; a new session reloads it from disk.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    /// Watched root directory (canonical)
    root: PathBuf,

    /// Compiled rules, built-ins first
    rules: Vec<Rule>,

    /// Whether the project ignore-file contributed rules
    has_project_file: bool,
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    /// Base-name matcher, absent when the pattern is not a valid glob
    glob: Option<GlobMatcher>,
    /// Set for rules starting with `/`
    rooted: Option<PathBuf>,
    /// `/<pattern>/` for interior-segment matching
    needle: String,
}

impl Rule {
    fn compile(pattern: &str) -> Option<Self> {
        // A trailing slash only marks a directory pattern; the name is what matches.
        let pattern = pattern.trim_end_matches('/');
        if pattern.is_empty() {
            return None;
        }

        let glob = match GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
        {
            Ok(glob) => Some(glob.compile_matcher()),
            Err(e) => {
                warn!(pattern, "ignore pattern is not a valid glob: {e}");
                None
            }
        };

        let rooted = pattern
            .starts_with('/')
            .then(|| clean(Path::new(pattern)));

        Some(Self {
            pattern: pattern.to_string(),
            glob,
            rooted,
            needle: format!("{MAIN_SEPARATOR}{pattern}{MAIN_SEPARATOR}"),
        })
    }

    fn matches(&self, name: &str, anchored: &Path, anchored_str: &str) -> bool {
        if let Some(glob) = &self.glob {
            if glob.is_match(name) {
                return true;
            }
        }

        match &self.rooted {
            Some(prefix) => anchored.starts_with(prefix),
            None => anchored_str.contains(&self.needle),
        }
    }
}

impl IgnoreRules {
    /// Load ignore rules for a root directory
    ///
    /// A missing ignore-file is not an error; the set then holds only the
    /// built-in rules. An ignore-file that exists but cannot be read is.
    pub fn load(root: &Path, config: &SyncConfig) -> Result<Self> {
        let root = root
            .canonicalize()
            .map_err(|e| WatchError::io(root, e))?;

        let mut patterns: Vec<String> = config.builtin_ignores.clone();

        let ignore_path = root.join(&config.ignore_file);
        let has_project_file = match std::fs::read_to_string(&ignore_path) {
            Ok(text) => {
                patterns.extend(parse_ignore_file(&text));
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(WatchError::io(ignore_path, e)),
        };

        let rules: Vec<Rule> = patterns.iter().filter_map(|p| Rule::compile(p)).collect();
        debug!(
            root = %root.display(),
            rules = rules.len(),
            project_file = has_project_file,
            "loaded ignore rules"
        );

        Ok(Self {
            root,
            rules,
            has_project_file,
        })
    }

    /// Check if a path should be excluded
    ///
    /// Paths under the root are matched relative to it; other paths are
    /// matched as given. The root itself is never excluded.
    pub fn matches(&self, path: &Path) -> bool {
        let relative = if path.is_absolute() {
            match path.strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => path,
            }
        } else {
            path
        };

        let Some(name) = relative.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };

        let anchored = if relative.is_absolute() {
            clean(relative)
        } else {
            Path::new(MAIN_SEPARATOR_STR).join(clean(relative))
        };
        let anchored_str = anchored.to_string_lossy();

        self.rules
            .iter()
            .any(|rule| rule.matches(&name, &anchored, &anchored_str))
    }

    /// Patterns in match order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.pattern.as_str())
    }

    /// Number of rule sources in effect (built-ins plus the project file)
    pub fn active_sources(&self) -> usize {
        if self.has_project_file {
            2
        } else {
            1
        }
    }

    /// Canonical watched root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Extract rules from ignore-file text
///
/// Blank lines and `#` comments are not rules.
pub fn parse_ignore_file(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Lexically normalize a path: drop `.` and repeated separators
fn clean(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load(temp_dir: &TempDir) -> IgnoreRules {
        IgnoreRules::load(temp_dir.path(), &SyncConfig::default()).unwrap()
    }

    #[test]
    fn test_builtin_patterns_always_enforced() {
        let temp_dir = TempDir::new().unwrap();
        let rules = load(&temp_dir);
        let root = rules.root().to_path_buf();

        assert!(rules.matches(&root.join(".git")));
        assert!(rules.matches(&root.join(".git/config")));
        assert!(rules.matches(&root.join("web/node_modules/react/index.js")));
        assert!(rules.matches(&root.join("web/package-lock.json")));
        assert!(rules.matches(Path::new("src/.git/HEAD")));

        assert!(!rules.matches(&root.join("src/main.rs")));
        assert!(!rules.matches(Path::new("README.md")));
        assert_eq!(rules.active_sources(), 1);
    }

    #[test]
    fn test_gitignore_parsing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".gitignore"),
            "# build output\n\n*.log\ndist\ntarget/\n  \n",
        )
        .unwrap();

        let rules = load(&temp_dir);
        let root = rules.root().to_path_buf();

        assert_eq!(rules.active_sources(), 2);
        assert!(rules.patterns().any(|p| p == "target"));
        assert!(!rules.patterns().any(|p| p.starts_with('#')));

        assert!(rules.matches(&root.join("debug.log")));
        assert!(rules.matches(&root.join("project/dist")));
        assert!(rules.matches(&root.join("project/dist/bundle.js")));
        assert!(rules.matches(&root.join("target/debug/app")));

        assert!(!rules.matches(&root.join("src/main.rs")));
        assert!(!rules.matches(&root.join("distance.go")));
    }

    #[test]
    fn test_glob_semantics_on_base_name() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".gitignore"), "*.min.?s\ntmp[0-9]\n").unwrap();

        let rules = load(&temp_dir);
        let root = rules.root().to_path_buf();

        assert!(rules.matches(&root.join("static/app.min.js")));
        assert!(rules.matches(&root.join("tmp7")));
        assert!(!rules.matches(&root.join("tmpx")));
        assert!(!rules.matches(&root.join("static/app.js")));
    }

    #[test]
    fn test_rooted_rules_anchor_at_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".gitignore"), "/build\n/docs/generated\n").unwrap();

        let rules = load(&temp_dir);
        let root = rules.root().to_path_buf();

        assert!(rules.matches(&root.join("build")));
        assert!(rules.matches(&root.join("build/out.json")));
        assert!(rules.matches(&root.join("docs/generated/api.md")));

        // Only the top-level directory is excluded
        assert!(!rules.matches(&root.join("src/build/out.json")));
        assert!(!rules.matches(&root.join("builder/main.go")));
        assert!(!rules.matches(&root.join("docs/guide.md")));
    }

    #[test]
    fn test_interior_segment_rules() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".gitignore"), "gen/proto\n").unwrap();

        let rules = load(&temp_dir);
        let root = rules.root().to_path_buf();

        assert!(rules.matches(&root.join("api/gen/proto/service.go")));
        assert!(!rules.matches(&root.join("api/gen/service.go")));
    }

    #[test]
    fn test_root_is_never_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("dist");
        fs::create_dir(&root).unwrap();
        fs::write(root.join(".gitignore"), "dist\n").unwrap();

        let rules = IgnoreRules::load(&root, &SyncConfig::default()).unwrap();
        assert!(!rules.matches(rules.root()));
        assert!(!rules.matches(&rules.root().join("index.html")));
    }

    #[test]
    fn test_invalid_glob_still_matches_segments() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".gitignore"), "cache[\n").unwrap();

        let rules = load(&temp_dir);
        let root = rules.root().to_path_buf();

        assert!(rules.matches(&root.join("a/cache[/b.go")));
        assert!(!rules.matches(&root.join("a/cache/b.go")));
    }

    #[test]
    fn test_unreadable_ignore_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the ignore-file should be cannot be read as text
        fs::create_dir(temp_dir.path().join(".gitignore")).unwrap();

        let result = IgnoreRules::load(temp_dir.path(), &SyncConfig::default());
        assert!(matches!(result, Err(WatchError::Io { .. })));
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = IgnoreRules::load(&temp_dir.path().join("nope"), &SyncConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_builtins() {
        let temp_dir = TempDir::new().unwrap();
        let config = SyncConfig {
            builtin_ignores: vec!["vendor".to_string()],
            ..SyncConfig::default()
        };

        let rules = IgnoreRules::load(temp_dir.path(), &config).unwrap();
        let root = rules.root().to_path_buf();

        assert!(rules.matches(&root.join("vendor/lib.go")));
        assert!(!rules.matches(&root.join(".git/config")));
    }
}
