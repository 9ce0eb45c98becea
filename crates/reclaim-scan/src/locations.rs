//! Well-known temporary and cache directories per platform.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::{Display, EnumIter};

/// Operating system family, as far as cache locations are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Platform {
    Windows,
    #[strum(to_string = "macOS")]
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// Platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// Category of reclaimable location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
pub enum LocationKind {
    #[strum(to_string = "System temp")]
    SystemTemp,
    #[strum(to_string = "Browser cache")]
    BrowserCache,
    #[strum(to_string = "Package cache")]
    PackageCache,
}

impl LocationKind {
    /// Fixed candidate directories for a platform and home directory.
    ///
    /// Nothing is checked against the filesystem.
    pub fn candidates(self, platform: Platform, home: &Path) -> Vec<PathBuf> {
        let join = |parts: &[&str]| parts.iter().fold(home.to_path_buf(), |p, part| p.join(part));

        match (self, platform) {
            (Self::SystemTemp, Platform::MacOs) => vec![
                PathBuf::from("/tmp"),
                PathBuf::from("/var/tmp"),
                join(&["Library", "Caches"]),
            ],
            (Self::SystemTemp, Platform::Linux) => vec![
                PathBuf::from("/tmp"),
                PathBuf::from("/var/tmp"),
                PathBuf::from("/var/cache"),
            ],
            (Self::SystemTemp, _) => Vec::new(),

            (Self::BrowserCache, Platform::Windows) => vec![
                join(&["AppData", "Local", "Google", "Chrome", "User Data", "Default", "Cache"]),
                join(&["AppData", "Local", "Mozilla", "Firefox", "Profiles"]),
                join(&["AppData", "Local", "Microsoft", "Edge", "User Data", "Default", "Cache"]),
            ],
            (Self::BrowserCache, Platform::MacOs) => vec![
                join(&["Library", "Caches", "Google", "Chrome"]),
                join(&["Library", "Caches", "Firefox"]),
                join(&["Library", "Caches", "com.apple.Safari"]),
            ],
            (Self::BrowserCache, Platform::Linux) => vec![
                join(&[".cache", "google-chrome"]),
                join(&[".cache", "mozilla", "firefox"]),
                join(&[".cache", "chromium"]),
            ],
            (Self::BrowserCache, Platform::Other) => Vec::new(),

            (Self::PackageCache, Platform::Windows) => vec![
                join(&["AppData", "Local", "pip", "Cache"]),
                join(&["AppData", "Local", "Temp", "chocolatey"]),
            ],
            (Self::PackageCache, Platform::MacOs) => vec![
                join(&["Library", "Caches", "pip"]),
                join(&["Library", "Caches", "Homebrew"]),
            ],
            (Self::PackageCache, Platform::Linux) => vec![
                PathBuf::from("/var/cache/apt/archives"),
                PathBuf::from("/var/cache/pacman/pkg"),
                PathBuf::from("/var/cache/yum"),
                join(&[".cache", "pip"]),
            ],
            (Self::PackageCache, Platform::Other) => Vec::new(),
        }
    }

    /// Candidate directories on this machine that actually exist.
    ///
    /// System temp also includes the process temp directory and, on Windows,
    /// the `TEMP`, `TMP` and `WINDIR\Temp` locations.
    pub fn existing(self) -> Vec<PathBuf> {
        let home = dirs::home_dir().unwrap_or_default();
        let mut paths = Vec::new();
        if self == Self::SystemTemp {
            paths.extend(environment_temp_dirs());
        }
        paths.extend(self.candidates(Platform::current(), &home));
        existing_directories(paths)
    }
}

/// Temp directories named by the process environment.
fn environment_temp_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![std::env::temp_dir()];
    if Platform::current() == Platform::Windows {
        dirs.extend(std::env::var_os("TEMP").map(PathBuf::from));
        dirs.extend(std::env::var_os("TMP").map(PathBuf::from));
        dirs.extend(std::env::var_os("WINDIR").map(|w| PathBuf::from(w).join("Temp")));
    }
    dirs
}

/// Keep existing directories, dropping duplicates but preserving order.
pub fn existing_directories(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| !p.as_os_str().is_empty() && p.is_dir())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use tempfile::TempDir;

    #[test]
    fn test_linux_candidates() {
        let home = Path::new("/home/alice");
        assert_eq!(
            LocationKind::BrowserCache.candidates(Platform::Linux, home),
            [
                PathBuf::from("/home/alice/.cache/google-chrome"),
                PathBuf::from("/home/alice/.cache/mozilla/firefox"),
                PathBuf::from("/home/alice/.cache/chromium"),
            ]
        );
        assert!(
            LocationKind::PackageCache
                .candidates(Platform::Linux, home)
                .contains(&PathBuf::from("/var/cache/apt/archives"))
        );
        assert!(
            LocationKind::SystemTemp
                .candidates(Platform::Linux, home)
                .contains(&PathBuf::from("/var/tmp"))
        );
    }

    #[test]
    fn test_macos_candidates_use_library() {
        let home = Path::new("/Users/bob");
        for kind in LocationKind::iter() {
            for path in kind.candidates(Platform::MacOs, home) {
                assert!(
                    path.starts_with("/Users/bob/Library") || path.starts_with("/tmp") || path.starts_with("/var/tmp"),
                    "{kind}: {}",
                    path.display()
                );
            }
        }
    }

    #[test]
    fn test_unknown_platform_has_no_candidates() {
        for kind in LocationKind::iter() {
            assert!(kind.candidates(Platform::Other, Path::new("/home/x")).is_empty());
        }
    }

    #[test]
    fn test_existing_directories_dedupes_and_filters() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let file = temp.path().join("file");
        std::fs::create_dir(&a).unwrap();
        std::fs::write(&file, "x").unwrap();

        let found = existing_directories([
            a.clone(),
            temp.path().join("missing"),
            a.clone(),
            file,
            PathBuf::new(),
        ]);
        assert_eq!(found, [a]);
    }

    #[test]
    fn test_system_temp_exists() {
        assert!(!LocationKind::SystemTemp.existing().is_empty());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(LocationKind::SystemTemp.to_string(), "System temp");
        assert_eq!(Platform::MacOs.to_string(), "macOS");
    }
}
