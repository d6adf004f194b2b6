//! Ingestion layer for recorded conversations
//!
//! Locates the conversations directory, discovers conversation subdirectories,
//! and loads each one into a [`LoadedConversation`].
//!
//! ## Layout
//!
//! ```text
//! <conversations>/
//! └── 0f3c…e9a1/                 32 hex characters
//!     ├── base_state.json        model, title, token counters
//!     └── events/
//!         ├── event-00000-….json
//!         └── event-00001-….json filename order is event order
//! ```

mod conversation;

pub use conversation::{load_conversation, LoadedConversation, BASE_STATE_FILE, EVENTS_DIR};

use crate::config::{expand_tilde, Config};
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The directory conversations are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationsDir {
    pub path: PathBuf,
    /// False when reading the default `~/.openhands/conversations`
    pub is_custom: bool,
}

impl ConversationsDir {
    /// Name shown by the presentation layer.
    pub fn display_name(&self) -> String {
        if !self.is_custom {
            return "OpenHands".to_string();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Resolve the conversations directory.
///
/// Without an explicit path this is `~/.openhands/conversations`. An explicit
/// path is tilde-expanded and canonicalized; when it has a `conversations`
/// subdirectory, that subdirectory is used instead.
pub fn resolve_conversations_dir(input: Option<&Path>) -> ConversationsDir {
    let default_dir = Config::default_conversations_dir();

    let Some(input) = input else {
        return ConversationsDir {
            path: default_dir,
            is_custom: false,
        };
    };

    let expanded = expand_tilde(input);
    let mut resolved = std::fs::canonicalize(&expanded).unwrap_or(expanded);

    let nested = resolved.join("conversations");
    if nested.is_dir() {
        resolved = nested;
    }

    let canonical_default = std::fs::canonicalize(&default_dir).unwrap_or(default_dir);
    let is_custom = resolved != canonical_default;

    ConversationsDir {
        path: resolved,
        is_custom,
    }
}

/// True for directory names that look like conversation ids (32 hex characters).
pub fn is_conversation_id(name: &str) -> bool {
    name.len() == 32 && name.chars().all(|c| c.is_ascii_hexdigit())
}

/// List conversation directories, most recently modified first.
///
/// A missing `root` yields an empty list; callers report it.
pub fn discover_conversations(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(vec![]);
    }

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        let is_match = path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .map(is_conversation_id)
                .unwrap_or(false);
        if !is_match {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((modified, path));
    }

    // newest first; path breaks ties so output is deterministic
    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    tracing::debug!(root = %root.display(), count = found.len(), "Discovered conversations");
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_conversation_id() {
        assert!(is_conversation_id("0123456789abcdef0123456789abcdef"));
        assert!(is_conversation_id("0123456789ABCDEF0123456789ABCDEF"));
        assert!(!is_conversation_id("0123456789abcdef"));
        assert!(!is_conversation_id("0123456789abcdef0123456789abcdeg"));
        assert!(!is_conversation_id(""));
    }

    #[test]
    fn test_discover_filters_non_conversation_entries() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("0123456789abcdef0123456789abcdef")).unwrap();
        std::fs::create_dir(root.join("fedcba9876543210fedcba9876543210")).unwrap();
        std::fs::create_dir(root.join("not-a-conversation")).unwrap();
        std::fs::write(root.join("abcdefabcdefabcdefabcdefabcdefab"), "file").unwrap();

        let found = discover_conversations(root).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.is_dir()));
    }

    #[test]
    fn test_discover_orders_newest_first_with_path_tie_break() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let ids = [
            "cccccccccccccccccccccccccccccccc",
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
            "dddddddddddddddddddddddddddddddd",
        ];
        for id in ids {
            std::fs::create_dir(root.join(id)).unwrap();
        }

        let base = 1_700_000_000;
        let set_mtime = |id: &str, secs: i64| {
            let time = filetime::FileTime::from_unix_time(secs, 0);
            filetime::set_file_mtime(root.join(id), time).unwrap();
        };
        set_mtime(ids[0], base);
        set_mtime(ids[1], base + 100);
        set_mtime(ids[2], base + 100);
        set_mtime(ids[3], base + 50);

        let found = discover_conversations(root).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                "dddddddddddddddddddddddddddddddd",
                "cccccccccccccccccccccccccccccccc",
            ]
        );
    }

    #[test]
    fn test_discover_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let found = discover_conversations(&dir.path().join("absent")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_resolve_prefers_nested_conversations_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("conversations")).unwrap();

        let resolved = resolve_conversations_dir(Some(dir.path()));
        assert!(resolved.is_custom);
        assert!(resolved.path.ends_with("conversations"));
        assert_eq!(resolved.display_name(), "conversations");
    }

    #[test]
    fn test_resolve_custom_dir_name() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("my-runs");
        std::fs::create_dir(&custom).unwrap();

        let resolved = resolve_conversations_dir(Some(&custom));
        assert!(resolved.is_custom);
        assert_eq!(resolved.display_name(), "my-runs");
    }

    #[test]
    fn test_default_dir_is_not_custom() {
        let resolved = resolve_conversations_dir(None);
        assert!(!resolved.is_custom);
        assert_eq!(resolved.display_name(), "OpenHands");
        assert!(resolved.path.ends_with(".openhands/conversations"));
    }
}
