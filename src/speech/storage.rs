//! Reference pronunciation files served from the static directory.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// URL prefix under which stored files are served.
pub const STATIC_URL_PREFIX: &str = "/static";

const PLACEHOLDER_SUFFIX: &str = "_placeholder";

/// Directory of synthesized audio, addressed by file name.
#[derive(Debug, Clone)]
pub struct ReferenceAudioStore {
    dir: PathBuf,
}

impl ReferenceAudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Store the reference audio for `word` and return its public URL.
    ///
    /// Saving the same word twice overwrites the earlier file.
    pub async fn save(&self, word: &str, audio: &[u8]) -> io::Result<String> {
        self.write(file_name_for(word, ""), audio).await
    }

    /// Store placeholder audio for `word` next to, never over, its real clip.
    pub async fn save_placeholder(&self, word: &str, audio: &[u8]) -> io::Result<String> {
        self.write(file_name_for(word, PLACEHOLDER_SUFFIX), audio).await
    }

    async fn write(&self, file_name: String, audio: &[u8]) -> io::Result<String> {
        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&file_name), audio).await?;
        Ok(format!("{}/{}", STATIC_URL_PREFIX, file_name))
    }

    /// Path of a stored file, or `None` if the name could escape the directory.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        let valid = !file_name.is_empty()
            && !file_name.starts_with('.')
            && file_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        valid.then(|| self.dir.join(file_name))
    }
}

/// `<word><suffix>.mp3` with everything but ASCII letters, digits, `-` and `_`
/// dropped from the word.
fn file_name_for(word: &str, suffix: &str) -> String {
    let stem: String = word
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if stem.is_empty() {
        format!("{}{}.mp3", Uuid::new_v4(), suffix)
    } else {
        format!("{}{}.mp3", stem, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_keeps_safe_characters() {
        assert_eq!(file_name_for("hello", ""), "hello.mp3");
        assert_eq!(file_name_for("well-known_word", ""), "well-known_word.mp3");
        assert_eq!(file_name_for("../../etc/passwd", ""), "etcpasswd.mp3");
        assert_eq!(file_name_for(" it's ", "_placeholder"), "its_placeholder.mp3");
    }

    #[test]
    fn test_unusable_word_gets_random_name() {
        let name = file_name_for("¿?", "");
        assert!(name.ends_with(".mp3"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let store = ReferenceAudioStore::new("static");
        assert_eq!(store.resolve("cat.mp3"), Some(PathBuf::from("static/cat.mp3")));
        assert!(store.resolve("../secret").is_none());
        assert!(store.resolve("a/b.mp3").is_none());
        assert!(store.resolve(".env").is_none());
        assert!(store.resolve("").is_none());
    }

    #[tokio::test]
    async fn test_save_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReferenceAudioStore::new(dir.path().join("static"));

        let url = store.save("Hello", b"mp3-bytes").await.unwrap();

        assert_eq!(url, "/static/Hello.mp3");
        let written = std::fs::read(dir.path().join("static").join("Hello.mp3")).unwrap();
        assert_eq!(written, b"mp3-bytes");
    }

    #[tokio::test]
    async fn test_placeholder_keeps_real_clip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReferenceAudioStore::new(dir.path());

        store.save("cat", b"real").await.unwrap();
        let url = store.save_placeholder("cat", b"fake").await.unwrap();

        assert_eq!(url, "/static/cat_placeholder.mp3");
        assert_eq!(std::fs::read(dir.path().join("cat.mp3")).unwrap(), b"real");
        assert_eq!(std::fs::read(dir.path().join("cat_placeholder.mp3")).unwrap(), b"fake");
    }
}
