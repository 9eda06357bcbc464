//! A shell script standing in for yt-dlp
//!
//! Every invocation appends its arguments to `calls.log`. The script body
//! decides what to print and which file to create; `OUT_FILE` holds the `-o`
//! template with `%(ext)s` replaced by `mp3` or `mp4`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use mediabot::core::config::{CookiesSource, YtDlpConfig};
use mediabot::download::cookies::CookieArgs;
use mediabot::download::YtDlp;
use tempfile::TempDir;

/// Metadata for a 3:25 video advertising 360p and 480p.
pub const METADATA_JSON: &str = r#"{"id":"abc123","title":"My Video","duration":205,"formats":[{"format_id":"140","vcodec":"none","acodec":"mp4a"},{"format_id":"134","vcodec":"avc1","height":360},{"format_id":"135","vcodec":"avc1","height":480}]}"#;

const PRELUDE: &str = r#"
OUT=""
PREV=""
for a in "$@"; do
  if [ "$PREV" = "-o" ]; then OUT="$a"; fi
  PREV="$a"
done
EXT=mp4
case "$*" in *--audio-format*) EXT=mp3;; esac
OUT_FILE=$(printf '%s' "$OUT" | sed "s/%(ext)s/$EXT/")
"#;

pub struct FakeYtDlp {
    pub dir: TempDir,
    pub bin: PathBuf,
    pub log: PathBuf,
}

impl FakeYtDlp {
    /// Writes the script; `body` runs after argument parsing.
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("yt-dlp");
        let log = dir.path().join("calls.log");

        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\n{}\n{}\n",
            log.display(),
            PRELUDE,
            body
        );
        fs::write(&bin, script).unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, bin, log }
    }

    /// A fake that answers metadata requests with `json` and creates the output file on download.
    pub fn serving(json: &str) -> Self {
        Self::new(&format!(
            r#"case "$*" in
  *--dump-single-json*) printf '%s' '{}'; exit 0;;
esac
printf 'media' > "$OUT_FILE"
"#,
            json
        ))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.dir.path().join("downloads")
    }

    pub fn config(&self, max_file_size_mb: u64) -> YtDlpConfig {
        YtDlpConfig {
            bin: self.bin.to_string_lossy().to_string(),
            plugin_dir: "./custom_plugins".into(),
            js_runtime: "node".into(),
            download_dir: self.download_dir(),
            max_file_size_mb,
            max_title_chars: 80,
            cookies: CookiesSource::None,
        }
    }

    pub fn ytdlp(&self, max_file_size_mb: u64) -> YtDlp {
        YtDlp::new(self.config(max_file_size_mb), CookieArgs::none())
    }

    /// Argument lines of every invocation so far.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Invocations that were downloads (not metadata or version checks).
    pub fn download_calls(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.contains(" -o ")).collect()
    }

    /// Files currently in the download directory.
    pub fn downloaded_files(&self) -> Vec<PathBuf> {
        fs::read_dir(self.download_dir())
            .map(|entries| entries.flatten().map(|e| e.path()).collect())
            .unwrap_or_default()
    }
}
