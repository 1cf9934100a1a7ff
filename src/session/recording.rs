use rand::Rng;
use std::path::PathBuf;

use crate::audio::WavClip;

const FILENAME_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const FILENAME_SUFFIX_LEN: usize = 4;

/// A captured clip waiting for the user to upload or discard it
#[derive(Debug, Clone)]
pub struct HeldRecording {
    /// `{username}_{unix_secs}_{suffix}.wav`
    pub filename: String,
    /// Local copy written at capture time
    pub local_path: PathBuf,
    pub clip: WavClip,
}

impl HeldRecording {
    /// Object key the clip is uploaded under
    pub fn object_key(&self) -> String {
        format!("{}{}", crate::store::AUDIO_PREFIX, self.filename)
    }
}

/// Build a recording filename for `username` captured at `unix_secs`.
///
/// Path separators in the username are replaced with `_` so the name stays a
/// single path component.
pub fn recording_filename<R: Rng + ?Sized>(username: &str, unix_secs: i64, rng: &mut R) -> String {
    let user: String = username
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    let suffix: String = (0..FILENAME_SUFFIX_LEN)
        .map(|_| FILENAME_SUFFIX_CHARS[rng.gen_range(0..FILENAME_SUFFIX_CHARS.len())] as char)
        .collect();

    format!("{}_{}_{}.wav", user, unix_secs, suffix)
}
