use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

pub enum EnvKey {
    ServerHost,
    ServerPort,
    StorageDir,
    PublicBaseUrl,
    FfmpegBin,
    MinOutputBytes,
    StreamChunkBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerHost => "APP_HOST",
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::StorageDir => "STORAGE_DIR",
            EnvKey::PublicBaseUrl => "PUBLIC_BASE_URL",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::MinOutputBytes => "MIN_OUTPUT_BYTES",
            EnvKey::StreamChunkBytes => "STREAM_CHUNK_BYTES",
        }
    }
}

pub fn get(key: &EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    get(&key).unwrap_or_else(|_| default.to_string())
}

/// Like `get_or`, but a value that does not parse is reported and replaced
/// by `default` rather than aborting startup.
pub fn get_parsed<T: FromStr + Display>(key: EnvKey, default: T) -> T {
    let raw = get(&key).ok();
    parse_or_default(&key, raw.as_deref(), default)
}

fn parse_or_default<T: FromStr + Display>(key: &EnvKey, raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(
                "⚠️ {}={:?} is not valid, falling back to {}",
                key.as_str(),
                raw,
                default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_key_uses_default() {
        assert_eq!(parse_or_default(&EnvKey::MinOutputBytes, None, 10_000u64), 10_000);
    }

    #[test]
    fn valid_value_is_parsed() {
        assert_eq!(
            parse_or_default(&EnvKey::StreamChunkBytes, Some(" 4096 "), 1usize),
            4096
        );
    }

    #[test]
    fn garbage_falls_back_to_default() {
        assert_eq!(
            parse_or_default(&EnvKey::MinOutputBytes, Some("ten thousand"), 10_000u64),
            10_000
        );
        assert_eq!(parse_or_default(&EnvKey::ServerPort, Some("-1"), 3000u16), 3000);
    }
}
