//! `ffmpeg` subprocess resampler

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::Transcoder;
use crate::audio::{AudioFormatTag, TELEPHONY_SAMPLE_RATE};
use crate::config::TranscoderConfig;
use crate::error::{Error, Result};

/// Runs one `ffmpeg` process per conversion
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    raw_source_rate: u32,
    timeout: Option<Duration>,
    scratch_dir: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(config: &TranscoderConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            raw_source_rate: config.raw_source_rate,
            timeout: config.timeout(),
            scratch_dir: config.scratch_dir(),
        }
    }

    /// Bound each run; the child is killed when the limit passes
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Directory the per-call input and output files are created in
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Check that the binary starts and answers `-version`
    pub async fn probe(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Build the argument list for one conversion.
    ///
    /// Containerless input has to be described to ffmpeg before `-i`.
    pub fn build_args(&self, input: &Path, output: &Path, hint: AudioFormatTag) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into()];

        if hint.is_containerless() {
            args.extend(
                [
                    "-f".to_string(),
                    "s16le".to_string(),
                    "-ar".to_string(),
                    self.raw_source_rate.to_string(),
                    "-ac".to_string(),
                    "1".to_string(),
                ]
                .map(OsString::from),
            );
        }

        args.push("-i".into());
        args.push(input.as_os_str().to_owned());
        args.extend(
            [
                "-f".to_string(),
                "s16le".to_string(),
                "-ar".to_string(),
                TELEPHONY_SAMPLE_RATE.to_string(),
                "-ac".to_string(),
                "1".to_string(),
                "-acodec".to_string(),
                "pcm_s16le".to_string(),
            ]
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Create an empty, exclusively owned file in the scratch dir.
    ///
    /// The returned path removes the file when dropped.
    fn scratch_file(&self, role: &str, extension: &str) -> Result<TempPath> {
        let file = tempfile::Builder::new()
            .prefix(&format!("voxline-{}-", role))
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.scratch_dir)?;
        Ok(file.into_temp_path())
    }

    async fn run(&self, args: &[OsString]) -> Result<()> {
        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!("Failed to spawn {:?}: {}", self.binary, e);
                Error::SpawnFailure(e)
            })?;

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                warn!("Resampler exceeded {:?}, killing it", limit);
                Error::Timeout { limit }
            })??,
            None => wait.await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("")
                .to_string();
            warn!(
                code = ?output.status.code(),
                "Resampler failed: {}", last_line
            );
            return Err(Error::SubprocessFailure {
                code: output.status.code(),
                stderr: last_line,
            });
        }

        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(&TranscoderConfig::default())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn normalize(&self, audio: &[u8], hint: AudioFormatTag) -> Result<Vec<u8>> {
        let input = self.scratch_file("input", hint.extension())?;
        let output = self.scratch_file("output", "pcm")?;

        // Only the name is kept; a missing file after a clean exit means the
        // resampler wrote nothing.
        tokio::fs::remove_file(&output).await?;
        tokio::fs::write(&input, audio).await?;

        if hint.is_containerless() {
            debug!(
                source_rate = self.raw_source_rate,
                "Input has no container, assuming mono s16le"
            );
        }

        let args = self.build_args(&input, &output, hint);
        self.run(&args).await?;

        let pcm = match tokio::fs::read(&output).await {
            Ok(pcm) => pcm,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::OutputMissing(output.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        drop(output);
        drop(input);

        info!(
            format = %hint,
            input_bytes = audio.len(),
            output_bytes = pcm.len(),
            "Normalized audio to 8 kHz PCM"
        );
        Ok(pcm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_container_input_args() {
        let transcoder = FfmpegTranscoder::default();
        let args = transcoder.build_args(
            Path::new("/tmp/in.wav"),
            Path::new("/tmp/out.pcm"),
            AudioFormatTag::Wav,
        );
        assert_eq!(
            args_as_strings(&args),
            vec![
                "-y", "-i", "/tmp/in.wav", "-f", "s16le", "-ar", "8000", "-ac", "1", "-acodec",
                "pcm_s16le", "/tmp/out.pcm"
            ]
        );
    }

    #[test]
    fn test_raw_input_flags_precede_input_path() {
        let transcoder = FfmpegTranscoder::default();
        let args = args_as_strings(&transcoder.build_args(
            Path::new("/tmp/in.pcm"),
            Path::new("/tmp/out.pcm"),
            AudioFormatTag::RawPcm,
        ));
        assert_eq!(
            args,
            vec![
                "-y", "-f", "s16le", "-ar", "24000", "-ac", "1", "-i", "/tmp/in.pcm", "-f",
                "s16le", "-ar", "8000", "-ac", "1", "-acodec", "pcm_s16le", "/tmp/out.pcm"
            ]
        );
    }

    #[test]
    fn test_raw_source_rate_is_configurable() {
        let config = TranscoderConfig {
            raw_source_rate: 16000,
            ..Default::default()
        };
        let transcoder = FfmpegTranscoder::new(&config);
        let args = args_as_strings(&transcoder.build_args(
            Path::new("in.pcm"),
            Path::new("out.pcm"),
            AudioFormatTag::Unknown,
        ));
        assert_eq!(&args[1..7], &["-f", "s16le", "-ar", "16000", "-ac", "1"]);
    }

    #[test]
    fn test_mp3_has_no_input_flags() {
        let transcoder = FfmpegTranscoder::default();
        let args = args_as_strings(&transcoder.build_args(
            Path::new("in.mp3"),
            Path::new("out.pcm"),
            AudioFormatTag::Mp3,
        ));
        assert_eq!(&args[..3], &["-y", "-i", "in.mp3"]);
    }

    #[test]
    fn test_scratch_dir_follows_config_and_override() {
        let config = TranscoderConfig {
            scratch_dir: Some(PathBuf::from("/var/tmp/voxline")),
            ..Default::default()
        };
        let transcoder = FfmpegTranscoder::new(&config);
        assert_eq!(transcoder.scratch_dir(), Path::new("/var/tmp/voxline"));

        let transcoder = transcoder.with_scratch_dir("/srv/scratch");
        assert_eq!(transcoder.scratch_dir(), Path::new("/srv/scratch"));
    }

    #[test]
    fn test_scratch_files_are_tagged_and_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::default().with_scratch_dir(dir.path());

        let first = transcoder.scratch_file("input", "wav").unwrap();
        let second = transcoder.scratch_file("input", "wav").unwrap();
        assert_ne!(&*first, &*second);
        assert_eq!(first.parent(), Some(dir.path()));

        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("voxline-input-"));
        assert!(name.ends_with(".wav"));

        drop(first);
        drop(second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_scratch_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::default().with_scratch_dir(dir.path().join("absent"));

        let err = transcoder
            .normalize(&[0u8; 64], AudioFormatTag::RawPcm)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = TranscoderConfig {
            binary: PathBuf::from("/nonexistent/voxline-ffmpeg"),
            scratch_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let transcoder = FfmpegTranscoder::new(&config);

        assert!(!transcoder.probe().await);
        let err = transcoder
            .normalize(&[0u8; 64], AudioFormatTag::RawPcm)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SpawnFailure(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
