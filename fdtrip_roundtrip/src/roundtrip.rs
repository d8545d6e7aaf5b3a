use fdtrip_api::{FileHandle, FileOps, ReadBuffer, StepError};
use libc::off_t;
use log::{debug, info, warn};
use nix::unistd::Whence;
use std::path::{Path, PathBuf};

/// デフォルトの対象ファイル（カレントディレクトリからの相対パス）
pub const DEFAULT_PATH: &str = "example.txt";

/// 起動時に標準出力へ表示するバナー
pub const BANNER: &str = "Posix File System Operations";

/// 書き込むリテラル
pub const WRITE_PAYLOAD: &[u8] = b"Hello, World!\n";

/// 書き込むバイト数
/// リテラルの長さから導出せず、固定値のまま扱う
pub const WRITE_LEN: usize = 14;

/// ラウンドトリップ設定
#[derive(Debug, Clone)]
pub struct RoundTripConfig {
    /// 対象ファイルのパス
    pub path: PathBuf,
    /// 読み込み直後のオフセットに書き込むバイト列
    pub payload: Vec<u8>,
}

impl Default for RoundTripConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            payload: WRITE_PAYLOAD[..WRITE_LEN].to_vec(),
        }
    }
}

impl RoundTripConfig {
    /// 新しい設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 対象パスを設定
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// 書き込むバイト列を設定
    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }
}

/// 1回の実行の統計情報
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoundTripStats {
    /// read(2) が返したバイト数
    pub bytes_read: usize,
    /// ペイロードを書き込んだオフセット
    pub write_offset: off_t,
    /// write(2) が返したバイト数
    pub bytes_written: usize,
    /// lseek(2) 後のオフセット
    pub final_offset: off_t,
}

/// open → read → write → lseek → close を順に実行する
///
/// 最初に失敗したステップで中断し、開いていたディスクリプタは
/// `FileHandle` のドロップで必ず解放される。
pub struct FileRoundTrip<O: FileOps> {
    config: RoundTripConfig,
    ops: O,
    stats: RoundTripStats,
}

impl<O: FileOps> FileRoundTrip<O> {
    pub fn new(config: RoundTripConfig, ops: O) -> Self {
        Self {
            config,
            ops,
            stats: RoundTripStats::default(),
        }
    }

    /// 5つのステップを実行
    pub fn run(&mut self) -> Result<RoundTripStats, StepError> {
        self.stats = RoundTripStats::default();
        let path: &Path = &self.config.path;

        info!("opening {}", path.display());
        let mut handle = FileHandle::open(&mut self.ops, path)?;

        let mut buffer = ReadBuffer::new();
        let bytes_read = handle.read_into(&mut buffer)?;
        debug!("read {} bytes: {:?}", bytes_read, buffer);
        self.stats.bytes_read = bytes_read;
        // 読み込みでオフセットは読んだ分だけ進んでいる
        self.stats.write_offset = bytes_read as off_t;

        let payload = &self.config.payload;
        let bytes_written = handle.write(payload)?;
        if bytes_written < payload.len() {
            warn!(
                "short write to {}: {} of {} bytes",
                path.display(),
                bytes_written,
                payload.len()
            );
        }
        debug!(
            "wrote {} bytes at offset {}",
            bytes_written, self.stats.write_offset
        );
        self.stats.bytes_written = bytes_written;

        self.stats.final_offset = handle.seek(0, Whence::SeekSet)?;
        debug!("rewound to offset {}", self.stats.final_offset);

        handle.close()?;
        info!(
            "round trip on {} complete (read {}, wrote {})",
            path.display(),
            self.stats.bytes_read,
            self.stats.bytes_written
        );

        Ok(self.stats.clone())
    }

    pub fn config(&self) -> &RoundTripConfig {
        &self.config
    }

    /// 統計情報を取得（失敗した実行では途中までの値）
    pub fn stats(&self) -> &RoundTripStats {
        &self.stats
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub fn into_ops(self) -> O {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdtrip_api::{PosixOps, Step};
    use fdtrip_hooks::{CountingOps, FaultInjector};
    use nix::errno::Errno;

    fn scratch(contents: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_PATH);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_config_builder() {
        let config = RoundTripConfig::new()
            .path("other.txt")
            .payload(b"xyz");

        assert_eq!(config.path, PathBuf::from("other.txt"));
        assert_eq!(config.payload, b"xyz");
    }

    #[test]
    fn test_default_config() {
        let config = RoundTripConfig::default();
        assert_eq!(config.path, PathBuf::from("example.txt"));
        assert_eq!(config.payload, b"Hello, World!\n");
        assert_eq!(config.payload.len(), WRITE_LEN);
    }

    #[test]
    fn test_empty_file() {
        let (_dir, path) = scratch(b"");
        let mut rt = FileRoundTrip::new(RoundTripConfig::new().path(&path), PosixOps);

        let stats = rt.run().unwrap();
        assert_eq!(
            stats,
            RoundTripStats {
                bytes_read: 0,
                write_offset: 0,
                bytes_written: 14,
                final_offset: 0,
            }
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"Hello, World!\n");
    }

    #[test]
    fn test_short_file_appends_after_read() {
        let (_dir, path) = scratch(b"abc");
        let mut rt = FileRoundTrip::new(RoundTripConfig::new().path(&path), PosixOps);

        let stats = rt.run().unwrap();
        assert_eq!(stats.bytes_read, 3);
        assert_eq!(stats.write_offset, 3);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcHello, World!\n");
    }

    #[test]
    fn test_long_file_overwrites_at_99() {
        let original = vec![b'a'; 200];
        let (_dir, path) = scratch(&original);
        let mut rt = FileRoundTrip::new(RoundTripConfig::new().path(&path), PosixOps);

        let stats = rt.run().unwrap();
        assert_eq!(stats.bytes_read, 99);
        assert_eq!(stats.write_offset, 99);

        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents.len(), 200);
        assert_eq!(&contents[..99], &original[..99]);
        assert_eq!(&contents[99..113], b"Hello, World!\n");
        assert_eq!(&contents[113..], &original[113..]);
    }

    #[test]
    fn test_repeated_runs_keep_prefix() {
        let (_dir, path) = scratch(b"");

        for _ in 0..2 {
            let mut rt = FileRoundTrip::new(RoundTripConfig::new().path(&path), PosixOps);
            rt.run().unwrap();
            let contents = std::fs::read(&path).unwrap();
            assert_eq!(&contents[..14], b"Hello, World!\n");
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_PATH);
        let ops = CountingOps::new(PosixOps);
        let mut rt = FileRoundTrip::new(RoundTripConfig::new().path(&path), ops);

        assert_eq!(rt.run(), Err(StepError::Open(Errno::ENOENT)));
        assert_eq!(rt.ops().counts().close, 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_read_only_file() {
        use std::os::unix::fs::PermissionsExt;

        // rootはパーミッションを無視して開けてしまう
        if unsafe { libc::geteuid() } == 0 {
            return;
        }

        let (_dir, path) = scratch(b"keep me");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

        let mut rt = FileRoundTrip::new(RoundTripConfig::new().path(&path), PosixOps);
        assert_eq!(rt.run(), Err(StepError::Open(Errno::EACCES)));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
    }

    #[test]
    fn test_real_write_failure() {
        // /dev/full は root でも開けて読めるが、書き込みは ENOSPC で失敗する
        let ops = CountingOps::new(PosixOps);
        let mut rt = FileRoundTrip::new(RoundTripConfig::new().path("/dev/full"), ops);

        assert_eq!(rt.run(), Err(StepError::Write(Errno::ENOSPC)));
        assert_eq!(rt.config().path, PathBuf::from("/dev/full"));
        assert_eq!(rt.stats().bytes_read, 99);
        assert_eq!(rt.stats().bytes_written, 0);

        let counts = rt.ops().counts();
        assert_eq!(counts.write, 1);
        assert_eq!(counts.lseek, 0);
        assert_eq!(counts.close, 1);
    }

    #[test]
    fn test_injected_failure_at_each_step() {
        for step in Step::ALL {
            let (_dir, path) = scratch(b"abc");
            let ops = FaultInjector::new(CountingOps::new(PosixOps)).fail_at(step, Errno::EIO);
            let mut rt = FileRoundTrip::new(RoundTripConfig::new().path(&path), ops);

            assert_eq!(rt.run(), Err(StepError::new(step, Errno::EIO)), "step {}", step);

            let injector = rt.into_ops();
            assert_eq!(injector.injected(), 1, "step {}", step);

            let counts = injector.into_inner().counts();
            let expected_closes = if step == Step::Open { 0 } else { 1 };
            assert_eq!(counts.close, expected_closes, "step {}", step);

            let contents = std::fs::read(&path).unwrap();
            match step {
                Step::Open | Step::Read | Step::Write => assert_eq!(contents, b"abc"),
                Step::Seek | Step::Close => assert_eq!(contents, b"abcHello, World!\n"),
            }
        }
    }

    #[test]
    fn test_stats_on_failure() {
        let (_dir, path) = scratch(b"abcdef");
        let ops = FaultInjector::new(PosixOps).fail_at(Step::Seek, Errno::ESPIPE);
        let mut rt = FileRoundTrip::new(RoundTripConfig::new().path(&path), ops);

        assert_eq!(rt.run(), Err(StepError::Seek(Errno::ESPIPE)));
        assert_eq!(rt.stats().bytes_read, 6);
        assert_eq!(rt.stats().bytes_written, 14);
        assert_eq!(rt.stats().final_offset, 0);
    }

    #[test]
    fn test_custom_payload() {
        let (_dir, path) = scratch(b"12345");
        let config = RoundTripConfig::new().path(&path).payload(b"!!");
        let mut rt = FileRoundTrip::new(config, PosixOps);

        let stats = rt.run().unwrap();
        assert_eq!(stats.bytes_written, 2);
        assert_eq!(std::fs::read(&path).unwrap(), b"12345!!");
    }
}
