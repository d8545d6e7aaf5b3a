use nix::errno::Errno;
use std::fmt;
use std::str::FromStr;

mod buffer;
pub mod file_ops;
mod handle;

pub use buffer::{ReadBuffer, READ_BUFFER_CAPACITY};
pub use file_ops::{FileOps, PosixOps};
pub use handle::FileHandle;

/// ラウンドトリップを構成する各ステップ
/// 実行順に並んでいる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// open(2)
    Open,
    /// read(2)
    Read,
    /// write(2)
    Write,
    /// lseek(2)
    Seek,
    /// close(2)
    Close,
}

impl Step {
    /// 実行順の全ステップ
    pub const ALL: [Step; 5] = [Step::Open, Step::Read, Step::Write, Step::Seek, Step::Close];

    /// 短い名前（CLIやログで使う）
    pub fn name(self) -> &'static str {
        match self {
            Step::Open => "open",
            Step::Read => "read",
            Step::Write => "write",
            Step::Seek => "seek",
            Step::Close => "close",
        }
    }

    /// perror(3) に渡していたメッセージと同じ形式のラベル
    pub fn label(self) -> &'static str {
        match self {
            Step::Open => "Error opening file",
            Step::Read => "Error reading file",
            Step::Write => "Error writing to file",
            Step::Seek => "Error seeking in file",
            Step::Close => "Error closing file",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 不明なステップ名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStep(pub String);

impl fmt::Display for UnknownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown step {:?} (expected one of: open, read, write, seek, close)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStep {}

impl FromStr for Step {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(Step::Open),
            "read" => Ok(Step::Read),
            "write" => Ok(Step::Write),
            "seek" | "lseek" => Ok(Step::Seek),
            "close" => Ok(Step::Close),
            _ => Err(UnknownStep(s.to_string())),
        }
    }
}

/// ステップの失敗
/// 各バリアントはOSが返したerrnoをそのまま保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    /// ファイルを開けなかった
    Open(Errno),
    /// 読み込みに失敗
    Read(Errno),
    /// 書き込みに失敗
    Write(Errno),
    /// オフセットの変更に失敗
    Seek(Errno),
    /// クローズに失敗
    Close(Errno),
}

impl StepError {
    pub fn new(step: Step, errno: Errno) -> Self {
        match step {
            Step::Open => StepError::Open(errno),
            Step::Read => StepError::Read(errno),
            Step::Write => StepError::Write(errno),
            Step::Seek => StepError::Seek(errno),
            Step::Close => StepError::Close(errno),
        }
    }

    /// 失敗したステップ
    pub fn step(&self) -> Step {
        match self {
            StepError::Open(_) => Step::Open,
            StepError::Read(_) => Step::Read,
            StepError::Write(_) => Step::Write,
            StepError::Seek(_) => Step::Seek,
            StepError::Close(_) => Step::Close,
        }
    }

    /// OSが報告したエラー
    pub fn errno(&self) -> Errno {
        match *self {
            StepError::Open(e)
            | StepError::Read(e)
            | StepError::Write(e)
            | StepError::Seek(e)
            | StepError::Close(e) => e,
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step().label(), self.errno().desc())
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StepError::Open(e)
            | StepError::Read(e)
            | StepError::Write(e)
            | StepError::Seek(e)
            | StepError::Close(e) => Some(e),
        }
    }
}
