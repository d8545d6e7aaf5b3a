use crate::{FileOps, ReadBuffer, StepError};
use libc::off_t;
use log::{debug, warn};
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::Whence;
use std::fmt;
use std::os::fd::RawFd;
use std::path::{Path, PathBuf};

/// 読み書き用に開いたファイルディスクリプタ
///
/// 開いたディスクリプタは必ず1回だけ閉じられる。
/// `close()` を呼ばずにドロップされた場合（途中のステップが失敗した場合など）は
/// `Drop` で閉じ、その失敗はログに残すだけにする。
pub struct FileHandle<'o, O: FileOps + ?Sized> {
    ops: &'o mut O,
    fd: RawFd,
    path: PathBuf,
    released: bool,
}

impl<'o, O: FileOps + ?Sized> FileHandle<'o, O> {
    /// `O_RDWR` でファイルを開く（ファイルは作成しない）
    pub fn open(ops: &'o mut O, path: impl AsRef<Path>) -> Result<Self, StepError> {
        let path = path.as_ref();
        let fd = ops
            .op_open(path, OFlag::O_RDWR, Mode::empty())
            .map_err(StepError::Open)?;
        debug!("opened {} as fd {}", path.display(), fd);

        Ok(Self {
            ops,
            fd,
            path: path.to_path_buf(),
            released: false,
        })
    }

    pub fn raw_fd(&self) -> RawFd {
        self.fd
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 現在のオフセットから `buf.read_limit()` バイトまで読み込む
    pub fn read_into(&mut self, buf: &mut ReadBuffer) -> Result<usize, StepError> {
        let fd = self.fd;
        let ops = &mut *self.ops;
        buf.fill_with(|dst| ops.op_read(fd, dst))
            .map_err(StepError::Read)
    }

    /// 現在のオフセットに `data` を書き込む
    /// 書き込めたバイト数をそのまま返す（短い書き込みはエラーにしない）
    pub fn write(&mut self, data: &[u8]) -> Result<usize, StepError> {
        self.ops.op_write(self.fd, data).map_err(StepError::Write)
    }

    pub fn seek(&mut self, offset: off_t, whence: Whence) -> Result<off_t, StepError> {
        self.ops
            .op_lseek(self.fd, offset, whence)
            .map_err(StepError::Seek)
    }

    /// ディスクリプタを閉じる
    ///
    /// close(2) が失敗してもディスクリプタは解放済みとして扱い、再試行はしない。
    pub fn close(mut self) -> Result<(), StepError> {
        self.released = true;
        self.ops.op_close(self.fd).map_err(StepError::Close)?;
        debug!("closed fd {}", self.fd);
        Ok(())
    }
}

impl<O: FileOps + ?Sized> Drop for FileHandle<'_, O> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.ops.op_close(self.fd) {
            Ok(()) => debug!("released fd {} ({})", self.fd, self.path.display()),
            Err(e) => warn!(
                "failed to release fd {} ({}): {}",
                self.fd,
                self.path.display(),
                e
            ),
        }
    }
}

impl<O: FileOps + ?Sized> fmt::Debug for FileHandle<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("fd", &self.fd)
            .field("path", &self.path)
            .field("released", &self.released)
            .finish()
    }
}
