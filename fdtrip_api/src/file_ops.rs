use libc::off_t;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::Whence;
use std::os::fd::{BorrowedFd, RawFd};
use std::path::Path;

/// ファイル操作のためのtrait
///
/// ラウンドトリップで使う5つのシステムコールそれぞれに1メソッドを持つ。
/// オーバーライドしないメソッドはデフォルト実装が使用され、
/// 元のシステムコールがそのまま実行されます。
///
/// # 使用例
///
/// ```rust
/// use fdtrip_api::file_ops::{default_write, FileOps};
/// use std::os::fd::RawFd;
///
/// struct LoudWrites;
///
/// impl FileOps for LoudWrites {
///     fn op_write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
///         eprintln!("[CUSTOM] write called: fd={}, count={}", fd, buf.len());
///         default_write(fd, buf)
///     }
/// }
/// ```
pub trait FileOps {
    /// open(2) - ファイルを開く
    fn op_open(&mut self, path: &Path, flags: OFlag, mode: Mode) -> nix::Result<RawFd> {
        default_open(path, flags, mode)
    }

    /// read(2) - ファイルディスクリプタから読み込み
    fn op_read(&mut self, fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
        default_read(fd, buf)
    }

    /// write(2) - ファイルディスクリプタへ書き込み
    fn op_write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
        default_write(fd, buf)
    }

    /// lseek(2) - ファイルのオフセット位置を変更
    fn op_lseek(&mut self, fd: RawFd, offset: off_t, whence: Whence) -> nix::Result<off_t> {
        default_lseek(fd, offset, whence)
    }

    /// close(2) - ファイルディスクリプタを閉じる
    fn op_close(&mut self, fd: RawFd) -> nix::Result<()> {
        default_close(fd)
    }
}

/// 何もフックしない実装（すべて元のシステムコール）
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixOps;

impl FileOps for PosixOps {}

impl<O: FileOps + ?Sized> FileOps for &mut O {
    fn op_open(&mut self, path: &Path, flags: OFlag, mode: Mode) -> nix::Result<RawFd> {
        (**self).op_open(path, flags, mode)
    }

    fn op_read(&mut self, fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
        (**self).op_read(fd, buf)
    }

    fn op_write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
        (**self).op_write(fd, buf)
    }

    fn op_lseek(&mut self, fd: RawFd, offset: off_t, whence: Whence) -> nix::Result<off_t> {
        (**self).op_lseek(fd, offset, whence)
    }

    fn op_close(&mut self, fd: RawFd) -> nix::Result<()> {
        (**self).op_close(fd)
    }
}

impl<O: FileOps + ?Sized> FileOps for Box<O> {
    fn op_open(&mut self, path: &Path, flags: OFlag, mode: Mode) -> nix::Result<RawFd> {
        (**self).op_open(path, flags, mode)
    }

    fn op_read(&mut self, fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
        (**self).op_read(fd, buf)
    }

    fn op_write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
        (**self).op_write(fd, buf)
    }

    fn op_lseek(&mut self, fd: RawFd, offset: off_t, whence: Whence) -> nix::Result<off_t> {
        (**self).op_lseek(fd, offset, whence)
    }

    fn op_close(&mut self, fd: RawFd) -> nix::Result<()> {
        (**self).op_close(fd)
    }
}

// ========================================================================
// デフォルト実装を提供する独立した関数
// これらの関数はユーザーのカスタム実装内で呼び出すことができます
// ========================================================================

pub fn default_open(path: &Path, flags: OFlag, mode: Mode) -> nix::Result<RawFd> {
    nix::fcntl::open(path, flags, mode)
}

pub fn default_read(fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
    nix::unistd::read(fd, buf)
}

pub fn default_write(fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
    // 安全性: fdはこの呼び出しの間だけ借用され、所有権は呼び出し側に残る
    let fd = unsafe { BorrowedFd::borrow_raw(fd) };
    nix::unistd::write(fd, buf)
}

pub fn default_lseek(fd: RawFd, offset: off_t, whence: Whence) -> nix::Result<off_t> {
    nix::unistd::lseek(fd, offset, whence)
}

pub fn default_close(fd: RawFd) -> nix::Result<()> {
    nix::unistd::close(fd)
}
