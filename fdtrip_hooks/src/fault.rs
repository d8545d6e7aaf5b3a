use fdtrip_api::{FileOps, Step};
use libc::off_t;
use log::info;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::Whence;
use std::os::fd::RawFd;
use std::path::Path;

/// 指定したステップを失敗させるラッパー
///
/// 対象ステップの呼び出しは内側へ渡さず、設定したerrnoを返す。
/// ただし close は内側で実際に閉じてからエラーを返すので、
/// ディスクリプタが漏れることはない。
#[derive(Debug, Default, Clone)]
pub struct FaultInjector<O> {
    inner: O,
    fault: Option<(Step, Errno)>,
    injected: usize,
}

impl<O: FileOps> FaultInjector<O> {
    /// 何も失敗させない状態で作成
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            fault: None,
            injected: 0,
        }
    }

    /// `step` を `errno` で失敗させる
    pub fn fail_at(mut self, step: Step, errno: Errno) -> Self {
        self.fault = Some((step, errno));
        self
    }

    /// `fail_at` の `Option` 版（`None` なら何もしない）
    pub fn with_fault(mut self, fault: Option<(Step, Errno)>) -> Self {
        self.fault = fault;
        self
    }

    pub fn fault(&self) -> Option<(Step, Errno)> {
        self.fault
    }

    /// 実際にエラーを返した回数
    pub fn injected(&self) -> usize {
        self.injected
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    pub fn into_inner(self) -> O {
        self.inner
    }

    fn check(&mut self, step: Step) -> nix::Result<()> {
        match self.fault {
            Some((target, errno)) if target == step => {
                self.injected += 1;
                info!("injecting {} into {}", errno, step);
                Err(errno)
            }
            _ => Ok(()),
        }
    }
}

impl<O: FileOps> FileOps for FaultInjector<O> {
    fn op_open(&mut self, path: &Path, flags: OFlag, mode: Mode) -> nix::Result<RawFd> {
        self.check(Step::Open)?;
        self.inner.op_open(path, flags, mode)
    }

    fn op_read(&mut self, fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
        self.check(Step::Read)?;
        self.inner.op_read(fd, buf)
    }

    fn op_write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
        self.check(Step::Write)?;
        self.inner.op_write(fd, buf)
    }

    fn op_lseek(&mut self, fd: RawFd, offset: off_t, whence: Whence) -> nix::Result<off_t> {
        self.check(Step::Seek)?;
        self.inner.op_lseek(fd, offset, whence)
    }

    fn op_close(&mut self, fd: RawFd) -> nix::Result<()> {
        let closed = self.inner.op_close(fd);
        self.check(Step::Close)?;
        closed
    }
}
