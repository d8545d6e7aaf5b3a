use fdtrip_api::FileOps;
use libc::off_t;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::Whence;
use std::os::fd::RawFd;
use std::path::Path;

/// 操作ごとの呼び出し回数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounts {
    pub open: usize,
    pub read: usize,
    pub write: usize,
    pub lseek: usize,
    pub close: usize,
}

impl OpCounts {
    /// 全操作の合計
    pub fn total(&self) -> usize {
        self.open + self.read + self.write + self.lseek + self.close
    }
}

/// 呼び出し回数を数えるラッパー
/// 結果の成否にかかわらず、内側へ渡した時点で1回と数える
#[derive(Debug, Default, Clone)]
pub struct CountingOps<O> {
    inner: O,
    counts: OpCounts,
}

impl<O: FileOps> CountingOps<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            counts: OpCounts::default(),
        }
    }

    pub fn counts(&self) -> OpCounts {
        self.counts
    }

    pub fn reset_counts(&mut self) {
        self.counts = OpCounts::default();
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: FileOps> FileOps for CountingOps<O> {
    fn op_open(&mut self, path: &Path, flags: OFlag, mode: Mode) -> nix::Result<RawFd> {
        self.counts.open += 1;
        self.inner.op_open(path, flags, mode)
    }

    fn op_read(&mut self, fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
        self.counts.read += 1;
        self.inner.op_read(fd, buf)
    }

    fn op_write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
        self.counts.write += 1;
        self.inner.op_write(fd, buf)
    }

    fn op_lseek(&mut self, fd: RawFd, offset: off_t, whence: Whence) -> nix::Result<off_t> {
        self.counts.lseek += 1;
        self.inner.op_lseek(fd, offset, whence)
    }

    fn op_close(&mut self, fd: RawFd) -> nix::Result<()> {
        self.counts.close += 1;
        self.inner.op_close(fd)
    }
}
