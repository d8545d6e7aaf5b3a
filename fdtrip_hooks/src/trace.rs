use fdtrip_api::FileOps;
use libc::off_t;
use log::debug;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::Whence;
use std::os::fd::RawFd;
use std::path::Path;

/// すべての呼び出しとその結果を `debug` レベルでログに出すラッパー
#[derive(Debug, Default, Clone)]
pub struct TraceOps<O> {
    inner: O,
}

impl<O: FileOps> TraceOps<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: FileOps> FileOps for TraceOps<O> {
    fn op_open(&mut self, path: &Path, flags: OFlag, mode: Mode) -> nix::Result<RawFd> {
        let result = self.inner.op_open(path, flags, mode);
        debug!(
            "[trace] open(path={}, flags={:?}, mode={:#o}) = {:?}",
            path.display(),
            flags,
            mode.bits(),
            result
        );
        result
    }

    fn op_read(&mut self, fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
        let count = buf.len();
        let result = self.inner.op_read(fd, buf);
        debug!("[trace] read(fd={}, count={}) = {:?}", fd, count, result);
        result
    }

    fn op_write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
        let result = self.inner.op_write(fd, buf);
        debug!("[trace] write(fd={}, count={}) = {:?}", fd, buf.len(), result);
        result
    }

    fn op_lseek(&mut self, fd: RawFd, offset: off_t, whence: Whence) -> nix::Result<off_t> {
        let result = self.inner.op_lseek(fd, offset, whence);
        debug!(
            "[trace] lseek(fd={}, offset={}, whence={:?}) = {:?}",
            fd, offset, whence, result
        );
        result
    }

    fn op_close(&mut self, fd: RawFd) -> nix::Result<()> {
        let result = self.inner.op_close(fd);
        debug!("[trace] close(fd={}) = {:?}", fd, result);
        result
    }
}
