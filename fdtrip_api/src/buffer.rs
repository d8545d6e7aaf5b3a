use std::fmt;

/// 読み込みバッファの容量（バイト）
pub const READ_BUFFER_CAPACITY: usize = 100;

/// 固定長の読み込みバッファ
///
/// 容量は `READ_BUFFER_CAPACITY` で固定され、伸長しない。
/// 1回の読み込みで埋めるのは最大 `capacity - 1` バイトまで。
#[derive(Clone)]
pub struct ReadBuffer {
    data: [u8; READ_BUFFER_CAPACITY],
    len: usize,
}

impl ReadBuffer {
    pub fn new() -> Self {
        Self {
            data: [0; READ_BUFFER_CAPACITY],
            len: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        READ_BUFFER_CAPACITY
    }

    /// 1回の読み込みで要求するバイト数
    pub const fn read_limit(&self) -> usize {
        READ_BUFFER_CAPACITY - 1
    }

    /// 直前の読み込みで得たバイト数
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 直前の読み込みで得たバイト列
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// 先頭 `read_limit()` バイトの領域を `read` に渡して埋める
    pub(crate) fn fill_with<F>(&mut self, read: F) -> nix::Result<usize>
    where
        F: FnOnce(&mut [u8]) -> nix::Result<usize>,
    {
        let limit = self.read_limit();
        self.len = 0;
        let n = read(&mut self.data[..limit])?;
        self.len = n.min(limit);
        Ok(self.len)
    }
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReadBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadBuffer")
            .field("len", &self.len)
            .field("data", &String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}
