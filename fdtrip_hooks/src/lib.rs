//! `FileOps` を包んで振る舞いを足すラッパー群
//!
//! どれも内側の `FileOps` を1つ持ち、そのまま重ねて使える。
//!
//! ```no_run
//! use fdtrip_api::PosixOps;
//! use fdtrip_hooks::{CountingOps, FaultInjector, TraceOps};
//!
//! let ops = TraceOps::new(CountingOps::new(FaultInjector::new(PosixOps)));
//! ```

mod counting;
mod fault;
mod trace;

pub use counting::{CountingOps, OpCounts};
pub use fault::FaultInjector;
pub use trace::TraceOps;
