mod roundtrip;

pub use roundtrip::{
    FileRoundTrip, RoundTripConfig, RoundTripStats, BANNER, DEFAULT_PATH, WRITE_LEN,
    WRITE_PAYLOAD,
};
