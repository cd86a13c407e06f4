use serde_derive::{Serialize, Deserialize};

#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct Satoshi {
    raw: u64,
}

#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct MilliSatoshi {
    raw: u64,
}

impl Satoshi {
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Satoshi {
            raw: self.raw.saturating_sub(rhs.raw),
        }
    }
}

mod wrappers {
    use super::*;

    impl From<Satoshi> for u64 {
        fn from(s: Satoshi) -> Self {
            s.raw
        }
    }

    impl From<u64> for Satoshi {
        fn from(raw: u64) -> Self {
            Satoshi { raw: raw }
        }
    }

    impl From<MilliSatoshi> for u64 {
        fn from(m: MilliSatoshi) -> Self {
            m.raw
        }
    }

    impl From<u64> for MilliSatoshi {
        fn from(raw: u64) -> Self {
            MilliSatoshi { raw: raw }
        }
    }
}

mod scaling {
    use super::*;

    const MILE: u64 = 1000;

    impl From<Satoshi> for MilliSatoshi {
        fn from(v: Satoshi) -> Self {
            MilliSatoshi { raw: v.raw * MILE }
        }
    }

    impl From<MilliSatoshi> for Satoshi {
        fn from(v: MilliSatoshi) -> Self {
            Satoshi { raw: v.raw / MILE }
        }
    }
}
