//! Strongly-typed identifiers for sheriffing entities.
//!
//! All identifiers are thin wrappers over the integer keys handed out by the
//! results database:
//!
//! - **Strongly typed**: Prevents mixing up different ID types at compile time
//! - **Transparent**: Serialize as the bare integer they wrap
//!
//! # Example
//!
//! ```rust
//! use perf_sheriff::ids::{AlertId, SummaryId};
//!
//! let alert = AlertId::new(1042);
//! let summary = SummaryId::new(77);
//!
//! // IDs are different types - this won't compile:
//! // let wrong: AlertId = summary;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! integer_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw database key.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the underlying key.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }
    };
}

integer_id! {
    /// A unique identifier for a performance alert.
    ///
    /// Backfill records share their alert's identity (1:1 relation), so this
    /// also keys [`crate::record::BackfillRecord`].
    AlertId
}

integer_id! {
    /// A unique identifier for a performance alert summary.
    SummaryId
}

integer_id! {
    /// A unique identifier for a job on the remote execution service.
    JobId
}
