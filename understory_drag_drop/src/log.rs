// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics forwarding.
//!
//! With the `tracing` feature the macros here are `tracing`'s own; without it
//! they expand to nothing.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

// `warn` clashes with the builtin lint attribute, so the no-op macros carry
// suffixed names and are re-exported under the `tracing` ones.
#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! debug_ {
        ($($arg:tt)*) => {};
    }

    macro_rules! trace_ {
        ($($arg:tt)*) => {};
    }

    macro_rules! warn_ {
        ($($arg:tt)*) => {};
    }

    pub(crate) use {debug_, trace_, warn_};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{debug_ as debug, trace_ as trace, warn_ as warn};
