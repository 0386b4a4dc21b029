// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod client;
mod indexer;
pub mod models;
mod participants;
mod traits;
pub use client::*;
pub use indexer::*;
pub use participants::*;
pub use traits::*;
