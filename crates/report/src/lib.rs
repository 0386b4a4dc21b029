// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod models;
mod ranker;
mod sink;
mod table;

pub use models::*;
pub use ranker::*;
pub use sink::*;
pub use table::*;
