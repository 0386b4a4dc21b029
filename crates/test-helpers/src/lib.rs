// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod mock_chain;
mod mock_log_search;
mod utils;

pub use mock_chain::*;
pub use mock_log_search::*;
pub use utils::*;
