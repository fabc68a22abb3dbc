// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod utils;

mod test_layout;
mod test_undo;
mod test_wrap;
