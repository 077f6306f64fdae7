// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod schedules;
pub mod occurrences;
pub mod tick;
pub mod settings;

use crate::error::ScheduleError;

/// Process exit status for a failed command: 2 when the user can fix the
/// input (bad range, unknown frequency, wrong owner or id), 1 otherwise.
pub fn exit_status(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ScheduleError>() {
        Some(e) if e.is_validation() => 2,
        _ => 1,
    }
}
