//! Beep segmentation state machine.
//!
//! Consumes the classifier's slice stream in order and groups contiguous
//! active slices into closed [`BeepEvent`]s. Idle while no beep is open,
//! in-beep otherwise; state persists across block boundaries within a run.

use crate::classify::ClassifiedSlice;
use crate::event::{BeepEvent, OpenBeep};

/// Owns the single in-progress beep for a capture run.
#[derive(Debug, Default)]
pub struct BeepDetector {
    open: Option<OpenBeep>,
}

impl BeepDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive the machine with one classified slice.
    ///
    /// Returns the closed event when this slice ends a beep. The inactive
    /// slice that ends the beep supplies the end fields - not the last
    /// active slice. The first active slice after idle supplies the start
    /// fields; further active slices are no-ops.
    pub fn advance(&mut self, slice: &ClassifiedSlice) -> Option<BeepEvent> {
        if slice.active {
            if self.open.is_none() {
                self.open = Some(OpenBeep {
                    start_timestamp: slice.timestamp,
                    start_frequency: slice.frequency,
                    start_signal_strength: slice.strength,
                });
            }
            None
        } else {
            self.open
                .take()
                .map(|open| open.close(slice.timestamp, slice.frequency, slice.strength))
        }
    }

    /// The beep currently in progress, if any.
    ///
    /// An open beep is never persisted; if the stream ends here the caller
    /// reports it and drops it.
    pub fn open_beep(&self) -> Option<&OpenBeep> {
        self.open.as_ref()
    }
}
