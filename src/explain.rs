//! Narration: turn engine events into progress output for the operator.
//!
//! An [`Explainer`] maps one event to zero or more lines of text. The
//! [`DefaultExplainer`] covers every event. Specialized explainers wrap
//! another explainer, override the slice of events they care about, and hand
//! everything else down, so explainers can be layered without losing events.

mod default;
mod marker;

use std::io::{self, Write};

use crate::engine::Event;

pub use default::DefaultExplainer;
pub use smoke_test::{PassthroughExplainer, SMOKE_TEST_TASK};

/// Turns an event into narration.
///
/// Must never fail and never block: it only formats. An empty string means
/// nothing to say for this event.
pub trait Explainer {
    fn explain(&mut self, event: &Event, verbose: bool) -> String;
}

impl<E: Explainer + ?Sized> Explainer for Box<E> {
    fn explain(&mut self, event: &Event, verbose: bool) -> String {
        (**self).explain(event, verbose)
    }
}

/// Feeds events to an explainer and writes each narration as it comes.
///
/// Flushes after every non-empty narration so progress shows up while a long
/// run is still going.
pub struct Narrator<'a, W: Write> {
    explainer: &'a mut dyn Explainer,
    out: W,
    verbose: bool,
}

impl<'a, W: Write> Narrator<'a, W> {
    pub fn new(explainer: &'a mut dyn Explainer, out: W, verbose: bool) -> Self {
        Self {
            explainer,
            out,
            verbose,
        }
    }

    /// Narrate one event.
    pub fn narrate(&mut self, event: &Event) -> io::Result<()> {
        let text = self.explainer.explain(event, self.verbose);
        if text.is_empty() {
            return Ok(());
        }
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    /// Narrate a whole recorded stream, in order.
    pub fn narrate_all<'e>(
        &mut self,
        events: impl IntoIterator<Item = &'e Event>,
    ) -> io::Result<()> {
        for event in events {
            self.narrate(event)?;
        }
        Ok(())
    }
}
