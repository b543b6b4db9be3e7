//! Event payloads emitted by the finality gadget.

pub mod outgoing;

pub use outgoing::GadgetEvent;
