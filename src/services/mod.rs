//! JavaScript capability glue: the host wallet connector and the hosted
//! on-ramp widget.

pub mod connector;
pub mod ramp;
