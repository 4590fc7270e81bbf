mod control;
mod sse;
mod status;
mod volumes;

pub(super) use control::{pause, resume, start};
pub(super) use sse::sse_events;
pub(super) use status::get_status;
pub(super) use volumes::{get_volumes, select_volume};
