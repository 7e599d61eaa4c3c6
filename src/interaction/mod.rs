//! User-interaction plumbing between managed charts.

mod zoom_sync;

pub use zoom_sync::{ZoomCommand, ZoomEvent, ZoomRouteOutcome, ZoomSyncRouter};
