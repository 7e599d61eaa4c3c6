//! Collaborators that deliver measurement data.
//!
//! Every response is keyed by measurement-point name; the dashboard picks one
//! point out of it with [`select_point`].

#[cfg(feature = "http-source")]
mod http;
mod memory;
pub mod wire;

use std::future::Future;

use indexmap::IndexMap;

#[cfg(feature = "http-source")]
pub use http::HttpDataSource;
pub use memory::MemorySource;

use crate::core::{SensorSnapshot, TimeRange, TimeSeriesSet};
use crate::error::{DashError, DashResult};

/// Request/response access to the measurement backend.
///
/// Futures are not required to be `Send`: loads run on the page's single
/// event loop.
pub trait DataSource {
    fn fetch_latest(&self) -> impl Future<Output = DashResult<IndexMap<String, SensorSnapshot>>>;

    fn fetch_range(
        &self,
        range: TimeRange,
    ) -> impl Future<Output = DashResult<IndexMap<String, TimeSeriesSet>>>;

    fn fetch_available_points(&self) -> impl Future<Output = DashResult<Vec<String>>>;
}

/// Picks the entry for `point`, or the first entry when no point is selected.
///
/// A missing point or an empty response is [`DashError::DataUnavailable`].
pub fn select_point<T>(
    mut by_point: IndexMap<String, T>,
    point: Option<&str>,
) -> DashResult<(String, T)> {
    let selected = match point {
        Some(name) => by_point.swap_remove_entry(name),
        None => by_point.shift_remove_index(0),
    };
    selected.ok_or_else(|| {
        DashError::DataUnavailable(match point {
            Some(name) => format!("measurement point `{name}` not in response"),
            None => "response contains no measurement point".to_owned(),
        })
    })
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::select_point;

    fn points() -> IndexMap<String, u32> {
        IndexMap::from([("Zisterne".to_owned(), 1), ("Brunnen".to_owned(), 2)])
    }

    #[test]
    fn no_selection_falls_back_to_first_point() {
        assert_eq!(
            select_point(points(), None).expect("first"),
            ("Zisterne".to_owned(), 1)
        );
    }

    #[test]
    fn named_point_is_selected() {
        assert_eq!(select_point(points(), Some("Brunnen")).expect("named").1, 2);
    }

    #[test]
    fn unknown_point_is_data_unavailable() {
        let error = select_point(points(), Some("Teich")).expect_err("unknown point");
        assert!(error.is_recoverable());
        assert!(select_point(IndexMap::<String, u32>::new(), None).is_err());
    }
}
