//! ServerTimeGet response body.

use chrono::{DateTime, SecondsFormat, Utc};

pub const SERVER_TIME_GET_FN: &str = "ServerTimeGet";

/// Render `now` as a `responseObject` document.
pub fn render_server_time(now: DateTime<Utc>) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<responseObject>\n",
            "  <status>True</status>\n",
            "  <details>{}</details>\n",
            "  <data>{}</data>\n",
            "</responseObject>\n",
        ),
        SERVER_TIME_GET_FN,
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
