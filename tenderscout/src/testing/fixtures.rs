//! Fixture builders.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::{PolitenessConfig, RunConfig};
use crate::profile::{DetailLinkRule, SiteProfile};

/// Host of the fixture profile.
pub const FIXTURE_HOST: &str = "https://portal.test";

/// A profile probing `/tenders?status=open`, then `/`, on [`FIXTURE_HOST`].
///
/// Detail links contain `/tender/view/`.
#[must_use]
pub fn fixture_profile(id: &str) -> SiteProfile {
    SiteProfile::new(id, FIXTURE_HOST)
        .with_path("/tenders?status=open")
        .with_path("/")
        .with_detail_rule(
            DetailLinkRule::new()
                .with_host("portal.test")
                .requiring("/tender/view/"),
        )
}

/// Listing markup with one anchor per `(href, text)` plus a navigation link.
#[must_use]
pub fn listing_page(links: &[(&str, &str)]) -> String {
    let mut html = String::from(
        "<html><head><title>Open tenders</title></head><body>\
         <nav><a href=\"/about\">About</a></nav><ul>",
    );
    for (href, text) in links {
        let _ = write!(html, "<li><a href=\"{href}\">{text}</a></li>");
    }
    html.push_str("</ul></body></html>");
    html
}

/// Detail markup with an `h1` title and a `main` body.
#[must_use]
pub fn detail_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>Tender</title></head><body>\
         <nav>Home</nav><h1>{title}</h1><main><p>{body}</p></main></body></html>"
    )
}

/// Defaults with every politeness delay disabled.
#[must_use]
pub fn fast_config(output_dir: impl AsRef<Path>) -> RunConfig {
    RunConfig::default()
        .with_politeness(PolitenessConfig::disabled())
        .with_output_dir(output_dir.as_ref())
}
