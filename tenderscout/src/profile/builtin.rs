//! Built-in profiles for the Victorian, Queensland and NSW portals.

use super::{DetailLinkRule, SiteProfile};

/// Link texts that say nothing about the opportunity.
#[must_use]
pub fn default_generic_labels() -> Vec<String> {
    ["details", "view tender", "view details", "see details", "open opportunities"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

/// Buying for Victoria, with the consolidated-tenders mirror as second host.
#[must_use]
pub fn vic() -> SiteProfile {
    SiteProfile::new("VIC", "https://www.tenders.vic.gov.au")
        .with_host("https://vic.consolidatedtenders.com")
        .with_path("/tender/search?preset=open")
        .with_path(
            "/tender/search?tenderState=OPEN&groupBy=NONE&openThisWeek=false\
             &closeThisWeek=false&awardedThisWeek=false",
        )
        .with_path("/tender/search")
        .with_path("/")
        .with_pagination_param("page")
        .with_detail_rule(
            DetailLinkRule::new()
                .with_host("tenders.vic.gov.au")
                .with_host("consolidatedtenders.com")
                .requiring("/tender/")
                .with_marker("/tender/view")
                .with_marker("/tender/details")
                .with_marker("/tender/display")
                .with_marker("/tender/detail")
                .with_id_param("id")
                .with_id_param("tenderId"),
        )
        .with_near_miss(true)
        .with_diagnostics(true)
}

/// QTenders.
#[must_use]
pub fn qld() -> SiteProfile {
    SiteProfile::new("QLD", "https://qtenders.epw.qld.gov.au")
        .with_path("/qtenders/tender/search/tender-search.do?openTenders=true")
        .with_path("/qtenders/tender/search/tender-search.do?type=OPEN")
        .with_path("/qtenders/")
        .with_pagination_param("currentPage")
        .with_detail_rule(
            DetailLinkRule::new()
                .requiring("/qtenders/")
                .requiring("tender")
                .requiring("detail"),
        )
}

/// buy.nsw.
#[must_use]
pub fn nsw() -> SiteProfile {
    SiteProfile::new("NSW", "https://buy.nsw.gov.au")
        .with_path("/opportunity/search?types=Tenders")
        .with_pagination_param("page")
        .with_detail_rule(
            DetailLinkRule::new()
                .requiring("/prcopportunity/")
                .excluding_suffix("/opportunity/search/"),
        )
}

/// All built-in profiles, in batch order.
#[must_use]
pub fn builtin_profiles() -> Vec<SiteProfile> {
    vec![vic(), qld(), nsw()]
}
