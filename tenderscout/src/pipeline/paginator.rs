//! Page-N URLs for a chosen listing endpoint.

use crate::profile::ListingEndpoint;

/// URL of listing page `page`.
///
/// Page 1 (and 0) is the endpoint unchanged. Later pages set the
/// endpoint's pagination parameter to `page`, replacing an existing value
/// in place or appending it; other query parameters keep their order.
#[must_use]
pub fn page_url(endpoint: &ListingEndpoint, page: u32) -> String {
    if page <= 1 {
        return endpoint.as_str().to_string();
    }

    let param = endpoint.pagination_param();
    let value = page.to_string();
    let mut url = endpoint.url().clone();

    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(key, existing)| {
            if key == param {
                if replaced {
                    return None;
                }
                replaced = true;
                return Some((key.into_owned(), value.clone()));
            }
            Some((key.into_owned(), existing.into_owned()))
        })
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.extend_pairs(pairs.iter());
        if !replaced {
            query.append_pair(param, &value);
        }
    }
    url.to_string()
}
