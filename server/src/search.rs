use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// The characters `encodeURIComponent` leaves alone.
const SEARCH_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Where the list view should be for a given search text.
pub fn location_for(text: &str) -> String {
    if text.is_empty() {
        String::from("/")
    } else {
        format!("/?search={}", utf8_percent_encode(text, SEARCH_COMPONENT))
    }
}
