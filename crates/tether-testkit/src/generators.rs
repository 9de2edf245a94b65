//! Proptest generators for property-based testing.

use proptest::prelude::*;

use tether_core::ErrorBody;

use crate::fixtures::{Item, ItemPage};

/// Generate an item.
pub fn item() -> impl Strategy<Value = Item> {
    (any::<u32>(), "[a-z ]{0,24}").prop_map(|(id, title)| Item { id, title })
}

/// Generate a page of up to `max_len` items.
pub fn item_page(max_len: usize) -> impl Strategy<Value = ItemPage> {
    (
        prop::collection::vec(item(), 0..=max_len),
        prop::option::of(0usize..10_000),
    )
        .prop_map(|(items, total)| ItemPage { items, total })
}

/// Generate a structured error body.
pub fn error_body() -> impl Strategy<Value = ErrorBody> {
    ("[A-Z_]{1,12}", "[a-z ]{0,40}").prop_map(|(code, message)| ErrorBody::new(code, message))
}

/// Generate a non-2xx HTTP status.
pub fn failure_status() -> impl Strategy<Value = u16> {
    prop_oneof![100u16..200, 300u16..600]
}

/// Generate a page size.
pub fn page_size() -> impl Strategy<Value = usize> {
    1usize..=64
}

/// Generate a sequence of delivered page lengths for a forward walk.
pub fn delivered_lengths(max_pages: usize, page_size: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..=page_size, 0..=max_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::convert_page;

    proptest! {
        #[test]
        fn empty_pages_convert_to_nothing(page in item_page(8)) {
            let converted = convert_page(&page);
            prop_assert_eq!(converted.is_none(), page.items.is_empty());
        }

        #[test]
        fn failure_status_is_never_successful(status in failure_status()) {
            prop_assert!(!(200..=299).contains(&status));
        }
    }
}
