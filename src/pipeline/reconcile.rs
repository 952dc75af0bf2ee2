use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::domain::{
    Extraction, MenuItem, ReconciledMenuItem, ReconciledRestaurant, Source, SourceRecord,
};
use crate::pipeline::InclusionPolicy;

/// Merges per-source extractions for one restaurant.
///
/// Offers are copied verbatim per source; failed sources get an empty list.
/// Menu items are joined on case-folded name starting from the anchor
/// source. Under [`InclusionPolicy::RequireAll`] a failed source counts as
/// an empty menu, so any failure empties the reconciled menu;
/// [`InclusionPolicy::RequireAvailable`] leaves failed sources out of the
/// join instead. When the anchor itself failed, the first available source
/// in `extractions` order is used.
pub fn reconcile(
    restaurant_name: &str,
    extractions: &[Extraction],
    anchor: Source,
    policy: InclusionPolicy,
) -> ReconciledRestaurant {
    let mut restaurant = ReconciledRestaurant::new(restaurant_name);

    for extraction in extractions {
        restaurant
            .offers
            .insert(extraction.source(), extraction.offers().to_vec());
    }

    let available: Vec<&SourceRecord> = extractions.iter().filter_map(Extraction::record).collect();
    let Some(anchor_record) = available
        .iter()
        .find(|r| r.source == anchor)
        .or_else(|| available.first())
        .copied()
    else {
        debug!(restaurant = restaurant_name, "No source available, menu left empty");
        return restaurant;
    };

    let others: Vec<&SourceRecord> = available
        .iter()
        .filter(|r| r.source != anchor_record.source)
        .copied()
        .collect();

    let configured: HashSet<Source> = extractions.iter().map(Extraction::source).collect();

    for item in &anchor_record.menu {
        let merged = merge_item(item, anchor_record.source, &others);
        let keep = match policy {
            InclusionPolicy::RequireAll => merged.prices.len() == configured.len(),
            InclusionPolicy::RequireAvailable => merged.prices.len() == others.len() + 1,
            InclusionPolicy::RequireAny | InclusionPolicy::AnchorOnly => true,
        };
        if keep {
            restaurant.menu.push(merged);
        }
    }

    if policy == InclusionPolicy::RequireAny {
        let mut seen: HashSet<String> = anchor_record.menu.iter().map(MenuItem::key).collect();
        for (i, record) in others.iter().enumerate() {
            for item in &record.menu {
                if !seen.insert(item.key()) {
                    continue;
                }
                // Sources before this one were already checked and lack the item
                restaurant
                    .menu
                    .push(merge_item(item, record.source, &others[i + 1..]));
            }
        }
    }

    debug!(
        restaurant = restaurant_name,
        anchor = %anchor_record.source,
        sources = available.len(),
        failed = extractions.len() - available.len(),
        items = restaurant.menu.len(),
        "Reconciled menu"
    );

    restaurant
}

/// Collects the price of `item` from every source listing the same name.
fn merge_item(item: &MenuItem, source: Source, others: &[&SourceRecord]) -> ReconciledMenuItem {
    let mut prices = BTreeMap::from([(source, item.price.clone())]);
    let mut description = item.description.clone();
    let mut image = item.image.clone();

    for other in others {
        if let Some(hit) = other.find_menu_item(&item.name) {
            prices.insert(other.source, hit.price.clone());
            if description.is_none() {
                description = hit.description.clone();
            }
            if image.is_none() {
                image = hit.image.clone();
            }
        }
    }

    ReconciledMenuItem {
        name: item.name.clone(),
        description,
        image,
        prices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureReason, Offer};
    use crate::sources::record_with_menu;

    fn record(source: Source, names: &[&str]) -> Extraction {
        Extraction::Record(record_with_menu(source, names))
    }

    fn names(restaurant: &ReconciledRestaurant) -> Vec<&str> {
        restaurant.menu.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_require_all_keeps_only_items_in_every_source() {
        let extractions = vec![
            record(Source::Swiggy, &["Paneer Tikka", "Dal Makhani", "Butter Naan"]),
            record(Source::Zomato, &["Paneer Tikka", "Butter Naan"]),
            record(Source::Magicpin, &["Paneer Tikka", "Dal Makhani"]),
        ];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert_eq!(names(&merged), vec!["Paneer Tikka"]);

        let item = &merged.menu[0];
        assert_eq!(item.prices.len(), 3);
        assert_eq!(item.price(Source::Zomato), Some("₹120"));
    }

    #[test]
    fn test_join_is_case_insensitive() {
        let extractions = vec![
            record(Source::Swiggy, &["Paneer Tikka"]),
            record(Source::Zomato, &["PANEER TIKKA"]),
            record(Source::Magicpin, &["paneer tikka"]),
        ];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert_eq!(names(&merged), vec!["Paneer Tikka"]);
        assert_eq!(merged.menu[0].prices.len(), 3);
    }

    #[test]
    fn test_failed_source_counts_as_empty_menu() {
        let extractions = vec![
            record(Source::Swiggy, &["Paneer Tikka", "Dal Makhani"]),
            record(Source::Zomato, &["Paneer Tikka"]),
            Extraction::failed(Source::Magicpin, FailureReason::Unresolved),
        ];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert!(merged.menu.is_empty());
        assert!(merged.offers_for(Source::Magicpin).is_empty());
        assert!(merged.offers.contains_key(&Source::Magicpin));
        assert!(merged.offers.contains_key(&Source::Zomato));
    }

    #[test]
    fn test_require_available_leaves_failed_sources_out() {
        let extractions = vec![
            record(Source::Swiggy, &["Paneer Tikka", "Dal Makhani"]),
            record(Source::Zomato, &["Paneer Tikka"]),
            Extraction::failed(Source::Magicpin, FailureReason::Unresolved),
        ];

        let merged = reconcile(
            "Punjabi Dhaba",
            &extractions,
            Source::Swiggy,
            InclusionPolicy::RequireAvailable,
        );
        assert_eq!(names(&merged), vec!["Paneer Tikka"]);
        assert_eq!(merged.menu[0].prices.len(), 2);
        assert_eq!(merged.menu[0].price(Source::Magicpin), None);
    }

    #[test]
    fn test_require_available_still_needs_every_extracted_source() {
        let extractions = vec![
            record(Source::Swiggy, &["Paneer Tikka"]),
            record(Source::Zomato, &[]),
            Extraction::failed(Source::Magicpin, FailureReason::Timeout("article".into())),
        ];

        let merged = reconcile(
            "Punjabi Dhaba",
            &extractions,
            Source::Swiggy,
            InclusionPolicy::RequireAvailable,
        );
        assert!(merged.menu.is_empty());
    }

    #[test]
    fn test_empty_but_extracted_source_excludes_everything() {
        let extractions = vec![
            record(Source::Swiggy, &["Paneer Tikka"]),
            record(Source::Zomato, &[]),
        ];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert!(merged.menu.is_empty());
    }

    #[test]
    fn test_missing_anchor_falls_back_to_first_available() {
        let extractions = vec![
            Extraction::failed(Source::Swiggy, FailureReason::Timeout("p".into())),
            record(Source::Zomato, &["Paneer Tikka", "Kulfi"]),
            record(Source::Magicpin, &["Kulfi"]),
        ];

        let merged = reconcile(
            "Punjabi Dhaba",
            &extractions,
            Source::Swiggy,
            InclusionPolicy::RequireAvailable,
        );
        assert_eq!(names(&merged), vec!["Kulfi"]);
        assert_eq!(merged.menu[0].price(Source::Swiggy), None);

        let anchor_only = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::AnchorOnly);
        assert_eq!(names(&anchor_only), vec!["Paneer Tikka", "Kulfi"]);
    }

    #[test]
    fn test_failed_anchor_empties_require_all_menu() {
        let extractions = vec![
            Extraction::failed(Source::Swiggy, FailureReason::Timeout("p".into())),
            record(Source::Zomato, &["Kulfi"]),
            record(Source::Magicpin, &["Kulfi"]),
        ];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert!(merged.menu.is_empty());
        assert_eq!(merged.offers.len(), 3);
    }

    #[test]
    fn test_all_sources_failed_yields_empty_record() {
        let extractions = vec![
            Extraction::failed(Source::Swiggy, FailureReason::Unresolved),
            Extraction::failed(Source::Zomato, FailureReason::Unresolved),
        ];

        let merged = reconcile("Ghost Kitchen", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert_eq!(merged.restaurant_name, "Ghost Kitchen");
        assert!(merged.menu.is_empty());
        assert_eq!(merged.offers.len(), 2);
    }

    #[test]
    fn test_anchor_only_keeps_every_anchor_item() {
        let extractions = vec![
            record(Source::Swiggy, &["Paneer Tikka", "Dal Makhani"]),
            record(Source::Zomato, &["Paneer Tikka", "Lassi"]),
        ];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::AnchorOnly);
        assert_eq!(names(&merged), vec!["Paneer Tikka", "Dal Makhani"]);
        assert_eq!(merged.menu[1].prices.len(), 1);
    }

    #[test]
    fn test_require_any_adds_items_missing_from_anchor() {
        let extractions = vec![
            record(Source::Swiggy, &["Paneer Tikka"]),
            record(Source::Zomato, &["Lassi", "paneer tikka"]),
            record(Source::Magicpin, &["LASSI", "Kulfi"]),
        ];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAny);
        assert_eq!(names(&merged), vec!["Paneer Tikka", "Lassi", "Kulfi"]);

        let lassi = &merged.menu[1];
        assert_eq!(lassi.price(Source::Zomato), Some("₹50"));
        assert_eq!(lassi.price(Source::Magicpin), Some("₹50"));
        assert_eq!(lassi.price(Source::Swiggy), None);
    }

    #[test]
    fn test_description_and_image_fall_back_to_other_sources() {
        let swiggy = record_with_menu(Source::Swiggy, &["Kulfi"]);
        let mut zomato = record_with_menu(Source::Zomato, &["Kulfi"]);
        zomato.menu[0].description = Some("Malai kulfi on a stick".into());

        let extractions = vec![Extraction::Record(swiggy), Extraction::Record(zomato)];
        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert_eq!(merged.menu[0].description.as_deref(), Some("Malai kulfi on a stick"));
    }

    #[test]
    fn test_offers_are_copied_verbatim() {
        let mut swiggy = record_with_menu(Source::Swiggy, &[]);
        swiggy.offers = vec![Offer::new("20% OFF", "PARTY"), Offer::new("20% OFF", "PARTY")];
        let extractions = vec![Extraction::Record(swiggy)];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert_eq!(merged.offers_for(Source::Swiggy).len(), 2);
    }

    #[test]
    fn test_anchor_duplicates_are_preserved() {
        let extractions = vec![
            record(Source::Swiggy, &["Lassi", "Lassi"]),
            record(Source::Zomato, &["lassi"]),
        ];

        let merged = reconcile("Punjabi Dhaba", &extractions, Source::Swiggy, InclusionPolicy::RequireAll);
        assert_eq!(names(&merged), vec!["Lassi", "Lassi"]);
    }
}
