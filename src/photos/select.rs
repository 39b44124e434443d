//! Ranking and size resolution. Both are pure functions over fetched metadata.

use std::cmp::Reverse;

use super::types::{ImageVariant, PhotoRecord, SelectedPhoto};

/// Pick the variant to transfer: the valid variant with the largest pixel
/// area. On a tie the earliest variant in `variants` wins.
///
/// Returns `None` when no variant has positive width and height.
pub fn select_best_variant(variants: &[ImageVariant]) -> Option<&ImageVariant> {
    // min_by_key keeps the first of equal elements, max_by_key the last.
    variants
        .iter()
        .filter_map(|v| v.area().map(|area| (area, v)))
        .min_by_key(|(area, _)| Reverse(*area))
        .map(|(_, v)| v)
}

/// Pair a photo with its best variant, or `None` if it has nothing to transfer.
pub fn select_photo(photo: &PhotoRecord) -> Option<SelectedPhoto<'_>> {
    select_best_variant(&photo.sizes).map(|variant| SelectedPhoto { photo, variant })
}

/// Order photos by descending [`PhotoRecord::ranking_key`] and keep the first
/// `limit`. The sort is stable, so photos with equal keys keep their input
/// order.
pub fn rank_and_truncate(mut photos: Vec<PhotoRecord>, limit: usize) -> Vec<PhotoRecord> {
    photos.sort_by_key(|p| Reverse(p.ranking_key()));
    photos.truncate(limit);
    photos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(width: i64, height: i64, url: &str) -> ImageVariant {
        ImageVariant::new(width, height, url)
    }

    fn photo(id: &str, sizes: Vec<ImageVariant>) -> PhotoRecord {
        PhotoRecord::new(id, sizes, 0)
    }

    #[test]
    fn test_best_variant_is_largest_area() {
        let sizes = vec![v(75, 50, "s"), v(807, 538, "y"), v(604, 403, "x")];
        assert_eq!(select_best_variant(&sizes).unwrap().url, "y");
    }

    #[test]
    fn test_best_variant_tie_takes_first() {
        let sizes = vec![v(10, 40, "a"), v(20, 20, "b"), v(40, 10, "c")];
        assert_eq!(select_best_variant(&sizes).unwrap().url, "a");
    }

    #[test]
    fn test_best_variant_skips_invalid() {
        let sizes = vec![
            v(0, 0, "zero"),
            ImageVariant {
                width: None,
                height: Some(5000),
                url: "no-width".into(),
                kind: None,
            },
            v(-100, -100, "negative"),
            v(10, 10, "ok"),
        ];
        assert_eq!(select_best_variant(&sizes).unwrap().url, "ok");
    }

    #[test]
    fn test_best_variant_none_when_empty() {
        assert!(select_best_variant(&[]).is_none());
    }

    #[test]
    fn test_best_variant_none_when_all_invalid() {
        let sizes = vec![v(0, 0, "a"), v(100, 0, "b"), v(-1, 5, "c")];
        assert!(select_best_variant(&sizes).is_none());
    }

    #[test]
    fn test_select_photo() {
        let p = photo("1", vec![v(1, 1, "a"), v(2, 2, "b")]);
        let selected = select_photo(&p).unwrap();
        assert_eq!(selected.photo.id, "1");
        assert_eq!(selected.variant.url, "b");
        assert!(select_photo(&photo("2", vec![])).is_none());
    }

    #[test]
    fn test_rank_descending_by_area() {
        let photos = vec![
            photo("small", vec![v(10, 10, "")]),
            photo("large", vec![v(10, 10, ""), v(100, 100, "")]),
            photo("medium", vec![v(50, 50, "")]),
        ];
        let ranked = rank_and_truncate(photos, 10);
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["large", "medium", "small"]);
    }

    #[test]
    fn test_rank_is_stable() {
        let photos = vec![
            photo("a", vec![v(10, 10, "")]),
            photo("b", vec![v(20, 20, "")]),
            photo("c", vec![v(10, 10, "")]),
            photo("d", vec![v(20, 20, "")]),
            photo("e", vec![v(10, 10, "")]),
        ];
        let ranked = rank_and_truncate(photos, 10);
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c", "e"]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let photos: Vec<PhotoRecord> = (1..=8)
            .map(|i| photo(&i.to_string(), vec![v(i, i, "")]))
            .collect();
        let all_keys: Vec<i64> = photos.iter().filter_map(|p| p.ranking_key()).collect();

        let ranked = rank_and_truncate(photos, 3);
        assert_eq!(ranked.len(), 3);

        let kept: Vec<i64> = ranked.iter().filter_map(|p| p.ranking_key()).collect();
        let lowest_kept = *kept.iter().min().unwrap();
        let dropped = all_keys.iter().filter(|k| !kept.contains(k));
        for key in dropped {
            assert!(lowest_kept >= *key);
        }
    }

    #[test]
    fn test_rank_fewer_than_limit_returns_all() {
        let photos = vec![photo("a", vec![v(1, 1, "")]), photo("b", vec![v(2, 2, "")])];
        assert_eq!(rank_and_truncate(photos, 5).len(), 2);
        assert!(rank_and_truncate(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_rank_uses_raw_sizes() {
        // An invalid (negative) size still counts towards the ranking key.
        let photos = vec![
            photo("valid", vec![v(10, 10, "")]),
            photo("raw", vec![v(-20, -20, ""), v(1, 1, "")]),
        ];
        let ranked = rank_and_truncate(photos, 5);
        assert_eq!(ranked[0].id, "raw");
    }

    #[test]
    fn test_rank_empty_sizes_sort_last() {
        let photos = vec![
            photo("empty", vec![]),
            photo("zero", vec![v(0, 0, "")]),
            photo("ok", vec![v(5, 5, "")]),
        ];
        let ranked = rank_and_truncate(photos, 5);
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "zero", "empty"]);
    }
}
