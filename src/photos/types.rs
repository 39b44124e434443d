use std::fmt;

/// One rendition of a source photo as reported by the metadata API.
///
/// Dimensions are kept optional because the API omits them for some legacy
/// size types; such variants still take part in ranking but are never chosen
/// for transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageVariant {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub url: String,
    /// Provider size tag (`"s"`, `"m"`, `"z"`, ...). Only used in log output.
    pub kind: Option<String>,
}

impl ImageVariant {
    #[cfg(test)]
    pub fn new(width: i64, height: i64, url: impl Into<String>) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            url: url.into(),
            kind: None,
        }
    }

    /// Both dimensions present and strictly positive.
    pub fn is_valid(&self) -> bool {
        matches!((self.width, self.height), (Some(w), Some(h)) if w > 0 && h > 0)
    }

    /// Pixel area of a valid variant, `None` otherwise.
    pub fn area(&self) -> Option<i64> {
        if self.is_valid() {
            Some(self.raw_area())
        } else {
            None
        }
    }

    /// Unfiltered `width * height`, treating a missing dimension as zero.
    pub fn raw_area(&self) -> i64 {
        self.width
            .unwrap_or(0)
            .saturating_mul(self.height.unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    pub id: String,
    pub sizes: Vec<ImageVariant>,
    pub like_count: u64,
}

impl PhotoRecord {
    pub fn new(id: impl Into<String>, sizes: Vec<ImageVariant>, like_count: u64) -> Self {
        Self {
            id: id.into(),
            sizes,
            like_count,
        }
    }

    /// Popularity proxy: the largest raw pixel area over all listed sizes.
    ///
    /// `None` for a photo with no sizes at all, which orders below every
    /// photo that has at least one.
    pub fn ranking_key(&self) -> Option<i64> {
        self.sizes.iter().map(ImageVariant::raw_area).max()
    }
}

impl fmt::Display for PhotoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Photo: id={} likes={}>", self.id, self.like_count)
    }
}

/// A photo paired with the variant chosen for transfer.
#[derive(Debug, Clone)]
pub struct SelectedPhoto<'a> {
    pub photo: &'a PhotoRecord,
    pub variant: &'a ImageVariant,
}
