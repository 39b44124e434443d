use crate::types::FileNaming;

use super::types::PhotoRecord;

/// Legacy file name: `"<likeCount>.jpg"`.
///
/// Not injective. Two photos with the same like count get the same name and
/// the later upload replaces the earlier one in the destination folder.
pub fn assign_file_name(photo: &PhotoRecord) -> String {
    format!("{}.jpg", photo.like_count)
}

/// How uploaded files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// `"<likeCount>.jpg"`
    Likes,
    /// `"<likeCount>_<photoId>.jpg"`, unique within a batch.
    LikesWithId,
}

impl From<FileNaming> for NamingPolicy {
    fn from(v: FileNaming) -> Self {
        match v {
            FileNaming::Likes => NamingPolicy::Likes,
            FileNaming::LikesId => NamingPolicy::LikesWithId,
        }
    }
}

impl NamingPolicy {
    pub fn file_name(&self, photo: &PhotoRecord) -> String {
        match self {
            NamingPolicy::Likes => assign_file_name(photo),
            NamingPolicy::LikesWithId => {
                format!("{}_{}.jpg", photo.like_count, clean_filename(&photo.id))
            }
        }
    }

    /// Whether two different photos can map to the same name.
    pub fn may_collide(&self) -> bool {
        matches!(self, NamingPolicy::Likes)
    }
}

/// Strip characters that are invalid in file names on common filesystems.
fn clean_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}
