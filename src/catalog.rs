//! Blob catalog: newest-first ordering and the media/documents split.
//!
//! Everything here is a pure function of the fetched list. The UI re-runs
//! [`categorize`] on every poll result instead of patching a previous view.

use crate::types::BlobRecord;

/// Extensions shown in the media tab (images, video, audio).
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "webp", "mp4", "webm", "mov", "avi", "m4v", "mkv", "ogv",
    "mp3", "wav", "ogg",
];

/// Extensions recognised as documents. Unknown extensions also land in the
/// documents tab, but as [`Category::Other`].
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "md", "rtf", "odt", "xlsx", "xls", "ppt", "pptx", "csv",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Media,
    Document,
    Other,
}

/// The two tabs a category folds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewCategory {
    #[default]
    Media,
    Documents,
}

impl ViewCategory {
    pub fn label(self) -> &'static str {
        match self {
            ViewCategory::Media => "media",
            ViewCategory::Documents => "documents",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewCategory::Media => "Media",
            ViewCategory::Documents => "Documents",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewCategory::Media => ViewCategory::Documents,
            ViewCategory::Documents => ViewCategory::Media,
        }
    }
}

impl From<Category> for ViewCategory {
    fn from(c: Category) -> Self {
        match c {
            Category::Media => ViewCategory::Media,
            Category::Document | Category::Other => ViewCategory::Documents,
        }
    }
}

/// Lowercased text after the last `.`; empty when there is no dot.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

pub fn category_of(name: &str) -> Category {
    let ext = extension_of(name);
    if MEDIA_EXTENSIONS.contains(&ext.as_str()) {
        Category::Media
    } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        Category::Document
    } else {
        Category::Other
    }
}

/// Stable newest-first sort; records without a timestamp sort as time 0.
pub fn sort_newest_first(records: &[BlobRecord]) -> Vec<BlobRecord> {
    let mut sorted = records.to_vec();
    // sort_by is stable, so equal timestamps keep their fetch order
    sorted.sort_by(|a, b| b.created_or_zero().cmp(&a.created_or_zero()));
    sorted
}

/// Sorted, partitioned view over one fetch result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogView {
    pub media: Vec<BlobRecord>,
    pub documents: Vec<BlobRecord>,
}

impl CatalogView {
    pub fn list(&self, view: ViewCategory) -> &[BlobRecord] {
        match view {
            ViewCategory::Media => &self.media,
            ViewCategory::Documents => &self.documents,
        }
    }

    pub fn total(&self) -> usize {
        self.media.len() + self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Find a record by display path in either tab.
    pub fn find_by_suffix(&self, suffix: &str) -> Option<(ViewCategory, &BlobRecord)> {
        self.media
            .iter()
            .find(|b| b.display_path() == suffix)
            .map(|b| (ViewCategory::Media, b))
            .or_else(|| {
                self.documents
                    .iter()
                    .find(|b| b.display_path() == suffix)
                    .map(|b| (ViewCategory::Documents, b))
            })
    }
}

pub fn categorize(records: &[BlobRecord]) -> CatalogView {
    let sorted = sort_newest_first(records);
    let (media, documents) = sorted
        .into_iter()
        .partition(|b| category_of(&b.name) == Category::Media);
    CatalogView { media, documents }
}

/// "3 items stored on Shelby Network"
pub fn summary_line(total: usize) -> String {
    let noun = if total == 1 { "item" } else { "items" };
    format!("{total} {noun} stored on Shelby Network")
}

/// Title and hint shown when a tab has nothing to list.
pub fn empty_state(view: ViewCategory) -> (String, String) {
    (
        format!("No {} files", view.label()),
        format!(
            "Upload {} files using the upload action (u).",
            view.label()
        ),
    )
}
