/// File categorization by extension.
///
/// The category table is fixed: five categories, each with a set of
/// upper-case extensions. Lookups walk the categories in table order and the
/// first match wins.
///
/// # Examples
///
/// ```
/// use clean_folder::file_category::{Category, CategoryTable};
///
/// let table = CategoryTable::default();
/// assert_eq!(table.classify("photo.jpg"), Some(Category::Images));
/// assert_eq!(table.classify("notes.TXT"), Some(Category::Documents));
/// assert_eq!(table.classify("data.xyz"), None);
/// ```
use serde::Serialize;
use std::collections::HashMap;

/// One of the five buckets files are sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Images,
    Video,
    Documents,
    Audio,
    Archives,
}

impl Category {
    /// All categories in lookup order.
    pub const ALL: [Category; 5] = [
        Category::Images,
        Category::Video,
        Category::Documents,
        Category::Audio,
        Category::Archives,
    ];

    /// Returns the folder name for this category.
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "images");
    /// assert_eq!(Category::Archives.dir_name(), "archives");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Video => "video",
            Category::Documents => "documents",
            Category::Audio => "audio",
            Category::Archives => "archives",
        }
    }

    /// Recognized extensions, upper-case, in display order.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => &["JPEG", "PNG", "JPG", "SVG"],
            Category::Video => &["AVI", "MP4", "MOV", "MKV"],
            Category::Documents => &["DOC", "DOCX", "TXT", "PDF", "XLSX", "PPTX"],
            Category::Audio => &["MP3", "OGG", "WAV", "AMR"],
            Category::Archives => &["ZIP", "GZ", "TAR", "RAR"],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Derives the classification key of a file name.
///
/// This is the text after the last `.`, upper-cased. A name without any `.`
/// yields the whole name upper-cased, which never matches a category.
///
/// ```
/// use clean_folder::file_category::extension_of;
///
/// assert_eq!(extension_of("archive.tar.gz"), "GZ");
/// assert_eq!(extension_of("Makefile"), "MAKEFILE");
/// assert_eq!(extension_of("trailing."), "");
/// ```
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_uppercase(),
        None => file_name.to_uppercase(),
    }
}

/// The fixed extension-to-category table.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    extension_map: HashMap<&'static str, Category>,
}

impl CategoryTable {
    /// Builds the table from [`Category::ALL`].
    pub fn new() -> Self {
        let mut extension_map = HashMap::new();
        for category in Category::ALL {
            for ext in category.extensions() {
                // earlier categories keep an extension if it is ever listed twice
                extension_map.entry(*ext).or_insert(category);
            }
        }
        Self { extension_map }
    }

    /// Categories with their extensions, in table order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &'static [&'static str])> {
        Category::ALL.into_iter().map(|c| (c, c.extensions()))
    }

    /// Maps an upper-case extension to its category.
    pub fn category_for_extension(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(ext).copied()
    }

    /// Classifies a file name, `None` meaning "unknown".
    pub fn classify(&self, file_name: &str) -> Option<Category> {
        self.category_for_extension(&extension_of(file_name))
    }

    /// Returns `true` if the file name carries an archive extension.
    pub fn is_archive(&self, file_name: &str) -> bool {
        self.classify(file_name) == Some(Category::Archives)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}
