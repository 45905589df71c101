//! Page-level access to solicitation PDFs.

use crate::error::{ExtractError, ExtractResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A source of page-ordered document text.
pub trait PageSource {
    /// Text of every page, in page order.
    fn pages(&self) -> ExtractResult<Vec<String>>;

    /// Whole-document text, pages concatenated without separators.
    fn full_text(&self) -> ExtractResult<String> {
        Ok(self.pages()?.concat())
    }

    /// Text of the first page containing `keyword`.
    fn find_page(&self, keyword: &str) -> ExtractResult<Option<String>> {
        Ok(self
            .pages()?
            .into_iter()
            .find(|page| page.contains(keyword)))
    }
}

/// A solicitation PDF on disk.
///
/// Every call re-reads the file, so each table lookup works on its own
/// document handle.
#[derive(Debug, Clone)]
pub struct PdfFile {
    path: PathBuf,
}

impl PdfFile {
    /// Open a PDF, failing early if the path does not exist.
    pub fn open(path: impl AsRef<Path>) -> ExtractResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a path looks like a PDF by extension.
    pub fn is_pdf(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }
}

impl PageSource for PdfFile {
    fn pages(&self) -> ExtractResult<Vec<String>> {
        debug!("Reading PDF pages: {:?}", self.path);

        let bytes = std::fs::read(&self.path)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            ExtractError::UnreadablePdf {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;

        debug!("Read {} pages from {:?}", pages.len(), self.path);
        Ok(pages)
    }
}

/// Already-extracted page text.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pages: Vec<String>,
}

impl PageText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// A single-page document.
    pub fn single(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }
}

impl PageSource for PageText {
    fn pages(&self) -> ExtractResult<Vec<String>> {
        Ok(self.pages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_concatenates_pages() {
        let doc = PageText::new(vec!["page one\n".to_string(), "page two\n".to_string()]);
        assert_eq!(doc.full_text().unwrap(), "page one\npage two\n");
    }

    #[test]
    fn test_find_page() {
        let doc = PageText::new(vec![
            "cover sheet".to_string(),
            "CLIN  PR table here".to_string(),
            "CLIN  PR again".to_string(),
        ]);
        assert_eq!(
            doc.find_page("CLIN  PR").unwrap().as_deref(),
            Some("CLIN  PR table here")
        );
        assert!(doc.find_page("missing").unwrap().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let err = PdfFile::open("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound(_)));
    }

    #[test]
    fn test_garbage_pdf_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let pdf = PdfFile::open(&path).unwrap();
        assert!(matches!(
            pdf.full_text().unwrap_err(),
            ExtractError::UnreadablePdf { .. }
        ));
    }

    #[test]
    fn test_is_pdf() {
        assert!(PdfFile::is_pdf(Path::new("a/b/SPE123.PDF")));
        assert!(PdfFile::is_pdf(Path::new("x.pdf")));
        assert!(!PdfFile::is_pdf(Path::new("x.txt")));
    }
}
