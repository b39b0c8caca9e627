//! ExportService - the main entry point for page to Markdown conversion.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use url::Url;

use crate::document::{self, DocumentHeader};
use crate::options::ExportOptions;
use crate::page::{self, Page};
use crate::render::Renderer;
use crate::save;
use crate::Result;

/// The main service for converting conversation pages to Markdown
#[derive(Debug, Clone, Default)]
pub struct ExportService {
    options: ExportOptions,
}

impl ExportService {
    /// Create a new ExportService with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an ExportService with custom options
    pub fn with_options(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Convert a page, stamping it with `exported_at`
    pub fn export(&self, page: &Page, exported_at: DateTime<Utc>) -> String {
        let header = DocumentHeader {
            timestamp: page::format_timestamp(exported_at),
            location: page.location.clone(),
            chat_date: page.chat_date().map(page::format_date),
        };
        let renderer = Renderer::with_base_url(Url::parse(&page.location).ok());
        document::assemble(&page.root_ref(), &header, &renderer, &self.options)
    }

    /// Convert a page, stamping it with the current time
    pub fn export_now(&self, page: &Page) -> String {
        self.export(page, Utc::now())
    }

    /// Parse and convert a saved HTML page.
    ///
    /// ```rust
    /// use chatdown::ExportService;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let html = r#"<div class="font-user-message"><p>Hi</p></div>"#;
    /// let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let md = ExportService::new().export_html(html, "https://claude.ai/chat/1", at);
    /// assert!(md.ends_with("> Hi"));
    /// ```
    #[cfg(feature = "html")]
    pub fn export_html(&self, html: &str, location: &str, exported_at: DateTime<Utc>) -> String {
        self.export(&Page::from_html(html, location), exported_at)
    }

    /// File name the page's export should be saved under
    pub fn file_name(&self, page: &Page) -> String {
        save::file_name(page.title().as_deref(), &self.options.fallback_title)
    }

    /// Save an export of `page` into `dir`
    pub fn save(&self, page: &Page, markdown: &str, dir: &Path) -> Result<PathBuf> {
        save::save_markdown(dir, &self.file_name(page), markdown)
    }

    /// Get the current options
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut ExportOptions {
        &mut self.options
    }
}
