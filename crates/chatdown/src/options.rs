//! Configuration options for conversation export

/// Whether the best-effort conversation date goes into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatDateMode {
    /// Leave it out; page dates are too unreliable to trust by default
    #[default]
    Omit,
    /// Add a `**Chat Date:**` line under the export link when one is found
    Include,
}

/// Options for [`ExportService`](crate::ExportService)
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Name shown in the speaker header of user turns
    pub speaker_name: String,

    /// Visible text of the export link, followed by the timestamp
    pub export_label: String,

    /// File stem used when the page has no usable title
    pub fallback_title: String,

    /// Conversation date handling
    pub chat_date: ChatDateMode,

    /// How many ancestors the attachment search may climb
    pub max_ancestor_depth: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            speaker_name: "User".to_string(),
            export_label: "Exported from Claude.ai on".to_string(),
            fallback_title: "Conversation".to_string(),
            chat_date: ChatDateMode::Omit,
            max_ancestor_depth: 32,
        }
    }
}
