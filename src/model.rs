use crate::config::Settings;
use std::fmt::{Display, Formatter};

/// Runs of two or more whitespace characters inside a tabular listing line
/// collapse into this delimiter before field extraction.
pub const COLUMN_DELIMITER: char = ',';

/// Placeholder token replaced with the selected resource identifier.
pub const TEMPLATE_PLACEHOLDER: char = '#';

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Containers,
    Volumes,
    Images,
}

impl ResourceKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Containers => "Containers",
            Self::Volumes => "Volumes",
            Self::Images => "Images",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Self::Containers => "container",
            Self::Volumes => "volume",
            Self::Images => "image",
        }
    }

    pub fn listing_args(self) -> &'static [&'static str] {
        match self {
            Self::Containers => &["ps", "-as"],
            Self::Volumes => &["volume", "ls", "-q"],
            Self::Images => &[
                "images",
                "--format=table{{.ID}} {{.Repository}}:{{.Tag}} ({{.CreatedSince}})",
            ],
        }
    }

    /// Whether the listing output is a free-text table whose multi-space
    /// column gaps must be collapsed into [`COLUMN_DELIMITER`].
    pub fn normalizes_columns(self) -> bool {
        matches!(self, Self::Containers)
    }

    /// Whether the listing output starts with a column-header row.
    pub fn has_header(self) -> bool {
        matches!(self, Self::Containers | Self::Images)
    }

    /// One selectable menu line per record. The raw identifier stays the
    /// first whitespace-delimited token so the destructive action can
    /// recover it from the selected text.
    pub fn menu_line(self, record: &str) -> String {
        match self {
            Self::Containers => {
                // CONTAINER ID,IMAGE,COMMAND,CREATED,STATUS,NAMES,SIZE
                let fields = record.split(COLUMN_DELIMITER).collect::<Vec<_>>();
                let field = |index: usize| fields.get(index).copied().unwrap_or("");
                format!("{} ({}) {} {}", field(0), field(5), field(1), field(4))
            }
            Self::Volumes | Self::Images => record.to_string(),
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MainAction {
    RemoveContainer,
    RemoveVolume,
    ExportVolume,
    RemoveImage,
    Exit,
}

impl MainAction {
    pub const ALL: [Self; 5] = [
        Self::RemoveContainer,
        Self::RemoveVolume,
        Self::ExportVolume,
        Self::RemoveImage,
        Self::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::RemoveContainer => "Remove container",
            Self::RemoveVolume => "Remove volume",
            Self::ExportVolume => "Export volume",
            Self::RemoveImage => "Remove image",
            Self::Exit => "Exit",
        }
    }

    pub fn kind(self) -> Option<ResourceKind> {
        match self {
            Self::RemoveContainer => Some(ResourceKind::Containers),
            Self::RemoveVolume | Self::ExportVolume => Some(ResourceKind::Volumes),
            Self::RemoveImage => Some(ResourceKind::Images),
            Self::Exit => None,
        }
    }

    pub fn template(self, settings: &Settings) -> Option<CommandTemplate> {
        let bin = &settings.docker_bin;
        match self {
            Self::RemoveContainer => Some(CommandTemplate::new(format!("{bin} rm #"))),
            Self::RemoveVolume => Some(CommandTemplate::new(format!("{bin} volume rm #"))),
            Self::RemoveImage => Some(CommandTemplate::new(format!("{bin} rmi #"))),
            Self::ExportVolume => Some(CommandTemplate::new(format!(
                "{bin} run --rm -v #:/workspaces {} tar -C /workspaces -zcf - . > #.tgz",
                settings.export_image
            ))),
            Self::Exit => None,
        }
    }
}

/// A command string carrying one placeholder token (two for the export
/// template). Substitution replaces every occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(String);

impl CommandTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn fill(&self, identifier: &str) -> String {
        self.0.replace(TEMPLATE_PLACEHOLDER, identifier)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The full set of record lines produced by one listing invocation. The
/// final element of the newline split is always an empty artifact of the
/// trailing newline; tabular kinds additionally start with a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingResult {
    pub records: Vec<String>,
    pub raw_line_count: usize,
}

impl ListingResult {
    pub fn usable_records(&self, kind: ResourceKind) -> &[String] {
        let mut records = self.records.as_slice();
        if let [head @ .., _artifact] = records {
            records = head;
        }
        if kind.has_header()
            && let [_header, tail @ ..] = records
        {
            records = tail;
        }
        records
    }
}
