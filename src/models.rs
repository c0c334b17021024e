use std::fmt;
use std::str::FromStr;

/// One logged change for an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Update {
        date: String,
        version: String,
        remarks: String,
    },
    Patch {
        date: String,
        version: String,
        patch_type: String,
        remarks: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Update,
    Patch,
}

impl EntryKind {
    pub fn log_title(&self) -> &'static str {
        match self {
            EntryKind::Update => "Log of Software Updates",
            EntryKind::Patch => "Log of Software Patches",
        }
    }
}

impl Entry {
    pub fn update(date: &str, version: &str, remarks: &str) -> Self {
        Entry::Update {
            date: date.to_string(),
            version: version.to_string(),
            remarks: remarks.to_string(),
        }
    }

    pub fn patch(date: &str, version: &str, patch_type: &str, remarks: &str) -> Self {
        Entry::Patch {
            date: date.to_string(),
            version: version.to_string(),
            patch_type: patch_type.to_string(),
            remarks: remarks.to_string(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Update { .. } => EntryKind::Update,
            Entry::Patch { .. } => EntryKind::Patch,
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Entry::Update { date, .. } | Entry::Patch { date, .. } => date,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Entry::Update { version, .. } | Entry::Patch { version, .. } => version,
        }
    }

    pub fn remarks(&self) -> &str {
        match self {
            Entry::Update { remarks, .. } | Entry::Patch { remarks, .. } => remarks,
        }
    }

    pub fn patch_type(&self) -> Option<&str> {
        match self {
            Entry::Update { .. } => None,
            Entry::Patch { patch_type, .. } => Some(patch_type),
        }
    }

    /// Value of `field`, or `None` when the entry does not carry it.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Date => Some(self.date()),
            Field::Version => Some(self.version()),
            Field::PatchType => self.patch_type(),
            Field::Remarks => Some(self.remarks()),
        }
    }

    /// Single-line form used by search results and the delete listing.
    pub fn summary(&self) -> String {
        match self.patch_type() {
            Some(patch_type) => format!(
                "Date: {} | Version: {} | Type: {} | Remarks: {}",
                self.date(),
                self.version(),
                patch_type,
                self.remarks()
            ),
            None => format!(
                "Date: {} | Version: {} | Remarks: {}",
                self.date(),
                self.version(),
                self.remarks()
            ),
        }
    }
}

/// Searchable entry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Version,
    PatchType,
    Remarks,
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(Field::Date),
            "version" => Ok(Field::Version),
            "type" | "patchtype" | "patch_type" => Ok(Field::PatchType),
            "remarks" => Ok(Field::Remarks),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Date => "Date",
            Field::Version => "Version",
            Field::PatchType => "Type",
            Field::Remarks => "Remarks",
        };
        f.write_str(name)
    }
}

/// Entries of one application, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLog {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl AppLog {
    pub fn new(name: &str) -> Self {
        AppLog {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_type_only_on_patches() {
        let update = Entry::update("2025-01-01", "1.0", "init");
        let patch = Entry::patch("2025-01-02", "1.0.1", "hotfix", "crash fix");

        assert_eq!(update.kind(), EntryKind::Update);
        assert_eq!(patch.kind(), EntryKind::Patch);
        assert_eq!(update.get(Field::PatchType), None);
        assert_eq!(patch.get(Field::PatchType), Some("hotfix"));
        assert_eq!(patch.get(Field::Remarks), Some("crash fix"));
    }

    #[test]
    fn test_field_names_parse_case_insensitively() {
        assert_eq!("Date".parse::<Field>(), Ok(Field::Date));
        assert_eq!("VERSION".parse::<Field>(), Ok(Field::Version));
        assert_eq!("Type".parse::<Field>(), Ok(Field::PatchType));
        assert_eq!("patchType".parse::<Field>(), Ok(Field::PatchType));
        assert_eq!("owner".parse::<Field>(), Err("owner".to_string()));
    }

    #[test]
    fn test_summary_includes_type_for_patches() {
        let patch = Entry::patch("2025-01-02", "1.0.1", "hotfix", "crash fix");
        assert_eq!(
            patch.summary(),
            "Date: 2025-01-02 | Version: 1.0.1 | Type: hotfix | Remarks: crash fix"
        );

        let update = Entry::update("2025-01-01", "1.0", "init");
        assert_eq!(update.summary(), "Date: 2025-01-01 | Version: 1.0 | Remarks: init");
    }
}
