use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::models::{AppLog, Entry, Field};

const APP_MARKER: &str = "App:";
const DELIMITER: char = '|';
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Update and patch logs per application, backed by a flat text file.
///
/// Every mutation rewrites the whole file. Applications keep the order in
/// which they were first seen.
pub struct Store {
    path: PathBuf,
    apps: Vec<AppLog>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store {
            path: path.into(),
            apps: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn apps(&self) -> &[AppLog] {
        &self.apps
    }

    pub fn app(&self, name: &str) -> Option<&AppLog> {
        self.apps.iter().find(|log| log.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Reads the backing file into memory. A missing file leaves the store as is.
    ///
    /// Sections read from the file replace the entries of the same app; apps
    /// not mentioned in the file are kept. On error, whatever was parsed
    /// before the failure stays loaded.
    pub fn load(&mut self) -> Result<(), StoreError> {
        if !self.path.exists() {
            debug!("No data file at {}, starting empty", self.path.display());
            return Ok(());
        }

        let file = File::open(&self.path).map_err(|e| self.load_error(e))?;
        let mut current: Option<usize> = None;

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.load_error(e))?;
            let line = line.trim();
            let line_no = index + 1;

            if let Some(name) = line.strip_prefix(APP_MARKER) {
                let name = name.trim();
                current = if name.is_empty() {
                    warn!("{}:{}: app marker without a name", self.path.display(), line_no);
                    None
                } else {
                    Some(self.reset_app(name))
                };
                continue;
            }

            if line.is_empty() {
                continue;
            }

            let Some(app_index) = current else {
                warn!(
                    "{}:{}: entry outside a named app section, skipped",
                    self.path.display(),
                    line_no
                );
                continue;
            };

            match parse_entry(line) {
                Some((entry, field_count)) => {
                    if field_count != 3 && field_count != 4 {
                        warn!(
                            "{}:{}: expected 3 or 4 fields, found {}; recovered by position",
                            self.path.display(),
                            line_no,
                            field_count
                        );
                    }
                    self.apps[app_index].entries.push(entry);
                }
                None => warn!("{}:{}: no version field, skipped", self.path.display(), line_no),
            }
        }

        debug!(
            "Loaded {} apps ({} entries) from {}",
            self.apps.len(),
            self.apps.iter().map(|app| app.entries.len()).sum::<usize>(),
            self.path.display()
        );
        Ok(())
    }

    /// Replaces the backing file with the current contents.
    ///
    /// The data is written to a temporary file next to the target and renamed
    /// over it, so a failed save leaves the previous file in place.
    pub fn save(&self) -> Result<(), StoreError> {
        self.write_file().map_err(|source| StoreError::Save {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved {} apps to {}", self.apps.len(), self.path.display());
        Ok(())
    }

    fn write_file(&self) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(self.serialize().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn serialize(&self) -> String {
        let mut out = String::new();
        for app in &self.apps {
            out.push_str(&format!("{} {}\n", APP_MARKER, app.name));
            for entry in &app.entries {
                out.push_str(&format_entry(entry));
                out.push('\n');
            }
        }
        out
    }

    pub fn add_update(
        &mut self,
        app: &str,
        date: &str,
        version: &str,
        remarks: &str,
    ) -> Result<(), StoreError> {
        self.push_entry(app, Entry::update(date, version, remarks))
    }

    pub fn add_patch(
        &mut self,
        app: &str,
        date: &str,
        version: &str,
        patch_type: &str,
        remarks: &str,
    ) -> Result<(), StoreError> {
        self.push_entry(app, Entry::patch(date, version, patch_type, remarks))
    }

    fn push_entry(&mut self, app: &str, entry: Entry) -> Result<(), StoreError> {
        if format_entry(&entry).matches(DELIMITER).count() != entry_delimiters(&entry) {
            warn!(
                "Value for {} contains '{}'; the entry will not reload as written",
                app,
                DELIMITER
            );
        }

        match self.apps.iter_mut().find(|log| log.name == app) {
            Some(log) => log.entries.push(entry),
            None => {
                let mut log = AppLog::new(app);
                log.entries.push(entry);
                self.apps.push(log);
            }
        }
        self.save()
    }

    /// Writes every app and its entries, grouped under a log title per entry.
    pub fn display_all<W: Write>(&self, out: &mut W) -> Result<(), StoreError> {
        if self.apps.is_empty() {
            return Err(StoreError::Empty);
        }
        self.render(out).map_err(StoreError::Render)
    }

    fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for app in &self.apps {
            writeln!(out, "\n>> App Name: {}", app.name)?;
            for entry in &app.entries {
                writeln!(out, "\n{}", entry.kind().log_title())?;
                writeln!(out, "Date: {}", entry.date())?;
                writeln!(out, "Version: {}", entry.version())?;
                if let Some(patch_type) = entry.patch_type() {
                    writeln!(out, "Type: {}", patch_type)?;
                }
                writeln!(out, "Remarks: {}", entry.remarks())?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Like [`Store::search`], with the field given by name (`Date`, `Version`, `Type`, `Remarks`).
    pub fn search_by_field(
        &self,
        app: &str,
        field_name: &str,
        value: &str,
    ) -> Result<Vec<&Entry>, StoreError> {
        let field = field_name
            .parse::<Field>()
            .map_err(|name| StoreError::UnknownField { name })?;
        self.search(app, field, value)
    }

    /// Entries of `app` whose `field` equals `value` exactly, in log order.
    pub fn search(&self, app: &str, field: Field, value: &str) -> Result<Vec<&Entry>, StoreError> {
        let log = self.app(app).ok_or_else(|| StoreError::UnknownApp {
            app: app.to_string(),
        })?;

        let matches: Vec<&Entry> = log
            .entries
            .iter()
            .filter(|entry| entry.get(field) == Some(value))
            .collect();

        if matches.is_empty() {
            return Err(StoreError::NoMatches {
                app: app.to_string(),
                field,
            });
        }
        Ok(matches)
    }

    /// Reloads from disk, then removes one entry by zero-based positions and saves.
    pub fn delete_entry(
        &mut self,
        app_index: usize,
        entry_index: usize,
    ) -> Result<Entry, StoreError> {
        self.load()?;

        if self.apps.is_empty() {
            return Err(StoreError::Empty);
        }

        let app_count = self.apps.len();
        let log = self
            .apps
            .get_mut(app_index)
            .ok_or(StoreError::AppIndexOutOfRange {
                index: app_index,
                len: app_count,
            })?;

        if entry_index >= log.entries.len() {
            return Err(StoreError::EntryIndexOutOfRange {
                app: log.name.clone(),
                index: entry_index,
                len: log.entries.len(),
            });
        }

        let removed = log.entries.remove(entry_index);
        self.save()?;
        Ok(removed)
    }

    /// Records an update dated strictly after today.
    pub fn set_future_plan(
        &mut self,
        app: &str,
        date: &str,
        version: &str,
        notes: &str,
    ) -> Result<(), StoreError> {
        let today = Local::now().date_naive();
        self.set_future_plan_as_of(today, app, date, version, notes)
    }

    fn set_future_plan_as_of(
        &mut self,
        today: NaiveDate,
        app: &str,
        date: &str,
        version: &str,
        notes: &str,
    ) -> Result<(), StoreError> {
        let planned = parse_date(date)?;
        if planned <= today {
            return Err(StoreError::NotInFuture {
                date: date.to_string(),
            });
        }
        self.add_update(app, date, version, notes)
    }

    /// Days of `year`-`month` on which `app` has at least one entry, in calendar order.
    ///
    /// Unknown apps yield an empty list; entries with unparseable dates are ignored.
    pub fn available_dates_in_month(
        &self,
        app: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(StoreError::InvalidMonth { year, month })?;

        let logged: BTreeSet<NaiveDate> = self
            .app(app)
            .map(|log| log.entries.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| match NaiveDate::parse_from_str(entry.date(), DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    debug!("Skipping unparseable date '{}' for {}", entry.date(), app);
                    None
                }
            })
            .collect();

        Ok(first
            .iter_days()
            .take_while(|day| day.month() == month)
            .filter(|day| logged.contains(day))
            .collect())
    }

    /// Clears the entries of `name`, creating the app if needed. Returns its position.
    fn reset_app(&mut self, name: &str) -> usize {
        match self.apps.iter().position(|log| log.name == name) {
            Some(index) => {
                self.apps[index].entries.clear();
                index
            }
            None => {
                self.apps.push(AppLog::new(name));
                self.apps.len() - 1
            }
        }
    }

    fn load_error(&self, source: io::Error) -> StoreError {
        StoreError::Load {
            path: self.path.clone(),
            source,
        }
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| StoreError::InvalidDate {
        value: value.to_string(),
    })
}

/// Splits a data line into an entry, returning it with the number of fields seen.
///
/// Three fields make an update and four a patch. Other counts fall back to
/// position: first is the date, second the version, last the remarks.
/// A line without a second field yields `None`.
fn parse_entry(line: &str) -> Option<(Entry, usize)> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    let entry = match fields.as_slice() {
        [date, version, remarks] => Entry::update(date, version, remarks),
        [date, version, patch_type, remarks] => Entry::patch(date, version, patch_type, remarks),
        [date, version] => Entry::update(date, version, version),
        [date, version, .., remarks] => Entry::update(date, version, remarks),
        _ => return None,
    };
    Some((entry, fields.len()))
}

fn format_entry(entry: &Entry) -> String {
    match entry.patch_type() {
        Some(patch_type) => format!(
            "{}{d}{}{d}{}{d}{}",
            entry.date(),
            entry.version(),
            patch_type,
            entry.remarks(),
            d = DELIMITER
        ),
        None => format!(
            "{}{d}{}{d}{}",
            entry.date(),
            entry.version(),
            entry.remarks(),
            d = DELIMITER
        ),
    }
}

fn entry_delimiters(entry: &Entry) -> usize {
    match entry {
        Entry::Update { .. } => 2,
        Entry::Patch { .. } => 3,
    }
}
