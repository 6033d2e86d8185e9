use crate::error::LoadError;
use crate::record::{Record, Value};
use crate::store::RecordStore;
use crate::variant::GameKind;
use crate::{debug_log, info_log};
use calamine::{Data, Reader, open_workbook_auto};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

const DATA_DIR_NAME: &str = "eptsdle";

/// Where a game's records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Embedded {
        label: &'static str,
        data: &'static str,
    },
}

impl DataSource {
    /// Pick the source for `kind`: an explicit path wins, then the default
    /// file name in the user data directory, then the working directory,
    /// then the sample data compiled into the binary.
    #[must_use]
    pub fn locate(kind: GameKind, explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::File(path.to_path_buf());
        }
        let file_name = kind.default_file_name();
        let candidates = dirs::data_dir()
            .map(|dir| dir.join(DATA_DIR_NAME).join(file_name))
            .into_iter()
            .chain(std::iter::once(PathBuf::from(file_name)));
        for path in candidates {
            if path.is_file() {
                debug_log!("DataSource::locate() - found {}", path.display());
                return Self::File(path);
            }
        }
        Self::embedded(kind)
    }

    #[must_use]
    pub fn embedded(kind: GameKind) -> Self {
        Self::Embedded {
            label: kind.title(),
            data: kind.embedded_data(),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Embedded { label, .. } => format!("built-in {label} data"),
        }
    }

    pub fn load(&self, name_field: &str) -> Result<RecordStore, LoadError> {
        match self {
            Self::File(path) => load_store_from_file(path, name_field),
            Self::Embedded { data, .. } => load_store_from_str(data, name_field, &self.label()),
        }
    }
}

/// Load tab-separated text: one header row, then one row per record.
pub fn load_store_from_str(
    data: &str,
    name_field: &str,
    source_name: &str,
) -> Result<RecordStore, LoadError> {
    // Text exported from Excel starts with a byte order mark
    let data = data.trim_start_matches('\u{feff}');
    let mut lines = data.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().map(split_header).ok_or_else(|| LoadError::MissingHeader {
        source_name: source_name.to_string(),
    })?;
    let rows = lines.map(|line| line.split('\t').map(Value::parse).collect());
    build_store(&header, rows, name_field, source_name)
}

/// Load a spreadsheet (first worksheet) or a `.tsv` file.
pub fn load_store_from_file<P: AsRef<Path>>(
    path: P,
    name_field: &str,
) -> Result<RecordStore, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, name_field),
        "tsv" | "txt" => load_delimited_file(path, name_field),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn load_delimited_file(path: &Path, name_field: &str) -> Result<RecordStore, LoadError> {
    let data = fs::read_to_string(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    load_store_from_str(&data, name_field, &path.display().to_string())
}

fn load_workbook(path: &Path, name_field: &str) -> Result<RecordStore, LoadError> {
    let workbook_err = |reason: String| LoadError::Workbook {
        path: path.to_path_buf(),
        reason,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| workbook_err(e.to_string()))?;

    let source_name = path.display().to_string();
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .ok_or_else(|| LoadError::MissingHeader {
            source_name: source_name.clone(),
        })?;
    let rows = rows.map(|cells| cells.iter().map(cell_value).collect());
    build_store(&header, rows, name_field, &source_name)
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        #[allow(clippy::cast_precision_loss)]
        Data::Int(n) => Some(Value::Number(*n as f64)),
        Data::Float(n) => Some(Value::Number(*n)),
        Data::String(s) => Value::parse(s).map(|value| match value {
            // Text cells stay text even when they look numeric, except the marker
            Value::Number(_) => Value::Text(s.trim().to_string()),
            other => other,
        }),
        other => Value::parse(&other.to_string()),
    }
}

fn split_header(line: &str) -> Vec<String> {
    line.split('\t').map(|cell| cell.trim().to_string()).collect()
}

fn build_store<I>(
    header: &[String],
    rows: I,
    name_field: &str,
    source_name: &str,
) -> Result<RecordStore, LoadError>
where
    I: Iterator<Item = Vec<Option<Value>>>,
{
    let name_index = header
        .iter()
        .position(|column| column == name_field)
        .ok_or_else(|| LoadError::MissingColumn {
            source_name: source_name.to_string(),
            column: name_field.to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (row_number, cells) in rows.enumerate() {
        let name = match cells.get(name_index) {
            Some(Some(value)) => value.to_string(),
            _ => {
                debug_log!("build_store() - row {} has no name, skipped", row_number + 2);
                continue;
            }
        };
        if !seen.insert(name.to_lowercase()) {
            log::warn!("{source_name}: duplicate name '{name}' on row {}, skipped", row_number + 2);
            continue;
        }
        let fields = header
            .iter()
            .zip(cells)
            .filter(|(column, _)| !column.is_empty())
            .filter_map(|(column, cell)| cell.map(|value| (column.clone(), value)))
            .collect();
        records.push(Record::new(name, fields));
    }

    if records.is_empty() {
        return Err(LoadError::Empty {
            source_name: source_name.to_string(),
        });
    }
    info_log!("Loaded {} records from {}", records.len(), source_name);
    Ok(RecordStore::new(name_field, source_name, records))
}

/// A one-shot background load, tagged with the session generation that
/// requested it.
pub struct LoadTask {
    generation: u64,
    source_name: String,
    handle: JoinHandle<Result<RecordStore, LoadError>>,
}

impl LoadTask {
    #[must_use]
    pub fn spawn(source: DataSource, name_field: &'static str, generation: u64) -> Self {
        let source_name = source.label();
        debug_log!("LoadTask::spawn() - generation {} from {}", generation, source_name);
        let handle = thread::spawn(move || source.load(name_field));
        Self {
            generation,
            source_name,
            handle,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Block until the load finishes.
    pub fn wait(self) -> (u64, Result<RecordStore, LoadError>) {
        let result = self.handle.join().unwrap_or_else(|_| {
            Err(LoadError::Interrupted {
                source_name: self.source_name,
            })
        });
        (self.generation, result)
    }
}
