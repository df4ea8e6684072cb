//! Reading and writing the JSON files a run produces.
//! Output is pretty-printed with 4-space indentation and written to a temporary
//! file first, so an interrupted run never leaves a half-written file behind.

use serde::de::DeserializeOwned;
use serde::ser::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};



const INDENT: &[u8] = b"    ";

/// Serializes `value` to `writer` with 4-space indentation and a trailing newline.
pub fn to_writer_pretty<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<(), crate::Error> {
  let formatter = PrettyFormatter::with_indent(INDENT);
  let mut serializer = Serializer::with_formatter(&mut writer, formatter);
  value.serialize(&mut serializer)?;
  writer.write_all(b"\n")?;
  writer.flush()?;
  Ok(())
}

/// Reads a JSON file, returning `None` if it does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, crate::Error> {
  let file = match File::open(path) {
    Ok(file) => file,
    Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(err) => return Err(err.into())
  };

  let item = serde_json::from_reader(BufReader::new(file))?;
  Ok(Some(item))
}

/// Writes `value` to `path`, replacing any existing file in one rename.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), crate::Error> {
  let dir = match path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => dir,
    _ => Path::new(".")
  };

  let mut file = NamedTempFile::new_in(dir)?;
  to_writer_pretty(BufWriter::new(file.as_file_mut()), value)?;
  file.as_file().sync_all()?;
  file.persist(path).map_err(|err| err.error)?;
  Ok(())
}

/// [`read_json`] on the blocking thread pool.
pub async fn load_json<T: DeserializeOwned + Send + 'static>(path: impl Into<PathBuf>) -> Result<Option<T>, crate::Error> {
  let path = path.into();
  tokio::task::spawn_blocking(move || read_json(&path)).await?
}

/// [`write_json`] on the blocking thread pool.
pub async fn save_json<T: Serialize + Send + 'static>(path: impl Into<PathBuf>, value: T) -> Result<T, crate::Error> {
  let path = path.into();
  tokio::task::spawn_blocking(move || write_json(&path, &value).map(|()| value)).await?
}
