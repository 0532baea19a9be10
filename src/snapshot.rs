//! Binary snapshots of query results.
//!
//! Mappings serialize to a small framed format: a magic header, a format
//! version byte, and a bincode body. Writes go through a staging file in
//! the same directory followed by a rename, so a crash mid-write never
//! leaves a partially written snapshot at the target path.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::hash::Hash;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SpatiqError};
use crate::mapping::IntervalSetMapping;

const MAGIC: &[u8; 4] = b"SPQS";
const VERSION: u8 = 1;

/// Write a mapping snapshot to `path`, replacing any existing file
/// atomically.
pub fn write_snapshot<K, P>(mapping: &IntervalSetMapping<K, P>, path: &Path) -> Result<()>
where
    K: Serialize,
    P: Serialize,
{
    let staging = staging_path(path);
    let file = File::create(&staging)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(MAGIC)?;
    writer.write_all(&[VERSION])?;
    bincode::serialize_into(&mut writer, mapping)?;
    let file = writer
        .into_inner()
        .map_err(|e| SpatiqError::Io(e.into_error()))?;
    file.sync_all()?;
    fs::rename(&staging, path)?;
    Ok(())
}

/// Read a mapping snapshot from `path`.
pub fn read_snapshot<K, P>(path: &Path) -> Result<IntervalSetMapping<K, P>>
where
    K: DeserializeOwned + Eq + Hash,
    P: DeserializeOwned,
{
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|_| SpatiqError::Corrupted("file too short for header".into()))?;
    if &magic != MAGIC {
        return Err(SpatiqError::Corrupted(format!(
            "bad magic bytes {magic:02x?}"
        )));
    }

    let mut version = [0u8; 1];
    reader
        .read_exact(&mut version)
        .map_err(|_| SpatiqError::Corrupted("file too short for version".into()))?;
    if version[0] != VERSION {
        return Err(SpatiqError::Corrupted(format!(
            "unsupported snapshot version {}",
            version[0]
        )));
    }

    let mapping = bincode::deserialize_from(&mut reader)?;

    let mut probe = [0u8; 1];
    if reader.read(&mut probe)? != 0 {
        return Err(SpatiqError::Corrupted(
            "trailing bytes after snapshot body".into(),
        ));
    }
    Ok(mapping)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}

impl<K: Eq + Hash + Serialize, P: Serialize> IntervalSetMapping<K, P> {
    /// Persist this mapping as a binary snapshot.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatiq::{Interval, IntervalSetMapping};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let path = dir.path().join("results.spq");
    ///
    /// let mapping = IntervalSetMapping::from_intervals(vec![
    ///     ("v1".to_string(), Interval::from_temporal(0.0, 5.0, 1u32)?),
    /// ]);
    /// mapping.save_to(&path)?;
    ///
    /// let back: IntervalSetMapping<String, u32> = IntervalSetMapping::load_from(&path)?;
    /// assert_eq!(back.total_intervals(), 1);
    /// # Ok::<(), spatiq::SpatiqError>(())
    /// ```
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_snapshot(self, path.as_ref())
    }
}

impl<K: Eq + Hash + DeserializeOwned, P: DeserializeOwned> IntervalSetMapping<K, P> {
    /// Load a mapping from a binary snapshot.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        read_snapshot(path.as_ref())
    }
}
