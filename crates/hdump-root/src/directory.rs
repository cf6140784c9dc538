//! Top-level TDirectory key list.

use std::collections::HashMap;

use crate::error::Result;
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// A parsed TDirectory: an ordered list of TKeys.
#[derive(Debug, Clone)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list from the file at `seek_keys`.
    ///
    /// The key list starts with a TKey header for the list itself, then
    /// a u32 `nkeys`, followed by `nkeys` TKey records.
    pub fn read_key_list(file_data: &[u8], seek_keys: usize, is_large: bool) -> Result<Self> {
        let mut r = RBuffer::new(file_data);
        r.skip(seek_keys)?;

        let _list_key = Key::read(&mut r, is_large)?;
        let nkeys = r.read_u32()? as usize;

        // Each key header is at least 26 bytes; don't trust a corrupt count for capacity.
        let mut keys = Vec::with_capacity(nkeys.min(r.len() / 26));
        for _ in 0..nkeys {
            keys.push(Key::read(&mut r, is_large)?);
        }

        Ok(Directory { keys })
    }

    /// Keys in on-disk order, all cycles included.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Consume the directory, yielding its keys.
    pub fn into_keys(self) -> Vec<Key> {
        self.keys
    }

    /// Find a key by name (highest cycle wins).
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }

    /// One key per name, the highest cycle, in order of first appearance.
    pub fn latest_cycles(&self) -> Vec<&Key> {
        let mut out: Vec<&Key> = Vec::with_capacity(self.keys.len());
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(self.keys.len());
        for key in &self.keys {
            match index.get(key.name.as_str()) {
                Some(&i) if out[i].cycle < key.cycle => out[i] = key,
                Some(_) => {}
                None => {
                    index.insert(key.name.as_str(), out.len());
                    out.push(key);
                }
            }
        }
        out
    }
}
