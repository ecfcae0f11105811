use crate::error::ScopeError;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Produces `git diff --name-status` style text for a reference.
pub trait DiffSource {
    fn name_status(&self, reference: &str) -> Result<String, ScopeError>;
}

/// Paths touched between the comparison reference and the working tree.
///
/// A renamed file's new path is in `changed`; its old path is only a key of
/// `renamed`, never a member of `deleted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub changed: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
    pub renamed: BTreeMap<String, String>,
}

impl ChangeSet {
    /// Parses tab-separated name-status lines. Lines that are too short or
    /// carry an unknown status are skipped.
    pub fn parse(text: &str) -> Self {
        let mut changes = ChangeSet::default();
        let mut skipped = 0usize;

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            let fields: Vec<Cow<'_, str>> = line.split('\t').map(unquote_path).collect();
            if fields.len() < 2 || fields[1].is_empty() {
                if !line.is_empty() {
                    trace!(line, "Skipping malformed diff line");
                    skipped += 1;
                }
                continue;
            }

            match fields[0].chars().next() {
                Some('A') | Some('M') | Some('T') => {
                    changes.changed.insert(fields[1].to_string());
                }
                Some('D') => {
                    changes.deleted.insert(fields[1].to_string());
                }
                Some('R') if fields.len() >= 3 && !fields[2].is_empty() => {
                    changes
                        .renamed
                        .insert(fields[1].to_string(), fields[2].to_string());
                    changes.changed.insert(fields[2].to_string());
                }
                Some('C') if fields.len() >= 3 && !fields[2].is_empty() => {
                    changes.changed.insert(fields[2].to_string());
                }
                _ => {
                    trace!(line, "Skipping diff line with unsupported status");
                    skipped += 1;
                }
            }
        }

        changes.changed.retain(|path| !changes.deleted.contains(path));
        let renamed = &changes.renamed;
        changes.deleted.retain(|path| !renamed.contains_key(path));

        debug!(
            changed = changes.changed.len(),
            deleted = changes.deleted.len(),
            renamed = changes.renamed.len(),
            skipped,
            "Classified diff"
        );
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty() && self.renamed.is_empty()
    }
}

/// Decodes a C-style quoted path (`"apps/caf\303\251"`) as git prints it.
/// Unquoted fields are returned as is.
fn unquote_path(field: &str) -> Cow<'_, str> {
    let Some(inner) = field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return Cow::Borrowed(field);
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(byte) = iter.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        match iter.next() {
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b't') => bytes.push(b'\t'),
            Some(b'n') => bytes.push(b'\n'),
            Some(b'v') => bytes.push(0x0b),
            Some(b'f') => bytes.push(0x0c),
            Some(b'r') => bytes.push(b'\r'),
            Some(digit @ b'0'..=b'7') => {
                let mut value = u32::from(digit - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(next @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(next - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }

    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

/// Turns a comparison reference into a [`ChangeSet`].
pub struct DiffClassifier<'a> {
    source: &'a dyn DiffSource,
}

impl<'a> DiffClassifier<'a> {
    pub fn new(source: &'a dyn DiffSource) -> Self {
        Self { source }
    }

    /// An empty reference yields an empty change set without consulting the
    /// source.
    pub fn classify(&self, reference: &str) -> Result<ChangeSet, ScopeError> {
        if reference.is_empty() {
            debug!("No comparison ref, skipping diff");
            return Ok(ChangeSet::default());
        }

        let output = self.source.name_status(reference)?;
        Ok(ChangeSet::parse(&output))
    }
}
