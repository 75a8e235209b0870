// src/pipeline/materialize.rs

//! Materializing attachment groups into the on-disk folder tree.
//!
//! Every group becomes `<course>/<section>/<anchor>/` under the output root.
//! The primary file takes the anchor's name, followers keep their own slugged
//! stems, and a repeated name inside one group gains an ordinal suffix so the
//! layout is deterministic run over run. Files already on disk are left
//! untouched; a failed transfer skips that file, never the group.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::models::AttachmentGroup;
use crate::session::FileTransfer;
use crate::storage::FileStore;
use crate::utils;

/// Aggregate result of materializing a batch of groups.
#[derive(Debug, Default)]
pub struct MaterializeOutcome {
    pub files_written: usize,

    /// Files skipped because they already exist
    pub files_skipped: usize,

    /// File name paired with the reason it was not written
    pub failures: Vec<(String, String)>,
}

/// Download and write every member of every group.
pub async fn materialize_groups(
    transfer: &dyn FileTransfer,
    store: &FileStore,
    groups: &[AttachmentGroup],
) -> MaterializeOutcome {
    let mut outcome = MaterializeOutcome::default();

    for group in groups {
        let dir = group_dir(group);
        if let Err(e) = store.ensure_dir(&dir).await {
            log::warn!("Could not create {}: {e}", dir.display());
            outcome
                .failures
                .push((group.anchor_name.clone(), e.to_string()));
            continue;
        }

        let mut used: HashSet<String> = HashSet::new();
        for (index, member) in group.members.iter().enumerate() {
            let name = member_file_name(group, index, &mut used);
            let key = dir.join(&name);

            if store.exists(&key).await {
                log::debug!("{} already exists, skipping", key.display());
                outcome.files_skipped += 1;
                continue;
            }

            let bytes = match transfer.fetch_bytes(&member.url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Skipping {name}: {e}");
                    outcome.failures.push((name, e.to_string()));
                    continue;
                }
            };
            match store.write_bytes(&key, &bytes).await {
                Ok(()) => {
                    log::info!("Wrote {} ({} bytes)", key.display(), bytes.len());
                    outcome.files_written += 1;
                }
                Err(e) => {
                    log::warn!("Could not write {name}: {e}");
                    outcome.failures.push((name, e.to_string()));
                }
            }
        }
    }

    outcome
}

fn group_dir(group: &AttachmentGroup) -> PathBuf {
    PathBuf::from(utils::sanitize_component(&group.course))
        .join(group.section.slug())
        .join(&group.anchor_name)
}

/// Deterministic file name for the group member at `index`.
///
/// The primary inherits the anchor's name; followers keep their own stems.
/// Repeats within the group count up from 2.
fn member_file_name(group: &AttachmentGroup, index: usize, used: &mut HashSet<String>) -> String {
    let member = &group.members[index];
    let stem = if index == 0 {
        group.anchor_name.clone()
    } else {
        let (base, _) = utils::split_extension(&member.name);
        utils::slug(base)
    };
    let extension = utils::extension_of(&member.name)
        .unwrap_or_else(|| member.kind.extension().unwrap_or("bin").to_string());

    let mut candidate = format!("{stem}.{extension}");
    let mut ordinal = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{stem}-{ordinal}.{extension}");
        ordinal += 1;
    }
    candidate
}
