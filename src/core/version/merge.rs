// ─── Patch Merge ───
// Flattens a base manifest plus its ordered loader patches into one
// effective manifest. Patches apply in ascending priority (stable on
// ties), scalars override, argument arrays concatenate, and the library
// array is de-duplicated on `group:artifact` identity after every step.

use std::collections::HashMap;

use serde_json::Value;

use super::schema::{Arguments, Library, VersionManifest};

/// The meta-entry patch id that never merges into the manifest body.
const GAME_PATCH_ID: &str = "game";

/// Apply all patches to `source`, producing a flattened manifest with no
/// `patches` field. A manifest without patches is returned unchanged.
pub fn effective_manifest(source: &VersionManifest) -> VersionManifest {
    let mut merged = source.clone();
    let patches = std::mem::take(&mut merged.patches);

    if patches.is_empty() {
        return merged;
    }

    let mut ordered: Vec<_> = patches.iter().collect();
    ordered.sort_by_key(|p| p.priority);

    for patch in ordered {
        if patch.id == GAME_PATCH_ID {
            continue;
        }
        apply_fragment(&mut merged, &patch.body);
    }

    merged
}

/// Merge one patch body into the accumulator. The fragment's own
/// bookkeeping (`id`, `version`, `priority`) lives outside the body and
/// never reaches this function.
fn apply_fragment(acc: &mut VersionManifest, fragment: &VersionManifest) {
    if fragment.main_class.is_some() {
        acc.main_class = fragment.main_class.clone();
    }
    if fragment.assets.is_some() {
        acc.assets = fragment.assets.clone();
    }
    if fragment.asset_index.is_some() {
        acc.asset_index = fragment.asset_index.clone();
    }
    if fragment.downloads.is_some() {
        acc.downloads = fragment.downloads.clone();
    }
    if fragment.minecraft_arguments.is_some() {
        acc.minecraft_arguments = fragment.minecraft_arguments.clone();
    }
    if fragment.logging.is_some() {
        acc.logging = fragment.logging.clone();
    }
    if fragment.java_version.is_some() {
        acc.java_version = fragment.java_version.clone();
    }

    if let Some(fragment_args) = &fragment.arguments {
        match &mut acc.arguments {
            Some(args) => {
                args.jvm.extend(fragment_args.jvm.iter().cloned());
                args.game.extend(fragment_args.game.iter().cloned());
            }
            None => {
                acc.arguments = Some(Arguments {
                    jvm: fragment_args.jvm.clone(),
                    game: fragment_args.game.clone(),
                });
            }
        }
    }

    if !fragment.libraries.is_empty() {
        acc.libraries.extend(fragment.libraries.iter().cloned());
        dedupe_libraries(&mut acc.libraries);
    }

    for (key, value) in &fragment.extra {
        merge_extra_value(acc.extra.entry(key.clone()), value);
    }
}

/// Merge semantics for fields the schema does not interpret: arrays
/// concatenate, objects merge per key, scalars override.
fn merge_extra_value(entry: serde_json::map::Entry<'_>, incoming: &Value) {
    match entry {
        serde_json::map::Entry::Vacant(slot) => {
            slot.insert(incoming.clone());
        }
        serde_json::map::Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
            (Value::Array(existing), Value::Array(new)) => {
                existing.extend(new.iter().cloned());
            }
            (Value::Object(existing), Value::Object(new)) => {
                for (key, value) in new {
                    merge_extra_value(existing.entry(key.clone()), value);
                }
            }
            (existing, new) => {
                *existing = new.clone();
            }
        },
    }
}

/// Keep exactly one library per `group:artifact` identity: a later entry
/// supersedes an earlier one in place. Entries carrying a native variant
/// are exempt and always survive, as are entries without a parseable
/// identity.
pub fn dedupe_libraries(libraries: &mut Vec<Library>) {
    let mut kept: Vec<Library> = Vec::with_capacity(libraries.len());
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for lib in libraries.drain(..) {
        let identity = match lib.identity() {
            Some(identity) if !lib.has_native_variant() => identity,
            _ => {
                kept.push(lib);
                continue;
            }
        };

        match index_of.get(&identity) {
            Some(&idx) => kept[idx] = lib,
            None => {
                index_of.insert(identity, kept.len());
                kept.push(lib);
            }
        }
    }

    *libraries = kept;
}
