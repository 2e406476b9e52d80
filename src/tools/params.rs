// src/tools/params.rs

//! Parameter sets and `${}` placeholder substitution.
//!
//! A parameter set is built per (rule, file) pair. Precedence, lowest first:
//! global path values, rule-level static params, derived file values. Chain
//! invocations overlay their own overrides on the caller's resolved set (see
//! `executor`), so a chain override beats an inherited derived value.
//!
//! Override values may reference other parameters; resolution is a bounded
//! two-pass sweep. A value that still references a live parameter after the
//! passes is a cycle and fails loudly rather than looping.

use std::path::Path;

use crate::config::model::{ParamMap, ParamValue};
use crate::config::paths::ResolvedPaths;
use crate::errors::{Error, Result};
use crate::rules::AssetRule;

const RESOLVE_PASSES: usize = 2;

/// Build the parameter set for one (rule, file) pair.
pub fn file_params(
    paths: &ResolvedPaths,
    rule: &AssetRule,
    src_file: &Path,
    host_platform: &str,
    target_platform: &str,
) -> ParamMap {
    let mut params = ParamMap::new();

    for (key, value) in &paths.globals {
        params.insert(key.clone(), ParamValue::Str(value.clone()));
    }
    for (key, value) in &rule.params {
        params.insert(key.clone(), value.clone());
    }

    let basename = src_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = src_file
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = src_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| basename.clone());
    let relpath = src_file.strip_prefix(&paths.source_root).unwrap_or(src_file);

    let derived = [
        ("src_file_path", path_str(src_file)),
        ("src_file_basename", basename.clone()),
        ("src_file_ext", ext),
        ("src_file_relpath", path_str(relpath)),
        ("dst_file_path", path_str(&rule.abs_dst_folder.join(&basename))),
        ("dst_file_noext", path_str(&rule.abs_dst_folder.join(&stem))),
        ("abs_src_folder", path_str(&rule.abs_src_folder)),
        ("abs_dst_folder", path_str(&rule.abs_dst_folder)),
        ("host_platform", host_platform.to_string()),
        ("target_platform", target_platform.to_string()),
    ];
    for (key, value) in derived {
        params.insert(key.to_string(), ParamValue::Str(value));
    }

    params
}

/// Overlay call-level overrides onto an existing set (overrides win).
pub fn apply_overrides(params: &mut ParamMap, overrides: &ParamMap) {
    for (key, value) in overrides {
        params.insert(key.clone(), value.clone());
    }
}

/// Resolve cross-references between parameter values in place.
///
/// Two sweeps over the whole set, substituting into nested mappings as well.
/// Afterwards any string value still holding a token that names a live string
/// parameter is unresolvable (self-reference or cycle) and fails the call.
pub fn resolve(params: &mut ParamMap) -> Result<()> {
    for _ in 0..RESOLVE_PASSES {
        let keys: Vec<String> = params.keys().cloned().collect();
        for key in keys {
            if let Some(value) = params.get(&key).cloned() {
                let resolved = resolve_value(&value, params);
                params.insert(key, resolved);
            }
        }
    }

    for (key, value) in params.iter() {
        if references_live_param(value, params) {
            return Err(Error::CyclicParameter(key.clone()));
        }
    }
    Ok(())
}

/// Substitute parameters into a command template.
///
/// Every token must resolve to a string-valued parameter; a token naming an
/// absent (or non-string) parameter is an error.
pub fn expand(template: &str, params: &ParamMap) -> Result<String> {
    expand_impl(template, &|name| lookup(params, name), true)
}

/// Substitute what resolves and keep unknown tokens verbatim.
pub fn expand_or_keep(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    expand_impl(template, &lookup, false).unwrap_or_else(|_| template.to_string())
}

fn lookup(params: &ParamMap, name: &str) -> Option<String> {
    params.get(name).and_then(|v| v.as_str().map(str::to_string))
}

fn resolve_value(value: &ParamValue, params: &ParamMap) -> ParamValue {
    match value {
        ParamValue::Str(s) => {
            ParamValue::Str(expand_or_keep(s, |name| lookup(params, name)))
        }
        ParamValue::Map(map) => ParamValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, params)))
                .collect(),
        ),
    }
}

fn references_live_param(value: &ParamValue, params: &ParamMap) -> bool {
    match value {
        ParamValue::Str(s) => token_names(s)
            .iter()
            .any(|name| matches!(params.get(*name), Some(ParamValue::Str(_)))),
        ParamValue::Map(map) => map.values().any(|v| references_live_param(v, params)),
    }
}

/// Names of all `${...}` tokens in a template, in order of appearance.
fn token_names(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                names.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}

fn expand_impl(
    template: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
    strict: bool,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None if strict => {
                        return Err(Error::MissingPlaceholder {
                            name: name.to_string(),
                            template: template.to_string(),
                        });
                    }
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated token: keep the text as-is.
                out.push_str("${");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
