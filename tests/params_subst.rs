use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

use proptest::prelude::*;

use assetforge::config::model::{ParamMap, ParamValue};
use assetforge::errors::Error as ForgeError;
use assetforge::tools::params::{apply_overrides, expand, file_params, resolve};
use assetforge_test_utils::builders::{test_paths, RuleBuilder};

type TestResult = Result<(), Box<dyn Error>>;

fn str_param(params: &ParamMap, key: &str) -> String {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing string param {key}"))
        .to_string()
}

#[test]
fn derived_file_values_are_computed() {
    let paths = test_paths(Path::new("/assets"), Path::new("/build"));
    let rule = RuleBuilder::new("textures/*.png", "convert")
        .destination("tex")
        .build(&paths);

    let params = file_params(
        &paths,
        &rule,
        Path::new("/assets/textures/a.png"),
        "linux",
        "macosx",
    );

    assert_eq!(str_param(&params, "src_file_path"), "/assets/textures/a.png");
    assert_eq!(str_param(&params, "src_file_basename"), "a.png");
    assert_eq!(str_param(&params, "src_file_ext"), "png");
    assert_eq!(str_param(&params, "src_file_relpath"), "textures/a.png");
    assert_eq!(str_param(&params, "dst_file_path"), "/build/tex/a.png");
    assert_eq!(str_param(&params, "dst_file_noext"), "/build/tex/a");
    assert_eq!(str_param(&params, "abs_src_folder"), "/assets/textures");
    assert_eq!(str_param(&params, "abs_dst_folder"), "/build/tex");
    assert_eq!(str_param(&params, "host_platform"), "linux");
    assert_eq!(str_param(&params, "target_platform"), "macosx");
}

#[test]
fn derived_values_outrank_rule_params() {
    let paths = test_paths(Path::new("/assets"), Path::new("/build"));
    let rule = RuleBuilder::new("textures/*.png", "convert")
        .param("src_file_ext", "hijacked")
        .build(&paths);

    let params = file_params(
        &paths,
        &rule,
        Path::new("/assets/textures/a.png"),
        "linux",
        "linux",
    );
    assert_eq!(str_param(&params, "src_file_ext"), "png");
}

#[test]
fn rule_params_outrank_global_paths() {
    let paths = test_paths(Path::new("/assets"), Path::new("/build"));
    let rule = RuleBuilder::new("textures/*.png", "convert")
        .param("destination_root", "/custom")
        .build(&paths);

    let params = file_params(
        &paths,
        &rule,
        Path::new("/assets/textures/a.png"),
        "linux",
        "linux",
    );
    assert_eq!(str_param(&params, "destination_root"), "/custom");
}

#[test]
fn values_referencing_other_params_resolve_transitively() -> TestResult {
    let paths = test_paths(Path::new("/assets"), Path::new("/build"));
    let rule = RuleBuilder::new("textures/*.png", "convert")
        .param("atlas_name", "${src_file_basename}.atlas")
        .param("atlas_path", "${abs_dst_folder}/${atlas_name}")
        .build(&paths);

    let mut params = file_params(
        &paths,
        &rule,
        Path::new("/assets/textures/a.png"),
        "linux",
        "linux",
    );
    resolve(&mut params)?;

    assert_eq!(str_param(&params, "atlas_name"), "a.png.atlas");
    assert_eq!(
        str_param(&params, "atlas_path"),
        "/build/textures/a.png.atlas"
    );
    Ok(())
}

#[test]
fn nested_override_maps_are_substituted_recursively() -> TestResult {
    let mut inner = BTreeMap::new();
    inner.insert("label".to_string(), ParamValue::from("${name}-x"));

    let mut params = ParamMap::new();
    params.insert("name".to_string(), ParamValue::from("ship"));
    params.insert("meta".to_string(), ParamValue::Map(inner));

    resolve(&mut params)?;

    let ParamValue::Map(meta) = params.get("meta").unwrap() else {
        panic!("meta is not a map");
    };
    assert_eq!(meta.get("label").unwrap().as_str(), Some("ship-x"));
    Ok(())
}

#[test]
fn self_reference_fails_loudly() {
    let mut params = ParamMap::new();
    params.insert("a".to_string(), ParamValue::from("${a}"));

    let err = resolve(&mut params).unwrap_err();
    assert!(matches!(err, ForgeError::CyclicParameter(_)));
}

#[test]
fn mutual_reference_fails_loudly() {
    let mut params = ParamMap::new();
    params.insert("a".to_string(), ParamValue::from("${b}"));
    params.insert("b".to_string(), ParamValue::from("${a}"));

    assert!(resolve(&mut params).is_err());
}

#[test]
fn unknown_tokens_in_values_are_left_verbatim() -> TestResult {
    let mut params = ParamMap::new();
    params.insert("a".to_string(), ParamValue::from("${no_such_thing}"));

    resolve(&mut params)?;
    assert_eq!(str_param(&params, "a"), "${no_such_thing}");
    Ok(())
}

#[test]
fn command_template_with_missing_param_is_an_error() {
    let params = ParamMap::new();
    let err = expand("convert ${src_file_path}", &params).unwrap_err();

    match err {
        ForgeError::MissingPlaceholder { name, .. } => {
            assert_eq!(name, "src_file_path");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn overrides_replace_existing_entries() {
    let mut params = ParamMap::new();
    params.insert("dst_file_path".to_string(), ParamValue::from("/build/a"));

    let mut overrides = ParamMap::new();
    overrides.insert("dst_file_path".to_string(), ParamValue::from("/other/b"));

    apply_overrides(&mut params, &overrides);
    assert_eq!(str_param(&params, "dst_file_path"), "/other/b");
}

proptest! {
    // A template without tokens is untouched by strict expansion.
    #[test]
    fn token_free_templates_expand_to_themselves(s in "[a-z0-9 /._-]*") {
        let params = ParamMap::new();
        prop_assert_eq!(expand(&s, &params).unwrap(), s);
    }

    // Resolution of a token-free set is the identity.
    #[test]
    fn token_free_params_are_a_fixpoint(v in "[a-z0-9 /._-]*") {
        let mut params = ParamMap::new();
        params.insert("k".to_string(), ParamValue::from(v.clone()));
        resolve(&mut params).unwrap();
        prop_assert_eq!(params.get("k").unwrap().as_str(), Some(v.as_str()));
    }
}
