use std::io::Write;
use std::path::Path;

use super::*;

fn option(value: &str) -> FacetOption {
    FacetOption {
        value: value.to_string(),
        label: value.to_string(),
    }
}

fn checkbox(id: &str, options: Vec<FacetOption>) -> FacetDef {
    FacetDef {
        id: id.to_string(),
        kind: FacetKind::Checkbox,
        label: id.to_string(),
        options,
        min: None,
        max: None,
        step: None,
    }
}

fn range(id: &str, min: f64, max: f64, step: f64) -> FacetDef {
    FacetDef {
        id: id.to_string(),
        kind: FacetKind::Range,
        label: id.to_string(),
        options: vec![],
        min: Some(min),
        max: Some(max),
        step: Some(step),
    }
}

fn file_with(category: &str, filters: Vec<FacetDef>) -> FacetsFile {
    let mut categories = BTreeMap::new();
    categories.insert(
        category.to_string(),
        CategoryFacets {
            title: "Test".to_string(),
            filters,
        },
    );
    FacetsFile { categories }
}

#[test]
fn validate_accepts_valid_facets() {
    let file = file_with(
        "terea",
        vec![
            checkbox("country", vec![option("Казахстан")]),
            range("price", 0.0, 12_000.0, 1_000.0),
        ],
    );
    assert!(validate_facets(&file).is_ok());
}

#[test]
fn validate_rejects_unknown_category() {
    let file = file_with("heets", vec![]);
    let err = validate_facets(&file).unwrap_err();
    assert!(err.to_string().contains("unknown category 'heets'"));
}

#[test]
fn validate_rejects_empty_id() {
    let file = file_with("iqos", vec![checkbox(" ", vec![option("one")])]);
    let err = validate_facets(&file).unwrap_err();
    assert!(err.to_string().contains("empty id"));
}

#[test]
fn validate_rejects_duplicate_ids() {
    let file = file_with(
        "iqos",
        vec![
            checkbox("brand", vec![option("one")]),
            checkbox("brand", vec![option("prime")]),
        ],
    );
    let err = validate_facets(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate filter id 'brand'"));
}

#[test]
fn validate_rejects_checkbox_without_options() {
    let file = file_with("devices", vec![checkbox("brand", vec![])]);
    let err = validate_facets(&file).unwrap_err();
    assert!(err.to_string().contains("has no options"));
}

#[test]
fn validate_rejects_inverted_range() {
    let file = file_with("terea", vec![range("price", 500.0, 100.0, 10.0)]);
    let err = validate_facets(&file).unwrap_err();
    assert!(err.to_string().contains("min 500 >= max 100"));
}

#[test]
fn validate_rejects_zero_step() {
    let file = file_with("terea", vec![range("price", 0.0, 100.0, 0.0)]);
    let err = validate_facets(&file).unwrap_err();
    assert!(err.to_string().contains("non-positive step"));
}

#[test]
fn load_facets_reports_missing_file() {
    let err = load_facets(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::FacetsFileIo { .. }));
}

#[test]
fn load_facets_reports_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "categories: [not, a, map]").unwrap();
    let err = load_facets(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::FacetsFileParse(_)));
}

#[test]
fn load_facets_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("facets.yaml");
    assert!(path.exists(), "facets.yaml missing at {path:?}");
    let facets = load_facets(&path).expect("bundled facets.yaml must validate");
    for category in Category::ALL {
        let section = facets
            .for_category(category)
            .unwrap_or_else(|| panic!("no facets for {category}"));
        assert!(section.filters.iter().any(|f| f.id == "price"));
    }
}
