//! Catalog loading and resolution through the public API.

use geoimpact_core::{
    AuxiliaryLayer, DatasetCatalog, DatasetKey, DatasetRegistry, GridKind, IndicatorCode,
    MaterialId, RegistryError,
};
use std::io::Write;

const CATALOG: &str = r#"[
    {"id": "cotton-prod", "subject": {"material": "cotton"}, "kind": "production",
     "physicalTable": "h3_grid_spam2010v2_prod", "valueColumn": "spam_prod_cott_a", "resolution": 6},
    {"id": "cotton-harv", "subject": {"material": "cotton"}, "kind": "harvest",
     "physicalTable": "h3_grid_spam2010v2_harvest", "valueColumn": "spam_harv_cott_a", "resolution": 6},
    {"id": "all-crops", "subject": {"layer": "allCropsHarvestedArea"}, "kind": "auxiliary",
     "physicalTable": "h3_grid_spam2010v2_harvest", "valueColumn": "spam_harv_total_a", "resolution": 6},
    {"id": "defor-2015", "subject": {"indicator": "DF_LUC_T"}, "kind": "indicatorValue",
     "physicalTable": "h3_grid_deforestation_global", "valueColumn": "hansen_loss_2015", "resolution": 6, "year": 2015},
    {"id": "defor-2020", "subject": {"indicator": "DF_LUC_T"}, "kind": "indicatorValue",
     "physicalTable": "h3_grid_deforestation_global", "valueColumn": "hansen_loss_2020", "resolution": 6, "year": 2020}
]"#;

#[test]
fn catalog_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    let text = std::fs::read_to_string(file.path()).unwrap();

    let catalog = DatasetCatalog::from_json(&text).unwrap();
    assert_eq!(catalog.len(), 5);

    let defor = DatasetKey::indicator(IndicatorCode::Deforestation);
    assert_eq!(catalog.resolve_for_year(&defor, Some(2017)).unwrap().id, "defor-2015");
    assert_eq!(catalog.resolve_for_year(&defor, Some(2019)).unwrap().id, "defor-2020");
    assert_eq!(catalog.resolve_for_year(&defor, None).unwrap().id, "defor-2020");

    let layer = catalog
        .resolve_for_year(&DatasetKey::layer(AuxiliaryLayer::AllCropsHarvestedArea), Some(2020))
        .unwrap();
    assert_eq!(layer.value_column, "spam_harv_total_a");
}

#[test]
fn unknown_material_is_dataset_not_found() {
    let catalog = DatasetCatalog::from_json(CATALOG).unwrap();
    let key = DatasetKey::material(MaterialId::new("cocoa"), GridKind::Production);
    match catalog.resolve_for_year(&key, None) {
        Err(RegistryError::DatasetNotFound { key: missing, year }) => {
            assert_eq!(missing, key);
            assert_eq!(year, None);
        }
        other => panic!("expected DatasetNotFound, got {other:?}"),
    }
}

#[test]
fn malformed_catalog_is_a_parse_error() {
    let err = DatasetCatalog::from_json("[{\"id\": 1}]").unwrap_err();
    assert!(matches!(err, RegistryError::Parse(_)));
}

#[test]
fn registry_is_object_safe_and_shareable() {
    let catalog: std::sync::Arc<dyn DatasetRegistry> =
        std::sync::Arc::new(DatasetCatalog::from_json(CATALOG).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let c = catalog.clone();
            std::thread::spawn(move || {
                c.resolve(
                    &geoimpact_core::DatasetSubject::Material(MaterialId::new("cotton")),
                    GridKind::Harvest,
                )
                .map(|d| d.id.clone())
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap().unwrap(), "cotton-harv");
    }
}
