//! Kernels built from `metakernel.toml`

use std::sync::Arc;

use crate::common::*;
use metakernel::{FieldNameCheck, MetadataStore, CONFIG_FILE_NAME};
use tempfile::TempDir;

#[test]
fn default_file_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    KernelConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(KernelConfig::from_file(&path).unwrap(), KernelConfig::default());

    // An existing file is left alone
    std::fs::write(&path, "field_names = \"all\"\n").unwrap();
    KernelConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(
        KernelConfig::from_file(&path).unwrap().field_names,
        FieldNameCheck::CollectAll
    );
}

#[test]
fn file_settings_reach_the_managers() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "default_namespace = \"core\"\nfield_names = \"all\"\n").unwrap();

    let store = Arc::new(MemoryStore::new());
    let config = KernelConfig::from_file(&path).unwrap();
    let kernel = MetadataKernel::with_config(store.clone(), config).unwrap();

    let owner = entity(&kernel, "", "tag");
    assert_eq!(owner.namespace, "");
    assert!(store.entities().find_by_full_name("core.tag").unwrap().is_some());

    let err = kernel
        .attributes()
        .create(
            &Attribute::new(owner.to_ref(), "label", AttributeType::Text)
                .with_configuration(r#"{"colour":"red","weight":1}"#),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("the colour configuration attribute is unknown"));
    assert!(err.to_string().contains("the weight configuration attribute is unknown"));
}

#[test]
fn invalid_files_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    std::fs::write(&path, "default_namespace = \"Bad Token\"\n").unwrap();
    assert!(KernelConfig::from_file(&path).is_err());

    std::fs::write(&path, "field_names = \"some\"\n").unwrap();
    let err = KernelConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse metakernel.toml"));

    let missing = dir.path().join("absent.toml");
    assert!(KernelConfig::from_file(&missing).is_err());
}

#[test]
fn saved_config_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let config = KernelConfig {
        default_namespace: "sys.meta".into(),
        field_names: FieldNameCheck::CollectAll,
    };
    config.write_to_file(&path).unwrap();
    assert_eq!(KernelConfig::from_file(&path).unwrap(), config);
}
