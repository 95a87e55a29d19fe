//! Unit tests for YAML shape catalogues
//!
//! Tests catalogue parsing, conversion into a registry and the registration
//! errors a malformed catalogue produces.

#[cfg(test)]
mod shape_catalog_yaml_tests {
    use std::io::Write;

    use shapeproj::shape_catalog::{
        FieldKind, FieldOverride, ScalarType, ShapeCatalogConfig, ShapeCatalogError,
        ShapeProvider, ShapeId,
    };

    const CATALOG: &str = r#"
name: orders
enums:
  - name: ItemStatus
    members:
      - { name: Active, value: 0 }
      - { name: Inactive, value: 1 }
shapes:
  - name: ParentEntity
    fields:
      - { name: Id, type: int }
      - { name: Title, type: string }
  - name: ItemEntity
    fields:
      - { name: Id, type: int }
      - { name: Status, enum: ItemStatus }
      - { name: Parent, shape: ParentEntity, nullable: true }
  - name: ItemDto
    fields:
      - { name: Id, type: Int32 }
      - name: ParentTitle
        type: string
        mapping: { field: Parent, subfield: Title }
"#;

    #[test]
    fn test_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let config = ShapeCatalogConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.name, "orders");
        assert_eq!(config.shapes.len(), 3);

        let registry = config.to_registry().unwrap();
        assert_eq!(registry.shape_count(), 3);
        assert_eq!(registry.enum_count(), 1);

        let item = registry.shape(&ShapeId::new("ItemEntity")).unwrap();
        let names: Vec<_> = item.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Id", "Status", "Parent"]);
        assert_eq!(item.fields[1].kind, FieldKind::Enum("ItemStatus".to_string()));
        assert!(item.fields[2].nullable);

        let dto = registry.shape(&ShapeId::new("ItemDto")).unwrap();
        assert_eq!(dto.fields[0].kind, FieldKind::Scalar(ScalarType::Int32));
        assert_eq!(
            dto.field("ParentTitle").unwrap().mapping,
            Some(FieldOverride::path("Parent", "Title"))
        );
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShapeCatalogConfig::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ShapeCatalogError::ConfigReadError { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = ShapeCatalogConfig::from_yaml_str("name: [unclosed").unwrap_err();
        assert!(matches!(err, ShapeCatalogError::ConfigParseError { .. }));
    }

    #[test]
    fn test_dangling_shape_reference() {
        let yaml = r#"
name: broken
shapes:
  - name: ItemEntity
    fields:
      - { name: Parent, shape: Missing }
"#;
        let err = ShapeCatalogConfig::from_yaml_str(yaml)
            .unwrap()
            .to_registry()
            .unwrap_err();
        assert!(matches!(err, ShapeCatalogError::DanglingReference { .. }));
    }

    #[test]
    fn test_unknown_scalar_type() {
        let yaml = r#"
name: broken
shapes:
  - name: ItemEntity
    fields:
      - { name: Id, type: hyperint }
"#;
        let err = ShapeCatalogConfig::from_yaml_str(yaml)
            .unwrap()
            .to_registry()
            .unwrap_err();
        assert_eq!(
            err,
            ShapeCatalogError::UnknownScalarType {
                type_name: "hyperint".to_string()
            }
        );
    }

    #[test]
    fn test_field_with_two_kinds_rejected() {
        let yaml = r#"
name: broken
shapes:
  - name: Tag
    fields:
      - { name: Id, type: int }
  - name: ItemEntity
    fields:
      - { name: Tags, type: int, collection: Tag }
"#;
        let err = ShapeCatalogConfig::from_yaml_str(yaml)
            .unwrap()
            .to_registry()
            .unwrap_err();
        assert!(matches!(err, ShapeCatalogError::InvalidField { .. }));
    }
}
