//! Shared shape catalogue for integration tests
//!
//! Storage-side `*Entity` shapes and presentation-side `*Dto` shapes, plus a
//! self-referential `Node` shape.

use std::sync::Arc;

use shapeproj::shape_catalog::{ShapeCatalogConfig, ShapeRegistry};

pub const CATALOG_YAML: &str = r#"
name: orders
enums:
  - name: ItemStatus
    members:
      - { name: Active, value: 0 }
      - { name: Inactive, value: 1 }
  - name: ItemStatusDto
    members:
      - { name: Active, value: 0 }
      - { name: Inactive, value: 1 }
shapes:
  - name: TagEntity
    fields:
      - { name: Id, type: int }
      - { name: Label, type: string }
  - name: TagDto
    fields:
      - { name: Id, type: int }
      - { name: Label, type: string }
  - name: ParentEntity
    fields:
      - { name: Id, type: int }
      - { name: Title, type: string }
  - name: ParentDto
    fields:
      - { name: Title, type: string }
  - name: ItemEntity
    fields:
      - { name: Id, type: int }
      - { name: Name, type: string }
      - { name: Status, enum: ItemStatus }
      - { name: Parent, shape: ParentEntity, nullable: true }
      - { name: Tags, collection: TagEntity }
  - name: ItemDto
    fields:
      - { name: Id, type: int }
      - { name: Name, type: string }
      - { name: Status, enum: ItemStatusDto }
      - name: ParentTitle
        type: string
        mapping: { field: Parent, subfield: Title }
      - { name: Tags, collection: TagDto }
  - name: ItemDetailDto
    fields:
      - { name: Id, type: int }
      - { name: Parent, shape: ParentDto, nullable: true }
  - name: ItemOwnerDto
    fields:
      - { name: Id, type: int }
      - name: OwnerName
        type: string
        mapping: { field: Owner, subfield: Name }
  - name: ItemParentNameDto
    fields:
      - name: ParentName
        type: string
        mapping: { field: Parent, subfield: Name }
  - name: AddressEntity
    fields:
      - { name: City, type: string }
      - { name: Zip, type: string }
  - name: AddressDto
    fields:
      - { name: City, type: string }
  - name: CustomerEntity
    fields:
      - { name: Id, type: int }
      - { name: Address, shape: AddressEntity }
  - name: CustomerDto
    fields:
      - { name: Id, type: int }
      - { name: Address, shape: AddressDto }
  - name: Node
    fields:
      - { name: Id, type: long }
      - { name: Next, shape: Node, nullable: true }
"#;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn registry() -> Arc<ShapeRegistry> {
    let config = ShapeCatalogConfig::from_yaml_str(CATALOG_YAML)
        .expect("test catalogue should parse");
    Arc::new(
        config
            .to_registry()
            .expect("test catalogue should register"),
    )
}
