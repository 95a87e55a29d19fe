//! End-to-end projections: compile a plan, then materialize instances with it

#[cfg(test)]
mod projection_scenario_tests {
    use anyhow::Result;
    use serde_json::json;

    use shapeproj::materializer::{EnumOutput, MaterializeError, Materializer};
    use shapeproj::projection_planner::{
        AssignmentKind, MappingOrigin, PlanBuildError, ProjectionOptions, ProjectionPlanner,
    };
    use shapeproj::shape_catalog::ShapeId;

    use crate::test_schemas::{init_logging, registry};

    fn planner() -> ProjectionPlanner {
        init_logging();
        ProjectionPlanner::with_defaults(registry())
    }

    fn ids(source: &str, target: &str) -> (ShapeId, ShapeId) {
        (ShapeId::new(source), ShapeId::new(target))
    }

    #[test]
    fn test_item_projection_with_null_parent() -> Result<()> {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "ItemDto");
        let plan = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;

        assert_eq!(
            plan.target_fields().collect::<Vec<_>>(),
            vec!["Id", "Name", "Status", "ParentTitle", "Tags"]
        );
        assert_eq!(
            plan.assignment("ParentTitle").map(|a| a.origin),
            Some(MappingOrigin::ExplicitOverride)
        );

        let source = json!({
            "Id": 1,
            "Name": "A",
            "Status": "Inactive",
            "Parent": null,
            "Tags": [{"Id": 5, "Label": "x"}]
        });
        let out = Materializer::new(planner.provider()).materialize(&plan, &source)?;
        assert_eq!(
            out,
            json!({
                "Id": 1,
                "Name": "A",
                "Status": 1,
                "ParentTitle": "",
                "Tags": [{"Id": 5, "Label": "x"}]
            })
        );

        let named = Materializer::new(planner.provider())
            .with_enum_output(EnumOutput::MemberName)
            .materialize(&plan, &source)?;
        assert_eq!(named["Status"], json!("Inactive"));
        Ok(())
    }

    #[test]
    fn test_item_projection_with_parent() -> Result<()> {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "ItemDto");
        let plan = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;

        let source = json!({
            "Id": 2,
            "Name": "B",
            "Status": 0,
            "Parent": {"Id": 9, "Title": "Root"},
            "Tags": []
        });
        let out = Materializer::new(planner.provider()).materialize(&plan, &source)?;
        assert_eq!(out["ParentTitle"], json!("Root"));
        assert_eq!(out["Status"], json!(0));
        assert_eq!(out["Tags"], json!([]));
        Ok(())
    }

    #[test]
    fn test_collection_keeps_cardinality_and_order() -> Result<()> {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "ItemDto");
        let plan = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;

        let source = json!({
            "Id": 3,
            "Name": "C",
            "Status": 0,
            "Parent": null,
            "Tags": [
                {"Id": 30, "Label": "c"},
                {"Id": 10, "Label": "a"},
                {"Id": 20, "Label": "b"}
            ]
        });
        let out = Materializer::new(planner.provider()).materialize(&plan, &source)?;
        let tag_ids: Vec<_> = out["Tags"]
            .as_array()
            .expect("tags should be an array")
            .iter()
            .map(|t| t["Id"].clone())
            .collect();
        assert_eq!(tag_ids, vec![json!(30), json!(10), json!(20)]);

        let Some(AssignmentKind::Collection { element_plan, .. }) =
            plan.assignment("Tags").map(|a| &a.kind)
        else {
            panic!("Tags should be a collection assignment");
        };
        assert_eq!(element_plan.depth, 3);
        Ok(())
    }

    #[test]
    fn test_nullable_nested_object() -> Result<()> {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "ItemDetailDto");
        let plan = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;
        assert!(matches!(
            plan.assignment("Parent").map(|a| &a.kind),
            Some(AssignmentKind::ConditionalNested { .. })
        ));

        let materializer = Materializer::new(planner.provider());
        let without = materializer.materialize(&plan, &json!({"Id": 1, "Parent": null}))?;
        assert_eq!(without, json!({"Id": 1, "Parent": null}));

        let with = materializer.materialize(
            &plan,
            &json!({"Id": 1, "Parent": {"Id": 4, "Title": "Top"}}),
        )?;
        assert_eq!(with, json!({"Id": 1, "Parent": {"Title": "Top"}}));
        Ok(())
    }

    #[test]
    fn test_required_nested_object() -> Result<()> {
        let planner = planner();
        let (src, dst) = ids("CustomerEntity", "CustomerDto");
        let plan = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;
        assert!(matches!(
            plan.assignment("Address").map(|a| &a.kind),
            Some(AssignmentKind::Nested { .. })
        ));

        let materializer = Materializer::new(planner.provider());
        let out = materializer.materialize(
            &plan,
            &json!({"Id": 7, "Address": {"City": "Oslo", "Zip": "0150"}}),
        )?;
        assert_eq!(out, json!({"Id": 7, "Address": {"City": "Oslo"}}));

        let expected = MaterializeError::UnexpectedNull {
            shape: "CustomerEntity".to_string(),
            field: "Address".to_string(),
        };
        let null_address = materializer
            .materialize(&plan, &json!({"Id": 7, "Address": null}))
            .unwrap_err();
        assert_eq!(null_address, expected);
        let missing_address = materializer
            .materialize(&plan, &json!({"Id": 7}))
            .unwrap_err();
        assert_eq!(missing_address, expected);
        Ok(())
    }

    #[test]
    fn test_self_referential_shape_terminates() -> Result<()> {
        let planner = planner();
        let node = ShapeId::new("Node");

        let shallow = planner.compile_projection(&node, &node, ProjectionOptions::default())?;
        assert_eq!(shallow.max_depth(), 3);

        let deep = planner.compile_projection(&node, &node, ProjectionOptions::with_children())?;
        assert_eq!(deep.max_depth(), planner.limits().hard_depth_limit);
        assert!(deep.node_count() > shallow.node_count());
        Ok(())
    }

    #[test]
    fn test_missing_override_source_fails() {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "ItemOwnerDto");
        let err = planner
            .compile_projection(&src, &dst, ProjectionOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            PlanBuildError::UnresolvedOverride {
                target_shape: "ItemOwnerDto".to_string(),
                target_field: "OwnerName".to_string(),
                missing_path: "Owner".to_string(),
            }
        );

        // failures are not cached
        let again = planner
            .compile_projection(&src, &dst, ProjectionOptions::default())
            .unwrap_err();
        assert_eq!(again, err);
        assert_eq!(planner.cache_metrics().size, 0);
    }

    #[test]
    fn test_missing_override_subfield_fails() {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "ItemParentNameDto");
        let err = planner
            .compile_projection(&src, &dst, ProjectionOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("Parent.Name"));
    }

    #[test]
    fn test_unknown_shape_is_catalog_error() {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "NoSuchDto");
        let err = planner
            .compile_projection(&src, &dst, ProjectionOptions::default())
            .unwrap_err();
        assert!(matches!(err, PlanBuildError::Catalog(_)));
    }

    #[test]
    fn test_malformed_instance_is_rejected() -> Result<()> {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "ItemDto");
        let plan = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;

        let err = Materializer::new(planner.provider())
            .materialize(&plan, &json!({"Id": 1, "Status": 0, "Tags": "nope"}))
            .unwrap_err();
        assert!(matches!(err, MaterializeError::NotAnArray { .. }));
        Ok(())
    }

    #[test]
    fn test_project_all_sequence() -> Result<()> {
        let planner = planner();
        let (src, dst) = ids("ItemEntity", "ItemDto");
        let plan = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;

        let sources = vec![
            json!({"Id": 1, "Name": "A", "Status": 0, "Parent": null, "Tags": []}),
            json!({"Id": 2, "Name": "B", "Status": 1, "Parent": null, "Tags": []}),
        ];
        let out = Materializer::new(planner.provider()).project_all(&plan, &sources)?;
        assert_eq!(out.len(), 2);
        assert_eq!(out[1]["Name"], json!("B"));
        Ok(())
    }
}
