//! Compiled plans lowered to ClickHouse SQL

#[cfg(test)]
mod sql_pushdown_tests {
    use anyhow::Result;

    use shapeproj::projection_planner::{ProjectionOptions, ProjectionPlanner};
    use shapeproj::shape_catalog::ShapeId;
    use shapeproj::sql_generator::{translate, SqlOptions, ToSql};

    use crate::test_schemas::{init_logging, registry};

    #[test]
    fn test_item_projection_select() -> Result<()> {
        init_logging();
        let planner = ProjectionPlanner::with_defaults(registry());
        let plan = planner.compile_projection(
            &ShapeId::new("ItemEntity"),
            &ShapeId::new("ItemDto"),
            ProjectionOptions::default(),
        )?;

        let fragment = translate(&plan, &SqlOptions::from_table("shop.items"))?;
        assert_eq!(
            fragment.columns(),
            vec!["Id", "Name", "Status", "ParentTitle", "Tags"]
        );
        assert_eq!(
            fragment.to_sql(),
            "SELECT src.`Id` AS `Id`, \
             src.`Name` AS `Name`, \
             CAST(src.`Status` AS Int64) AS `Status`, \
             if(isNull(src.`Parent`), NULL, tupleElement(src.`Parent`, 'Title')) AS `ParentTitle`, \
             arrayMap(x3 -> tuple(tupleElement(x3, 'Id'), tupleElement(x3, 'Label')), src.`Tags`) AS `Tags` \
             FROM shop.items AS src"
        );
        Ok(())
    }

    #[test]
    fn test_nullable_nested_is_flattened() -> Result<()> {
        init_logging();
        let planner = ProjectionPlanner::with_defaults(registry());
        let plan = planner.compile_projection(
            &ShapeId::new("ItemEntity"),
            &ShapeId::new("ItemDetailDto"),
            ProjectionOptions::default(),
        )?;

        let options = SqlOptions {
            table: None,
            table_alias: "i".to_string(),
        };
        let fragment = translate(&plan, &options)?;
        assert_eq!(
            fragment.to_sql(),
            "i.`Id` AS `Id`, \
             if(isNull(i.`Parent`), NULL, tupleElement(i.`Parent`, 'Title')) AS `Parent.Title`"
        );
        Ok(())
    }
}
