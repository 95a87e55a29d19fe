//! Plan cache behaviour seen through the planner

#[cfg(test)]
mod plan_cache_tests {
    use std::sync::Arc;
    use std::thread;

    use anyhow::Result;

    use shapeproj::config::ProjectionConfig;
    use shapeproj::projection_planner::{ProjectionOptions, ProjectionPlanner};
    use shapeproj::shape_catalog::ShapeId;

    use crate::test_schemas::{init_logging, registry};

    #[test]
    fn test_repeat_compilation_returns_same_plan() -> Result<()> {
        init_logging();
        let planner = ProjectionPlanner::with_defaults(registry());
        let (src, dst) = (ShapeId::new("ItemEntity"), ShapeId::new("ItemDto"));

        let first = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;
        let second = planner.compile_projection(&src, &dst, ProjectionOptions::default())?;
        assert!(Arc::ptr_eq(&first, &second));

        let metrics = planner.cache_metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.size, 1);
        Ok(())
    }

    #[test]
    fn test_load_children_is_part_of_the_key() -> Result<()> {
        init_logging();
        let planner = ProjectionPlanner::with_defaults(registry());
        let node = ShapeId::new("Node");

        let shallow = planner.compile_projection(&node, &node, ProjectionOptions::default())?;
        let deep = planner.compile_projection(&node, &node, ProjectionOptions::with_children())?;
        assert!(!Arc::ptr_eq(&shallow, &deep));
        assert_eq!(planner.cache_metrics().size, 2);
        Ok(())
    }

    #[test]
    fn test_concurrent_compilation_converges_on_one_plan() -> Result<()> {
        init_logging();
        let planner = Arc::new(ProjectionPlanner::with_defaults(registry()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let planner = Arc::clone(&planner);
                thread::spawn(move || {
                    planner.compile_projection(
                        &ShapeId::new("ItemEntity"),
                        &ShapeId::new("ItemDto"),
                        ProjectionOptions::default(),
                    )
                })
            })
            .collect();

        let plans = handles
            .into_iter()
            .map(|h| h.join().expect("compile thread panicked"))
            .collect::<Result<Vec<_>, _>>()?;

        let cached = planner.compile_projection(
            &ShapeId::new("ItemEntity"),
            &ShapeId::new("ItemDto"),
            ProjectionOptions::default(),
        )?;
        for plan in &plans {
            assert_eq!(**plan, *cached);
        }
        assert_eq!(planner.cache_metrics().size, 1);
        Ok(())
    }

    #[test]
    fn test_disabled_cache_still_compiles() -> Result<()> {
        init_logging();
        let config = ProjectionConfig {
            plan_cache_enabled: false,
            ..Default::default()
        };
        let planner = ProjectionPlanner::new(registry(), &config);
        let node = ShapeId::new("Node");

        let first = planner.compile_projection(&node, &node, ProjectionOptions::default())?;
        let second = planner.compile_projection(&node, &node, ProjectionOptions::default())?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(planner.cache_metrics().size, 0);
        Ok(())
    }
}
