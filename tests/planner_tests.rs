mod common;

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use proptest::prelude::*;
    use sqlprune::delta::{DeltaPredicate, DeltaScan};
    use sqlprune::expr::builder::*;
    use sqlprune::listing::{FileLister, FileStatus, ListedFile};
    use sqlprune::planner::{pack_splits, plan_splits, replace_path_in_from_clause, SplitPlanner};
    use sqlprune::statement::{from_table, table_function};
    use sqlprune::transform::collect_literals;
    use sqlprune::{Error, Node, Result, Value};

    use super::common::{fixture, first_select, init_test_logging, row, select_from};

    fn file(path: &str, size: u64, last_modified: i64) -> FileStatus {
        FileStatus::new(path, size, last_modified)
    }

    fn sizes(splits: &[Vec<FileStatus>]) -> Vec<Vec<u64>> {
        splits.iter().map(|s| s.iter().map(|f| f.size).collect()).collect()
    }

    fn split_paths(splits: &[Vec<FileStatus>]) -> Vec<Vec<&str>> {
        splits.iter().map(|s| s.iter().map(|f| f.path.as_str()).collect()).collect()
    }

    // ========================================================================
    // Packing
    // ========================================================================

    #[test]
    fn test_file_crossing_the_limit_stays() {
        let files = vec![file("a", 30, 1), file("b", 40, 2), file("c", 50, 3), file("d", 10, 4), file("e", 5, 5)];
        assert_eq!(sizes(&plan_splits(files, 60)), vec![vec![30, 40], vec![50, 10, 5]]);
    }

    #[test]
    fn test_oversized_file_is_its_own_split() {
        let files = vec![file("a", 500, 1), file("b", 10, 2), file("c", 10, 3)];
        assert_eq!(sizes(&plan_splits(files, 100)), vec![vec![500], vec![10, 10]]);
    }

    #[test]
    fn test_exact_limit_does_not_close_split() {
        let files = vec![file("a", 50, 1), file("b", 50, 2), file("c", 1, 3)];
        assert_eq!(sizes(&plan_splits(files, 100)), vec![vec![50, 50, 1]]);
    }

    #[test]
    fn test_files_are_ordered_by_modification_time() {
        let files = vec![file("new", 10, 300), file("old", 10, 100), file("mid", 10, 200)];
        assert_eq!(split_paths(&plan_splits(files, 1000)), vec![vec!["old", "mid", "new"]]);
    }

    #[test]
    fn test_ties_keep_listing_order() {
        let files = vec![file("b", 10, 1), file("a", 10, 1), file("c", 10, 0)];
        assert_eq!(split_paths(&plan_splits(files, 1000)), vec![vec!["c", "b", "a"]]);
    }

    #[test]
    fn test_no_files_no_splits() {
        assert!(plan_splits(Vec::new(), 10).is_empty());
        assert!(pack_splits(Vec::new(), 10).is_empty());
    }

    proptest! {
        #[test]
        fn test_packing_properties(
            file_sizes in prop::collection::vec(0u64..200, 0..40),
            max in 1u64..300,
        ) {
            let files: Vec<FileStatus> = file_sizes
                .iter()
                .enumerate()
                .map(|(i, size)| file(&format!("f{i}"), *size, i as i64))
                .collect();

            let splits = pack_splits(files.clone(), max);

            // every file exactly once, in order
            let flattened: Vec<FileStatus> = splits.iter().flatten().cloned().collect();
            prop_assert_eq!(flattened, files);

            for (i, split) in splits.iter().enumerate() {
                prop_assert!(!split.is_empty());
                let total: u64 = split.iter().map(|f| f.size).sum();
                let without_last: u64 = total - split[split.len() - 1].size;
                // a split only closes once it exceeds the limit, and it closes right away
                prop_assert!(without_last <= max);
                if i + 1 < splits.len() {
                    prop_assert!(total > max);
                }
            }
        }
    }

    // ========================================================================
    // Planning from queries
    // ========================================================================

    struct FakeLister;

    impl FileLister for FakeLister {
        fn list(&self, base_path: &str, partition_depth: usize) -> Result<Vec<ListedFile>> {
            assert_eq!(base_path, "data/t");
            assert_eq!(partition_depth, 2);
            let listed = |path: &str, size, modified, dt: &str, p: &str| ListedFile {
                status: FileStatus::new(path, size, modified),
                partitions: vec![dt.to_string(), p.to_string()],
            };
            Ok(vec![
                listed("data/t/dt=2024-01-01/p=a/0.parquet", 10, 1, "2024-01-01", "a"),
                listed("data/t/dt=2024-01-02/p=a/0.parquet", 40, 3, "2024-01-02", "a"),
                listed("data/t/dt=2024-01-02/p=b/0.parquet", 40, 2, "2024-01-02", "b"),
                listed("data/t/dt=2024-01-02/p=b/1.parquet", 40, 4, "2024-01-02", "b"),
            ])
        }
    }

    /// Filters a fixed partition table with the predicate it is handed.
    #[derive(Default)]
    struct FakeScan {
        seen: RefCell<Vec<Option<String>>>,
    }

    impl DeltaScan for FakeScan {
        fn scan(&self, base_path: &str, predicate: Option<&DeltaPredicate>) -> Result<Vec<FileStatus>> {
            assert_eq!(base_path, "data/delta_t");
            self.seen.borrow_mut().push(predicate.map(|p| p.to_string()));
            let table = vec![
                (file("p=a/q=1/0.parquet", 10, 1), "a", 1),
                (file("p=a/q=3/0.parquet", 10, 2), "a", 3),
                (file("p=b/q=1/0.parquet", 10, 3), "b", 1),
            ];
            Ok(table
                .into_iter()
                .filter(|(_, p, q)| {
                    let values = row(vec![("p", Value::String(p.to_string())), ("q", Value::Integer(*q))]);
                    predicate.is_none_or(|predicate| predicate.matches(&values) != Some(false))
                })
                .map(|(file, _, _)| file)
                .collect())
        }
    }

    #[test]
    fn test_read_parquet_is_pruned_hive_style() {
        init_test_logging();
        let scan = FakeScan::default();
        let planner = SplitPlanner::new(&FakeLister, &scan);

        let splits = planner.splits(&fixture("read_parquet_hive.json"), 50).unwrap();

        assert_eq!(
            split_paths(&splits),
            vec![
                vec!["data/t/dt=2024-01-02/p=b/0.parquet", "data/t/dt=2024-01-02/p=a/0.parquet"],
                vec!["data/t/dt=2024-01-02/p=b/1.parquet"],
            ]
        );
        assert!(scan.seen.borrow().is_empty());
    }

    #[test]
    fn test_read_delta_is_pruned_through_the_scan() {
        init_test_logging();
        let scan = FakeScan::default();
        let planner = SplitPlanner::new(&FakeLister, &scan);

        let splits = planner.splits(&fixture("read_delta.json"), 1000).unwrap();

        assert_eq!(split_paths(&splits), vec![vec!["p=a/q=1/0.parquet"]]);
        assert_eq!(
            scan.seen.borrow().as_slice(),
            &[Some("((column(p) = 'a') AND NOT((column(q) = 3)))".to_string())]
        );
    }

    #[test]
    fn test_base_table_is_rejected() {
        let scan = FakeScan::default();
        let planner = SplitPlanner::new(&FakeLister, &scan);

        let result = planner.splits(&fixture("select_where.json"), 10);
        assert!(matches!(result, Err(Error::UnsupportedShape(_))));
    }

    #[test]
    fn test_unknown_table_function_is_rejected() {
        let statement = first_select(&fixture("read_delta.json"));
        let from = from_table(&statement).unwrap();
        let call = from
            .get("function")
            .unwrap()
            .with_field("function_name", Node::from("read_csv"))
            .unwrap();
        let statement = statement
            .with_field("from_table", from.with_field("function", call).unwrap())
            .unwrap();
        let tree = fixture("read_delta.json")
            .with_field("statements", Node::array(vec![Node::object(
                sqlprune::Fields::new().with("node", statement),
            )]))
            .unwrap();

        let scan = FakeScan::default();
        let result = SplitPlanner::new(&FakeLister, &scan).splits(&tree, 10);
        assert!(matches!(result, Err(Error::UnsupportedShape(msg)) if msg.contains("read_csv")));
    }

    #[test]
    fn test_failed_parse_is_rejected() {
        let scan = FakeScan::default();
        let result = SplitPlanner::new(&FakeLister, &scan).splits(&fixture("parse_error.json"), 10);
        assert!(matches!(result, Err(Error::Parser(_))));
    }

    // ========================================================================
    // Rewriting the FROM clause
    // ========================================================================

    #[test]
    fn test_replace_path_in_from_clause() {
        let statement = first_select(&fixture("read_parquet_hive.json"));

        let rewritten = replace_path_in_from_clause(&statement, &["a.parquet", "b.parquet"]).unwrap();

        assert_eq!(table_function(&rewritten).as_deref(), Some("read_parquet"));
        let call = from_table(&rewritten).and_then(|f| f.get("function")).unwrap();
        let arguments = call.get("children").and_then(Node::as_array).unwrap();
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments[0].get("function_name"), Some(&Node::from("list_value")));
        assert_eq!(collect_literals(&arguments[0]), vec![&varchar("a.parquet"), &varchar("b.parquet")]);
        // the WHERE clause is untouched
        assert_eq!(rewritten.get("where_clause"), statement.get("where_clause"));
    }

    #[test]
    fn test_read_delta_becomes_read_parquet() {
        let statement = first_select(&fixture("read_delta.json"));
        let paths = vec!["x.parquet".to_string()];

        let rewritten = replace_path_in_from_clause(&statement, &paths).unwrap();

        assert_eq!(table_function(&rewritten).as_deref(), Some("read_parquet"));
    }

    #[test]
    fn test_replace_path_needs_table_function() {
        let statement = first_select(&select_from("t", None));
        assert!(matches!(
            replace_path_in_from_clause(&statement, &["a"]),
            Err(Error::UnsupportedShape(_))
        ));
    }
}
