mod common;

#[cfg(test)]
mod tests {
    use sqlprune::cli::*;
    use sqlprune::expr::builder::true_literal;
    use sqlprune::output::to_json;
    use sqlprune::statement::{from_table, where_clause};
    use sqlprune::{Error, Node};

    use super::common::{first_select, fixture};

    fn fixture_text(name: &str) -> String {
        to_json(&fixture(name))
    }

    fn tree(result: CommandResult) -> Node {
        match result {
            CommandResult::Tree(tree) => tree,
            other => panic!("expected a tree, got {:?}", other),
        }
    }

    fn json(result: CommandResult) -> serde_json::Value {
        match result {
            CommandResult::Json(value) => value,
            other => panic!("expected JSON, got {:?}", other),
        }
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    #[test]
    fn test_parse_tree_keeps_field_order() {
        let text = r#"{"type":"COLUMN_REF","class":"COLUMN_REF","column_names":["a"]}"#;
        let node = parse_tree(text).unwrap();
        assert_eq!(to_json(&node), text);
        assert_eq!(json_to_node(node_to_json(&node)), node);
    }

    #[test]
    fn test_printed_forms() {
        let node = parse_tree(r#"{"type":"CONSTANT","value":{"is_null":false,"b":[1,"x\n"]}}"#).unwrap();

        assert_eq!(
            sqlprune::to_canonical_json(&node),
            r#"{"type":"CONSTANT","value":{"b":[1,"x\n"],"is_null":false}}"#
        );
        assert_eq!(
            sqlprune::to_json_pretty(&parse_tree(r#"{"a":[],"b":{"c":1}}"#).unwrap()),
            "{\n  \"a\": [],\n  \"b\": {\n    \"c\": 1\n  }\n}"
        );
    }

    #[test]
    fn test_fixture_prints_back_identically() {
        let text = std::fs::read_to_string(format!(
            "{}/tests/fixtures/select_where.json",
            env!("CARGO_MANIFEST_DIR")
        ))
        .unwrap();
        let original: serde_json::Value = serde_json::from_str(&text).unwrap();
        let printed: serde_json::Value = serde_json::from_str(&fixture_text("select_where.json")).unwrap();
        assert_eq!(printed, original);
    }

    // ========================================================================
    // Commands
    // ========================================================================

    #[test]
    fn test_fingerprint_command() {
        let options = InspectOptions {
            input: Some(fixture_text("select_where.json")),
        };
        let value = json(execute_fingerprint(&options).unwrap());
        let digest = value["fingerprint"].as_str().unwrap();
        assert_eq!(digest, sqlprune::fingerprint(&fixture("select_where.json")).unwrap());
    }

    #[test]
    fn test_fingerprint_command_rejects_failed_parse() {
        let options = InspectOptions {
            input: Some(fixture_text("parse_error.json")),
        };
        assert!(matches!(
            execute_fingerprint(&options),
            Err(CliError::Prune(Error::Parser(_)))
        ));
    }

    #[test]
    fn test_canonicalize_command() {
        let options = InspectOptions {
            input: Some(fixture_text("select_where.json")),
        };
        let canonical = tree(execute_canonicalize(&options).unwrap());
        assert_eq!(canonical, sqlprune::canonicalize(&fixture("select_where.json")).unwrap());
    }

    #[test]
    fn test_schema_command() {
        let options = InspectOptions {
            input: Some(fixture_text("read_parquet_hive.json")),
        };
        let value = json(execute_schema(&options).unwrap());
        assert_eq!(
            value,
            serde_json::json!({ "schemas": ["STRUCT(\"dt\" NULL,\"c1\" NULL)"] })
        );
    }

    #[test]
    fn test_missing_input() {
        assert!(matches!(
            execute_fingerprint(&InspectOptions::default()),
            Err(CliError::NoInput)
        ));
        let invalid = InspectOptions {
            input: Some("{not json".to_string()),
        };
        assert!(matches!(execute_schema(&invalid), Err(CliError::Json(_))));
    }

    #[test]
    fn test_prune_hive_command() {
        let options = PruneHiveOptions {
            input: Some(fixture_text("select_where.json")),
            partitions: vec!["dt:DATE".to_string(), "p".to_string()],
        };
        let pruned = tree(execute_prune_hive(&options).unwrap());

        let statement = first_select(&pruned);
        let children = where_clause(&statement)
            .and_then(|w| w.get("children"))
            .and_then(Node::as_array)
            .unwrap();
        assert_eq!(children[0], true_literal());
        assert_ne!(children[1], true_literal());
    }

    #[test]
    fn test_prune_hive_needs_partitions() {
        let options = PruneHiveOptions {
            input: Some(fixture_text("select_where.json")),
            partitions: vec![],
        };
        assert!(matches!(execute_prune_hive(&options), Err(CliError::InvalidArgument(_))));

        let bad_type = PruneHiveOptions {
            input: Some(fixture_text("select_where.json")),
            partitions: vec!["dt:NOPE".to_string()],
        };
        assert!(matches!(execute_prune_hive(&bad_type), Err(CliError::Prune(_))));
    }

    #[test]
    fn test_prune_stats_with_columns() {
        let options = PruneStatsOptions {
            input: Some(fixture_text("select_where.json")),
            columns: vec!["c1:INTEGER".to_string()],
            ..Default::default()
        };
        let rewritten = tree(execute_prune_stats(&options).unwrap());

        let statement = first_select(&rewritten);
        assert_eq!(
            from_table(&statement).and_then(|f| f.get("table_name")),
            Some(&Node::from("stats"))
        );
    }

    #[test]
    fn test_prune_stats_with_config() {
        let options = PruneStatsOptions {
            input: Some(fixture_text("select_where.json")),
            config: Some(r#"{"stats_table": "from_config", "columns": [{"name": "p", "data_type": "INTEGER"}]}"#.to_string()),
            stats_table: Some("override".to_string()),
            ..Default::default()
        };
        let rewritten = tree(execute_prune_stats(&options).unwrap());

        let statement = first_select(&rewritten);
        assert_eq!(
            from_table(&statement).and_then(|f| f.get("table_name")),
            Some(&Node::from("override"))
        );
    }

    #[test]
    fn test_prune_stats_argument_errors() {
        let both = PruneStatsOptions {
            input: Some(fixture_text("select_where.json")),
            config: Some("{}".to_string()),
            columns: vec!["c1:INTEGER".to_string()],
            stats_table: None,
        };
        assert!(matches!(execute_prune_stats(&both), Err(CliError::InvalidArgument(_))));

        let neither = PruneStatsOptions {
            input: Some(fixture_text("select_where.json")),
            ..Default::default()
        };
        assert!(matches!(execute_prune_stats(&neither), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_splits_command() {
        let options = SplitsOptions {
            input: Some(
                r#"[
                    {"path": "b", "size": 40, "last_modified": 2},
                    {"path": "a", "size": 30, "last_modified": 1},
                    {"path": "c", "size": 50, "last_modified": 3}
                ]"#
                .to_string(),
            ),
            max_split_size: 60,
        };
        let value = json(execute_splits(&options).unwrap());
        let paths: Vec<Vec<&str>> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|split| {
                split
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|file| file["path"].as_str().unwrap())
                    .collect()
            })
            .collect();
        assert_eq!(paths, vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_splits_command_rejects_zero_size() {
        let options = SplitsOptions {
            input: Some("[]".to_string()),
            max_split_size: 0,
        };
        assert!(matches!(execute_splits(&options), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_error_messages() {
        let error = CliError::Prune(Error::TypeConversion {
            value: "x".to_string(),
            target: "DATE".to_string(),
        });
        assert_eq!(error.to_string(), "Type conversion error: cannot convert 'x' to DATE");
        assert!(std::error::Error::source(&error).is_some());
        assert!(CliError::NoInput.to_string().contains("--input"));
    }
}
